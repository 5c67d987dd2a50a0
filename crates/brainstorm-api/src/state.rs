//! Application state wiring config, store and providers together.
//!
//! AppState holds the concrete orchestrator used by both CLI and HTTP API.
//! The orchestrator is generic over the message store; AppState pins it to
//! the backend selected in config.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use brainstorm_core::llm::BoxProvider;
use brainstorm_core::orchestrator::Orchestrator;
use brainstorm_infra::config::{default_config_path, load_config, resolve_data_dir};
use brainstorm_infra::llm::create_providers;
use brainstorm_infra::store::{MessageStoreBackend, open_store};
use brainstorm_types::config::AppConfig;

pub type ConcreteOrchestrator = Orchestrator<MessageStoreBackend>;

/// Shared application state.
///
/// Cheap to clone; handlers receive it through axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ConcreteOrchestrator>,
    pub config: Arc<AppConfig>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Load config, resolve credentials, open the store and wire the orchestrator.
    pub async fn init(config_path: Option<&Path>) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_app_config(config_path).await?;
        let providers = create_providers(&config)?;
        let store = open_store(&config.store, &data_dir).await?;

        Ok(Self::new(config, store, providers, data_dir))
    }

    pub fn new(
        config: AppConfig,
        store: MessageStoreBackend,
        providers: Vec<Arc<BoxProvider>>,
        data_dir: PathBuf,
    ) -> Self {
        let orchestrator = Orchestrator::from_config(&config, Arc::new(store), providers);
        Self {
            orchestrator: Arc::new(orchestrator),
            config: Arc::new(config),
            data_dir,
        }
    }
}

/// Load and validate the config file (`--config`, `BRAINSTORM_CONFIG`, or the data dir default).
pub async fn load_app_config(config_path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);
    let config = load_config(&path).await?;
    config.validate()?;
    tracing::debug!(path = %path.display(), providers = config.providers.len(), "config loaded");
    Ok(config)
}
