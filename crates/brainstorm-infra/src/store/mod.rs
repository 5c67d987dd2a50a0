//! Message store backends and the runtime selector.
//!
//! The orchestrator is generic over `MessageStore`; the binary picks a
//! backend from `[store]` config at startup and hands it over as a
//! [`MessageStoreBackend`].

pub mod memory;
pub mod supabase;

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use brainstorm_core::repository::MessageStore;
use brainstorm_types::config::{StoreBackend, StoreConfig};
use brainstorm_types::error::StoreError;
use brainstorm_types::message::{Message, MessageId, NewMessage};

use crate::sqlite::message::SqliteMessageStore;
use crate::sqlite::pool::{DatabasePool, default_database_path};

pub use memory::InMemoryMessageStore;
pub use supabase::SupabaseMessageStore;

/// The configured message store.
pub enum MessageStoreBackend {
    Memory(InMemoryMessageStore),
    Sqlite(SqliteMessageStore),
    Supabase(SupabaseMessageStore),
}

impl MessageStoreBackend {
    pub fn kind(&self) -> StoreBackend {
        match self {
            MessageStoreBackend::Memory(_) => StoreBackend::Memory,
            MessageStoreBackend::Sqlite(_) => StoreBackend::Sqlite,
            MessageStoreBackend::Supabase(_) => StoreBackend::Supabase,
        }
    }
}

impl MessageStore for MessageStoreBackend {
    async fn append(&self, message: &NewMessage) -> Result<MessageId, StoreError> {
        match self {
            MessageStoreBackend::Memory(store) => store.append(message).await,
            MessageStoreBackend::Sqlite(store) => store.append(message).await,
            MessageStoreBackend::Supabase(store) => store.append(message).await,
        }
    }

    async fn list_ordered(&self) -> Result<Vec<Message>, StoreError> {
        match self {
            MessageStoreBackend::Memory(store) => store.list_ordered().await,
            MessageStoreBackend::Sqlite(store) => store.list_ordered().await,
            MessageStoreBackend::Supabase(store) => store.list_ordered().await,
        }
    }
}

/// Open the backend named in `config`.
///
/// Relative SQLite paths resolve against `data_dir`; the Supabase key is
/// read from the environment variable named by `supabase_key_env`.
pub async fn open_store(
    config: &StoreConfig,
    data_dir: &Path,
) -> Result<MessageStoreBackend, StoreError> {
    match config.backend {
        StoreBackend::Memory => Ok(MessageStoreBackend::Memory(InMemoryMessageStore::new())),
        StoreBackend::Sqlite => {
            let path = sqlite_path(config, data_dir);
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    StoreError::Connection(format!("failed to create {}: {e}", parent.display()))
                })?;
            }
            let pool = DatabasePool::open(&path)
                .await
                .map_err(|e| StoreError::Connection(e.to_string()))?;
            tracing::info!(path = %path.display(), "opened sqlite message store");
            Ok(MessageStoreBackend::Sqlite(SqliteMessageStore::new(pool)))
        }
        StoreBackend::Supabase => {
            let url = config.supabase_url.as_deref().ok_or_else(|| {
                StoreError::Connection("supabase backend requires supabase_url".to_string())
            })?;
            let key = std::env::var(&config.supabase_key_env)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| {
                    StoreError::Connection(format!(
                        "supabase key env var {} is not set",
                        config.supabase_key_env
                    ))
                })?;
            let store = SupabaseMessageStore::new(url, SecretString::from(key), &config.table)?
                .with_provider_column(config.supabase_provider_column);
            tracing::info!(
                url,
                table = %config.table,
                provider_column = config.supabase_provider_column,
                "using supabase message store"
            );
            Ok(MessageStoreBackend::Supabase(store))
        }
    }
}

fn sqlite_path(config: &StoreConfig, data_dir: &Path) -> PathBuf {
    match config.sqlite_path.as_deref() {
        Some(path) if Path::new(path).is_absolute() => PathBuf::from(path),
        Some(path) => data_dir.join(path),
        None => default_database_path(data_dir),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_config(backend: StoreBackend) -> StoreConfig {
        StoreConfig {
            backend,
            sqlite_path: None,
            supabase_url: None,
            supabase_key_env: "BRAINSTORM_TEST_UNSET_SUPABASE_KEY".to_string(),
            table: "messages".to_string(),
            supabase_provider_column: true,
        }
    }

    #[tokio::test]
    async fn test_open_memory_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&store_config(StoreBackend::Memory), dir.path())
            .await
            .unwrap();
        assert_eq!(store.kind(), StoreBackend::Memory);
        store.append(&NewMessage::user("idea A")).await.unwrap();
        assert_eq!(store.list_ordered().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_open_sqlite_store_under_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = store_config(StoreBackend::Sqlite);
        config.sqlite_path = Some("nested/log.db".to_string());

        let store = open_store(&config, dir.path()).await.unwrap();
        assert_eq!(store.kind(), StoreBackend::Sqlite);
        store.append(&NewMessage::user("idea A")).await.unwrap();
        assert!(dir.path().join("nested/log.db").exists());
    }

    #[tokio::test]
    async fn test_open_supabase_without_url_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = open_store(&store_config(StoreBackend::Supabase), dir.path()).await;
        assert!(matches!(result, Err(StoreError::Connection(_))));
    }

    #[tokio::test]
    async fn test_open_supabase_without_key_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = store_config(StoreBackend::Supabase);
        config.supabase_url = Some("http://127.0.0.1:9".to_string());
        match open_store(&config, dir.path()).await {
            Err(StoreError::Connection(msg)) => {
                assert!(msg.contains("BRAINSTORM_TEST_UNSET_SUPABASE_KEY"))
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected missing key error"),
        }
    }

    #[test]
    fn test_sqlite_path_resolution() {
        let data_dir = Path::new("/data");
        let mut config = store_config(StoreBackend::Sqlite);
        assert_eq!(sqlite_path(&config, data_dir), default_database_path(data_dir));
        config.sqlite_path = Some("/abs/x.db".to_string());
        assert_eq!(sqlite_path(&config, data_dir), PathBuf::from("/abs/x.db"));
    }
}
