//! Brainstorm CLI and HTTP API entry point.
//!
//! Binary name: `brainstorm`
//!
//! Parses CLI arguments, loads config, wires the orchestrator, then
//! dispatches to the command handler or starts the HTTP server.

mod cli;
mod http;
mod state;

use anyhow::Context;
use clap::Parser;

use brainstorm_observe::tracing_setup::{init_tracing, shutdown_tracing};
use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 if matches!(cli.command, Commands::Serve { .. }) => "info",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    init_tracing(filter, cli.otel).map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        // Listing providers only needs config, not live credentials or a store.
        Commands::Providers => {
            let config = state::load_app_config(cli.config.as_deref()).await?;
            cli::provider::list_providers(&config, cli.json)?;
        }

        Commands::Serve { host, port } => {
            let state = init_state(cli.config.as_deref()).await?;
            let host = host.unwrap_or_else(|| state.config.server.host.clone());
            let port = port.unwrap_or(state.config.server.port);
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("failed to bind {addr}"))?;

            if !cli.quiet {
                println!(
                    "  {} Brainstorm API listening on {}",
                    console::style("⚡").bold(),
                    console::style(format!("http://{addr}")).cyan()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }

            let router = http::router::build_router(state);
            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            if !cli.quiet {
                println!("\n  Server stopped.");
            }
        }

        Commands::Ask { text } => {
            let state = init_state(cli.config.as_deref()).await?;
            cli::ask::ask(&state, &text.join(" "), cli.json).await?;
        }

        Commands::History { limit } => {
            let state = init_state(cli.config.as_deref()).await?;
            cli::history::history(&state, limit, cli.json).await?;
        }

        Commands::Context => {
            let state = init_state(cli.config.as_deref()).await?;
            cli::context::show_context(&state, cli.json).await?;
        }
    }

    Ok(())
}

async fn init_state(config_path: Option<&std::path::Path>) -> anyhow::Result<AppState> {
    let state = AppState::init(config_path)
        .await
        .context("failed to initialize brainstorm")?;
    tracing::debug!(
        data_dir = %state.data_dir.display(),
        store = ?state.orchestrator.store().kind(),
        providers = state.orchestrator.aggregator().providers().len(),
        "state initialized"
    );
    Ok(state)
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
