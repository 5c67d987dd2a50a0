//! CLI command definitions for the `brainstorm` binary.
//!
//! Uses clap derive macros for argument parsing. Every command except
//! `providers` runs against the configured store and providers.

pub mod ask;
pub mod context;
pub mod history;
pub mod provider;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};

use brainstorm_types::provider::{ProviderOutcome, ProviderResult};

/// Fan a conversation out to several language models at once.
#[derive(Parser)]
#[command(name = "brainstorm", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (defaults to $BRAINSTORM_CONFIG or ~/.brainstorm/config.toml).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API server.
    Serve {
        /// Address to bind (overrides [server].host).
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides [server].port).
        #[arg(long)]
        port: Option<u16>,
    },

    /// Send one message through every provider and store the answers.
    Ask {
        /// Message text.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Show the stored conversation log.
    History {
        /// Only show the most recent N messages.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// List configured providers and whether their credentials resolve.
    Providers,

    /// Print the condensed context for the stored conversation.
    Context,
}

/// Per-provider status table shared by `ask` and failure reporting.
pub(crate) fn status_table(results: &[ProviderResult]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Provider").fg(Color::White),
        Cell::new("Status").fg(Color::White),
        Cell::new("Elapsed").fg(Color::White),
        Cell::new("Detail").fg(Color::White),
    ]);

    for result in results {
        let (status_cell, detail) = match &result.outcome {
            ProviderOutcome::Ok { .. } => (Cell::new("● ok").fg(Color::Green), String::new()),
            ProviderOutcome::Error { kind, detail } => (
                Cell::new("✗ error").fg(Color::Red),
                format!("{kind}: {}", truncate(detail, 80)),
            ),
            ProviderOutcome::Timeout { timeout_ms } => (
                Cell::new("◌ timeout").fg(Color::Yellow),
                format!("no answer within {timeout_ms}ms"),
            ),
        };
        table.add_row(vec![
            Cell::new(&result.provider_id),
            status_cell,
            Cell::new(format!("{}ms", result.elapsed_ms)),
            Cell::new(detail),
        ]);
    }

    table
}

/// Cut `text` to at most `max` characters, marking the cut.
pub(crate) fn truncate(text: &str, max: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() <= max {
        return flat;
    }
    let cut: String = flat.chars().take(max.saturating_sub(1)).collect();
    format!("{cut}…")
}
