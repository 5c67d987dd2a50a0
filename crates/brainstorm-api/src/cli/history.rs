//! `brainstorm history`: print the stored conversation log.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use brainstorm_core::repository::MessageStore;
use brainstorm_types::message::{Message, MessageRole};

use crate::cli::truncate;
use crate::state::AppState;

pub async fn history(state: &AppState, limit: Option<usize>, json: bool) -> Result<()> {
    let log = state.orchestrator.store().list_ordered().await?;
    let messages = tail(&log, limit);

    if json {
        println!("{}", serde_json::to_string_pretty(messages)?);
        return Ok(());
    }

    if messages.is_empty() {
        println!();
        println!("  {}", style("No messages yet. Try `brainstorm ask <text>`.").dim());
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Time").fg(Color::White),
        Cell::new("Role").fg(Color::White),
        Cell::new("Provider").fg(Color::White),
        Cell::new("Content").fg(Color::White),
    ]);

    for message in messages {
        let role_cell = match message.role {
            MessageRole::User => Cell::new("user").fg(Color::Cyan),
            MessageRole::Assistant => Cell::new("assistant").fg(Color::Green),
            MessageRole::System => Cell::new("system").fg(Color::DarkGrey),
        };
        table.add_row(vec![
            Cell::new(message.created_at.format("%Y-%m-%d %H:%M:%S")),
            role_cell,
            Cell::new(message.provider.as_ref().map(|p| p.as_str()).unwrap_or("-")),
            Cell::new(truncate(&message.content, 100)),
        ]);
    }

    println!();
    println!("{table}");
    if messages.len() < log.len() {
        println!(
            "  {}",
            style(format!("Showing {} of {} messages.", messages.len(), log.len())).dim()
        );
    }
    println!();

    Ok(())
}

/// The newest `limit` messages, oldest first.
fn tail(log: &[Message], limit: Option<usize>) -> &[Message] {
    match limit {
        Some(n) if n < log.len() => &log[log.len() - n..],
        _ => log,
    }
}
