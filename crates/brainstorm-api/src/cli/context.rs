//! `brainstorm context`: condensed view of the stored conversation.

use anyhow::Result;
use console::style;

use crate::http::response::ContextView;
use crate::state::AppState;

pub async fn show_context(state: &AppState, json: bool) -> Result<()> {
    let report = state.orchestrator.condense_log().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&ContextView::from(&report))?);
        return Ok(());
    }

    println!();
    println!("{}", report.smart.text);
    println!();
    if report.topics.is_empty() {
        println!("  {}", style("No topics extracted.").dim());
    } else {
        let topics: Vec<&str> = report.topics.iter().collect();
        println!("  {} {}", style("Topics:").dim(), topics.join(", "));
    }
    if report.window.dropped > 0 {
        println!(
            "  {}",
            style(format!("{} older messages left out.", report.window.dropped)).dim()
        );
    }
    println!();

    Ok(())
}
