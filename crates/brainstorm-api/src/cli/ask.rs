//! `brainstorm ask`: one orchestrated submission from the terminal.

use anyhow::{Result, bail};
use console::style;

use brainstorm_core::orchestrator::{OrchestratorError, SubmitOutcome};
use brainstorm_types::error::AggregateError;

use crate::cli::status_table;
use crate::http::response::{ProviderStatusView, RunView};
use crate::state::AppState;

/// Append the message, fan it out, store the answers and print the outcome.
pub async fn ask(state: &AppState, text: &str, json: bool) -> Result<()> {
    let aggregator = state.orchestrator.aggregator();

    let report = match state.orchestrator.submit(text).await {
        Ok(SubmitOutcome::Completed(report)) => report,
        Ok(SubmitOutcome::Skipped) => {
            if json {
                println!("{}", serde_json::json!({ "skipped": true }));
            } else {
                println!("  {}", style("Nothing to send: message is blank.").dim());
            }
            return Ok(());
        }
        Err(OrchestratorError::Aggregate(AggregateError::AllProvidersFailed { results })) => {
            if json {
                let statuses: Vec<ProviderStatusView> =
                    results.iter().map(ProviderStatusView::from).collect();
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "error": "ALL_PROVIDERS_FAILED",
                        "perProviderStatus": statuses,
                    }))?
                );
            } else {
                println!();
                println!("{}", status_table(&results));
            }
            bail!("all {} providers failed; nothing was stored", results.len());
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        let view = RunView::new(&report, aggregator);
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!();
    for output in &report.response.accepted {
        let label = aggregator
            .display_name(&output.provider_id)
            .unwrap_or(output.provider_id.as_str());
        println!("  {}", style(label).cyan().bold());
        for line in output.content.lines() {
            println!("  {line}");
        }
        println!();
    }

    println!("{}", status_table(&report.response.results));

    if !report.topics.is_empty() {
        let topics: Vec<&str> = report.topics.iter().collect();
        println!("  {} {}", style("Topics:").dim(), topics.join(", "));
    }
    for failure in &report.append_failures {
        println!(
            "  {} could not store output from {}: {}",
            style("!").yellow().bold(),
            failure.provider_id,
            failure.error
        );
    }
    if report.context.dropped > 0 {
        println!(
            "  {}",
            style(format!(
                "{} older messages were left out of the context.",
                report.context.dropped
            ))
            .dim()
        );
    }
    println!();

    Ok(())
}
