//! `brainstorm providers`: configured providers and credential status.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use brainstorm_infra::config::resolve_credential;
use brainstorm_types::config::{AppConfig, ProviderConfig};

/// Whether a provider's credential can be found.
#[derive(Debug, PartialEq, Eq)]
enum CredentialStatus {
    Present,
    NotRequired,
    Missing(String),
}

fn credential_status(provider: &ProviderConfig) -> CredentialStatus {
    match resolve_credential(provider) {
        Ok(Some(_)) => CredentialStatus::Present,
        Ok(None) => CredentialStatus::NotRequired,
        Err(_) => CredentialStatus::Missing(provider.api_key_env.clone().unwrap_or_default()),
    }
}

pub fn list_providers(config: &AppConfig, json: bool) -> Result<()> {
    if json {
        let providers: Vec<serde_json::Value> = config
            .providers
            .iter()
            .map(|p| {
                serde_json::json!({
                    "name": p.name,
                    "display_name": p.label(),
                    "kind": p.kind.to_string(),
                    "model": p.model,
                    "enabled": p.enabled,
                    "credential": match credential_status(p) {
                        CredentialStatus::Present => "present",
                        CredentialStatus::NotRequired => "not_required",
                        CredentialStatus::Missing(_) => "missing",
                    },
                    "topics": config.topics.enabled && config.topics.provider == p.name,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&providers)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("Kind").fg(Color::White),
        Cell::new("Model").fg(Color::White),
        Cell::new("Enabled").fg(Color::White),
        Cell::new("Credential").fg(Color::White),
    ]);

    for provider in &config.providers {
        let mut name = provider.label().to_string();
        if config.topics.enabled && config.topics.provider == provider.name {
            name.push_str(" (topics)");
        }
        let enabled = if provider.enabled {
            Cell::new("● yes").fg(Color::Green)
        } else {
            Cell::new("○ no").fg(Color::DarkGrey)
        };
        let credential = match credential_status(provider) {
            CredentialStatus::Present => Cell::new("✓ set").fg(Color::Green),
            CredentialStatus::NotRequired => Cell::new("not required").fg(Color::DarkGrey),
            CredentialStatus::Missing(env) => Cell::new(format!("✗ {env} unset")).fg(Color::Red),
        };
        table.add_row(vec![
            Cell::new(name),
            Cell::new(provider.kind.to_string()),
            Cell::new(&provider.model),
            enabled,
            credential,
        ]);
    }

    println!();
    println!("{table}");
    println!(
        "  {}",
        style(format!(
            "Timeout {}ms per request, context budget {} messages / {} chars.",
            config.dispatch.timeout_ms,
            fmt_limit(config.context.max_messages),
            fmt_limit(config.context.max_chars),
        ))
        .dim()
    );
    println!();

    Ok(())
}

fn fmt_limit(limit: Option<usize>) -> String {
    limit.map_or_else(|| "unlimited".to_string(), |n| n.to_string())
}
