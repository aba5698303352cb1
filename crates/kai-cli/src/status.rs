//! `kai status`: show configuration and provider status.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use kai_agent::protocol::ToolProtocol;
use kai_agent::tools::{builtin_tools, Tool};
use kai_core::config::{get_config_path, load_config};
use kai_providers::registry::{find_by_name, resolve_api_base, resolve_api_key, PROVIDERS};

/// Run the status command.
pub fn run(path: Option<&Path>) -> Result<()> {
    let config = load_config(path);
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);

    println!();
    println!("{}", "Kai Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found, using defaults)".red().to_string()
        }
    );

    // Provider
    let provider = &config.provider;
    match find_by_name(&provider.name) {
        Some(spec) => {
            println!("  {:<18} {}", "Provider:".bold(), spec.display_name);
            println!(
                "  {:<18} {}",
                "API base:".bold(),
                resolve_api_base(provider, spec)
            );
            let key_status = if spec.is_local {
                format!("{}", "· not required".dimmed())
            } else if resolve_api_key(provider, spec).is_some() {
                format!("{} (key set)", "✓".green())
            } else {
                format!(
                    "{} set apiKey or {}",
                    "✗".red(),
                    spec.env_key.unwrap_or("an API key")
                )
            };
            println!("  {:<18} {}", "API key:".bold(), key_status);
        }
        None => {
            let known: Vec<&str> = PROVIDERS.iter().map(|p| p.name).collect();
            println!(
                "  {:<18} {} {}",
                "Provider:".bold(),
                provider.name,
                format!("(unknown, expected one of: {})", known.join(", ")).red()
            );
        }
    }
    println!("  {:<18} {}", "Model:".bold(), provider.model);

    // Agent
    let agent = &config.agent;
    println!();
    println!("  {:<18} {}", "Agent:".bold(), agent.name);
    println!(
        "  {:<18} {}",
        "Protocol:".bold(),
        ToolProtocol::from_settings(agent)
    );
    println!(
        "  {:<18} {} turns",
        "Memory:".bold(),
        agent.max_messages.max(1)
    );
    println!(
        "  {:<18} {} | max_tokens: {}",
        "Parameters:".bold(),
        format!(
            "temp: {}",
            agent
                .temperature
                .map_or_else(|| "default".to_string(), |t| t.to_string())
        )
        .dimmed(),
        agent
            .max_tokens
            .map_or_else(|| "default".to_string(), |t| t.to_string())
            .dimmed(),
    );

    // Tools
    let names: Vec<String> = builtin_tools()
        .iter()
        .map(|tool| tool.name().to_string())
        .collect();
    println!("  {:<18} {}", "Tools:".bold(), names.join(", "));

    println!();

    Ok(())
}
