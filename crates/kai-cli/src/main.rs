//! Kai CLI: entry point.
//!
//! # Commands
//!
//! - `kai chat [-m MESSAGE] [--sentinel]`: chat (single-shot or REPL)
//! - `kai tool <NAME> [INPUT...]`: run a built-in tool directly, no model
//! - `kai models`: list models served by the configured endpoint
//! - `kai status`: show configuration and provider status
//! - `kai init`: write the default config

mod helpers;
mod init;
mod repl;
mod status;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use kai_agent::tools::builtin_tools;
use kai_agent::{Agent, AgentBuilder};
use kai_core::config::{load_config, Config, ProtocolKind};
use kai_providers::create_client;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Kai: a small tool-calling agent for OpenAI-compatible endpoints
#[derive(Parser)]
#[command(name = "kai", version, about, long_about = None)]
struct Cli {
    /// Config file (default: ~/.kai/config.json)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the agent (single-shot or interactive REPL)
    Chat {
        /// Single message (non-interactive). Omit for REPL mode.
        #[arg(short, long)]
        message: Option<String>,

        /// Use the TOOL:<name>:<input> text protocol instead of native tool calls
        #[arg(long, default_value_t = false)]
        sentinel: bool,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Run a built-in tool directly, without the model
    Tool {
        /// Tool name (case-insensitive)
        name: String,

        /// Tool input; multiple words are joined with spaces
        input: Vec<String>,
    },

    /// List models served by the configured endpoint
    Models,

    /// Show configuration and provider status
    Status,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing config
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref().map(helpers::expand_tilde);

    match cli.command {
        Commands::Chat {
            message,
            sentinel,
            logs,
        } => {
            init_logging(logs);
            let mut config = load_config(config_path.as_deref());
            if sentinel {
                config.agent.protocol = ProtocolKind::Sentinel;
            }
            run_chat(&config, message).await
        }
        Commands::Tool { name, input } => {
            init_logging(false);
            let config = load_config(config_path.as_deref());
            let agent = build_agent(&config)?;
            let output = agent.execute_tool(&name, &input.join(" ")).await;
            println!("{output}");
            Ok(())
        }
        Commands::Models => {
            init_logging(false);
            let config = load_config(config_path.as_deref());
            run_models(&config).await
        }
        Commands::Status => status::run(config_path.as_deref()),
        Commands::Init { force } => init::run(config_path.as_deref(), force),
    }
}

// ─────────────────────────────────────────────
// Chat command
// ─────────────────────────────────────────────

async fn run_chat(config: &Config, message: Option<String>) -> Result<()> {
    let agent = build_agent(config)?;

    match message {
        Some(msg) => {
            // Single-shot mode
            info!(agent = agent.display_name(), "processing single message");
            let reply = agent.reply(&msg).await.context("chat failed")?;
            helpers::print_response(agent.display_name(), &reply);
        }
        None => {
            // Interactive REPL mode
            repl::run(&agent).await?;
        }
    }

    Ok(())
}

/// Build an agent with the built-in tools from the loaded configuration.
pub fn build_agent(config: &Config) -> Result<Agent> {
    let client = create_client(&config.provider)?;

    let agent = AgentBuilder::from_settings(&config.agent)
        .client(Arc::new(client))
        .tools(builtin_tools())
        .build()
        .context("failed to build agent")?;

    Ok(agent)
}

// ─────────────────────────────────────────────
// Models command
// ─────────────────────────────────────────────

async fn run_models(config: &Config) -> Result<()> {
    let client = create_client(&config.provider)?;
    let models = client.list_models().await;

    if models.is_empty() {
        helpers::print_error(&format!(
            "No models reported by {} (is the server running?)",
            client.api_base()
        ));
        return Ok(());
    }

    for model in models {
        let marker = if model == config.provider.model { "*" } else { " " };
        println!("{marker} {model}");
    }
    Ok(())
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("kai=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
