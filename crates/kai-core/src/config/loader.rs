//! Config loader: reads `~/.kai/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.kai/config.json`
//! 3. Environment variables `KAI_<SECTION>__<FIELD>` (override JSON)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path
        .map(PathBuf::from)
        .unwrap_or_else(get_config_path);

    load_config_from_path(&config_path)
}

/// Load config from a specific file path.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return apply_env_overrides(Config::default());
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return apply_env_overrides(Config::default());
        }
    };

    let config: Config = match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config {}: {}", path.display(), e);
            return apply_env_overrides(Config::default());
        }
    };

    apply_env_overrides(config)
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path
        .map(PathBuf::from)
        .unwrap_or_else(get_config_path);

    // Ensure parent directory exists
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `KAI_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// Supported overrides:
/// - `KAI_AGENT__NAME`, `KAI_AGENT__SYSTEM_PROMPT`
/// - `KAI_AGENT__MAX_MESSAGES`, `KAI_AGENT__MAX_TOOL_ROUNDS`
/// - `KAI_AGENT__PROTOCOL` (`structured` | `sentinel`)
/// - `KAI_AGENT__TEMPERATURE`, `KAI_AGENT__MAX_TOKENS`
/// - `KAI_PROVIDER__NAME`, `KAI_PROVIDER__MODEL`
/// - `KAI_PROVIDER__API_KEY`, `KAI_PROVIDER__API_BASE`
fn apply_env_overrides(mut config: Config) -> Config {
    // Agent
    if let Ok(val) = std::env::var("KAI_AGENT__NAME") {
        config.agent.name = val;
    }
    if let Ok(val) = std::env::var("KAI_AGENT__SYSTEM_PROMPT") {
        config.agent.system_prompt = val;
    }
    if let Ok(val) = std::env::var("KAI_AGENT__MAX_MESSAGES") {
        if let Ok(n) = val.parse::<usize>() {
            config.agent.max_messages = n;
        }
    }
    if let Ok(val) = std::env::var("KAI_AGENT__MAX_TOOL_ROUNDS") {
        if let Ok(n) = val.parse::<usize>() {
            config.agent.max_tool_rounds = n;
        }
    }
    if let Ok(val) = std::env::var("KAI_AGENT__PROTOCOL") {
        match val.parse() {
            Ok(protocol) => config.agent.protocol = protocol,
            Err(e) => warn!("Ignoring KAI_AGENT__PROTOCOL: {}", e),
        }
    }
    if let Ok(val) = std::env::var("KAI_AGENT__TEMPERATURE") {
        if let Ok(t) = val.parse::<f64>() {
            config.agent.temperature = Some(t);
        }
    }
    if let Ok(val) = std::env::var("KAI_AGENT__MAX_TOKENS") {
        if let Ok(n) = val.parse::<u32>() {
            config.agent.max_tokens = Some(n);
        }
    }

    // Provider
    if let Ok(val) = std::env::var("KAI_PROVIDER__NAME") {
        config.provider.name = val;
    }
    if let Ok(val) = std::env::var("KAI_PROVIDER__MODEL") {
        config.provider.model = val;
    }
    if let Ok(val) = std::env::var("KAI_PROVIDER__API_KEY") {
        config.provider.api_key = val;
    }
    if let Ok(val) = std::env::var("KAI_PROVIDER__API_BASE") {
        config.provider.api_base = Some(val);
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
