//! `kai init`: write the default configuration.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use kai_core::config::{get_config_path, save_config, Config};
use kai_core::utils::get_history_path;

const TITLE: &str = "Kai setup";

/// Run the init command.
pub fn run(path: Option<&Path>, force: bool) -> Result<()> {
    println!();
    println!("{}", TITLE.cyan().bold());
    println!();

    let config_path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);

    if init_config(&config_path, force)? {
        println!(
            "  {} created config at {}",
            "✓".green(),
            config_path.display()
        );
    } else {
        println!(
            "  {} config already exists at {} (use --force to overwrite)",
            "✓".green(),
            config_path.display()
        );
    }

    let history_dir = get_history_path();
    std::fs::create_dir_all(&history_dir)
        .with_context(|| format!("failed to create {}", history_dir.display()))?;
    println!("  {} history dir at {}", "✓".green(), history_dir.display());

    println!();
    println!(
        "{}",
        "  Setup complete! Run `kai chat` to start chatting.".green()
    );
    println!();

    Ok(())
}

/// Write `Config::default()` to `path`. Returns `false` when a file is
/// already there and `force` is off.
fn init_config(path: &Path, force: bool) -> Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    save_config(&Config::default(), Some(path))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(true)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use kai_core::config::load_config;

    #[test]
    fn title_is_plain_ascii() {
        assert!(TITLE.is_ascii());
    }

    #[test]
    fn creates_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        assert!(init_config(&path, false).unwrap());
        assert!(path.exists());

        let loaded = load_config(Some(&path));
        assert_eq!(loaded.provider.name, Config::default().provider.name);
    }

    #[test]
    fn keeps_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{\"agent\":{\"name\":\"mine\"}}").unwrap();

        assert!(!init_config(&path, false).unwrap());
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("mine"));
    }

    #[test]
    fn force_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "garbage").unwrap();

        assert!(init_config(&path, true).unwrap());
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("provider"));
    }
}
