//! Shared CLI helpers: path expansion, response printing, banner.

use std::path::PathBuf;

use colored::Colorize;

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Print an agent reply to stdout.
pub fn print_response(agent_name: &str, response: &str) {
    println!();
    println!("{}", agent_name.cyan().bold());
    if response.is_empty() {
        println!("{}", "(no response)".dimmed());
    } else {
        println!("{response}");
    }
    println!();
}

/// Print the banner shown at REPL start.
pub fn print_banner(agent_name: &str, model: &str) {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!(
        "{}  v{}  {}",
        "Kai".cyan().bold(),
        version.dimmed(),
        format!("{agent_name} @ {model}").dimmed()
    );
    println!(
        "{}",
        "Type a message, /help for commands, or \"exit\" to quit.".dimmed()
    );
    println!();
}

/// Print an error line to stderr.
pub fn print_error(message: &str) {
    eprintln!("\n{} {message}\n", "error:".red().bold());
}

/// Print a "thinking" placeholder.
pub fn print_thinking() {
    eprint!("{}", "thinking...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_tilde_home() {
        let result = expand_tilde("~/.kai/config.json");
        assert!(result.ends_with(".kai/config.json"));
        assert!(!result.starts_with("~"));
    }

    #[test]
    fn expand_tilde_no_tilde() {
        let result = expand_tilde("/etc/kai.json");
        assert_eq!(result, PathBuf::from("/etc/kai.json"));
    }

    #[test]
    fn expand_tilde_relative() {
        let result = expand_tilde("configs/kai.json");
        assert_eq!(result, PathBuf::from("configs/kai.json"));
    }
}
