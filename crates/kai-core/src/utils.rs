//! Utility helpers: data paths and string truncation.

use std::path::PathBuf;

/// Get the Kai data directory (e.g. `~/.kai/`).
pub fn get_data_path() -> PathBuf {
    let home = home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".kai")
}

/// Get the REPL history directory (e.g. `~/.kai/history/`).
pub fn get_history_path() -> PathBuf {
    get_data_path().join("history")
}

/// Cut a string to at most `max_bytes` bytes without splitting a character.
pub fn truncate_bytes(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Helper to get home directory.
fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| std::env::var("USERPROFILE").ok().map(PathBuf::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_bytes_char_boundary() {
        // "é" is two bytes; cutting at 2 would split it
        assert_eq!(truncate_bytes("aéb", 2), "a");
        assert_eq!(truncate_bytes("aéb", 3), "aé");
        assert_eq!(truncate_bytes("abc", 10), "abc");
    }

    #[test]
    fn test_data_path_ends_with_kai() {
        assert!(get_data_path().ends_with(".kai"));
        assert!(get_history_path().parent().unwrap().ends_with(".kai"));
    }
}
