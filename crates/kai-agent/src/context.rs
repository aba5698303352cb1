//! Prompt context construction.
//!
//! The system turn built here is sent to the model but never stored in memory.

use kai_core::types::Turn;

/// Prefix of the extra system line carrying the rolling summary.
pub const SUMMARY_PREFIX: &str = "Previous conversation summary: ";

/// `[System(prompt)] ++ [System(summary)]? ++ recent`.
pub fn build_context(system_content: &str, summary: Option<&str>, recent: Vec<Turn>) -> Vec<Turn> {
    let mut turns = Vec::with_capacity(recent.len() + 2);
    turns.push(Turn::system(system_content));
    if let Some(summary) = summary {
        turns.push(Turn::system(format!("{SUMMARY_PREFIX}{summary}")));
    }
    turns.extend(recent);
    turns
}

/// System prompt with a plain-text tool listing and the sentinel instructions.
///
/// Without tools the prompt is returned unchanged.
pub fn sentinel_system_content(system_prompt: &str, tools: &[(String, String)]) -> String {
    if tools.is_empty() {
        return system_prompt.to_string();
    }

    let mut listing = String::from("Available tools:\n");
    for (name, description) in tools {
        listing.push_str(&format!("- {name}: {description}\n"));
    }
    listing.push_str("\nTo use a tool, respond with: TOOL:toolname:input\n");
    listing.push_str("Example: TOOL:calculator:2+2");

    if system_prompt.is_empty() {
        listing
    } else {
        format!("{system_prompt}\n\n{listing}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kai_core::types::Role;

    #[test]
    fn test_context_without_summary() {
        let ctx = build_context("Be nice.", None, vec![Turn::user("hi")]);
        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx[0].role(), Role::System);
        assert_eq!(ctx[0].content(), "Be nice.");
        assert_eq!(ctx[1].content(), "hi");
    }

    #[test]
    fn test_context_with_summary() {
        let ctx = build_context("Be nice.", Some("talked about tea"), vec![Turn::user("hi")]);
        assert_eq!(ctx.len(), 3);
        assert_eq!(ctx[1].role(), Role::System);
        assert_eq!(ctx[1].content(), "Previous conversation summary: talked about tea");
    }

    #[test]
    fn test_sentinel_listing() {
        let tools = vec![
            ("calculator".to_string(), "Does math".to_string()),
            ("datetime".to_string(), "Tells time".to_string()),
        ];
        let content = sentinel_system_content("You are Kai.", &tools);
        assert!(content.starts_with("You are Kai.\n\nAvailable tools:\n"));
        assert!(content.contains("- calculator: Does math\n"));
        assert!(content.contains("- datetime: Tells time\n"));
        assert!(content.contains("TOOL:toolname:input"));
        assert!(content.ends_with("Example: TOOL:calculator:2+2"));
    }

    #[test]
    fn test_sentinel_without_tools_is_plain_prompt() {
        assert_eq!(sentinel_system_content("You are Kai.", &[]), "You are Kai.");
    }
}
