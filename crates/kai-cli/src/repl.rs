//! Interactive REPL.
//!
//! Uses `rustyline` for readline-style editing with persistent history.
//! Lines starting with `/` are local commands; everything else goes to the agent.

use anyhow::Result;
use colored::Colorize;
use rustyline::config::Configurer;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::debug;

use kai_agent::Agent;

use crate::helpers;

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

/// A local REPL command. Never sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ReplCommand {
    History,
    Clear,
    Remember(String),
    /// `None` shows the summary, `Some` replaces it.
    Summary(Option<String>),
    /// `None` shows the prompt, `Some` replaces it.
    System(Option<String>),
    Tools,
    Tool { name: String, input: String },
    Help,
    Unknown(String),
}

/// Parse a `/command`. Returns `None` for ordinary chat input.
fn parse_command(input: &str) -> Option<ReplCommand> {
    let rest = input.trim().strip_prefix('/')?;
    let (head, arg) = match rest.split_once(char::is_whitespace) {
        Some((h, a)) => (h, a.trim()),
        None => (rest, ""),
    };
    let arg_opt = (!arg.is_empty()).then(|| arg.to_string());

    let cmd = match head.to_lowercase().as_str() {
        "history" => ReplCommand::History,
        "clear" => ReplCommand::Clear,
        "remember" if !arg.is_empty() => ReplCommand::Remember(arg.to_string()),
        "summary" => ReplCommand::Summary(arg_opt),
        "system" => ReplCommand::System(arg_opt),
        "tools" => ReplCommand::Tools,
        "tool" if !arg.is_empty() => {
            let (name, input) = arg.split_once(char::is_whitespace).unwrap_or((arg, ""));
            ReplCommand::Tool {
                name: name.to_string(),
                input: input.trim().to_string(),
            }
        }
        "help" | "?" => ReplCommand::Help,
        _ => ReplCommand::Unknown(input.trim().to_string()),
    };
    Some(cmd)
}

/// Run the interactive REPL loop.
pub async fn run(agent: &Agent) -> Result<()> {
    helpers::print_banner(agent.display_name(), agent.client().model());

    let mut editor = create_editor()?;

    loop {
        let input = match editor.readline("You: ") {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted)
            | Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                helpers::print_error(&format!("input error: {e}"));
                break;
            }
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }

        if is_exit_command(trimmed) {
            println!("\nGoodbye!");
            break;
        }

        let _ = editor.add_history_entry(&input);

        if let Some(cmd) = parse_command(trimmed) {
            run_command(agent, cmd).await;
            continue;
        }

        debug!(agent = agent.display_name(), input = trimmed, "processing input");
        helpers::print_thinking();

        match agent.reply(trimmed).await {
            Ok(reply) => {
                helpers::clear_thinking();
                helpers::print_response(agent.display_name(), &reply);
            }
            Err(e) => {
                helpers::clear_thinking();
                helpers::print_error(&e.to_string());
            }
        }
    }

    save_history(&mut editor);

    Ok(())
}

async fn run_command(agent: &Agent, cmd: ReplCommand) {
    match cmd {
        ReplCommand::History => {
            let history = agent.history();
            if history.is_empty() {
                println!("{}", "(memory is empty)".dimmed());
            } else {
                println!("\n{history}\n");
            }
        }
        ReplCommand::Clear => {
            agent.clear_memory();
            println!("{} memory cleared", "✓".green());
        }
        ReplCommand::Remember(note) => {
            agent.remember(&note);
            println!("{} noted", "✓".green());
        }
        ReplCommand::Summary(None) => match agent.summary() {
            Some(summary) => println!("{summary}"),
            None => println!("{}", "(no summary)".dimmed()),
        },
        ReplCommand::Summary(Some(text)) => {
            agent.set_summary(Some(text));
            println!("{} summary set", "✓".green());
        }
        ReplCommand::System(None) => println!("{}", agent.system_prompt()),
        ReplCommand::System(Some(prompt)) => {
            agent.set_system_prompt(prompt);
            println!("{} system prompt updated", "✓".green());
        }
        ReplCommand::Tools => {
            for def in agent.tool_definitions() {
                let func = def.function;
                println!("  {:<12} {}", func.name.bold(), func.description.dimmed());
            }
        }
        ReplCommand::Tool { name, input } => {
            let output = agent.execute_tool(&name, &input).await;
            println!("{output}");
        }
        ReplCommand::Help => print_help(),
        ReplCommand::Unknown(raw) => {
            helpers::print_error(&format!("unknown command: {raw} (try /help)"));
        }
    }
}

fn print_help() {
    println!();
    println!("  {:<24} {}", "/history".bold(), "show remembered turns");
    println!("  {:<24} {}", "/clear".bold(), "forget everything");
    println!("  {:<24} {}", "/remember <note>".bold(), "add a note to memory");
    println!("  {:<24} {}", "/summary [text]".bold(), "show or set the summary");
    println!("  {:<24} {}", "/system [prompt]".bold(), "show or set the system prompt");
    println!("  {:<24} {}", "/tools".bold(), "list tools");
    println!("  {:<24} {}", "/tool <name> <input>".bold(), "run a tool directly");
    println!("  {:<24} {}", "exit".bold(), "leave");
    println!();
}

/// Create a rustyline editor with history.
fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded REPL history from {}", history_path.display());
    }

    Ok(editor)
}

/// Save history to disk.
fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

fn history_path() -> std::path::PathBuf {
    kai_core::utils::get_history_path().join("cli_history")
}

fn is_exit_command(input: &str) -> bool {
    let lower = input.to_lowercase();
    EXIT_COMMANDS.contains(&lower.as_str())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_commands() {
        assert!(is_exit_command("exit"));
        assert!(is_exit_command("EXIT"));
        assert!(is_exit_command("/quit"));
        assert!(is_exit_command(":q"));
        assert!(!is_exit_command("hello"));
        assert!(!is_exit_command(""));
    }

    #[test]
    fn history_path_under_data_dir() {
        let path = history_path();
        assert!(path.to_string_lossy().contains(".kai"));
        assert!(path.ends_with("history/cli_history"));
    }

    #[test]
    fn plain_input_is_not_a_command() {
        assert_eq!(parse_command("what is 2+2?"), None);
        assert_eq!(parse_command("TOOL:calculator:2+2"), None);
    }

    #[test]
    fn parse_simple_commands() {
        assert_eq!(parse_command("/history"), Some(ReplCommand::History));
        assert_eq!(parse_command("/CLEAR"), Some(ReplCommand::Clear));
        assert_eq!(parse_command("/tools"), Some(ReplCommand::Tools));
        assert_eq!(parse_command("/?"), Some(ReplCommand::Help));
    }

    #[test]
    fn parse_commands_with_arguments() {
        assert_eq!(
            parse_command("/remember  the user likes tea "),
            Some(ReplCommand::Remember("the user likes tea".into()))
        );
        assert_eq!(parse_command("/summary"), Some(ReplCommand::Summary(None)));
        assert_eq!(
            parse_command("/system Be terse."),
            Some(ReplCommand::System(Some("Be terse.".into())))
        );
        assert_eq!(
            parse_command("/tool calculator 2 + 3 * 4"),
            Some(ReplCommand::Tool {
                name: "calculator".into(),
                input: "2 + 3 * 4".into()
            })
        );
        assert_eq!(
            parse_command("/tool time.now"),
            Some(ReplCommand::Tool {
                name: "time.now".into(),
                input: String::new()
            })
        );
    }

    #[test]
    fn missing_argument_is_unknown() {
        assert_eq!(
            parse_command("/remember"),
            Some(ReplCommand::Unknown("/remember".into()))
        );
        assert_eq!(
            parse_command("/frobnicate x"),
            Some(ReplCommand::Unknown("/frobnicate x".into()))
        );
    }
}
