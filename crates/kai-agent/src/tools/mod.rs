//! Tool modules for the Kai agent.

pub mod base;
pub mod calculator;
pub mod clock;
pub mod context;
pub mod registry;
pub mod web;

use std::sync::Arc;

pub use base::{argument_or_raw, parse_arguments, FnTool, Tool};
pub use calculator::CalculatorTool;
pub use clock::{DateTimeTool, TimeNowTool};
pub use context::{AgentHandle, Scratch, ToolContext};
pub use registry::{ToolOutcome, ToolRegistry};
pub use web::HttpGetTool;

/// All built-in tools, in a stable order.
pub fn builtin_tools() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(CalculatorTool),
        Arc::new(DateTimeTool),
        Arc::new(TimeNowTool),
        Arc::new(HttpGetTool::new()),
    ]
}
