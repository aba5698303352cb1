//! Clock tools: current date/time, optionally in a given timezone.

use async_trait::async_trait;
use chrono::{Local, Utc};
use serde_json::{json, Value};

use super::base::{argument_or_raw, Tool};
use super::context::ToolContext;

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ─────────────────────────────────────────────
// datetime
// ─────────────────────────────────────────────

/// Current date and time, in local time or an IANA timezone.
pub struct DateTimeTool;

#[async_trait]
impl Tool for DateTimeTool {
    fn name(&self) -> &str {
        "datetime"
    }

    fn description(&self) -> &str {
        "Gets current date and time information (input can be 'now', 'date', 'time', \
         or a timezone like 'UTC', 'America/New_York')"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "timezone": {
                    "type": "string",
                    "description": "IANA timezone name, or 'now' for local time"
                }
            }
        })
    }

    async fn execute(&self, input: &str, _ctx: &mut ToolContext<'_>) -> anyhow::Result<String> {
        let zone = argument_or_raw(input, "timezone");

        match zone.to_lowercase().as_str() {
            "" | "now" | "date" | "time" | "local" => Ok(format!(
                "Current date/time in local time: {}",
                Local::now().format(DISPLAY_FORMAT)
            )),
            _ => {
                let tz: chrono_tz::Tz = zone.parse().map_err(|_| {
                    anyhow::anyhow!(
                        "Invalid timezone '{zone}'. Use 'now' or a valid timezone ID \
                         (e.g., 'UTC', 'America/New_York')"
                    )
                })?;
                Ok(format!(
                    "Current date/time in {}: {}",
                    tz.name(),
                    Utc::now().with_timezone(&tz).format(DISPLAY_FORMAT)
                ))
            }
        }
    }
}

// ─────────────────────────────────────────────
// time.now
// ─────────────────────────────────────────────

/// Current local time as an RFC 3339 timestamp.
pub struct TimeNowTool;

#[async_trait]
impl Tool for TimeNowTool {
    fn name(&self) -> &str {
        "time.now"
    }

    fn description(&self) -> &str {
        "Return the current ISO-8601 time."
    }

    fn parameters(&self) -> Value {
        json!({"type": "object", "properties": {}, "additionalProperties": false})
    }

    async fn execute(&self, _input: &str, _ctx: &mut ToolContext<'_>) -> anyhow::Result<String> {
        Ok(Local::now().to_rfc3339())
    }
}
