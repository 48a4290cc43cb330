use serde_json::Value;

use crate::error::CliError;

/// Print one JSON document to stdout. Absent records print as `null`, a
/// deliberate output shape rather than an error.
pub fn render(value: &Value, pretty: bool) -> Result<(), CliError> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{rendered}");
    Ok(())
}
