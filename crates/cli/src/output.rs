//! Printing command results.

use serde::Serialize;

/// Print `value` as JSON, or through `human` for a terminal.
pub fn emit<T: Serialize + ?Sized>(json: bool, value: &T, human: impl FnOnce(&T)) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        human(value);
    }
    Ok(())
}

/// One-line acknowledgement of a change.
pub fn done(json: bool, message: &str) -> anyhow::Result<()> {
    emit(json, &serde_json::json!({ "ok": true, "message": message }), |_| {
        println!("{message}")
    })
}

pub fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}
