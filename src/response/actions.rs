//! Action-list parsing of extracted output text.

use serde_json::Value;

use crate::{DprError, Result};

const FENCE: &str = "```";
const LINE_FENCE: &str = "\n```";

/// Remove a markdown code fence around `text`, if there is one.
///
/// Only a fence that opens the text, or opens a line after leading prose,
/// counts; backticks inside the JSON itself are left alone. The closing fence
/// is the last one in the text and an info string such as `json` on the
/// opening line is dropped. An unterminated fence keeps everything after the
/// opening line.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let start = if trimmed.starts_with(FENCE) {
        0
    } else {
        match trimmed.find(LINE_FENCE) {
            Some(newline) => newline + 1,
            None => return trimmed,
        }
    };
    let after_open = &trimmed[start + FENCE.len()..];
    let body = match after_open.find('\n') {
        Some(newline) if is_info_string(&after_open[..newline]) => &after_open[newline + 1..],
        _ => after_open.strip_prefix("json").unwrap_or(after_open),
    };
    let body = match body.rfind(FENCE) {
        Some(end) => &body[..end],
        None => body,
    };
    body.trim()
}

fn is_info_string(line: &str) -> bool {
    line.trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Parse extracted output text into an ordered list of raw actions.
///
/// A bare object becomes a one-element list. Blank text is
/// [`DprError::EmptyOutput`], malformed JSON is [`DprError::Decode`], and an
/// empty list or a non-list, non-object value is [`DprError::NoActions`].
pub fn parse_actions(text: &str) -> Result<Vec<Value>> {
    let cleaned = strip_code_fence(text);
    if cleaned.is_empty() {
        return Err(DprError::EmptyOutput);
    }

    let parsed: Value = serde_json::from_str(cleaned).map_err(DprError::Decode)?;
    let actions = match parsed {
        Value::Array(items) => items,
        object @ Value::Object(_) => vec![object],
        _ => Vec::new(),
    };

    if actions.is_empty() {
        return Err(DprError::NoActions);
    }
    tracing::debug!(count = actions.len(), "parsed actions");
    Ok(actions)
}
