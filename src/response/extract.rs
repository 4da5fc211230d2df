//! Output extraction from pipeline responses.

use serde_json::Value;

use crate::{DprError, Result};

/// Candidate locations for the output text, probed in order.
pub const OUTPUT_CANDIDATES: [&[&str]; 5] = [
    &["data", "output"],
    &["data", "outputs"],
    &["data", "result", "output"],
    &["data", "result", "outputs"],
    &["data", "result"],
];

const PREFERRED_KEYS: [&str; 4] = ["output", "Response", "response", "text"];

/// Locate the instruction text inside a pipeline response.
///
/// Fails with the response's own error message when `success` is not truthy,
/// and with [`DprError::NoActions`] when no candidate yields text. The text is
/// returned exactly as found; fence stripping happens in the action parser.
pub fn extract_output_text(response: &Value) -> Result<String> {
    if !truthy(response.get("success")) {
        return Err(DprError::pipeline(None, error_message(response)));
    }

    let text = OUTPUT_CANDIDATES
        .iter()
        .filter_map(|path| lookup(response, path))
        .map(text_from)
        .find(|text| !text.is_empty())
        .ok_or(DprError::NoActions)?;

    tracing::debug!(output = %text, "extracted pipeline output");
    Ok(text)
}

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(*key))
}

fn non_blank(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.trim().is_empty())
}

/// Text carried by one candidate, or an empty string.
fn text_from(candidate: &Value) -> String {
    let found = match candidate {
        Value::String(text) => Some(text.as_str()),
        Value::Array(items) => items.iter().find_map(non_blank),
        Value::Object(map) => PREFERRED_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(non_blank))
            .or_else(|| map.values().find_map(non_blank)),
        _ => None,
    };
    found.unwrap_or_default().to_string()
}

/// JavaScript-style truthiness of an optional JSON value.
fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

fn error_message(response: &Value) -> String {
    match response.get("error") {
        Some(Value::String(message)) if !message.is_empty() => message.clone(),
        Some(other) if truthy(Some(other)) => other.to_string(),
        _ => "Unknown error".to_string(),
    }
}
