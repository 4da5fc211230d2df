//! Pipeline response interpretation.
//!
//! - [`extract_output_text`] - Locate the output text among candidate keys
//! - [`parse_actions`] - Strip markdown fencing and decode the action list

pub mod actions;
pub mod extract;

pub use actions::{parse_actions, strip_code_fence};
pub use extract::{extract_output_text, OUTPUT_CANDIDATES};

use serde_json::Value;

use crate::Result;

/// Output extraction followed by action-list parsing.
pub fn interpret_response(response: &Value) -> Result<Vec<Value>> {
    let text = extract_output_text(response)?;
    parse_actions(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DprError;
    use serde_json::json;

    #[test]
    fn fenced_empty_list_is_no_actions() {
        let response = json!({"success": true, "data": {"result": {"output": "```json\n[]\n```"}}});
        assert!(matches!(
            interpret_response(&response),
            Err(DprError::NoActions)
        ));
    }

    #[test]
    fn nested_output_is_parsed() {
        let response = json!({
            "success": true,
            "data": {"outputs": {"output": "```json\n[{\"type\":\"frame\"},{\"type\":\"text\"}]\n```"}}
        });
        let actions = interpret_response(&response).expect("actions");
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[1], json!({"type": "text"}));
    }
}
