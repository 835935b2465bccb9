use crate::action::spec::{ActionPostResponse, LinkedAction};
use crate::error::action::PayloadError;
use crate::idl::CallType;
use serde_json::Value;

/// Everything needed to invoke one canister method.
#[derive(Clone, Debug, PartialEq)]
pub struct InvocationPayload {
    pub method: String,
    pub call_type: CallType,
    pub input: Vec<String>,
    pub output: Vec<String>,
    /// Positional template: `{name}` placeholders and literals.
    pub input_parameters: Vec<Value>,
    pub message: Option<String>,
}

impl InvocationPayload {
    /// The payload of a linked action that has no href to post to.
    pub fn from_linked_action(linked: &LinkedAction) -> Self {
        InvocationPayload {
            method: linked.method.clone(),
            call_type: linked.call_type,
            input: linked.signatures.input.clone(),
            output: linked.signatures.output.clone(),
            input_parameters: linked.input_parameters.clone(),
            message: None,
        }
    }

    /// Fields the server leaves out fall back to the linked action.
    pub fn from_post_response(
        response: ActionPostResponse,
        linked: &LinkedAction,
    ) -> Result<Self, PayloadError> {
        let method = if response.method.is_empty() {
            linked.method.clone()
        } else {
            response.method
        };
        if method.is_empty() {
            return Err(PayloadError::DecodeFailed("method".to_string()));
        }
        let (input, output) = match response.signatures {
            Some(signatures) => (signatures.input, signatures.output),
            None if !response.input.is_empty() || !response.output.is_empty() => {
                (response.input, response.output)
            }
            None => (
                linked.signatures.input.clone(),
                linked.signatures.output.clone(),
            ),
        };
        let input_parameters = if response.parameters.is_empty() && !input.is_empty() {
            linked.input_parameters.clone()
        } else {
            response.parameters
        };
        Ok(InvocationPayload {
            method,
            call_type: response.call_type,
            input,
            output,
            input_parameters,
            message: response.message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn linked() -> LinkedAction {
        serde_json::from_value(json!({
            "label": "Tip",
            "href": "/api/tip/{amount}",
            "method": "tip",
            "type": "update",
            "parameters": [{ "name": "amount" }],
            "signatures": { "input": ["Nat"], "output": ["Text"] }
        }))
        .unwrap()
    }

    #[test]
    fn linked_action_payload_uses_its_template() {
        let payload = InvocationPayload::from_linked_action(&linked());
        assert_eq!(payload.method, "tip");
        assert_eq!(payload.input, vec!["Nat"]);
        assert_eq!(payload.input_parameters, vec![json!("{amount}")]);
    }

    #[test]
    fn post_response_overrides_the_linked_action() {
        let response: ActionPostResponse = serde_json::from_value(json!({
            "method": "tip_with_memo",
            "type": "update",
            "inputParameters": ["5", "thanks"],
            "input": ["Nat", "Text"],
            "output": ["Text"],
            "message": "Tipping 5"
        }))
        .unwrap();
        let payload = InvocationPayload::from_post_response(response, &linked()).unwrap();
        assert_eq!(payload.method, "tip_with_memo");
        assert_eq!(payload.input, vec!["Nat", "Text"]);
        assert_eq!(payload.input_parameters, vec![json!("5"), json!("thanks")]);
        assert_eq!(payload.message.as_deref(), Some("Tipping 5"));
    }

    #[test]
    fn sparse_post_response_falls_back() {
        let response: ActionPostResponse =
            serde_json::from_value(json!({ "method": "" })).unwrap();
        let payload = InvocationPayload::from_post_response(response, &linked()).unwrap();
        assert_eq!(payload.method, "tip");
        assert_eq!(payload.output, vec!["Text"]);
        assert_eq!(payload.input_parameters, vec![json!("{amount}")]);
    }
}
