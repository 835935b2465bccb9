//! Wire types of the action protocol.
use crate::idl::{CallType, ParameterValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Prefix of a URL that points straight at an action API.
pub const ICP_ACTIONS_PROTOCOL: &str = "icp-action:";
/// Shorter form of [`ICP_ACTIONS_PROTOCOL`].
pub const ICP_PAY_PROTOCOL: &str = "icp:";

/// `/actions.json`: maps website paths to action API paths.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionsJson {
    pub rules: Vec<ActionRuleObject>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRuleObject {
    pub path_pattern: String,
    pub api_path: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    #[default]
    Action,
    Completed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionErrorMessage {
    pub message: String,
}

/// Body of the initial GET.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionGetResponse {
    #[serde(rename = "type", default)]
    pub kind: ActionKind,
    #[serde(default)]
    pub icon: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(alias = "canister_id")]
    pub canister_id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub actions: Vec<LinkedAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<ActionLinks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ActionErrorMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derivation_origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
}

impl ActionGetResponse {
    /// Linked actions from either the top level or the `links` object.
    pub fn linked_actions(&self) -> impl Iterator<Item = &LinkedAction> {
        self.actions
            .iter()
            .chain(self.links.iter().flat_map(|links| links.actions.iter()))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionLinks {
    #[serde(default)]
    pub actions: Vec<LinkedAction>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signatures {
    #[serde(default)]
    pub input: Vec<String>,
    #[serde(default)]
    pub output: Vec<String>,
}

/// One invocable entry of an action.
///
/// Accepts both the nested `signatures` layout and the flat
/// `input`/`output`/`uiParameters` layout emitted by action generators.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawLinkedAction")]
pub struct LinkedAction {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    pub method: String,
    #[serde(rename = "type")]
    pub call_type: CallType,
    pub parameters: Vec<TypedActionParameter>,
    pub signatures: Signatures,
    /// Positional call template: `{name}` placeholders and literals.
    pub input_parameters: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLinkedAction {
    label: String,
    #[serde(default)]
    href: Option<String>,
    #[serde(default, alias = "methos")]
    method: String,
    #[serde(rename = "type", default)]
    call_type: CallType,
    #[serde(default)]
    parameters: Vec<TypedActionParameter>,
    #[serde(default)]
    ui_parameters: Vec<UiParameter>,
    #[serde(default)]
    signatures: Option<Signatures>,
    #[serde(default)]
    input: Vec<String>,
    #[serde(default)]
    output: Vec<String>,
    #[serde(default)]
    input_parameters: Option<Vec<Value>>,
}

impl From<RawLinkedAction> for LinkedAction {
    fn from(raw: RawLinkedAction) -> Self {
        let mut parameters = raw.parameters;
        parameters.extend(raw.ui_parameters.into_iter().map(TypedActionParameter::from));
        let signatures = raw.signatures.unwrap_or(Signatures {
            input: raw.input,
            output: raw.output,
        });
        let input_parameters = raw.input_parameters.unwrap_or_else(|| {
            parameters
                .iter()
                .map(|p| Value::String(format!("{{{}}}", p.name)))
                .collect()
        });
        LinkedAction {
            label: raw.label,
            href: raw.href,
            method: raw.method,
            call_type: raw.call_type,
            parameters,
            signatures,
            input_parameters,
        }
    }
}

/// Parameter layout of generated actions: the candid type stands in for the
/// input kind.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UiParameter {
    name: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    candid_type: Option<String>,
    #[serde(default)]
    is_array: bool,
}

impl From<UiParameter> for TypedActionParameter {
    fn from(ui: UiParameter) -> Self {
        let candid_type = ui.candid_type.unwrap_or_default().to_ascii_lowercase();
        let kind = match candid_type.trim_start_matches("vec ").trim() {
            "nat" | "nat8" | "nat16" | "nat32" | "nat64" | "int" | "int8" | "int16" | "int32"
            | "int64" | "float32" | "float64" => ParameterType::Number,
            _ => ParameterType::Text,
        };
        TypedActionParameter {
            kind,
            name: ui.name,
            label: ui.label,
            required: true,
            pattern: None,
            pattern_description: None,
            min: None,
            max: None,
            options: vec![],
            is_array: ui.is_array || candid_type.starts_with("vec"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParameterType {
    #[default]
    Text,
    Email,
    Url,
    Number,
    Date,
    DatetimeLocal,
    Textarea,
    Select,
    Radio,
    Checkbox,
    Multiselect,
}

impl ParameterType {
    pub fn is_selectable(self) -> bool {
        matches!(
            self,
            ParameterType::Select
                | ParameterType::Radio
                | ParameterType::Checkbox
                | ParameterType::Multiselect
        )
    }

    /// Kinds whose staged value is a list.
    pub fn is_multi_value(self) -> bool {
        matches!(self, ParameterType::Checkbox | ParameterType::Multiselect)
    }
}

/// `min`/`max` are numbers for numeric inputs and strings for dates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterBound {
    Number(f64),
    Text(String),
}

impl std::fmt::Display for ParameterBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParameterBound::Number(n) => write!(f, "{n}"),
            ParameterBound::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterOption {
    pub label: String,
    pub value: String,
    #[serde(default)]
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedActionParameter {
    #[serde(rename = "type", default)]
    pub kind: ParameterType,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<ParameterBound>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<ParameterBound>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ParameterOption>,
    #[serde(default)]
    pub is_array: bool,
}

/// Body of the POST that turns staged input into an invocation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPostRequest {
    pub principal: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<BTreeMap<String, ParameterValue>>,
}

/// Body returned by the POST.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPostResponse {
    pub method: String,
    #[serde(rename = "type", default)]
    pub call_type: CallType,
    #[serde(default, alias = "inputParameters")]
    pub parameters: Vec<Value>,
    #[serde(default)]
    pub signatures: Option<Signatures>,
    #[serde(default)]
    pub input: Vec<String>,
    #[serde(default)]
    pub output: Vec<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_layout() {
        let linked: LinkedAction = serde_json::from_value(json!({
            "label": "Transfer",
            "href": "/api/transfer/{amount}",
            "methos": "transfer",
            "type": "update",
            "parameters": [{ "name": "amount", "label": "Amount", "required": true, "type": "number", "min": 1 }],
            "signatures": { "input": ["Nat"], "output": ["Text"] }
        }))
        .unwrap();
        assert_eq!(linked.method, "transfer");
        assert_eq!(linked.call_type, CallType::Update);
        assert_eq!(linked.parameters[0].kind, ParameterType::Number);
        assert_eq!(linked.parameters[0].min, Some(ParameterBound::Number(1.0)));
        assert_eq!(linked.input_parameters, vec![json!("{amount}")]);
    }

    #[test]
    fn flat_generator_layout() {
        let linked: LinkedAction = serde_json::from_value(json!({
            "label": "Bet Yes on Option 1",
            "method": "bet",
            "type": "update",
            "uiParameters": [{ "name": "bet_amount", "label": "Bet amount", "candidType": "Nat" }],
            "input": ["Text", "Nat32", "Text", "Nat"],
            "inputParameters": ["market1", 0, "Yes", "{bet_amount}"],
            "output": ["Text"]
        }))
        .unwrap();
        assert_eq!(linked.signatures.input, vec!["Text", "Nat32", "Text", "Nat"]);
        assert_eq!(linked.signatures.output, vec!["Text"]);
        assert_eq!(linked.parameters.len(), 1);
        assert_eq!(linked.parameters[0].kind, ParameterType::Number);
        assert!(linked.parameters[0].required);
        assert_eq!(linked.input_parameters[1], json!(0));
    }

    #[test]
    fn post_request_omits_empty_data() {
        let body = ActionPostRequest {
            principal: "2vxsx-fae".to_string(),
            data: None,
        };
        assert_eq!(serde_json::to_value(&body).unwrap(), json!({ "principal": "2vxsx-fae" }));
    }
}
