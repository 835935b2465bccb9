use crate::action::spec::{
    ActionPostRequest, LinkedAction, ParameterBound, ParameterType, TypedActionParameter,
};
use crate::error::action::ValidationError;
use crate::idl::ParameterValue;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use std::collections::BTreeMap;

/// What `encodeURIComponent` leaves alone.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComponentKind {
    /// No input: one click invokes it.
    Button,
    SingleValue,
    /// One `checkbox` or `multiselect` parameter.
    MultiValue,
    Form,
}

impl ComponentKind {
    fn of(parameters: &[TypedActionParameter]) -> Self {
        match parameters {
            [] => ComponentKind::Button,
            [single] if single.kind.is_multi_value() => ComponentKind::MultiValue,
            [_] => ComponentKind::SingleValue,
            _ => ComponentKind::Form,
        }
    }
}

/// A linked action plus the values the user staged for it.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionComponent {
    index: usize,
    kind: ComponentKind,
    linked: LinkedAction,
    values: BTreeMap<String, ParameterValue>,
}

impl ActionComponent {
    pub fn new(index: usize, linked: LinkedAction) -> Self {
        ActionComponent {
            index,
            kind: ComponentKind::of(&linked.parameters),
            linked,
            values: BTreeMap::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.linked.label
    }

    pub fn linked_action(&self) -> &LinkedAction {
        &self.linked
    }

    pub fn parameters(&self) -> &[TypedActionParameter] {
        &self.linked.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&TypedActionParameter> {
        self.linked.parameters.iter().find(|p| p.name == name)
    }

    pub fn values(&self) -> &BTreeMap<String, ParameterValue> {
        &self.values
    }

    /// Stages `value` for `name`, shaped to what the parameter takes: a
    /// single-value parameter keeps only the first of several values, a
    /// multi-value one wraps a single value in a list.
    pub fn set_value(&mut self, name: &str, value: ParameterValue) -> Result<(), ValidationError> {
        let parameter = self
            .parameter(name)
            .ok_or_else(|| ValidationError::UnknownParameter(name.to_string()))?;
        let multi = parameter.kind.is_multi_value() || parameter.is_array;
        let value = match (multi, value) {
            (false, ParameterValue::Multi(values)) => {
                ParameterValue::Single(values.into_iter().next().unwrap_or_default())
            }
            (true, ParameterValue::Single(value)) => ParameterValue::Multi(vec![value]),
            (_, value) => value,
        };
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    pub fn stage(&mut self, params: &BTreeMap<String, ParameterValue>) -> Result<(), ValidationError> {
        for (name, value) in params {
            self.set_value(name, value.clone())?;
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// The link template with every `{name}` replaced by its staged value,
    /// trimmed and percent-encoded. Lists are comma-joined.
    pub fn href(&self) -> Option<String> {
        let template = self.linked.href.as_ref()?;
        let mut href = template.clone();
        for parameter in &self.linked.parameters {
            let placeholder = format!("{{{}}}", parameter.name);
            if !href.contains(&placeholder) {
                continue;
            }
            let encoded = match self.values.get(&parameter.name) {
                Some(ParameterValue::Single(value)) => encode(value),
                Some(ParameterValue::Multi(values)) => values
                    .iter()
                    .map(|v| encode(v))
                    .collect::<Vec<_>>()
                    .join(","),
                None => String::new(),
            };
            href = href.replace(&placeholder, &encoded);
        }
        Some(href)
    }

    /// The POST body; values already carried in the href are left out.
    pub fn build_body(&self, principal: &str) -> ActionPostRequest {
        let template = self.linked.href.as_deref().unwrap_or_default();
        let data: BTreeMap<String, ParameterValue> = self
            .linked
            .parameters
            .iter()
            .filter(|p| !template.contains(&format!("{{{}}}", p.name)))
            .map(|p| {
                let value = self.values.get(&p.name).cloned().unwrap_or_else(|| {
                    if p.kind.is_multi_value() || p.is_array {
                        ParameterValue::Multi(vec![])
                    } else {
                        ParameterValue::Single(String::new())
                    }
                });
                (p.name.clone(), value)
            })
            .collect();
        ActionPostRequest {
            principal: principal.to_string(),
            data: if data.is_empty() { None } else { Some(data) },
        }
    }

    /// Checks every parameter against its constraints.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for parameter in &self.linked.parameters {
            match self.values.get(&parameter.name) {
                Some(value) if !value.is_empty() => validate_value(parameter, value)?,
                _ if parameter.required => {
                    return Err(ValidationError::Required(parameter.name.clone()))
                }
                _ => {}
            }
        }
        Ok(())
    }
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value.trim(), COMPONENT).to_string()
}

fn validate_value(
    parameter: &TypedActionParameter,
    value: &ParameterValue,
) -> Result<(), ValidationError> {
    let name = &parameter.name;
    let values: Vec<&str> = match value {
        ParameterValue::Single(v) => vec![v.as_str()],
        ParameterValue::Multi(vs) => vs.iter().map(String::as_str).collect(),
    };

    if parameter.kind.is_selectable() && !parameter.options.is_empty() {
        if let Some(bad) = values
            .iter()
            .find(|v| !parameter.options.iter().any(|o| o.value == **v))
        {
            return Err(ValidationError::InvalidOption {
                name: name.clone(),
                value: bad.to_string(),
            });
        }
    }

    if let Some(pattern) = pattern_of(parameter) {
        if values.iter().any(|v| !pattern.is_match(v)) {
            return Err(ValidationError::PatternMismatch {
                name: name.clone(),
                description: parameter.pattern_description.clone(),
            });
        }
    }

    match parameter.kind {
        ParameterType::Number => {
            for v in &values {
                let number: f64 = v
                    .trim()
                    .parse()
                    .map_err(|_| ValidationError::NotANumber(name.clone()))?;
                check_bounds(parameter, |bound| match bound {
                    ParameterBound::Number(b) => number.partial_cmp(b),
                    ParameterBound::Text(b) => b.parse::<f64>().ok().and_then(|b| number.partial_cmp(&b)),
                })?;
            }
        }
        ParameterType::Date | ParameterType::DatetimeLocal => {
            // ISO dates order lexicographically.
            for v in &values {
                check_bounds(parameter, |bound| match bound {
                    ParameterBound::Text(b) => Some(v.trim().cmp(b.as_str())),
                    ParameterBound::Number(_) => None,
                })?;
            }
        }
        ParameterType::Checkbox | ParameterType::Multiselect => {
            let count = values.len() as f64;
            check_bounds(parameter, |bound| match bound {
                ParameterBound::Number(b) => count.partial_cmp(b),
                ParameterBound::Text(_) => None,
            })?;
        }
        _ => {}
    }
    Ok(())
}

/// Anchored pattern; patterns that do not compile are not enforced, and
/// selectable kinds never carry one.
fn pattern_of(parameter: &TypedActionParameter) -> Option<Regex> {
    if parameter.kind.is_selectable() {
        return None;
    }
    let pattern = parameter.pattern.as_ref()?;
    Regex::new(&format!("^(?:{pattern})$")).ok()
}

fn check_bounds<F>(parameter: &TypedActionParameter, compare: F) -> Result<(), ValidationError>
where
    F: Fn(&ParameterBound) -> Option<std::cmp::Ordering>,
{
    use std::cmp::Ordering;
    if let Some(min) = &parameter.min {
        if compare(min) == Some(Ordering::Less) {
            return Err(ValidationError::BelowMin {
                name: parameter.name.clone(),
                min: min.to_string(),
            });
        }
    }
    if let Some(max) = &parameter.max {
        if compare(max) == Some(Ordering::Greater) {
            return Err(ValidationError::AboveMax {
                name: parameter.name.clone(),
                max: max.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::spec::ParameterOption;
    use serde_json::json;

    fn component(value: serde_json::Value) -> ActionComponent {
        ActionComponent::new(0, serde_json::from_value(value).unwrap())
    }

    fn transfer(kind: &str) -> ActionComponent {
        component(json!({
            "label": "Transfer",
            "href": "https://example.com/transfer/{amount}",
            "method": "transfer",
            "parameters": [{ "name": "amount", "type": kind }],
            "signatures": { "input": ["Text"], "output": [] }
        }))
    }

    #[test]
    fn kinds_follow_parameter_count() {
        let button = component(json!({ "label": "Go", "method": "go" }));
        assert_eq!(button.kind(), ComponentKind::Button);
        assert_eq!(transfer("text").kind(), ComponentKind::SingleValue);
        assert_eq!(transfer("checkbox").kind(), ComponentKind::MultiValue);
        let form = component(json!({
            "label": "Send",
            "method": "send",
            "parameters": [{ "name": "to" }, { "name": "amount" }]
        }));
        assert_eq!(form.kind(), ComponentKind::Form);
    }

    #[test]
    fn href_substitutes_a_single_value() {
        let mut c = transfer("text");
        c.set_value("amount", " 5 ".into()).unwrap();
        assert_eq!(c.href().as_deref(), Some("https://example.com/transfer/5"));
    }

    #[test]
    fn href_joins_and_encodes_lists() {
        let mut c = transfer("checkbox");
        c.set_value("amount", vec!["5".to_string(), "6".to_string()].into())
            .unwrap();
        assert_eq!(c.href().as_deref(), Some("https://example.com/transfer/5,6"));

        c.set_value("amount", vec!["a b".to_string(), "c/d".to_string()].into())
            .unwrap();
        assert_eq!(
            c.href().as_deref(),
            Some("https://example.com/transfer/a%20b,c%2Fd")
        );
    }

    #[test]
    fn single_value_keeps_first_of_many() {
        let mut c = transfer("text");
        c.set_value("amount", vec!["7".to_string(), "8".to_string()].into())
            .unwrap();
        assert_eq!(c.values()["amount"], ParameterValue::Single("7".to_string()));
        assert_eq!(
            c.set_value("other", "1".into()),
            Err(ValidationError::UnknownParameter("other".to_string()))
        );
    }

    #[test]
    fn body_skips_values_already_in_href() {
        let mut c = transfer("text");
        c.set_value("amount", "5".into()).unwrap();
        assert_eq!(c.build_body("2vxsx-fae").data, None);

        let mut form = component(json!({
            "label": "Send",
            "href": "/send/{to}",
            "method": "send",
            "parameters": [{ "name": "to" }, { "name": "memo" }]
        }));
        form.set_value("to", "alice".into()).unwrap();
        let body = form.build_body("2vxsx-fae");
        let data = body.data.unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data["memo"], ParameterValue::Single(String::new()));
    }

    #[test]
    fn required_fields_must_be_filled() {
        let mut form = component(json!({
            "label": "Send",
            "method": "send",
            "parameters": [
                { "name": "to", "required": true },
                { "name": "memo", "required": true }
            ]
        }));
        form.set_value("to", "alice".into()).unwrap();
        form.set_value("memo", "   ".into()).unwrap();
        assert_eq!(
            form.validate(),
            Err(ValidationError::Required("memo".to_string()))
        );
    }

    #[test]
    fn pattern_and_bounds_are_enforced() {
        let mut c = component(json!({
            "label": "Bet",
            "method": "bet",
            "parameters": [{
                "name": "amount", "type": "number", "min": 1, "max": 100,
                "pattern": "[0-9]+", "patternDescription": "whole numbers only"
            }]
        }));
        c.set_value("amount", "5".into()).unwrap();
        assert_eq!(c.validate(), Ok(()));

        c.set_value("amount", "5.5".into()).unwrap();
        let err = c.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "'amount' does not match the expected format: whole numbers only"
        );

        c.set_value("amount", "0".into()).unwrap();
        assert!(matches!(c.validate(), Err(ValidationError::BelowMin { .. })));
        c.set_value("amount", "101".into()).unwrap();
        assert!(matches!(c.validate(), Err(ValidationError::AboveMax { .. })));
    }

    #[test]
    fn options_restrict_selectable_values() {
        let mut c = transfer("select");
        let mut linked = c.linked_action().clone();
        linked.parameters[0].options = vec![ParameterOption {
            label: "Five".to_string(),
            value: "5".to_string(),
            selected: false,
        }];
        c = ActionComponent::new(0, linked);
        c.set_value("amount", "6".into()).unwrap();
        assert_eq!(
            c.validate(),
            Err(ValidationError::InvalidOption {
                name: "amount".to_string(),
                value: "6".to_string()
            })
        );
    }
}
