use crate::error::idl::MarshalError;
use crate::idl::types::IdlType;
use candid::{IDLArgs, IDLValue, Int, Nat, Principal};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Template token replaced by the caller's principal.
pub const PRINCIPAL_PLACEHOLDER: &str = "principal";

/// A value staged by the user for one parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Single(String),
    Multi(Vec<String>),
}

impl ParameterValue {
    pub fn is_empty(&self) -> bool {
        match self {
            ParameterValue::Single(value) => value.trim().is_empty(),
            ParameterValue::Multi(values) => values.iter().all(|v| v.trim().is_empty()),
        }
    }

    /// The first value, for parameters that only take one.
    pub fn first(&self) -> Option<&str> {
        match self {
            ParameterValue::Single(value) => Some(value),
            ParameterValue::Multi(values) => values.first().map(String::as_str),
        }
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        ParameterValue::Single(value.to_string())
    }
}

impl From<Vec<String>> for ParameterValue {
    fn from(values: Vec<String>) -> Self {
        ParameterValue::Multi(values)
    }
}

/// Returns the parameter name when `token` is a `{name}` placeholder.
pub fn placeholder_name(token: &str) -> Option<&str> {
    token
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
}

/// A template token after placeholder substitution, before type coercion.
enum Raw {
    Text(String),
    List(Vec<String>),
    Json(Value),
}

/// Builds the positional arguments of a call.
///
/// Each template token is either a `{name}` placeholder, filled from
/// `values` (or with `caller` for `{principal}`), or a literal that is passed
/// through. The result is then coerced to the declared type at its position.
pub fn marshal_arguments(
    template: &[Value],
    types: &[IdlType],
    values: &BTreeMap<String, ParameterValue>,
    caller: Principal,
) -> Result<IDLArgs, MarshalError> {
    if template.len() != types.len() {
        return Err(MarshalError::ArityMismatch {
            expected: types.len(),
            actual: template.len(),
        });
    }

    let args = template
        .iter()
        .zip(types)
        .map(|(token, ty)| {
            let raw = substitute(token, values, caller)?;
            coerce(raw, ty)
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(IDLArgs::new(&args))
}

fn substitute(
    token: &Value,
    values: &BTreeMap<String, ParameterValue>,
    caller: Principal,
) -> Result<Raw, MarshalError> {
    let Value::String(text) = token else {
        return Ok(Raw::Json(token.clone()));
    };
    let Some(name) = placeholder_name(text) else {
        return Ok(Raw::Text(text.clone()));
    };
    match values.get(name) {
        Some(ParameterValue::Single(value)) => Ok(Raw::Text(value.clone())),
        Some(ParameterValue::Multi(values)) => Ok(Raw::List(values.clone())),
        None if name == PRINCIPAL_PLACEHOLDER => Ok(Raw::Text(caller.to_text())),
        None => Err(MarshalError::MissingValue(name.to_string())),
    }
}

fn coerce(raw: Raw, ty: &IdlType) -> Result<IDLValue, MarshalError> {
    match ty {
        IdlType::Vec(inner) => {
            let items = match raw {
                Raw::List(values) => values.into_iter().map(Raw::Text).collect(),
                Raw::Json(Value::Array(values)) => values.into_iter().map(Raw::Json).collect(),
                single => vec![single],
            };
            let items = items
                .into_iter()
                .map(|item| coerce(item, inner))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(IDLValue::Vec(items))
        }
        IdlType::Opt(inner) => match raw {
            Raw::Json(Value::Null) => Ok(IDLValue::None),
            Raw::Text(text) if text.trim().is_empty() => Ok(IDLValue::None),
            Raw::List(values) if values.is_empty() => Ok(IDLValue::None),
            raw => Ok(IDLValue::Opt(Box::new(coerce(raw, inner)?))),
        },
        base => {
            let text = scalar_text(raw, base)?;
            coerce_scalar(&text, base)
        }
    }
}

fn scalar_text(raw: Raw, ty: &IdlType) -> Result<String, MarshalError> {
    match raw {
        Raw::Text(text) => Ok(text),
        Raw::Json(Value::String(text)) => Ok(text),
        Raw::Json(Value::Number(number)) => Ok(number.to_string()),
        Raw::Json(Value::Bool(flag)) => Ok(flag.to_string()),
        Raw::Json(Value::Null) if *ty == IdlType::Null => Ok(String::new()),
        Raw::List(mut values) if values.len() == 1 => Ok(values.remove(0)),
        Raw::List(values) => Err(invalid(&values.join(","), ty)),
        Raw::Json(other) => Err(invalid(&other.to_string(), ty)),
    }
}

fn coerce_scalar(text: &str, ty: &IdlType) -> Result<IDLValue, MarshalError> {
    let trimmed = text.trim();
    let value = match ty {
        IdlType::Text => IDLValue::Text(text.to_string()),
        IdlType::Principal => IDLValue::Principal(
            Principal::from_text(trimmed)
                .map_err(|err| MarshalError::InvalidPrincipal(trimmed.to_string(), err))?,
        ),
        IdlType::Nat => IDLValue::Nat(Nat::from_str(trimmed).map_err(|_| invalid(text, ty))?),
        IdlType::Nat8 => IDLValue::Nat8(parse(text, ty)?),
        IdlType::Nat16 => IDLValue::Nat16(parse(text, ty)?),
        IdlType::Nat32 => IDLValue::Nat32(parse(text, ty)?),
        IdlType::Nat64 => IDLValue::Nat64(parse(text, ty)?),
        IdlType::Int => IDLValue::Int(Int::from_str(trimmed).map_err(|_| invalid(text, ty))?),
        IdlType::Int8 => IDLValue::Int8(parse(text, ty)?),
        IdlType::Int16 => IDLValue::Int16(parse(text, ty)?),
        IdlType::Int32 => IDLValue::Int32(parse(text, ty)?),
        IdlType::Int64 => IDLValue::Int64(parse(text, ty)?),
        IdlType::Float32 => IDLValue::Float32(parse(text, ty)?),
        IdlType::Float64 => IDLValue::Float64(parse(text, ty)?),
        IdlType::Bool => match trimmed.to_ascii_lowercase().as_str() {
            "true" => IDLValue::Bool(true),
            "false" => IDLValue::Bool(false),
            _ => return Err(invalid(text, ty)),
        },
        IdlType::Null => IDLValue::Null,
        IdlType::Vec(_) | IdlType::Opt(_) => return Err(invalid(text, ty)),
    };
    Ok(value)
}

/// Parses a fixed-width number; out-of-range input is rejected, not wrapped.
fn parse<T: FromStr>(text: &str, ty: &IdlType) -> Result<T, MarshalError> {
    text.trim().parse().map_err(|_| invalid(text, ty))
}

fn invalid(value: &str, ty: &IdlType) -> MarshalError {
    MarshalError::InvalidValue {
        value: value.to_string(),
        ty: ty.to_string(),
    }
}
