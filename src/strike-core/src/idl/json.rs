use candid::types::value::{IDLField, VariantValue};
use candid::types::Label;
use candid::{IDLArgs, IDLValue};
use serde_json::{json, Map, Number, Value};

/// Renders call results for display: one value as itself, none as `null`,
/// several as an array.
pub fn idl_args_to_json(args: &IDLArgs) -> Value {
    match args.args.as_slice() {
        [] => Value::Null,
        [single] => idl_value_to_json(single),
        many => Value::Array(many.iter().map(idl_value_to_json).collect()),
    }
}

/// 64-bit and unbounded integers become strings so no precision is lost.
pub fn idl_value_to_json(value: &IDLValue) -> Value {
    match value {
        IDLValue::Null | IDLValue::None | IDLValue::Reserved => Value::Null,
        IDLValue::Bool(b) => Value::Bool(*b),
        IDLValue::Text(text) => Value::String(text.clone()),
        IDLValue::Number(text) => Value::String(text.clone()),
        IDLValue::Nat(n) => Value::String(n.0.to_string()),
        IDLValue::Int(i) => Value::String(i.0.to_string()),
        IDLValue::Nat8(n) => json!(n),
        IDLValue::Nat16(n) => json!(n),
        IDLValue::Nat32(n) => json!(n),
        IDLValue::Nat64(n) => Value::String(n.to_string()),
        IDLValue::Int8(n) => json!(n),
        IDLValue::Int16(n) => json!(n),
        IDLValue::Int32(n) => json!(n),
        IDLValue::Int64(n) => Value::String(n.to_string()),
        IDLValue::Float32(f) => float(f64::from(*f)),
        IDLValue::Float64(f) => float(*f),
        IDLValue::Principal(p) => Value::String(p.to_text()),
        IDLValue::Service(p) => Value::String(p.to_text()),
        IDLValue::Func(p, method) => json!({ "principal": p.to_text(), "method": method }),
        IDLValue::Opt(inner) => idl_value_to_json(inner),
        IDLValue::Vec(items) => Value::Array(items.iter().map(idl_value_to_json).collect()),
        IDLValue::Blob(bytes) => Value::Array(bytes.iter().map(|b| json!(b)).collect()),
        IDLValue::Record(fields) => record(fields),
        IDLValue::Variant(VariantValue(field, _)) => record(std::slice::from_ref(field.as_ref())),
    }
}

fn float(f: f64) -> Value {
    Number::from_f64(f).map_or(Value::Null, Value::Number)
}

fn record(fields: &[IDLField]) -> Value {
    let mut map = Map::new();
    for field in fields {
        let key = match &field.id {
            Label::Named(name) => name.clone(),
            Label::Id(id) | Label::Unnamed(id) => id.to_string(),
        };
        map.insert(key, idl_value_to_json(&field.val));
    }
    Value::Object(map)
}
