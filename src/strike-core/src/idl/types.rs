use crate::error::idl::ParseTypeError;
use candid::types::{Type, TypeInner};
use std::fmt;

/// The closed set of types an action may declare.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum IdlType {
    Principal,
    Text,
    Nat,
    Nat8,
    Nat16,
    Nat32,
    Nat64,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Bool,
    Null,
    Vec(Box<IdlType>),
    Opt(Box<IdlType>),
}

/// Parses descriptors such as `"Vec Principal"` or `"nat64"`.
///
/// Wrappers are peeled first, then the remaining word is matched
/// case-insensitively against the base types.
pub fn parse_type(descriptor: &str) -> Result<IdlType, ParseTypeError> {
    let trimmed = descriptor.trim();
    if trimmed.is_empty() {
        return Err(ParseTypeError::Empty);
    }

    if let Some((keyword, rest)) = trimmed.split_once(char::is_whitespace) {
        let wrap: fn(Box<IdlType>) -> IdlType = match keyword.to_ascii_lowercase().as_str() {
            "vec" => IdlType::Vec,
            "opt" => IdlType::Opt,
            _ => return Err(ParseTypeError::UnknownType(descriptor.to_string())),
        };
        // Errors name the whole descriptor, not just the inner word.
        return parse_type(rest)
            .map(|inner| wrap(Box::new(inner)))
            .map_err(|_| ParseTypeError::UnknownType(descriptor.to_string()));
    }

    let ty = match trimmed.to_ascii_lowercase().as_str() {
        "principal" => IdlType::Principal,
        "text" => IdlType::Text,
        "nat" => IdlType::Nat,
        "nat8" => IdlType::Nat8,
        "nat16" => IdlType::Nat16,
        "nat32" => IdlType::Nat32,
        "nat64" => IdlType::Nat64,
        "int" => IdlType::Int,
        "int8" => IdlType::Int8,
        "int16" => IdlType::Int16,
        "int32" => IdlType::Int32,
        "int64" => IdlType::Int64,
        "float32" => IdlType::Float32,
        "float64" => IdlType::Float64,
        "bool" => IdlType::Bool,
        "null" => IdlType::Null,
        _ => return Err(ParseTypeError::UnknownType(descriptor.to_string())),
    };
    Ok(ty)
}

impl IdlType {
    pub fn is_vec(&self) -> bool {
        matches!(self, IdlType::Vec(_))
    }

    pub fn to_candid(&self) -> Type {
        match self {
            IdlType::Principal => TypeInner::Principal.into(),
            IdlType::Text => TypeInner::Text.into(),
            IdlType::Nat => TypeInner::Nat.into(),
            IdlType::Nat8 => TypeInner::Nat8.into(),
            IdlType::Nat16 => TypeInner::Nat16.into(),
            IdlType::Nat32 => TypeInner::Nat32.into(),
            IdlType::Nat64 => TypeInner::Nat64.into(),
            IdlType::Int => TypeInner::Int.into(),
            IdlType::Int8 => TypeInner::Int8.into(),
            IdlType::Int16 => TypeInner::Int16.into(),
            IdlType::Int32 => TypeInner::Int32.into(),
            IdlType::Int64 => TypeInner::Int64.into(),
            IdlType::Float32 => TypeInner::Float32.into(),
            IdlType::Float64 => TypeInner::Float64.into(),
            IdlType::Bool => TypeInner::Bool.into(),
            IdlType::Null => TypeInner::Null.into(),
            IdlType::Vec(inner) => TypeInner::Vec(inner.to_candid()).into(),
            IdlType::Opt(inner) => TypeInner::Opt(inner.to_candid()).into(),
        }
    }
}

impl fmt::Display for IdlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdlType::Vec(inner) => write!(f, "Vec {inner}"),
            IdlType::Opt(inner) => write!(f, "Opt {inner}"),
            base => {
                let name = match base {
                    IdlType::Principal => "Principal",
                    IdlType::Text => "Text",
                    IdlType::Nat => "Nat",
                    IdlType::Nat8 => "Nat8",
                    IdlType::Nat16 => "Nat16",
                    IdlType::Nat32 => "Nat32",
                    IdlType::Nat64 => "Nat64",
                    IdlType::Int => "Int",
                    IdlType::Int8 => "Int8",
                    IdlType::Int16 => "Int16",
                    IdlType::Int32 => "Int32",
                    IdlType::Int64 => "Int64",
                    IdlType::Float32 => "Float32",
                    IdlType::Float64 => "Float64",
                    IdlType::Bool => "Bool",
                    _ => "Null",
                };
                f.write_str(name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn vec_of_principal() {
        assert_eq!(
            parse_type("Vec Principal"),
            Ok(IdlType::Vec(Box::new(IdlType::Principal)))
        );
    }

    #[test]
    fn nat64_is_unsigned_64_bit() {
        assert_eq!(parse_type("Nat64"), Ok(IdlType::Nat64));
        assert_eq!(
            parse_type("Nat64").unwrap().to_candid(),
            Type::from(TypeInner::Nat64)
        );
    }

    #[test]
    fn keywords_are_case_insensitive_and_trimmed() {
        assert_eq!(
            parse_type("  vec   VEC text "),
            Ok(IdlType::Vec(Box::new(IdlType::Vec(Box::new(IdlType::Text)))))
        );
        assert_eq!(
            parse_type("opt nat"),
            Ok(IdlType::Opt(Box::new(IdlType::Nat)))
        );
    }

    #[test]
    fn unknown_types_are_reported_whole() {
        assert_eq!(
            parse_type("Frobnicate"),
            Err(ParseTypeError::UnknownType("Frobnicate".to_string()))
        );
        assert_eq!(
            parse_type("Vec Frobnicate"),
            Err(ParseTypeError::UnknownType("Vec Frobnicate".to_string()))
        );
        assert_eq!(
            parse_type("Record Text"),
            Err(ParseTypeError::UnknownType("Record Text".to_string()))
        );
        assert_eq!(parse_type("   "), Err(ParseTypeError::Empty));
        assert_eq!(
            parse_type("Frobnicate").unwrap_err().to_string(),
            "Unknown type: Frobnicate"
        );
    }

    fn base_type() -> impl Strategy<Value = IdlType> {
        prop_oneof![
            Just(IdlType::Principal),
            Just(IdlType::Text),
            Just(IdlType::Nat),
            Just(IdlType::Nat8),
            Just(IdlType::Nat64),
            Just(IdlType::Int32),
            Just(IdlType::Float64),
            Just(IdlType::Bool),
            Just(IdlType::Null),
        ]
    }

    fn any_type() -> impl Strategy<Value = IdlType> {
        base_type().prop_recursive(4, 8, 1, |inner| {
            prop_oneof![
                inner.clone().prop_map(|t| IdlType::Vec(Box::new(t))),
                inner.prop_map(|t| IdlType::Opt(Box::new(t))),
            ]
        })
    }

    proptest! {
        #[test]
        fn display_is_parseable(ty in any_type(), upper in any::<bool>()) {
            let text = ty.to_string();
            let text = if upper { text.to_uppercase() } else { text.to_lowercase() };
            prop_assert_eq!(parse_type(&text), Ok(ty));
        }
    }
}
