use crate::error::idl::InterfaceError;
use crate::idl::types::{parse_type, IdlType};
use candid::types::Type;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallType {
    Query,
    #[default]
    Update,
}

impl fmt::Display for CallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallType::Query => f.write_str("query"),
            CallType::Update => f.write_str("update"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FuncSignature {
    pub args: Vec<IdlType>,
    pub rets: Vec<IdlType>,
    pub call_type: CallType,
}

impl FuncSignature {
    pub fn arg_types(&self) -> Vec<Type> {
        self.args.iter().map(IdlType::to_candid).collect()
    }

    pub fn ret_types(&self) -> Vec<Type> {
        self.rets.iter().map(IdlType::to_candid).collect()
    }
}

/// A canister interface assembled at runtime, method name to signature.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServiceInterface {
    methods: BTreeMap<String, FuncSignature>,
}

impl ServiceInterface {
    pub fn new() -> Self {
        Self::default()
    }

    /// The one-method interface an action invocation needs.
    pub fn single<S: AsRef<str>>(
        method: &str,
        input: &[S],
        output: &[S],
        call_type: CallType,
    ) -> Result<Self, InterfaceError> {
        let mut interface = ServiceInterface::new();
        interface.add_method(method, input, output, call_type)?;
        Ok(interface)
    }

    pub fn add_method<S: AsRef<str>>(
        &mut self,
        method: &str,
        input: &[S],
        output: &[S],
        call_type: CallType,
    ) -> Result<(), InterfaceError> {
        let args = input
            .iter()
            .map(|descriptor| parse_type(descriptor.as_ref()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| InterfaceError::InvalidArgumentType {
                method: method.to_string(),
                source,
            })?;
        let rets = output
            .iter()
            .map(|descriptor| parse_type(descriptor.as_ref()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| InterfaceError::InvalidResultType {
                method: method.to_string(),
                source,
            })?;
        self.methods.insert(
            method.to_string(),
            FuncSignature {
                args,
                rets,
                call_type,
            },
        );
        Ok(())
    }

    pub fn method(&self, name: &str) -> Option<&FuncSignature> {
        self.methods.get(name)
    }

    pub fn methods(&self) -> impl Iterator<Item = (&str, &FuncSignature)> {
        self.methods.iter().map(|(name, sig)| (name.as_str(), sig))
    }
}

impl fmt::Display for ServiceInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "service : {{")?;
        for (name, sig) in &self.methods {
            let list = |types: &[IdlType]| {
                types
                    .iter()
                    .map(|t| t.to_candid().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            let mode = match sig.call_type {
                CallType::Query => " query",
                CallType::Update => "",
            };
            writeln!(
                f,
                "  \"{name}\" : ({}) -> ({}){mode};",
                list(&sig.args),
                list(&sig.rets)
            )?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::idl::ParseTypeError;

    #[test]
    fn builds_a_single_method_service() {
        let interface =
            ServiceInterface::single("bet", &["Text", "Nat32", "Vec Principal"], &["Text"], CallType::Update)
                .unwrap();
        let sig = interface.method("bet").unwrap();
        assert_eq!(
            sig.args,
            vec![
                IdlType::Text,
                IdlType::Nat32,
                IdlType::Vec(Box::new(IdlType::Principal))
            ]
        );
        assert_eq!(sig.rets, vec![IdlType::Text]);
        assert!(interface.method("other").is_none());
        assert_eq!(
            interface.to_string(),
            "service : {\n  \"bet\" : (text, nat32, vec principal) -> (text);\n}"
        );
    }

    #[test]
    fn names_the_method_with_a_bad_type() {
        let err = ServiceInterface::single("get", &["Text"], &["Frobnicate"], CallType::Query)
            .unwrap_err();
        assert_eq!(
            err,
            InterfaceError::InvalidResultType {
                method: "get".to_string(),
                source: ParseTypeError::UnknownType("Frobnicate".to_string()),
            }
        );
    }
}
