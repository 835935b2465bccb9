use candid::types::principal::PrincipalError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseTypeError {
    #[error("Empty type descriptor")]
    Empty,

    #[error("Unknown type: {0}")]
    UnknownType(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("Invalid argument type for method '{method}'")]
    InvalidArgumentType {
        method: String,
        #[source]
        source: ParseTypeError,
    },

    #[error("Invalid result type for method '{method}'")]
    InvalidResultType {
        method: String,
        #[source]
        source: ParseTypeError,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarshalError {
    #[error("Expected {expected} arguments but the template has {actual}")]
    ArityMismatch { expected: usize, actual: usize },

    #[error("No value was provided for '{0}'")]
    MissingValue(String),

    #[error("'{0}' is not a valid principal")]
    InvalidPrincipal(String, #[source] PrincipalError),

    #[error("'{value}' is not a valid {ty}")]
    InvalidValue { value: String, ty: String },
}
