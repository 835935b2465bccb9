//! Runtime interface descriptions built from the string type descriptors an
//! action carries, and conversion of staged user input into candid values.
pub mod interface;
pub mod json;
pub mod marshal;
pub mod types;

pub use interface::{CallType, FuncSignature, ServiceInterface};
pub use json::idl_args_to_json;
pub use marshal::{marshal_arguments, ParameterValue};
pub use types::{parse_type, IdlType};
