pub mod action;
pub mod auth;
pub mod client;
pub mod config;
pub mod connector;
pub mod delegation;
pub mod execution;
pub mod fs;
pub mod idl;
pub mod registry;
pub mod reqwest;
pub mod root_key;
pub mod siwb;
pub mod storage;
pub mod structured_file;
pub mod wallet;

/// `err` followed by each of its causes, joined by `": "`.
pub fn display_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
