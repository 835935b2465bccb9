pub mod environment;
pub mod error;
pub mod logger;
pub mod login;
pub mod registry;
