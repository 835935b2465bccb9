pub mod agent;
pub mod retryable;
pub mod root_key;
