pub mod client_config;
pub mod network_descriptor;
