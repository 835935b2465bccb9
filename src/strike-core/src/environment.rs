use std::path::PathBuf;

/// Capabilities of the host the library runs in, decided once at startup and
/// passed down through construction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Environment {
    /// A wallet extension bridge (the relay) is reachable.
    pub has_global_wallet_bridge: bool,

    /// Running without a user agent: no redirects, no interactive prompts.
    pub is_server: bool,

    /// Directory for durable key/value storage; `None` keeps everything in memory.
    pub storage_dir: Option<PathBuf>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_wallet_bridge(mut self, available: bool) -> Self {
        self.has_global_wallet_bridge = available;
        self
    }

    pub fn with_server(mut self, is_server: bool) -> Self {
        self.is_server = is_server;
        self
    }

    pub fn with_storage_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.storage_dir = dir;
        self
    }
}
