/// The type to represent command results.
pub type StrikeResult<T = ()> = anyhow::Result<T>;

/// The type to represent command errors.
pub type StrikeError = anyhow::Error;
