use crate::error::fs::FsError;
use crate::error::structured_file::StructuredFileError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to load storage")]
    LoadFailed(#[source] StructuredFileError),

    #[error("Failed to save storage")]
    SaveFailed(#[source] StructuredFileError),

    #[error("Failed to restrict access to the storage file")]
    RestrictFailed(#[source] FsError),

    #[error("Failed to decode stored value for key '{0}'")]
    DecodeFailed(String, #[source] serde_json::Error),

    #[error("Failed to encode value for key '{0}'")]
    EncodeFailed(String, #[source] serde_json::Error),
}
