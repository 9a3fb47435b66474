use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read store file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Store file '{0}' is neither a bare record array nor an object with a 'points' collection")]
    Parse(PathBuf, #[source] serde_json::Error),

    #[error("Failed to serialize store document for '{0}'")]
    Serialize(PathBuf, #[source] serde_json::Error),

    #[error("Failed to back up '{0}' before overwrite")]
    Backup(PathBuf, #[source] std::io::Error),

    #[error("Failed to write store file '{0}'")]
    Write(PathBuf, #[source] std::io::Error),
}
