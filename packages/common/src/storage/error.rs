use thiserror::Error;

/// Errors raised while staging, placing or reading stored assets.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No asset exists at the requested relative path.
    #[error("asset not found: {0}")]
    NotFound(String),
    /// A path or folder name would escape the storage root or is malformed.
    #[error("invalid storage path: {0}")]
    InvalidPath(String),
    /// The upload exceeds the configured size limit.
    #[error("file exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
}
