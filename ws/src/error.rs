use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Generic I/O error (creating the store directory, reading or writing a key).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored document could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Key contains characters that cannot be mapped to a file name.
    #[error("Invalid store key: '{0}'")]
    InvalidKey(String),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
