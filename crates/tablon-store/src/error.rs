use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The named channel does not exist.
    #[error("Channel not found: {0}")]
    ChannelNotFound(String),

    /// A rename targeted a name that is already in use.
    #[error("Channel name already taken: {0}")]
    NameTaken(String),

    /// A channel name was empty where one is required.
    #[error("Channel name must not be empty")]
    EmptyChannelName,

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// The data file exists but does not parse. Fatal at startup; the
    /// store never silently resets a corrupt file.
    #[error("Data file {} is corrupt: {}", .path.display(), .source)]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Generic I/O error (reading or writing the data file).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
