use thiserror::Error;

/// Everything that can go wrong while managing the pool.
///
/// `Configuration` and `BackendOpen` are startup failures and abort the
/// process. The rest are handed back to whoever asked and leave the
/// registry and selection consistent.
#[derive(Error, Debug)]
pub enum MultitoolError {
    #[error("required environment variable '{key}' is not set")]
    Configuration { key: String },

    #[error("cannot open volume backend: {0}")]
    BackendOpen(String),

    #[error("drive allocation failed: {0}")]
    BackendAllocation(String),

    #[error("drive removal failed: {0}")]
    BackendDeallocation(String),

    #[error("pool query failed: {0}")]
    BackendQuery(String),

    #[error("no such drive: {0}")]
    DriveNotFound(String),

    #[error("invalid drive size: {0} bytes")]
    InvalidDriveSize(u64),

    #[error("drive format failed: {0}")]
    Format(String),
}

pub type Result<T> = std::result::Result<T, MultitoolError>;
