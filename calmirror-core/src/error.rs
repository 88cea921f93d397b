//! Error types for calmirror.

use thiserror::Error;

/// Errors that can occur while mirroring a calendar.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Could not read source calendar: {0}")]
    Source(String),

    #[error("Could not resolve destination time zone: {0}")]
    TimeZone(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider '{0}' not found in PATH")]
    ProviderNotInstalled(String),

    #[error("Provider request timed out after {0}s")]
    ProviderTimeout(u64),

    #[error("Connection to destination failed: {0}")]
    Connectivity(String),

    #[error("Destination error: {0}")]
    Destination(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SyncError {
    /// Transient network trouble, as opposed to a definite rejection.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, SyncError::Connectivity(_) | SyncError::ProviderTimeout(_))
    }
}

/// Result type alias for calmirror operations.
pub type SyncResult<T> = Result<T, SyncError>;
