//! Shared error type across HoloSync crates.

use thiserror::Error;

/// Stable error codes (used in logs, metrics labels and test vectors).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Frame ended before a field could be read.
    Truncated,
    /// A field was present but its value is not acceptable.
    InvalidPayload,
    /// Substrate failure (closed queue, unknown participant).
    Transport,
    /// Invalid configuration.
    Config,
    /// Unsupported config or protocol version.
    UnsupportedVersion,
    /// A wait exceeded its deadline.
    Timeout,
    /// A wait was cancelled.
    Cancelled,
    /// Internal error.
    Internal,
}

impl ErrorKind {
    /// String representation used in logs and vectors.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Truncated => "TRUNCATED",
            ErrorKind::InvalidPayload => "INVALID_PAYLOAD",
            ErrorKind::Transport => "TRANSPORT",
            ErrorKind::Config => "CONFIG",
            ErrorKind::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::Cancelled => "CANCELLED",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Unified error type used by core and session.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("truncated frame: {field} needs {needed} bytes, {remaining} remaining")]
    Truncated {
        field: &'static str,
        needed: usize,
        remaining: usize,
    },
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error("transport: {0}")]
    Transport(String),
    #[error("config: {0}")]
    Config(String),
    #[error("unsupported version")]
    UnsupportedVersion,
    #[error("timed out waiting for {0}")]
    Timeout(&'static str),
    #[error("cancelled")]
    Cancelled,
    #[error("internal: {0}")]
    Internal(String),
}

impl SyncError {
    /// Map to a stable code.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::Truncated { .. } => ErrorKind::Truncated,
            SyncError::InvalidPayload(_) => ErrorKind::InvalidPayload,
            SyncError::Transport(_) => ErrorKind::Transport,
            SyncError::Config(_) => ErrorKind::Config,
            SyncError::UnsupportedVersion => ErrorKind::UnsupportedVersion,
            SyncError::Timeout(_) => ErrorKind::Timeout,
            SyncError::Cancelled => ErrorKind::Cancelled,
            SyncError::Internal(_) => ErrorKind::Internal,
        }
    }
}
