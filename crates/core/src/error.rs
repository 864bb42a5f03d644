//! Error taxonomy shared by every netsync crate.

use thiserror::Error;

/// Errors surfaced by remote clients.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    /// The search endpoint rejected the requested page size.
    #[error("requested page size exceeds the maximum allowed")]
    PageSizeExceeded,
    #[error("remote api error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("transport: {0}")]
    Transport(String),
}

impl RemoteError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        RemoteError::Api { status, message: message.into() }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SyncError {
    /// The object's path does not match its kind's descriptor.
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },
    #[error("operation cancelled")]
    Cancelled,
    #[error(transparent)]
    Remote(#[from] RemoteError),
    /// A resync failed for one resource kind; siblings are unaffected.
    #[error("full resync of {kind} failed: {source}")]
    ResyncFatal { kind: String, source: Box<SyncError> },
    #[error("unknown resource kind {0}")]
    UnknownKind(String),
    #[error("invalid search cursor {0:?}")]
    InvalidCursor(String),
    #[error("decode: {0}")]
    Decode(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl SyncError {
    pub fn invalid_path(path: &str, reason: impl Into<String>) -> Self {
        SyncError::InvalidPath { path: path.to_string(), reason: reason.into() }
    }

    pub fn resync_fatal(kind: &str, source: SyncError) -> Self {
        SyncError::ResyncFatal { kind: kind.to_string(), source: Box::new(source) }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(e: serde_json::Error) -> Self {
        SyncError::Decode(e.to_string())
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
