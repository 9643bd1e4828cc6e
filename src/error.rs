//! Error taxonomy for the persistence and derivation layer.
//!
//! Remote failures (`RemoteReadError`, `RemoteWriteError`) are caught at the
//! sync coordinator boundary and converted into an offline-mode transition;
//! they never propagate to callers of the coordinator. `ValidationError` is
//! the one error surfaced synchronously, before any mutation is attempted.

use rust_decimal::Decimal;
use thiserror::Error;

/// Transport-level failure talking to a remote backend.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("backend unreachable: {0}")]
    Unreachable(String),
    #[error("backend returned status {status}")]
    Status { status: u16 },
    #[error("malformed response body: {0}")]
    Malformed(String),
    /// Error surfaced by the document-cloud provider itself.
    #[error("provider error: {0}")]
    Provider(String),
}

/// Failure listing or fetching from the active backend.
#[derive(Debug, Error)]
#[error("remote read failed: {source}")]
pub struct RemoteReadError {
    #[source]
    pub source: RemoteError,
}

impl From<RemoteError> for RemoteReadError {
    fn from(source: RemoteError) -> Self {
        Self { source }
    }
}

/// Failure upserting to or removing from the active backend.
#[derive(Debug, Error)]
#[error("remote write failed: {source}")]
pub struct RemoteWriteError {
    #[source]
    pub source: RemoteError,
}

impl From<RemoteError> for RemoteWriteError {
    fn from(source: RemoteError) -> Self {
        Self { source }
    }
}

/// Local cache store failure.
///
/// `Corrupt` is swallowed by readers (the snapshot falls back to an empty
/// collection); `Io` on write is a real error the coordinator propagates.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache io failure for '{key}': {source}")]
    Io {
        key: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("cache snapshot '{key}' is corrupt: {reason}")]
    Corrupt { key: &'static str, reason: String },
}

/// Input rejected before it reaches the sync coordinator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("record id must not be empty")]
    MissingId,
    #[error("{field} must not be empty")]
    MissingField { field: &'static str },
    #[error("{field} must not be negative (got {amount})")]
    NegativeAmount { field: &'static str, amount: Decimal },
}

/// Configuration resolution failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
    #[error("could not determine a data directory; set STUDIO_DATA_DIR")]
    NoDataDir,
}
