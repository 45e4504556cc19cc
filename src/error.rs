//! Error type shared by every steplog operation that can fail.

use thiserror::Error;

/// The main error type for steplog.
///
/// Writes themselves never fail at the call site; sink failures surface
/// from [`Channel::flush`](crate::Channel::flush) instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("log sink write failed: {0}")]
    Sink(#[from] std::io::Error),

    #[error("failed to parse log configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("unknown color or attribute name: {0:?}")]
    UnknownColor(String),

    #[error("unknown channel mode: {0:?} (expected \"buffered\" or \"direct\")")]
    UnknownMode(String),

    #[error("the global log service is already initialized")]
    AlreadyInitialized,

    #[error("the global log service is not initialized")]
    NotInitialized,
}

/// A specialized `Result` type for steplog operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
