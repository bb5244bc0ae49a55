//! Error types for roster storage.

use thiserror::Error;

/// Errors from the durable roster backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    /// Underlying storage I/O failure.
    #[error("roster I/O: {0}")]
    Io(String),

    /// Room entry could not be encoded or decoded.
    #[error("roster serialization: {0}")]
    Serialization(String),
}
