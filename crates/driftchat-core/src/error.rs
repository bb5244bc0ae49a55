//! Error types for the domain layer.

use thiserror::Error;

/// Errors parsing a private-room invitation token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InviteError {
    /// Token did not split into exactly three newline-separated fields.
    #[error("malformed invitation: expected 3 fields, got {parts}")]
    Malformed {
        /// Number of fields the token actually split into.
        parts: usize,
    },
}
