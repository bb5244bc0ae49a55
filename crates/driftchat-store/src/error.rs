//! Error types for the store facade.

use thiserror::Error;

/// Errors surfaced by store write operations.
///
/// Read paths have no failure channel: live queries deliver value sequences
/// only, and an empty collection reads as an empty list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Document shape rejected before it reached the replica.
    #[error("invalid document: {0}")]
    InvalidDocument(String),
}
