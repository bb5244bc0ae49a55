//! Error types for the data layer.

use driftchat_core::InviteError;
use driftchat_store::StoreError;
use thiserror::Error;

use crate::roster::RosterError;

/// Errors surfaced by repository operations.
///
/// Mirror read paths never produce errors; absence of data reads as an
/// empty list. These variants cover writes and the join protocol.
#[derive(Error, Debug)]
pub enum DataError {
    /// Invitation token rejected before any subscription was opened.
    #[error(transparent)]
    Invite(#[from] InviteError),

    /// Durable roster read or write failed.
    #[error("roster storage: {0}")]
    Roster(#[from] RosterError),

    /// Store rejected a write.
    #[error("document store: {0}")]
    Store(#[from] StoreError),
}
