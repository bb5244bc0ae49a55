//! Durable roster of joined private rooms.
//!
//! The roster is the only data-layer state that must outlive the process:
//! a local list of private rooms the user has joined or created, keyed by
//! room id, independent of whether a live subscription currently exists.
//! The trait is synchronous; the repository reads it once at construction
//! and writes through explicit saves.

mod error;
mod memory;
mod redb;

pub use error::RosterError;
pub use memory::MemoryRoster;
pub use self::redb::RedbRoster;

use driftchat_core::Room;

/// Durable store of rooms the user has explicitly joined or created.
///
/// Must be `Send + Sync`; implementations typically share internal state
/// via `Arc`, so clones access the same underlying storage.
pub trait RosterStore: Send + Sync {
    /// Insert or replace the entry for `room.id`.
    fn insert(&self, room: &Room) -> Result<(), RosterError>;

    /// Snapshot of all private rooms in the roster.
    ///
    /// Synchronous read used at repository construction time only; the
    /// roster is not reactive.
    fn all_private_rooms(&self) -> Result<Vec<Room>, RosterError>;
}
