//! In-memory roster implementation for tests and simulation.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use driftchat_core::Room;

use super::{RosterError, RosterStore};

/// In-memory roster.
///
/// All state is wrapped in `Arc<Mutex<_>>` to allow Clone and concurrent
/// access. Uses `lock().expect()`, which panics if the mutex is poisoned;
/// acceptable for test and simulation code.
#[derive(Clone, Default)]
pub struct MemoryRoster {
    rooms: Arc<Mutex<BTreeMap<String, Room>>>,
}

impl MemoryRoster {
    /// Create an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rooms (private and public alike).
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[allow(clippy::expect_used)]
    pub fn len(&self) -> usize {
        self.rooms.lock().expect("Mutex poisoned").len()
    }

    /// Whether the roster holds no rooms.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[allow(clippy::expect_used)]
    pub fn is_empty(&self) -> bool {
        self.rooms.lock().expect("Mutex poisoned").is_empty()
    }
}

impl RosterStore for MemoryRoster {
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[allow(clippy::expect_used)]
    fn insert(&self, room: &Room) -> Result<(), RosterError> {
        self.rooms.lock().expect("Mutex poisoned").insert(room.id.clone(), room.clone());
        Ok(())
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[allow(clippy::expect_used)]
    fn all_private_rooms(&self) -> Result<Vec<Room>, RosterError> {
        let rooms = self.rooms.lock().expect("Mutex poisoned");
        Ok(rooms.values().filter(|room| room.is_private).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_by_room_id() {
        let roster = MemoryRoster::new();
        let mut room = Room::create("Secret", true, "u1");
        roster.insert(&room).unwrap();

        room.name = "Renamed".to_owned();
        roster.insert(&room).unwrap();

        let rooms = roster.all_private_rooms().unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].name, "Renamed");
    }

    #[test]
    fn public_rooms_are_filtered_from_snapshot() {
        let roster = MemoryRoster::new();
        roster.insert(&Room::create("Public", false, "u1")).unwrap();
        roster.insert(&Room::create("Secret", true, "u1")).unwrap();

        let rooms = roster.all_private_rooms().unwrap();
        assert_eq!(rooms.len(), 1);
        assert!(rooms[0].is_private);
        assert_eq!(roster.len(), 2);
    }
}
