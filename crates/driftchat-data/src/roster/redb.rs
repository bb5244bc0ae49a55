//! Redb-backed durable roster implementation.
//!
//! Uses Redb's ACID transactions with Copy-on-Write for crash safety.
//! Roster entries survive process restarts.

use std::{path::Path, sync::Arc};

use driftchat_core::Room;
use redb::{Database, ReadableTable, TableDefinition};

use super::{RosterError, RosterStore};

/// Table: joined_rooms
/// Key: room id (UUID string)
/// Value: CBOR-encoded Room
const JOINED_ROOMS: TableDefinition<&str, &[u8]> = TableDefinition::new("joined_rooms");

/// Durable roster backed by Redb.
///
/// Thread-safe through Redb's internal locking. Clone is cheap (Arc).
#[derive(Clone)]
pub struct RedbRoster {
    db: Arc<Database>,
}

impl RedbRoster {
    /// Open or create a Redb database at the given path.
    ///
    /// Creates the JOINED_ROOMS table if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RosterError::Io` if the database cannot be opened or
    /// created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RosterError> {
        let db = Database::create(path.as_ref()).map_err(|e| RosterError::Io(e.to_string()))?;

        let txn = db.begin_write().map_err(|e| RosterError::Io(e.to_string()))?;
        {
            let _ = txn.open_table(JOINED_ROOMS).map_err(|e| RosterError::Io(e.to_string()))?;
        }
        txn.commit().map_err(|e| RosterError::Io(e.to_string()))?;

        Ok(Self { db: Arc::new(db) })
    }
}

impl RosterStore for RedbRoster {
    fn insert(&self, room: &Room) -> Result<(), RosterError> {
        let txn = self.db.begin_write().map_err(|e| RosterError::Io(e.to_string()))?;

        {
            let mut table =
                txn.open_table(JOINED_ROOMS).map_err(|e| RosterError::Io(e.to_string()))?;

            let mut bytes = Vec::new();
            ciborium::into_writer(room, &mut bytes)
                .map_err(|e| RosterError::Serialization(e.to_string()))?;

            table
                .insert(room.id.as_str(), bytes.as_slice())
                .map_err(|e| RosterError::Io(e.to_string()))?;
        }

        txn.commit().map_err(|e| RosterError::Io(e.to_string()))?;

        Ok(())
    }

    fn all_private_rooms(&self) -> Result<Vec<Room>, RosterError> {
        let txn = self.db.begin_read().map_err(|e| RosterError::Io(e.to_string()))?;

        let table = txn.open_table(JOINED_ROOMS).map_err(|e| RosterError::Io(e.to_string()))?;

        let mut rooms = Vec::new();
        for result in table.iter().map_err(|e| RosterError::Io(e.to_string()))? {
            let (_, value) = result.map_err(|e| RosterError::Io(e.to_string()))?;
            let room: Room = ciborium::from_reader(value.value())
                .map_err(|e| RosterError::Serialization(e.to_string()))?;
            if room.is_private {
                rooms.push(room);
            }
        }

        Ok(rooms)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn insert_and_snapshot_round_trip() {
        let dir = tempdir().unwrap();
        let roster = RedbRoster::open(dir.path().join("roster.redb")).unwrap();

        let room = Room::create("Secret", true, "u1");
        roster.insert(&room).unwrap();

        let rooms = roster.all_private_rooms().unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].id, room.id);
        assert_eq!(rooms[0].collection_id, room.collection_id);
    }

    #[test]
    fn roster_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("roster.redb");
        let room = Room::create("Secret", true, "u1");

        {
            let roster = RedbRoster::open(&path).unwrap();
            roster.insert(&room).unwrap();
        }

        let reopened = RedbRoster::open(&path).unwrap();
        let rooms = reopened.all_private_rooms().unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].id, room.id);
    }

    #[test]
    fn insert_replaces_by_room_id() {
        let dir = tempdir().unwrap();
        let roster = RedbRoster::open(dir.path().join("roster.redb")).unwrap();

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
        let dir = tempdir().unwrap();
        let roster = RedbRoster::open(dir.path().join("roster.redb")).unwrap();

        roster.insert(&Room::create("Public", false, "u1")).unwrap();
        roster.insert(&Room::create("Secret", true, "u1")).unwrap();

        let rooms = roster.all_private_rooms().unwrap();
        assert_eq!(rooms.len(), 1);
        assert!(rooms[0].is_private);
    }
}
