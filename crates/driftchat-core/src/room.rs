//! Chat room entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Document, keys, timestamp};

/// A chat room.
///
/// `collection_id` names the physical store collection holding this room's
/// metadata document: the shared public-rooms collection for public rooms,
/// a unique per-room collection for private rooms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Client-assigned UUID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Collection holding this room's messages.
    pub messages_collection_id: String,
    /// Whether the room is private (invitation-only).
    pub is_private: bool,
    /// Collection holding this room's metadata document.
    pub collection_id: String,
    /// User id of the creator.
    pub created_by: String,
    /// Creation time (UTC).
    pub created_on: DateTime<Utc>,
}

impl Room {
    /// Build a new room with fresh ids.
    ///
    /// Public rooms live in the shared public-rooms collection; private
    /// rooms get a freshly generated metadata collection of their own.
    pub fn create(name: impl Into<String>, is_private: bool, created_by: impl Into<String>) -> Self {
        let collection_id = if is_private {
            Uuid::new_v4().to_string()
        } else {
            keys::PUBLIC_ROOMS_COLLECTION_ID.to_owned()
        };

        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            messages_collection_id: Uuid::new_v4().to_string(),
            is_private,
            collection_id,
            created_by: created_by.into(),
            created_on: Utc::now(),
        }
    }

    /// Well-known sentinel default public room.
    ///
    /// Returned by point lookups that miss, so "room not found" reads as the
    /// default public room rather than an error.
    pub fn sentinel_public() -> Self {
        Self {
            id: keys::DEFAULT_PUBLIC_ROOM_ID.to_owned(),
            name: keys::DEFAULT_PUBLIC_ROOM_TITLE.to_owned(),
            messages_collection_id: keys::DEFAULT_PUBLIC_ROOM_MESSAGES_ID.to_owned(),
            is_private: false,
            collection_id: keys::DEFAULT_PUBLIC_ROOM_ID.to_owned(),
            created_by: keys::SYSTEM_USER_ID.to_owned(),
            created_on: Utc::now(),
        }
    }

    /// Decode from a store document. Total: missing fields become defaults,
    /// unparseable timestamps become the Unix epoch.
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: doc.get_str(keys::ID),
            name: doc.get_str(keys::NAME),
            messages_collection_id: doc.get_str(keys::MESSAGES_ID),
            is_private: doc.get_bool(keys::IS_PRIVATE),
            collection_id: doc.get_str(keys::COLLECTION_ID),
            created_by: doc.get_str(keys::CREATED_BY),
            created_on: timestamp::parse_iso8601(&doc.get_str(keys::CREATED_ON)),
        }
    }

    /// Encode into the wire document format.
    pub fn to_document(&self) -> Document {
        Document::new()
            .with(keys::ID, self.id.clone())
            .with(keys::NAME, self.name.clone())
            .with(keys::MESSAGES_ID, self.messages_collection_id.clone())
            .with(keys::IS_PRIVATE, self.is_private)
            .with(keys::COLLECTION_ID, self.collection_id.clone())
            .with(keys::CREATED_BY, self.created_by.clone())
            .with(keys::CREATED_ON, timestamp::to_iso8601(self.created_on))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_room_uses_shared_collection() {
        let room = Room::create("Test", false, "u1");
        assert_eq!(room.collection_id, keys::PUBLIC_ROOMS_COLLECTION_ID);
        assert!(!room.is_private);
    }

    #[test]
    fn private_room_gets_fresh_collection() {
        let room = Room::create("Secret", true, "u1");
        assert_ne!(room.collection_id, keys::PUBLIC_ROOMS_COLLECTION_ID);
        assert_ne!(room.collection_id, room.id);
        assert!(Uuid::parse_str(&room.collection_id).is_ok());
    }

    #[test]
    fn document_round_trip() {
        let room = Room::create("Test", true, "u1");
        let decoded = Room::from_document(&room.to_document());
        assert_eq!(decoded.id, room.id);
        assert_eq!(decoded.name, room.name);
        assert_eq!(decoded.messages_collection_id, room.messages_collection_id);
        assert_eq!(decoded.collection_id, room.collection_id);
        assert!(decoded.is_private);
        // Millisecond wire precision
        assert_eq!(decoded.created_on.timestamp_millis(), room.created_on.timestamp_millis());
    }

    #[test]
    fn empty_document_decodes_to_defaults() {
        let room = Room::from_document(&Document::new());
        assert_eq!(room.id, "");
        assert!(!room.is_private);
        assert_eq!(room.created_on.timestamp(), 0);
    }

    #[test]
    fn sentinel_is_the_default_public_room() {
        let room = Room::sentinel_public();
        assert_eq!(room.id, keys::DEFAULT_PUBLIC_ROOM_ID);
        assert_eq!(room.name, keys::DEFAULT_PUBLIC_ROOM_TITLE);
        assert!(!room.is_private);
    }
}
