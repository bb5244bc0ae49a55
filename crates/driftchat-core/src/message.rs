//! Chat message entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Document, keys, timestamp};

/// A message in a room.
///
/// Messages are never mutated after creation; the store round-trips them
/// back through the room's live query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Client-assigned UUID.
    pub id: String,
    /// Room this message belongs to.
    pub room_id: String,
    /// Message body.
    pub text: String,
    /// Creation time (UTC), stamped when the message is written.
    pub created_on: DateTime<Utc>,
    /// Author user id.
    pub user_id: String,
    /// Optional binary attachment.
    pub thumbnail: Option<Vec<u8>>,
}

impl Message {
    /// Draft a new message for a room.
    ///
    /// Author and creation time are stamped by the repository at write time.
    pub fn new(room_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            room_id: room_id.into(),
            text: text.into(),
            created_on: Utc::now(),
            user_id: String::new(),
            thumbnail: None,
        }
    }

    /// Decode from a store document. Total: missing fields become defaults.
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: doc.id(),
            room_id: doc.get_str(keys::ROOM_ID),
            text: doc.get_str(keys::TEXT),
            created_on: timestamp::parse_iso8601(&doc.get_str(keys::CREATED_ON)),
            user_id: doc.get_str(keys::USER_ID),
            thumbnail: doc.get_bytes(keys::THUMBNAIL),
        }
    }

    /// Encode into the wire document format.
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new()
            .with(keys::ID, self.id.clone())
            .with(keys::ROOM_ID, self.room_id.clone())
            .with(keys::TEXT, self.text.clone())
            .with(keys::CREATED_ON, timestamp::to_iso8601(self.created_on))
            .with(keys::USER_ID, self.user_id.clone());
        if let Some(bytes) = &self.thumbnail {
            doc.set(keys::THUMBNAIL, bytes.clone());
        }
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_round_trip() {
        let mut message = Message::new("r1", "hello");
        message.user_id = "u1".to_owned();
        message.thumbnail = Some(vec![7, 8, 9]);

        let decoded = Message::from_document(&message.to_document());
        assert_eq!(decoded.id, message.id);
        assert_eq!(decoded.room_id, "r1");
        assert_eq!(decoded.text, "hello");
        assert_eq!(decoded.user_id, "u1");
        assert_eq!(decoded.thumbnail, Some(vec![7, 8, 9]));
    }

    #[test]
    fn absent_attachment_decodes_to_none() {
        let message = Message::from_document(&Message::new("r1", "hi").to_document());
        assert_eq!(message.thumbnail, None);
    }
}
