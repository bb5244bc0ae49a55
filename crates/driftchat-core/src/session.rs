//! Conference session entity.
//!
//! Secondary domain mirrored with the same machinery as rooms: a session
//! document carries its own chat room, messages, and notes collection ids.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{Document, keys, timestamp};

/// A conference session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Client-assigned UUID.
    pub id: String,
    /// Session title.
    pub title: String,
    /// Session category (e.g. "Discussion", "Q&A").
    pub session_type: String,
    /// Longer description.
    pub description: String,
    /// User ids presenting this session.
    pub presenter_ids: BTreeSet<String>,
    /// User ids attending this session.
    pub attendee_ids: BTreeSet<String>,
    /// Chat room paired with this session.
    pub chat_room_id: String,
    /// Messages collection of the paired chat room.
    pub messages_id: String,
    /// Notes collection for this session.
    pub notes_id: String,
    /// User id of the creator.
    pub created_by: String,
    /// Creation time (UTC).
    pub created_on: DateTime<Utc>,
}

impl Session {
    /// Build a new session with a fresh id and empty membership.
    pub fn new(title: impl Into<String>, session_type: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            session_type: session_type.into(),
            description: String::new(),
            presenter_ids: BTreeSet::new(),
            attendee_ids: BTreeSet::new(),
            chat_room_id: String::new(),
            messages_id: String::new(),
            notes_id: String::new(),
            created_by: String::new(),
            created_on: Utc::now(),
        }
    }

    /// Decode from a store document. Total: missing fields become defaults.
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: doc.id(),
            title: doc.get_str(keys::TITLE),
            session_type: doc.get_str(keys::TYPE),
            description: doc.get_str(keys::DESCRIPTION),
            presenter_ids: doc.get_flag_keys(keys::PRESENTER_IDS).into_iter().collect(),
            attendee_ids: doc.get_flag_keys(keys::ATTENDEE_IDS).into_iter().collect(),
            chat_room_id: doc.get_str(keys::CHAT_ROOM_ID),
            messages_id: doc.get_str(keys::MESSAGES_ID),
            notes_id: doc.get_str(keys::NOTES_ID),
            created_by: doc.get_str(keys::CREATED_BY),
            created_on: timestamp::parse_iso8601(&doc.get_str(keys::CREATED_ON)),
        }
    }

    /// Encode into the wire document format.
    ///
    /// Membership sets are encoded as objects of `true` flags so concurrent
    /// member additions on different peers merge instead of clobbering.
    pub fn to_document(&self) -> Document {
        Document::new()
            .with(keys::ID, self.id.clone())
            .with(keys::TITLE, self.title.clone())
            .with(keys::TYPE, self.session_type.clone())
            .with(keys::DESCRIPTION, self.description.clone())
            .with(keys::PRESENTER_IDS, flag_object(&self.presenter_ids))
            .with(keys::ATTENDEE_IDS, flag_object(&self.attendee_ids))
            .with(keys::CHAT_ROOM_ID, self.chat_room_id.clone())
            .with(keys::MESSAGES_ID, self.messages_id.clone())
            .with(keys::NOTES_ID, self.notes_id.clone())
            .with(keys::CREATED_BY, self.created_by.clone())
            .with(keys::CREATED_ON, timestamp::to_iso8601(self.created_on))
    }
}

fn flag_object(ids: &BTreeSet<String>) -> Value {
    let mut object = Map::new();
    for id in ids {
        object.insert(id.clone(), Value::Bool(true));
    }
    Value::Object(object)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_round_trip() {
        let mut session = Session::new("Planning", "Discussion");
        session.presenter_ids.insert("u1".to_owned());
        session.attendee_ids.insert("u2".to_owned());
        session.attendee_ids.insert("u3".to_owned());

        let decoded = Session::from_document(&session.to_document());
        assert_eq!(decoded.id, session.id);
        assert_eq!(decoded.title, "Planning");
        assert_eq!(decoded.session_type, "Discussion");
        assert_eq!(decoded.presenter_ids, session.presenter_ids);
        assert_eq!(decoded.attendee_ids, session.attendee_ids);
    }

    #[test]
    fn empty_document_decodes_to_defaults() {
        let session = Session::from_document(&Document::new());
        assert_eq!(session.id, "");
        assert!(session.presenter_ids.is_empty());
        assert!(session.attendee_ids.is_empty());
    }
}
