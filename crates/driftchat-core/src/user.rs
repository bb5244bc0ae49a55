//! Chat user entity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Document, keys};

/// A chat user.
///
/// Created client-side on first login and upserted into the users
/// collection; identity is a random UUID assigned at creation time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Client-assigned UUID.
    pub id: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
}

impl User {
    /// Create a user with a fresh random id.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// Create a user with a known id (e.g. from persisted preferences).
    pub fn with_id(
        id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self { id: id.into(), first_name: first_name.into(), last_name: last_name.into() }
    }

    /// Display name, derived as `first + " " + last`.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Decode from a store document. Total: missing fields become empty.
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: doc.get_str(keys::ID),
            first_name: doc.get_str(keys::FIRST_NAME),
            last_name: doc.get_str(keys::LAST_NAME),
        }
    }

    /// Encode into the wire document format.
    pub fn to_document(&self) -> Document {
        Document::new()
            .with(keys::ID, self.id.clone())
            .with(keys::FIRST_NAME, self.first_name.clone())
            .with(keys::LAST_NAME, self.last_name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_joins_with_space() {
        let user = User::with_id("u1", "Ada", "Lovelace");
        assert_eq!(user.full_name(), "Ada Lovelace");
    }

    #[test]
    fn new_users_get_distinct_ids() {
        let a = User::new("A", "A");
        let b = User::new("B", "B");
        assert_ne!(a.id, b.id);
        assert!(Uuid::parse_str(&a.id).is_ok());
    }

    #[test]
    fn document_round_trip() {
        let user = User::with_id("u1", "Ada", "Lovelace");
        assert_eq!(User::from_document(&user.to_document()), user);
    }

    #[test]
    fn empty_document_decodes_to_defaults() {
        let user = User::from_document(&Document::new());
        assert_eq!(user, User::default());
    }
}
