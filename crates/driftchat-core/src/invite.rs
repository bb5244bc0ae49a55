//! Private-room invitation token protocol.
//!
//! An invitation is an out-of-band three-line text blob (typically carried
//! in a QR code): room id, room metadata collection id, messages collection
//! id, in that fixed order. There is no checksum, no version tag, and no
//! escaping of embedded newlines; trust is implicit in token possession.

use serde::{Deserialize, Serialize};

use crate::InviteError;

/// Parsed private-room invitation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomInvite {
    /// Room id.
    pub room_id: String,
    /// Collection holding the room's metadata document.
    pub collection_id: String,
    /// Collection holding the room's messages.
    pub messages_id: String,
}

impl RoomInvite {
    /// Parse a three-line invitation token.
    ///
    /// Fails with [`InviteError::Malformed`] unless the token splits into
    /// exactly three newline-separated fields. The token carries no
    /// authentication; callers subscribe to whatever collection ids it
    /// names.
    pub fn parse(token: &str) -> Result<Self, InviteError> {
        let parts: Vec<&str> = token.split('\n').collect();
        if parts.len() != 3 {
            return Err(InviteError::Malformed { parts: parts.len() });
        }

        Ok(Self {
            room_id: parts[0].to_owned(),
            collection_id: parts[1].to_owned(),
            messages_id: parts[2].to_owned(),
        })
    }

    /// Render the three-line token form.
    pub fn encode(&self) -> String {
        format!("{}\n{}\n{}", self.room_id, self.collection_id, self.messages_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_three_fields_in_order() {
        let invite = RoomInvite::parse("r1\nc1\nm1").unwrap();
        assert_eq!(invite.room_id, "r1");
        assert_eq!(invite.collection_id, "c1");
        assert_eq!(invite.messages_id, "m1");
    }

    #[test]
    fn two_fields_is_malformed() {
        assert_eq!(RoomInvite::parse("r1\nc1"), Err(InviteError::Malformed { parts: 2 }));
    }

    #[test]
    fn four_fields_is_malformed() {
        assert_eq!(RoomInvite::parse("r1\nc1\nm1\nx"), Err(InviteError::Malformed { parts: 4 }));
    }

    #[test]
    fn empty_token_is_malformed() {
        assert_eq!(RoomInvite::parse(""), Err(InviteError::Malformed { parts: 1 }));
    }

    #[test]
    fn encode_round_trips() {
        let invite = RoomInvite {
            room_id: "r1".to_owned(),
            collection_id: "c1".to_owned(),
            messages_id: "m1".to_owned(),
        };
        assert_eq!(RoomInvite::parse(&invite.encode()).unwrap(), invite);
    }
}
