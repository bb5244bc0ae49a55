//! Stable wire field keys and well-known collection ids.
//!
//! These strings are the cross-platform document format of the store and
//! must not change: documents written by other peers are read back through
//! the same keys.

/// Document identity field.
pub const ID: &str = "_id";
/// User first name field.
pub const FIRST_NAME: &str = "firstName";
/// User last name field.
pub const LAST_NAME: &str = "lastName";
/// Room or session display name field.
pub const NAME: &str = "name";
/// Room privacy flag field.
pub const IS_PRIVATE: &str = "isPrivate";
/// Physical metadata collection id field.
pub const COLLECTION_ID: &str = "collectionId";
/// Creator user id field.
pub const CREATED_BY: &str = "createdBy";
/// Creation timestamp field (ISO-8601 UTC string).
pub const CREATED_ON: &str = "createdOn";
/// Message room id field.
pub const ROOM_ID: &str = "roomId";
/// Message body field.
pub const TEXT: &str = "text";
/// Message author field.
pub const USER_ID: &str = "userId";
/// Message attachment field (binary).
pub const THUMBNAIL: &str = "thumbnail";
/// Messages collection id field.
pub const MESSAGES_ID: &str = "messagesId";

/// Session title field.
pub const TITLE: &str = "title";
/// Session type field.
pub const TYPE: &str = "type";
/// Session description field.
pub const DESCRIPTION: &str = "description";
/// Session presenter membership field (object of `true` flags).
pub const PRESENTER_IDS: &str = "presenterIds";
/// Session attendee membership field (object of `true` flags).
pub const ATTENDEE_IDS: &str = "attendeeIds";
/// Session chat room id field.
pub const CHAT_ROOM_ID: &str = "chatRoomId";
/// Session notes collection id field.
pub const NOTES_ID: &str = "notesId";

/// Collection holding all public room metadata documents.
pub const PUBLIC_ROOMS_COLLECTION_ID: &str = "rooms";
/// Collection holding all user documents.
pub const USERS_COLLECTION_ID: &str = "users";
/// Collection holding all session documents.
pub const SESSIONS_COLLECTION_ID: &str = "sessions";

/// Room id of the sentinel default public room.
pub const DEFAULT_PUBLIC_ROOM_ID: &str = "public";
/// Display name of the sentinel default public room.
pub const DEFAULT_PUBLIC_ROOM_TITLE: &str = "Public Room";
/// Messages collection of the sentinel default public room.
pub const DEFAULT_PUBLIC_ROOM_MESSAGES_ID: &str = "chat";
/// Creator recorded on the sentinel default public room.
pub const SYSTEM_USER_ID: &str = "system";
