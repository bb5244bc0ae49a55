//! Domain model for the Driftchat data layer.
//!
//! Immutable value types for users, rooms, messages, and sessions, plus
//! their pure conversions to and from the schema-less [`Document`]
//! representation synchronized by the peer-to-peer store.
//!
//! # Components
//!
//! - [`Document`]: schema-less key/value record with total typed accessors
//! - [`User`], [`Room`], [`Message`], [`Session`]: domain entities
//! - [`RoomInvite`]: three-line private-room invitation token
//! - [`keys`]: stable wire field keys and well-known collection ids
//!
//! Decoding is total by construction: a document missing an expected field
//! decodes to that field's default value rather than erroring.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod document;
mod error;
mod invite;
pub mod keys;
mod message;
mod room;
mod session;
pub mod timestamp;
mod user;

pub use document::Document;
pub use error::InviteError;
pub use invite::RoomInvite;
pub use message::Message;
pub use room::Room;
pub use session::Session;
pub use user::User;
