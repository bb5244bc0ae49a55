//! Reactive data layer for Driftchat.
//!
//! Binds collections of the synchronized document store to typed,
//! continuously-updated sequences consumed by presentation code, and owns
//! the private-room join protocol.
//!
//! # Components
//!
//! - [`CollectionMirror`]: generic binding of one store collection to one
//!   `watch`-channel sequence of decoded entities
//! - [`SubscriptionTable`]: reference-counted registry of replication
//!   subscriptions with a preserve-forever compatibility mode
//! - [`RosterStore`]: durable list of private rooms the user has joined
//! - [`Repository`]: facade aggregating all mirrors, writes, and the join
//!   coordinator behind one API surface
//!
//! Reads flow store → mirror → typed sequence → UI. Writes flow
//! UI → repository → store; the writer observes its own write only after
//! it round-trips through the live query.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
mod join;
mod mirror;
mod preferences;
mod repository;
pub mod roster;
mod subscriptions;

pub use error::DataError;
pub use mirror::CollectionMirror;
pub use preferences::{InitialPreferences, Preferences, StaticPreferences};
pub use repository::{Repository, RepositoryConfig};
pub use roster::{MemoryRoster, RedbRoster, RosterError, RosterStore};
pub use subscriptions::{RetentionPolicy, SubscriptionTable};
