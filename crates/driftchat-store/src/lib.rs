//! Document store facade for Driftchat.
//!
//! Exposes the synchronized document store at its interface boundary:
//! named collections of schema-less documents, point queries, live queries,
//! and replication subscriptions. Backed by an in-process local replica;
//! conflict resolution, transport, and peer discovery are properties of the
//! real replication engine and out of scope here.
//!
//! # Model
//!
//! - A **subscription** tells the store to replicate a collection's
//!   documents from peers into the local replica. It has no handle; the
//!   store tracks subscribed collection ids until [`Store::unsubscribe`].
//! - A **live query** is a standing query whose full matching result set is
//!   re-delivered to a registered observer after every local change. It
//!   reads only the local replica.
//!
//! Writes suspend the caller only until the local replica acknowledges;
//! remote convergence is asynchronous and invisible.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
mod query;
mod store;

pub use error::StoreError;
pub use query::{LiveQuery, LiveQueryEvent, Query, SortDirection};
pub use store::{Collection, Store};
