//! Private-room join coordinator and the private-rooms sequence.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use driftchat_core::{Room, RoomInvite, keys};
use driftchat_store::{LiveQuery, SortDirection, Store};
use tokio::sync::watch;

use crate::{DataError, roster::RosterStore};

/// Shared state behind the private-rooms output sequence.
///
/// Seeded from the durable roster at construction; rooms arriving through
/// joined metadata collections merge in, keyed by room id, and the full
/// list is republished sorted by creation time ascending.
pub(crate) struct PrivateRooms {
    rooms: Mutex<BTreeMap<String, Room>>,
    tx: watch::Sender<Vec<Room>>,
}

impl PrivateRooms {
    /// Build from the roster snapshot; returns the shared state and the
    /// receiver handed to consumers.
    pub(crate) fn new(seed: Vec<Room>) -> (Arc<Self>, watch::Receiver<Vec<Room>>) {
        let rooms: BTreeMap<String, Room> =
            seed.into_iter().map(|room| (room.id.clone(), room)).collect();
        let (tx, rx) = watch::channel(sorted_by_created_on(&rooms));
        (Arc::new(Self { rooms: Mutex::new(rooms), tx }), rx)
    }

    /// Merge one room and republish.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[allow(clippy::expect_used)]
    pub(crate) fn merge(&self, room: Room) {
        let mut rooms = self.rooms.lock().expect("Mutex poisoned");
        rooms.insert(room.id.clone(), room);
        let _ = self.tx.send_replace(sorted_by_created_on(&rooms));
    }
}

fn sorted_by_created_on(rooms: &BTreeMap<String, Room>) -> Vec<Room> {
    let mut list: Vec<Room> = rooms.values().cloned().collect();
    list.sort_by(|a, b| a.created_on.cmp(&b.created_on));
    list
}

/// Turns an out-of-band invitation token into a live subscription set.
///
/// Trust is implicit in token possession: the coordinator subscribes to
/// whatever collection ids the token names without validating that they
/// correspond to a room the inviter controls.
pub(crate) struct JoinCoordinator {
    store: Store,
    roster: Arc<dyn RosterStore>,
    private_rooms: Arc<PrivateRooms>,
    /// Live queries opened per join, retained for the repository lifetime.
    live_queries: Mutex<Vec<LiveQuery>>,
}

impl JoinCoordinator {
    pub(crate) fn new(
        store: Store,
        roster: Arc<dyn RosterStore>,
        private_rooms: Arc<PrivateRooms>,
    ) -> Self {
        Self { store, roster, private_rooms, live_queries: Mutex::new(Vec::new()) }
    }

    /// Join a private room from its invitation token.
    ///
    /// A malformed token fails with no side effects. On success the room's
    /// metadata collection starts replicating with a live query that
    /// persists arriving rooms into the roster, and the messages collection
    /// starts replicating so history is warm before any screen asks for it.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[allow(clippy::expect_used)]
    pub(crate) fn join(&self, token: &str) -> Result<RoomInvite, DataError> {
        let invite = match RoomInvite::parse(token) {
            Ok(invite) => invite,
            Err(error) => {
                tracing::warn!(%error, "rejected invitation token");
                return Err(error.into());
            },
        };

        let metadata = self.store.collection(&invite.collection_id);
        metadata.find_all().subscribe();

        let roster = Arc::clone(&self.roster);
        let private_rooms = Arc::clone(&self.private_rooms);
        let live_query = metadata
            .find_all()
            .sort(keys::CREATED_ON, SortDirection::Ascending)
            .observe_local(move |docs, _event| {
                for doc in &docs {
                    let room = Room::from_document(doc);
                    if room.id.is_empty() {
                        continue;
                    }
                    if let Err(error) = roster.insert(&room) {
                        tracing::warn!(%error, room = room.id, "failed to persist joined room");
                    }
                    private_rooms.merge(room);
                }
            });
        self.live_queries.lock().expect("Mutex poisoned").push(live_query);

        // Replicate message history ahead of the first screen visit.
        self.store.collection(&invite.messages_id).find_all().subscribe();

        tracing::debug!(room = invite.room_id, "joined private room");
        Ok(invite)
    }
}
