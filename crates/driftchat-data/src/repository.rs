//! Repository facade aggregating all mirrors and the join coordinator.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use chrono::Utc;
use driftchat_core::{Message, Room, Session, User, keys};
use driftchat_store::{SortDirection, Store};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::{
    CollectionMirror, DataError, Preferences, RetentionPolicy, SubscriptionTable,
    join::{JoinCoordinator, PrivateRooms},
    roster::RosterStore,
};

/// Configuration for [`Repository::initialize`].
#[derive(Debug, Clone, Default)]
pub struct RepositoryConfig {
    /// What happens to a message subscription when its last consumer
    /// releases it. Defaults to counted release; use
    /// [`RetentionPolicy::Forever`] to reproduce the historical
    /// never-release behavior.
    pub retention: RetentionPolicy,
    /// Token cancelled when the process shuts the data layer down.
    pub shutdown: CancellationToken,
}

/// One API surface over the mirrored collections and store writes.
///
/// Reads return `watch` receivers whose latest value always equals the
/// decode of the store's current result set. Writes are fire-and-forget
/// upserts: the writer observes its own write only after it round-trips
/// through the live query.
pub struct Repository {
    store: Store,
    roster: Arc<dyn RosterStore>,
    preferences: Arc<dyn Preferences>,
    public_rooms: CollectionMirror<Room>,
    users: CollectionMirror<User>,
    sessions: CollectionMirror<Session>,
    private_rooms: Arc<PrivateRooms>,
    private_rooms_rx: watch::Receiver<Vec<Room>>,
    join: JoinCoordinator,
    /// Message mirrors keyed by messages collection id, bound lazily.
    messages: Mutex<HashMap<String, CollectionMirror<Message>>>,
    subscriptions: Mutex<SubscriptionTable>,
    shutdown: CancellationToken,
}

impl Repository {
    /// Explicit startup phase for the data layer.
    ///
    /// Reads the roster snapshot, binds the eager mirrors (public rooms,
    /// users, sessions), and returns once every output sequence carries its
    /// initial value. The process lifecycle awaits this before declaring
    /// the data layer ready; the config's cancellation token is the
    /// shutdown hook.
    pub async fn initialize(
        store: Store,
        roster: Arc<dyn RosterStore>,
        preferences: Arc<dyn Preferences>,
        config: RepositoryConfig,
    ) -> Result<Self, DataError> {
        let seed = roster.all_private_rooms()?;
        let (private_rooms, private_rooms_rx) = PrivateRooms::new(seed);

        let public_rooms = CollectionMirror::bind(
            &store,
            keys::PUBLIC_ROOMS_COLLECTION_ID,
            None,
            Room::from_document,
        );
        let users =
            CollectionMirror::bind(&store, keys::USERS_COLLECTION_ID, None, User::from_document);
        let sessions = CollectionMirror::bind(
            &store,
            keys::SESSIONS_COLLECTION_ID,
            None,
            Session::from_document,
        );

        let join =
            JoinCoordinator::new(store.clone(), Arc::clone(&roster), Arc::clone(&private_rooms));

        tracing::debug!("data layer ready");

        Ok(Self {
            store,
            roster,
            preferences,
            public_rooms,
            users,
            sessions,
            private_rooms,
            private_rooms_rx,
            join,
            messages: Mutex::new(HashMap::new()),
            subscriptions: Mutex::new(SubscriptionTable::new(config.retention)),
            shutdown: config.shutdown,
        })
    }

    /// Sequence of all messages in a room, creation time ascending.
    ///
    /// Binds the room's message mirror on first call; idempotent per
    /// messages collection id. Each call registers one consumer in the
    /// subscription table; pair with [`Repository::release_messages_for_room`]
    /// under counted retention.
    ///
    /// # Panics
    ///
    /// Panics if an internal mutex is poisoned.
    #[allow(clippy::expect_used)]
    pub fn all_messages_for_room(&self, room: &Room) -> watch::Receiver<Vec<Message>> {
        let collection_id = room.messages_collection_id.clone();
        self.subscriptions.lock().expect("Mutex poisoned").acquire(&collection_id);

        let mut mirrors = self.messages.lock().expect("Mutex poisoned");
        mirrors
            .entry(collection_id.clone())
            .or_insert_with(|| {
                CollectionMirror::bind(
                    &self.store,
                    &collection_id,
                    Some((keys::CREATED_ON, SortDirection::Ascending)),
                    Message::from_document,
                )
            })
            .watch()
    }

    /// Release one consumer of a room's message sequence.
    ///
    /// Under [`RetentionPolicy::Counted`], the mirror and its replication
    /// subscription are torn down when the last consumer releases.
    /// Subscriptions opened by [`Repository::create_room`] or a join hold
    /// a consumer of their own and are never torn down this way.
    ///
    /// # Panics
    ///
    /// Panics if an internal mutex is poisoned.
    #[allow(clippy::expect_used)]
    pub fn release_messages_for_room(&self, room: &Room) {
        let collection_id = &room.messages_collection_id;
        let teardown =
            self.subscriptions.lock().expect("Mutex poisoned").release(collection_id);
        if teardown {
            if let Some(mirror) =
                self.messages.lock().expect("Mutex poisoned").remove(collection_id)
            {
                mirror.release(&self.store);
            }
        }
    }

    /// Sequence of all users.
    pub fn all_users(&self) -> watch::Receiver<Vec<User>> {
        self.users.watch()
    }

    /// Sequence of all public rooms, in store order.
    pub fn all_public_rooms(&self) -> watch::Receiver<Vec<Room>> {
        self.public_rooms.watch()
    }

    /// Sequence of joined private rooms, creation time ascending.
    pub fn all_private_rooms(&self) -> watch::Receiver<Vec<Room>> {
        self.private_rooms_rx.clone()
    }

    /// Sequence of all sessions.
    pub fn all_sessions(&self) -> watch::Receiver<Vec<Session>> {
        self.sessions.watch()
    }

    /// Create a room and start watching its messages collection.
    ///
    /// Allocates fresh UUIDs for the room and its messages collection
    /// (and, for private rooms, for the metadata collection). The messages
    /// subscription opens before the room document is upserted, so the
    /// creator also watches their own write; that subscription is held for
    /// the repository lifetime and survives counted release.
    ///
    /// # Panics
    ///
    /// Panics if an internal mutex is poisoned.
    #[allow(clippy::expect_used)]
    pub async fn create_room(
        &self,
        name: impl Into<String>,
        is_private: bool,
        user_id: impl Into<String>,
    ) -> Result<Room, DataError> {
        let room = Room::create(name, is_private, user_id);

        self.store.collection(&room.messages_collection_id).find_all().subscribe();
        // The creator's own watch is a consumer with no matching release,
        // so transient bind/release cycles cannot withdraw it.
        self.subscriptions
            .lock()
            .expect("Mutex poisoned")
            .acquire(&room.messages_collection_id);

        self.store.collection(&room.collection_id).upsert(room.to_document()).await?;

        if room.is_private {
            self.roster.insert(&room)?;
            self.private_rooms.merge(room.clone());
        }

        tracing::debug!(room = room.id, private = room.is_private, "created room");
        Ok(room)
    }

    /// Write a message into a room.
    ///
    /// Stamps the current user id (from preferences) and the UTC creation
    /// time, then upserts into the room's messages collection. No local
    /// echo is synthesized: the sender sees the message once the live
    /// query re-delivers.
    pub async fn create_message_for_room(
        &self,
        message: Message,
        room: &Room,
        attachment: Option<Vec<u8>>,
    ) -> Result<(), DataError> {
        let mut message = message;
        message.user_id = self.preferences.fetch_initial_preferences().await.current_user_id;
        message.created_on = Utc::now();
        if attachment.is_some() {
            message.thumbnail = attachment;
        }

        self.store.collection(&room.messages_collection_id).upsert(message.to_document()).await?;
        Ok(())
    }

    /// Upsert a user into the users collection.
    pub async fn add_user(&self, user: &User) -> Result<(), DataError> {
        self.store.collection(keys::USERS_COLLECTION_ID).upsert(user.to_document()).await?;
        Ok(())
    }

    /// Upsert the current user under the identity persisted in preferences.
    pub async fn save_current_user(
        &self,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Result<(), DataError> {
        let user_id = self.preferences.fetch_initial_preferences().await.current_user_id;
        let user = User::with_id(user_id, first_name, last_name);
        self.add_user(&user).await
    }

    /// Upsert a session into the sessions collection.
    pub async fn add_session(&self, session: &Session) -> Result<(), DataError> {
        self.store.collection(keys::SESSIONS_COLLECTION_ID).upsert(session.to_document()).await?;
        Ok(())
    }

    /// Point lookup of a public room.
    ///
    /// On miss, returns the well-known sentinel default public room rather
    /// than a not-found error.
    pub async fn public_room_for_id(&self, room_id: &str) -> Room {
        match self
            .store
            .collection(keys::PUBLIC_ROOMS_COLLECTION_ID)
            .find_by_id(room_id)
            .await
        {
            Some(doc) => Room::from_document(&doc),
            None => Room::sentinel_public(),
        }
    }

    /// Join a private room from an invitation token.
    ///
    /// Malformed tokens fail with [`DataError::Invite`] and open no
    /// subscriptions. On success, the history subscription the join opens
    /// is held for the repository lifetime and survives counted release.
    ///
    /// # Panics
    ///
    /// Panics if an internal mutex is poisoned.
    #[allow(clippy::expect_used)]
    pub fn join_private_room(&self, token: &str) -> Result<(), DataError> {
        let invite = self.join.join(token)?;
        self.subscriptions.lock().expect("Mutex poisoned").acquire(&invite.messages_id);
        Ok(())
    }

    /// Save a room to the durable roster (private rooms also republish on
    /// the private-rooms sequence).
    pub fn save_room(&self, room: &Room) -> Result<(), DataError> {
        self.roster.insert(room)?;
        if room.is_private {
            self.private_rooms.merge(room.clone());
        }
        Ok(())
    }

    /// Shut the data layer down.
    ///
    /// Cancels the shutdown token and, under counted retention, tears down
    /// every message mirror regardless of remaining consumers.
    ///
    /// # Panics
    ///
    /// Panics if an internal mutex is poisoned.
    #[allow(clippy::expect_used)]
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        if self.subscriptions.lock().expect("Mutex poisoned").policy()
            == RetentionPolicy::Counted
        {
            let mirrors = std::mem::take(&mut *self.messages.lock().expect("Mutex poisoned"));
            for (_, mirror) in mirrors {
                mirror.release(&self.store);
            }
        }
        tracing::debug!("data layer shut down");
    }

    /// Token cancelled at shutdown.
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    /// Delete a message. Not yet implemented; succeeds without effect.
    pub async fn delete_message(&self, _message_id: &str) {}

    /// Delete a batch of messages. Not yet implemented; succeeds without
    /// effect.
    pub async fn delete_messages(&self, _message_ids: &[String]) {}

    /// Archive a public room. Not yet implemented; succeeds without effect.
    pub async fn archive_public_room(&self, _room: &Room) {}

    /// Unarchive a public room. Not yet implemented; succeeds without
    /// effect.
    pub async fn unarchive_public_room(&self, _room: &Room) {}

    /// Archive a private room. Not yet implemented; succeeds without
    /// effect.
    pub async fn archive_private_room(&self, _room: &Room) {}

    /// Unarchive a private room. Not yet implemented; succeeds without
    /// effect.
    pub async fn unarchive_private_room(&self, _room: &Room) {}

    /// Delete a private room. Not yet implemented; succeeds without
    /// effect.
    pub async fn delete_private_room(&self, _room: &Room) {}

    /// Create the default public room on first launch. Not yet
    /// implemented; succeeds without effect.
    pub async fn create_default_public_room(&self) {}
}
