//! Generic collection-to-sequence binding.

use driftchat_core::Document;
use driftchat_store::{LiveQuery, SortDirection, Store};
use tokio::sync::watch;

/// Binds one store collection to one continuously-updated sequence of
/// decoded entities.
///
/// On bind, the mirror opens a replication subscription for the collection,
/// registers a live query, and re-publishes the fully re-decoded result
/// set on every delivery. Consumers hold [`watch::Receiver`]s; each
/// published list fully supersedes the previous one.
///
/// The mirror has no failure channel: an empty collection publishes an
/// empty list, and the decode function is total by construction.
pub struct CollectionMirror<T> {
    collection_id: String,
    live_query: LiveQuery,
    rx: watch::Receiver<Vec<T>>,
}

impl<T: Send + Sync + 'static> CollectionMirror<T> {
    /// Bind a collection, optionally sorted, through a total decode
    /// function.
    ///
    /// Publishes the current result set before returning, so the sequence
    /// always carries a value.
    pub fn bind(
        store: &Store,
        collection_id: &str,
        sort: Option<(&str, SortDirection)>,
        decode: impl Fn(&Document) -> T + Send + Sync + 'static,
    ) -> Self {
        let collection = store.collection(collection_id);

        // Replicate from peers, then watch the local replica.
        collection.find_all().subscribe();

        let mut query = collection.find_all();
        if let Some((key, direction)) = sort {
            query = query.sort(key, direction);
        }

        let (tx, rx) = watch::channel(Vec::new());
        let live_query = query.observe_local(move |docs, _event| {
            let entities: Vec<T> = docs.iter().map(&decode).collect();
            // send_replace: publishing continues even while no receiver
            // is currently held.
            let _ = tx.send_replace(entities);
        });

        Self { collection_id: collection_id.to_owned(), live_query, rx }
    }

    /// Collection this mirror is bound to.
    pub fn collection_id(&self) -> &str {
        &self.collection_id
    }

    /// New receiver for the output sequence.
    pub fn watch(&self) -> watch::Receiver<Vec<T>> {
        self.rx.clone()
    }

    /// Tear the mirror down: cancel the live query and withdraw the
    /// collection's replication subscription.
    ///
    /// Only the repository's subscription table calls this, once no
    /// consumer holds the output sequence.
    pub fn release(self, store: &Store) {
        self.live_query.cancel();
        store.unsubscribe(&self.collection_id);
    }
}

impl<T: Clone + Send + Sync + 'static> CollectionMirror<T> {
    /// Most recently published list.
    pub fn latest(&self) -> Vec<T> {
        self.rx.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use driftchat_core::{Room, keys};

    use super::*;

    #[tokio::test]
    async fn bind_subscribes_and_publishes_initial_empty_list() {
        let store = Store::new();
        let mirror = CollectionMirror::bind(&store, "rooms", None, Room::from_document);

        assert!(store.is_subscribed("rooms"));
        assert!(mirror.latest().is_empty());
    }

    #[tokio::test]
    async fn upserts_republish_the_full_decoded_list() {
        let store = Store::new();
        let mirror = CollectionMirror::bind(
            &store,
            "rooms",
            Some((keys::CREATED_ON, SortDirection::Ascending)),
            Room::from_document,
        );
        let rx = mirror.watch();

        let room = Room::create("General", false, "u1");
        store.collection("rooms").upsert(room.to_document()).await.unwrap();

        let published = rx.borrow();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].name, "General");
    }

    #[tokio::test]
    async fn published_order_follows_query_sort() {
        let store = Store::new();
        let mirror = CollectionMirror::bind(
            &store,
            "rooms",
            Some((keys::CREATED_ON, SortDirection::Ascending)),
            Room::from_document,
        );

        let mut older = Room::create("Older", false, "u1");
        older.created_on -= chrono::Duration::hours(1);
        let newer = Room::create("Newer", false, "u1");

        // Insert newest first; the mirror must still publish ascending.
        store.collection("rooms").upsert(newer.to_document()).await.unwrap();
        store.collection("rooms").upsert(older.to_document()).await.unwrap();

        let names: Vec<String> = mirror.latest().iter().map(|r| r.name.clone()).collect();
        assert_eq!(names, vec!["Older", "Newer"]);
    }

    #[tokio::test]
    async fn release_cancels_query_and_unsubscribes() {
        let store = Store::new();
        let mirror = CollectionMirror::bind(&store, "rooms", None, Room::from_document);
        let rx = mirror.watch();

        mirror.release(&store);
        assert!(!store.is_subscribed("rooms"));

        let room = Room::create("General", false, "u1");
        store.collection("rooms").upsert(room.to_document()).await.unwrap();
        assert!(rx.borrow().is_empty());
    }
}
