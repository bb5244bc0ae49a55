//! Queries, live queries, and replication subscriptions.

use std::{cmp::Ordering, sync::Arc};

use driftchat_core::Document;

use crate::Store;

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest sort key first.
    Ascending,
    /// Largest sort key first.
    Descending,
}

/// Sort policy applied to a query's result set.
#[derive(Debug, Clone)]
pub(crate) struct Sort {
    key: String,
    direction: SortDirection,
}

impl Sort {
    /// Stable-sort documents by the string rendering of the sort field.
    ///
    /// ISO-8601 timestamp strings sort lexicographically in chronological
    /// order, which is what the created-on sorts rely on. Documents missing
    /// the field sort first (empty key).
    pub(crate) fn apply(&self, docs: &mut [Document]) {
        docs.sort_by(|a, b| {
            let ordering = compare_values(a, b, &self.key);
            match self.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
    }
}

fn compare_values(a: &Document, b: &Document, key: &str) -> Ordering {
    sort_key(a, key).cmp(&sort_key(b, key))
}

fn sort_key(doc: &Document, key: &str) -> String {
    match doc.get(key) {
        Some(serde_json::Value::String(value)) => value.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Event accompanying a live query delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveQueryEvent {
    /// First delivery: the result set as of observer registration.
    Initial,
    /// Re-delivery after a local replica change.
    Update,
}

/// Callback type for live query observers.
pub(crate) type ObserverCallback = Arc<dyn Fn(Vec<Document>, LiveQueryEvent) + Send + Sync>;

/// A query over one collection, optionally sorted.
#[derive(Clone)]
pub struct Query {
    store: Store,
    collection_id: String,
    sort: Option<Sort>,
}

impl Query {
    pub(crate) fn new(store: Store, collection_id: String) -> Self {
        Self { store, collection_id, sort: None }
    }

    /// Sort results by a field.
    pub fn sort(mut self, key: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = Some(Sort { key: key.into(), direction });
        self
    }

    /// Start replicating this query's collection from peers.
    ///
    /// Idempotent per collection id; there is no handle to hold. The
    /// directive stays active until [`Store::unsubscribe`].
    pub fn subscribe(&self) {
        self.store.subscribe(&self.collection_id);
    }

    /// Register a live query against the local replica.
    ///
    /// The callback receives the full (sorted) result set immediately with
    /// [`LiveQueryEvent::Initial`], then again after every local change
    /// with [`LiveQueryEvent::Update`]. Each delivery fully supersedes the
    /// previous one; deliveries to one observer are serialized and a
    /// snapshot superseded by a later write is dropped, so the last
    /// delivery always carries the newest result set. The callback may
    /// read or write the store, but must not write to the collection it
    /// observes. The observer is retained by the store for the process
    /// lifetime unless cancelled through the returned handle.
    pub fn observe_local(
        &self,
        callback: impl Fn(Vec<Document>, LiveQueryEvent) + Send + Sync + 'static,
    ) -> LiveQuery {
        self.store.register_observer(&self.collection_id, self.sort.clone(), Arc::new(callback))
    }

    /// Execute once against the local replica.
    pub async fn exec(&self) -> Vec<Document> {
        self.store.documents(&self.collection_id, self.sort.as_ref())
    }
}

/// Handle to a registered live query observer.
///
/// Dropping the handle leaves the observer registered; [`LiveQuery::cancel`]
/// removes it.
pub struct LiveQuery {
    store: Store,
    collection_id: String,
    observer_id: u64,
}

impl LiveQuery {
    pub(crate) fn new(store: Store, collection_id: String, observer_id: u64) -> Self {
        Self { store, collection_id, observer_id }
    }

    /// Collection this live query observes.
    pub fn collection_id(&self) -> &str {
        &self.collection_id
    }

    /// Unregister the observer. Further local changes are not delivered.
    pub fn cancel(self) {
        self.store.cancel_observer(&self.collection_id, self.observer_id);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use driftchat_core::keys;

    use super::*;

    fn doc(id: &str, created_on: &str) -> Document {
        Document::new().with(keys::ID, id).with(keys::CREATED_ON, created_on)
    }

    #[tokio::test]
    async fn sort_ascending_by_created_on() {
        let store = Store::new();
        let msgs = store.collection("msgs");
        msgs.upsert(doc("b", "2024-02-01T00:00:00.000Z")).await.unwrap();
        msgs.upsert(doc("a", "2024-01-01T00:00:00.000Z")).await.unwrap();
        msgs.upsert(doc("c", "2024-03-01T00:00:00.000Z")).await.unwrap();

        let docs =
            msgs.find_all().sort(keys::CREATED_ON, SortDirection::Ascending).exec().await;
        let ids: Vec<String> = docs.iter().map(Document::id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn sort_descending_reverses() {
        let store = Store::new();
        let msgs = store.collection("msgs");
        msgs.upsert(doc("a", "2024-01-01T00:00:00.000Z")).await.unwrap();
        msgs.upsert(doc("b", "2024-02-01T00:00:00.000Z")).await.unwrap();

        let docs =
            msgs.find_all().sort(keys::CREATED_ON, SortDirection::Descending).exec().await;
        assert_eq!(docs[0].id(), "b");
    }

    #[tokio::test]
    async fn observer_gets_initial_snapshot_then_updates() {
        let store = Store::new();
        let rooms = store.collection("rooms");
        rooms.upsert(doc("r1", "2024-01-01T00:00:00.000Z")).await.unwrap();

        let seen: Arc<Mutex<Vec<(usize, LiveQueryEvent)>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _live = rooms.find_all().observe_local(move |docs, event| {
            sink.lock().unwrap().push((docs.len(), event));
        });

        rooms.upsert(doc("r2", "2024-02-01T00:00:00.000Z")).await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(*seen, vec![(1, LiveQueryEvent::Initial), (2, LiveQueryEvent::Update)]);
    }

    #[tokio::test]
    async fn observer_on_empty_collection_gets_empty_initial() {
        let store = Store::new();
        let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _live = store.collection("rooms").find_all().observe_local(move |docs, _| {
            sink.lock().unwrap().push(docs.len());
        });

        assert_eq!(*seen.lock().unwrap(), vec![0]);
    }

    #[tokio::test]
    async fn cancelled_observer_stops_receiving() {
        let store = Store::new();
        let rooms = store.collection("rooms");

        let seen: Arc<Mutex<usize>> = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&seen);
        let live = rooms.find_all().observe_local(move |_, _| {
            *sink.lock().unwrap() += 1;
        });

        live.cancel();
        rooms.upsert(doc("r1", "2024-01-01T00:00:00.000Z")).await.unwrap();

        // Only the initial delivery landed.
        assert_eq!(*seen.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn observer_may_write_to_the_store_from_a_delivery() {
        let store = Store::new();
        let rooms = store.collection("rooms");

        let echo_store = store.clone();
        let _live = rooms.find_all().observe_local(move |docs, event| {
            if event == LiveQueryEvent::Update && docs.len() == 1 {
                // Reentrant write into a different collection must not deadlock.
                let _ = echo_store.upsert_document(
                    "audit",
                    Document::new().with(keys::TEXT, "room seen"),
                );
            }
        });

        rooms.upsert(doc("r1", "2024-01-01T00:00:00.000Z")).await.unwrap();
        assert_eq!(store.collection("audit").find_all().exec().await.len(), 1);
    }
}
