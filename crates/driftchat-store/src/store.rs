//! Store handle, collections, and the local replica.

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    sync::{Arc, Mutex},
};

use driftchat_core::{Document, keys};
use uuid::Uuid;

use crate::{
    LiveQuery, LiveQueryEvent, Query, StoreError,
    query::{ObserverCallback, Sort},
};

/// Handle to the document store.
///
/// Cheap to clone; clones share the same underlying replica. Thread-safe
/// through an internal mutex, using `lock().expect()` per the storage
/// poisoning policy: a poisoned mutex means another thread panicked while
/// holding the lock, and the replica state can no longer be trusted.
#[derive(Clone, Default)]
pub struct Store {
    inner: Arc<Mutex<StoreInner>>,
}

#[derive(Default)]
struct StoreInner {
    /// Documents per collection, keyed by document id.
    collections: HashMap<String, BTreeMap<String, Document>>,
    /// Registered live query observers per collection.
    observers: HashMap<String, Vec<Observer>>,
    /// Collection ids currently replicating from peers.
    subscriptions: BTreeSet<String>,
    /// Monotonic observer id source.
    next_observer_id: u64,
    /// Monotonic write version per collection. Snapshots are stamped with
    /// the version they were taken at; deliveries carrying a superseded
    /// version are dropped.
    versions: HashMap<String, u64>,
}

struct Observer {
    id: u64,
    sort: Option<Sort>,
    callback: ObserverCallback,
    /// Highest version delivered so far, shared with in-flight deliveries.
    delivered: Arc<Mutex<u64>>,
}

/// One pending observer delivery, snapshotted under the store lock.
struct Delivery {
    callback: ObserverCallback,
    docs: Vec<Document>,
    gate: Arc<Mutex<u64>>,
    version: u64,
}

/// Run deliveries outside the store lock.
///
/// The per-observer gate serializes deliveries to one observer and drops
/// any snapshot a later write has already superseded, so a slow thread
/// cannot regress an observer to a stale result set.
#[allow(clippy::expect_used)]
fn deliver_updates(deliveries: Vec<Delivery>) {
    for delivery in deliveries {
        let mut last = delivery.gate.lock().expect("Mutex poisoned");
        if delivery.version > *last {
            *last = delivery.version;
            (delivery.callback)(delivery.docs, LiveQueryEvent::Update);
        }
    }
}

impl Store {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to a named collection. Collections are created lazily on
    /// first write; reading a nonexistent collection yields no documents.
    pub fn collection(&self, id: impl Into<String>) -> Collection {
        Collection { store: self.clone(), id: id.into() }
    }

    /// Collection ids with an active replication subscription.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[allow(clippy::expect_used)]
    pub fn subscribed_collections(&self) -> Vec<String> {
        self.inner.lock().expect("Mutex poisoned").subscriptions.iter().cloned().collect()
    }

    /// Whether the collection is currently replicating.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[allow(clippy::expect_used)]
    pub fn is_subscribed(&self, collection_id: &str) -> bool {
        self.inner.lock().expect("Mutex poisoned").subscriptions.contains(collection_id)
    }

    /// Stop replicating a collection.
    ///
    /// Live query observers on the collection keep reading the local
    /// replica; only the peer-to-peer sync directive is withdrawn.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[allow(clippy::expect_used)]
    pub fn unsubscribe(&self, collection_id: &str) {
        self.inner.lock().expect("Mutex poisoned").subscriptions.remove(collection_id);
        tracing::debug!(collection = collection_id, "subscription released");
    }

    /// Start replicating a collection. Idempotent per collection id.
    #[allow(clippy::expect_used)]
    pub(crate) fn subscribe(&self, collection_id: &str) {
        let newly = self
            .inner
            .lock()
            .expect("Mutex poisoned")
            .subscriptions
            .insert(collection_id.to_owned());
        if newly {
            tracing::debug!(collection = collection_id, "subscription opened");
        }
    }

    /// Register a live query observer and deliver the initial snapshot.
    ///
    /// The observer is retained by the store until cancelled through the
    /// returned handle; dropping the handle does not unregister it.
    #[allow(clippy::expect_used)]
    pub(crate) fn register_observer(
        &self,
        collection_id: &str,
        sort: Option<Sort>,
        callback: ObserverCallback,
    ) -> LiveQuery {
        let (observer_id, snapshot, version, gate) = {
            let mut inner = self.inner.lock().expect("Mutex poisoned");
            let observer_id = inner.next_observer_id;
            inner.next_observer_id += 1;

            let version = inner.versions.get(collection_id).copied().unwrap_or_default();
            let snapshot = inner.documents_sorted(collection_id, sort.as_ref());
            let gate = Arc::new(Mutex::new(0));
            inner.observers.entry(collection_id.to_owned()).or_default().push(Observer {
                id: observer_id,
                sort,
                callback: Arc::clone(&callback),
                delivered: Arc::clone(&gate),
            });
            (observer_id, snapshot, version, gate)
        };

        // Initial delivery happens outside the lock so the callback may
        // freely touch the store. A write racing with registration may
        // deliver first; its snapshot then supersedes the initial one.
        {
            let mut last = gate.lock().expect("Mutex poisoned");
            if version >= *last {
                *last = version;
                callback(snapshot, LiveQueryEvent::Initial);
            }
        }

        LiveQuery::new(self.clone(), collection_id.to_owned(), observer_id)
    }

    /// Remove a live query observer. No-op if already removed.
    #[allow(clippy::expect_used)]
    pub(crate) fn cancel_observer(&self, collection_id: &str, observer_id: u64) {
        let mut inner = self.inner.lock().expect("Mutex poisoned");
        if let Some(observers) = inner.observers.get_mut(collection_id) {
            observers.retain(|observer| observer.id != observer_id);
        }
    }

    /// Insert or replace a document, then re-deliver every observer's
    /// result set.
    #[allow(clippy::expect_used)]
    pub(crate) fn upsert_document(
        &self,
        collection_id: &str,
        doc: Document,
    ) -> Result<String, StoreError> {
        let doc_id = match doc.get(keys::ID) {
            Some(serde_json::Value::String(id)) => id.clone(),
            Some(other) => {
                return Err(StoreError::InvalidDocument(format!(
                    "_id must be a string, got {other}"
                )));
            },
            None => Uuid::new_v4().to_string(),
        };

        let doc = doc.with(keys::ID, doc_id.clone());

        let deliveries = {
            let mut inner = self.inner.lock().expect("Mutex poisoned");
            inner
                .collections
                .entry(collection_id.to_owned())
                .or_default()
                .insert(doc_id.clone(), doc);

            let version = {
                let version = inner.versions.entry(collection_id.to_owned()).or_insert(0);
                *version += 1;
                *version
            };
            inner.pending_notifications(collection_id, version)
        };

        // Callbacks run outside the lock: observers may read or write the
        // store from within a delivery (though not the collection they
        // observe, since deliveries to one observer are serialized).
        deliver_updates(deliveries);

        Ok(doc_id)
    }

    /// Point lookup by document id. `None` on miss.
    #[allow(clippy::expect_used)]
    pub(crate) fn document_by_id(&self, collection_id: &str, doc_id: &str) -> Option<Document> {
        self.inner
            .lock()
            .expect("Mutex poisoned")
            .collections
            .get(collection_id)
            .and_then(|docs| docs.get(doc_id))
            .cloned()
    }

    /// Full (optionally sorted) result set of a collection.
    #[allow(clippy::expect_used)]
    pub(crate) fn documents(&self, collection_id: &str, sort: Option<&Sort>) -> Vec<Document> {
        self.inner.lock().expect("Mutex poisoned").documents_sorted(collection_id, sort)
    }
}

impl StoreInner {
    fn documents_sorted(&self, collection_id: &str, sort: Option<&Sort>) -> Vec<Document> {
        let mut docs: Vec<Document> =
            self.collections.get(collection_id).map(|docs| docs.values().cloned().collect())
                .unwrap_or_default();
        if let Some(sort) = sort {
            sort.apply(&mut docs);
        }
        docs
    }

    /// Snapshot each observer's callback with its sorted result set,
    /// stamped with the write version the snapshot was taken at.
    fn pending_notifications(&self, collection_id: &str, version: u64) -> Vec<Delivery> {
        self.observers
            .get(collection_id)
            .map(|observers| {
                observers
                    .iter()
                    .map(|observer| Delivery {
                        callback: Arc::clone(&observer.callback),
                        docs: self.documents_sorted(collection_id, observer.sort.as_ref()),
                        gate: Arc::clone(&observer.delivered),
                        version,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Handle to a named collection in the store.
#[derive(Clone)]
pub struct Collection {
    store: Store,
    id: String,
}

impl Collection {
    /// Collection id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Insert or replace a document, returning its id.
    ///
    /// Generates a fresh UUID `_id` when the document has none. Suspends
    /// only until the local replica acknowledges the write; remote
    /// convergence is asynchronous.
    pub async fn upsert(&self, doc: Document) -> Result<String, StoreError> {
        self.store.upsert_document(&self.id, doc)
    }

    /// Query over all documents in the collection.
    pub fn find_all(&self) -> Query {
        Query::new(self.store.clone(), self.id.clone())
    }

    /// Point lookup against the local replica. `None` on miss.
    pub async fn find_by_id(&self, doc_id: &str) -> Option<Document> {
        self.store.document_by_id(&self.id, doc_id)
    }
}
