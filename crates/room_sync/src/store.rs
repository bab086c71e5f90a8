//! Document store abstraction and an in-memory backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::error::StoreError;

/// A document is a JSON object; merges work on its top-level fields.
pub type Document = Map<String, Value>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Overwrite only the given top-level fields instead of the whole
    /// document. A merge into a missing document creates it.
    pub merge: bool,
}

impl SetOptions {
    pub fn merge() -> Self {
        Self { merge: true }
    }

    pub fn replace() -> Self {
        Self { merge: false }
    }
}

/// Live view of one document. Yields the current contents as soon as it is
/// opened and again after every write, the subscriber's own included.
pub struct Subscription {
    snapshots: mpsc::UnboundedReceiver<Document>,
}

impl Subscription {
    pub fn new(snapshots: mpsc::UnboundedReceiver<Document>) -> Self {
        Self { snapshots }
    }

    /// Next snapshot, or `None` once the backend dropped the feed.
    /// Cancel safe.
    pub async fn next(&mut self) -> Option<Document> {
        self.snapshots.recv().await
    }

    /// Skip to the most recent snapshot already delivered, if any.
    pub fn latest(&mut self) -> Option<Document> {
        let mut last = None;
        while let Ok(doc) = self.snapshots.try_recv() {
            last = Some(doc);
        }
        last
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store `doc` under a fresh id and return the id.
    async fn create(&self, collection: &str, doc: Document) -> Result<String, StoreError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    async fn set(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
        options: SetOptions,
    ) -> Result<(), StoreError>;

    async fn subscribe(&self, collection: &str, id: &str) -> Result<Subscription, StoreError>;
}

type Key = (String, String);

#[derive(Default)]
struct Inner {
    docs: HashMap<Key, Document>,
    watchers: HashMap<Key, Vec<mpsc::UnboundedSender<Document>>>,
}

impl Inner {
    fn notify(&mut self, key: &Key) {
        let Some(doc) = self.docs.get(key) else {
            return;
        };
        if let Some(watchers) = self.watchers.get_mut(key) {
            // Dropped subscriptions fall out here
            watchers.retain(|tx| tx.send(doc.clone()).is_ok());
            trace!(collection = %key.0, id = %key.1, watchers = watchers.len(), "snapshot sent");
        }
    }
}

/// Process-local store. Clones share the same documents, so two sessions
/// holding clones behave like two clients of one backend.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
    offline: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate losing (or regaining) the connection. While offline every
    /// operation fails with [`StoreError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.offline.store(!available, Ordering::SeqCst);
        debug!(available, "memory store availability changed");
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable)
        } else {
            Ok(())
        }
    }
}

fn key(collection: &str, id: &str) -> Key {
    (collection.to_string(), id.to_string())
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(&self, collection: &str, doc: Document) -> Result<String, StoreError> {
        self.check_online()?;
        let id = Uuid::new_v4().simple().to_string();
        let mut inner = self.inner.lock().await;
        inner.docs.insert(key(collection, &id), doc);
        debug!(%collection, %id, "document created");
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        self.check_online()?;
        let inner = self.inner.lock().await;
        Ok(inner.docs.get(&key(collection, id)).cloned())
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
        options: SetOptions,
    ) -> Result<(), StoreError> {
        self.check_online()?;
        let k = key(collection, id);
        let mut inner = self.inner.lock().await;
        if options.merge {
            inner.docs.entry(k.clone()).or_default().extend(fields);
        } else {
            inner.docs.insert(k.clone(), fields);
        }
        inner.notify(&k);
        Ok(())
    }

    async fn subscribe(&self, collection: &str, id: &str) -> Result<Subscription, StoreError> {
        self.check_online()?;
        let k = key(collection, id);
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock().await;
        if let Some(doc) = inner.docs.get(&k) {
            // A closed receiver cannot exist yet; rx is still in scope
            let _ = tx.send(doc.clone());
        }
        inner.watchers.entry(k).or_default().push(tx);
        Ok(Subscription::new(rx))
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod store_tests;
