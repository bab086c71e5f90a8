//! Directory-backed document store.
//!
//! Each document is a pretty-printed JSON file at
//! `<root>/<collection>/<id>.json`, so several processes on one machine can
//! share rooms through a common directory. Subscriptions poll the file and
//! deliver a snapshot whenever its contents change; writes landing within
//! one poll interval arrive as a single snapshot.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::{Document, DocumentStore, SetOptions, Subscription};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    poll_interval: Duration,
    /// Serializes read-modify-write merges within this process
    write_lock: Arc<Mutex<()>>,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `None` for ids that are not plain file names.
    fn path(&self, collection: &str, id: &str) -> Option<PathBuf> {
        if !is_plain_name(collection) || !is_plain_name(id) {
            return None;
        }
        Some(self.root.join(collection).join(format!("{id}.json")))
    }

    fn path_or_missing(&self, collection: &str, id: &str) -> Result<PathBuf, StoreError> {
        self.path(collection, id).ok_or_else(|| StoreError::Missing {
            collection: collection.to_string(),
            id: id.to_string(),
        })
    }
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn io_error(path: &Path, e: impl std::fmt::Display) -> StoreError {
    StoreError::Io(format!("{}: {e}", path.display()))
}

fn read_doc(path: &Path) -> Result<Option<Document>, StoreError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_error(path, e)),
    };
    match serde_json::from_str(&text).map_err(|e| io_error(path, e))? {
        Value::Object(doc) => Ok(Some(doc)),
        _ => Err(io_error(path, "not a JSON object")),
    }
}

/// Write through a temporary file so readers never see half a document.
fn write_doc(path: &Path, doc: &Document) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(doc).map_err(|e| StoreError::Encode(e.to_string()))?;
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;
    }
    let tmp = path.with_extension(format!("json.{}.tmp", Uuid::new_v4().simple()));
    std::fs::write(&tmp, json).map_err(|e| io_error(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| io_error(path, e))
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn create(&self, collection: &str, doc: Document) -> Result<String, StoreError> {
        let id = Uuid::new_v4().simple().to_string();
        let path = self.path_or_missing(collection, &id)?;
        let _guard = self.write_lock.lock().await;
        write_doc(&path, &doc)?;
        debug!(%collection, %id, path = %path.display(), "document created");
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        match self.path(collection, id) {
            Some(path) => read_doc(&path),
            None => Ok(None),
        }
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
        options: SetOptions,
    ) -> Result<(), StoreError> {
        let path = self.path_or_missing(collection, id)?;
        let _guard = self.write_lock.lock().await;
        let doc = if options.merge {
            let mut doc = read_doc(&path)?.unwrap_or_default();
            doc.extend(fields);
            doc
        } else {
            fields
        };
        write_doc(&path, &doc)
    }

    async fn subscribe(&self, collection: &str, id: &str) -> Result<Subscription, StoreError> {
        let path = self.path_or_missing(collection, id)?;
        let mut last = read_doc(&path)?;
        let (tx, rx) = mpsc::unbounded_channel();
        if let Some(doc) = &last {
            // rx is still in scope, so this cannot fail
            let _ = tx.send(doc.clone());
        }

        let poll_interval = self.poll_interval;
        tokio::spawn(async move {
            let mut ticks = tokio::time::interval(poll_interval);
            loop {
                ticks.tick().await;
                if tx.is_closed() {
                    trace!(path = %path.display(), "subscription dropped");
                    break;
                }
                match read_doc(&path) {
                    Ok(Some(doc)) if last.as_ref() != Some(&doc) => {
                        if tx.send(doc.clone()).is_err() {
                            break;
                        }
                        last = Some(doc);
                    }
                    Ok(_) => {}
                    Err(e) => warn!(error = %e, "room file unreadable; still polling"),
                }
            }
        });
        Ok(Subscription::new(rx))
    }
}

#[cfg(test)]
#[path = "file_store_tests.rs"]
mod file_store_tests;
