//! In-process backends used by tests and local dry runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::RwLock;

use super::{Document, DocumentStore, ObjectStorage};
use crate::error::{Result, StorageError};

#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<(String, String), Document>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, collection: &str, id: &str, document: Document) {
        self.documents
            .write()
            .await
            .insert((collection.to_string(), id.to_string()), document);
    }

    pub async fn get(&self, collection: &str, id: &str) -> Option<Document> {
        self.documents
            .read()
            .await
            .get(&(collection.to_string(), id.to_string()))
            .cloned()
    }

    /// Number of successful `replace_by_id` calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("document store is offline".into()));
        }

        Ok(self.get(collection, id).await)
    }

    async fn replace_by_id(&self, collection: &str, id: &str, document: Document) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("document store is offline".into()));
        }

        let mut documents = self.documents.write().await;
        let slot = documents
            .get_mut(&(collection.to_string(), id.to_string()))
            .ok_or(StorageError::NotFound)?;
        *slot = document;
        self.writes.fetch_add(1, Ordering::SeqCst);

        Ok(())
    }
}

/// Stores uploaded objects in memory and serves them under `base_url`.
pub struct MemoryObjectStorage {
    base_url: String,
    objects: RwLock<HashMap<String, StoredObject>>,
    fail_uploads: AtomicBool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl MemoryObjectStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            objects: RwLock::new(HashMap::new()),
            fail_uploads: AtomicBool::new(false),
        }
    }

    pub async fn get(&self, path: &str) -> Option<StoredObject> {
        self.objects.read().await.get(path).cloned()
    }

    pub async fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.objects.read().await.keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl ObjectStorage for MemoryObjectStorage {
    async fn upload_bytes(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("object storage is offline".into()));
        }

        self.objects.write().await.insert(
            path.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );

        Ok(())
    }

    async fn resolve_url(&self, path: &str) -> Result<String> {
        if !self.objects.read().await.contains_key(path) {
            return Err(StorageError::NotFound);
        }

        Ok(format!("{}/{}", self.base_url, path))
    }
}
