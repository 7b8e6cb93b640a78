pub mod firebase_storage;
pub mod firestore;
pub mod memory;

#[cfg(test)]
mod test_server;

use crate::error::Result;

pub use firebase_storage::FirebaseStorageClient;
pub use firestore::FirestoreClient;
pub use memory::{MemoryDocumentStore, MemoryObjectStorage};

/// Top-level fields of a stored document.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Remote document database keyed by collection and document id.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns `None` when the document does not exist.
    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// Replaces every field of an existing document.
    ///
    /// This is not a merge: fields present in the stored document but
    /// absent from `document` are dropped.
    ///
    /// Fails with [`StorageError::NotFound`](crate::error::StorageError::NotFound)
    /// when there is no document under `id`.
    async fn replace_by_id(&self, collection: &str, id: &str, document: Document) -> Result<()>;
}

/// Remote blob storage addressed by slash-separated paths.
#[async_trait::async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload_bytes(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<()>;

    /// Public download URL for an uploaded object.
    async fn resolve_url(&self, path: &str) -> Result<String>;
}
