pub mod backend;
pub mod dto;
pub mod error;
pub mod models;
pub mod repository;

pub use backend::{Document, DocumentStore, ObjectStorage};
pub use error::{Result, StorageError};
