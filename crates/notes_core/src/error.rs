//! Application error types for core storage, search, and domain logic.
use thiserror::Error;

/// Top-level application error type.
///
/// Absence of an entity is never an error here: lookups return `Ok(None)`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] redb::Error),

    #[error("Storage error: {0}")]
    StorageMessage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Sequence allocation failed: {0}")]
    Sequence(String),

    #[error("Invalid tenant: {0}")]
    InvalidTenant(String),

    #[error("Search error: {0}")]
    Search(#[from] tantivy::TantivyError),

    #[error("Search error: {0}")]
    SearchMessage(String),

    #[error("Note {0} not found in search index")]
    SearchDocumentMissing(u64),
}

impl From<redb::DatabaseError> for AppError {
    fn from(value: redb::DatabaseError) -> Self {
        Self::Database(value.into())
    }
}

impl From<redb::TransactionError> for AppError {
    fn from(value: redb::TransactionError) -> Self {
        Self::Database(value.into())
    }
}

impl From<redb::TableError> for AppError {
    fn from(value: redb::TableError) -> Self {
        Self::Database(value.into())
    }
}

impl From<redb::StorageError> for AppError {
    fn from(value: redb::StorageError) -> Self {
        Self::Database(value.into())
    }
}

impl From<redb::CommitError> for AppError {
    fn from(value: redb::CommitError) -> Self {
        Self::Database(value.into())
    }
}

impl From<tantivy::directory::error::OpenDirectoryError> for AppError {
    fn from(value: tantivy::directory::error::OpenDirectoryError) -> Self {
        Self::Search(value.into())
    }
}
