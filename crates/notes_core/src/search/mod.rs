//! Full-text search over notes, partitioned by tenant.

mod tantivy_index;

pub use tantivy_index::TantivySearchIndex;

use crate::error::AppError;
use crate::models::Note;

/// Tenant-partitioned full-text index of notes.
///
/// Implementations must never return ids indexed under another tenant.
pub trait SearchIndex: Send + Sync {
    /// Add or replace the document for `note` under `tenant_id`.
    ///
    /// # Errors
    /// Returns an error when the document cannot be written or committed.
    fn index_note(&self, tenant_id: &str, note: &Note) -> Result<(), AppError>;

    /// Remove the document for note `id` under `tenant_id`.
    ///
    /// # Errors
    /// Returns [`AppError::SearchDocumentMissing`] when no such document exists.
    fn remove_note(&self, tenant_id: &str, id: u64) -> Result<(), AppError>;

    /// Ids of this tenant's notes matching `query`, best match first.
    ///
    /// # Errors
    /// Returns an error when the index cannot be read.
    fn search(&self, tenant_id: &str, query: &str) -> Result<Vec<u64>, AppError>;
}
