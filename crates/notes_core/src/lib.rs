//! Core domain library for the notes backend (config, storage, search, service).

/// Configuration loading and defaults.
pub mod config;
/// Shared defaults used across crates.
pub mod constants;
/// Tenant-scoped key-value storage for notes, tags, and their associations.
pub mod db;
/// Application error types (storage/search/domain).
pub mod error;
/// Data models for API requests and persistence.
pub mod models;
/// Full-text search index over notes.
pub mod search;
/// Repository and search composition.
pub mod service;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use constants::DEFAULT_PORT;
pub use db::{Database, DatabaseOptions, TenantTxn};
pub use error::AppError;
pub use models::{NewNote, NewTag, Note, NotePatch, Tag, TagPatch};
pub use search::{SearchIndex, TantivySearchIndex};
pub use service::NoteService;
