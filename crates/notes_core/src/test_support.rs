//! Shared test-only helpers for notes_core.

use crate::db::{Database, DatabaseOptions};
use crate::search::TantivySearchIndex;
use tempfile::TempDir;

/// Creates an isolated temporary database and returns it with the temp dir.
///
/// Keep the [`TempDir`] alive for the full test to preserve the backing files.
///
/// # Panics
/// Panics if temp-dir creation or database initialization fails.
pub(crate) fn setup_temp_db() -> (Database, TempDir) {
    setup_temp_db_with(DatabaseOptions::default())
}

/// Like [`setup_temp_db`] with explicit storage options.
pub(crate) fn setup_temp_db_with(options: DatabaseOptions) -> (Database, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let db_path = temp_dir.path().join("kv");
    let db = Database::open(db_path.to_str().expect("db path"), options).expect("db");
    (db, temp_dir)
}

/// Creates an empty on-disk search index in its own temp dir.
pub(crate) fn setup_temp_index() -> (TantivySearchIndex, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let index_path = temp_dir.path().join("index");
    let index = TantivySearchIndex::open(index_path.to_str().expect("index path"), 50)
        .expect("search index");
    (index, temp_dir)
}
