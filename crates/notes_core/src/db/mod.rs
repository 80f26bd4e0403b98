//! Tenant-scoped storage of notes, tags, and note/tag associations on redb.

/// Note/tag association edges and tag resolution.
pub mod assoc;
/// Bounded parallel lookups.
pub mod fanout;
/// Key layout.
pub mod keys;
/// Note storage operations.
pub mod note;
/// Leased id sequences.
pub mod sequence;
/// Table definitions.
pub mod tables;
/// Tag storage operations.
pub mod tag;

use crate::constants::{DEFAULT_ID_LEASE_SIZE, DEFAULT_MAX_TAG_LOOKUPS};
use crate::error::AppError;
use keys::KeyEncoder;
use redb::ReadableDatabase;
use sequence::Sequence;
use std::path::Path;
use std::sync::Arc;
use tables::{ENTITIES, NOTE_ID_SEQUENCE, REDB_FILE_NAME, SEQUENCES, TAG_ID_SEQUENCE};

/// Storage tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseOptions {
    /// Ids reserved per persisted sequence lease.
    pub id_lease_size: u64,
    /// Maximum concurrent tag lookups while resolving one note.
    pub max_tag_lookups: usize,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            id_lease_size: DEFAULT_ID_LEASE_SIZE,
            max_tag_lookups: DEFAULT_MAX_TAG_LOOKUPS,
        }
    }
}

/// Repository handle: owns the redb database and both id sequences.
pub struct Database {
    pub(crate) db: Arc<redb::Database>,
    note_ids: Sequence,
    tag_ids: Sequence,
    lookup_pool: rayon::ThreadPool,
}

/// Reads and mutations for one tenant.
///
/// Every key this handle touches is prefixed with its tenant id.
pub struct TenantTxn<'a> {
    db: &'a Database,
    keys: KeyEncoder,
}

impl Database {
    /// Open (or create) the database in directory `path` with default options.
    ///
    /// # Returns
    /// A fully initialized [`Database`].
    ///
    /// # Errors
    /// Returns an error if the directory, database file, tables, or sequences
    /// cannot be initialized.
    pub fn new(path: &str) -> Result<Self, AppError> {
        Self::open(path, DatabaseOptions::default())
    }

    /// Open (or create) the database in directory `path`.
    ///
    /// # Errors
    /// Returns an error if the directory, database file, tables, or sequences
    /// cannot be initialized.
    pub fn open(path: &str, options: DatabaseOptions) -> Result<Self, AppError> {
        let dir = Path::new(path);
        std::fs::create_dir_all(dir).map_err(|err| {
            AppError::StorageMessage(format!(
                "Failed to create database directory '{}': {}",
                dir.display(),
                err
            ))
        })?;

        let db = Arc::new(redb::Database::create(dir.join(REDB_FILE_NAME))?);
        Self::from_shared(db, options)
    }

    /// Build a repository over an already-open redb instance.
    ///
    /// # Errors
    /// Returns an error if tables or sequences cannot be initialized.
    pub fn from_shared(db: Arc<redb::Database>, options: DatabaseOptions) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(ENTITIES)?;
        write_txn.open_table(SEQUENCES)?;
        write_txn.commit()?;

        let note_ids = Sequence::open(db.clone(), NOTE_ID_SEQUENCE, options.id_lease_size)?;
        let tag_ids = Sequence::open(db.clone(), TAG_ID_SEQUENCE, options.id_lease_size)?;
        tracing::info!(
            "Opened note store (id lease {}, tag lookup width {})",
            options.id_lease_size,
            options.max_tag_lookups
        );

        Ok(Self {
            db,
            note_ids,
            tag_ids,
            lookup_pool: fanout::lookup_pool(options.max_tag_lookups)?,
        })
    }

    /// Scope subsequent reads and writes to `tenant_id`.
    ///
    /// # Errors
    /// Returns [`AppError::InvalidTenant`] when the id is empty or contains a NUL byte.
    pub fn transaction(&self, tenant_id: &str) -> Result<TenantTxn<'_>, AppError> {
        Ok(TenantTxn {
            db: self,
            keys: KeyEncoder::new(tenant_id)?,
        })
    }

    /// Release sequence leases so unissued ids are not skipped on the next open.
    ///
    /// The file handle itself closes when the last handle is dropped.
    ///
    /// # Errors
    /// Returns the first lease release failure; both leases are always attempted.
    pub fn close(&self) -> Result<(), AppError> {
        tracing::info!("Closing note store");
        let notes = self.note_ids.release();
        let tags = self.tag_ids.release();
        notes.and(tags)
    }
}

impl TenantTxn<'_> {
    /// Tenant this handle is scoped to.
    pub fn tenant_id(&self) -> &str {
        self.keys.tenant_id()
    }

    fn get_raw(&self, key: &[u8]) -> Result<Option<Vec<u8>>, AppError> {
        let read_txn = self.db.db.begin_read()?;
        let table = read_txn.open_table(ENTITIES)?;
        let value = table.get(key)?.map(|guard| guard.value().to_vec());
        Ok(value)
    }

    /// Visit every row whose key starts with `prefix`, in key order, inside one snapshot.
    fn scan_prefix<F>(&self, prefix: &[u8], mut visit: F) -> Result<(), AppError>
    where
        F: FnMut(&[u8], &[u8]) -> Result<(), AppError>,
    {
        let read_txn = self.db.db.begin_read()?;
        let table = read_txn.open_table(ENTITIES)?;
        for item in table.range(prefix..)? {
            let (key, value) = item?;
            if !key.value().starts_with(prefix) {
                break;
            }
            visit(key.value(), value.value())?;
        }
        Ok(())
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), AppError> {
        let write_txn = self.db.db.begin_write()?;
        {
            let mut table = write_txn.open_table(ENTITIES)?;
            table.insert(key, value)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn remove(&self, key: &[u8]) -> Result<bool, AppError> {
        let write_txn = self.db.db.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(ENTITIES)?;
            let previous = table.remove(key)?;
            previous.is_some()
        };
        write_txn.commit()?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests;
