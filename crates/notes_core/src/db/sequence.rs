//! Leased id sequences persisted in the `sequences` table.

use super::tables::SEQUENCES;
use crate::error::AppError;
use redb::{ReadableDatabase, ReadableTable};
use std::sync::{Arc, Mutex, MutexGuard};

#[cfg(test)]
use std::sync::atomic::{AtomicBool, Ordering};

/// In-memory window of reserved ids: `next..leased` may be issued without a write.
#[derive(Debug)]
struct Lease {
    next: u64,
    leased: u64,
}

/// Monotonic id allocator that reserves `bandwidth` ids per durable write.
///
/// Id `0` is never issued.
pub struct Sequence {
    db: Arc<redb::Database>,
    name: &'static str,
    bandwidth: u64,
    lease: Mutex<Lease>,
    #[cfg(test)]
    fail_next_persist: AtomicBool,
}

impl Sequence {
    /// Open the sequence `name` and reserve its first lease.
    ///
    /// # Arguments
    /// - `db`: Shared database handle.
    /// - `name`: Counter row name in the `sequences` table.
    /// - `bandwidth`: Ids reserved per persisted lease (clamped to at least 1).
    ///
    /// # Returns
    /// A ready [`Sequence`] whose first lease is already durable.
    ///
    /// # Errors
    /// Returns an error when the counter cannot be read or the lease cannot be persisted.
    pub fn open(
        db: Arc<redb::Database>,
        name: &'static str,
        bandwidth: u64,
    ) -> Result<Self, AppError> {
        let start = {
            let read_txn = db.begin_read()?;
            let table = read_txn.open_table(SEQUENCES)?;
            let stored = table.get(name)?.map(|guard| guard.value());
            stored.unwrap_or(0)
        };

        let sequence = Self {
            db,
            name,
            bandwidth: bandwidth.max(1),
            lease: Mutex::new(Lease {
                next: start,
                leased: start,
            }),
            #[cfg(test)]
            fail_next_persist: AtomicBool::new(false),
        };

        let leased = sequence.lease_end(start)?;
        sequence.persist(leased)?;
        sequence.lock()?.leased = leased;
        tracing::debug!("Sequence '{}' leased ids {}..{}", name, start, leased);
        Ok(sequence)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Lease>, AppError> {
        self.lease.lock().map_err(|_| {
            AppError::StorageMessage(format!("Sequence '{}' lock poisoned", self.name))
        })
    }

    fn lease_end(&self, from: u64) -> Result<u64, AppError> {
        from.checked_add(self.bandwidth)
            .ok_or_else(|| AppError::Sequence(format!("sequence '{}' exhausted", self.name)))
    }

    fn persist(&self, value: u64) -> Result<(), AppError> {
        #[cfg(test)]
        if self.fail_next_persist.swap(false, Ordering::SeqCst) {
            return Err(AppError::Sequence(format!(
                "injected persist failure for '{}'",
                self.name
            )));
        }

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(SEQUENCES)?;
            table.insert(self.name, value)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Issue the next id, refilling the lease from storage when it runs out.
    ///
    /// # Returns
    /// A fresh id, strictly greater than every id issued before it.
    ///
    /// # Errors
    /// Returns an error when a refill cannot be persisted; no id is issued in that case.
    pub fn next(&self) -> Result<u64, AppError> {
        let mut lease = self.lock()?;
        if lease.next == 0 {
            lease.next = 1;
        }
        if lease.next >= lease.leased {
            let leased = self.lease_end(lease.next)?;
            self.persist(leased)
                .map_err(|err| AppError::Sequence(format!("refill of '{}' failed: {}", self.name, err)))?;
            tracing::debug!(
                "Sequence '{}' refilled ids {}..{}",
                self.name,
                lease.next,
                leased
            );
            lease.leased = leased;
        }

        let id = lease.next;
        lease.next += 1;
        Ok(id)
    }

    /// Return unissued ids of the current lease to storage.
    ///
    /// Safe to call more than once; a later [`Sequence::next`] leases again.
    ///
    /// # Errors
    /// Returns an error when the counter cannot be persisted.
    pub fn release(&self) -> Result<(), AppError> {
        let mut lease = self.lock()?;
        self.persist(lease.next)?;
        lease.leased = lease.next;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn fail_next_persist(&self) {
        self.fail_next_persist.store(true, Ordering::SeqCst);
    }

    #[cfg(test)]
    pub(crate) fn stored_value(&self) -> Result<Option<u64>, AppError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SEQUENCES)?;
        let value = table.get(self.name)?.map(|guard| guard.value());
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tables::SEQUENCES;
    use tempfile::TempDir;

    fn open_db() -> (Arc<redb::Database>, TempDir) {
        let dir = TempDir::new().expect("temp dir");
        let db = redb::Database::create(dir.path().join("seq.redb")).expect("create db");
        let write_txn = db.begin_write().expect("begin write");
        write_txn.open_table(SEQUENCES).expect("open table");
        write_txn.commit().expect("commit");
        (Arc::new(db), dir)
    }

    #[test]
    fn first_id_is_one_and_ids_increase() {
        let (db, _dir) = open_db();
        let seq = Sequence::open(db, "ids", 3).expect("open");
        let ids: Vec<u64> = (0..7).map(|_| seq.next().expect("next")).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn open_persists_lease_upper_bound() {
        let (db, _dir) = open_db();
        let seq = Sequence::open(db, "ids", 10).expect("open");
        assert_eq!(seq.stored_value().expect("read"), Some(10));
        seq.next().expect("next");
        assert_eq!(seq.stored_value().expect("read"), Some(10));
    }

    #[test]
    fn reopen_without_release_skips_rest_of_lease() {
        let (db, _dir) = open_db();
        let first = Sequence::open(db.clone(), "ids", 10).expect("open");
        assert_eq!(first.next().expect("next"), 1);
        drop(first);

        let second = Sequence::open(db, "ids", 10).expect("reopen");
        assert_eq!(second.next().expect("next"), 10);
    }

    #[test]
    fn release_returns_unissued_ids() {
        let (db, _dir) = open_db();
        let first = Sequence::open(db.clone(), "ids", 10).expect("open");
        assert_eq!(first.next().expect("next"), 1);
        assert_eq!(first.next().expect("next"), 2);
        first.release().expect("release");
        first.release().expect("second release is harmless");
        drop(first);

        let second = Sequence::open(db, "ids", 10).expect("reopen");
        assert_eq!(second.next().expect("next"), 3);
    }

    #[test]
    fn next_after_release_keeps_counting() {
        let (db, _dir) = open_db();
        let seq = Sequence::open(db, "ids", 4).expect("open");
        assert_eq!(seq.next().expect("next"), 1);
        seq.release().expect("release");
        assert_eq!(seq.next().expect("next"), 2);
        assert_eq!(seq.stored_value().expect("read"), Some(6));
    }

    #[test]
    fn failed_refill_issues_no_id_and_recovers() {
        let (db, _dir) = open_db();
        let seq = Sequence::open(db, "ids", 1).expect("open");
        assert_eq!(seq.next().expect("next"), 1);

        seq.fail_next_persist();
        let err = seq.next().expect_err("refill must fail");
        assert!(matches!(err, AppError::Sequence(_)), "unexpected: {}", err);

        assert_eq!(seq.next().expect("next after recovery"), 2);
    }

    #[test]
    fn separate_sequences_count_independently() {
        let (db, _dir) = open_db();
        let notes = Sequence::open(db.clone(), "notes", 5).expect("open notes");
        let tags = Sequence::open(db, "tags", 5).expect("open tags");
        assert_eq!(notes.next().expect("note"), 1);
        assert_eq!(notes.next().expect("note"), 2);
        assert_eq!(tags.next().expect("tag"), 1);
    }
}
