//! Composition of the note repository and the search index.

use crate::db::{Database, TenantTxn};
use crate::error::AppError;
use crate::models::{NewNote, Note};
use crate::search::SearchIndex;
use std::sync::Arc;

/// Entry point used by the HTTP layer.
///
/// Holds the repository and the search index as separate dependencies.
/// Note updates, deletes, and tag changes do not touch the search index.
#[derive(Clone)]
pub struct NoteService {
    repo: Arc<Database>,
    index: Arc<dyn SearchIndex>,
}

impl NoteService {
    pub fn new(repo: Arc<Database>, index: Arc<dyn SearchIndex>) -> Self {
        Self { repo, index }
    }

    /// Repository-scoped operations for `tenant_id`.
    ///
    /// # Errors
    /// Returns [`AppError::InvalidTenant`] for an unusable tenant id.
    pub fn transaction(&self, tenant_id: &str) -> Result<TenantTxn<'_>, AppError> {
        self.repo.transaction(tenant_id)
    }

    /// Persist a note, then add it to the search index.
    ///
    /// # Errors
    /// Returns the storage error if persisting fails. If only indexing fails,
    /// the note stays stored and the index error is returned.
    pub fn create_note(&self, tenant_id: &str, new: NewNote) -> Result<Note, AppError> {
        let note = self.repo.transaction(tenant_id)?.create_note(new)?;
        if let Err(err) = self.index.index_note(tenant_id, &note) {
            tracing::warn!(
                "Note {} stored for tenant {} but indexing failed: {}",
                note.id,
                tenant_id,
                err
            );
            return Err(err);
        }
        Ok(note)
    }

    pub fn index_note(&self, tenant_id: &str, note: &Note) -> Result<(), AppError> {
        self.index.index_note(tenant_id, note)
    }

    pub fn remove_note(&self, tenant_id: &str, id: u64) -> Result<(), AppError> {
        self.index.remove_note(tenant_id, id)
    }

    /// Search this tenant's notes and load each hit from the repository, in rank order.
    ///
    /// Hits whose note no longer exists are skipped.
    ///
    /// # Errors
    /// Returns the search error or the first repository lookup failure.
    pub fn search_notes(&self, tenant_id: &str, query: &str) -> Result<Vec<Note>, AppError> {
        let tx = self.repo.transaction(tenant_id)?;
        let ids = self.index.search(tenant_id, query)?;

        let mut notes = Vec::with_capacity(ids.len());
        for id in ids {
            match tx.find_note_by_id(id)? {
                Some(note) => notes.push(note),
                None => tracing::debug!(
                    "Search hit {} for tenant {} is no longer stored",
                    id,
                    tenant_id
                ),
            }
        }
        Ok(notes)
    }

    /// Release repository resources.
    ///
    /// # Errors
    /// Returns an error when sequence leases cannot be persisted.
    pub fn close(&self) -> Result<(), AppError> {
        self.repo.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewTag;
    use crate::search::TantivySearchIndex;
    use crate::test_support::setup_temp_db;
    use std::sync::Mutex;

    fn service() -> (NoteService, tempfile::TempDir) {
        let (db, temp) = setup_temp_db();
        let index = TantivySearchIndex::in_memory(50).expect("index");
        (NoteService::new(Arc::new(db), Arc::new(index)), temp)
    }

    /// Index double that fails every write and returns a fixed hit list.
    struct ScriptedIndex {
        hits: Vec<u64>,
        writes: Mutex<usize>,
    }

    impl SearchIndex for ScriptedIndex {
        fn index_note(&self, _tenant_id: &str, _note: &Note) -> Result<(), AppError> {
            *self.writes.lock().expect("lock") += 1;
            Err(AppError::SearchMessage("index offline".to_string()))
        }

        fn remove_note(&self, _tenant_id: &str, id: u64) -> Result<(), AppError> {
            Err(AppError::SearchDocumentMissing(id))
        }

        fn search(&self, _tenant_id: &str, _query: &str) -> Result<Vec<u64>, AppError> {
            Ok(self.hits.clone())
        }
    }

    #[test]
    fn tagged_note_is_searchable_only_by_its_tenant() {
        let (service, _temp) = service();
        let tx = service.transaction("T1").expect("tenant");

        let note = tx
            .create_note(NewNote::new("Taco Tuesday", "tacos are great"))
            .expect("create note");
        let tag = tx.create_tag(NewTag::new("food")).expect("create tag");
        tx.tag_note(note.id, tag.id).expect("tag note");
        let tagged = tx.find_note_by_id(note.id).expect("find").expect("note");
        service.index_note("T1", &tagged).expect("index");

        let hits = service.search_notes("T1", "tacos").expect("search");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, note.id);
        assert_eq!(hits[0].tags[0].name, "food");

        assert!(service.search_notes("T2", "tacos").expect("search").is_empty());
    }

    #[test]
    fn create_note_indexes_immediately() {
        let (service, _temp) = service();
        let note = service
            .create_note("T1", NewNote::new("Burrito night", "beans"))
            .expect("create");

        let hits = service.search_notes("T1", "burrito").expect("search");
        assert_eq!(hits.iter().map(|n| n.id).collect::<Vec<_>>(), vec![note.id]);
    }

    #[test]
    fn index_failure_keeps_stored_note() {
        let (db, _temp) = setup_temp_db();
        let index = Arc::new(ScriptedIndex {
            hits: Vec::new(),
            writes: Mutex::new(0),
        });
        let service = NoteService::new(Arc::new(db), index.clone());

        let err = service
            .create_note("T1", NewNote::new("orphan", ""))
            .expect_err("index failure surfaces");
        assert!(matches!(err, AppError::SearchMessage(_)));
        assert_eq!(*index.writes.lock().expect("lock"), 1);

        let stored = service.transaction("T1").expect("tenant").find_all_notes().expect("list");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].title, "orphan");
    }

    #[test]
    fn search_keeps_rank_order_and_skips_missing_notes() {
        let (db, _temp) = setup_temp_db();
        let db = Arc::new(db);
        let (first, second) = {
            let tx = db.transaction("T1").expect("tenant");
            let first = tx.create_note(NewNote::new("first", "")).expect("create");
            let second = tx.create_note(NewNote::new("second", "")).expect("create");
            (first.id, second.id)
        };
        let index = Arc::new(ScriptedIndex {
            hits: vec![second, 9_999, first],
            writes: Mutex::new(0),
        });
        let service = NoteService::new(db, index);

        let hits = service.search_notes("T1", "anything").expect("search");
        assert_eq!(hits.iter().map(|n| n.id).collect::<Vec<_>>(), vec![second, first]);
    }

    #[test]
    fn updates_are_not_reindexed() {
        let (service, _temp) = service();
        let note = service
            .create_note("T1", NewNote::new("Salsa", "mild"))
            .expect("create");
        service
            .transaction("T1")
            .expect("tenant")
            .update_note(
                note.id,
                &crate::models::NotePatch {
                    title: None,
                    content: Some("spicy".to_string()),
                },
            )
            .expect("update")
            .expect("note");

        assert!(service.search_notes("T1", "spicy").expect("search").is_empty());
        let stale = service.search_notes("T1", "mild").expect("search");
        assert_eq!(stale[0].content, "spicy");
    }

    #[test]
    fn remove_note_requires_indexed_document() {
        let (service, _temp) = service();
        let note = service
            .create_note("T1", NewNote::new("Nachos", ""))
            .expect("create");

        service.remove_note("T1", note.id).expect("remove");
        assert!(matches!(
            service.remove_note("T1", note.id),
            Err(AppError::SearchDocumentMissing(_))
        ));
        service.close().expect("close");
    }
}
