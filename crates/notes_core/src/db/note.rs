//! Note storage operations.

use super::tables::ENTITIES;
use super::TenantTxn;
use crate::error::AppError;
use crate::models::{NewNote, Note, NotePatch};
use chrono::{DateTime, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};

/// Persisted shape of a note. Tags are never stored inline.
#[derive(Debug, Serialize, Deserialize)]
struct NoteRecord {
    id: u64,
    title: String,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<&Note> for NoteRecord {
    fn from(note: &Note) -> Self {
        Self {
            id: note.id,
            title: note.title.clone(),
            content: note.content.clone(),
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}

impl From<NoteRecord> for Note {
    fn from(record: NoteRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            content: record.content,
            tags: Vec::new(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

pub(super) fn encode_note(note: &Note) -> Result<Vec<u8>, AppError> {
    Ok(serde_json::to_vec(&NoteRecord::from(note))?)
}

pub(super) fn decode_note(bytes: &[u8]) -> Result<Note, AppError> {
    let record: NoteRecord = serde_json::from_slice(bytes)?;
    Ok(record.into())
}

impl TenantTxn<'_> {
    /// Fetch a note with its tags resolved.
    ///
    /// # Returns
    /// `Ok(Some(note))` when found, `Ok(None)` when missing.
    ///
    /// # Errors
    /// Returns an error when storage access, decoding, or tag resolution fails.
    pub fn find_note_by_id(&self, id: u64) -> Result<Option<Note>, AppError> {
        if id == 0 {
            return Ok(None);
        }
        let Some(bytes) = self.get_raw(&self.keys.note(id))? else {
            return Ok(None);
        };
        let note = decode_note(&bytes)?;
        Ok(Some(self.with_tags(note)?))
    }

    /// List every note of this tenant in id order, each with its tags resolved.
    ///
    /// # Errors
    /// Returns an error when any row fails to decode; malformed rows are never skipped.
    pub fn find_all_notes(&self) -> Result<Vec<Note>, AppError> {
        let mut notes = Vec::new();
        self.scan_prefix(&self.keys.note(0), |_, value| {
            notes.push(decode_note(value)?);
            Ok(())
        })?;

        notes
            .into_iter()
            .map(|note| self.with_tags(note))
            .collect()
    }

    /// Allocate an id, stamp timestamps, and persist a new note.
    ///
    /// # Returns
    /// The stored note (with no tags).
    ///
    /// # Errors
    /// Returns an error when id allocation, encoding, or the write fails.
    /// Nothing is persisted in that case.
    pub fn create_note(&self, new: NewNote) -> Result<Note, AppError> {
        let id = self.db.note_ids.next()?;
        let now = Utc::now();
        let note = Note {
            id,
            title: new.title,
            content: new.content,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        let encoded = encode_note(&note)?;
        self.put(&self.keys.note(id), &encoded)?;
        Ok(note)
    }

    /// Merge `patch` into an existing note and refresh `updated_at`.
    ///
    /// # Returns
    /// `Ok(Some(note))` with tags resolved when updated, `Ok(None)` when the note is missing.
    ///
    /// # Errors
    /// Returns an error when storage access or encoding fails.
    pub fn update_note(&self, id: u64, patch: &NotePatch) -> Result<Option<Note>, AppError> {
        if id == 0 {
            return Ok(None);
        }
        let key = self.keys.note(id);
        let write_txn = self.db.db.begin_write()?;
        let updated = {
            let mut table = write_txn.open_table(ENTITIES)?;
            let Some(guard) = table.get(key.as_slice())? else {
                return Ok(None);
            };
            let mut note = decode_note(guard.value())?;
            drop(guard);

            patch.apply(&mut note, Utc::now());
            let encoded = encode_note(&note)?;
            table.insert(key.as_slice(), encoded.as_slice())?;
            note
        };
        write_txn.commit()?;

        Ok(Some(self.with_tags(updated)?))
    }

    /// Delete a note.
    ///
    /// Association edges that reference the note are left in place.
    ///
    /// # Returns
    /// `true` when a row was removed.
    ///
    /// # Errors
    /// Returns an error when the write fails.
    pub fn delete_note(&self, id: u64) -> Result<bool, AppError> {
        if id == 0 {
            return Ok(false);
        }
        self.remove(&self.keys.note(id))
    }
}
