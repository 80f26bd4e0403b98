//! Mirrored note/tag association edges and tag resolution.
//!
//! Each association is stored twice: `nt` (note → tag, value = tag id) and
//! `tn` (tag → note, value = note id). Both rows are written or removed in the
//! same redb write transaction. Deleting a note or tag does not touch its edges.

use super::fanout::parallel_map;
use super::keys::{decode_id, encode_id};
use super::tables::ENTITIES;
use super::TenantTxn;
use crate::error::AppError;
use crate::models::Note;

impl TenantTxn<'_> {
    /// Associate a note with a tag. Re-tagging an existing pair is a no-op overwrite.
    ///
    /// Neither side is checked for existence. Id `0` on either side is a no-op.
    ///
    /// # Errors
    /// Returns an error when the write fails; neither edge is stored in that case.
    pub fn tag_note(&self, note_id: u64, tag_id: u64) -> Result<(), AppError> {
        if note_id == 0 || tag_id == 0 {
            return Ok(());
        }
        let note_to_tag = self.keys.note_tag(note_id, tag_id);
        let tag_to_note = self.keys.tag_note(tag_id, note_id);
        let tag_value = encode_id(tag_id);
        let note_value = encode_id(note_id);

        let write_txn = self.db.db.begin_write()?;
        {
            let mut table = write_txn.open_table(ENTITIES)?;
            table.insert(note_to_tag.as_slice(), tag_value.as_slice())?;
            table.insert(tag_to_note.as_slice(), note_value.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Remove the association between a note and a tag, if any.
    ///
    /// # Errors
    /// Returns an error when the write fails; both edges are kept in that case.
    pub fn untag_note(&self, note_id: u64, tag_id: u64) -> Result<(), AppError> {
        if note_id == 0 || tag_id == 0 {
            return Ok(());
        }
        let note_to_tag = self.keys.note_tag(note_id, tag_id);
        let tag_to_note = self.keys.tag_note(tag_id, note_id);

        let write_txn = self.db.db.begin_write()?;
        {
            let mut table = write_txn.open_table(ENTITIES)?;
            table.remove(note_to_tag.as_slice())?;
            table.remove(tag_to_note.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Tag ids linked to `note_id`, in ascending id order.
    ///
    /// # Errors
    /// Returns an error when storage access fails or an edge value is malformed.
    pub fn tag_ids_for_note(&self, note_id: u64) -> Result<Vec<u64>, AppError> {
        if note_id == 0 {
            return Ok(Vec::new());
        }
        self.edge_targets(self.keys.note_tag(note_id, 0))
    }

    /// Note ids linked to `tag_id`, in ascending id order.
    ///
    /// # Errors
    /// Returns an error when storage access fails or an edge value is malformed.
    pub fn note_ids_for_tag(&self, tag_id: u64) -> Result<Vec<u64>, AppError> {
        if tag_id == 0 {
            return Ok(Vec::new());
        }
        self.edge_targets(self.keys.tag_note(tag_id, 0))
    }

    fn edge_targets(&self, prefix: Vec<u8>) -> Result<Vec<u64>, AppError> {
        let mut ids = Vec::new();
        self.scan_prefix(&prefix, |_, value| {
            ids.push(decode_id(value)?);
            Ok(())
        })?;
        Ok(ids)
    }

    /// Notes linked to `tag_id`, each with tags resolved.
    ///
    /// Edges whose note no longer exists are skipped.
    ///
    /// # Errors
    /// Returns the first storage or decoding error.
    pub fn find_notes_for_tag(&self, tag_id: u64) -> Result<Vec<Note>, AppError> {
        let mut notes = Vec::new();
        for note_id in self.note_ids_for_tag(tag_id)? {
            match self.find_note_by_id(note_id)? {
                Some(note) => notes.push(note),
                None => tracing::debug!(
                    "Skipping dangling tag->note edge {} -> {} for tenant {}",
                    tag_id,
                    note_id,
                    self.tenant_id()
                ),
            }
        }
        Ok(notes)
    }

    /// Replace `note.tags` with the tags currently linked to it.
    ///
    /// Lookups fan out across the store's bounded lookup pool. Edges whose tag
    /// no longer exists are skipped.
    pub(super) fn with_tags(&self, mut note: Note) -> Result<Note, AppError> {
        let note_id = note.id;
        let tag_ids = self.tag_ids_for_note(note_id)?;
        let found = parallel_map(&self.db.lookup_pool, &tag_ids, |tag_id| {
            self.find_tag_by_id(*tag_id)
        })?;

        note.tags = tag_ids
            .iter()
            .zip(found)
            .filter_map(|(tag_id, tag)| {
                if tag.is_none() {
                    tracing::debug!(
                        "Skipping dangling note->tag edge {} -> {} for tenant {}",
                        note_id,
                        tag_id,
                        self.tenant_id()
                    );
                }
                tag
            })
            .collect();
        Ok(note)
    }
}
