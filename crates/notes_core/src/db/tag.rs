//! Tag storage operations.

use super::tables::ENTITIES;
use super::TenantTxn;
use crate::error::AppError;
use crate::models::{NewTag, Tag, TagPatch};
use chrono::Utc;
use redb::ReadableTable;

fn decode_tag(bytes: &[u8]) -> Result<Tag, AppError> {
    Ok(serde_json::from_slice(bytes)?)
}

impl TenantTxn<'_> {
    /// Fetch a tag by id.
    ///
    /// # Returns
    /// `Ok(Some(tag))` when found, `Ok(None)` when missing.
    ///
    /// # Errors
    /// Returns an error when storage access or decoding fails.
    pub fn find_tag_by_id(&self, id: u64) -> Result<Option<Tag>, AppError> {
        if id == 0 {
            return Ok(None);
        }
        self.get_raw(&self.keys.tag(id))?
            .map(|bytes| decode_tag(&bytes))
            .transpose()
    }

    /// List every tag of this tenant in id order.
    ///
    /// # Errors
    /// Returns an error when storage access fails or any row fails to decode.
    pub fn find_all_tags(&self) -> Result<Vec<Tag>, AppError> {
        let mut tags = Vec::new();
        self.scan_prefix(&self.keys.tag(0), |_, value| {
            tags.push(decode_tag(value)?);
            Ok(())
        })?;
        Ok(tags)
    }

    /// Allocate an id, stamp `created_at`, and persist a new tag.
    ///
    /// # Errors
    /// Returns an error when id allocation, encoding, or the write fails.
    pub fn create_tag(&self, new: NewTag) -> Result<Tag, AppError> {
        let id = self.db.tag_ids.next()?;
        let tag = Tag {
            id,
            name: new.name,
            created_at: Utc::now(),
        };
        let encoded = serde_json::to_vec(&tag)?;
        self.put(&self.keys.tag(id), &encoded)?;
        Ok(tag)
    }

    /// Rename a tag; an empty or missing name keeps the stored one.
    ///
    /// # Returns
    /// `Ok(Some(tag))` when updated, `Ok(None)` when missing.
    ///
    /// # Errors
    /// Returns an error when storage access or encoding fails.
    pub fn update_tag(&self, id: u64, patch: &TagPatch) -> Result<Option<Tag>, AppError> {
        if id == 0 {
            return Ok(None);
        }
        let key = self.keys.tag(id);
        let write_txn = self.db.db.begin_write()?;
        let updated = {
            let mut table = write_txn.open_table(ENTITIES)?;
            let Some(guard) = table.get(key.as_slice())? else {
                return Ok(None);
            };
            let mut tag = decode_tag(guard.value())?;
            drop(guard);

            patch.apply(&mut tag);
            let encoded = serde_json::to_vec(&tag)?;
            table.insert(key.as_slice(), encoded.as_slice())?;
            tag
        };
        write_txn.commit()?;
        Ok(Some(updated))
    }

    /// Delete a tag. Edges pointing at it are left in place.
    ///
    /// # Returns
    /// `true` when a row was removed.
    ///
    /// # Errors
    /// Returns an error when the write fails.
    pub fn delete_tag(&self, id: u64) -> Result<bool, AppError> {
        if id == 0 {
            return Ok(false);
        }
        self.remove(&self.keys.tag(id))
    }
}
