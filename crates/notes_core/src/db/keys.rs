//! Tenant-scoped byte key layout.
//!
//! Every key is `tenant || 0x00 || type code || 0x00 || entity key`, where the
//! entity key is empty (type prefix), one big-endian id, or two big-endian ids
//! for association edges. Big-endian ids keep byte order equal to numeric order.

use crate::error::AppError;

/// Separator byte between key segments. Tenant ids may not contain it.
pub const KEY_SEP: u8 = 0;

/// Width of one encoded id.
pub const ID_LEN: usize = std::mem::size_of::<u64>();

/// Record kinds addressed by a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    Note,
    Tag,
    NoteToTag,
    TagToNote,
}

impl EntityType {
    /// Short type code embedded in the key.
    pub fn code(self) -> &'static [u8] {
        match self {
            Self::Note => b"n",
            Self::Tag => b"t",
            Self::NoteToTag => b"nt",
            Self::TagToNote => b"tn",
        }
    }
}

/// Check that a tenant id can be embedded in a key without ambiguity.
///
/// # Errors
/// Returns [`AppError::InvalidTenant`] for empty ids or ids containing the separator byte.
pub fn validate_tenant(tenant_id: &str) -> Result<(), AppError> {
    if tenant_id.is_empty() {
        return Err(AppError::InvalidTenant(
            "tenant id must not be empty".to_string(),
        ));
    }
    if tenant_id.as_bytes().contains(&KEY_SEP) {
        return Err(AppError::InvalidTenant(
            "tenant id must not contain NUL bytes".to_string(),
        ));
    }
    Ok(())
}

/// Encode an id as 8 big-endian bytes.
pub fn encode_id(id: u64) -> [u8; ID_LEN] {
    id.to_be_bytes()
}

/// Decode an id stored as 8 big-endian bytes.
///
/// # Errors
/// Returns a storage error when `bytes` is not exactly 8 bytes long.
pub fn decode_id(bytes: &[u8]) -> Result<u64, AppError> {
    let raw: [u8; ID_LEN] = bytes.try_into().map_err(|_| {
        AppError::StorageMessage(format!(
            "Malformed id: expected {} bytes, found {}",
            ID_LEN,
            bytes.len()
        ))
    })?;
    Ok(u64::from_be_bytes(raw))
}

/// Builds keys for one tenant.
#[derive(Debug, Clone)]
pub struct KeyEncoder {
    tenant_id: String,
}

impl KeyEncoder {
    /// Create an encoder for `tenant_id`.
    ///
    /// # Errors
    /// Returns [`AppError::InvalidTenant`] when the tenant id is unusable.
    pub fn new(tenant_id: &str) -> Result<Self, AppError> {
        validate_tenant(tenant_id)?;
        Ok(Self {
            tenant_id: tenant_id.to_string(),
        })
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    fn with_entity_key(&self, kind: EntityType, entity_key: &[u8]) -> Vec<u8> {
        let code = kind.code();
        let mut key = Vec::with_capacity(self.tenant_id.len() + code.len() + 2 + entity_key.len());
        key.extend_from_slice(self.tenant_id.as_bytes());
        key.push(KEY_SEP);
        key.extend_from_slice(code);
        key.push(KEY_SEP);
        key.extend_from_slice(entity_key);
        key
    }

    /// Prefix covering every record of `kind` for this tenant.
    pub fn type_prefix(&self, kind: EntityType) -> Vec<u8> {
        self.with_entity_key(kind, &[])
    }

    fn single(&self, kind: EntityType, id: u64) -> Vec<u8> {
        if id == 0 {
            return self.type_prefix(kind);
        }
        self.with_entity_key(kind, &encode_id(id))
    }

    fn edge(&self, kind: EntityType, from: u64, to: u64) -> Vec<u8> {
        let mut ids = Vec::with_capacity(ID_LEN * 2);
        ids.extend_from_slice(&encode_id(from));
        if to > 0 {
            ids.extend_from_slice(&encode_id(to));
        }
        self.with_entity_key(kind, &ids)
    }

    /// Key of note `id`; `0` yields the prefix of all notes.
    pub fn note(&self, id: u64) -> Vec<u8> {
        self.single(EntityType::Note, id)
    }

    /// Key of tag `id`; `0` yields the prefix of all tags.
    pub fn tag(&self, id: u64) -> Vec<u8> {
        self.single(EntityType::Tag, id)
    }

    /// Note→tag edge key; `tag_id == 0` yields the prefix of all tags of the note.
    pub fn note_tag(&self, note_id: u64, tag_id: u64) -> Vec<u8> {
        self.edge(EntityType::NoteToTag, note_id, tag_id)
    }

    /// Tag→note edge key; `note_id == 0` yields the prefix of all notes of the tag.
    pub fn tag_note(&self, tag_id: u64, note_id: u64) -> Vec<u8> {
        self.edge(EntityType::TagToNote, tag_id, note_id)
    }
}
