//! Tag models.

use super::non_empty;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tag that can be attached to any number of notes within one tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: u64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Request payload for creating a tag.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTag {
    #[serde(default)]
    pub name: String,
}

/// Partial tag update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagPatch {
    pub name: Option<String>,
}

impl NewTag {
    /// Build a creation payload.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl TagPatch {
    pub(crate) fn apply(&self, tag: &mut Tag) {
        if let Some(name) = non_empty(&self.name) {
            tag.name = name.to_string();
        }
    }
}
