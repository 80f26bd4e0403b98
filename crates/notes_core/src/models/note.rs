//! Note models.

use super::{non_empty, Tag};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A note with its resolved tags.
///
/// `tags` is never persisted; it is rebuilt from association edges on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: u64,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating a note.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewNote {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// Partial note update; empty or missing fields keep the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl NewNote {
    /// Build a creation payload.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

impl NotePatch {
    /// Merge this patch into `note` and refresh its update timestamp.
    pub(crate) fn apply(&self, note: &mut Note, now: DateTime<Utc>) {
        if let Some(title) = non_empty(&self.title) {
            note.title = title.to_string();
        }
        if let Some(content) = non_empty(&self.content) {
            note.content = content.to_string();
        }
        note.updated_at = now;
    }
}
