//! Data models for notes and tags.

/// Note models and request payloads.
pub mod note;
/// Tag models and request payloads.
pub mod tag;

pub use note::{NewNote, Note, NotePatch};
pub use tag::{NewTag, Tag, TagPatch};

/// Treat empty strings in a patch the same as an absent field.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}
