//! Database integration tests.

use super::*;
use crate::models::{NewNote, NewTag, NotePatch, TagPatch};
use crate::test_support::{setup_temp_db, setup_temp_db_with};
use std::collections::HashSet;

fn tag_names(note: &crate::models::Note) -> Vec<&str> {
    note.tags.iter().map(|tag| tag.name.as_str()).collect()
}

mod concurrency;
mod tenancy;
