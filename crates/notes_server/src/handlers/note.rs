//! Note HTTP handlers.

use crate::{
    error::HttpError,
    models::{NewNote, NotePatch},
    tenant::Tenant,
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
}

fn note_not_found(id: u64) -> HttpError {
    HttpError::not_found(format!("Note {} not found", id))
}

/// Create a note and add it to the search index.
///
/// # Returns
/// The created note as JSON with a `Location` header.
///
/// # Errors
/// Returns an error if persistence or indexing fails.
pub async fn create_note(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    Json(req): Json<NewNote>,
) -> Result<Response, HttpError> {
    let note = state.service.create_note(&tenant, req)?;
    let location = format!("/notes/{}", note.id);
    Ok(([(header::LOCATION, location)], Json(note)).into_response())
}

/// List all notes, or search them when `q` is present.
pub async fn list_notes(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    Query(query): Query<ListQuery>,
) -> Result<Response, HttpError> {
    let notes = match query.q {
        Some(q) => state.service.search_notes(&tenant, &q)?,
        None => state.service.transaction(&tenant)?.find_all_notes()?,
    };
    Ok(Json(notes).into_response())
}

pub async fn get_note(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    Path(id): Path<u64>,
) -> Result<Response, HttpError> {
    let note = state
        .service
        .transaction(&tenant)?
        .find_note_by_id(id)?
        .ok_or_else(|| note_not_found(id))?;
    Ok(Json(note).into_response())
}

/// Merge non-empty fields into a stored note.
///
/// The search index is left untouched.
pub async fn update_note(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    Path(id): Path<u64>,
    Json(patch): Json<NotePatch>,
) -> Result<StatusCode, HttpError> {
    state
        .service
        .transaction(&tenant)?
        .update_note(id, &patch)?
        .ok_or_else(|| note_not_found(id))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_note(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    Path(id): Path<u64>,
) -> Result<StatusCode, HttpError> {
    if !state.service.transaction(&tenant)?.delete_note(id)? {
        return Err(note_not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Attach or detach a tag; both the note and the tag must exist.
fn change_tag(
    state: &AppState,
    tenant: &str,
    note_id: u64,
    tag_id: u64,
    attach: bool,
) -> Result<StatusCode, HttpError> {
    let tx = state.service.transaction(tenant)?;
    if tx.find_note_by_id(note_id)?.is_none() {
        return Err(note_not_found(note_id));
    }
    if tx.find_tag_by_id(tag_id)?.is_none() {
        return Err(HttpError::not_found(format!("Tag {} not found", tag_id)));
    }

    if attach {
        tx.tag_note(note_id, tag_id)?;
    } else {
        tx.untag_note(note_id, tag_id)?;
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn tag_note(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    Path((note_id, tag_id)): Path<(u64, u64)>,
) -> Result<StatusCode, HttpError> {
    change_tag(&state, &tenant, note_id, tag_id, true)
}

pub async fn untag_note(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    Path((note_id, tag_id)): Path<(u64, u64)>,
) -> Result<StatusCode, HttpError> {
    change_tag(&state, &tenant, note_id, tag_id, false)
}
