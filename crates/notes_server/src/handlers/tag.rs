//! Tag HTTP handlers.

use crate::{error::HttpError, models::NewTag, tenant::Tenant, AppState};
use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};

/// Create a tag.
///
/// # Returns
/// The created tag as JSON with a `Location` header.
pub async fn create_tag(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    Json(req): Json<NewTag>,
) -> Result<Response, HttpError> {
    let tag = state.service.transaction(&tenant)?.create_tag(req)?;
    let location = format!("/tags/{}", tag.id);
    Ok(([(header::LOCATION, location)], Json(tag)).into_response())
}

pub async fn list_tags(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
) -> Result<Response, HttpError> {
    let tags = state.service.transaction(&tenant)?.find_all_tags()?;
    Ok(Json(tags).into_response())
}

/// Notes currently associated with a tag.
pub async fn list_tag_notes(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    Path(id): Path<u64>,
) -> Result<Response, HttpError> {
    let tx = state.service.transaction(&tenant)?;
    if tx.find_tag_by_id(id)?.is_none() {
        return Err(HttpError::not_found(format!("Tag {} not found", id)));
    }
    Ok(Json(tx.find_notes_for_tag(id)?).into_response())
}
