//! Tag HTTP handlers.

use super::normalize::tag_name;
use crate::{db::TransactionOps, error::HttpError, models::tag::*, AppError, AppState, AuthUser};
use tagsnip_core::error::Entity;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

/// Tags used by the caller's snippets, with counts.
///
/// # Errors
/// Returns an error if listing fails.
pub async fn list_tags(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<TagSummary>>, HttpError> {
    Ok(Json(state.db.tags.list_with_counts(&user.id)?))
}

/// Create a tag explicitly.
///
/// # Errors
/// Returns 409 if the caller already has the tag, 400 for a blank name.
pub async fn create_tag(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateTagRequest>,
) -> Result<(StatusCode, Json<TagSummary>), HttpError> {
    let name = tag_name(&req.name)?;
    let tag = state.db.tags.create(&user.id, &name)?;
    Ok((
        StatusCode::CREATED,
        Json(TagSummary {
            id: tag.id,
            name: tag.name,
            snippet_count: 0,
        }),
    ))
}

/// Delete a tag and strip it from the caller's snippets.
///
/// # Errors
/// Returns 404 when the tag is missing or not owned.
pub async fn delete_tag(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, HttpError> {
    if !TransactionOps::delete_tag(&state.db, &user.id, &id)? {
        return Err(AppError::NotFound(Entity::Tag).into());
    }
    Ok(Json(json!({ "message": "Tag deleted", "id": id })))
}

/// Remove tag rows no snippet references any more.
///
/// # Errors
/// Returns an error if the cleanup transaction fails.
pub async fn cleanup_tags(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<CleanupResponse>, HttpError> {
    let removed = TransactionOps::cleanup_tags(&state.db, &user.id)?;
    if removed > 0 {
        tracing::info!("Removed {} orphaned tags for {}", removed, user.username);
    }
    Ok(Json(CleanupResponse { removed }))
}
