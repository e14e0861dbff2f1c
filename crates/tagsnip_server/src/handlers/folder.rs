//! Folder HTTP handlers.

use super::normalize::folder_name;
use crate::{db::TransactionOps, error::HttpError, models::folder::*, AppError, AppState, AuthUser};
use tagsnip_core::error::Entity;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

/// List the caller's folders sorted by name, with snippet counts.
///
/// # Errors
/// Returns an error if listing fails.
pub async fn list_folders(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<FolderSummary>>, HttpError> {
    Ok(Json(state.db.folders.list_with_counts(&user.id)?))
}

/// Get one folder with its snippet count.
///
/// # Errors
/// Returns 404 when the folder is missing or not owned.
pub async fn get_folder(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<FolderSummary>, HttpError> {
    let folder = state
        .db
        .folders
        .summary(&user.id, &id)?
        .ok_or(AppError::NotFound(Entity::Folder))?;
    Ok(Json(folder))
}

/// Create a folder.
///
/// # Arguments
/// - `state`: Application state.
/// - `user`: Authenticated caller.
/// - `req`: Name and optional color (defaults to `default`).
///
/// # Returns
/// `201 Created` with the new folder.
///
/// # Errors
/// Returns 400 for an empty or overlong name.
pub async fn create_folder(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateFolderRequest>,
) -> Result<(StatusCode, Json<FolderSummary>), HttpError> {
    let name = folder_name(&req.name)?;
    let folder = Folder::new(name, req.color.unwrap_or_default(), user.id);
    state.db.folders.create(&folder)?;
    Ok((StatusCode::CREATED, Json(folder.summarize(0))))
}

/// Rename or recolor a folder.
///
/// # Errors
/// Returns 404 when the folder is missing or not owned, 400 for a bad name.
pub async fn update_folder(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(mut req): Json<UpdateFolderRequest>,
) -> Result<Json<FolderSummary>, HttpError> {
    if let Some(name) = req.name.as_deref() {
        req.name = Some(folder_name(name)?);
    }
    state
        .db
        .folders
        .update(&user.id, &id, &req)?
        .ok_or(AppError::NotFound(Entity::Folder))?;
    let summary = state
        .db
        .folders
        .summary(&user.id, &id)?
        .ok_or(AppError::NotFound(Entity::Folder))?;
    Ok(Json(summary))
}

/// Delete a folder; its snippets become unfiled.
///
/// # Errors
/// Returns 404 when the folder is missing or not owned.
pub async fn delete_folder(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, HttpError> {
    let unfiled = TransactionOps::delete_folder(&state.db, &user.id, &id)?
        .ok_or(AppError::NotFound(Entity::Folder))?;
    Ok(Json(json!({
        "message": "Folder deleted",
        "id": id,
        "unfiled": unfiled,
    })))
}
