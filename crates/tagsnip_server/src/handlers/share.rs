//! Public, unauthenticated snippet view.

use crate::{error::HttpError, models::snippet::Snippet, AppState};
use tagsnip_core::error::Entity;
use axum::{
    extract::{Path, State},
    Json,
};

/// Fetch any snippet by id without authentication.
///
/// # Errors
/// Returns 404 for unknown ids. The owner id is not exposed.
pub async fn get_shared_snippet(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Snippet>, HttpError> {
    let mut snippet = state.db.snippets.get(&id)?.ok_or_else(|| HttpError::not_found(Entity::Snippet))?;
    snippet.user_id = None;
    Ok(Json(snippet))
}
