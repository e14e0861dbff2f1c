//! Tab-state HTTP handlers.

use crate::{error::HttpError, models::tab::TabsState, AppState, AuthUser};
use axum::{extract::State, Json};
use serde_json::{json, Value};

/// The caller's saved tabs, sorted by order.
///
/// # Errors
/// Returns an error if storage access fails.
pub async fn get_tabs(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<TabsState>, HttpError> {
    Ok(Json(state.db.tabs.get(&user.id)?))
}

/// Replace the caller's saved tabs.
///
/// # Errors
/// Returns 400 when more than one entry is flagged active.
pub async fn save_tabs(
    State(state): State<AppState>,
    user: AuthUser,
    Json(tabs): Json<TabsState>,
) -> Result<Json<Value>, HttpError> {
    state.db.tabs.put(&user.id, &tabs)?;
    Ok(Json(json!({ "message": "Tabs saved" })))
}
