//! Export, import and stats handlers.

use crate::{
    db::TransactionOps,
    error::HttpError,
    models::transfer::{ExportDocument, ImportRequest, ImportResult, StatsResponse},
    AppState, AuthUser,
};
use axum::{extract::State, Json};

/// Export all of the caller's snippets and tags.
///
/// # Errors
/// Returns an error if storage access fails.
pub async fn export_all(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ExportDocument>, HttpError> {
    let snippets = state.db.snippets.all_for_user(&user.id)?;
    let tags = state.db.tags.list_with_counts(&user.id)?;
    Ok(Json(ExportDocument::new(snippets, tags)))
}

/// Import snippets for the caller; invalid entries are skipped and reported.
///
/// # Errors
/// Returns an error if the import transaction fails.
pub async fn import_snippets(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<ImportRequest>,
) -> Result<Json<ImportResult>, HttpError> {
    let result = TransactionOps::import_snippets(
        &state.db,
        &user.id,
        req.snippets,
        state.config.max_snippet_size,
    )?;
    tracing::info!(
        "Imported {} snippets for {} ({} skipped)",
        result.imported,
        user.username,
        result.skipped
    );
    Ok(Json(result))
}

/// Counts, language distribution and the five most recently updated snippets.
///
/// # Errors
/// Returns an error if storage access fails.
pub async fn stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<StatsResponse>, HttpError> {
    let snippets = state.db.snippets.all_for_user(&user.id)?;
    let total_tags = state.db.tags.list_with_counts(&user.id)?.len();
    Ok(Json(StatsResponse::from_snippets(&snippets, total_tags)))
}
