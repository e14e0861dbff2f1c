//! Snippet HTTP handlers.

use super::normalize::{normalized_limit, validate_snippet_fields};
use crate::{
    db::TransactionOps, error::HttpError, models::snippet::*, AppError, AppState, AuthUser,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tagsnip_core::error::Entity;
use tagsnip_core::text::{normalize_optional_nonempty, parse_tags_csv};

/// List the caller's snippets, newest first.
///
/// # Errors
/// Returns 400 for an out-of-range `limit`.
pub async fn list_snippets(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Snippet>>, HttpError> {
    let limit = normalized_limit(query.limit)?;
    let offset = query.offset.unwrap_or(0);
    Ok(Json(state.db.snippets.list(&user.id, limit, offset)?))
}

/// Get one of the caller's snippets.
///
/// # Errors
/// Returns 404 when the snippet is missing or owned by someone else.
pub async fn get_snippet(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Snippet>, HttpError> {
    let snippet = state
        .db
        .snippets
        .get_owned(&user.id, &id)?
        .ok_or(AppError::NotFound(Entity::Snippet))?;
    Ok(Json(snippet))
}

/// Create a snippet.
///
/// # Arguments
/// - `state`: Application state.
/// - `user`: Authenticated caller.
/// - `req`: Creation payload; missing fields take their defaults.
///
/// # Returns
/// `201 Created` with the stored snippet.
///
/// # Errors
/// Returns 400 if the title or code exceeds its limit.
pub async fn create_snippet(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateSnippetRequest>,
) -> Result<(StatusCode, Json<Snippet>), HttpError> {
    validate_snippet_fields(
        req.title.as_deref(),
        req.code.as_deref(),
        state.config.max_snippet_size,
    )?;
    let snippet = TransactionOps::create_from_request(&state.db, &user.id, req)?;
    tracing::debug!("Created snippet {} for {}", snippet.id, user.username);
    Ok((StatusCode::CREATED, Json(snippet)))
}

/// Update a snippet. Absent fields stay unchanged.
///
/// # Errors
/// Returns 404 when the snippet is missing or not owned, 400 on limits.
pub async fn update_snippet(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateSnippetRequest>,
) -> Result<Json<Snippet>, HttpError> {
    validate_snippet_fields(
        req.title.as_deref(),
        req.code.as_deref(),
        state.config.max_snippet_size,
    )?;
    let snippet = TransactionOps::update_snippet(&state.db, &user.id, &id, &req)?
        .ok_or(AppError::NotFound(Entity::Snippet))?;
    Ok(Json(snippet))
}

/// Delete a snippet.
///
/// # Errors
/// Returns 404 when the snippet is missing or not owned.
pub async fn delete_snippet(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, HttpError> {
    if !state.db.snippets.delete(&user.id, &id)? {
        return Err(AppError::NotFound(Entity::Snippet).into());
    }
    Ok(Json(json!({ "message": "Snippet deleted", "id": id })))
}

/// Flip the favorite flag.
///
/// # Errors
/// Returns 404 when the snippet is missing or not owned.
pub async fn toggle_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Snippet>, HttpError> {
    let snippet = state
        .db
        .snippets
        .toggle_favorite(&user.id, &id)?
        .ok_or(AppError::NotFound(Entity::Snippet))?;
    Ok(Json(snippet))
}

fn run_search(
    state: &AppState,
    user: &AuthUser,
    request: SearchRequest,
) -> Result<Json<SearchResponse>, HttpError> {
    let snippets = state.db.snippets.search(&user.id, &request)?;
    let total = snippets.len();
    Ok(Json(SearchResponse { snippets, total }))
}

/// `GET /api/search?q&tags&language`; `tags` is comma-separated.
///
/// # Errors
/// Returns an error if storage access fails.
pub async fn search_snippets(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, HttpError> {
    let request = SearchRequest {
        query: query.q.unwrap_or_default(),
        tags: query.tags.as_deref().map(parse_tags_csv).unwrap_or_default(),
        language: normalize_optional_nonempty(query.language),
    };
    run_search(&state, &user, request)
}

/// `POST /api/search` with a JSON body.
///
/// # Errors
/// Returns an error if storage access fails.
pub async fn search_snippets_post(
    State(state): State<AppState>,
    user: AuthUser,
    Json(mut request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, HttpError> {
    request.language = normalize_optional_nonempty(request.language);
    run_search(&state, &user, request)
}
