//! Account and token endpoints.

use crate::{
    auth::{hash_password, verify_password, TokenKind},
    error::HttpError,
    models::user::{Credentials, RefreshRequest, TokenPair, User, UserProfile},
    AppError, AppState, AuthUser,
};
use axum::{extract::State, http::StatusCode, Json};
use tagsnip_core::error::Entity;
use tagsnip_core::text::char_len;

const USERNAME_CHARS: std::ops::RangeInclusive<usize> = 3..=50;
const MIN_PASSWORD_CHARS: usize = 8;

fn normalize_username(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Register an account.
///
/// # Arguments
/// - `state`: Application state.
/// - `credentials`: Username (3 to 50 chars, stored lowercased) and password
///   (at least 8 chars).
///
/// # Returns
/// `201 Created` with the new profile.
///
/// # Errors
/// Returns 400 on validation failure and 409 if the username is taken.
pub async fn signup(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<(StatusCode, Json<UserProfile>), HttpError> {
    let username = normalize_username(&credentials.username);
    if !USERNAME_CHARS.contains(&char_len(&username)) {
        return Err(HttpError::bad_request(
            "Username must be between 3 and 50 characters",
        ));
    }
    if char_len(&credentials.password) < MIN_PASSWORD_CHARS {
        return Err(HttpError::bad_request(
            "Password must be at least 8 characters",
        ));
    }
    if state.db.users.find_by_username(&username)?.is_some() {
        return Err(AppError::Conflict("Username already exists".to_string()).into());
    }

    let password_hash = hash_password(credentials.password).await?;
    let user = User::new(username, password_hash);
    state.db.users.create(&user)?;
    tracing::info!("Registered user {}", user.username);
    Ok((StatusCode::CREATED, Json(user.profile())))
}

/// Exchange credentials for a token pair.
///
/// # Errors
/// Returns 401 for an unknown user or wrong password.
pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<TokenPair>, HttpError> {
    let username = normalize_username(&credentials.username);
    let invalid = || HttpError::unauthorized("Invalid username or password");

    let user = state
        .db
        .users
        .find_by_username(&username)?
        .ok_or_else(invalid)?;
    if !verify_password(credentials.password, user.password_hash.clone()).await {
        return Err(invalid());
    }
    Ok(Json(state.tokens.issue_pair(&user.id)?))
}

/// Exchange a refresh token for a new pair.
///
/// # Errors
/// Returns 401 for an invalid refresh token or a deleted user.
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<TokenPair>, HttpError> {
    let claims = state
        .tokens
        .verify(&req.refresh_token, TokenKind::Refresh)
        .map_err(|_| HttpError::unauthorized("Invalid refresh token"))?;
    let user = state
        .db
        .users
        .get(&claims.sub)?
        .ok_or_else(|| HttpError::unauthorized("User not found"))?;
    Ok(Json(state.tokens.issue_pair(&user.id)?))
}

/// Profile of the authenticated caller.
///
/// # Errors
/// Returns 401 without a valid access token.
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<UserProfile>, HttpError> {
    let record = state.db.users.get(&user.id)?.ok_or(AppError::NotFound(Entity::User))?;
    Ok(Json(record.profile()))
}
