//! Token issuing, password hashing and the authenticated-user extractor.

use crate::{error::HttpError, AppError, AppState, Config};
use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tagsnip_core::constants::{DEFAULT_ACCESS_TOKEN_TTL_MINUTES, DEFAULT_REFRESH_TOKEN_TTL_DAYS};
use tagsnip_core::models::user::TokenPair;

/// Which of the two token kinds a JWT is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims. `sub` is the user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(rename = "type")]
    pub kind: TokenKind,
}

/// Longest token lifetime accepted from configuration, in seconds.
const MAX_TOKEN_TTL_SECS: i64 = 10 * 365 * 86_400;

/// `requested` when it is positive and at most ten years, else the default.
fn bounded_ttl(kind: &str, requested: Option<Duration>, default_secs: i64) -> Duration {
    match requested {
        Some(ttl) if ttl > Duration::zero() && ttl.num_seconds() <= MAX_TOKEN_TTL_SECS => ttl,
        _ => {
            tracing::warn!(
                "{} token lifetime out of range; using {}s",
                kind,
                default_secs
            );
            Duration::seconds(default_secs)
        }
    }
}

/// Signs and verifies HS256 tokens with the configured secret and lifetimes.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn from_config(config: &Config) -> Self {
        let secret = config.jwt_secret.as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
            access_ttl: bounded_ttl(
                "access",
                Duration::try_minutes(config.access_token_ttl_minutes),
                DEFAULT_ACCESS_TOKEN_TTL_MINUTES * 60,
            ),
            refresh_ttl: bounded_ttl(
                "refresh",
                Duration::try_days(config.refresh_token_ttl_days),
                DEFAULT_REFRESH_TOKEN_TTL_DAYS * 86_400,
            ),
        }
    }

    fn sign(&self, user_id: &str, kind: TokenKind, ttl: Duration) -> Result<String, AppError> {
        let now = Utc::now();
        let expires = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AppError::Internal("token expiry out of range".to_string()))?;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expires.timestamp(),
            kind,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| AppError::Internal(format!("token signing failed: {}", err)))
    }

    /// Issue a fresh access/refresh pair for `user_id`.
    ///
    /// # Errors
    /// Returns [`AppError::Internal`] if signing fails.
    pub fn issue_pair(&self, user_id: &str) -> Result<TokenPair, AppError> {
        Ok(TokenPair::bearer(
            self.sign(user_id, TokenKind::Access, self.access_ttl)?,
            self.sign(user_id, TokenKind::Refresh, self.refresh_ttl)?,
        ))
    }

    /// Verify signature, expiry and kind.
    ///
    /// # Errors
    /// Returns [`AppError::Unauthorized`] for any invalid, expired or
    /// wrong-kind token.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, AppError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|err| {
            tracing::debug!("Rejected token: {}", err);
            AppError::Unauthorized("Invalid or expired token".to_string())
        })?;
        if data.claims.kind != expected {
            return Err(AppError::Unauthorized("Invalid or expired token".to_string()));
        }
        Ok(data.claims)
    }
}

/// Hash a password with Argon2id on the blocking pool.
///
/// # Errors
/// Returns [`AppError::Internal`] if hashing fails.
pub async fn hash_password(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
    })
    .await
    .map_err(|err| AppError::Internal(format!("password hashing task failed: {}", err)))?
    .map_err(|err| AppError::Internal(format!("password hashing failed: {}", err)))
}

/// Check `password` against a stored Argon2 hash. Malformed hashes never match.
pub async fn verify_password(password: String, stored_hash: String) -> bool {
    tokio::task::spawn_blocking(move || {
        PasswordHash::new(&stored_hash)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    })
    .await
    .unwrap_or(false)
}

/// The caller identified by a valid access token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub username: String,
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() {
        Some(token.trim())
    } else {
        None
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| HttpError::unauthorized("Not authenticated"))?;
        let claims = state.tokens.verify(token, TokenKind::Access)?;
        let user = state
            .db
            .users
            .get(&claims.sub)?
            .ok_or_else(|| HttpError::unauthorized("Invalid or expired token"))?;
        Ok(Self {
            id: user.id,
            username: user.username,
        })
    }
}
