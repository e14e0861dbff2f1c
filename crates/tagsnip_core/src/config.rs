//! Server and client configuration drawn from the environment.

use crate::constants::{
    DEFAULT_ACCESS_TOKEN_TTL_MINUTES, DEFAULT_AUTO_SAVE_DELAY_MS, DEFAULT_MAX_SNIPPET_SIZE,
    DEFAULT_PORT, DEFAULT_REFRESH_TOKEN_TTL_DAYS,
};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::env;
use std::path::PathBuf;

/// Runtime configuration for the tagsnip server.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub port: u16,
    pub max_snippet_size: usize,
    pub auto_save_delay_ms: u64,
    pub jwt_secret: String,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_days: i64,
}

/// First non-blank value among `names`.
fn env_nonblank(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

fn with_home(path: String) -> String {
    match (path.strip_prefix("~/"), home_dir()) {
        (Some(rest), Some(home)) => home.join(rest).to_string_lossy().into_owned(),
        _ => path,
    }
}

/// `HOME`, then `USERPROFILE`, then `HOMEDRIVE` + `HOMEPATH`; the working
/// directory as a last resort.
pub fn home_dir() -> Option<PathBuf> {
    if let Some(home) = env_nonblank(&["HOME", "USERPROFILE"]) {
        return Some(PathBuf::from(home));
    }
    match (env_nonblank(&["HOMEDRIVE"]), env_nonblank(&["HOMEPATH"])) {
        (Some(drive), Some(rest)) => Some(PathBuf::from(drive + &rest)),
        _ => env::current_dir().ok(),
    }
}

/// Directory holding client-side state (tokens, settings).
///
/// Honors `TSNIP_HOME`, falling back to `~/.config/tagsnip`.
pub fn client_state_dir() -> PathBuf {
    if let Some(dir) = env_nonblank(&["TSNIP_HOME"]) {
        return PathBuf::from(with_home(dir));
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("tagsnip")
}

/// Interprets `1/true/yes/on` and `0/false/no/off` (any case, blank counts
/// as off). Anything else is `None`.
pub fn parse_flag(value: &str) -> Option<bool> {
    const ON: [&str; 4] = ["1", "true", "yes", "on"];
    const OFF: [&str; 5] = ["", "0", "false", "no", "off"];
    let value = value.trim();
    if ON.iter().any(|v| value.eq_ignore_ascii_case(v)) {
        Some(true)
    } else if OFF.iter().any(|v| value.eq_ignore_ascii_case(v)) {
        Some(false)
    } else {
        None
    }
}

/// True only when `name` is set to a recognized truthy value.
pub fn env_flag_enabled(name: &str) -> bool {
    matches!(env::var(name).as_deref().map(parse_flag), Ok(Some(true)))
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|raw| raw.trim().parse().ok())
}

/// Client auto-save debounce from `AUTO_SAVE_DELAY_MS`. Zero and
/// unparsable values give the built-in default.
pub fn auto_save_delay_from_env() -> u64 {
    env_parsed("AUTO_SAVE_DELAY_MS")
        .filter(|ms: &u64| *ms > 0)
        .unwrap_or(DEFAULT_AUTO_SAVE_DELAY_MS)
}

fn default_db_path() -> String {
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cache/tagsnip/db")
        .to_string_lossy()
        .into_owned()
}

fn generate_ephemeral_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}

impl Config {
    /// Reads every setting from the environment. Unparsable or non-positive
    /// values fall back to their defaults.
    pub fn from_env() -> Self {
        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ => {
                tracing::warn!(
                    "JWT_SECRET not set; using a random per-process secret (tokens will not survive restarts)"
                );
                generate_ephemeral_secret()
            }
        };

        Self {
            db_path: env_nonblank(&["DB_PATH"])
                .map(with_home)
                .unwrap_or_else(default_db_path),
            port: env_parsed("PORT").unwrap_or(DEFAULT_PORT),
            max_snippet_size: env_parsed("MAX_SNIPPET_SIZE").unwrap_or(DEFAULT_MAX_SNIPPET_SIZE),
            auto_save_delay_ms: auto_save_delay_from_env(),
            jwt_secret,
            access_token_ttl_minutes: env_parsed("ACCESS_TOKEN_TTL_MINUTES")
                .filter(|minutes: &i64| *minutes > 0)
                .unwrap_or(DEFAULT_ACCESS_TOKEN_TTL_MINUTES),
            refresh_token_ttl_days: env_parsed("REFRESH_TOKEN_TTL_DAYS")
                .filter(|days: &i64| *days > 0)
                .unwrap_or(DEFAULT_REFRESH_TOKEN_TTL_DAYS),
        }
    }

    /// Build a configuration suitable for tests rooted at `db_path`.
    pub fn for_db_path(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            port: 0,
            max_snippet_size: DEFAULT_MAX_SNIPPET_SIZE,
            auto_save_delay_ms: DEFAULT_AUTO_SAVE_DELAY_MS,
            jwt_secret: generate_ephemeral_secret(),
            access_token_ttl_minutes: DEFAULT_ACCESS_TOKEN_TTL_MINUTES,
            refresh_token_ttl_days: DEFAULT_REFRESH_TOKEN_TTL_DAYS,
        }
    }
}
