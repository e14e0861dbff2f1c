//! Persisted access/refresh tokens.

use crate::ClientError;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tagsnip_core::models::user::TokenPair;

/// File name used inside the client state directory.
pub const TOKENS_FILE_NAME: &str = "tokens.json";

/// Current token pair, optionally mirrored to a JSON file.
#[derive(Debug)]
pub struct TokenStore {
    path: Option<PathBuf>,
    current: Mutex<Option<TokenPair>>,
}

impl TokenStore {
    /// Store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            current: Mutex::new(None),
        }
    }

    /// Store backed by `path`. A missing or unreadable file means signed out.
    pub fn load(path: PathBuf) -> Self {
        let current = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<TokenPair>(&raw) {
                Ok(pair) => Some(pair),
                Err(err) => {
                    tracing::warn!("ignoring unreadable token file {}: {}", path.display(), err);
                    None
                }
            },
            Err(_) => None,
        };
        Self {
            path: Some(path),
            current: Mutex::new(current),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<TokenPair>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self) -> Option<TokenPair> {
        self.lock().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.lock().is_some()
    }

    /// Replace the stored pair.
    ///
    /// # Errors
    /// Returns [`ClientError::TokenStore`] if the file cannot be written.
    pub fn set(&self, pair: TokenPair) -> Result<(), ClientError> {
        if let Some(path) = &self.path {
            write_private(path, &pair)?;
        }
        *self.lock() = Some(pair);
        Ok(())
    }

    /// Forget the stored pair.
    ///
    /// # Errors
    /// Returns [`ClientError::TokenStore`] if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<(), ClientError> {
        *self.lock() = None;
        if let Some(path) = &self.path {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(ClientError::TokenStore(err.to_string())),
            }
        }
        Ok(())
    }
}

fn write_private(path: &Path, pair: &TokenPair) -> Result<(), ClientError> {
    let store_err = |err: std::io::Error| ClientError::TokenStore(err.to_string());
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(store_err)?;
    }
    let json = serde_json::to_string_pretty(pair)
        .map_err(|err| ClientError::TokenStore(err.to_string()))?;
    std::fs::write(path, json).map_err(store_err)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).map_err(store_err)?;
    }
    Ok(())
}
