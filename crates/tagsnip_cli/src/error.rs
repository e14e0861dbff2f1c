//! Client-side error taxonomy.

use tagsnip_core::remote::RemoteError;
use thiserror::Error;

/// Failure of an API call or of local client state.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("not signed in or session expired")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("server error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("token store error: {0}")]
    TokenStore(String),
}

impl From<ClientError> for RemoteError {
    fn from(value: ClientError) -> Self {
        match value {
            ClientError::Unauthorized => RemoteError::Unauthorized,
            ClientError::NotFound => RemoteError::NotFound,
            ClientError::Validation(message) => RemoteError::Validation(message),
            other => RemoteError::Failed(other.to_string()),
        }
    }
}
