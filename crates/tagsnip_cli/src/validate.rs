//! Checks performed before any request is sent.

use crate::ClientError;
use serde_json::Value;
use tagsnip_core::models::transfer::{ImportRequest, ImportSnippet};
use tagsnip_core::models::user::Credentials;

/// Trim the username and reject empty credentials or a mismatched confirmation.
///
/// # Errors
/// Returns [`ClientError::Validation`] describing the first problem found.
pub fn credentials(
    username: &str,
    password: &str,
    confirmation: Option<&str>,
) -> Result<Credentials, ClientError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(ClientError::Validation("Username is required".to_string()));
    }
    if password.is_empty() {
        return Err(ClientError::Validation("Password is required".to_string()));
    }
    if let Some(confirmation) = confirmation {
        if confirmation != password {
            return Err(ClientError::Validation("Passwords do not match".to_string()));
        }
    }
    Ok(Credentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}

/// Parse an import file into a request body.
///
/// Accepts an export document, a `{ "snippets": [...] }` object, or a bare
/// array of snippets.
///
/// # Errors
/// Returns [`ClientError::Validation`] for malformed JSON or any other shape.
pub fn import_payload(raw: &str) -> Result<ImportRequest, ClientError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|err| ClientError::Validation(format!("Invalid JSON: {}", err)))?;
    let list = match value {
        Value::Array(items) => Value::Array(items),
        Value::Object(mut map) => match map.remove("snippets") {
            Some(items @ Value::Array(_)) => items,
            _ => {
                return Err(ClientError::Validation(
                    "Import file must contain a \"snippets\" array".to_string(),
                ))
            }
        },
        _ => {
            return Err(ClientError::Validation(
                "Import file must be a JSON object or array".to_string(),
            ))
        }
    };
    let snippets: Vec<ImportSnippet> = serde_json::from_value(list)
        .map_err(|err| ClientError::Validation(format!("Invalid snippet entry: {}", err)))?;
    Ok(ImportRequest { snippets })
}
