//! Liveness endpoints.

use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

/// `GET /health` for process supervisors.
pub async fn root_health() -> Json<Value> {
    Json(json!({ "status": "healthy", "version": env!("CARGO_PKG_VERSION") }))
}

/// `GET /api/health`.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "timestamp": Utc::now().to_rfc3339() }))
}
