//! Shared integration-test server bootstrap helpers.

#![allow(dead_code)]

use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};
use std::path::Path;
use tagsnip_server::{create_app, AppState, Config, Database};
use tempfile::TempDir;

pub(crate) fn test_config_for_db_path(db_path: &Path) -> Config {
    let mut config = Config::for_db_path(db_path.to_str().expect("db path"));
    config.jwt_secret = "integration-test-secret".to_string();
    config.max_snippet_size = 64 * 1024;
    config
}

pub(crate) fn test_server_for_config(config: Config) -> TestServer {
    let db = Database::new(config.db_path.as_str()).expect("open db");
    let state = AppState::new(config, db);
    let app = create_app(state, false);
    TestServer::new(app).expect("server")
}

pub(crate) fn setup_test_server() -> (TestServer, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let db_path = temp_dir.path().join("test.db");
    let config = test_config_for_db_path(&db_path);
    (test_server_for_config(config), temp_dir)
}

pub(crate) fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    (
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).expect("header value"),
    )
}

/// Sign up `username` and log in, returning the token response body.
pub(crate) async fn register(server: &TestServer, username: &str) -> Value {
    let credentials = json!({ "username": username, "password": "password123" });
    let signup = server.post("/api/auth/signup").json(&credentials).await;
    assert_eq!(signup.status_code(), StatusCode::CREATED);
    let login = server.post("/api/auth/login").json(&credentials).await;
    assert_eq!(login.status_code(), StatusCode::OK);
    login.json()
}

/// Access token for a freshly registered user.
pub(crate) async fn access_token(server: &TestServer, username: &str) -> String {
    let tokens = register(server, username).await;
    tokens["access_token"].as_str().expect("access token").to_string()
}
