//! HTTP server wiring for tagsnip (API, auth, handlers, and shared state).

/// Token issuing, password hashing and the auth extractor.
pub mod auth;
/// `AppError` to status code and JSON body.
pub mod error;
/// HTTP handlers grouped by resource.
pub mod handlers;

pub use auth::{AuthUser, TokenIssuer};
pub use tagsnip_core::{config, db, models, AppError, Config, Database, DEFAULT_PORT};

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

const CONTENT_SECURITY_POLICY: &str = "default-src 'none'; frame-ancestors 'none'; base-uri 'none'";

/// Request bodies may carry a full snippet plus JSON framing.
const BODY_LIMIT_OVERHEAD: usize = 64 * 1024;

/// Handles every request handler shares: storage, settings and the token issuer.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub config: Arc<Config>,
    pub tokens: Arc<TokenIssuer>,
}

impl AppState {
    /// Wraps an opened database; the signing key is taken from `config`.
    pub fn new(config: Config, db: Database) -> Self {
        let tokens = Arc::new(TokenIssuer::from_config(&config));
        Self {
            db: Arc::new(db),
            config: Arc::new(config),
            tokens,
        }
    }
}

/// Builds the full router. Without `allow_public_access`, CORS only admits
/// localhost origins on the configured port.
pub fn create_app(state: AppState, allow_public_access: bool) -> Router {
    let origin_port = state.config.port;
    build_router(state, allow_public_access, origin_port)
}

fn loopback(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

/// Listen address from `BIND`, or loopback on the configured port when it is
/// unset or unparsable. The result always passes through [`enforce_loopback`].
pub fn resolve_bind_address(config: &Config, allow_public_access: bool) -> SocketAddr {
    let fallback = loopback(config.port);
    let requested = std::env::var("BIND")
        .ok()
        .map(|raw| match raw.trim().parse::<SocketAddr>() {
            Ok(addr) => addr,
            Err(err) => {
                tracing::warn!("ignoring BIND={:?} ({}); using {}", raw, err, fallback);
                fallback
            }
        })
        .unwrap_or(fallback);
    enforce_loopback(requested, allow_public_access)
}

/// Force `requested` onto 127.0.0.1 unless public access is allowed.
pub fn enforce_loopback(requested: SocketAddr, allow_public_access: bool) -> SocketAddr {
    if allow_public_access || requested.ip().is_loopback() {
        return requested;
    }
    tracing::warn!(
        "refusing to listen on {} without public access; binding loopback instead",
        requested
    );
    loopback(requested.port())
}

fn cors_layer(allow_public_access: bool, origin_port: u16) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::PUT, Method::DELETE];
    if allow_public_access {
        return CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(methods)
            .allow_headers(tower_http::cors::Any);
    }

    let origins: Vec<HeaderValue> = [
        format!("http://localhost:{}", origin_port),
        format!("http://127.0.0.1:{}", origin_port),
    ]
    .iter()
    .filter_map(|origin| HeaderValue::from_str(origin).ok())
    .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(methods)
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
}

fn api_routes() -> Router<AppState> {
    use handlers::{auth, folder, health, share, snippet, tab, tag, transfer};

    Router::new()
        .route("/health", get(health::health))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/me", get(auth::me))
        .route(
            "/snippets",
            get(snippet::list_snippets).post(snippet::create_snippet),
        )
        .route(
            "/snippets/:id",
            get(snippet::get_snippet)
                .put(snippet::update_snippet)
                .delete(snippet::delete_snippet),
        )
        .route("/snippets/:id/favorite", post(snippet::toggle_favorite))
        .route(
            "/search",
            get(snippet::search_snippets).post(snippet::search_snippets_post),
        )
        .route(
            "/folders",
            get(folder::list_folders).post(folder::create_folder),
        )
        .route(
            "/folders/:id",
            get(folder::get_folder)
                .put(folder::update_folder)
                .delete(folder::delete_folder),
        )
        .route("/tags", get(tag::list_tags).post(tag::create_tag))
        .route("/tags/cleanup", post(tag::cleanup_tags))
        .route("/tags/:id", axum::routing::delete(tag::delete_tag))
        .route("/tabs", get(tab::get_tabs).put(tab::save_tabs))
        .route("/export", get(transfer::export_all))
        .route("/import", post(transfer::import_snippets))
        .route("/stats", get(transfer::stats))
        .route("/share/:id", get(share::get_shared_snippet))
}

fn security_headers() -> [SetResponseHeaderLayer<HeaderValue>; 3] {
    [
        (header::CONTENT_SECURITY_POLICY, CONTENT_SECURITY_POLICY),
        (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        (header::X_FRAME_OPTIONS, "DENY"),
    ]
    .map(|(name, value)| SetResponseHeaderLayer::overriding(name, HeaderValue::from_static(value)))
}

fn build_router(state: AppState, allow_public_access: bool, origin_port: u16) -> Router {
    let body_limit = state.config.max_snippet_size.saturating_add(BODY_LIMIT_OVERHEAD);
    let [csp, nosniff, frame_deny] = security_headers();

    Router::new()
        .route("/health", get(handlers::health::root_health))
        .nest("/api", api_routes())
        .with_state(state)
        .layer(
            tower::ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(body_limit))
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors_layer(allow_public_access, origin_port))
                .layer(csp)
                .layer(nosniff)
                .layer(frame_deny),
        )
}

/// Port the listener actually got, which differs from config for `:0` binds.
fn bound_port(listener: &tokio::net::TcpListener, configured: u16) -> u16 {
    match listener.local_addr() {
        Ok(addr) => addr.port(),
        Err(_) => configured,
    }
}

/// Serve `state` on an already bound listener until `shutdown` resolves.
pub async fn serve_router(
    listener: tokio::net::TcpListener,
    state: AppState,
    allow_public_access: bool,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let origin_port = bound_port(&listener, state.config.port);
    let app = build_router(state, allow_public_access, origin_port);
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await
}
