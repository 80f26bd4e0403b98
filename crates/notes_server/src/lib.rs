//! HTTP server wiring for the notes backend (API, handlers, and shared state).

/// HTTP error mapping for API handlers.
pub mod error;
/// HTTP handlers for note and tag endpoints.
pub mod handlers;
/// Bearer-token tenant verification.
pub mod tenant;

pub use notes_core::{
    config, db, models, AppError, Config, Database, NoteService, SearchIndex, TantivySearchIndex,
    DEFAULT_PORT,
};
pub use tenant::{Tenant, TenantVerifier};

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, put},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Shared state passed to HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: NoteService,
    pub config: Arc<Config>,
    pub tenants: Arc<TenantVerifier>,
}

impl AppState {
    /// Construct shared application state.
    ///
    /// # Arguments
    /// - `config`: Loaded configuration; its signing secret keys tenant verification.
    /// - `db`: Open repository.
    /// - `index`: Search index the service writes to and queries.
    pub fn new(config: Config, db: Database, index: Arc<dyn SearchIndex>) -> Self {
        let tenants = Arc::new(TenantVerifier::new(config.signing_secret.clone()));
        Self {
            service: NoteService::new(Arc::new(db), index),
            config: Arc::new(config),
            tenants,
        }
    }
}

/// Create the application router with all routes and middleware.
///
/// # Arguments
/// - `state`: Shared application state.
/// - `allow_public_access`: Whether to allow cross-origin requests from any origin.
///
/// # Returns
/// Configured `axum::Router`.
pub fn create_app(state: AppState, allow_public_access: bool) -> Router {
    let cors_port = state.config.port;
    create_app_with_cors_port(state, allow_public_access, cors_port)
}

/// Resolve the listener address from env var overrides and security policy.
///
/// # Arguments
/// - `config`: Server configuration containing the configured `port`.
/// - `allow_public_access`: Whether non-loopback bind targets are permitted.
///
/// # Returns
/// A validated socket address that enforces loopback when public access is disabled.
pub fn resolve_bind_address(config: &Config, allow_public_access: bool) -> SocketAddr {
    resolve_bind_address_from(std::env::var("BIND").ok(), config, allow_public_access)
}

fn resolve_bind_address_from(
    bind: Option<String>,
    config: &Config,
    allow_public_access: bool,
) -> SocketAddr {
    let default_bind = SocketAddr::from(([127, 0, 0, 1], config.port));
    let requested = match bind {
        Some(value) => match value.trim().parse::<SocketAddr>() {
            Ok(addr) => addr,
            Err(err) => {
                tracing::warn!(
                    "Invalid BIND='{}': {}. Falling back to {}",
                    value,
                    err,
                    default_bind
                );
                default_bind
            }
        },
        None => default_bind,
    };

    if allow_public_access || requested.ip().is_loopback() {
        return requested;
    }

    tracing::warn!(
        "Non-loopback bind {} requested without ALLOW_PUBLIC_ACCESS; forcing 127.0.0.1",
        requested
    );
    SocketAddr::from(([127, 0, 0, 1], requested.port()))
}

fn cors_layer(allow_public_access: bool, cors_port: u16) -> CorsLayer {
    let origins = if allow_public_access {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            [
                format!("http://localhost:{}", cors_port),
                format!("http://127.0.0.1:{}", cors_port),
            ]
            .iter()
            .filter_map(|origin| HeaderValue::from_str(origin).ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE])
        .expose_headers([header::LOCATION])
        .max_age(Duration::from_secs(300))
}

fn create_app_with_cors_port(state: AppState, allow_public_access: bool, cors_port: u16) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);
    let timeout = Duration::from_secs(state.config.request_timeout_secs);

    Router::new()
        .route(
            "/notes",
            get(handlers::note::list_notes).post(handlers::note::create_note),
        )
        .route(
            "/notes/:id",
            get(handlers::note::get_note)
                .put(handlers::note::update_note)
                .delete(handlers::note::delete_note),
        )
        .route(
            "/notes/:id/tags/:tag_id",
            put(handlers::note::tag_note).delete(handlers::note::untag_note),
        )
        .route(
            "/tags",
            get(handlers::tag::list_tags).post(handlers::tag::create_tag),
        )
        .route("/tags/:id/notes", get(handlers::tag::list_tag_notes))
        .fallback_service(static_files)
        .with_state(state)
        .layer(
            tower::ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(allow_public_access, cors_port))
                .layer(TimeoutLayer::new(timeout)),
        )
}

fn listener_cors_port(listener: &tokio::net::TcpListener, fallback_port: u16) -> u16 {
    listener
        .local_addr()
        .map(|addr| addr.port())
        .unwrap_or(fallback_port)
}

/// Run the Axum server with graceful shutdown support.
///
/// # Arguments
/// - `listener`: Bound TCP listener for the server.
/// - `state`: Shared application state.
/// - `allow_public_access`: Whether to allow cross-origin requests from any origin.
/// - `shutdown_signal`: Future that resolves when shutdown should start.
///
/// # Errors
/// Returns any I/O error produced by `axum::serve`.
pub async fn serve_router(
    listener: tokio::net::TcpListener,
    state: AppState,
    allow_public_access: bool,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    let cors_port = listener_cors_port(&listener, state.config.port);
    let app = create_app_with_cors_port(state, allow_public_access, cors_port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
}
