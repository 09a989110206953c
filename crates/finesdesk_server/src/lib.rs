//! In-memory stub of the FinesDesk REST API (state, routes, handlers).

/// Background-thread server for tests and `fdesk --demo`.
pub mod embedded;
/// JSON error bodies for handler failures.
pub mod error;
/// HTTP handlers for every resource family.
pub mod handlers;
/// Demo data generation.
pub mod seed;
/// In-memory record tables.
pub mod store;

pub use embedded::EmbeddedServer;
pub use error::HttpError;
pub use finesdesk_core::{config, models, Config, DEFAULT_PORT};
pub use store::Store;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, patch, put},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

/// Handler state: the record tables and the config the server started with.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<Store>>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, store: Store) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            config: Arc::new(config),
        }
    }

    // A handler that panicked mid-write leaves the tables consistent, since
    // every mutation validates before touching them; keep serving.
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Store> {
        self.store
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Store> {
        self.store
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Browser origins allowed to call the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorsPolicy {
    /// Any origin, any header (`ALLOW_PUBLIC_ACCESS`).
    AnyOrigin,
    /// Only `http://localhost:<port>` and `http://127.0.0.1:<port>`.
    Loopback { port: u16 },
}

impl CorsPolicy {
    pub fn new(allow_public_access: bool, port: u16) -> Self {
        if allow_public_access {
            Self::AnyOrigin
        } else {
            Self::Loopback { port }
        }
    }

    fn layer(self) -> CorsLayer {
        let methods = [
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ];
        match self {
            Self::AnyOrigin => CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(methods)
                .allow_headers(Any),
            Self::Loopback { port } => {
                let origins: Vec<HeaderValue> = ["localhost", "127.0.0.1"]
                    .iter()
                    .filter_map(|host| format!("http://{}:{}", host, port).parse().ok())
                    .collect();
                CorsLayer::new()
                    .allow_origin(AllowOrigin::list(origins))
                    .allow_methods(methods)
                    .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
            }
        }
    }
}

/// Router for `state` with CORS scoped to the configured port.
pub fn create_app(state: AppState, allow_public_access: bool) -> Router {
    let policy = CorsPolicy::new(allow_public_access, state.config.port);
    router(state, policy)
}

/// All `/api` routes wrapped in tracing, compression, CORS and the
/// hardening headers.
pub fn router(state: AppState, cors: CorsPolicy) -> Router {
    use handlers::{absences, events, fines, staff, students};

    let api = Router::new()
        .route(
            "/api/students",
            get(students::list_students).post(students::create_student),
        )
        .route(
            "/api/students/:id",
            put(students::update_student).delete(students::delete_student),
        )
        .route(
            "/api/admins",
            get(staff::list_admins).post(staff::create_admin),
        )
        .route(
            "/api/admins/:id",
            put(staff::update_admin).delete(staff::delete_admin),
        )
        .route(
            "/api/secretaries",
            get(staff::list_secretaries).post(staff::create_secretary),
        )
        .route(
            "/api/secretaries/:id",
            put(staff::update_secretary).delete(staff::delete_secretary),
        )
        .route(
            "/api/events",
            get(events::list_events).post(events::create_event),
        )
        .route(
            "/api/events/:id",
            put(events::update_event).delete(events::delete_event),
        )
        .route(
            "/api/fines",
            get(fines::list_fines).post(fines::create_fine),
        )
        .route(
            "/api/fines/:id",
            put(fines::update_fine).delete(fines::delete_fine),
        )
        .route("/api/fines/:id/pay", patch(fines::pay_fine))
        .route("/api/absences", get(absences::list_absences));

    api.with_state(state).layer(
        tower::ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new())
            .layer(cors.layer())
            .layer(SetResponseHeaderLayer::overriding(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::X_FRAME_OPTIONS,
                HeaderValue::from_static("DENY"),
            )),
    )
}

fn bind_override() -> Option<SocketAddr> {
    let raw = std::env::var("BIND").ok()?;
    match raw.trim().parse() {
        Ok(addr) => Some(addr),
        Err(err) => {
            tracing::warn!("ignoring BIND='{}': {}", raw, err);
            None
        }
    }
}

/// Address to listen on: `BIND` if set and parseable, else loopback on
/// `config.port`. Without public access a non-loopback `BIND` is pulled back
/// to 127.0.0.1, keeping its port.
pub fn resolve_bind_address(config: &Config, allow_public_access: bool) -> SocketAddr {
    let loopback = |port: u16| SocketAddr::from(([127, 0, 0, 1], port));
    let requested = bind_override().unwrap_or_else(|| loopback(config.port));
    if allow_public_access || requested.ip().is_loopback() {
        return requested;
    }
    tracing::warn!(
        "BIND {} is not loopback and ALLOW_PUBLIC_ACCESS is off; using 127.0.0.1",
        requested
    );
    loopback(requested.port())
}

/// Serve `state` on `listener` until `shutdown_signal` resolves.
///
/// CORS origins use the listener's actual port, so auto-assigned ports work.
///
/// # Errors
/// Returns any I/O error produced by `axum::serve`.
pub async fn serve_router(
    listener: tokio::net::TcpListener,
    state: AppState,
    allow_public_access: bool,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let port = listener
        .local_addr()
        .map(|addr| addr.port())
        .unwrap_or(state.config.port);
    let app = router(state, CorsPolicy::new(allow_public_access, port));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use finesdesk_core::env::{env_lock, EnvGuard};
    use tower::ServiceExt;

    fn config_on(port: u16) -> Config {
        Config {
            port,
            ..Config::default()
        }
    }

    async fn allowed_origin(policy: CorsPolicy, origin: &str) -> Option<String> {
        let app = router(AppState::new(config_on(4000), Store::default()), policy);
        let request = Request::builder()
            .uri("/api/students")
            .header(header::ORIGIN, origin)
            .body(Body::empty())
            .expect("request");
        let response = app.oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    }

    #[tokio::test]
    async fn loopback_policy_only_echoes_local_origins() {
        let policy = CorsPolicy::new(false, 4000);
        let local = allowed_origin(policy, "http://localhost:4000").await;
        assert_eq!(local.as_deref(), Some("http://localhost:4000"));
        assert_eq!(allowed_origin(policy, "http://evil.test").await, None);

        let public = allowed_origin(CorsPolicy::AnyOrigin, "http://evil.test").await;
        assert_eq!(public.as_deref(), Some("*"));
    }

    #[test]
    fn non_loopback_bind_is_pulled_back_without_public_access() {
        let _lock = env_lock().lock().expect("env lock");
        let _bind = EnvGuard::set("BIND", "0.0.0.0:4040");
        assert_eq!(
            resolve_bind_address(&config_on(4040), false),
            SocketAddr::from(([127, 0, 0, 1], 4040))
        );
        assert_eq!(
            resolve_bind_address(&config_on(4040), true),
            SocketAddr::from(([0, 0, 0, 0], 4040))
        );
    }

    #[test]
    fn missing_or_bad_bind_uses_configured_port() {
        let _lock = env_lock().lock().expect("env lock");
        let _bind = EnvGuard::remove("BIND");
        let loopback = resolve_bind_address(&config_on(4041), false);
        assert_eq!(loopback, SocketAddr::from(([127, 0, 0, 1], 4041)));

        let _bad = EnvGuard::set("BIND", "bad:host");
        let fallback = resolve_bind_address(&config_on(4041), false);
        assert_eq!(fallback, SocketAddr::from(([127, 0, 0, 1], 4041)));
    }
}
