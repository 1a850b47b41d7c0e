use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::auth::TokenService;
use crate::config::{AppConfig, StoreKind};
use crate::database::{MemoryUserStore, PgUserStore, PlaceholderUserStore, StoreError, UserStore};
use crate::handlers::{auth, fallback, health, users};
use crate::middleware::{apply_security_headers, rate_limit, require_auth, RateLimiter};
use crate::services::UserService;

/// Process-scoped state resolved once at startup and shared by every request
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenService>,
    pub users: UserService,
    pub rate_limiter: Arc<RateLimiter>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn UserStore>) -> Self {
        let tokens = TokenService::new(&config.security);
        let rate_limiter = RateLimiter::new(config.api.rate_limit_window, config.api.rate_limit_max_requests);

        Self {
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            users: UserService::new(store),
            rate_limiter: Arc::new(rate_limiter),
            started_at: Instant::now(),
        }
    }

    /// Build state with the user store selected by `USER_STORE`
    pub async fn from_config(config: AppConfig) -> Result<Self, StoreError> {
        let store = open_store(&config).await?;
        Ok(Self::new(config, store))
    }
}

pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn UserStore>, StoreError> {
    let store: Arc<dyn UserStore> = match config.database.store {
        StoreKind::Placeholder => Arc::new(PlaceholderUserStore),
        StoreKind::Memory => Arc::new(MemoryUserStore::new()),
        StoreKind::Postgres => Arc::new(PgUserStore::connect(config.database.url.as_str()).await?),
    };
    tracing::info!(store = ?config.database.store, "User store selected");
    Ok(store)
}

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security.cors_origin);
    let max_body = state.config.api.max_request_size_bytes;

    let router = Router::new()
        // Public
        .route("/health", get(health::health))
        .merge(auth_routes())
        // Protected
        .nest("/api/users", user_routes(state.clone()))
        .fallback(fallback::not_found)
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        .layer(DefaultBodyLimit::max(max_body))
        .with_state(state);

    edge_layers(router, cors)
}

// Outermost layers, shared by every route including fallbacks
fn edge_layers(router: Router, cors: CorsLayer) -> Router {
    apply_security_headers(router)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CatchPanicLayer::custom(fallback::handle_panic))
}

// The gate wraps matched methods only, so an unsupported method stays a plain 404
fn user_routes(state: AppState) -> Router<AppState> {
    let gate = middleware::from_fn_with_state(state, require_auth);

    Router::new()
        .route(
            "/me",
            get(users::get_current_user)
                .patch(users::update_profile)
                .route_layer(gate.clone())
                .fallback(fallback::api_not_found),
        )
        .route(
            "/:id",
            get(users::get_user_by_id)
                .route_layer(gate)
                .fallback(fallback::api_not_found),
        )
}

fn auth_routes() -> Router<AppState> {
    Router::new().route(
        "/api/auth/refresh",
        post(auth::refresh_session).fallback(fallback::api_not_found),
    )
}

/// `CORS_ORIGIN` may list several origins separated by commas
fn cors_layer(origins: &str) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-auth-source"),
        ])
}
