/// Application state and router builder
///
/// This module defines the shared application state and builds the Axum
/// router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskboard_api::{app::AppState, config::Config, mailer::LogNotifier};
/// use sqlx::PgPool;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config, Arc::new(LogNotifier));
/// let app = taskboard_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, mailer::Notifier, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskboard_shared::auth::{jwt::TokenService, middleware::authenticate_bearer};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor. Everything
/// inside is either a pool handle or behind an `Arc`, so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Token issuance and verification
    pub tokens: TokenService,

    /// Password-reset delivery
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config, notifier: Arc<dyn Notifier>) -> Self {
        let tokens = config.jwt.token_service();
        Self {
            db,
            config: Arc::new(config),
            tokens,
            notifier,
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /health                        # Health check (public)
/// ├── /auth/
/// │   ├── POST /signup                    # public
/// │   ├── POST /login                     # public, sets refresh cookie
/// │   ├── POST /refresh                   # refresh cookie
/// │   ├── POST /logout                    # public, clears refresh cookie
/// │   ├── POST /password-reset/request    # public
/// │   ├── POST /password-reset/confirm    # public
/// │   └── GET|PUT /me                     # bearer
/// ├── /statuses/                          # bearer
/// │   ├── GET|POST /
/// │   ├── PUT      /reorder
/// │   └── GET|PUT|DELETE /:id
/// └── /tasks/                             # bearer
///     ├── GET|POST /
///     └── GET|PUT|DELETE /:id
/// ```
///
/// # Middleware Stack
///
/// Applied in order (outermost last):
/// 1. Bearer authentication (per route group)
/// 2. Logging (tower-http TraceLayer)
/// 3. CORS (tower-http CorsLayer)
/// 4. Security headers
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let public_auth_routes = Router::new()
        .route("/signup", post(routes::auth::signup))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh))
        .route("/logout", post(routes::auth::logout))
        .route(
            "/password-reset/request",
            post(routes::auth::request_password_reset),
        )
        .route(
            "/password-reset/confirm",
            post(routes::auth::confirm_password_reset),
        );

    let me_routes = Router::new()
        .route(
            "/me",
            get(routes::auth::get_me).put(routes::auth::update_me),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let status_routes = Router::new()
        .route(
            "/",
            get(routes::statuses::list_statuses).post(routes::statuses::create_status),
        )
        .route("/reorder", put(routes::statuses::reorder_statuses))
        .route(
            "/:id",
            get(routes::statuses::get_status)
                .put(routes::statuses::update_status)
                .delete(routes::statuses::delete_status),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let task_routes = Router::new()
        .route(
            "/",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let auth_routes = public_auth_routes.merge(me_routes);

    Router::new()
        .merge(health_routes)
        .nest("/auth", auth_routes)
        .nest("/statuses", status_routes)
        .nest("/tasks", task_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// CORS configuration
///
/// `*` allows any origin but, as browsers require, without credentials.
/// Explicit origins get credentials so the refresh cookie is sent.
fn cors_layer(config: &Config) -> CorsLayer {
    if config.api.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Bearer authentication middleware layer
///
/// Verifies the access token and injects the `AuthContext` into request
/// extensions. Refresh and password-reset tokens are rejected.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_context = authenticate_bearer(req.headers(), &state.tokens)?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
