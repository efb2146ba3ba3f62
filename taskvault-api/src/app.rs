/// Application state and router builder
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                  # Health check (public)
/// ├── /users                   # POST: register (public)
/// │   ├── /login               # POST: authenticate (public)
/// │   ├── /logout              # POST: revoke presented token
/// │   ├── /logoutAll           # POST: revoke every token
/// │   └── /me                  # GET | PATCH | DELETE profile
/// └── /tasks                   # GET | POST task collection
///     └── /:id                 # GET | PATCH | DELETE one task
/// ```
///
/// Everything below the public block sits behind the session auth layer:
/// the bearer token is verified against the live token set and the
/// resolved [`AuthSession`] is injected as a request extension before any
/// handler runs.

use crate::config::Config;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskvault_shared::{
    auth::session,
    email::{Mailer, MailerConfig},
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned per request via Axum's `State` extractor; all members are cheap
/// to clone.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Account email notifier
    pub mailer: Mailer,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        let mailer = Mailer::new(MailerConfig {
            api_key: config.email.api_key.clone(),
            endpoint: config.email.endpoint.clone(),
            from: config.email.from.clone(),
        });

        Self {
            db,
            config: Arc::new(config),
            mailer,
        }
    }

    /// Gets the session token signing secret
    pub fn jwt_secret(&self) -> &str {
        &self.config.auth.jwt_secret
    }

    /// Gets the session validity window
    pub fn session_ttl(&self) -> chrono::Duration {
        self.config.session_ttl()
    }
}

/// Builds the complete Axum router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Public: no session required
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/users", post(routes::users::register))
        .route("/users/login", post(routes::users::login));

    // Protected: session auth layer runs first
    let protected_routes = Router::new()
        .route("/users/logout", post(routes::users::logout))
        .route("/users/logoutAll", post(routes::users::logout_all))
        .route(
            "/users/me",
            get(routes::users::me)
                .patch(routes::users::update_me)
                .delete(routes::users::delete_me),
        )
        .route(
            "/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/tasks/:id",
            get(routes::tasks::get_task)
                .patch(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_auth_layer,
        ));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
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
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
    };

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(axum::middleware::from_fn(
            crate::middleware::security::security_headers,
        ))
        .with_state(state)
}

/// Session authentication middleware layer
///
/// Extracts the bearer token, verifies it against the live token set, and
/// injects the resolved [`session::AuthSession`] into request extensions.
/// Any failure answers 401 before the handler is reached.
async fn session_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| crate::error::ApiError::Unauthorized("Please authenticate.".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| crate::error::ApiError::Unauthorized("Please authenticate.".to_string()))?;

    let auth_session = session::verify(&state.db, token, state.jwt_secret()).await?;

    req.extensions_mut().insert(auth_session);

    Ok(next.run(req).await)
}
