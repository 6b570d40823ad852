//! # folio-api: Axum API Service for Student Portfolios
//!
//! Students record certificates, achievements and experiences; admins
//! verify them. Around that workflow sit the profile, skills, notifications,
//! activity log, dashboard stats and insights, portfolio export, file
//! uploads and an assistant chat.
//!
//! ## API Surface
//!
//! | Prefix                          | Module                        |
//! |---------------------------------|-------------------------------|
//! | `/v1/student/profile`, `stats`, `insights`, `portfolio`, `activity` | [`routes::profile`] |
//! | `/v1/student/certificates/*`    | [`routes::certificates`]      |
//! | `/v1/student/achievements/*`    | [`routes::achievements`]      |
//! | `/v1/student/experiences/*`     | [`routes::experiences`]       |
//! | `/v1/skills`, `/v1/student/skills` | [`routes::skills`]         |
//! | `/v1/student/notifications/*`   | [`routes::notifications`]     |
//! | `/v1/upload/certificate`        | [`routes::uploads`]           |
//! | `/v1/ai/chat`                   | [`routes::assistant`]         |
//! | `/v1/admin/*`                   | [`routes::admin`]             |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! CorsLayer -> TraceLayer -> MetricsMiddleware -> AuthMiddleware -> Handler
//! ```
//!
//! ## OpenAPI
//!
//! Generated with utoipa and served at `/openapi.json`.

pub mod auth;
pub mod chat;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod portfolio;
pub mod profile;
pub mod records;
pub mod routes;
pub mod sinks;
pub mod skills;
pub mod state;
pub mod submission;
pub mod uploads;
pub mod verification;

pub use error::AppError;
pub use state::AppState;

use axum::middleware::from_fn;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) are mounted outside the auth middleware
/// so they remain accessible without credentials.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };

    let api = Router::new()
        .merge(routes::router())
        .merge(routes::uploads::router(state.config.max_upload_bytes))
        .merge(openapi::router());
    let api = routes::uploads::mount_stored_files(api, &state);

    let api = api
        .layer(from_fn(auth::auth_middleware))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(auth_config))
        .with_state(state);

    // Unauthenticated health probes.
    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new()
        .merge(health)
        .merge(api)
        .layer(CorsLayer::permissive())
}

/// Liveness probe: 200 while the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe.
async fn readiness() -> &'static str {
    "ready"
}
