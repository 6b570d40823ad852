//! # API Route Modules
//!
//! - `profile`: profile read/upsert, stats, insights, portfolio, activity.
//! - `certificates`, `achievements`, `experiences`: owner-scoped submission
//!   CRUD. The three share the generic handlers in `submissions`.
//! - `skills`: skill catalog and the caller's skills.
//! - `notifications`: listing and mark-read.
//! - `uploads`: certificate file upload.
//! - `assistant`: assistant chat.
//! - `admin`: review queue and verifier decisions.

pub mod achievements;
pub mod admin;
pub mod assistant;
pub mod certificates;
pub mod experiences;
pub mod notifications;
pub mod profile;
pub mod skills;
pub mod submissions;
pub mod uploads;

use axum::Router;

use crate::state::AppState;

/// All authenticated API routes except uploads, which carry their own body limit.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(profile::router())
        .merge(certificates::router())
        .merge(achievements::router())
        .merge(experiences::router())
        .merge(skills::router())
        .merge(notifications::router())
        .merge(assistant::router())
        .merge(admin::router())
}
