//! # Student Profile API
//!
//! - `GET /v1/student/profile`: profile view with completion score
//! - `PUT /v1/student/profile`: create on first save, replace afterwards
//! - `GET /v1/student/stats`: dashboard numbers
//! - `GET /v1/student/insights`: up to three suggestions
//! - `GET /v1/student/portfolio`: JSON, or Markdown with `?format=markdown`
//! - `GET /v1/student/activity`: activity log, newest first

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::auth::CallerIdentity;
use crate::dashboard::{self, DashboardStats, Insight};
use crate::error::AppError;
use crate::extractors::{extract_json, extract_query, CurrentStudent};
use crate::portfolio::{self, Portfolio};
use crate::profile::{self, ProfileDraft, ProfileView};
use crate::sinks;
use crate::state::{ActivityRecord, AppState, StudentRecord};

/// Activity entries returned when no limit is given.
const DEFAULT_ACTIVITY_LIMIT: usize = 20;
/// Largest accepted activity limit.
const MAX_ACTIVITY_LIMIT: usize = 100;

/// Build the profile router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/student/profile", get(get_profile).put(put_profile))
        .route("/v1/student/stats", get(get_stats))
        .route("/v1/student/insights", get(get_insights))
        .route("/v1/student/portfolio", get(get_portfolio))
        .route("/v1/student/activity", get(get_activity))
}

/// GET /v1/student/profile
#[utoipa::path(
    get,
    path = "/v1/student/profile",
    responses(
        (status = 200, description = "Profile view", body = ProfileView),
        (status = 404, description = "No profile yet", body = crate::error::ErrorBody),
    ),
    tag = "profile"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
) -> Json<ProfileView> {
    Json(profile::view(&state, student))
}

/// PUT /v1/student/profile
#[utoipa::path(
    put,
    path = "/v1/student/profile",
    request_body = ProfileDraft,
    responses(
        (status = 201, description = "Profile created", body = StudentRecord),
        (status = 200, description = "Profile replaced", body = StudentRecord),
        (status = 400, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "profile"
)]
pub async fn put_profile(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<ProfileDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<StudentRecord>), AppError> {
    let draft = extract_json(body)?;
    let (record, created) = profile::upsert(&state, &caller.user_id, draft).await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(record)))
}

/// GET /v1/student/stats
#[utoipa::path(
    get,
    path = "/v1/student/stats",
    responses((status = 200, description = "Dashboard stats", body = DashboardStats)),
    tag = "profile"
)]
pub async fn get_stats(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
) -> Json<DashboardStats> {
    Json(dashboard::stats(&state, student.id))
}

/// GET /v1/student/insights
#[utoipa::path(
    get,
    path = "/v1/student/insights",
    responses((status = 200, description = "Improvement insights", body = Vec<Insight>)),
    tag = "profile"
)]
pub async fn get_insights(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
) -> Json<Vec<Insight>> {
    Json(dashboard::insights(&state, &student))
}

/// Portfolio rendering.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PortfolioParams {
    /// `json` (default) or `markdown`.
    pub format: Option<String>,
}

/// GET /v1/student/portfolio
#[utoipa::path(
    get,
    path = "/v1/student/portfolio",
    params(PortfolioParams),
    responses(
        (status = 200, description = "Portfolio of verified records", body = Portfolio),
        (status = 400, description = "Unknown format", body = crate::error::ErrorBody),
    ),
    tag = "profile"
)]
pub async fn get_portfolio(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    params: Result<Query<PortfolioParams>, QueryRejection>,
) -> Result<Response, AppError> {
    let params = extract_query(params)?;
    let document = portfolio::build(&state, &student);
    match params.format.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None | Some("json") => Ok(Json(document).into_response()),
        Some("markdown") | Some("md") => Ok((
            [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
            document.to_markdown(),
        )
            .into_response()),
        Some(other) => Err(folio_core::ValidationError::invalid(
            "format",
            format!("unsupported portfolio format: {other}"),
        )
        .into()),
    }
}

/// Activity listing parameters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ActivityParams {
    /// Entries to return (default 20, at most 100).
    pub limit: Option<usize>,
}

/// GET /v1/student/activity
#[utoipa::path(
    get,
    path = "/v1/student/activity",
    params(ActivityParams),
    responses((status = 200, description = "Activity log, newest first", body = Vec<ActivityRecord>)),
    tag = "profile"
)]
pub async fn get_activity(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    params: Result<Query<ActivityParams>, QueryRejection>,
) -> Result<Json<Vec<ActivityRecord>>, AppError> {
    let limit = extract_query(params)?
        .limit
        .unwrap_or(DEFAULT_ACTIVITY_LIMIT)
        .min(MAX_ACTIVITY_LIMIT);
    Ok(Json(sinks::list_activity(&state, student.id, limit)))
}
