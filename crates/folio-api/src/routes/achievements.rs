//! # Achievement API
//!
//! - `GET    /v1/student/achievements`: list (`search`, `category`, `status`)
//! - `POST   /v1/student/achievements`: create (starts PENDING)
//! - `GET    /v1/student/achievements/{id}`
//! - `PUT    /v1/student/achievements/{id}`: replace and resubmit
//! - `DELETE /v1/student/achievements/{id}`

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

use super::submissions::{self, ListParams};
use crate::error::AppError;
use crate::extractors::CurrentStudent;
use crate::state::AppState;
use crate::submission::{AchievementDraft, AchievementRecord};

/// Build the achievements router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/student/achievements",
            get(list_achievements).post(create_achievement),
        )
        .route(
            "/v1/student/achievements/{id}",
            get(get_achievement)
                .put(update_achievement)
                .delete(delete_achievement),
        )
}

/// GET /v1/student/achievements
#[utoipa::path(
    get,
    path = "/v1/student/achievements",
    params(ListParams),
    responses(
        (status = 200, description = "Caller's achievements, newest first", body = Vec<AchievementRecord>),
        (status = 400, description = "Invalid filter", body = crate::error::ErrorBody),
    ),
    tag = "achievements"
)]
pub async fn list_achievements(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<AchievementRecord>>, AppError> {
    submissions::list(&state, &student, params)
}

/// POST /v1/student/achievements
#[utoipa::path(
    post,
    path = "/v1/student/achievements",
    request_body = AchievementDraft,
    responses(
        (status = 201, description = "Achievement created", body = AchievementRecord),
        (status = 400, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "achievements"
)]
pub async fn create_achievement(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    body: Result<Json<AchievementDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<AchievementRecord>), AppError> {
    submissions::create(&state, &student, body).await
}

/// GET /v1/student/achievements/{id}
#[utoipa::path(
    get,
    path = "/v1/student/achievements/{id}",
    params(("id" = Uuid, Path, description = "Achievement ID")),
    responses(
        (status = 200, description = "Achievement", body = AchievementRecord),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "achievements"
)]
pub async fn get_achievement(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    Path(id): Path<Uuid>,
) -> Result<Json<AchievementRecord>, AppError> {
    submissions::get(&state, &student, id)
}

/// PUT /v1/student/achievements/{id}
#[utoipa::path(
    put,
    path = "/v1/student/achievements/{id}",
    params(("id" = Uuid, Path, description = "Achievement ID")),
    request_body = AchievementDraft,
    responses(
        (status = 200, description = "Achievement replaced and back to PENDING", body = AchievementRecord),
        (status = 400, description = "Validation error", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Achievement is verified", body = crate::error::ErrorBody),
    ),
    tag = "achievements"
)]
pub async fn update_achievement(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    Path(id): Path<Uuid>,
    body: Result<Json<AchievementDraft>, JsonRejection>,
) -> Result<Json<AchievementRecord>, AppError> {
    submissions::update(&state, &student, id, body).await
}

/// DELETE /v1/student/achievements/{id}
#[utoipa::path(
    delete,
    path = "/v1/student/achievements/{id}",
    params(("id" = Uuid, Path, description = "Achievement ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Achievement is verified", body = crate::error::ErrorBody),
    ),
    tag = "achievements"
)]
pub async fn delete_achievement(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    submissions::delete::<AchievementRecord>(&state, &student, id).await
}
