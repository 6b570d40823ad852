//! # Experience API
//!
//! - `GET    /v1/student/experiences`: list (`search`, `category`, `status`)
//! - `POST   /v1/student/experiences`: create (starts PENDING)
//! - `GET    /v1/student/experiences/{id}`
//! - `PUT    /v1/student/experiences/{id}`: replace and resubmit
//! - `DELETE /v1/student/experiences/{id}`

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
use crate::submission::{ExperienceDraft, ExperienceRecord};

/// Build the experiences router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/student/experiences",
            get(list_experiences).post(create_experience),
        )
        .route(
            "/v1/student/experiences/{id}",
            get(get_experience)
                .put(update_experience)
                .delete(delete_experience),
        )
}

/// GET /v1/student/experiences
#[utoipa::path(
    get,
    path = "/v1/student/experiences",
    params(ListParams),
    responses(
        (status = 200, description = "Caller's experiences, newest first", body = Vec<ExperienceRecord>),
        (status = 400, description = "Invalid filter", body = crate::error::ErrorBody),
    ),
    tag = "experiences"
)]
pub async fn list_experiences(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<ExperienceRecord>>, AppError> {
    submissions::list(&state, &student, params)
}

/// POST /v1/student/experiences
#[utoipa::path(
    post,
    path = "/v1/student/experiences",
    request_body = ExperienceDraft,
    responses(
        (status = 201, description = "Experience created", body = ExperienceRecord),
        (status = 400, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "experiences"
)]
pub async fn create_experience(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    body: Result<Json<ExperienceDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<ExperienceRecord>), AppError> {
    submissions::create(&state, &student, body).await
}

/// GET /v1/student/experiences/{id}
#[utoipa::path(
    get,
    path = "/v1/student/experiences/{id}",
    params(("id" = Uuid, Path, description = "Experience ID")),
    responses(
        (status = 200, description = "Experience", body = ExperienceRecord),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "experiences"
)]
pub async fn get_experience(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    Path(id): Path<Uuid>,
) -> Result<Json<ExperienceRecord>, AppError> {
    submissions::get(&state, &student, id)
}

/// PUT /v1/student/experiences/{id}
#[utoipa::path(
    put,
    path = "/v1/student/experiences/{id}",
    params(("id" = Uuid, Path, description = "Experience ID")),
    request_body = ExperienceDraft,
    responses(
        (status = 200, description = "Experience replaced and back to PENDING", body = ExperienceRecord),
        (status = 400, description = "Validation error", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Experience is verified", body = crate::error::ErrorBody),
    ),
    tag = "experiences"
)]
pub async fn update_experience(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    Path(id): Path<Uuid>,
    body: Result<Json<ExperienceDraft>, JsonRejection>,
) -> Result<Json<ExperienceRecord>, AppError> {
    submissions::update(&state, &student, id, body).await
}

/// DELETE /v1/student/experiences/{id}
#[utoipa::path(
    delete,
    path = "/v1/student/experiences/{id}",
    params(("id" = Uuid, Path, description = "Experience ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Experience is verified", body = crate::error::ErrorBody),
    ),
    tag = "experiences"
)]
pub async fn delete_experience(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    submissions::delete::<ExperienceRecord>(&state, &student, id).await
}
