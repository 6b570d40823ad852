//! # Skills API
//!
//! - `GET  /v1/skills`: shared catalog, optionally by `category`
//! - `GET  /v1/student/skills`: the caller's skills
//! - `POST /v1/student/skills`: add a skill or change its proficiency

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use folio_core::{SkillCategory, UnknownVariant, ValidationError};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::AppError;
use crate::extractors::{extract_json, extract_query, CurrentStudent};
use crate::skills::{self, SkillDraft};
use crate::state::{AppState, SkillRecord, StudentSkillRecord};

/// Build the skills router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/skills", get(list_catalog))
        .route(
            "/v1/student/skills",
            get(list_student_skills).post(upsert_student_skill),
        )
}

/// Catalog filter.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CatalogParams {
    /// Skill category, e.g. `PROGRAMMING`.
    pub category: Option<String>,
}

/// GET /v1/skills
#[utoipa::path(
    get,
    path = "/v1/skills",
    params(CatalogParams),
    responses(
        (status = 200, description = "Catalog skills sorted by name", body = Vec<SkillRecord>),
        (status = 400, description = "Unknown category", body = crate::error::ErrorBody),
    ),
    tag = "skills"
)]
pub async fn list_catalog(
    State(state): State<AppState>,
    params: Result<Query<CatalogParams>, QueryRejection>,
) -> Result<Json<Vec<SkillRecord>>, AppError> {
    let category = extract_query(params)?
        .category
        .filter(|c| !c.trim().is_empty())
        .map(|c| {
            c.trim()
                .to_ascii_uppercase()
                .parse::<SkillCategory>()
                .map_err(|e: UnknownVariant| ValidationError::invalid("category", e.to_string()))
        })
        .transpose()?;
    Ok(Json(skills::catalog(&state, category)))
}

/// GET /v1/student/skills
#[utoipa::path(
    get,
    path = "/v1/student/skills",
    responses((status = 200, description = "Caller's skills", body = Vec<StudentSkillRecord>)),
    tag = "skills"
)]
pub async fn list_student_skills(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
) -> Json<Vec<StudentSkillRecord>> {
    Json(skills::list_for_student(&state, student.id))
}

/// POST /v1/student/skills
#[utoipa::path(
    post,
    path = "/v1/student/skills",
    request_body = SkillDraft,
    responses(
        (status = 201, description = "Skill added", body = StudentSkillRecord),
        (status = 200, description = "Existing skill updated", body = StudentSkillRecord),
        (status = 400, description = "Validation error", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown skill id", body = crate::error::ErrorBody),
    ),
    tag = "skills"
)]
pub async fn upsert_student_skill(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    body: Result<Json<SkillDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<StudentSkillRecord>), AppError> {
    let draft = extract_json(body)?;
    let (record, created) = skills::upsert(&state, student.id, draft).await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(record)))
}
