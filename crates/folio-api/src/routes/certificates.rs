//! # Certificate API
//!
//! - `GET    /v1/student/certificates`: list (`search`, `category`, `status`)
//! - `POST   /v1/student/certificates`: create (starts PENDING)
//! - `GET    /v1/student/certificates/stats`: certificate statistics
//! - `GET    /v1/student/certificates/{id}`
//! - `PUT    /v1/student/certificates/{id}`: replace and resubmit
//! - `DELETE /v1/student/certificates/{id}`

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

use super::submissions::{self, ListParams};
use crate::dashboard::{self, CertificateStats};
use crate::error::AppError;
use crate::extractors::CurrentStudent;
use crate::state::AppState;
use crate::submission::{CertificateDraft, CertificateRecord};

/// Build the certificates router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/student/certificates",
            get(list_certificates).post(create_certificate),
        )
        .route("/v1/student/certificates/stats", get(certificate_stats))
        .route(
            "/v1/student/certificates/{id}",
            get(get_certificate)
                .put(update_certificate)
                .delete(delete_certificate),
        )
}

/// GET /v1/student/certificates
#[utoipa::path(
    get,
    path = "/v1/student/certificates",
    params(ListParams),
    responses(
        (status = 200, description = "Caller's certificates, newest first", body = Vec<CertificateRecord>),
        (status = 400, description = "Invalid filter", body = crate::error::ErrorBody),
    ),
    tag = "certificates"
)]
pub async fn list_certificates(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<CertificateRecord>>, AppError> {
    submissions::list(&state, &student, params)
}

/// POST /v1/student/certificates
#[utoipa::path(
    post,
    path = "/v1/student/certificates",
    request_body = CertificateDraft,
    responses(
        (status = 201, description = "Certificate created", body = CertificateRecord),
        (status = 400, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "certificates"
)]
pub async fn create_certificate(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    body: Result<Json<CertificateDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<CertificateRecord>), AppError> {
    submissions::create(&state, &student, body).await
}

/// GET /v1/student/certificates/stats
#[utoipa::path(
    get,
    path = "/v1/student/certificates/stats",
    responses(
        (status = 200, description = "Certificate statistics", body = CertificateStats),
    ),
    tag = "certificates"
)]
pub async fn certificate_stats(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
) -> Json<CertificateStats> {
    Json(dashboard::certificate_stats(&state, student.id))
}

/// GET /v1/student/certificates/{id}
#[utoipa::path(
    get,
    path = "/v1/student/certificates/{id}",
    params(("id" = Uuid, Path, description = "Certificate ID")),
    responses(
        (status = 200, description = "Certificate", body = CertificateRecord),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "certificates"
)]
pub async fn get_certificate(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    Path(id): Path<Uuid>,
) -> Result<Json<CertificateRecord>, AppError> {
    submissions::get(&state, &student, id)
}

/// PUT /v1/student/certificates/{id}
#[utoipa::path(
    put,
    path = "/v1/student/certificates/{id}",
    params(("id" = Uuid, Path, description = "Certificate ID")),
    request_body = CertificateDraft,
    responses(
        (status = 200, description = "Certificate replaced and back to PENDING", body = CertificateRecord),
        (status = 400, description = "Validation error", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Certificate is verified", body = crate::error::ErrorBody),
    ),
    tag = "certificates"
)]
pub async fn update_certificate(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    Path(id): Path<Uuid>,
    body: Result<Json<CertificateDraft>, JsonRejection>,
) -> Result<Json<CertificateRecord>, AppError> {
    submissions::update(&state, &student, id, body).await
}

/// DELETE /v1/student/certificates/{id}
#[utoipa::path(
    delete,
    path = "/v1/student/certificates/{id}",
    params(("id" = Uuid, Path, description = "Certificate ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Certificate is verified", body = crate::error::ErrorBody),
    ),
    tag = "certificates"
)]
pub async fn delete_certificate(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    submissions::delete::<CertificateRecord>(&state, &student, id).await
}
