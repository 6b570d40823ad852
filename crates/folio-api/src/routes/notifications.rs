//! # Notifications API
//!
//! - `GET  /v1/student/notifications`: newest first, optionally unread only
//! - `POST /v1/student/notifications/{id}/read`: mark read (idempotent)

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::{extract_query, CurrentStudent};
use crate::sinks;
use crate::state::{AppState, NotificationRecord};

/// Build the notifications router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/student/notifications", get(list_notifications))
        .route(
            "/v1/student/notifications/{id}/read",
            post(mark_notification_read),
        )
}

/// Notification listing parameters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NotificationParams {
    /// Only unread notifications.
    #[serde(default)]
    pub unread_only: bool,
}

/// GET /v1/student/notifications
#[utoipa::path(
    get,
    path = "/v1/student/notifications",
    params(NotificationParams),
    responses((status = 200, description = "At most 50 notifications, newest first", body = Vec<NotificationRecord>)),
    tag = "notifications"
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    params: Result<Query<NotificationParams>, QueryRejection>,
) -> Result<Json<Vec<NotificationRecord>>, AppError> {
    let params = extract_query(params)?;
    Ok(Json(sinks::list_notifications(
        &state,
        student.id,
        params.unread_only,
    )))
}

/// POST /v1/student/notifications/{id}/read
#[utoipa::path(
    post,
    path = "/v1/student/notifications/{id}/read",
    params(("id" = Uuid, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification marked read", body = NotificationRecord),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "notifications"
)]
pub async fn mark_notification_read(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    Path(id): Path<Uuid>,
) -> Result<Json<NotificationRecord>, AppError> {
    Ok(Json(sinks::mark_read(&state, student.id, id).await?))
}
