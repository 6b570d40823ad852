//! # Verifier API
//!
//! Admin-only. Every handler takes [`AdminCaller`], so students get 403.
//!
//! - `GET  /v1/admin/verifications`: PENDING and UNDER_REVIEW submissions
//! - `POST /v1/admin/{kind}/{id}/review`: PENDING to UNDER_REVIEW
//! - `POST /v1/admin/{kind}/{id}/verify`: VERIFIED or REJECTED
//!
//! `{kind}` is `certificates`, `achievements` or `experiences`.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use folio_core::{FolioError, RecordKind, RequiredFields};
use folio_state::VerificationDecision;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::{extract_json, AdminCaller};
use crate::state::AppState;
use crate::submission::{AchievementRecord, CertificateRecord, ExperienceRecord, Submission};
use crate::verification::{self, ReviewItem};

/// Build the admin router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/admin/verifications", get(review_queue))
        .route("/v1/admin/{kind}/{id}/review", post(mark_under_review))
        .route("/v1/admin/{kind}/{id}/verify", post(verify_submission))
}

/// A verifier decision.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct VerifyRequest {
    /// `VERIFIED` or `REJECTED`.
    pub decision: Option<String>,
    /// Required when rejecting; shown to the owner.
    pub rejection_reason: Option<String>,
}

impl VerifyRequest {
    fn decision(&self) -> Result<VerificationDecision, FolioError> {
        let mut required = RequiredFields::new();
        let Some(raw) = required.text("decision", self.decision.clone()) else {
            return Err(required.into_error().into());
        };
        Ok(raw.to_ascii_uppercase().parse::<VerificationDecision>()?)
    }
}

fn kind_of(segment: &str) -> Result<RecordKind, AppError> {
    RecordKind::from_plural(segment)
        .ok_or_else(|| AppError::NotFound(format!("unknown record kind: {segment}")))
}

/// GET /v1/admin/verifications
#[utoipa::path(
    get,
    path = "/v1/admin/verifications",
    responses(
        (status = 200, description = "Submissions awaiting a decision, oldest first", body = Vec<ReviewItem>),
        (status = 403, description = "Caller is not an admin", body = crate::error::ErrorBody),
    ),
    tag = "admin"
)]
pub async fn review_queue(
    State(state): State<AppState>,
    _admin: AdminCaller,
) -> Json<Vec<ReviewItem>> {
    Json(verification::review_queue(&state))
}

/// POST /v1/admin/{kind}/{id}/review
#[utoipa::path(
    post,
    path = "/v1/admin/{kind}/{id}/review",
    params(
        ("kind" = String, Path, description = "certificates, achievements or experiences"),
        ("id" = Uuid, Path, description = "Record ID"),
    ),
    responses(
        (status = 200, description = "Record is now UNDER_REVIEW"),
        (status = 403, description = "Caller is not an admin", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Record is not PENDING", body = crate::error::ErrorBody),
    ),
    tag = "admin"
)]
pub async fn mark_under_review(
    State(state): State<AppState>,
    AdminCaller(admin): AdminCaller,
    Path((kind, id)): Path<(String, Uuid)>,
) -> Result<Response, AppError> {
    async fn run<R: Submission>(
        state: &AppState,
        id: Uuid,
        verifier: &str,
    ) -> Result<Response, AppError> {
        let record = verification::mark_under_review::<R>(state, id, verifier).await?;
        Ok(Json(record).into_response())
    }

    match kind_of(&kind)? {
        RecordKind::Certificate => run::<CertificateRecord>(&state, id, &admin.user_id).await,
        RecordKind::Achievement => run::<AchievementRecord>(&state, id, &admin.user_id).await,
        RecordKind::Experience => run::<ExperienceRecord>(&state, id, &admin.user_id).await,
    }
}

/// POST /v1/admin/{kind}/{id}/verify
#[utoipa::path(
    post,
    path = "/v1/admin/{kind}/{id}/verify",
    params(
        ("kind" = String, Path, description = "certificates, achievements or experiences"),
        ("id" = Uuid, Path, description = "Record ID"),
    ),
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Decision recorded; the owner is notified"),
        (status = 400, description = "Missing decision or rejection reason", body = crate::error::ErrorBody),
        (status = 403, description = "Caller is not an admin", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Already decided", body = crate::error::ErrorBody),
    ),
    tag = "admin"
)]
pub async fn verify_submission(
    State(state): State<AppState>,
    AdminCaller(admin): AdminCaller,
    Path((kind, id)): Path<(String, Uuid)>,
    body: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    async fn run<R: Submission>(
        state: &AppState,
        id: Uuid,
        verifier: &str,
        decision: VerificationDecision,
        reason: Option<&str>,
    ) -> Result<Response, AppError> {
        let record = verification::verify::<R>(state, id, verifier, decision, reason).await?;
        Ok(Json(record).into_response())
    }

    let kind = kind_of(&kind)?;
    let req = extract_json(body)?;
    let decision = req.decision()?;
    let reason = req.rejection_reason.as_deref();
    let verifier = admin.user_id.as_str();

    match kind {
        RecordKind::Certificate => {
            run::<CertificateRecord>(&state, id, verifier, decision, reason).await
        }
        RecordKind::Achievement => {
            run::<AchievementRecord>(&state, id, verifier, decision, reason).await
        }
        RecordKind::Experience => {
            run::<ExperienceRecord>(&state, id, verifier, decision, reason).await
        }
    }
}
