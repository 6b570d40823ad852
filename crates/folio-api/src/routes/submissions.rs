//! Handler bodies shared by the certificate, achievement and experience
//! routes. Each kind's module declares the documented handlers and
//! delegates here.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::Query;
use axum::http::StatusCode;
use axum::Json;
use folio_core::FolioError;
use folio_state::VerificationStatus;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::{extract_json, extract_query};
use crate::records::{self, ListQuery};
use crate::state::{AppState, StudentRecord};
use crate::submission::{Submission, SubmissionDetails};

/// Query parameters for submission listings. Only the first one set is
/// applied, in this order: `search`, `category`, `status`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Case-insensitive text search.
    pub search: Option<String>,
    /// Category (or kind, for experiences).
    pub category: Option<String>,
    /// Verification status, e.g. `PENDING`.
    pub status: Option<String>,
}

impl ListParams {
    fn into_query(self) -> Result<ListQuery, AppError> {
        let status = self
            .status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_ascii_uppercase().parse::<VerificationStatus>())
            .transpose()
            .map_err(FolioError::from)?;
        Ok(ListQuery {
            search: self.search,
            category: self.category,
            status,
        })
    }
}

pub(crate) fn list<R: Submission>(
    state: &AppState,
    student: &StudentRecord,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<R>>, AppError> {
    let query = extract_query(params)?.into_query()?;
    Ok(Json(records::list(state, student.id, &query)))
}

pub(crate) async fn create<R: Submission>(
    state: &AppState,
    student: &StudentRecord,
    body: Result<Json<<R::Details as SubmissionDetails>::Draft>, JsonRejection>,
) -> Result<(StatusCode, Json<R>), AppError> {
    let draft = extract_json(body)?;
    let record = records::create::<R>(state, student.id, draft).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub(crate) fn get<R: Submission>(
    state: &AppState,
    student: &StudentRecord,
    id: Uuid,
) -> Result<Json<R>, AppError> {
    Ok(Json(records::get(state, student.id, id)?))
}

pub(crate) async fn update<R: Submission>(
    state: &AppState,
    student: &StudentRecord,
    id: Uuid,
    body: Result<Json<<R::Details as SubmissionDetails>::Draft>, JsonRejection>,
) -> Result<Json<R>, AppError> {
    let draft = extract_json(body)?;
    Ok(Json(records::update::<R>(state, student.id, id, draft).await?))
}

pub(crate) async fn delete<R: Submission>(
    state: &AppState,
    student: &StudentRecord,
    id: Uuid,
) -> Result<StatusCode, AppError> {
    records::delete::<R>(state, student.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parameter_is_case_insensitive() {
        let query = ListParams {
            status: Some("verified".into()),
            ..ListParams::default()
        }
        .into_query()
        .unwrap();
        assert_eq!(query.status, Some(VerificationStatus::Verified));
    }

    #[test]
    fn unknown_status_is_validation_error() {
        let err = ListParams {
            status: Some("DONE".into()),
            ..ListParams::default()
        }
        .into_query()
        .unwrap_err();
        assert!(matches!(err, AppError::Validation { ref fields, .. } if fields == &vec!["status".to_string()]));
    }
}
