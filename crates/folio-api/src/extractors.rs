//! # Custom Extractors
//!
//! Helpers that map body and query rejections to [`AppError::BadRequest`],
//! and extractors that resolve the caller to a student or an admin.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use axum::Json;

use crate::auth::{require_role, CallerIdentity, Role};
use crate::error::AppError;
use crate::state::{AppState, StudentRecord};

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
///
/// Handlers take the body as a `Result` so the rejection goes through the
/// service's error format:
/// ```ignore
/// async fn handler(body: Result<Json<T>, JsonRejection>) -> Result<..., AppError> {
///     let req = extract_json(body)?;
/// }
/// ```
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract query parameters, mapping parse errors to [`AppError::BadRequest`].
pub fn extract_query<T>(result: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    result
        .map(|Query(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// The student profile belonging to the authenticated caller.
///
/// Rejects with 404 when the caller has not created a profile yet.
#[derive(Debug, Clone)]
pub struct CurrentStudent(pub StudentRecord);

impl FromRequestParts<AppState> for CurrentStudent {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let caller = CallerIdentity::from_request_parts(parts, state).await?;
        state
            .student_by_user(&caller.user_id)
            .map(CurrentStudent)
            .ok_or_else(|| AppError::NotFound("student profile not found".into()))
    }
}

/// An authenticated caller holding the admin role. Anyone else gets 403.
#[derive(Debug, Clone)]
pub struct AdminCaller(pub CallerIdentity);

impl<S: Send + Sync> FromRequestParts<S> for AdminCaller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let caller = CallerIdentity::from_request_parts(parts, state).await?;
        require_role(&caller, Role::Admin)?;
        Ok(AdminCaller(caller))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use axum::{Extension, Router};
    use tower::ServiceExt;

    fn caller(role: Role, user: &str) -> CallerIdentity {
        CallerIdentity {
            role,
            user_id: user.into(),
        }
    }

    async fn status_for(app: Router, identity: Option<CallerIdentity>) -> StatusCode {
        let app = match identity {
            Some(id) => app.layer(Extension(id)),
            None => app,
        };
        app.oneshot(Request::builder().uri("/t").body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn current_student_requires_a_profile() {
        let state = AppState::new();
        let app = Router::new()
            .route("/t", get(|CurrentStudent(s): CurrentStudent| async move { s.user_id }))
            .with_state(state);
        assert_eq!(
            status_for(app, Some(caller(Role::Student, "nobody"))).await,
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn admin_caller_rejects_students() {
        let app = Router::new().route("/t", get(|_: AdminCaller| async { "ok" }));
        assert_eq!(
            status_for(app.clone(), Some(caller(Role::Student, "u1"))).await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_for(app.clone(), Some(caller(Role::Admin, "ops"))).await,
            StatusCode::OK
        );
        assert_eq!(status_for(app, None).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn malformed_json_becomes_bad_request() {
        let app = Router::new().route(
            "/t",
            axum::routing::post(|body: Result<Json<serde_json::Value>, JsonRejection>| async move {
                extract_json(body).map(|v| v.to_string())
            }),
        );
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/t")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
