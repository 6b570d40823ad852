//! # Authentication & Authorization Middleware
//!
//! Identity itself is delegated to an external provider. This layer only
//! accepts the provider-issued subject in a bearer token and turns it into
//! a [`CallerIdentity`].
//!
//! ## Token Format
//!
//! ```text
//! Bearer {role}:{user_id}:{secret}   # AUTH_TOKEN configured
//! Bearer {role}:{user_id}            # development mode (no AUTH_TOKEN)
//! ```
//!
//! `role` is `student` or `admin`. A request without a bearer token is
//! rejected with 401 in both modes.

use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use utoipa::ToSchema;

use crate::error::{AppError, ErrorBody, ErrorDetail};

// ── Role ────────────────────────────────────────────────────────────────────

/// Roles, ordered by privilege level (`Student < Admin`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Owns a profile and its submissions.
    Student,
    /// Reviews and verifies submissions across all students.
    Admin,
}

impl Role {
    /// Return the string representation of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Admin => "admin",
        }
    }
}

// ── CallerIdentity ──────────────────────────────────────────────────────────

/// Identity of the authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub role: Role,
    /// Subject issued by the identity provider.
    pub user_id: String,
}

impl CallerIdentity {
    /// Check if the caller has at least the given minimum role.
    pub fn has_role(&self, minimum: Role) -> bool {
        self.role >= minimum
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("no caller identity in request context".into()))
    }
}

/// Check that the caller has at least the required role.
/// Returns 403 Forbidden if the caller's role is insufficient.
pub fn require_role(caller: &CallerIdentity, minimum: Role) -> Result<(), AppError> {
    if caller.has_role(minimum) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "role '{}' required, caller has '{}'",
            minimum.as_str(),
            caller.role.as_str()
        )))
    }
}

// ── Auth Configuration ──────────────────────────────────────────────────────

/// Auth configuration injected into request extensions.
///
/// Custom `Debug` redacts the token value.
#[derive(Clone, Default)]
pub struct AuthConfig {
    pub token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// ── Token Validation ────────────────────────────────────────────────────────

/// Constant-time comparison of bearer secrets.
fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Parse a bearer token into a [`CallerIdentity`].
///
/// With `expected_secret` set the token must be `{role}:{user_id}:{secret}`.
/// Without it, `{role}:{user_id}` is accepted and any trailing secret is ignored.
pub fn parse_bearer_token(
    provided: &str,
    expected_secret: Option<&str>,
) -> Result<CallerIdentity, String> {
    let parts: Vec<&str> = provided.splitn(3, ':').collect();

    let (role_str, user_id) = match (parts.as_slice(), expected_secret) {
        ([role, user, secret], Some(expected)) => {
            if !constant_time_token_eq(secret, expected) {
                return Err("invalid bearer token".into());
            }
            (*role, *user)
        }
        ([_, _], Some(_)) => return Err("invalid bearer token".into()),
        ([role, user, _], None) | ([role, user], None) => (*role, *user),
        _ => return Err("invalid token format, expected {role}:{user_id}:{secret}".into()),
    };

    let role = match role_str {
        "student" => Role::Student,
        "admin" => Role::Admin,
        other => return Err(format!("unknown role: {other}")),
    };

    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err("token carries no user id".into());
    }

    Ok(CallerIdentity {
        role,
        user_id: user_id.to_string(),
    })
}

// ── Middleware ───────────────────────────────────────────────────────────────

/// Extract and validate the Bearer token, injecting [`CallerIdentity`]
/// into request extensions for downstream handlers.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let expected = request
        .extensions()
        .get::<AuthConfig>()
        .and_then(|c| c.token.clone());

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match auth_header {
        Some(header_value) if header_value.starts_with("Bearer ") => {
            let provided = &header_value[7..];
            match parse_bearer_token(provided, expected.as_deref()) {
                Ok(identity) => {
                    request.extensions_mut().insert(identity);
                    next.run(request).await
                }
                Err(msg) => {
                    tracing::warn!(reason = %msg, "authentication failed: invalid bearer token");
                    unauthorized_response(&msg)
                }
            }
        }
        Some(_) => {
            tracing::warn!("authentication failed: non-Bearer authorization scheme");
            unauthorized_response("authorization header must use Bearer scheme")
        }
        None => {
            tracing::warn!("authentication failed: missing authorization header");
            unauthorized_response("missing authorization header")
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    let body = ErrorBody {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
            details: None,
        },
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
