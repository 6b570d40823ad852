//! # Upload API
//!
//! `POST /v1/upload/certificate` accepts a multipart form with a `file`
//! part and a `title` part, stores the file and returns its public path
//! for use in a certificate's `file_path`.
//!
//! Stored files are served back under the public prefix, each one only to
//! the student who uploaded it or to an admin.

use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, Request, State};
use axum::http::StatusCode;
use axum::middleware::{from_fn_with_state, Next};
use axum::response::Response;
use axum::routing::post;
use axum::{Json, Router};
use folio_core::RequiredFields;
use tower::Layer;
use tower_http::services::ServeDir;

use crate::auth::{CallerIdentity, Role};
use crate::error::AppError;
use crate::extractors::CurrentStudent;
use crate::state::AppState;
use crate::uploads::{FileStorage, IncomingFile, StoredFile};

/// Headroom over the file ceiling for multipart framing and the title part.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the uploads router. Requests larger than `max_file_bytes` plus
/// form overhead are cut off before they reach the handler.
pub fn router(max_file_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/v1/upload/certificate", post(upload_certificate))
        .layer(DefaultBodyLimit::max(max_file_bytes + FORM_OVERHEAD_BYTES))
}

/// Mount the upload directory under `prefix`, guarded by [`owner_only`].
///
/// A prefix that is empty or `/` mounts nothing.
pub fn mount_stored_files(api: Router<AppState>, state: &AppState) -> Router<AppState> {
    let prefix = state.config.upload_public_prefix.trim_end_matches('/');
    if !prefix.starts_with('/') || prefix.len() < 2 {
        return api;
    }
    let files = from_fn_with_state(state.clone(), owner_only)
        .layer(ServeDir::new(&state.config.upload_dir));
    api.nest_service(prefix, files)
}

/// Let a request through to the file only when the `{student_id}` segment of
/// `/certificates/{student_id}/{name}` is the caller's own profile. Admins
/// read every file. Anything else is not-found, which also hides whether
/// the file exists.
async fn owner_only(
    State(state): State<AppState>,
    caller: CallerIdentity,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if caller.has_role(Role::Admin) {
        return Ok(next.run(request).await);
    }
    let mut segments = request.uri().path().trim_start_matches('/').split('/');
    let owner = match (segments.next(), segments.next()) {
        (Some("certificates"), Some(owner)) => owner,
        _ => return Err(AppError::NotFound("file not found".into())),
    };
    let owns = state
        .student_by_user(&caller.user_id)
        .is_some_and(|s| s.id.to_string() == owner);
    if !owns {
        tracing::debug!(user_id = %caller.user_id, "stored file requested by non-owner");
        return Err(AppError::NotFound("file not found".into()));
    }
    Ok(next.run(request).await)
}

struct FilePart {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// A body cut off by the size limit is reported like an oversized file;
/// any other multipart failure is a malformed request.
fn multipart_error(files: &FileStorage) -> impl Fn(MultipartError) -> AppError + '_ {
    move |e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::from(files.too_large())
        } else {
            AppError::BadRequest(e.body_text())
        }
    }
}

/// POST /v1/upload/certificate
#[utoipa::path(
    post,
    path = "/v1/upload/certificate",
    request_body(content_type = "multipart/form-data", description = "`file` and `title` parts"),
    responses(
        (status = 200, description = "File stored", body = StoredFile),
        (status = 400, description = "Missing part, oversized or rejected file", body = crate::error::ErrorBody),
        (status = 502, description = "Storage failure", body = crate::error::ErrorBody),
    ),
    tag = "uploads"
)]
pub async fn upload_certificate(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    mut multipart: Multipart,
) -> Result<Json<StoredFile>, AppError> {
    let mut file = None;
    let mut title = None;
    let multipart_error = multipart_error(&state.files);

    while let Some(field) = multipart.next_field().await.map_err(&multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(&multipart_error)?;
                file = Some(FilePart {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            Some("title") => {
                title = Some(field.text().await.map_err(&multipart_error)?);
            }
            _ => {}
        }
    }

    let mut required = RequiredFields::new();
    let file = required.value("file", file);
    let title = required.text("title", title);
    let (Some(file), Some(title)) = (file, title) else {
        return Err(required.into_error().into());
    };

    let stored = state
        .files
        .store_certificate(
            student.id,
            &title,
            IncomingFile {
                file_name: &file.file_name,
                content_type: &file.content_type,
                bytes: &file.bytes,
            },
        )
        .await?;
    Ok(Json(stored))
}
