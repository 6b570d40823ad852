//! # File Storage
//!
//! Writes uploaded certificate files under the configured upload directory
//! and returns the public reference stored on the record. Records never
//! hold raw bytes.
//!
//! Layout: `{root}/certificates/{student_id}/{student_id}_{title}_{millis}{ext}`.

use std::path::PathBuf;

use chrono::Utc;
use folio_core::{FolioError, StudentId, ValidationError};
use serde::Serialize;
use utoipa::ToSchema;

/// Largest accepted upload (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Accepted content types.
pub const ALLOWED_TYPES: &[&str] = &[
    "application/pdf",
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
];

const TITLE_SLUG_MAX: usize = 50;

/// Reference to a stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StoredFile {
    /// Public path, e.g. `/uploads/certificates/{id}/{name}`.
    pub file_path: String,
    pub file_size: u64,
    pub file_type: String,
    /// Name the client uploaded the file under.
    pub file_name: String,
}

/// An upload as received from the client.
#[derive(Debug, Clone, Copy)]
pub struct IncomingFile<'a> {
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub bytes: &'a [u8],
}

/// Disk-backed store for uploaded files.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
    public_prefix: String,
    max_bytes: usize,
}

impl FileStorage {
    pub fn new(root: PathBuf, public_prefix: String, max_bytes: usize) -> Self {
        Self {
            root,
            public_prefix: public_prefix.trim_end_matches('/').to_string(),
            max_bytes,
        }
    }

    /// Largest payload this store accepts.
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// The error for a payload over [`Self::max_bytes`].
    pub fn too_large(&self) -> ValidationError {
        ValidationError::invalid(
            "file",
            format!("file size exceeds {}MB limit", self.max_bytes / (1024 * 1024)),
        )
    }

    /// Reject empty, oversized or disallowed payloads.
    pub fn check(&self, content_type: &str, len: usize) -> Result<(), ValidationError> {
        if len > self.max_bytes {
            return Err(self.too_large());
        }
        if !ALLOWED_TYPES.contains(&content_type) {
            return Err(ValidationError::invalid(
                "file",
                format!(
                    "file type {content_type} is not allowed. Allowed types: {}",
                    ALLOWED_TYPES.join(", ")
                ),
            ));
        }
        if len == 0 {
            return Err(ValidationError::invalid("file", "file cannot be empty"));
        }
        Ok(())
    }

    /// Validate and write a certificate file for `owner`.
    pub async fn store_certificate(
        &self,
        owner: StudentId,
        title: &str,
        file: IncomingFile<'_>,
    ) -> Result<StoredFile, FolioError> {
        self.check(file.content_type, file.bytes.len())?;

        let name = format!(
            "{owner}_{}_{}{}",
            title_slug(title),
            Utc::now().timestamp_millis(),
            extension(file.file_name, file.content_type)
        );
        let dir = self.root.join("certificates").join(owner.to_string());
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            FolioError::Dependency(format!("create upload dir {}: {e}", dir.display()))
        })?;
        let path = dir.join(&name);
        tokio::fs::write(&path, file.bytes)
            .await
            .map_err(|e| FolioError::Dependency(format!("write upload {}: {e}", path.display())))?;

        tracing::info!(student_id = %owner, bytes = file.bytes.len(), path = %path.display(), "certificate file stored");
        metrics::counter!("folio_uploaded_bytes_total").increment(file.bytes.len() as u64);

        Ok(StoredFile {
            file_path: format!("{}/certificates/{owner}/{name}", self.public_prefix),
            file_size: file.bytes.len() as u64,
            file_type: file.content_type.to_string(),
            file_name: file.file_name.to_string(),
        })
    }
}

/// Replace anything outside `[A-Za-z0-9]` with `_` and keep the first 50 chars.
fn title_slug(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .take(TITLE_SLUG_MAX)
        .collect()
}

/// Extension of the uploaded name, or one implied by the content type.
fn extension(file_name: &str, content_type: &str) -> String {
    let from_name = std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()));
    from_name.unwrap_or_else(|| {
        match content_type {
            "application/pdf" => ".pdf",
            "image/png" => ".png",
            "image/webp" => ".webp",
            "image/jpeg" | "image/jpg" => ".jpg",
            _ => "",
        }
        .to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(dir: &tempfile::TempDir) -> FileStorage {
        FileStorage::new(dir.path().to_path_buf(), "/uploads/".into(), MAX_UPLOAD_BYTES)
    }

    #[test]
    fn slug_replaces_symbols_and_truncates() {
        assert_eq!(title_slug("AWS: Cloud/Practitioner"), "AWS__Cloud_Practitioner");
        assert_eq!(title_slug(&"x".repeat(80)).len(), TITLE_SLUG_MAX);
    }

    #[test]
    fn extension_prefers_file_name() {
        assert_eq!(extension("scan.PDF", "application/pdf"), ".pdf");
        assert_eq!(extension("photo", "image/png"), ".png");
        assert_eq!(extension("../../etc/pa$$.w d", "image/jpeg"), ".jpg");
    }

    #[test]
    fn check_rejects_type_size_and_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = storage(&dir);
        assert!(store.check("application/pdf", 10).is_ok());
        assert_eq!(
            store.check("text/plain", 10).unwrap_err().fields(),
            vec!["file".to_string()]
        );
        assert!(store.check("application/pdf", MAX_UPLOAD_BYTES + 1).is_err());
        assert!(store.check("image/png", 0).is_err());
    }

    #[tokio::test]
    async fn stores_file_under_student_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = storage(&dir);
        let owner = StudentId::new();

        let stored = store
            .store_certificate(
                owner,
                "Data Structures",
                IncomingFile {
                    file_name: "ds.pdf",
                    content_type: "application/pdf",
                    bytes: b"%PDF-1.4 test",
                },
            )
            .await
            .unwrap();

        let prefix = format!("/uploads/certificates/{owner}/{owner}_Data_Structures_");
        assert!(stored.file_path.starts_with(&prefix), "{}", stored.file_path);
        assert!(stored.file_path.ends_with(".pdf"));
        assert_eq!(stored.file_size, 13);
        assert_eq!(stored.file_name, "ds.pdf");

        let on_disk = dir
            .path()
            .join(stored.file_path.trim_start_matches("/uploads/"));
        assert_eq!(std::fs::read(on_disk).unwrap(), b"%PDF-1.4 test");
    }

    #[tokio::test]
    async fn rejected_upload_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = storage(&dir);
        let err = store
            .store_certificate(
                StudentId::new(),
                "Bad",
                IncomingFile {
                    file_name: "x.exe",
                    content_type: "application/octet-stream",
                    bytes: b"MZ",
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, FolioError::Validation(_)));
        assert!(!dir.path().join("certificates").exists());
    }
}
