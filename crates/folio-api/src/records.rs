//! # Record Service
//!
//! Owner-scoped CRUD over submissions. Every operation takes the owner's
//! [`StudentId`] explicitly; a record id alone never authorizes access.
//!
//! - A record owned by someone else is reported exactly like a missing one.
//! - New records always start PENDING, whatever the caller sent.
//! - VERIFIED records cannot be changed or deleted by their owner.
//! - An owner edit reopens the record for review (back to PENDING).
//!
//! Notifications and activity entries are best-effort side effects.

use chrono::Utc;
use folio_core::{FolioError, NotificationSeverity, StudentId};
use folio_state::{Verification, VerificationStatus};
use uuid::Uuid;

use crate::db;
use crate::sinks::{self, NotificationDraft};
use crate::state::AppState;
use crate::submission::{Submission, SubmissionDetails};

/// Filters accepted by [`list`]. The first one set wins: search, then
/// category, then status.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub status: Option<VerificationStatus>,
}

/// Create a submission for `owner`. The record starts PENDING.
pub async fn create<R: Submission>(
    state: &AppState,
    owner: StudentId,
    draft: <R::Details as SubmissionDetails>::Draft,
) -> Result<R, FolioError> {
    let details = R::Details::from_draft(draft)?;
    let now = Utc::now();
    let record = R::assemble(
        Uuid::new_v4(),
        owner,
        details,
        Verification::pending(),
        now,
        now,
    );

    if let Some(pool) = &state.db_pool {
        db::submissions::insert(pool, &record)
            .await
            .map_err(db::persistence_error(R::KIND.as_str()))?;
    }
    R::store(state).insert(record.id(), record.clone());

    tracing::info!(
        student_id = %owner,
        kind = %R::KIND,
        record_id = %record.id(),
        "submission created"
    );

    let kind = R::KIND;
    let title = record.details().title();
    sinks::emit_best_effort(
        "notification",
        sinks::notify(
            state,
            owner,
            NotificationDraft {
                title: format!("{} Uploaded Successfully", kind.label()),
                message: format!(
                    "Your {kind} \"{title}\" has been uploaded and is pending verification."
                ),
                severity: NotificationSeverity::Info,
                category: Some(kind.as_str().to_string()),
                related_id: Some(record.id()),
            },
        ),
    )
    .await;
    record_activity(state, &record, "upload").await;

    Ok(record)
}

/// Fetch one of the owner's records.
pub fn get<R: Submission>(state: &AppState, owner: StudentId, id: Uuid) -> Result<R, FolioError> {
    R::store(state)
        .get(&id)
        .filter(|r| r.student_id() == owner)
        .ok_or_else(|| FolioError::not_found(R::KIND.as_str()))
}

/// Replace the details of one of the owner's records and reopen it for review.
pub async fn update<R: Submission>(
    state: &AppState,
    owner: StudentId,
    id: Uuid,
    draft: <R::Details as SubmissionDetails>::Draft,
) -> Result<R, FolioError> {
    let details = R::Details::from_draft(draft)?;

    let (previous, record) = R::store(state)
        .try_update(&id, |r| {
            if r.student_id() != owner {
                return Err(FolioError::not_found(R::KIND.as_str()));
            }
            r.verification()
                .ensure_owner_mutable("update", R::KIND.as_str())?;
            let previous = r.clone();
            *r.details_mut() = details;
            r.verification_mut().reopen();
            r.set_updated_at(Utc::now());
            Ok((previous, r.clone()))
        })
        .ok_or_else(|| FolioError::not_found(R::KIND.as_str()))??;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = db::submissions::update(pool, &record).await {
            R::store(state).restore(id, Some(previous));
            return Err(db::persistence_error(R::KIND.as_str())(e));
        }
    }

    record_activity(state, &record, "update").await;
    Ok(record)
}

/// Delete one of the owner's records. Uploaded files are left in place.
pub async fn delete<R: Submission>(
    state: &AppState,
    owner: StudentId,
    id: Uuid,
) -> Result<R, FolioError> {
    let removed = R::store(state)
        .try_remove(&id, |r| {
            if r.student_id() != owner {
                return Err(FolioError::not_found(R::KIND.as_str()));
            }
            r.verification()
                .ensure_owner_mutable("delete", R::KIND.as_str())
                .map_err(FolioError::from)
        })
        .ok_or_else(|| FolioError::not_found(R::KIND.as_str()))??;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = db::submissions::delete(pool, R::KIND, removed.id()).await {
            R::store(state).restore(id, Some(removed));
            return Err(db::persistence_error(R::KIND.as_str())(e));
        }
    }

    record_activity(state, &removed, "delete").await;
    Ok(removed)
}

/// All of the owner's records matching `query`, newest first.
pub fn list<R: Submission>(state: &AppState, owner: StudentId, query: &ListQuery) -> Vec<R> {
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    match (search, category, query.status) {
        (Some(needle), _, _) => self::search(state, owner, needle),
        (None, Some(category), _) => filter_by_category(state, owner, category),
        (None, None, Some(status)) => filter_by_status(state, owner, status),
        (None, None, None) => scoped(state, owner, |_| true),
    }
}

/// Case-insensitive search over the record's text fields and tags.
pub fn search<R: Submission>(state: &AppState, owner: StudentId, needle: &str) -> Vec<R> {
    let needle = needle.to_lowercase();
    scoped(state, owner, |r: &R| r.details().matches(&needle))
}

/// Records in one category (compared case-insensitively).
pub fn filter_by_category<R: Submission>(
    state: &AppState,
    owner: StudentId,
    category: &str,
) -> Vec<R> {
    scoped(state, owner, |r: &R| {
        r.details().category().eq_ignore_ascii_case(category)
    })
}

/// Records at one verification stage.
pub fn filter_by_status<R: Submission>(
    state: &AppState,
    owner: StudentId,
    status: VerificationStatus,
) -> Vec<R> {
    scoped(state, owner, |r: &R| r.verification().status == status)
}

fn scoped<R: Submission>(state: &AppState, owner: StudentId, pred: impl Fn(&R) -> bool) -> Vec<R> {
    let mut items = R::store(state).filter(|r| r.student_id() == owner && pred(r));
    items.sort_by_key(|r| std::cmp::Reverse(r.created_at()));
    items
}

async fn record_activity<R: Submission>(state: &AppState, record: &R, verb: &str) {
    let kind = R::KIND;
    sinks::emit_best_effort(
        "activity",
        sinks::log_activity(
            state,
            record.student_id(),
            &format!("{verb}_{kind}"),
            Some(kind.as_str()),
            serde_json::json!({
                "record_id": record.id(),
                "title": record.details().title(),
            }),
        ),
    )
    .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submission::{CertificateDraft, CertificateRecord, ExperienceDraft, ExperienceRecord};
    use chrono::NaiveDate;
    use folio_core::ExperienceKind;
    use folio_state::VerificationDecision;

    fn certificate_draft(title: &str) -> CertificateDraft {
        CertificateDraft {
            title: Some(title.into()),
            issuer: Some("Coursera".into()),
            issue_date: NaiveDate::from_ymd_opt(2024, 1, 15),
            category: Some("TECHNICAL".into()),
            file_path: Some("/uploads/certificates/a/b.pdf".into()),
            file_type: Some("application/pdf".into()),
            file_size: Some(1024),
            ..CertificateDraft::default()
        }
    }

    fn force_status(state: &AppState, id: Uuid, decision: VerificationDecision) {
        state.certificates.update(&id, |r| {
            r.verification
                .decide(decision, "admin-1", Some("blurry scan"), Utc::now())
                .unwrap();
        });
    }

    #[tokio::test]
    async fn create_forces_pending_and_emits_side_effects() {
        let state = AppState::new();
        let owner = StudentId::new();
        let record: CertificateRecord = create(&state, owner, certificate_draft("Rust Basics"))
            .await
            .unwrap();

        assert_eq!(record.verification.status, VerificationStatus::Pending);
        assert_eq!(state.notifications.len(), 1);
        assert_eq!(state.activity.len(), 1);
        let activity = &state.activity.list()[0];
        assert_eq!(activity.action, "upload_certificate");
        assert_eq!(activity.metadata["title"], "Rust Basics");
        let note = &state.notifications.list()[0];
        assert_eq!(note.title, "Certificate Uploaded Successfully");
        assert_eq!(note.related_id, Some(record.id));
    }

    #[tokio::test]
    async fn create_missing_issuer_is_validation_error() {
        let state = AppState::new();
        let draft = CertificateDraft {
            issuer: None,
            ..certificate_draft("Rust Basics")
        };
        let err = create::<CertificateRecord>(&state, StudentId::new(), draft)
            .await
            .unwrap_err();
        match err {
            FolioError::Validation(v) => assert_eq!(v.fields(), vec!["issuer".to_string()]),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(state.certificates.is_empty());
        assert!(state.notifications.is_empty());
    }

    #[tokio::test]
    async fn other_owner_sees_not_found_everywhere() {
        let state = AppState::new();
        let owner = StudentId::new();
        let stranger = StudentId::new();
        let record: CertificateRecord = create(&state, owner, certificate_draft("Rust"))
            .await
            .unwrap();

        assert!(matches!(
            get::<CertificateRecord>(&state, stranger, record.id),
            Err(FolioError::NotFound(_))
        ));
        assert!(matches!(
            update::<CertificateRecord>(&state, stranger, record.id, certificate_draft("x")).await,
            Err(FolioError::NotFound(_))
        ));
        assert!(matches!(
            delete::<CertificateRecord>(&state, stranger, record.id).await,
            Err(FolioError::NotFound(_))
        ));
        assert!(state.certificates.contains(&record.id));
    }

    #[tokio::test]
    async fn verified_record_is_locked_for_owner() {
        let state = AppState::new();
        let owner = StudentId::new();
        let record: CertificateRecord = create(&state, owner, certificate_draft("Rust"))
            .await
            .unwrap();
        force_status(&state, record.id, VerificationDecision::Verified);

        let err = update::<CertificateRecord>(&state, owner, record.id, certificate_draft("y"))
            .await
            .unwrap_err();
        assert!(matches!(err, FolioError::Conflict(ref m) if m == "cannot update a verified certificate"));
        let err = delete::<CertificateRecord>(&state, owner, record.id)
            .await
            .unwrap_err();
        assert!(matches!(err, FolioError::Conflict(_)));
        assert!(state.certificates.contains(&record.id));
    }

    #[tokio::test]
    async fn editing_rejected_record_resets_to_pending() {
        let state = AppState::new();
        let owner = StudentId::new();
        let record: CertificateRecord = create(&state, owner, certificate_draft("Rust"))
            .await
            .unwrap();
        force_status(&state, record.id, VerificationDecision::Rejected);

        let updated: CertificateRecord =
            update(&state, owner, record.id, certificate_draft("Rust (rescanned)"))
                .await
                .unwrap();
        assert_eq!(updated.verification.status, VerificationStatus::Pending);
        assert!(updated.verification.rejection_reason.is_none());
        assert!(updated.verification.verified_by.is_none());
        assert_eq!(updated.details.title, "Rust (rescanned)");
    }

    #[tokio::test]
    async fn editing_under_review_record_returns_it_to_pending() {
        let state = AppState::new();
        let owner = StudentId::new();
        let record: CertificateRecord = create(&state, owner, certificate_draft("Rust"))
            .await
            .unwrap();
        crate::verification::mark_under_review::<CertificateRecord>(&state, record.id, "admin-1")
            .await
            .unwrap();

        let updated: CertificateRecord =
            update(&state, owner, record.id, certificate_draft("Rust, second edition"))
                .await
                .unwrap();
        assert_eq!(updated.verification.status, VerificationStatus::Pending);
        assert!(updated.verification.verified_by.is_none());
        assert!(updated.verification.verified_at.is_none());
        assert_eq!(
            state.certificates.get(&record.id).unwrap().verification.status,
            VerificationStatus::Pending
        );
    }

    #[tokio::test]
    async fn failed_create_leaves_store_empty() {
        let state = crate::db::offline_state();
        let err = create::<CertificateRecord>(&state, StudentId::new(), certificate_draft("Rust"))
            .await
            .unwrap_err();
        assert!(matches!(err, FolioError::Persistence(_)));
        assert!(state.certificates.is_empty());
        assert!(state.notifications.is_empty());
        assert!(state.activity.is_empty());
    }

    #[tokio::test]
    async fn failed_update_and_delete_keep_the_stored_record() {
        let owner = StudentId::new();
        let record: CertificateRecord = create(&AppState::new(), owner, certificate_draft("Rust"))
            .await
            .unwrap();
        let state = crate::db::offline_state();
        state.certificates.insert(record.id, record.clone());
        force_status(&state, record.id, VerificationDecision::Rejected);

        let err = update::<CertificateRecord>(&state, owner, record.id, certificate_draft("Go"))
            .await
            .unwrap_err();
        assert!(matches!(err, FolioError::Persistence(_)));
        let stored = state.certificates.get(&record.id).unwrap();
        assert_eq!(stored.details.title, "Rust");
        assert_eq!(stored.verification.status, VerificationStatus::Rejected);
        assert_eq!(stored.verification.rejection_reason.as_deref(), Some("blurry scan"));

        let err = delete::<CertificateRecord>(&state, owner, record.id)
            .await
            .unwrap_err();
        assert!(matches!(err, FolioError::Persistence(_)));
        assert!(state.certificates.contains(&record.id));
    }

    #[tokio::test]
    async fn delete_removes_record_and_logs() {
        let state = AppState::new();
        let owner = StudentId::new();
        let record: CertificateRecord = create(&state, owner, certificate_draft("Rust"))
            .await
            .unwrap();
        delete::<CertificateRecord>(&state, owner, record.id)
            .await
            .unwrap();
        assert!(state.certificates.is_empty());
        assert!(state
            .activity
            .list()
            .iter()
            .any(|a| a.action == "delete_certificate"));
    }

    #[tokio::test]
    async fn list_applies_search_then_category_then_status() {
        let state = AppState::new();
        let owner = StudentId::new();
        let rust: CertificateRecord = create(&state, owner, certificate_draft("Rust Basics"))
            .await
            .unwrap();
        let mut language = certificate_draft("Spanish B1");
        language.category = Some("LANGUAGE".into());
        create::<CertificateRecord>(&state, owner, language)
            .await
            .unwrap();

        let by_search: Vec<CertificateRecord> = list(
            &state,
            owner,
            &ListQuery {
                search: Some("rust".into()),
                category: Some("LANGUAGE".into()),
                ..ListQuery::default()
            },
        );
        assert_eq!(by_search.len(), 1);
        assert_eq!(by_search[0].id, rust.id);

        let by_category: Vec<CertificateRecord> = list(
            &state,
            owner,
            &ListQuery {
                category: Some("language".into()),
                ..ListQuery::default()
            },
        );
        assert_eq!(by_category.len(), 1);
        assert_eq!(by_category[0].details.title, "Spanish B1");

        force_status(&state, rust.id, VerificationDecision::Verified);
        let verified: Vec<CertificateRecord> = list(
            &state,
            owner,
            &ListQuery {
                status: Some(VerificationStatus::Verified),
                ..ListQuery::default()
            },
        );
        assert_eq!(verified.len(), 1);

        let all: Vec<CertificateRecord> = list(&state, owner, &ListQuery::default());
        assert_eq!(all.len(), 2);
        assert!(all[0].created_at >= all[1].created_at);
    }

    #[tokio::test]
    async fn experiences_share_the_contract() {
        let state = AppState::new();
        let owner = StudentId::new();
        let draft = ExperienceDraft {
            kind: Some("INTERNSHIP".into()),
            company: Some("Acme".into()),
            position: Some("Backend Intern".into()),
            start_date: NaiveDate::from_ymd_opt(2024, 5, 1),
            ..ExperienceDraft::default()
        };
        let record: ExperienceRecord = create(&state, owner, draft).await.unwrap();
        assert_eq!(record.details.kind, ExperienceKind::Internship);
        assert_eq!(record.verification.status, VerificationStatus::Pending);
        assert!(state
            .activity
            .list()
            .iter()
            .any(|a| a.action == "upload_experience"));
    }
}
