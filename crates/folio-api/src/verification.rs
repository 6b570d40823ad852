//! # Verification Workflow
//!
//! The only code path that moves a submission out of PENDING. Status,
//! verifier, timestamp and reason change together inside one store update.
//! A decision produces exactly one notification for the owner and, on a
//! best-effort basis, an activity entry naming the verifier.

use chrono::Utc;
use folio_core::{FolioError, NotificationSeverity, RecordKind, StudentId};
use folio_state::{VerificationDecision, VerificationStatus};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db;
use crate::sinks::{self, NotificationDraft};
use crate::state::AppState;
use crate::submission::{
    AchievementRecord, CertificateRecord, ExperienceRecord, Submission, SubmissionDetails,
};

/// Record a verifier decision on a submission.
pub async fn verify<R: Submission>(
    state: &AppState,
    id: Uuid,
    verifier: &str,
    decision: VerificationDecision,
    rejection_reason: Option<&str>,
) -> Result<R, FolioError> {
    let (previous, record) = R::store(state)
        .try_update(&id, |r| {
            let previous = r.clone();
            let now = Utc::now();
            r.verification_mut()
                .decide(decision, verifier, rejection_reason, now)?;
            r.set_updated_at(now);
            Ok::<_, FolioError>((previous, r.clone()))
        })
        .ok_or_else(|| FolioError::not_found(R::KIND.as_str()))??;

    persist(state, &record, previous).await?;

    tracing::info!(
        kind = %R::KIND,
        record_id = %id,
        verifier,
        status = %record.verification().status,
        "verification decision recorded"
    );

    let owner = record.student_id();
    let title = record.details().title();
    let (notification, verb) = decision_notice(R::KIND, &title, decision, &record);
    sinks::emit_best_effort(
        "notification",
        sinks::notify(state, owner, notification),
    )
    .await;
    sinks::emit_best_effort(
        "activity",
        sinks::log_activity(
            state,
            owner,
            &format!("{verb}_{}", R::KIND),
            Some(R::KIND.as_str()),
            serde_json::json!({
                "record_id": id,
                "title": title,
                "verifier": verifier,
            }),
        ),
    )
    .await;

    Ok(record)
}

/// Pick a PENDING submission up for review. No notification is sent.
pub async fn mark_under_review<R: Submission>(
    state: &AppState,
    id: Uuid,
    verifier: &str,
) -> Result<R, FolioError> {
    let (previous, record) = R::store(state)
        .try_update(&id, |r| {
            let previous = r.clone();
            r.verification_mut().begin_review(verifier)?;
            r.set_updated_at(Utc::now());
            Ok::<_, FolioError>((previous, r.clone()))
        })
        .ok_or_else(|| FolioError::not_found(R::KIND.as_str()))??;

    persist(state, &record, previous).await?;
    tracing::info!(kind = %R::KIND, record_id = %id, verifier, "submission under review");
    Ok(record)
}

/// Write the decided record through; on failure the store goes back to
/// `previous` so memory never runs ahead of the database.
async fn persist<R: Submission>(state: &AppState, record: &R, previous: R) -> Result<(), FolioError> {
    if let Some(pool) = &state.db_pool {
        if let Err(e) = db::submissions::update(pool, record).await {
            R::store(state).restore(record.id(), Some(previous));
            return Err(db::persistence_error(R::KIND.as_str())(e));
        }
    }
    Ok(())
}

fn decision_notice<R: Submission>(
    kind: RecordKind,
    title: &str,
    decision: VerificationDecision,
    record: &R,
) -> (NotificationDraft, &'static str) {
    let (heading, message, severity, verb) = match decision {
        VerificationDecision::Verified => (
            format!("{} Verified", kind.label()),
            format!(
                "Your {kind} \"{title}\" has been verified and is now part of your official record."
            ),
            NotificationSeverity::Success,
            "verify",
        ),
        VerificationDecision::Rejected => (
            format!("{} Rejected", kind.label()),
            format!(
                "Your {kind} \"{title}\" was rejected. {}",
                record
                    .verification()
                    .rejection_reason
                    .as_deref()
                    .unwrap_or_default()
            ),
            NotificationSeverity::Error,
            "reject",
        ),
    };
    (
        NotificationDraft {
            title: heading,
            message,
            severity,
            category: Some(kind.as_str().to_string()),
            related_id: Some(record.id()),
        },
        verb,
    )
}

// -- Review Queue -------------------------------------------------------------

/// A submission awaiting a verifier decision.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReviewItem {
    pub kind: RecordKind,
    pub id: Uuid,
    pub student_id: StudentId,
    pub title: String,
    pub category: String,
    pub verification_status: VerificationStatus,
    pub submitted_at: chrono::DateTime<Utc>,
}

/// Every PENDING or UNDER_REVIEW submission across kinds and students,
/// oldest first.
pub fn review_queue(state: &AppState) -> Vec<ReviewItem> {
    let mut items = awaiting::<CertificateRecord>(state);
    items.extend(awaiting::<AchievementRecord>(state));
    items.extend(awaiting::<ExperienceRecord>(state));
    items.sort_by_key(|i| i.submitted_at);
    items
}

fn awaiting<R: Submission>(state: &AppState) -> Vec<ReviewItem> {
    R::store(state)
        .filter(|r| r.verification().status.is_awaiting_decision())
        .into_iter()
        .map(|r| ReviewItem {
            kind: R::KIND,
            id: r.id(),
            student_id: r.student_id(),
            title: r.details().title(),
            category: r.details().category().to_string(),
            verification_status: r.verification().status,
            submitted_at: r.created_at(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records;
    use crate::submission::CertificateDraft;
    use chrono::NaiveDate;

    async fn seeded_certificate(state: &AppState, owner: StudentId) -> CertificateRecord {
        let draft = CertificateDraft {
            title: Some("Data Structures".into()),
            issuer: Some("NPTEL".into()),
            issue_date: NaiveDate::from_ymd_opt(2023, 11, 2),
            category: Some("ACADEMIC".into()),
            file_path: Some("/uploads/certificates/x/ds.pdf".into()),
            file_type: Some("application/pdf".into()),
            file_size: Some(4096),
            ..CertificateDraft::default()
        };
        let record = records::create(state, owner, draft).await.unwrap();
        // Drop the creation side effects so counts below are per decision.
        for n in state.notifications.list() {
            state.notifications.remove(&n.id);
        }
        for a in state.activity.list() {
            state.activity.remove(&a.id);
        }
        record
    }

    #[tokio::test]
    async fn verify_stamps_and_notifies_once() {
        let state = AppState::new();
        let owner = StudentId::new();
        let cert = seeded_certificate(&state, owner).await;

        let verified: CertificateRecord =
            verify(&state, cert.id, "admin-7", VerificationDecision::Verified, None)
                .await
                .unwrap();
        assert_eq!(verified.verification.status, VerificationStatus::Verified);
        assert_eq!(verified.verification.verified_by.as_deref(), Some("admin-7"));
        assert!(verified.verification.verified_at.is_some());

        let notes = state.notifications.list();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "Certificate Verified");
        assert_eq!(notes[0].severity, NotificationSeverity::Success);
        assert_eq!(notes[0].student_id, owner);

        let activity = state.activity.list();
        assert_eq!(activity.len(), 1);
        assert_eq!(activity[0].action, "verify_certificate");
        assert_eq!(activity[0].metadata["verifier"], "admin-7");
    }

    #[tokio::test]
    async fn reject_carries_reason_into_notification() {
        let state = AppState::new();
        let owner = StudentId::new();
        let cert = seeded_certificate(&state, owner).await;

        let rejected: CertificateRecord = verify(
            &state,
            cert.id,
            "admin-7",
            VerificationDecision::Rejected,
            Some("blurry scan"),
        )
        .await
        .unwrap();
        assert_eq!(rejected.verification.status, VerificationStatus::Rejected);
        assert_eq!(
            rejected.verification.rejection_reason.as_deref(),
            Some("blurry scan")
        );

        let notes = state.notifications.list();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "Certificate Rejected");
        assert!(notes[0].message.contains("blurry scan"));
        assert_eq!(notes[0].severity, NotificationSeverity::Error);
    }

    #[tokio::test]
    async fn reject_without_reason_changes_nothing() {
        let state = AppState::new();
        let owner = StudentId::new();
        let cert = seeded_certificate(&state, owner).await;

        let err = verify::<CertificateRecord>(
            &state,
            cert.id,
            "admin-7",
            VerificationDecision::Rejected,
            Some("  "),
        )
        .await
        .unwrap_err();
        match err {
            FolioError::Validation(v) => {
                assert_eq!(v.fields(), vec!["rejection_reason".to_string()])
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        let stored = state.certificates.get(&cert.id).unwrap();
        assert_eq!(stored.verification.status, VerificationStatus::Pending);
        assert!(state.notifications.is_empty());
    }

    #[tokio::test]
    async fn verify_unknown_record_is_not_found() {
        let state = AppState::new();
        let err = verify::<CertificateRecord>(
            &state,
            Uuid::new_v4(),
            "admin-7",
            VerificationDecision::Verified,
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, FolioError::NotFound(_)));
    }

    #[tokio::test]
    async fn verifying_twice_is_conflict() {
        let state = AppState::new();
        let cert = seeded_certificate(&state, StudentId::new()).await;
        verify::<CertificateRecord>(&state, cert.id, "a", VerificationDecision::Verified, None)
            .await
            .unwrap();
        let err =
            verify::<CertificateRecord>(&state, cert.id, "a", VerificationDecision::Verified, None)
                .await
                .unwrap_err();
        assert!(matches!(err, FolioError::Conflict(_)));
        assert_eq!(state.notifications.len(), 1);
    }

    #[tokio::test]
    async fn under_review_then_decide() {
        let state = AppState::new();
        let cert = seeded_certificate(&state, StudentId::new()).await;

        let reviewing: CertificateRecord = mark_under_review(&state, cert.id, "admin-1")
            .await
            .unwrap();
        assert_eq!(reviewing.verification.status, VerificationStatus::UnderReview);
        assert!(state.notifications.is_empty());

        let again = mark_under_review::<CertificateRecord>(&state, cert.id, "admin-1").await;
        assert!(matches!(again, Err(FolioError::Conflict(_))));

        let verified: CertificateRecord =
            verify(&state, cert.id, "admin-1", VerificationDecision::Verified, None)
                .await
                .unwrap();
        assert_eq!(verified.verification.status, VerificationStatus::Verified);
    }

    #[tokio::test]
    async fn review_queue_lists_awaiting_oldest_first() {
        let state = AppState::new();
        let owner = StudentId::new();
        let first = seeded_certificate(&state, owner).await;
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let second = seeded_certificate(&state, owner).await;
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let decided = seeded_certificate(&state, owner).await;
        verify::<CertificateRecord>(&state, decided.id, "a", VerificationDecision::Verified, None)
            .await
            .unwrap();

        let queue = review_queue(&state);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue[0].id, first.id);
        assert_eq!(queue[1].id, second.id);
        assert_eq!(queue[0].kind, RecordKind::Certificate);
    }

    #[tokio::test]
    async fn review_queue_keeps_submission_order_after_pickup() {
        let state = AppState::new();
        let owner = StudentId::new();
        let first = seeded_certificate(&state, owner).await;
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let second = seeded_certificate(&state, owner).await;
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        mark_under_review::<CertificateRecord>(&state, first.id, "admin-1")
            .await
            .unwrap();

        let queue = review_queue(&state);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue[0].id, first.id);
        assert_eq!(queue[0].verification_status, VerificationStatus::UnderReview);
        assert_eq!(queue[0].submitted_at, first.created_at);
        assert_eq!(queue[1].id, second.id);
    }

    #[tokio::test]
    async fn failed_write_through_leaves_record_undecided() {
        let state = crate::db::offline_state();
        let cert = seeded_certificate(&AppState::new(), StudentId::new()).await;
        state.certificates.insert(cert.id, cert.clone());

        let err =
            verify::<CertificateRecord>(&state, cert.id, "admin-7", VerificationDecision::Verified, None)
                .await
                .unwrap_err();
        assert!(matches!(err, FolioError::Persistence(_)));
        let err = mark_under_review::<CertificateRecord>(&state, cert.id, "admin-7")
            .await
            .unwrap_err();
        assert!(matches!(err, FolioError::Persistence(_)));

        let stored = state.certificates.get(&cert.id).unwrap();
        assert_eq!(stored.verification.status, VerificationStatus::Pending);
        assert!(stored.verification.verified_by.is_none());
        assert_eq!(stored.updated_at, cert.updated_at);
        assert!(state.notifications.is_empty());
    }
}
