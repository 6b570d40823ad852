//! # Notification & Activity Sinks
//!
//! Append-only side-effect sinks written by the record service and the
//! verification workflow. The sinks never originate business rules.
//!
//! Calls made as a side effect of another operation go through
//! [`emit_best_effort`]: a failure is logged and counted, and the triggering
//! operation carries on.

use std::future::Future;

use chrono::Utc;
use folio_core::{FolioError, NotificationSeverity, StudentId};
use uuid::Uuid;

use crate::db;
use crate::state::{ActivityRecord, AppState, NotificationRecord};

/// Most notifications returned by a single listing.
pub const NOTIFICATION_LIST_LIMIT: usize = 50;

/// A notification before it is stored.
#[derive(Debug, Clone)]
pub struct NotificationDraft {
    pub title: String,
    pub message: String,
    pub severity: NotificationSeverity,
    pub category: Option<String>,
    pub related_id: Option<Uuid>,
}

/// Await a side-effect write, logging and discarding its failure.
///
/// Returns the written value when the sink succeeded.
pub async fn emit_best_effort<T, F>(sink: &'static str, write: F) -> Option<T>
where
    F: Future<Output = Result<T, FolioError>>,
{
    match write.await {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(sink, error = %e, "best-effort side effect failed");
            metrics::counter!("folio_side_effect_failures_total", "sink" => sink).increment(1);
            None
        }
    }
}

/// Store a notification for `owner`.
pub async fn notify(
    state: &AppState,
    owner: StudentId,
    draft: NotificationDraft,
) -> Result<NotificationRecord, FolioError> {
    let record = NotificationRecord {
        id: Uuid::new_v4(),
        student_id: owner,
        title: draft.title,
        message: draft.message,
        severity: draft.severity,
        category: draft.category,
        related_id: draft.related_id,
        read: false,
        read_at: None,
        created_at: Utc::now(),
    };
    if let Some(pool) = &state.db_pool {
        db::notifications::insert(pool, &record)
            .await
            .map_err(db::persistence_error("notification"))?;
    }
    state.notifications.insert(record.id, record.clone());
    Ok(record)
}

/// Append an activity entry for `owner`.
pub async fn log_activity(
    state: &AppState,
    owner: StudentId,
    action: &str,
    category: Option<&str>,
    metadata: serde_json::Value,
) -> Result<ActivityRecord, FolioError> {
    let record = ActivityRecord {
        id: Uuid::new_v4(),
        student_id: owner,
        action: action.to_string(),
        category: category.map(str::to_string),
        metadata,
        created_at: Utc::now(),
    };
    if let Some(pool) = &state.db_pool {
        db::activity::insert(pool, &record)
            .await
            .map_err(db::persistence_error("activity"))?;
    }
    state.activity.insert(record.id, record.clone());
    Ok(record)
}

/// Mark a notification read.
///
/// Only the owner may mark it; anyone else gets not-found. Marking an
/// already-read notification succeeds and keeps the original `read_at`.
pub async fn mark_read(
    state: &AppState,
    owner: StudentId,
    id: Uuid,
) -> Result<NotificationRecord, FolioError> {
    let (record, previous) = state
        .notifications
        .try_update(&id, |n| {
            if n.student_id != owner {
                return Err(FolioError::not_found("notification"));
            }
            if n.read {
                return Ok((n.clone(), None));
            }
            let previous = n.clone();
            n.read = true;
            n.read_at = Some(Utc::now());
            Ok((n.clone(), Some(previous)))
        })
        .ok_or_else(|| FolioError::not_found("notification"))??;

    // `previous` is set only when this call flipped the flag.
    if let (Some(previous), Some(pool)) = (previous, &state.db_pool) {
        if let Err(e) = db::notifications::mark_read(pool, record.id, record.read_at).await {
            state.notifications.restore(id, Some(previous));
            return Err(db::persistence_error("notification")(e));
        }
    }
    Ok(record)
}

/// The owner's notifications, newest first, at most [`NOTIFICATION_LIST_LIMIT`].
pub fn list_notifications(
    state: &AppState,
    owner: StudentId,
    unread_only: bool,
) -> Vec<NotificationRecord> {
    let mut items = state
        .notifications
        .filter(|n| n.student_id == owner && (!unread_only || !n.read));
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    items.truncate(NOTIFICATION_LIST_LIMIT);
    items
}

/// The owner's activity, newest first.
pub fn list_activity(state: &AppState, owner: StudentId, limit: usize) -> Vec<ActivityRecord> {
    let mut items = state.activity.filter(|a| a.student_id == owner);
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    items.truncate(limit);
    items
}
