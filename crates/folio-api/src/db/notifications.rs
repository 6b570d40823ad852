//! Notification persistence.
//!
//! All functions take a `&PgPool` and operate on the `notifications` table.

use chrono::{DateTime, Utc};
use folio_core::NotificationSeverity;
use sqlx::PgPool;
use uuid::Uuid;

use crate::state::NotificationRecord;

/// Insert a notification.
pub async fn insert(pool: &PgPool, record: &NotificationRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO notifications (id, student_id, title, message, severity, category,
         related_id, read, read_at, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(record.id)
    .bind(*record.student_id.as_uuid())
    .bind(&record.title)
    .bind(&record.message)
    .bind(record.severity.as_str())
    .bind(&record.category)
    .bind(record.related_id)
    .bind(record.read)
    .bind(record.read_at)
    .bind(record.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Mark a notification read. An earlier `read_at` is never overwritten.
pub async fn mark_read(
    pool: &PgPool,
    id: Uuid,
    read_at: Option<DateTime<Utc>>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE notifications SET read = TRUE, read_at = COALESCE(read_at, $2) WHERE id = $1",
    )
    .bind(id)
    .bind(read_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Load all notifications on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<NotificationRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, NotificationRow>(
        "SELECT id, student_id, title, message, severity, category, related_id, read,
         read_at, created_at
         FROM notifications ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(NotificationRow::into_record).collect())
}

#[derive(sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    student_id: Uuid,
    title: String,
    message: String,
    severity: String,
    category: Option<String>,
    related_id: Option<Uuid>,
    read: bool,
    read_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl NotificationRow {
    fn into_record(self) -> NotificationRecord {
        NotificationRecord {
            id: self.id,
            student_id: self.student_id.into(),
            title: self.title,
            message: self.message,
            severity: parse_severity(&self.severity),
            category: self.category,
            related_id: self.related_id,
            read: self.read,
            read_at: self.read_at,
            created_at: self.created_at,
        }
    }
}

fn parse_severity(s: &str) -> NotificationSeverity {
    s.parse().unwrap_or_else(|_| {
        tracing::warn!(
            severity = s,
            "unknown notification severity in database, defaulting to INFO"
        );
        NotificationSeverity::Info
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_severity_defaults_to_info() {
        assert_eq!(parse_severity("SUCCESS"), NotificationSeverity::Success);
        assert_eq!(parse_severity("LOUD"), NotificationSeverity::Info);
    }
}
