//! Activity log persistence.
//!
//! Append-only: rows in `activity_log` are inserted and never updated.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::state::ActivityRecord;

/// Append an activity entry.
pub async fn insert(pool: &PgPool, record: &ActivityRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO activity_log (id, student_id, action, category, metadata, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(record.id)
    .bind(*record.student_id.as_uuid())
    .bind(&record.action)
    .bind(&record.category)
    .bind(&record.metadata)
    .bind(record.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load the activity log on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<ActivityRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ActivityRow>(
        "SELECT id, student_id, action, category, metadata, created_at
         FROM activity_log ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| ActivityRecord {
            id: r.id,
            student_id: r.student_id.into(),
            action: r.action,
            category: r.category,
            metadata: r.metadata,
            created_at: r.created_at,
        })
        .collect())
}

#[derive(sqlx::FromRow)]
struct ActivityRow {
    id: Uuid,
    student_id: Uuid,
    action: String,
    category: Option<String>,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
}
