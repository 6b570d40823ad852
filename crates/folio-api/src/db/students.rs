//! Student profile persistence.
//!
//! All functions take a `&PgPool` and operate on the `students` table.
//! Profile fields live in the JSONB `profile` column.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::profile::StudentProfile;
use crate::state::StudentRecord;

/// Insert a student or replace its profile.
pub async fn upsert(pool: &PgPool, record: &StudentRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO students (id, user_id, profile, profile_completed, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6)
         ON CONFLICT (id) DO UPDATE SET
            profile = EXCLUDED.profile,
            profile_completed = EXCLUDED.profile_completed,
            updated_at = EXCLUDED.updated_at",
    )
    .bind(*record.id.as_uuid())
    .bind(&record.user_id)
    .bind(Json(&record.profile))
    .bind(record.profile_completed)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load all students into the in-memory store on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<StudentRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, StudentRow>(
        "SELECT id, user_id, profile, profile_completed, created_at, updated_at
         FROM students ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().filter_map(StudentRow::into_record).collect())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct StudentRow {
    id: Uuid,
    user_id: String,
    profile: serde_json::Value,
    profile_completed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl StudentRow {
    fn into_record(self) -> Option<StudentRecord> {
        let profile: StudentProfile = super::decode_body("students", self.id, self.profile)?;
        Some(StudentRecord {
            id: self.id.into(),
            user_id: self.user_id,
            profile,
            profile_completed: self.profile_completed,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
