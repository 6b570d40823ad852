//! Submission persistence.
//!
//! One table per [`RecordKind`] (`certificates`, `achievements`,
//! `experiences`), all with the same columns. The table name comes from
//! the closed kind enum, never from caller input.

use folio_core::RecordKind;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::submission::Submission;

/// Insert a new submission.
pub async fn insert<R: Submission>(pool: &PgPool, record: &R) -> Result<(), sqlx::Error> {
    let sql = format!(
        "INSERT INTO {} (id, student_id, verification_status, body, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6)",
        R::KIND.plural()
    );
    sqlx::query(&sql)
        .bind(record.id())
        .bind(*record.student_id().as_uuid())
        .bind(record.verification().status.as_str())
        .bind(Json(record))
        .bind(record.created_at())
        .bind(record.updated_at())
        .execute(pool)
        .await?;

    Ok(())
}

/// Overwrite a submission after an owner edit or a verifier action.
pub async fn update<R: Submission>(pool: &PgPool, record: &R) -> Result<bool, sqlx::Error> {
    let sql = format!(
        "UPDATE {} SET verification_status = $1, body = $2, updated_at = $3 WHERE id = $4",
        R::KIND.plural()
    );
    let result = sqlx::query(&sql)
        .bind(record.verification().status.as_str())
        .bind(Json(record))
        .bind(record.updated_at())
        .bind(record.id())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a submission by id.
pub async fn delete(pool: &PgPool, kind: RecordKind, id: Uuid) -> Result<bool, sqlx::Error> {
    let sql = format!("DELETE FROM {} WHERE id = $1", kind.plural());
    let result = sqlx::query(&sql).bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

/// Load every submission of one kind, oldest first.
pub async fn load_all<R: Submission>(pool: &PgPool) -> Result<Vec<R>, sqlx::Error> {
    let sql = format!(
        "SELECT id, body FROM {} ORDER BY created_at",
        R::KIND.plural()
    );
    let rows = sqlx::query_as::<_, SubmissionRow>(&sql)
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|row| super::decode_body(R::KIND.plural(), row.id, row.body))
        .collect())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct SubmissionRow {
    id: Uuid,
    body: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use crate::submission::{AchievementRecord, CertificateRecord, ExperienceRecord, Submission};

    #[test]
    fn each_kind_has_its_own_table() {
        assert_eq!(CertificateRecord::KIND.plural(), "certificates");
        assert_eq!(AchievementRecord::KIND.plural(), "achievements");
        assert_eq!(ExperienceRecord::KIND.plural(), "experiences");
    }
}
