//! Skill catalog and student-skill persistence.
//!
//! Operates on the `skills` and `student_skills` tables.

use chrono::{DateTime, NaiveDate, Utc};
use folio_core::{Proficiency, SkillCategory};
use sqlx::PgPool;
use uuid::Uuid;

use crate::state::{SkillRecord, StudentSkillRecord};

/// Insert a catalog skill.
pub async fn insert_catalog(pool: &PgPool, skill: &SkillRecord) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO skills (id, name, category, created_at) VALUES ($1, $2, $3, $4)")
        .bind(skill.id)
        .bind(&skill.name)
        .bind(skill.category.as_str())
        .bind(skill.created_at)
        .execute(pool)
        .await?;

    Ok(())
}

/// Insert or update a student's association with a catalog skill.
pub async fn upsert_association(
    pool: &PgPool,
    record: &StudentSkillRecord,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO student_skills (id, student_id, skill_id, proficiency, acquired_date, note,
         created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         ON CONFLICT (student_id, skill_id) DO UPDATE SET
            proficiency = EXCLUDED.proficiency,
            acquired_date = EXCLUDED.acquired_date,
            note = EXCLUDED.note,
            updated_at = EXCLUDED.updated_at",
    )
    .bind(record.id)
    .bind(*record.student_id.as_uuid())
    .bind(record.skill_id)
    .bind(record.proficiency.as_str())
    .bind(record.acquired_date)
    .bind(&record.note)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load the skill catalog.
pub async fn load_catalog(pool: &PgPool) -> Result<Vec<SkillRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, SkillRow>(
        "SELECT id, name, category, created_at FROM skills ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().filter_map(SkillRow::into_record).collect())
}

/// Load every student-skill association with its catalog name and category.
pub async fn load_associations(pool: &PgPool) -> Result<Vec<StudentSkillRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, StudentSkillRow>(
        "SELECT ss.id, ss.student_id, ss.skill_id, s.name AS skill_name,
         s.category AS skill_category, ss.proficiency, ss.acquired_date, ss.note,
         ss.created_at, ss.updated_at
         FROM student_skills ss JOIN skills s ON s.id = ss.skill_id
         ORDER BY ss.created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .filter_map(StudentSkillRow::into_record)
        .collect())
}

#[derive(sqlx::FromRow)]
struct SkillRow {
    id: Uuid,
    name: String,
    category: String,
    created_at: DateTime<Utc>,
}

impl SkillRow {
    fn into_record(self) -> Option<SkillRecord> {
        let category = parse_category(self.id, &self.category)?;
        Some(SkillRecord {
            id: self.id,
            name: self.name,
            category,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct StudentSkillRow {
    id: Uuid,
    student_id: Uuid,
    skill_id: Uuid,
    skill_name: String,
    skill_category: String,
    proficiency: String,
    acquired_date: Option<NaiveDate>,
    note: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl StudentSkillRow {
    fn into_record(self) -> Option<StudentSkillRecord> {
        let skill_category = parse_category(self.skill_id, &self.skill_category)?;
        let proficiency: Proficiency = match self.proficiency.parse() {
            Ok(p) => p,
            Err(_) => {
                tracing::warn!(
                    id = %self.id,
                    proficiency = %self.proficiency,
                    "skipping student skill row with unknown proficiency"
                );
                return None;
            }
        };
        Some(StudentSkillRecord {
            id: self.id,
            student_id: self.student_id.into(),
            skill_id: self.skill_id,
            skill_name: self.skill_name,
            skill_category,
            proficiency,
            acquired_date: self.acquired_date,
            note: self.note,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn parse_category(id: Uuid, raw: &str) -> Option<SkillCategory> {
    match raw.parse() {
        Ok(c) => Some(c),
        Err(_) => {
            tracing::warn!(%id, category = raw, "skipping skill row with unknown category");
            None
        }
    }
}
