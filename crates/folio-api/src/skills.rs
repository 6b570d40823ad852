//! # Skills
//!
//! A shared catalog of (name, category) skills and the per-student
//! association carrying proficiency. Re-adding a skill a student already
//! has updates the association in place.

use chrono::{NaiveDate, Utc};
use folio_core::{FolioError, Proficiency, RequiredFields, SkillCategory, StudentId, ValidationError};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db;
use crate::sinks;
use crate::state::{AppState, SkillRecord, StudentSkillRecord};

/// Request to add (or re-level) a skill.
///
/// Either `skill_id` names a catalog entry, or `name` and `category`
/// describe one to find or create.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SkillDraft {
    pub skill_id: Option<Uuid>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub proficiency: Option<String>,
    pub acquired_date: Option<NaiveDate>,
    pub note: Option<String>,
}

/// Catalog skills, optionally in one category, sorted by name.
pub fn catalog(state: &AppState, category: Option<SkillCategory>) -> Vec<SkillRecord> {
    let mut items = state
        .skills
        .filter(|s| category.map_or(true, |c| s.category == c));
    items.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    items
}

/// The student's skills, most recently changed first.
pub fn list_for_student(state: &AppState, owner: StudentId) -> Vec<StudentSkillRecord> {
    let mut items = state.student_skills.filter(|s| s.student_id == owner);
    items.sort_by_key(|s| std::cmp::Reverse(s.updated_at));
    items
}

/// Add a skill to the student's profile, or update its proficiency.
///
/// Returns the association and whether it was created.
pub async fn upsert(
    state: &AppState,
    owner: StudentId,
    draft: SkillDraft,
) -> Result<(StudentSkillRecord, bool), FolioError> {
    let mut required = RequiredFields::new();
    let Some(proficiency) = required.text("proficiency", draft.proficiency) else {
        return Err(required.into_error().into());
    };
    let proficiency: Proficiency = proficiency
        .to_ascii_uppercase()
        .parse()
        .map_err(|e: folio_core::UnknownVariant| {
            ValidationError::invalid("proficiency", e.to_string())
        })?;

    let skill = resolve_skill(state, draft.skill_id, draft.name, draft.category).await?;

    let now = Utc::now();
    let note = draft.note.filter(|n| !n.trim().is_empty());
    let (record, previous) = state.student_skills.upsert_where(
        |a| a.student_id == owner && a.skill_id == skill.id,
        |a| {
            a.proficiency = proficiency;
            a.acquired_date = draft.acquired_date.or(a.acquired_date);
            if note.is_some() {
                a.note = note.clone();
            }
            a.updated_at = now;
        },
        || {
            let id = Uuid::new_v4();
            (
                id,
                StudentSkillRecord {
                    id,
                    student_id: owner,
                    skill_id: skill.id,
                    skill_name: skill.name.clone(),
                    skill_category: skill.category,
                    proficiency,
                    acquired_date: draft.acquired_date,
                    note: note.clone(),
                    created_at: now,
                    updated_at: now,
                },
            )
        },
    );

    if let Some(pool) = &state.db_pool {
        if let Err(e) = db::skills::upsert_association(pool, &record).await {
            state.student_skills.restore(record.id, previous);
            return Err(db::persistence_error("student skill")(e));
        }
    }

    sinks::emit_best_effort(
        "activity",
        sinks::log_activity(
            state,
            owner,
            "add_skill",
            Some("skill"),
            serde_json::json!({
                "skill_id": skill.id,
                "skill_name": skill.name,
                "proficiency": proficiency,
            }),
        ),
    )
    .await;

    Ok((record, previous.is_none()))
}

async fn resolve_skill(
    state: &AppState,
    skill_id: Option<Uuid>,
    name: Option<String>,
    category: Option<String>,
) -> Result<SkillRecord, FolioError> {
    if let Some(id) = skill_id {
        return state
            .skills
            .get(&id)
            .ok_or_else(|| FolioError::not_found("skill"));
    }

    let mut required = RequiredFields::new();
    let name = required.text("name", name);
    let category = required.text("category", category);
    let (Some(name), Some(category)) = (name, category) else {
        return Err(required.into_error().into());
    };
    let category: SkillCategory = category
        .to_ascii_uppercase()
        .parse()
        .map_err(|e: folio_core::UnknownVariant| ValidationError::invalid("category", e.to_string()))?;

    let (skill, existing) = state.skills.upsert_where(
        |s| s.name.eq_ignore_ascii_case(&name),
        |_| {},
        || {
            let id = Uuid::new_v4();
            (
                id,
                SkillRecord {
                    id,
                    name: name.clone(),
                    category,
                    created_at: Utc::now(),
                },
            )
        },
    );

    if existing.is_none() {
        if let Some(pool) = &state.db_pool {
            if let Err(e) = db::skills::insert_catalog(pool, &skill).await {
                state.skills.restore(skill.id, None);
                return Err(db::persistence_error("skill")(e));
            }
        }
        tracing::info!(skill_id = %skill.id, name = %skill.name, "catalog skill created");
    }
    Ok(skill)
}
