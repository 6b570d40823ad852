//! # Student Profile
//!
//! Profile upsert keyed by the identity-provider subject, the completion
//! score, and the composite profile view.

use chrono::{NaiveDate, Utc};
use folio_core::{ExperienceKind, FolioError, RequiredFields, StudentId, ValidationError};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db;
use crate::records::{self, ListQuery};
use crate::sinks;
use crate::skills;
use crate::state::{AppState, NotificationRecord, StudentRecord, StudentSkillRecord};
use crate::submission::{AchievementRecord, CertificateRecord, ExperienceRecord};

/// Unread notifications included in the profile view.
const PROFILE_UNREAD_LIMIT: usize = 10;

/// Profile fields of a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StudentProfile {
    pub first_name: String,
    pub last_name: String,
    pub roll_number: String,
    pub department: String,
    pub course: String,
    pub year: u8,
    pub semester: u8,
    pub batch: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    /// Public path of the profile photo.
    pub profile_photo: Option<String>,
    pub bio: Option<String>,
    pub current_gpa: Option<f64>,
    pub admission_date: Option<NaiveDate>,
    pub expected_graduation: Option<NaiveDate>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub portfolio_url: Option<String>,
}

/// Profile input. Every save replaces the whole profile.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ProfileDraft {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub roll_number: Option<String>,
    pub department: Option<String>,
    pub course: Option<String>,
    pub year: Option<u8>,
    pub semester: Option<u8>,
    pub batch: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub profile_photo: Option<String>,
    pub bio: Option<String>,
    pub current_gpa: Option<f64>,
    pub admission_date: Option<NaiveDate>,
    pub expected_graduation: Option<NaiveDate>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub portfolio_url: Option<String>,
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl TryFrom<ProfileDraft> for StudentProfile {
    type Error = ValidationError;

    fn try_from(draft: ProfileDraft) -> Result<Self, Self::Error> {
        let mut required = RequiredFields::new();
        let first_name = required.text("first_name", draft.first_name);
        let last_name = required.text("last_name", draft.last_name);
        let roll_number = required.text("roll_number", draft.roll_number);
        let department = required.text("department", draft.department);
        let course = required.text("course", draft.course);
        let year = required.value("year", draft.year.filter(|y| *y > 0));
        let semester = required.value("semester", draft.semester.filter(|s| *s > 0));
        let batch = required.text("batch", draft.batch);

        let (
            Some(first_name),
            Some(last_name),
            Some(roll_number),
            Some(department),
            Some(course),
            Some(year),
            Some(semester),
            Some(batch),
        ) = (
            first_name,
            last_name,
            roll_number,
            department,
            course,
            year,
            semester,
            batch,
        )
        else {
            return Err(required.into_error());
        };

        if let Some(gpa) = draft.current_gpa {
            if !(0.0..=10.0).contains(&gpa) {
                return Err(ValidationError::invalid(
                    "current_gpa",
                    "must be between 0 and 10",
                ));
            }
        }

        Ok(Self {
            first_name,
            last_name,
            roll_number,
            department,
            course,
            year,
            semester,
            batch,
            phone: optional(draft.phone),
            date_of_birth: draft.date_of_birth,
            gender: optional(draft.gender),
            address: optional(draft.address),
            city: optional(draft.city),
            state: optional(draft.state),
            pincode: optional(draft.pincode),
            profile_photo: optional(draft.profile_photo),
            bio: optional(draft.bio),
            current_gpa: draft.current_gpa,
            admission_date: draft.admission_date,
            expected_graduation: draft.expected_graduation,
            linkedin_url: optional(draft.linkedin_url),
            github_url: optional(draft.github_url),
            portfolio_url: optional(draft.portfolio_url),
        })
    }
}

impl StudentProfile {
    /// Required fields are guaranteed by construction, so only the
    /// admission date decides completeness.
    pub fn is_complete(&self) -> bool {
        self.admission_date.is_some()
    }
}

/// Create the caller's profile on first save, replace it afterwards.
///
/// Returns the stored record and whether it was created.
pub async fn upsert(
    state: &AppState,
    user_id: &str,
    draft: ProfileDraft,
) -> Result<(StudentRecord, bool), FolioError> {
    let profile = StudentProfile::try_from(draft)?;
    let completed = profile.is_complete();
    let now = Utc::now();

    let (record, previous) = state.students.upsert_where(
        |s| s.user_id == user_id,
        |s| {
            s.profile = profile.clone();
            s.profile_completed = completed;
            s.updated_at = now;
        },
        || {
            let id = StudentId::new();
            (
                *id.as_uuid(),
                StudentRecord {
                    id,
                    user_id: user_id.to_string(),
                    profile: profile.clone(),
                    profile_completed: completed,
                    created_at: now,
                    updated_at: now,
                },
            )
        },
    );

    if let Some(pool) = &state.db_pool {
        if let Err(e) = db::students::upsert(pool, &record).await {
            state.students.restore(*record.id.as_uuid(), previous);
            return Err(db::persistence_error("student")(e));
        }
    }

    let created = previous.is_none();
    tracing::info!(student_id = %record.id, created, "profile saved");
    sinks::emit_best_effort(
        "activity",
        sinks::log_activity(
            state,
            record.id,
            "update_profile",
            Some("profile"),
            serde_json::json!({}),
        ),
    )
    .await;

    Ok((record, created))
}

/// Counts that feed the completion score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivityCounts {
    pub certificates: usize,
    pub achievements: usize,
    pub skills: usize,
    pub jobs: usize,
    pub internships: usize,
    pub other_experiences: usize,
}

impl ActivityCounts {
    /// Count the owner's submissions and skills in every status.
    pub fn collect(state: &AppState, owner: StudentId) -> Self {
        let experiences = state.experiences.filter(|e| e.student_id == owner);
        let of_kind = |kind| experiences.iter().filter(|e| e.details.kind == kind).count();
        Self {
            certificates: state
                .certificates
                .filter(|c| c.student_id == owner)
                .len(),
            achievements: state
                .achievements
                .filter(|a| a.student_id == owner)
                .len(),
            skills: state.student_skills.filter(|s| s.student_id == owner).len(),
            jobs: of_kind(ExperienceKind::Job),
            internships: of_kind(ExperienceKind::Internship),
            other_experiences: of_kind(ExperienceKind::Other),
        }
    }
}

/// Weighted completion score, 0 to 100.
pub fn completion_percentage(profile: &StudentProfile, counts: &ActivityCounts) -> u8 {
    let p = profile;
    let filled = |s: &str| !s.trim().is_empty();
    let weights: [(bool, u32); 16] = [
        (filled(&p.first_name) && filled(&p.last_name), 5),
        (p.profile_photo.is_some(), 5),
        (p.date_of_birth.is_some(), 3),
        (p.address.is_some() && p.city.is_some() && p.state.is_some(), 7),
        (filled(&p.department) && filled(&p.course), 5),
        (p.current_gpa.is_some_and(|g| g > 0.0), 5),
        (filled(&p.roll_number), 5),
        (filled(&p.batch), 3),
        (p.year > 0 && p.semester > 0, 5),
        (p.admission_date.is_some(), 3),
        (p.expected_graduation.is_some(), 4),
        (counts.certificates > 0, 15),
        (counts.skills >= 3, 10),
        (counts.achievements > 0, 10),
        (counts.jobs > 0 || counts.internships > 0, 10),
        (counts.other_experiences > 0, 5),
    ];
    let score: u32 = weights
        .iter()
        .filter(|(met, _)| *met)
        .map(|(_, points)| points)
        .sum();
    score.min(100) as u8
}

/// Completion score for a stored student.
pub fn completion_for(state: &AppState, student: &StudentRecord) -> u8 {
    completion_percentage(&student.profile, &ActivityCounts::collect(state, student.id))
}

/// The profile with everything a dashboard shows alongside it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProfileView {
    pub student: StudentRecord,
    pub completion_percentage: u8,
    pub certificates: Vec<CertificateRecord>,
    pub achievements: Vec<AchievementRecord>,
    pub experiences: Vec<ExperienceRecord>,
    pub skills: Vec<StudentSkillRecord>,
    /// Up to ten unread notifications, newest first.
    pub unread_notifications: Vec<NotificationRecord>,
}

/// Assemble the profile view for a student.
pub fn view(state: &AppState, student: StudentRecord) -> ProfileView {
    let owner = student.id;
    let all = ListQuery::default();
    let mut unread = sinks::list_notifications(state, owner, true);
    unread.truncate(PROFILE_UNREAD_LIMIT);
    ProfileView {
        completion_percentage: completion_for(state, &student),
        certificates: records::list(state, owner, &all),
        achievements: records::list(state, owner, &all),
        experiences: records::list(state, owner, &all),
        skills: skills::list_for_student(state, owner),
        unread_notifications: unread,
        student,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_draft() -> ProfileDraft {
        ProfileDraft {
            first_name: Some("Asha".into()),
            last_name: Some("Rao".into()),
            roll_number: Some("CS21-042".into()),
            department: Some("Computer Science".into()),
            course: Some("B.Tech".into()),
            year: Some(3),
            semester: Some(5),
            batch: Some("2021-2025".into()),
            ..ProfileDraft::default()
        }
    }

    #[test]
    fn missing_required_fields_are_all_named() {
        let draft = ProfileDraft {
            roll_number: None,
            batch: Some(" ".into()),
            ..complete_draft()
        };
        let err = StudentProfile::try_from(draft).unwrap_err();
        assert_eq!(
            err.fields(),
            vec!["roll_number".to_string(), "batch".to_string()]
        );
    }

    #[test]
    fn gpa_out_of_range_is_rejected() {
        let draft = ProfileDraft {
            current_gpa: Some(11.5),
            ..complete_draft()
        };
        let err = StudentProfile::try_from(draft).unwrap_err();
        assert_eq!(err.fields(), vec!["current_gpa".to_string()]);
    }

    #[test]
    fn profile_completed_requires_admission_date() {
        let profile = StudentProfile::try_from(complete_draft()).unwrap();
        assert!(!profile.is_complete());
        let profile = StudentProfile::try_from(ProfileDraft {
            admission_date: NaiveDate::from_ymd_opt(2021, 8, 1),
            ..complete_draft()
        })
        .unwrap();
        assert!(profile.is_complete());
    }

    #[test]
    fn completion_weights_sum_as_expected() {
        let profile = StudentProfile::try_from(complete_draft()).unwrap();
        // names 5, dept+course 5, roll 5, batch 3, year+sem 5
        assert_eq!(completion_percentage(&profile, &ActivityCounts::default()), 23);

        let counts = ActivityCounts {
            certificates: 1,
            skills: 3,
            achievements: 1,
            internships: 1,
            other_experiences: 1,
            ..ActivityCounts::default()
        };
        assert_eq!(completion_percentage(&profile, &counts), 23 + 15 + 10 + 10 + 10 + 5);
    }

    #[test]
    fn completion_is_capped_at_100() {
        let profile = StudentProfile::try_from(ProfileDraft {
            profile_photo: Some("/uploads/p.png".into()),
            date_of_birth: NaiveDate::from_ymd_opt(2003, 4, 9),
            address: Some("12 Main St".into()),
            city: Some("Pune".into()),
            state: Some("MH".into()),
            current_gpa: Some(8.7),
            admission_date: NaiveDate::from_ymd_opt(2021, 8, 1),
            expected_graduation: NaiveDate::from_ymd_opt(2025, 6, 1),
            ..complete_draft()
        })
        .unwrap();
        let counts = ActivityCounts {
            certificates: 4,
            achievements: 2,
            skills: 8,
            jobs: 1,
            internships: 1,
            other_experiences: 2,
        };
        assert_eq!(completion_percentage(&profile, &counts), 100);
    }

    #[tokio::test]
    async fn upsert_creates_then_updates_in_place() {
        let state = AppState::new();
        let (created, was_created) = upsert(&state, "user_1", complete_draft()).await.unwrap();
        assert!(was_created);
        assert_eq!(created.user_id, "user_1");

        let (updated, was_created) = upsert(
            &state,
            "user_1",
            ProfileDraft {
                semester: Some(6),
                ..complete_draft()
            },
        )
        .await
        .unwrap();
        assert!(!was_created);
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.profile.semester, 6);
        assert_eq!(state.students.len(), 1);
        assert_eq!(
            state
                .activity
                .filter(|a| a.action == "update_profile")
                .len(),
            2
        );
    }

    #[tokio::test]
    async fn failed_save_keeps_previous_profile() {
        let (saved, _) = upsert(&AppState::new(), "user_1", complete_draft()).await.unwrap();
        let state = crate::db::offline_state();

        let err = upsert(&state, "user_2", complete_draft()).await.unwrap_err();
        assert!(matches!(err, FolioError::Persistence(_)));
        assert!(state.students.is_empty());

        state.students.insert(*saved.id.as_uuid(), saved.clone());
        let err = upsert(
            &state,
            "user_1",
            ProfileDraft {
                semester: Some(6),
                ..complete_draft()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, FolioError::Persistence(_)));
        let stored = state.students.get(saved.id.as_uuid()).unwrap();
        assert_eq!(stored.profile.semester, 5);
        assert_eq!(stored.updated_at, saved.updated_at);
    }
}
