//! # Portfolio Export
//!
//! A shareable document built from the profile, skills and VERIFIED
//! submissions only. Rendered as JSON or Markdown.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use folio_state::VerificationStatus;
use serde::Serialize;
use utoipa::ToSchema;

use crate::profile::StudentProfile;
use crate::skills;
use crate::state::{AppState, StudentRecord, StudentSkillRecord};
use crate::submission::{
    AchievementDetails, AchievementRecord, CertificateDetails, CertificateRecord,
    ExperienceDetails, ExperienceRecord, Submission,
};

/// The exported portfolio.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Portfolio {
    pub name: String,
    pub profile: StudentProfile,
    pub skills: Vec<StudentSkillRecord>,
    pub certificates: Vec<CertificateDetails>,
    pub achievements: Vec<AchievementDetails>,
    pub experiences: Vec<ExperienceDetails>,
    pub generated_at: DateTime<Utc>,
}

fn verified<R: Submission>(state: &AppState, student: &StudentRecord) -> Vec<R::Details> {
    let mut items = R::store(state).filter(|r| {
        r.student_id() == student.id && r.verification().status == VerificationStatus::Verified
    });
    items.sort_by_key(|r| std::cmp::Reverse(r.created_at()));
    items.into_iter().map(|r| r.details().clone()).collect()
}

/// Build the portfolio for a student.
pub fn build(state: &AppState, student: &StudentRecord) -> Portfolio {
    Portfolio {
        name: student.full_name(),
        profile: student.profile.clone(),
        skills: skills::list_for_student(state, student.id),
        certificates: verified::<CertificateRecord>(state, student),
        achievements: verified::<AchievementRecord>(state, student),
        experiences: verified::<ExperienceRecord>(state, student),
        generated_at: Utc::now(),
    }
}

impl Portfolio {
    /// Render as a Markdown document.
    pub fn to_markdown(&self) -> String {
        let p = &self.profile;
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = writeln!(out, "# {}\n", self.name);
        let _ = writeln!(out, "{}, {} ({})", p.course, p.department, p.batch);
        if let Some(gpa) = p.current_gpa {
            let _ = writeln!(out, "\nGPA: {gpa:.2}");
        }
        if let Some(bio) = &p.bio {
            let _ = writeln!(out, "\n{bio}");
        }
        let links: Vec<&str> = [&p.linkedin_url, &p.github_url, &p.portfolio_url]
            .into_iter()
            .filter_map(|l| l.as_deref())
            .collect();
        if !links.is_empty() {
            let _ = writeln!(out, "\n{}", links.join(" · "));
        }

        if !self.skills.is_empty() {
            let _ = writeln!(out, "\n## Skills\n");
            for s in &self.skills {
                let _ = writeln!(out, "- {} ({})", s.skill_name, s.proficiency);
            }
        }

        if !self.experiences.is_empty() {
            let _ = writeln!(out, "\n## Experience\n");
            for e in &self.experiences {
                let until = e
                    .end_date
                    .map_or_else(|| "present".to_string(), |d| d.to_string());
                let _ = writeln!(
                    out,
                    "- **{}**, {} ({}) {} to {}",
                    e.position, e.company, e.kind, e.start_date, until
                );
            }
        }

        if !self.certificates.is_empty() {
            let _ = writeln!(out, "\n## Certificates\n");
            for c in &self.certificates {
                let _ = writeln!(out, "- **{}**, {} ({})", c.title, c.issuer, c.issue_date);
            }
        }

        if !self.achievements.is_empty() {
            let _ = writeln!(out, "\n## Achievements\n");
            for a in &self.achievements {
                let _ = writeln!(
                    out,
                    "- **{}** ({}, {}): {}",
                    a.title, a.level, a.achievement_date, a.description
                );
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{self, ProfileDraft};
    use crate::records;
    use crate::submission::CertificateDraft;
    use chrono::NaiveDate;
    use folio_state::VerificationDecision;

    #[tokio::test]
    async fn only_verified_submissions_are_exported() {
        let state = AppState::new();
        let draft = ProfileDraft {
            first_name: Some("Asha".into()),
            last_name: Some("Rao".into()),
            roll_number: Some("CS21-042".into()),
            department: Some("CSE".into()),
            course: Some("B.Tech".into()),
            year: Some(3),
            semester: Some(5),
            batch: Some("2021-2025".into()),
            ..ProfileDraft::default()
        };
        let (student, _) = profile::upsert(&state, "user_1", draft).await.unwrap();

        let cert = |title: &str| CertificateDraft {
            title: Some(title.into()),
            issuer: Some("NPTEL".into()),
            issue_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            category: Some("ACADEMIC".into()),
            file_path: Some("/uploads/c.pdf".into()),
            file_type: Some("application/pdf".into()),
            file_size: Some(10),
            ..CertificateDraft::default()
        };
        let kept: CertificateRecord = records::create(&state, student.id, cert("Algorithms"))
            .await
            .unwrap();
        records::create::<CertificateRecord>(&state, student.id, cert("Pending One"))
            .await
            .unwrap();
        state.certificates.update(&kept.id, |r| {
            r.verification
                .decide(VerificationDecision::Verified, "admin", None, Utc::now())
                .unwrap();
        });

        let portfolio = build(&state, &student);
        assert_eq!(portfolio.name, "Asha Rao");
        assert_eq!(portfolio.certificates.len(), 1);
        assert_eq!(portfolio.certificates[0].title, "Algorithms");

        let md = portfolio.to_markdown();
        assert!(md.starts_with("# Asha Rao"));
        assert!(md.contains("## Certificates"));
        assert!(md.contains("Algorithms"));
        assert!(!md.contains("Pending One"));
        assert!(!md.contains("## Achievements"));
    }
}
