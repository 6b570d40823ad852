//! # Dashboard
//!
//! Read-only aggregates over a student's records: headline stats,
//! certificate statistics and the short list of improvement insights.

use std::collections::BTreeMap;

use folio_core::{ExperienceKind, StudentId};
use folio_state::VerificationStatus;
use serde::Serialize;
use utoipa::ToSchema;

use crate::profile::{self, ActivityCounts};
use crate::sinks;
use crate::state::{ActivityRecord, AppState, StudentRecord};
use crate::submission::{CertificateRecord, Submission};

/// Recent activity entries shown with the stats.
const RECENT_ACTIVITY_LIMIT: usize = 5;
/// Recent certificates shown with the certificate statistics.
const RECENT_CERTIFICATE_LIMIT: usize = 5;
/// Most insights returned at once.
const MAX_INSIGHTS: usize = 3;

/// Total and verified counts. `pending` is everything not yet verified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct SubmissionTally {
    pub total: usize,
    pub verified: usize,
    pub pending: usize,
}

impl SubmissionTally {
    fn of<R: Submission>(state: &AppState, owner: StudentId) -> Self {
        let mine = R::store(state).filter(|r| r.student_id() == owner);
        let verified = mine
            .iter()
            .filter(|r| r.verification().status == VerificationStatus::Verified)
            .count();
        Self {
            total: mine.len(),
            verified,
            pending: mine.len() - verified,
        }
    }
}

/// Experience counts by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ExperienceTally {
    pub jobs: usize,
    pub internships: usize,
    pub other: usize,
}

/// Headline numbers for the student dashboard.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardStats {
    pub certificates: SubmissionTally,
    pub achievements: SubmissionTally,
    pub skills: usize,
    pub experience: ExperienceTally,
    pub recent_activity: Vec<ActivityRecord>,
}

/// Compute the dashboard stats for a student.
pub fn stats(state: &AppState, owner: StudentId) -> DashboardStats {
    let experiences = state.experiences.filter(|e| e.student_id == owner);
    let of_kind = |kind| experiences.iter().filter(|e| e.details.kind == kind).count();
    DashboardStats {
        certificates: SubmissionTally::of::<CertificateRecord>(state, owner),
        achievements: SubmissionTally::of::<crate::submission::AchievementRecord>(state, owner),
        skills: state.student_skills.filter(|s| s.student_id == owner).len(),
        experience: ExperienceTally {
            jobs: of_kind(ExperienceKind::Job),
            internships: of_kind(ExperienceKind::Internship),
            other: of_kind(ExperienceKind::Other),
        },
        recent_activity: sinks::list_activity(state, owner, RECENT_ACTIVITY_LIMIT),
    }
}

/// Certificate counts by status and category.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CertificateStats {
    pub total: usize,
    pub verified: usize,
    pub pending: usize,
    pub rejected: usize,
    /// Count per category wire name.
    pub by_category: BTreeMap<String, usize>,
    pub recent: Vec<CertificateRecord>,
}

/// Compute certificate statistics for a student.
pub fn certificate_stats(state: &AppState, owner: StudentId) -> CertificateStats {
    let mut mine = state.certificates.filter(|c| c.student_id == owner);
    mine.sort_by_key(|c| std::cmp::Reverse(c.created_at));

    let count = |status| {
        mine.iter()
            .filter(|c| c.verification.status == status)
            .count()
    };
    let mut by_category = BTreeMap::new();
    for c in &mine {
        *by_category
            .entry(c.details.category.as_str().to_string())
            .or_insert(0) += 1;
    }

    CertificateStats {
        total: mine.len(),
        verified: count(VerificationStatus::Verified),
        pending: count(VerificationStatus::Pending) + count(VerificationStatus::UnderReview),
        rejected: count(VerificationStatus::Rejected),
        by_category,
        recent: mine.iter().take(RECENT_CERTIFICATE_LIMIT).cloned().collect(),
    }
}

/// How urgent an insight is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum InsightPriority {
    High,
    Medium,
}

/// A suggestion for improving the portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Insight {
    /// Area the insight is about (`profile`, `skills`, `certificates`, `experience`).
    pub kind: &'static str,
    pub priority: InsightPriority,
    pub title: String,
    pub message: String,
    /// Label for the call to action.
    pub action: &'static str,
}

/// Up to three insights for a student, most relevant first.
pub fn insights(state: &AppState, student: &StudentRecord) -> Vec<Insight> {
    let counts = ActivityCounts::collect(state, student.id);
    let completion = profile::completion_percentage(&student.profile, &counts);
    let verified_certificates = state
        .certificates
        .filter(|c| {
            c.student_id == student.id && c.verification.status == VerificationStatus::Verified
        })
        .len();

    let mut out = Vec::new();
    if completion < 70 {
        out.push(Insight {
            kind: "profile",
            priority: InsightPriority::High,
            title: "Complete Your Profile".into(),
            message: format!(
                "Your profile is {completion}% complete. Adding more details will help you get better career recommendations."
            ),
            action: "Complete Profile",
        });
    }
    if counts.skills < 5 {
        out.push(Insight {
            kind: "skills",
            priority: InsightPriority::Medium,
            title: "Add More Skills".into(),
            message: "Consider adding more skills to strengthen your profile and improve job matches."
                .into(),
            action: "Add Skills",
        });
    }
    if verified_certificates == 0 {
        out.push(Insight {
            kind: "certificates",
            priority: InsightPriority::Medium,
            title: "Upload Certificates".into(),
            message: "Adding certificates will validate your skills and improve your credibility."
                .into(),
            action: "Upload Certificate",
        });
    }
    if counts.jobs == 0 && counts.internships == 0 {
        out.push(Insight {
            kind: "experience",
            priority: InsightPriority::High,
            title: "Gain Work Experience".into(),
            message:
                "Consider applying for internships or part-time roles to build practical experience."
                    .into(),
            action: "Find Opportunities",
        });
    }
    out.truncate(MAX_INSIGHTS);
    out
}
