//! # Submission Records
//!
//! The three kinds of student submission (certificate, achievement,
//! experience) share one shape: owner, kind-specific details, the embedded
//! [`Verification`] block and timestamps. The [`Submission`] trait lets the
//! record service, verification workflow and persistence layer handle all
//! three with one generic implementation.
//!
//! Details are built from an all-optional draft so that every missing
//! required field is reported in one [`ValidationError`].

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use folio_core::{
    AchievementCategory, AchievementLevel, CertificateCategory, ExperienceKind, RecordKind,
    RequiredFields, StudentId, UnknownVariant, ValidationError,
};
use folio_state::Verification;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::state::{AppState, Store};

// -- Traits -------------------------------------------------------------------

/// Kind-specific content of a submission.
pub trait SubmissionDetails:
    Clone + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Caller-supplied input with every field optional.
    type Draft: DeserializeOwned + Send + 'static;

    /// Validate a draft, naming every missing or malformed field.
    fn from_draft(draft: Self::Draft) -> Result<Self, ValidationError>;

    /// Human-readable title used in notifications and activity metadata.
    fn title(&self) -> String;

    /// Category (or kind, for experiences) as its wire string.
    fn category(&self) -> &'static str;

    /// Case-insensitive match of an already-lowercased needle.
    fn matches(&self, needle: &str) -> bool;
}

/// A stored submission of one [`RecordKind`].
pub trait Submission: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Content type.
    type Details: SubmissionDetails;

    /// Which kind this is.
    const KIND: RecordKind;

    /// The in-memory store holding this kind.
    fn store(state: &AppState) -> &Store<Self>;

    /// Build a record from its parts.
    fn assemble(
        id: Uuid,
        student_id: StudentId,
        details: Self::Details,
        verification: Verification,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self;

    fn id(&self) -> Uuid;
    fn student_id(&self) -> StudentId;
    fn details(&self) -> &Self::Details;
    fn details_mut(&mut self) -> &mut Self::Details;
    fn verification(&self) -> &Verification;
    fn verification_mut(&mut self) -> &mut Verification;
    fn created_at(&self) -> DateTime<Utc>;
    fn updated_at(&self) -> DateTime<Utc>;
    fn set_updated_at(&mut self, at: DateTime<Utc>);
}

macro_rules! submission_record {
    (
        $(#[$meta:meta])*
        $name:ident, $details:ty, $kind:expr, $store:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
        pub struct $name {
            pub id: Uuid,
            pub student_id: StudentId,
            #[serde(flatten)]
            pub details: $details,
            #[serde(flatten)]
            pub verification: Verification,
            pub created_at: DateTime<Utc>,
            pub updated_at: DateTime<Utc>,
        }

        impl Submission for $name {
            type Details = $details;
            const KIND: RecordKind = $kind;

            fn store(state: &AppState) -> &Store<Self> {
                &state.$store
            }

            fn assemble(
                id: Uuid,
                student_id: StudentId,
                details: $details,
                verification: Verification,
                created_at: DateTime<Utc>,
                updated_at: DateTime<Utc>,
            ) -> Self {
                Self {
                    id,
                    student_id,
                    details,
                    verification,
                    created_at,
                    updated_at,
                }
            }

            fn id(&self) -> Uuid {
                self.id
            }
            fn student_id(&self) -> StudentId {
                self.student_id
            }
            fn details(&self) -> &$details {
                &self.details
            }
            fn details_mut(&mut self) -> &mut $details {
                &mut self.details
            }
            fn verification(&self) -> &Verification {
                &self.verification
            }
            fn verification_mut(&mut self) -> &mut Verification {
                &mut self.verification
            }
            fn created_at(&self) -> DateTime<Utc> {
                self.created_at
            }
            fn updated_at(&self) -> DateTime<Utc> {
                self.updated_at
            }
            fn set_updated_at(&mut self, at: DateTime<Utc>) {
                self.updated_at = at;
            }
        }
    };
}

submission_record! {
    /// An uploaded certificate.
    CertificateRecord, CertificateDetails, RecordKind::Certificate, certificates
}

submission_record! {
    /// An achievement or award.
    AchievementRecord, AchievementDetails, RecordKind::Achievement, achievements
}

submission_record! {
    /// A job, internship or other experience.
    ExperienceRecord, ExperienceDetails, RecordKind::Experience, experiences
}

fn parse_catalog<T>(field: &str, raw: &str) -> Result<T, ValidationError>
where
    T: FromStr<Err = UnknownVariant>,
{
    raw.to_ascii_uppercase()
        .parse()
        .map_err(|e: UnknownVariant| ValidationError::invalid(field, e.to_string()))
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

// -- Certificate --------------------------------------------------------------

/// Certificate content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CertificateDetails {
    pub title: String,
    pub issuer: String,
    pub description: Option<String>,
    pub issue_date: NaiveDate,
    pub expiry_date: Option<NaiveDate>,
    /// External credential reference.
    pub credential_id: Option<String>,
    pub credential_url: Option<String>,
    pub category: CertificateCategory,
    /// Public path returned by the upload endpoint.
    pub file_path: String,
    pub file_type: String,
    pub file_size: u64,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Certificate input as submitted by the owner.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CertificateDraft {
    pub title: Option<String>,
    pub issuer: Option<String>,
    pub description: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub credential_id: Option<String>,
    pub credential_url: Option<String>,
    pub category: Option<String>,
    pub file_path: Option<String>,
    pub file_type: Option<String>,
    pub file_size: Option<u64>,
    pub tags: Option<Vec<String>>,
}

impl SubmissionDetails for CertificateDetails {
    type Draft = CertificateDraft;

    fn from_draft(draft: CertificateDraft) -> Result<Self, ValidationError> {
        let mut required = RequiredFields::new();
        let title = required.text("title", draft.title);
        let issuer = required.text("issuer", draft.issuer);
        let issue_date = required.value("issue_date", draft.issue_date);
        let category = required.text("category", draft.category);
        let file_path = required.text("file_path", draft.file_path);
        let file_type = required.text("file_type", draft.file_type);
        let file_size = required.value("file_size", draft.file_size);

        let (
            Some(title),
            Some(issuer),
            Some(issue_date),
            Some(category),
            Some(file_path),
            Some(file_type),
            Some(file_size),
        ) = (title, issuer, issue_date, category, file_path, file_type, file_size)
        else {
            return Err(required.into_error());
        };

        if let Some(expiry) = draft.expiry_date {
            if expiry < issue_date {
                return Err(ValidationError::invalid(
                    "expiry_date",
                    "expiry date is before the issue date",
                ));
            }
        }

        Ok(Self {
            title,
            issuer,
            description: optional_text(draft.description),
            issue_date,
            expiry_date: draft.expiry_date,
            credential_id: optional_text(draft.credential_id),
            credential_url: optional_text(draft.credential_url),
            category: parse_catalog("category", &category)?,
            file_path,
            file_type,
            file_size,
            tags: draft.tags.unwrap_or_default(),
        })
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn category(&self) -> &'static str {
        self.category.as_str()
    }

    fn matches(&self, needle: &str) -> bool {
        contains_ci(&self.title, needle)
            || contains_ci(&self.issuer, needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| contains_ci(d, needle))
            || self.tags.iter().any(|t| t.to_lowercase() == needle)
    }
}

// -- Achievement --------------------------------------------------------------

/// Achievement content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AchievementDetails {
    pub title: String,
    pub description: String,
    pub category: AchievementCategory,
    pub achievement_date: NaiveDate,
    pub level: AchievementLevel,
    /// Awarding body.
    pub organization: Option<String>,
    /// Placement, e.g. "First".
    pub position: Option<String>,
    pub file_path: Option<String>,
    pub file_type: Option<String>,
    pub file_size: Option<u64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Achievement input as submitted by the owner.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AchievementDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub achievement_date: Option<NaiveDate>,
    pub level: Option<String>,
    pub organization: Option<String>,
    pub position: Option<String>,
    pub file_path: Option<String>,
    pub file_type: Option<String>,
    pub file_size: Option<u64>,
    pub tags: Option<Vec<String>>,
}

impl SubmissionDetails for AchievementDetails {
    type Draft = AchievementDraft;

    fn from_draft(draft: AchievementDraft) -> Result<Self, ValidationError> {
        let mut required = RequiredFields::new();
        let title = required.text("title", draft.title);
        let description = required.text("description", draft.description);
        let category = required.text("category", draft.category);
        let achievement_date = required.value("achievement_date", draft.achievement_date);
        let level = required.text("level", draft.level);

        let (Some(title), Some(description), Some(category), Some(achievement_date), Some(level)) =
            (title, description, category, achievement_date, level)
        else {
            return Err(required.into_error());
        };

        Ok(Self {
            title,
            description,
            category: parse_catalog("category", &category)?,
            achievement_date,
            level: parse_catalog("level", &level)?,
            organization: optional_text(draft.organization),
            position: optional_text(draft.position),
            file_path: optional_text(draft.file_path),
            file_type: optional_text(draft.file_type),
            file_size: draft.file_size,
            tags: draft.tags.unwrap_or_default(),
        })
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn category(&self) -> &'static str {
        self.category.as_str()
    }

    fn matches(&self, needle: &str) -> bool {
        contains_ci(&self.title, needle)
            || contains_ci(&self.description, needle)
            || self
                .organization
                .as_deref()
                .is_some_and(|o| contains_ci(o, needle))
            || self.tags.iter().any(|t| t.to_lowercase() == needle)
    }
}

// -- Experience ---------------------------------------------------------------

/// Job, internship or other experience.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExperienceDetails {
    pub kind: ExperienceKind,
    pub company: String,
    pub position: String,
    pub start_date: NaiveDate,
    /// `None` while ongoing.
    pub end_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub compensation: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
}

/// Experience input as submitted by the owner.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ExperienceDraft {
    pub kind: Option<String>,
    pub company: Option<String>,
    pub position: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub compensation: Option<String>,
    pub description: Option<String>,
    pub technologies: Option<Vec<String>>,
}

impl SubmissionDetails for ExperienceDetails {
    type Draft = ExperienceDraft;

    fn from_draft(draft: ExperienceDraft) -> Result<Self, ValidationError> {
        let mut required = RequiredFields::new();
        let kind = required.text("kind", draft.kind);
        let company = required.text("company", draft.company);
        let position = required.text("position", draft.position);
        let start_date = required.value("start_date", draft.start_date);

        let (Some(kind), Some(company), Some(position), Some(start_date)) =
            (kind, company, position, start_date)
        else {
            return Err(required.into_error());
        };

        if draft.end_date.is_some_and(|end| end < start_date) {
            return Err(ValidationError::invalid(
                "end_date",
                "end date is before the start date",
            ));
        }

        Ok(Self {
            kind: parse_catalog("kind", &kind)?,
            company,
            position,
            start_date,
            end_date: draft.end_date,
            location: optional_text(draft.location),
            compensation: optional_text(draft.compensation),
            description: optional_text(draft.description),
            technologies: draft.technologies.unwrap_or_default(),
        })
    }

    fn title(&self) -> String {
        format!("{} at {}", self.position, self.company)
    }

    fn category(&self) -> &'static str {
        self.kind.as_str()
    }

    fn matches(&self, needle: &str) -> bool {
        contains_ci(&self.company, needle)
            || contains_ci(&self.position, needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| contains_ci(d, needle))
            || self.technologies.iter().any(|t| t.to_lowercase() == needle)
    }
}
