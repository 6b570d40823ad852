//! # Closed Catalogs
//!
//! Every enumerated vocabulary the service accepts from clients. Each enum
//! has exactly one wire spelling, used by serde, by the database layer
//! (`as_str` / `FromStr`) and by `Display`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// A string did not name any variant of a catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {catalog} value: {value}")]
pub struct UnknownVariant {
    /// Catalog that was being parsed.
    pub catalog: &'static str,
    /// The rejected input.
    pub value: String,
}

macro_rules! catalog {
    (
        $(#[$meta:meta])*
        $name:ident ($label:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
        )]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire spelling of this variant.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $wire, )+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $wire => Ok(Self::$variant), )+
                    other => Err(UnknownVariant {
                        catalog: $label,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

catalog! {
    /// Subject area of an uploaded certificate.
    CertificateCategory ("certificate category") {
        /// Technical or engineering certification.
        Technical => "TECHNICAL",
        /// Communication, teamwork and similar.
        SoftSkills => "SOFT_SKILLS",
        /// Language proficiency.
        Language => "LANGUAGE",
        /// Professional body certification.
        Professional => "PROFESSIONAL",
        /// Academic course completion.
        Academic => "ACADEMIC",
        /// Workshop attendance.
        Workshop => "WORKSHOP",
        /// Conference participation.
        Conference => "CONFERENCE",
        /// Competition result.
        Competition => "COMPETITION",
        /// Anything else.
        Other => "OTHER",
    }
}

catalog! {
    /// Domain of an achievement.
    AchievementCategory ("achievement category") {
        /// Academic distinction.
        Academic => "ACADEMIC",
        /// Technical accomplishment.
        Technical => "TECHNICAL",
        /// Sports.
        Sports => "SPORTS",
        /// Cultural activities.
        Cultural => "CULTURAL",
        /// Leadership roles.
        Leadership => "LEADERSHIP",
        /// Volunteering and community work.
        CommunityService => "COMMUNITY_SERVICE",
        /// Competition placement.
        Competition => "COMPETITION",
    }
}

catalog! {
    /// Reach of an achievement.
    AchievementLevel ("achievement level") {
        /// Within the student's own institution.
        Institutional => "INSTITUTIONAL",
        /// City or district.
        Local => "LOCAL",
        /// State or province.
        State => "STATE",
        /// National.
        National => "NATIONAL",
        /// International.
        International => "INTERNATIONAL",
    }
}

catalog! {
    /// Grouping of catalog skills.
    SkillCategory ("skill category") {
        /// Programming languages.
        Programming => "PROGRAMMING",
        /// Web frameworks and tooling.
        WebDevelopment => "WEB_DEVELOPMENT",
        /// Mobile platforms.
        MobileDevelopment => "MOBILE_DEVELOPMENT",
        /// Data analysis and machine learning.
        DataScience => "DATA_SCIENCE",
        /// Visual and product design.
        Design => "DESIGN",
        /// Written and spoken communication.
        Communication => "COMMUNICATION",
        /// Leading people and projects.
        Leadership => "LEADERSHIP",
        /// Anything else.
        Other => "OTHER",
    }
}

catalog! {
    /// Self-reported skill level.
    Proficiency ("proficiency") {
        /// Starting out.
        Beginner => "BEGINNER",
        /// Working knowledge.
        Intermediate => "INTERMEDIATE",
        /// Strong command.
        Advanced => "ADVANCED",
        /// Authority on the subject.
        Expert => "EXPERT",
    }
}

catalog! {
    /// Kind of an employment-style record.
    ExperienceKind ("experience kind") {
        /// Paid or full-time position.
        Job => "JOB",
        /// Internship.
        Internship => "INTERNSHIP",
        /// Any other experience (volunteering, freelance, research).
        Other => "OTHER",
    }
}

catalog! {
    /// Visual severity of a notification.
    NotificationSeverity ("notification severity") {
        /// Neutral information.
        Info => "INFO",
        /// Positive outcome.
        Success => "SUCCESS",
        /// Needs attention.
        Warning => "WARNING",
        /// Negative outcome.
        Error => "ERROR",
    }
}

catalog! {
    /// Topic a conversation with the assistant is tagged with.
    AssistantCategory ("assistant category") {
        /// Career direction.
        CareerGuidance => "CAREER_GUIDANCE",
        /// Which skills to learn next.
        SkillRecommendation => "SKILL_RECOMMENDATION",
        /// Resume writing.
        ResumeHelp => "RESUME_HELP",
        /// Interview preparation.
        InterviewPrep => "INTERVIEW_PREP",
        /// Job hunting.
        JobSearch => "JOB_SEARCH",
        /// Structured learning plans.
        LearningPath => "LEARNING_PATH",
        /// Project suggestions.
        ProjectIdeas => "PROJECT_IDEAS",
        /// Anything else.
        GeneralAdvice => "GENERAL_ADVICE",
    }
}

impl Default for AssistantCategory {
    fn default() -> Self {
        Self::GeneralAdvice
    }
}

catalog! {
    /// Author of a conversation message.
    MessageRole ("message role") {
        /// The student.
        User => "USER",
        /// The assistant.
        Assistant => "ASSISTANT",
    }
}

/// The three kinds of student submission that go through verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Uploaded certificate.
    Certificate,
    /// Achievement or award.
    Achievement,
    /// Job, internship or other experience.
    Experience,
}

impl RecordKind {
    /// Every kind.
    pub const ALL: &'static [RecordKind] = &[Self::Certificate, Self::Achievement, Self::Experience];

    /// Lowercase noun used in messages and activity actions.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Certificate => "certificate",
            Self::Achievement => "achievement",
            Self::Experience => "experience",
        }
    }

    /// Capitalized noun used in notification titles.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Certificate => "Certificate",
            Self::Achievement => "Achievement",
            Self::Experience => "Experience",
        }
    }

    /// Plural path segment and table name.
    pub fn plural(&self) -> &'static str {
        match self {
            Self::Certificate => "certificates",
            Self::Achievement => "achievements",
            Self::Experience => "experiences",
        }
    }

    /// Resolve a plural path segment such as `certificates`.
    pub fn from_plural(segment: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.plural() == segment)
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
