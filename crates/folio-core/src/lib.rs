//! # folio-core: Foundational Types for the Portfolio Service
//!
//! Every other crate in the workspace depends on `folio-core`; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** A [`StudentId`] cannot be passed
//!    where a record id is expected. Ownership checks compare `StudentId`s,
//!    never raw UUIDs from request paths.
//!
//! 2. **Closed catalogs.** Categories, proficiency levels, severities and
//!    assistant topics are enums with a single wire spelling
//!    (`SCREAMING_SNAKE_CASE`). Unknown values fail deserialization.
//!
//! 3. **One error taxonomy.** [`FolioError`] is the vocabulary every
//!    business operation speaks: validation, not-found, conflict,
//!    dependency and persistence failures.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `folio-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

#![deny(missing_docs)]

pub mod catalog;
pub mod error;
pub mod identity;

pub use catalog::{
    AchievementCategory, AchievementLevel, AssistantCategory, CertificateCategory,
    ExperienceKind, MessageRole, NotificationSeverity, Proficiency, RecordKind, SkillCategory,
    UnknownVariant,
};
pub use error::{FolioError, RequiredFields, ValidationError};
pub use identity::StudentId;
