//! # Error Types: Structured Error Hierarchy
//!
//! Business operations return [`FolioError`]. The variants are the
//! categories the HTTP boundary maps to status codes:
//!
//! - `Validation`: missing or malformed caller input, names the fields.
//! - `NotFound`: missing *or not owned*. The two are never distinguished.
//! - `Conflict`: the operation is incompatible with current state.
//! - `Dependency`: file storage or completion backend failed. The detail
//!   is for logs only.
//! - `Persistence`: the write-through database write failed.

use thiserror::Error;

/// Top-level error type for business operations.
#[derive(Error, Debug)]
pub enum FolioError {
    /// Caller input was missing or malformed.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Entity does not exist or is not owned by the caller.
    #[error("{0} not found")]
    NotFound(String),

    /// Operation conflicts with the entity's current state.
    #[error("{0}")]
    Conflict(String),

    /// An external collaborator failed.
    #[error("dependency failure: {0}")]
    Dependency(String),

    /// The database write backing a business operation failed.
    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl FolioError {
    /// Shorthand for a not-found error on the given noun.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}

/// Rejected caller input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// One or more required fields were absent or blank.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// A field was present but unacceptable.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// Offending field name.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ValidationError {
    /// Build an [`ValidationError::InvalidField`].
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Names of the offending fields.
    pub fn fields(&self) -> Vec<String> {
        match self {
            Self::MissingFields(fields) => fields.clone(),
            Self::InvalidField { field, .. } => vec![field.clone()],
        }
    }
}

/// Collects missing required fields so all of them are reported at once.
///
/// ```
/// use folio_core::RequiredFields;
///
/// let mut required = RequiredFields::new();
/// let title = required.text("title", Some("Rust".to_string()));
/// let issuer = required.text("issuer", Some("   ".to_string()));
/// assert!(title.is_some());
/// assert!(issuer.is_none());
/// assert_eq!(required.into_error().fields(), vec!["issuer".to_string()]);
/// ```
#[derive(Debug, Default)]
pub struct RequiredFields {
    missing: Vec<String>,
}

impl RequiredFields {
    /// Start an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a non-blank string. Returns the trimmed value.
    pub fn text(&mut self, name: &str, value: Option<String>) -> Option<String> {
        match value {
            Some(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
            _ => {
                self.missing.push(name.to_string());
                None
            }
        }
    }

    /// Require any present value.
    pub fn value<T>(&mut self, name: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.missing.push(name.to_string());
        }
        value
    }

    /// Whether nothing has been reported missing.
    pub fn is_satisfied(&self) -> bool {
        self.missing.is_empty()
    }

    /// Convert the collected names into a [`ValidationError`].
    pub fn into_error(self) -> ValidationError {
        ValidationError::MissingFields(self.missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_message_lists_all_names() {
        let err = ValidationError::MissingFields(vec!["issuer".into(), "category".into()]);
        assert_eq!(err.to_string(), "Missing required fields: issuer, category");
        assert_eq!(err.fields(), vec!["issuer", "category"]);
    }

    #[test]
    fn invalid_field_reports_single_name() {
        let err = ValidationError::invalid("end_date", "must not precede start_date");
        assert_eq!(err.fields(), vec!["end_date"]);
        assert!(err.to_string().contains("end_date"));
    }

    #[test]
    fn required_fields_collects_in_call_order() {
        let mut required = RequiredFields::new();
        assert!(required.text("title", None).is_none());
        assert_eq!(required.value("file_size", Some(42u64)), Some(42));
        assert!(required.value::<u64>("issue_date", None).is_none());
        assert!(!required.is_satisfied());
        assert_eq!(required.into_error().fields(), vec!["title", "issue_date"]);
    }

    #[test]
    fn required_text_trims_value() {
        let mut required = RequiredFields::new();
        assert_eq!(required.text("title", Some("  AWS  ".into())).as_deref(), Some("AWS"));
        assert!(required.is_satisfied());
    }

    #[test]
    fn validation_converts_into_folio_error() {
        let err: FolioError = ValidationError::MissingFields(vec!["issuer".into()]).into();
        assert!(matches!(err, FolioError::Validation(_)));
        assert!(err.to_string().contains("issuer"));
    }

    #[test]
    fn not_found_message() {
        assert_eq!(FolioError::not_found("certificate").to_string(), "certificate not found");
    }
}
