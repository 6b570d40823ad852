//! # Verification State Machine
//!
//! Status, verifier stamp, timestamp and rejection reason are always
//! changed together by a single method call, so a caller holding the
//! record's write lock can never observe a half-applied decision.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use folio_core::{FolioError, ValidationError};

// ─── Status ──────────────────────────────────────────────────────────

/// Lifecycle stage of a submitted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    /// Submitted or resubmitted, awaiting a verifier.
    Pending,
    /// A verifier has picked the record up.
    UnderReview,
    /// Accepted into the official record (terminal).
    Verified,
    /// Declined with a reason. The owner may edit and resubmit.
    Rejected,
}

impl VerificationStatus {
    /// Wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::UnderReview => "UNDER_REVIEW",
            Self::Verified => "VERIFIED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Whether a verifier may still decide on a record in this state.
    pub fn is_awaiting_decision(&self) -> bool {
        matches!(self, Self::Pending | Self::UnderReview)
    }
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationStatus {
    type Err = VerificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "UNDER_REVIEW" => Ok(Self::UnderReview),
            "VERIFIED" => Ok(Self::Verified),
            "REJECTED" => Ok(Self::Rejected),
            other => Err(VerificationError::UnknownStatus(other.to_string())),
        }
    }
}

// ─── Decision ────────────────────────────────────────────────────────

/// Outcome a verifier may record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationDecision {
    /// Accept the submission.
    Verified,
    /// Decline the submission. Requires a reason.
    Rejected,
}

impl VerificationDecision {
    /// Status the record ends up in.
    pub fn target(&self) -> VerificationStatus {
        match self {
            Self::Verified => VerificationStatus::Verified,
            Self::Rejected => VerificationStatus::Rejected,
        }
    }
}

impl FromStr for VerificationDecision {
    type Err = VerificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VERIFIED" => Ok(Self::Verified),
            "REJECTED" => Ok(Self::Rejected),
            other => Err(VerificationError::UnknownDecision(other.to_string())),
        }
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors raised by lifecycle rules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    /// The record is verified and can no longer change.
    #[error("cannot {action} a verified {noun}")]
    Locked {
        /// What was attempted (`update`, `delete`).
        action: &'static str,
        /// Record noun used in the message.
        noun: &'static str,
    },

    /// The record was already verified.
    #[error("record is already verified")]
    AlreadyVerified,

    /// Transition is not allowed from the current state.
    #[error("invalid verification transition: {from} -> {to}")]
    InvalidTransition {
        /// Current state.
        from: VerificationStatus,
        /// Attempted target.
        to: VerificationStatus,
    },

    /// REJECTED was chosen without a reason.
    #[error("a rejection reason is required")]
    MissingRejectionReason,

    /// Decision string was not VERIFIED or REJECTED.
    #[error("decision must be VERIFIED or REJECTED, got {0}")]
    UnknownDecision(String),

    /// Status string did not name a lifecycle stage.
    #[error("unknown verification status: {0}")]
    UnknownStatus(String),
}

impl From<VerificationError> for FolioError {
    fn from(err: VerificationError) -> Self {
        match err {
            VerificationError::MissingRejectionReason => FolioError::Validation(
                ValidationError::invalid("rejection_reason", err.to_string()),
            ),
            VerificationError::UnknownDecision(_) => {
                FolioError::Validation(ValidationError::invalid("decision", err.to_string()))
            }
            VerificationError::UnknownStatus(_) => {
                FolioError::Validation(ValidationError::invalid("status", err.to_string()))
            }
            VerificationError::Locked { .. }
            | VerificationError::AlreadyVerified
            | VerificationError::InvalidTransition { .. } => FolioError::Conflict(err.to_string()),
        }
    }
}

// ─── Verification Block ──────────────────────────────────────────────

/// Verification fields embedded in every submission record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Verification {
    /// Current lifecycle stage.
    #[serde(rename = "verification_status")]
    pub status: VerificationStatus,
    /// Identity of the verifier who last decided or picked up the record.
    pub verified_by: Option<String>,
    /// When the last decision was recorded.
    pub verified_at: Option<DateTime<Utc>>,
    /// Reason given for a rejection, shown verbatim to the owner.
    pub rejection_reason: Option<String>,
}

impl Default for Verification {
    fn default() -> Self {
        Self::pending()
    }
}

impl Verification {
    /// A freshly submitted record.
    pub fn pending() -> Self {
        Self {
            status: VerificationStatus::Pending,
            verified_by: None,
            verified_at: None,
            rejection_reason: None,
        }
    }

    /// Pick the record up for review (PENDING → UNDER_REVIEW).
    pub fn begin_review(&mut self, verifier: &str) -> Result<(), VerificationError> {
        match self.status {
            VerificationStatus::Pending => {
                self.status = VerificationStatus::UnderReview;
                self.verified_by = Some(verifier.to_string());
                Ok(())
            }
            VerificationStatus::Verified => Err(VerificationError::AlreadyVerified),
            from => Err(VerificationError::InvalidTransition {
                from,
                to: VerificationStatus::UnderReview,
            }),
        }
    }

    /// Record a verifier decision (PENDING | UNDER_REVIEW → VERIFIED | REJECTED).
    ///
    /// A rejection must carry a non-blank reason. The reason is discarded on
    /// acceptance.
    pub fn decide(
        &mut self,
        decision: VerificationDecision,
        verifier: &str,
        reason: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<(), VerificationError> {
        match self.status {
            VerificationStatus::Verified => return Err(VerificationError::AlreadyVerified),
            VerificationStatus::Rejected => {
                return Err(VerificationError::InvalidTransition {
                    from: VerificationStatus::Rejected,
                    to: decision.target(),
                })
            }
            VerificationStatus::Pending | VerificationStatus::UnderReview => {}
        }

        let rejection_reason = match decision {
            VerificationDecision::Verified => None,
            VerificationDecision::Rejected => match reason.map(str::trim) {
                Some(r) if !r.is_empty() => Some(r.to_string()),
                _ => return Err(VerificationError::MissingRejectionReason),
            },
        };

        self.status = decision.target();
        self.verified_by = Some(verifier.to_string());
        self.verified_at = Some(at);
        self.rejection_reason = rejection_reason;
        Ok(())
    }

    /// Refuse owner mutation of a verified record.
    pub fn ensure_owner_mutable(
        &self,
        action: &'static str,
        noun: &'static str,
    ) -> Result<(), VerificationError> {
        if self.status == VerificationStatus::Verified {
            Err(VerificationError::Locked { action, noun })
        } else {
            Ok(())
        }
    }

    /// Reopen after an owner edit: back to PENDING with the stamp cleared.
    pub fn reopen(&mut self) {
        *self = Self::pending();
    }
}
