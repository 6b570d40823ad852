//! # folio-state: Submission Verification Lifecycle
//!
//! Certificates, achievements and experiences share one lifecycle:
//!
//! ```text
//! PENDING ──▶ UNDER_REVIEW ──▶ VERIFIED
//!    │             │
//!    │             └─────────▶ REJECTED ──(owner edit)──▶ PENDING
//!    └──▶ VERIFIED / REJECTED
//! ```
//!
//! Only a verifier moves a record out of PENDING. The owner may edit any
//! record that is not VERIFIED, and an edit always reopens it as PENDING.
//! VERIFIED is terminal for both the verifier and the owner.
//!
//! The rules live on [`Verification`], the block embedded in every
//! submission record, so every caller goes through the same checks.

pub mod verification;

pub use verification::{
    Verification, VerificationDecision, VerificationError, VerificationStatus,
};
