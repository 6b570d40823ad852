//! # OpenAPI Specification Assembly
//!
//! Collects every utoipa-documented handler into one OpenAPI 3.1 document
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

/// Assembled OpenAPI document for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Folio API: Student Portfolio Service",
        version = "0.1.0",
        description = "Certificates, achievements and experiences with a verification workflow, plus profile, skills, notifications, insights, portfolio export and an assistant chat."
    ),
    paths(
        // Profile
        crate::routes::profile::get_profile,
        crate::routes::profile::put_profile,
        crate::routes::profile::get_stats,
        crate::routes::profile::get_insights,
        crate::routes::profile::get_portfolio,
        crate::routes::profile::get_activity,
        // Certificates
        crate::routes::certificates::list_certificates,
        crate::routes::certificates::create_certificate,
        crate::routes::certificates::certificate_stats,
        crate::routes::certificates::get_certificate,
        crate::routes::certificates::update_certificate,
        crate::routes::certificates::delete_certificate,
        // Achievements
        crate::routes::achievements::list_achievements,
        crate::routes::achievements::create_achievement,
        crate::routes::achievements::get_achievement,
        crate::routes::achievements::update_achievement,
        crate::routes::achievements::delete_achievement,
        // Experiences
        crate::routes::experiences::list_experiences,
        crate::routes::experiences::create_experience,
        crate::routes::experiences::get_experience,
        crate::routes::experiences::update_experience,
        crate::routes::experiences::delete_experience,
        // Skills
        crate::routes::skills::list_catalog,
        crate::routes::skills::list_student_skills,
        crate::routes::skills::upsert_student_skill,
        // Notifications
        crate::routes::notifications::list_notifications,
        crate::routes::notifications::mark_notification_read,
        // Uploads
        crate::routes::uploads::upload_certificate,
        // Assistant
        crate::routes::assistant::send_message,
        crate::routes::assistant::get_conversations,
        // Admin
        crate::routes::admin::review_queue,
        crate::routes::admin::mark_under_review,
        crate::routes::admin::verify_submission,
    ),
    components(schemas(
        // Records
        crate::state::StudentRecord,
        crate::state::SkillRecord,
        crate::state::StudentSkillRecord,
        crate::state::NotificationRecord,
        crate::state::ActivityRecord,
        crate::state::MessageRecord,
        crate::state::ConversationRecord,
        crate::submission::CertificateRecord,
        crate::submission::AchievementRecord,
        crate::submission::ExperienceRecord,
        // Request bodies
        crate::profile::ProfileDraft,
        crate::submission::CertificateDraft,
        crate::submission::AchievementDraft,
        crate::submission::ExperienceDraft,
        crate::skills::SkillDraft,
        crate::chat::ChatRequest,
        crate::routes::admin::VerifyRequest,
        // Responses
        crate::profile::ProfileView,
        crate::dashboard::DashboardStats,
        crate::dashboard::CertificateStats,
        crate::dashboard::Insight,
        crate::portfolio::Portfolio,
        crate::chat::ChatResponse,
        crate::chat::ConversationSummary,
        crate::verification::ReviewItem,
        crate::uploads::StoredFile,
        // Lifecycle
        folio_state::VerificationStatus,
        folio_state::VerificationDecision,
        // Errors
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
    )),
    modifiers(&BearerAuth),
    security(("bearer_auth" = [])),
    tags(
        (name = "profile", description = "Student profile, stats, insights and portfolio"),
        (name = "certificates", description = "Certificate submissions"),
        (name = "achievements", description = "Achievement submissions"),
        (name = "experiences", description = "Experience submissions"),
        (name = "skills", description = "Skill catalog and student skills"),
        (name = "notifications", description = "Student notifications"),
        (name = "uploads", description = "Certificate file uploads"),
        (name = "assistant", description = "Assistant chat"),
        (name = "admin", description = "Verification workflow"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

/// Router serving the document at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_core_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/v1/student/profile",
            "/v1/student/certificates",
            "/v1/student/certificates/{id}",
            "/v1/student/certificates/stats",
            "/v1/admin/{kind}/{id}/verify",
            "/v1/ai/chat",
            "/v1/upload/certificate",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn document_declares_bearer_scheme() {
        let json = serde_json::to_value(ApiDoc::openapi()).unwrap();
        assert_eq!(
            json["components"]["securitySchemes"]["bearer_auth"]["scheme"],
            "bearer"
        );
    }
}
