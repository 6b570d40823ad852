//! # Assistant Chat
//!
//! Conversation bookkeeping around the [`folio_assistant::Responder`].
//!
//! The user message is stored before a reply is requested. If the reply
//! fails the call fails with a dependency error and the user message stays;
//! nothing is retried.

use chrono::Utc;
use folio_assistant::{ChatTurn, ProfileDigest, ReplySource};
use folio_core::{
    AssistantCategory, ExperienceKind, FolioError, MessageRole, RequiredFields, StudentId,
    UnknownVariant, ValidationError,
};
use folio_state::VerificationStatus;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db;
use crate::skills;
use crate::state::{AppState, ConversationRecord, MessageRecord, StudentRecord};

/// Title given to conversations started without an id.
pub const NEW_CONVERSATION_TITLE: &str = "AI Chat Session";

/// A message sent to the assistant.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ChatRequest {
    pub message: Option<String>,
    /// Continue this conversation; omit to start a new one.
    pub conversation_id: Option<Uuid>,
    /// Topic; defaults to the conversation's, or GENERAL_ADVICE.
    pub category: Option<String>,
}

/// Outcome of one exchange.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChatResponse {
    pub conversation_id: Uuid,
    /// The assistant's reply text.
    pub message: String,
    /// `fallback` or the backend model that answered.
    pub source: String,
    /// The conversation including both new messages.
    pub conversation: ConversationRecord,
}

/// One conversation in a listing.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ConversationSummary {
    pub id: Uuid,
    pub title: String,
    pub category: AssistantCategory,
    pub message_count: usize,
    pub latest_message: Option<MessageRecord>,
    pub updated_at: chrono::DateTime<Utc>,
}

/// Summarize a student's profile for the assistant. Only VERIFIED
/// certificates and achievements are named.
pub fn build_digest(state: &AppState, student: &StudentRecord) -> ProfileDigest {
    let owner = student.id;
    let certificates = state
        .certificates
        .filter(|c| c.student_id == owner && c.verification.status == VerificationStatus::Verified)
        .into_iter()
        .map(|c| c.details.title)
        .collect();
    let achievements = state
        .achievements
        .filter(|a| a.student_id == owner && a.verification.status == VerificationStatus::Verified)
        .into_iter()
        .map(|a| a.details.title)
        .collect();
    let experiences = state.experiences.filter(|e| e.student_id == owner);
    let count = |kind| experiences.iter().filter(|e| e.details.kind == kind).count();

    ProfileDigest {
        name: student.full_name(),
        department: student.profile.department.clone(),
        course: student.profile.course.clone(),
        year: Some(student.profile.year),
        semester: Some(student.profile.semester),
        gpa: student.profile.current_gpa,
        skills: skills::list_for_student(state, owner)
            .into_iter()
            .map(|s| (s.skill_name, s.proficiency))
            .collect(),
        certificates,
        achievements,
        jobs: count(ExperienceKind::Job),
        internships: count(ExperienceKind::Internship),
    }
}

/// Send a message and store both it and the reply.
pub async fn send(
    state: &AppState,
    student: &StudentRecord,
    request: ChatRequest,
) -> Result<ChatResponse, FolioError> {
    let owner = student.id;
    let mut required = RequiredFields::new();
    let Some(message) = required.text("message", request.message) else {
        return Err(required.into_error().into());
    };
    let requested_category = request
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(|c| {
            c.to_ascii_uppercase()
                .parse::<AssistantCategory>()
                .map_err(|e: UnknownVariant| ValidationError::invalid("category", e.to_string()))
        })
        .transpose()?;

    let conversation = match request.conversation_id {
        Some(id) => get_conversation(state, owner, id)?,
        None => start_conversation(state, owner, requested_category.unwrap_or_default()).await?,
    };
    let category = requested_category.unwrap_or(conversation.category);

    let history: Vec<ChatTurn> = conversation
        .messages
        .iter()
        .map(|m| ChatTurn {
            role: m.role,
            content: m.content.clone(),
        })
        .collect();

    append_message(state, conversation.id, MessageRole::User, &message, None).await?;

    let digest = build_digest(state, student);
    let reply = state
        .responder
        .respond(category, &digest, &history, &message)
        .await
        .map_err(|e| {
            tracing::error!(
                student_id = %owner,
                conversation_id = %conversation.id,
                error = %e,
                "assistant reply failed"
            );
            FolioError::Dependency(format!("assistant reply failed: {e}"))
        })?;

    let source = reply.source.label().to_string();
    append_message(
        state,
        conversation.id,
        MessageRole::Assistant,
        &reply.text,
        Some(source.clone()),
    )
    .await?;
    let path = match reply.source {
        ReplySource::Backend { .. } => "backend",
        ReplySource::Fallback => "fallback",
    };
    metrics::counter!("folio_assistant_replies_total", "source" => path).increment(1);

    let conversation = get_conversation(state, owner, conversation.id)?;
    Ok(ChatResponse {
        conversation_id: conversation.id,
        message: reply.text,
        source,
        conversation,
    })
}

/// One of the owner's conversations with its messages oldest-first.
pub fn get_conversation(
    state: &AppState,
    owner: StudentId,
    id: Uuid,
) -> Result<ConversationRecord, FolioError> {
    state
        .conversations
        .get(&id)
        .filter(|c| c.student_id == owner)
        .ok_or_else(|| FolioError::not_found("conversation"))
}

/// The owner's conversations, most recently active first.
pub fn list_conversations(state: &AppState, owner: StudentId) -> Vec<ConversationSummary> {
    let mut items: Vec<ConversationSummary> = state
        .conversations
        .filter(|c| c.student_id == owner)
        .into_iter()
        .map(|c| ConversationSummary {
            id: c.id,
            title: c.title,
            category: c.category,
            message_count: c.messages.len(),
            latest_message: c.messages.last().cloned(),
            updated_at: c.updated_at,
        })
        .collect();
    items.sort_by_key(|c| std::cmp::Reverse(c.updated_at));
    items
}

async fn start_conversation(
    state: &AppState,
    owner: StudentId,
    category: AssistantCategory,
) -> Result<ConversationRecord, FolioError> {
    let now = Utc::now();
    let record = ConversationRecord {
        id: Uuid::new_v4(),
        student_id: owner,
        title: NEW_CONVERSATION_TITLE.to_string(),
        category,
        messages: Vec::new(),
        created_at: now,
        updated_at: now,
    };
    if let Some(pool) = &state.db_pool {
        db::conversations::insert(pool, &record)
            .await
            .map_err(db::persistence_error("conversation"))?;
    }
    state.conversations.insert(record.id, record.clone());
    tracing::info!(student_id = %owner, conversation_id = %record.id, "conversation started");
    Ok(record)
}

async fn append_message(
    state: &AppState,
    conversation_id: Uuid,
    role: MessageRole,
    content: &str,
    source: Option<String>,
) -> Result<MessageRecord, FolioError> {
    let message = MessageRecord {
        id: Uuid::new_v4(),
        conversation_id,
        role,
        content: content.to_string(),
        source,
        created_at: Utc::now(),
    };
    let previous_updated_at = state
        .conversations
        .try_update(&conversation_id, |c| {
            let previous = c.updated_at;
            c.messages.push(message.clone());
            c.updated_at = message.created_at;
            Ok::<_, FolioError>(previous)
        })
        .ok_or_else(|| FolioError::not_found("conversation"))??;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = db::conversations::insert_message(pool, &message).await {
            // Take back only this message; a concurrent append stays.
            state.conversations.update(&conversation_id, |c| {
                c.messages.retain(|m| m.id != message.id);
                if c.updated_at == message.created_at {
                    c.updated_at = previous_updated_at;
                }
            });
            return Err(db::persistence_error("conversation message")(e));
        }
    }
    Ok(message)
}
