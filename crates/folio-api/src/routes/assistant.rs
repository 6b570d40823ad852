//! # Assistant Chat API
//!
//! - `POST /v1/ai/chat`: send a message, starting a conversation if needed
//! - `GET  /v1/ai/chat`: list conversations, or one with `?conversation_id=`

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::chat::{self, ChatRequest, ChatResponse, ConversationSummary};
use crate::error::AppError;
use crate::extractors::{extract_json, extract_query, CurrentStudent};
use crate::state::{AppState, ConversationRecord};

/// Build the assistant router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/ai/chat", get(get_conversations).post(send_message))
}

/// POST /v1/ai/chat
#[utoipa::path(
    post,
    path = "/v1/ai/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply", body = ChatResponse),
        (status = 400, description = "Blank message or unknown category", body = crate::error::ErrorBody),
        (status = 404, description = "Conversation not found", body = crate::error::ErrorBody),
        (status = 502, description = "Completion backend failed", body = crate::error::ErrorBody),
    ),
    tag = "assistant"
)]
pub async fn send_message(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let request = extract_json(body)?;
    Ok(Json(chat::send(&state, &student, request).await?))
}

/// Conversation lookup.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConversationParams {
    /// Return this conversation with all its messages.
    pub conversation_id: Option<Uuid>,
}

/// GET /v1/ai/chat
#[utoipa::path(
    get,
    path = "/v1/ai/chat",
    params(ConversationParams),
    responses(
        (status = 200, description = "Conversation summaries, or one conversation when an id is given", body = Vec<ConversationSummary>),
        (status = 404, description = "Conversation not found", body = crate::error::ErrorBody),
    ),
    tag = "assistant"
)]
pub async fn get_conversations(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    params: Result<Query<ConversationParams>, QueryRejection>,
) -> Result<Response, AppError> {
    match extract_query(params)?.conversation_id {
        Some(id) => {
            let conversation: ConversationRecord = chat::get_conversation(&state, student.id, id)?;
            Ok(Json(conversation).into_response())
        }
        None => Ok(Json(chat::list_conversations(&state, student.id)).into_response()),
    }
}
