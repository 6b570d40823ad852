//! Assistant conversation persistence.
//!
//! Operates on the `conversations` and `conversation_messages` tables.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use folio_core::{AssistantCategory, MessageRole};
use sqlx::PgPool;
use uuid::Uuid;

use crate::state::{ConversationRecord, MessageRecord};

/// Insert a new (empty) conversation.
pub async fn insert(pool: &PgPool, record: &ConversationRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO conversations (id, student_id, title, category, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(record.id)
    .bind(*record.student_id.as_uuid())
    .bind(&record.title)
    .bind(record.category.as_str())
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Append a message and bump the conversation's `updated_at`.
pub async fn insert_message(pool: &PgPool, message: &MessageRecord) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO conversation_messages (id, conversation_id, role, content, source, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(message.id)
    .bind(message.conversation_id)
    .bind(message.role.as_str())
    .bind(&message.content)
    .bind(&message.source)
    .bind(message.created_at)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE conversations SET updated_at = $1 WHERE id = $2")
        .bind(message.created_at)
        .bind(message.conversation_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await
}

/// Load every conversation with its messages oldest-first.
pub async fn load_all(pool: &PgPool) -> Result<Vec<ConversationRecord>, sqlx::Error> {
    let conversations = sqlx::query_as::<_, ConversationRow>(
        "SELECT id, student_id, title, category, created_at, updated_at
         FROM conversations ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    let messages = sqlx::query_as::<_, MessageRow>(
        "SELECT id, conversation_id, role, content, source, created_at
         FROM conversation_messages ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    let mut by_conversation: HashMap<Uuid, Vec<MessageRecord>> = HashMap::new();
    for row in messages {
        if let Some(message) = row.into_record() {
            by_conversation
                .entry(message.conversation_id)
                .or_default()
                .push(message);
        }
    }

    Ok(conversations
        .into_iter()
        .filter_map(|row| {
            let messages = by_conversation.remove(&row.id).unwrap_or_default();
            row.into_record(messages)
        })
        .collect())
}

#[derive(sqlx::FromRow)]
struct ConversationRow {
    id: Uuid,
    student_id: Uuid,
    title: String,
    category: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ConversationRow {
    fn into_record(self, messages: Vec<MessageRecord>) -> Option<ConversationRecord> {
        let category: AssistantCategory = match self.category.parse() {
            Ok(c) => c,
            Err(_) => {
                tracing::warn!(
                    id = %self.id,
                    category = %self.category,
                    "skipping conversation row with unknown category"
                );
                return None;
            }
        };
        Some(ConversationRecord {
            id: self.id,
            student_id: self.student_id.into(),
            title: self.title,
            category,
            messages,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    conversation_id: Uuid,
    role: String,
    content: String,
    source: Option<String>,
    created_at: DateTime<Utc>,
}

impl MessageRow {
    fn into_record(self) -> Option<MessageRecord> {
        let role: MessageRole = match self.role.parse() {
            Ok(r) => r,
            Err(_) => {
                tracing::warn!(id = %self.id, role = %self.role, "skipping message row with unknown role");
                return None;
            }
        };
        Some(MessageRecord {
            id: self.id,
            conversation_id: self.conversation_id,
            role,
            content: self.content,
            source: self.source,
            created_at: self.created_at,
        })
    }
}
