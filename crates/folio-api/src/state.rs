//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! ## Architecture
//!
//! - **In-memory stores** are the read path for every query.
//! - **Postgres** (optional) is written through on every business write and
//!   read back once at startup by [`AppState::hydrate_from_db`].
//! - **Responder** produces assistant replies (backend or fallback).
//! - **FileStorage** writes uploaded certificate files to disk.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use folio_assistant::Responder;
use folio_core::{
    AssistantCategory, MessageRole, NotificationSeverity, Proficiency, SkillCategory, StudentId,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::profile::StudentProfile;
use crate::submission::{AchievementRecord, CertificateRecord, ExperienceRecord};
use crate::uploads::FileStorage;

// -- Generic In-Memory Store --------------------------------------------------

/// Thread-safe, cloneable in-memory key-value store.
///
/// All operations are synchronous (the RwLock is `parking_lot`, not `tokio::sync`)
/// because the lock is never held across `.await` points.
#[derive(Debug)]
pub struct Store<T: Clone + Send + Sync> {
    data: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T: Clone + Send + Sync> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: Clone + Send + Sync> Store<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: Uuid, value: T) -> Option<T> {
        self.data.write().insert(id, value)
    }

    /// Retrieve a record by ID.
    pub fn get(&self, id: &Uuid) -> Option<T> {
        self.data.read().get(id).cloned()
    }

    /// List all records.
    pub fn list(&self) -> Vec<T> {
        self.data.read().values().cloned().collect()
    }

    /// All records matching `pred`.
    pub fn filter(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        self.data
            .read()
            .values()
            .filter(|v| pred(v))
            .cloned()
            .collect()
    }

    /// First record matching `pred`, in unspecified order.
    pub fn find(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        self.data.read().values().find(|v| pred(v)).cloned()
    }

    /// Update a record in place. Returns the updated record, or `None` if not found.
    pub fn update(&self, id: &Uuid, f: impl FnOnce(&mut T)) -> Option<T> {
        let mut guard = self.data.write();
        if let Some(entry) = guard.get_mut(id) {
            f(entry);
            Some(entry.clone())
        } else {
            None
        }
    }

    /// Atomically read-validate-update a record.
    ///
    /// The closure runs under a single write lock. Returns `None` if the
    /// record doesn't exist, or `Some(result)` with the closure's `Result`.
    pub fn try_update<R, E>(
        &self,
        id: &Uuid,
        f: impl FnOnce(&mut T) -> Result<R, E>,
    ) -> Option<Result<R, E>> {
        self.data.write().get_mut(id).map(f)
    }

    /// Atomically check-then-remove a record.
    ///
    /// The record is removed only if `check` returns `Ok`.
    pub fn try_remove<E>(
        &self,
        id: &Uuid,
        check: impl FnOnce(&T) -> Result<(), E>,
    ) -> Option<Result<T, E>> {
        let mut guard = self.data.write();
        if let Err(e) = check(guard.get(id)?) {
            return Some(Err(e));
        }
        guard.remove(id).map(Ok)
    }

    /// Update the first record matching `matches`, or insert a new one.
    ///
    /// Runs under one write lock, so concurrent calls for the same key never
    /// produce two records. Returns the stored record and the value it
    /// replaced, `None` when it was created.
    pub fn upsert_where(
        &self,
        matches: impl Fn(&T) -> bool,
        update: impl FnOnce(&mut T),
        create: impl FnOnce() -> (Uuid, T),
    ) -> (T, Option<T>) {
        let mut guard = self.data.write();
        if let Some(existing) = guard.values_mut().find(|v| matches(v)) {
            let previous = existing.clone();
            update(existing);
            return (existing.clone(), Some(previous));
        }
        let (id, value) = create();
        guard.insert(id, value.clone());
        (value, None)
    }

    /// Undo an in-memory write whose database write failed: put `previous`
    /// back, or drop the key when the write had created it.
    pub fn restore(&self, id: Uuid, previous: Option<T>) {
        let mut guard = self.data.write();
        match previous {
            Some(value) => {
                guard.insert(id, value);
            }
            None => {
                guard.remove(&id);
            }
        }
    }

    /// Remove a record by ID.
    pub fn remove(&self, id: &Uuid) -> Option<T> {
        self.data.write().remove(id)
    }

    /// Check if a record exists.
    pub fn contains(&self, id: &Uuid) -> bool {
        self.data.read().contains_key(id)
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + Sync> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Record Types -------------------------------------------------------------

/// A student profile linked to an identity-provider subject.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudentRecord {
    pub id: StudentId,
    /// Identity-provider subject this profile belongs to. Unique.
    pub user_id: String,
    #[serde(flatten)]
    pub profile: StudentProfile,
    /// All required fields plus admission date are present.
    pub profile_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StudentRecord {
    /// "First Last".
    pub fn full_name(&self) -> String {
        format!("{} {}", self.profile.first_name, self.profile.last_name)
    }
}

/// Catalog skill.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SkillRecord {
    pub id: Uuid,
    pub name: String,
    pub category: SkillCategory,
    pub created_at: DateTime<Utc>,
}

/// Association between a student and a catalog skill. Unique per (student, skill).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudentSkillRecord {
    pub id: Uuid,
    pub student_id: StudentId,
    pub skill_id: Uuid,
    pub skill_name: String,
    pub skill_category: SkillCategory,
    pub proficiency: Proficiency,
    pub acquired_date: Option<NaiveDate>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User-facing notification.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationRecord {
    pub id: Uuid,
    pub student_id: StudentId,
    pub title: String,
    pub message: String,
    pub severity: NotificationSeverity,
    pub category: Option<String>,
    /// Entity the notification is about, if any.
    pub related_id: Option<Uuid>,
    pub read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Append-only activity log entry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActivityRecord {
    pub id: Uuid,
    pub student_id: StudentId,
    pub action: String,
    pub category: Option<String>,
    #[schema(value_type = Object)]
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// One message in an assistant conversation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageRecord {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    /// For assistant messages: `fallback` or the backend model name.
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Assistant conversation with its messages oldest-first.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConversationRecord {
    pub id: Uuid,
    pub student_id: StudentId,
    pub title: String,
    pub category: AssistantCategory,
    pub messages: Vec<MessageRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// -- Configuration ------------------------------------------------------------

/// Application configuration.
///
/// Custom `Debug` redacts `auth_token`.
#[derive(Clone)]
pub struct AppConfig {
    pub port: u16,
    pub auth_token: Option<String>,
    /// Directory uploaded files are written under.
    pub upload_dir: PathBuf,
    /// URL prefix the upload directory is served from.
    pub upload_public_prefix: String,
    pub max_upload_bytes: usize,
    pub metrics_enabled: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("upload_dir", &self.upload_dir)
            .field("upload_public_prefix", &self.upload_public_prefix)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("metrics_enabled", &self.metrics_enabled)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
            upload_dir: PathBuf::from("./public/uploads"),
            upload_public_prefix: "/uploads".to_string(),
            max_upload_bytes: crate::uploads::MAX_UPLOAD_BYTES,
            metrics_enabled: true,
        }
    }
}

impl AppConfig {
    /// Build configuration from environment variables, falling back to defaults.
    ///
    /// `PORT`, `AUTH_TOKEN`, `UPLOAD_DIR`, `UPLOAD_PUBLIC_PREFIX`,
    /// `FOLIO_METRICS_ENABLED`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            auth_token: std::env::var("AUTH_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
            upload_dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            upload_public_prefix: std::env::var("UPLOAD_PUBLIC_PREFIX")
                .unwrap_or(defaults.upload_public_prefix),
            max_upload_bytes: defaults.max_upload_bytes,
            metrics_enabled: std::env::var("FOLIO_METRICS_ENABLED")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
        }
    }
}

// -- Application State --------------------------------------------------------

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub students: Store<StudentRecord>,
    pub certificates: Store<CertificateRecord>,
    pub achievements: Store<AchievementRecord>,
    pub experiences: Store<ExperienceRecord>,
    pub skills: Store<SkillRecord>,
    pub student_skills: Store<StudentSkillRecord>,
    pub notifications: Store<NotificationRecord>,
    pub activity: Store<ActivityRecord>,
    pub conversations: Store<ConversationRecord>,
    /// Present when `DATABASE_URL` is configured.
    pub db_pool: Option<PgPool>,
    pub responder: Responder,
    pub files: FileStorage,
    pub config: AppConfig,
}

impl AppState {
    /// In-memory state with default configuration and the fallback responder.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default(), Responder::fallback_only(), None)
    }

    /// State with the given configuration, responder and optional database pool.
    pub fn with_config(config: AppConfig, responder: Responder, db_pool: Option<PgPool>) -> Self {
        let files = FileStorage::new(
            config.upload_dir.clone(),
            config.upload_public_prefix.clone(),
            config.max_upload_bytes,
        );
        Self {
            students: Store::new(),
            certificates: Store::new(),
            achievements: Store::new(),
            experiences: Store::new(),
            skills: Store::new(),
            student_skills: Store::new(),
            notifications: Store::new(),
            activity: Store::new(),
            conversations: Store::new(),
            db_pool,
            responder,
            files,
            config,
        }
    }

    /// Resolve an identity-provider subject to its student profile.
    pub fn student_by_user(&self, user_id: &str) -> Option<StudentRecord> {
        self.students.find(|s| s.user_id == user_id)
    }

    /// Hydrate in-memory stores from the database.
    ///
    /// Called once on startup when a database pool is available.
    pub async fn hydrate_from_db(&self) -> Result<(), sqlx::Error> {
        let pool = match &self.db_pool {
            Some(pool) => pool,
            None => return Ok(()),
        };

        let students = crate::db::students::load_all(pool).await?;
        let student_count = students.len();
        for record in students {
            self.students.insert(*record.id.as_uuid(), record);
        }

        let certificates = crate::db::submissions::load_all::<CertificateRecord>(pool).await?;
        let achievements = crate::db::submissions::load_all::<AchievementRecord>(pool).await?;
        let experiences = crate::db::submissions::load_all::<ExperienceRecord>(pool).await?;
        let submission_count = certificates.len() + achievements.len() + experiences.len();
        for record in certificates {
            self.certificates.insert(record.id, record);
        }
        for record in achievements {
            self.achievements.insert(record.id, record);
        }
        for record in experiences {
            self.experiences.insert(record.id, record);
        }

        for record in crate::db::skills::load_catalog(pool).await? {
            self.skills.insert(record.id, record);
        }
        for record in crate::db::skills::load_associations(pool).await? {
            self.student_skills.insert(record.id, record);
        }

        let notifications = crate::db::notifications::load_all(pool).await?;
        let notification_count = notifications.len();
        for record in notifications {
            self.notifications.insert(record.id, record);
        }

        for record in crate::db::activity::load_all(pool).await? {
            self.activity.insert(record.id, record);
        }

        let conversations = crate::db::conversations::load_all(pool).await?;
        let conversation_count = conversations.len();
        for record in conversations {
            self.conversations.insert(record.id, record);
        }

        tracing::info!(
            students = student_count,
            submissions = submission_count,
            skills = self.skills.len(),
            notifications = notification_count,
            activity = self.activity.len(),
            conversations = conversation_count,
            "Hydrated in-memory stores from database"
        );

        Ok(())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
