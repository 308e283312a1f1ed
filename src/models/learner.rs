use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::catalog::TopicPath;
use crate::error::AppError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema, sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "progress_status", rename_all = "snake_case")]
#[ts(export)]
pub enum ProgressStatus {
    #[default]
    Planned,
    InProgress,
    Completed,
}

/// ProgressItem
///
/// Per-user, per-topic completion state. `completed_at` is only set while
/// the status is `completed`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct ProgressItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub topic_id: Uuid,
    pub status: ProgressStatus,
    #[ts(type = "string | null")]
    pub completed_at: Option<DateTime<Utc>>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct ProgressEntry {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub item: ProgressItem,
    #[sqlx(flatten)]
    pub topic: TopicPath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct ProgressStats {
    pub planned: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateProgressRequest {
    pub topic_id: Option<Uuid>,
    pub status: Option<ProgressStatus>,
}

impl UpdateProgressRequest {
    pub fn validate(&self) -> Result<(Uuid, ProgressStatus), AppError> {
        match (self.topic_id, self.status) {
            (Some(topic_id), Some(status)) => Ok((topic_id, status)),
            _ => Err(AppError::bad_request("topic_id and status are required")),
        }
    }
}

/// The result of a progress update, including any badges it unlocked.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ProgressUpdate {
    pub progress: ProgressItem,
    pub newly_awarded: Vec<Badge>,
}

// --- Bookmarks ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Bookmark {
    pub id: Uuid,
    pub user_id: Uuid,
    pub topic_id: Uuid,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct BookmarkEntry {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub bookmark: Bookmark,
    #[sqlx(flatten)]
    pub topic: TopicPath,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ToggleBookmarkRequest {
    pub topic_id: Option<Uuid>,
}

/// Outcome of a bookmark toggle. `bookmark` is set when the topic was just bookmarked.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct BookmarkToggle {
    pub bookmarked: bool,
    pub bookmark: Option<Bookmark>,
}

// --- Notes ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Note {
    pub id: Uuid,
    pub user_id: Uuid,
    pub topic_id: Uuid,
    pub content: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct NoteEntry {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub note: Note,
    #[sqlx(flatten)]
    pub topic: TopicPath,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct CreateNoteRequest {
    pub topic_id: Option<Uuid>,
    pub content: String,
}

impl CreateNoteRequest {
    pub fn validate(&self) -> Result<Uuid, AppError> {
        let topic_id = self
            .topic_id
            .ok_or_else(|| AppError::bad_request("topic_id is required"))?;
        if self.content.trim().is_empty() {
            return Err(AppError::bad_request("Note content must not be empty"));
        }
        Ok(topic_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct UpdateNoteRequest {
    pub content: String,
}

#[derive(Debug, Clone, Deserialize, IntoParams, Default)]
pub struct NotesQuery {
    /// Restrict the listing to notes on one topic.
    pub topic_id: Option<Uuid>,
}

// --- Badges ---

/// Badge
///
/// An achievement unlocked once a learner has completed `required_count` topics.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Badge {
    pub id: Uuid,
    pub slug: String,
    pub name_en: String,
    pub name_tr: String,
    pub description_en: Option<String>,
    pub description_tr: Option<String>,
    pub icon: Option<String>,
    pub required_count: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct UserBadge {
    pub id: Uuid,
    pub user_id: Uuid,
    pub badge_id: Uuid,
    #[ts(type = "string")]
    pub earned_at: DateTime<Utc>,
}

/// A badge held by a user, with the time it was earned.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct EarnedBadge {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub badge: Badge,
    #[ts(type = "string")]
    pub earned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct CreateBadgeRequest {
    pub slug: String,
    pub name_en: String,
    pub name_tr: String,
    pub description_en: Option<String>,
    pub description_tr: Option<String>,
    pub icon: Option<String>,
    pub required_count: Option<i32>,
}

impl CreateBadgeRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        super::catalog::validate_slug(&self.slug)?;
        if self.name_en.trim().is_empty() || self.name_tr.trim().is_empty() {
            return Err(AppError::bad_request("Missing required field: name"));
        }
        match self.required_count {
            Some(n) if n >= 1 => Ok(()),
            Some(_) => Err(AppError::bad_request("required_count must be at least 1")),
            None => Err(AppError::bad_request("Missing required field: required_count")),
        }
    }
}

/// BadgeOverview
///
/// Response of the badge listing: the catalog of badges, the ones the user
/// holds, how many topics they completed and what this check just unlocked.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct BadgeOverview {
    pub all_badges: Vec<Badge>,
    pub user_badges: Vec<EarnedBadge>,
    pub completed_topics: i64,
    pub newly_awarded: Vec<Badge>,
}
