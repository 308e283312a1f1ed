use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::{non_blank, quiz::{QuizDetail, QuizSummary}};
use crate::error::AppError;

// --- Enumerations ---

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "difficulty", rename_all = "lowercase")]
#[ts(export)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl std::str::FromStr for Difficulty {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            other => Err(AppError::bad_request(format!("Invalid difficulty: {other}"))),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "resource_type", rename_all = "lowercase")]
#[ts(export)]
pub enum ResourceType {
    Pdf,
    #[default]
    Link,
    Video,
    Book,
}

// --- Core Catalog Schemas (Mapped to Database) ---

/// Track
///
/// Top-level curriculum, e.g. "ML Engineer". Tracks are ordered by `position`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Track {
    pub id: Uuid,
    pub slug: String,
    pub title_en: String,
    pub title_tr: String,
    pub description_en: Option<String>,
    pub description_tr: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub position: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Phase
///
/// A stage within a track. The slug is unique per track.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Phase {
    pub id: Uuid,
    pub track_id: Uuid,
    pub slug: String,
    pub title_en: String,
    pub title_tr: String,
    pub description_en: Option<String>,
    pub description_tr: Option<String>,
    pub position: i32,
    pub duration_months: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Topic
///
/// The unit of learning content. Resources and quizzes hang off a topic and
/// learners track their progress, bookmarks and notes against it.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Topic {
    pub id: Uuid,
    pub phase_id: Uuid,
    pub slug: String,
    pub title_en: String,
    pub title_tr: String,
    pub description_en: Option<String>,
    pub description_tr: Option<String>,
    pub content_en: Option<String>,
    pub content_tr: Option<String>,
    pub position: i32,
    pub estimated_hours: Option<i32>,
    pub difficulty: Option<Difficulty>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Resource
///
/// A link, video, book or uploaded PDF attached to a topic.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Resource {
    pub id: Uuid,
    pub topic_id: Uuid,
    pub title_en: String,
    pub title_tr: String,
    pub description_en: Option<String>,
    pub description_tr: Option<String>,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub url: String,
    pub position: i32,
    pub duration_minutes: Option<i32>,
    pub is_premium: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// TopicPath
///
/// The breadcrumb of a topic: its own slug and titles plus those of its phase
/// and track. Joined onto every learner-facing row that references a topic.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct TopicPath {
    pub topic_id: Uuid,
    pub topic_slug: String,
    pub topic_title_en: String,
    pub topic_title_tr: String,
    pub phase_id: Uuid,
    pub phase_slug: String,
    pub phase_title_en: String,
    pub phase_title_tr: String,
    pub track_id: Uuid,
    pub track_slug: String,
    pub track_title_en: String,
    pub track_title_tr: String,
}

// --- Composite Views ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct TrackSummary {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub track: Track,
    pub phase_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct PhaseSummary {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub phase: Phase,
    pub topic_count: i64,
}

/// A topic together with its breadcrumb.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct TopicEntry {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub topic: Topic,
    #[sqlx(flatten)]
    pub path: TopicPath,
}

/// A resource together with the breadcrumb of the topic it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct ResourceEntry {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub resource: Resource,
    #[sqlx(flatten)]
    pub topic: TopicPath,
}

/// Number of rows hanging off a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct TopicCounts {
    pub resources: i64,
    pub quizzes: i64,
    pub progress_items: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AdminTopicEntry {
    #[serde(flatten)]
    pub entry: TopicEntry,
    pub counts: TopicCounts,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct TrackDetail {
    #[serde(flatten)]
    pub track: Track,
    pub phases: Vec<PhaseSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct TrackWithPhases {
    #[serde(flatten)]
    pub track: Track,
    pub phases: Vec<Phase>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PhaseDetail {
    #[serde(flatten)]
    pub phase: Phase,
    pub track: Track,
    pub topics: Vec<Topic>,
}

/// TrackTree
///
/// The public, fully expanded view of a track: phases, their topics, and each
/// topic's resources and quiz summaries.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct TrackTree {
    #[serde(flatten)]
    pub track: Track,
    pub phases: Vec<PhaseTree>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PhaseTree {
    #[serde(flatten)]
    pub phase: Phase,
    pub topics: Vec<TopicTree>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct TopicTree {
    #[serde(flatten)]
    pub topic: Topic,
    pub resources: Vec<Resource>,
    pub quizzes: Vec<QuizSummary>,
}

/// Public topic page: content, resources, quiz summaries and breadcrumb.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct TopicDetail {
    #[serde(flatten)]
    pub topic: Topic,
    pub path: TopicPath,
    pub resources: Vec<Resource>,
    pub quizzes: Vec<QuizSummary>,
}

/// Admin topic page. Quizzes are expanded including their answers.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AdminTopicDetail {
    #[serde(flatten)]
    pub topic: Topic,
    pub path: TopicPath,
    pub counts: TopicCounts,
    pub resources: Vec<Resource>,
    pub quizzes: Vec<QuizDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SearchResults {
    pub query: String,
    pub topics: Vec<TopicEntry>,
    pub resources: Vec<ResourceEntry>,
    pub total: usize,
}

// --- Request Payloads (Input Schemas) ---

fn require(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::bad_request(format!("Missing required field: {field}")));
    }
    Ok(())
}

/// Slugs are lowercase ASCII words joined by hyphens.
pub fn validate_slug(slug: &str) -> Result<(), AppError> {
    require(slug, "slug")?;
    let valid = slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !valid || slug.starts_with('-') || slug.ends_with('-') {
        return Err(AppError::bad_request(format!(
            "Invalid slug '{slug}': use lowercase letters, digits and hyphens"
        )));
    }
    Ok(())
}

fn validate_non_negative(value: Option<i32>, field: &str) -> Result<(), AppError> {
    match value {
        Some(v) if v < 0 => Err(AppError::bad_request(format!("{field} must not be negative"))),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct CreateTrackRequest {
    pub slug: String,
    pub title_en: String,
    pub title_tr: String,
    pub description_en: Option<String>,
    pub description_tr: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub position: Option<i32>,
}

impl CreateTrackRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_slug(&self.slug)?;
        require(&self.title_en, "title_en")?;
        require(&self.title_tr, "title_tr")?;
        validate_non_negative(self.position, "position")
    }
}

/// Partial update payload: only the provided fields change.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateTrackRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_en: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_tr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_en: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_tr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
}

impl UpdateTrackRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(slug) = &self.slug {
            validate_slug(slug)?;
        }
        if matches!(&self.title_en, Some(t) if t.trim().is_empty()) {
            return Err(AppError::bad_request("title_en must not be empty"));
        }
        validate_non_negative(self.position, "position")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct CreatePhaseRequest {
    pub track_id: Option<Uuid>,
    pub slug: String,
    pub title_en: String,
    pub title_tr: String,
    pub description_en: Option<String>,
    pub description_tr: Option<String>,
    pub position: Option<i32>,
    pub duration_months: Option<i32>,
}

impl CreatePhaseRequest {
    /// Validates the payload and returns the parent track id.
    pub fn validate(&self) -> Result<Uuid, AppError> {
        let track_id = self
            .track_id
            .ok_or_else(|| AppError::bad_request("Missing required field: track_id"))?;
        validate_slug(&self.slug)?;
        require(&self.title_en, "title_en")?;
        require(&self.title_tr, "title_tr")?;
        validate_non_negative(self.position, "position")?;
        validate_non_negative(self.duration_months, "duration_months")?;
        Ok(track_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdatePhaseRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_en: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_tr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_en: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_tr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_months: Option<i32>,
}

impl UpdatePhaseRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(slug) = &self.slug {
            validate_slug(slug)?;
        }
        validate_non_negative(self.position, "position")?;
        validate_non_negative(self.duration_months, "duration_months")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct CreateTopicRequest {
    pub phase_id: Option<Uuid>,
    pub slug: String,
    pub title_en: String,
    pub title_tr: String,
    pub description_en: Option<String>,
    pub description_tr: Option<String>,
    pub content_en: Option<String>,
    pub content_tr: Option<String>,
    pub position: Option<i32>,
    pub estimated_hours: Option<i32>,
    pub difficulty: Option<Difficulty>,
}

impl CreateTopicRequest {
    /// Validates the payload and returns the parent phase id.
    pub fn validate(&self) -> Result<Uuid, AppError> {
        let phase_id = self
            .phase_id
            .ok_or_else(|| AppError::bad_request("Missing required field: phase_id"))?;
        validate_slug(&self.slug)?;
        require(&self.title_en, "title_en")?;
        require(&self.title_tr, "title_tr")?;
        validate_non_negative(self.position, "position")?;
        validate_non_negative(self.estimated_hours, "estimated_hours")?;
        Ok(phase_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateTopicRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_en: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_tr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_en: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_tr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_en: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_tr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

impl UpdateTopicRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(slug) = &self.slug {
            validate_slug(slug)?;
        }
        validate_non_negative(self.position, "position")?;
        validate_non_negative(self.estimated_hours, "estimated_hours")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct CreateResourceRequest {
    pub topic_id: Option<Uuid>,
    pub title_en: String,
    pub title_tr: String,
    pub description_en: Option<String>,
    pub description_tr: Option<String>,
    #[serde(rename = "type")]
    pub resource_type: Option<ResourceType>,
    pub url: String,
    pub position: Option<i32>,
    pub duration_minutes: Option<i32>,
    pub is_premium: Option<bool>,
}

impl CreateResourceRequest {
    /// Validates the payload and returns the parent topic id.
    pub fn validate(&self) -> Result<Uuid, AppError> {
        let topic_id = self
            .topic_id
            .ok_or_else(|| AppError::bad_request("Missing required field: topic_id"))?;
        require(&self.title_en, "title_en")?;
        require(&self.title_tr, "title_tr")?;
        require(&self.url, "url")?;
        if self.resource_type.is_none() {
            return Err(AppError::bad_request("Missing required field: type"));
        }
        validate_non_negative(self.position, "position")?;
        validate_non_negative(self.duration_minutes, "duration_minutes")?;
        Ok(topic_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateResourceRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_en: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_tr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_en: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_tr: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<ResourceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_premium: Option<bool>,
}

impl UpdateResourceRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if matches!(&self.url, Some(u) if u.trim().is_empty()) {
            return Err(AppError::bad_request("url must not be empty"));
        }
        validate_non_negative(self.position, "position")?;
        validate_non_negative(self.duration_minutes, "duration_minutes")
    }
}

// --- Query Parameters ---

#[derive(Debug, Clone, Deserialize, IntoParams, Default)]
pub struct TrackIdQuery {
    /// Restrict the listing to one track.
    pub track_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, IntoParams, Default)]
pub struct TopicIdQuery {
    /// Restrict the listing to one topic.
    pub topic_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, IntoParams, Default)]
pub struct SearchQuery {
    /// Search term, at least two characters.
    pub q: Option<String>,
}

/// TopicQuery
///
/// Raw query parameters of the admin topic listing. `difficulty=all` and an
/// empty value both mean "no filter".
#[derive(Debug, Clone, Deserialize, IntoParams, Default)]
pub struct TopicQuery {
    pub search: Option<String>,
    pub phase_id: Option<Uuid>,
    pub difficulty: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Typed filter handed to the repository.
#[derive(Debug, Clone, Default)]
pub struct TopicFilter {
    pub search: Option<String>,
    pub phase_id: Option<Uuid>,
    pub difficulty: Option<Difficulty>,
    pub limit: i64,
    pub offset: i64,
}

impl TopicQuery {
    /// Resolves the raw parameters into `(page, filter)`.
    pub fn into_filter(self) -> Result<(i64, TopicFilter), AppError> {
        let difficulty = match non_blank(&self.difficulty) {
            None | Some("all") => None,
            Some(value) => Some(value.parse::<Difficulty>()?),
        };
        let (page, limit, offset) = super::page_window(self.page, self.limit, 20);
        Ok((
            page,
            TopicFilter {
                search: non_blank(&self.search).map(str::to_string),
                phase_id: self.phase_id,
                difficulty,
                limit,
                offset,
            },
        ))
    }
}
