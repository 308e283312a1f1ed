use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::{
    catalog::{ResourceEntry, TopicEntry},
    learner::ProgressStats,
    user::User,
};

/// Row counts for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct EntityCounts {
    pub total_users: i64,
    pub admin_count: i64,
    pub user_count: i64,
    pub new_users_this_week: i64,
    pub total_tracks: i64,
    pub total_phases: i64,
    pub total_topics: i64,
    pub total_resources: i64,
    pub total_quizzes: i64,
    pub total_badges: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ProgressOverview {
    pub total: i64,
    pub planned: i64,
    pub in_progress: i64,
    pub completed: i64,
    /// Completed share of all progress items, as a rounded percentage.
    pub completion_rate: i64,
}

impl From<ProgressStats> for ProgressOverview {
    fn from(stats: ProgressStats) -> Self {
        let completion_rate = if stats.total > 0 {
            ((stats.completed as f64 / stats.total as f64) * 100.0).round() as i64
        } else {
            0
        };
        Self {
            total: stats.total,
            planned: stats.planned,
            in_progress: stats.in_progress,
            completed: stats.completed,
            completion_rate,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RecentContent {
    pub users: Vec<User>,
    pub topics: Vec<TopicEntry>,
    pub resources: Vec<ResourceEntry>,
}

/// AdminDashboardStats
///
/// Output schema for the administrative statistics dashboard (GET /admin/stats).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AdminDashboardStats {
    pub counts: EntityCounts,
    pub progress: ProgressOverview,
    pub recent: RecentContent,
}

/// A progress item that reached `completed`, joined with who and what.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct CompletionRecord {
    pub progress_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub topic_id: Uuid,
    pub topic_title_en: String,
    pub topic_title_tr: String,
    #[ts(type = "string")]
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ActivityKind {
    User,
    Topic,
    Progress,
    Resource,
}

impl std::str::FromStr for ActivityKind {
    type Err = crate::error::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "topic" => Ok(Self::Topic),
            "progress" => Ok(Self::Progress),
            "resource" => Ok(Self::Resource),
            other => Err(crate::error::AppError::bad_request(format!(
                "Invalid activity type: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ActivityActor {
    pub name: String,
    pub email: String,
}

/// Activity
///
/// One line of the admin activity feed.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Activity {
    /// Stable identifier: `<kind>-<entity id>`.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub action: String,
    pub entity_id: Uuid,
    pub description: String,
    #[ts(type = "string")]
    pub timestamp: DateTime<Utc>,
    pub actor: Option<ActivityActor>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ActivityLog {
    pub activities: Vec<Activity>,
    pub total: usize,
}

/// Query parameters of the activity feed. `type=all` means no filter.
#[derive(Debug, Clone, Deserialize, IntoParams, Default)]
pub struct LogsQuery {
    pub limit: Option<usize>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Response of the PDF upload endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UploadedFile {
    pub file_url: String,
    pub filename: String,
    pub size: usize,
    pub content_type: String,
}
