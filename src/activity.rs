//! The admin activity feed.
//!
//! The feed is assembled from the newest rows of four sources rather than
//! from a dedicated audit table.

use crate::models::{
    Activity, ActivityActor, ActivityKind, CompletionRecord, ResourceEntry, TopicEntry, User,
};

pub const DEFAULT_LOG_LIMIT: usize = 50;

/// How many rows each source contributes before merging.
pub const USER_FETCH_LIMIT: i64 = 10;
pub const TOPIC_FETCH_LIMIT: i64 = 15;
pub const PROGRESS_FETCH_LIMIT: i64 = 20;
pub const RESOURCE_FETCH_LIMIT: i64 = 10;

/// Source rows for [`build_activity_log`].
#[derive(Debug, Default)]
pub struct ActivitySources {
    pub users: Vec<User>,
    pub topics: Vec<TopicEntry>,
    pub completions: Vec<CompletionRecord>,
    pub resources: Vec<ResourceEntry>,
}

fn user_activity(user: User) -> Activity {
    Activity {
        id: format!("user-{}", user.id),
        kind: ActivityKind::User,
        action: "registered".to_string(),
        entity_id: user.id,
        description: format!("New user registered: {}", user.name),
        timestamp: user.created_at,
        actor: Some(ActivityActor {
            name: user.name,
            email: user.email,
        }),
    }
}

fn topic_activity(entry: TopicEntry) -> Activity {
    Activity {
        id: format!("topic-{}", entry.topic.id),
        kind: ActivityKind::Topic,
        action: "created".to_string(),
        entity_id: entry.topic.id,
        description: format!(
            "New topic created: {} in {}",
            entry.topic.title_en, entry.path.phase_title_en
        ),
        timestamp: entry.topic.created_at,
        actor: None,
    }
}

fn completion_activity(record: CompletionRecord) -> Activity {
    Activity {
        id: format!("progress-{}", record.progress_id),
        kind: ActivityKind::Progress,
        action: "completed".to_string(),
        entity_id: record.progress_id,
        description: format!("{} completed {}", record.user_name, record.topic_title_en),
        timestamp: record.completed_at,
        actor: Some(ActivityActor {
            name: record.user_name,
            email: record.user_email,
        }),
    }
}

fn resource_activity(entry: ResourceEntry) -> Activity {
    Activity {
        id: format!("resource-{}", entry.resource.id),
        kind: ActivityKind::Resource,
        action: "created".to_string(),
        entity_id: entry.resource.id,
        description: format!(
            "New resource added: {} to {}",
            entry.resource.title_en, entry.topic.topic_title_en
        ),
        timestamp: entry.resource.created_at,
        actor: None,
    }
}

/// build_activity_log
///
/// Merges the sources into one feed, newest first, keeping only `kind` when
/// given and at most `limit` entries.
pub fn build_activity_log(
    sources: ActivitySources,
    kind: Option<ActivityKind>,
    limit: usize,
) -> Vec<Activity> {
    let wants = |k: ActivityKind| kind.is_none_or(|wanted| wanted == k);

    let mut activities = Vec::new();
    if wants(ActivityKind::User) {
        activities.extend(sources.users.into_iter().map(user_activity));
    }
    if wants(ActivityKind::Topic) {
        activities.extend(sources.topics.into_iter().map(topic_activity));
    }
    if wants(ActivityKind::Progress) {
        activities.extend(sources.completions.into_iter().map(completion_activity));
    }
    if wants(ActivityKind::Resource) {
        activities.extend(sources.resources.into_iter().map(resource_activity));
    }

    activities.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    activities.truncate(limit);
    activities
}
