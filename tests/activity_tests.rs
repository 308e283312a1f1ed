use chrono::{Duration, Utc};
use ml_roadmap::{
    activity::{ActivitySources, build_activity_log},
    models::{
        ActivityKind, CompletionRecord, Resource, ResourceEntry, Topic, TopicEntry, TopicPath, User,
    },
};
use uuid::Uuid;

fn sources() -> ActivitySources {
    let now = Utc::now();
    let path = TopicPath {
        topic_title_en: "Calculus".to_string(),
        phase_title_en: "Foundations".to_string(),
        ..TopicPath::default()
    };

    ActivitySources {
        users: vec![User {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@test.com".to_string(),
            created_at: now - Duration::minutes(30),
            ..User::default()
        }],
        topics: vec![TopicEntry {
            topic: Topic {
                id: Uuid::new_v4(),
                title_en: "Calculus".to_string(),
                created_at: now - Duration::minutes(10),
                ..Topic::default()
            },
            path: path.clone(),
        }],
        completions: vec![CompletionRecord {
            progress_id: Uuid::new_v4(),
            user_name: "Ada".to_string(),
            user_email: "ada@test.com".to_string(),
            topic_title_en: "Calculus".to_string(),
            completed_at: now - Duration::minutes(1),
            ..CompletionRecord::default()
        }],
        resources: vec![ResourceEntry {
            resource: Resource {
                id: Uuid::new_v4(),
                title_en: "Spivak".to_string(),
                created_at: now - Duration::minutes(20),
                ..Resource::default()
            },
            topic: path,
        }],
    }
}

#[test]
fn test_feed_is_newest_first() {
    let feed = build_activity_log(sources(), None, 50);

    let kinds: Vec<ActivityKind> = feed.iter().map(|a| a.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ActivityKind::Progress,
            ActivityKind::Topic,
            ActivityKind::Resource,
            ActivityKind::User,
        ]
    );
    assert!(feed.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
}

#[test]
fn test_feed_entries_describe_the_event() {
    let feed = build_activity_log(sources(), None, 50);

    let completion = &feed[0];
    assert!(completion.id.starts_with("progress-"));
    assert_eq!(completion.action, "completed");
    assert_eq!(completion.description, "Ada completed Calculus");
    assert_eq!(completion.actor.as_ref().map(|a| a.email.as_str()), Some("ada@test.com"));

    let topic = &feed[1];
    assert_eq!(topic.description, "New topic created: Calculus in Foundations");
    assert!(topic.actor.is_none());
}

#[test]
fn test_feed_filters_by_kind() {
    let feed = build_activity_log(sources(), Some(ActivityKind::Resource), 50);

    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].kind, ActivityKind::Resource);
    assert_eq!(feed[0].description, "New resource added: Spivak to Calculus");
}

#[test]
fn test_feed_is_truncated_to_limit() {
    let feed = build_activity_log(sources(), None, 2);

    assert_eq!(feed.len(), 2);
    assert_eq!(feed[0].kind, ActivityKind::Progress);
    assert_eq!(feed[1].kind, ActivityKind::Topic);
}

#[test]
fn test_empty_sources_give_empty_feed() {
    assert!(build_activity_log(ActivitySources::default(), None, 50).is_empty());
}
