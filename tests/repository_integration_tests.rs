//! Behaviour shared by both repository implementations.
//!
//! Every check runs against the in-memory store. The Postgres variants are
//! ignored by default; run them with `DATABASE_URL` set and `--ignored`.

mod common;

use axum::http::StatusCode;
use common::{phase_request, quiz_request, resource_request, topic_request, track_request};
use ml_roadmap::{
    InMemoryRepository, PostgresRepository,
    auth,
    models::{
        CreateBadgeRequest, GradedAnswer, Locale, NewQuizAttempt, NewUser, ProfileChanges,
        ProgressStatus, Role, TopicFilter,
    },
    repository::Repository,
};
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

// --- Helper Functions ---

/// A slug that does not collide with rows left behind by earlier runs.
fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", &Uuid::new_v4().simple().to_string()[..8])
}

async fn postgres() -> PostgresRepository {
    dotenv::dotenv().ok();
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for Postgres tests");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("Failed to connect to Postgres in tests");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    PostgresRepository::new(pool)
}

async fn new_user(repo: &dyn Repository) -> ml_roadmap::models::User {
    repo.create_user(NewUser {
        email: format!("{}@test.com", unique("user")),
        name: "Repo Tester".to_string(),
        password_hash: auth::hash_password(common::TEST_PASSWORD).unwrap(),
        role: Role::User,
    })
    .await
    .unwrap()
}

async fn new_topic(repo: &dyn Repository) -> ml_roadmap::models::Topic {
    let track = repo.create_track(track_request(&unique("track"))).await.unwrap();
    let phase = repo
        .create_phase(track.id, phase_request(track.id, "phase"))
        .await
        .unwrap();
    repo.create_topic(phase.id, topic_request(phase.id, "topic"))
        .await
        .unwrap()
}

// --- Shared Checks ---

async fn check_user_lifecycle(repo: &dyn Repository) {
    let user = new_user(repo).await;

    let duplicate = repo
        .create_user(NewUser {
            email: user.email.clone(),
            name: "Copy".to_string(),
            password_hash: "x".to_string(),
            role: Role::User,
        })
        .await
        .unwrap_err();
    assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);

    let credentials = repo.get_credentials(&user.email).await.unwrap().unwrap();
    assert_eq!(credentials.id, user.id);
    assert!(auth::verify_password(common::TEST_PASSWORD, &credentials.password_hash));

    let profile = repo.get_profile(user.id).await.unwrap().unwrap();
    assert_eq!(profile.preferred_language, Locale::En);
    assert_eq!(profile.level, 1);

    let updated = repo
        .update_profile(
            user.id,
            ProfileChanges {
                bio: Some("Hello".to_string()),
                preferred_language: Some(Locale::Tr),
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.bio.as_deref(), Some("Hello"));
    assert_eq!(updated.preferred_language, Locale::Tr);

    assert!(repo.delete_user(user.id).await.unwrap());
    assert!(repo.get_user(user.id).await.unwrap().is_none());
    assert!(repo.get_profile(user.id).await.unwrap().is_none());
    assert!(!repo.delete_user(user.id).await.unwrap());
}

async fn check_slug_uniqueness(repo: &dyn Repository) {
    let slug = unique("track");
    let first = repo.create_track(track_request(&slug)).await.unwrap();
    let duplicate = repo.create_track(track_request(&slug)).await.unwrap_err();
    assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);

    let second = repo.create_track(track_request(&unique("track"))).await.unwrap();
    assert!(second.position > first.position);

    // Phase slugs are unique per track only.
    repo.create_phase(first.id, phase_request(first.id, "basics"))
        .await
        .unwrap();
    repo.create_phase(second.id, phase_request(second.id, "basics"))
        .await
        .unwrap();
    let clash = repo
        .create_phase(first.id, phase_request(first.id, "basics"))
        .await
        .unwrap_err();
    assert_eq!(clash.status(), StatusCode::BAD_REQUEST);

    let found = repo
        .get_phase_by_slug(second.id, "basics")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.track_id, second.id);
}

async fn check_progress_completion_timestamps(repo: &dyn Repository) {
    let user = new_user(repo).await;
    let topic = new_topic(repo).await;

    let planned = repo
        .upsert_progress(user.id, topic.id, ProgressStatus::Planned)
        .await
        .unwrap();
    assert!(planned.completed_at.is_none());

    let completed = repo
        .upsert_progress(user.id, topic.id, ProgressStatus::Completed)
        .await
        .unwrap();
    assert_eq!(completed.id, planned.id);
    let first_completion = completed.completed_at.unwrap();

    let again = repo
        .upsert_progress(user.id, topic.id, ProgressStatus::Completed)
        .await
        .unwrap();
    assert_eq!(again.completed_at, Some(first_completion));

    let reopened = repo
        .upsert_progress(user.id, topic.id, ProgressStatus::InProgress)
        .await
        .unwrap();
    assert!(reopened.completed_at.is_none());

    let stats = repo.progress_stats(Some(user.id)).await.unwrap();
    assert_eq!(stats.in_progress, 1);
    assert_eq!(stats.total, 1);

    let entries = repo.list_progress(user.id).await.unwrap();
    assert_eq!(entries[0].topic.topic_id, topic.id);
}

async fn check_topic_delete_cascades(repo: &dyn Repository) {
    let user = new_user(repo).await;
    let topic = new_topic(repo).await;
    let resource = repo
        .create_resource(topic.id, resource_request(topic.id))
        .await
        .unwrap();
    let quiz = repo
        .create_quiz(topic.id, quiz_request(topic.id))
        .await
        .unwrap();
    repo.upsert_progress(user.id, topic.id, ProgressStatus::Completed)
        .await
        .unwrap();
    repo.create_bookmark(user.id, topic.id).await.unwrap();
    repo.create_note(user.id, topic.id, "note".to_string())
        .await
        .unwrap();

    let counts = repo.topic_counts(topic.id).await.unwrap();
    assert_eq!((counts.resources, counts.quizzes, counts.progress_items), (1, 1, 1));

    assert!(repo.delete_topic(topic.id).await.unwrap());

    assert!(repo.get_resource(resource.id).await.unwrap().is_none());
    assert!(repo.get_quiz(quiz.id).await.unwrap().is_none());
    assert!(repo.list_progress(user.id).await.unwrap().is_empty());
    assert!(repo.list_bookmarks(user.id).await.unwrap().is_empty());
    assert!(repo.list_notes(user.id, None).await.unwrap().is_empty());
}

async fn check_quiz_storage_and_attempts(repo: &dyn Repository) {
    let user = new_user(repo).await;
    let topic = new_topic(repo).await;
    let quiz = repo
        .create_quiz(topic.id, quiz_request(topic.id))
        .await
        .unwrap();

    let questions = repo.quiz_questions(quiz.id).await.unwrap();
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0].question.question_text_en, "What is a vector?");
    assert_eq!(questions[1].choices.len(), 3);
    assert!(questions[1].choices.windows(2).all(|w| w[0].position < w[1].position));
    assert!(questions[0].choices[0].is_correct);

    let attempt = repo
        .record_attempt(NewQuizAttempt {
            user_id: user.id,
            quiz_id: quiz.id,
            score: 50,
            correct_answers: 1,
            total_questions: 2,
            passed: false,
            answers: vec![GradedAnswer {
                question_id: questions[0].question.id,
                choice_id: Some(questions[0].choices[0].id),
                is_correct: true,
            }],
        })
        .await
        .unwrap();

    let attempts = repo.list_attempts(user.id, Some(quiz.id)).await.unwrap();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].id, attempt.id);
    assert!(!attempts[0].passed);

    let summaries = repo.list_quizzes(Some(topic.id)).await.unwrap();
    assert_eq!(summaries[0].question_count, 2);

    assert!(repo.delete_quiz(quiz.id).await.unwrap());
    assert!(repo.quiz_questions(quiz.id).await.unwrap().is_empty());
    assert!(repo.list_attempts(user.id, Some(quiz.id)).await.unwrap().is_empty());
}

async fn check_bookmarks_and_notes(repo: &dyn Repository) {
    let owner = new_user(repo).await;
    let other = new_user(repo).await;
    let topic = new_topic(repo).await;

    repo.create_bookmark(owner.id, topic.id).await.unwrap();
    let duplicate = repo.create_bookmark(owner.id, topic.id).await.unwrap_err();
    assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);
    assert!(repo.find_bookmark(owner.id, topic.id).await.unwrap().is_some());
    assert!(repo.find_bookmark(other.id, topic.id).await.unwrap().is_none());
    assert!(repo.delete_bookmark(owner.id, topic.id).await.unwrap());
    assert!(!repo.delete_bookmark(owner.id, topic.id).await.unwrap());

    let note = repo
        .create_note(owner.id, topic.id, "first".to_string())
        .await
        .unwrap();
    assert!(
        repo.update_note(note.id, other.id, "stolen".to_string())
            .await
            .unwrap()
            .is_none()
    );
    assert!(!repo.delete_note(note.id, other.id).await.unwrap());

    let updated = repo
        .update_note(note.id, owner.id, "second".to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.content, "second");
    assert!(updated.updated_at >= note.updated_at);

    let listed = repo.list_notes(owner.id, Some(topic.id)).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].topic.topic_slug, "topic");
    assert!(repo.delete_note(note.id, owner.id).await.unwrap());
}

async fn check_badge_awards_are_idempotent(repo: &dyn Repository) {
    let user = new_user(repo).await;
    let badge = repo
        .create_badge(CreateBadgeRequest {
            slug: unique("badge"),
            name_en: "Badge".to_string(),
            name_tr: "Rozet".to_string(),
            required_count: Some(1),
            ..CreateBadgeRequest::default()
        })
        .await
        .unwrap();

    assert!(repo.award_badge(user.id, badge.id).await.unwrap());
    assert!(!repo.award_badge(user.id, badge.id).await.unwrap());

    let held = repo.user_badges(user.id).await.unwrap();
    assert_eq!(held.len(), 1);
    assert_eq!(held[0].badge.id, badge.id);
}

async fn check_topic_filtering(repo: &dyn Repository) {
    let track = repo.create_track(track_request(&unique("track"))).await.unwrap();
    let phase = repo
        .create_phase(track.id, phase_request(track.id, "phase"))
        .await
        .unwrap();
    let marker = unique("marker");
    for i in 0..3 {
        let mut request = topic_request(phase.id, &format!("topic-{i}"));
        request.title_tr = format!("Konu {marker}");
        repo.create_topic(phase.id, request).await.unwrap();
    }

    let (page, total) = repo
        .list_topics(&TopicFilter {
            phase_id: Some(phase.id),
            limit: 2,
            offset: 0,
            ..TopicFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(total, 3);
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].path.track_id, track.id);

    let (_, searched) = repo
        .list_topics(&TopicFilter {
            search: Some(marker.to_uppercase()),
            limit: 10,
            ..TopicFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(searched, 3);

    let hits = repo.search_topics(&marker, 10).await.unwrap();
    assert_eq!(hits.len(), 3);
}

// --- Test Matrix ---

macro_rules! repository_tests {
    ($($check:ident => $memory:ident, $pg:ident;)*) => {
        $(
            #[tokio::test]
            async fn $memory() {
                $check(&InMemoryRepository::new()).await;
            }

            #[tokio::test]
            #[ignore = "requires DATABASE_URL"]
            async fn $pg() {
                $check(&postgres().await).await;
            }
        )*
    };
}

repository_tests! {
    check_user_lifecycle => memory_user_lifecycle, postgres_user_lifecycle;
    check_slug_uniqueness => memory_slug_uniqueness, postgres_slug_uniqueness;
    check_progress_completion_timestamps => memory_progress_timestamps, postgres_progress_timestamps;
    check_topic_delete_cascades => memory_topic_cascade, postgres_topic_cascade;
    check_quiz_storage_and_attempts => memory_quiz_attempts, postgres_quiz_attempts;
    check_bookmarks_and_notes => memory_bookmarks_notes, postgres_bookmarks_notes;
    check_badge_awards_are_idempotent => memory_badge_awards, postgres_badge_awards;
    check_topic_filtering => memory_topic_filtering, postgres_topic_filtering;
}
