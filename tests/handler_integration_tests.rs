mod common;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use common::{
    data, phase_request, quiz_request, seed_admin, seed_catalog, seed_learner, seed_quiz,
    seed_resource, seed_topics, status_of, test_state, topic_request, track_request,
};
use ml_roadmap::{
    error::ApiJson,
    handlers::{self, admin, admin_users, catalog, quiz},
    models::{
        ActivityKind, AdminUpdateUserRequest, AttemptsQuery, CreateBadgeRequest, Locale,
        LogsQuery, ProgressStatus, Role, SearchQuery, SubmitQuizRequest, SubmittedAnswer,
        TopicQuery, UpdateTopicRequest, UpdateTrackRequest, UserQuery,
    },
};
use uuid::Uuid;

// --- Health ---

#[tokio::test]
async fn test_health_check_reports_connected_store() {
    let state = test_state();
    let health = data(handlers::health_check(State(state)).await);
    assert_eq!(health.status, "healthy");
    assert_eq!(health.database, "connected");
}

// --- Public Catalog ---

#[tokio::test]
async fn test_get_track_returns_full_tree() {
    let state = test_state();
    let repo = state.repo.as_ref();
    let catalog = seed_catalog(repo).await;
    seed_resource(repo, catalog.topic.id).await;
    seed_quiz(repo, catalog.topic.id).await;

    let tree = data(
        catalog::get_track(State(state.clone()), Path("machine-learning".to_string())).await,
    );

    assert_eq!(tree.track.id, catalog.track.id);
    assert_eq!(tree.phases.len(), 1);
    let topic = &tree.phases[0].topics[0];
    assert_eq!(topic.topic.id, catalog.topic.id);
    assert_eq!(topic.resources.len(), 1);
    assert_eq!(topic.quizzes.len(), 1);
    assert_eq!(topic.quizzes[0].question_count, 2);
}

#[tokio::test]
async fn test_get_track_unknown_slug_is_404() {
    let state = test_state();
    let result = catalog::get_track(State(state), Path("nope".to_string())).await;
    assert_eq!(status_of(result), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_topic_by_slug_path() {
    let state = test_state();
    let catalog = seed_catalog(state.repo.as_ref()).await;

    let detail = data(
        catalog::get_topic(
            State(state.clone()),
            Path((
                "machine-learning".to_string(),
                "foundations".to_string(),
                "linear-algebra".to_string(),
            )),
        )
        .await,
    );

    assert_eq!(detail.topic.id, catalog.topic.id);
    assert_eq!(detail.path.track_slug, "machine-learning");
    assert_eq!(detail.path.phase_title_tr, "Temeller");
}

#[tokio::test]
async fn test_get_topic_names_the_missing_level() {
    let state = test_state();
    seed_catalog(state.repo.as_ref()).await;

    let missing_phase = catalog::get_topic(
        State(state.clone()),
        Path((
            "machine-learning".to_string(),
            "advanced".to_string(),
            "linear-algebra".to_string(),
        )),
    )
    .await
    .unwrap_err();
    assert_eq!(missing_phase.status(), StatusCode::NOT_FOUND);
    assert_eq!(missing_phase.to_string(), "Phase not found");

    let missing_topic = catalog::get_topic(
        State(state),
        Path((
            "machine-learning".to_string(),
            "foundations".to_string(),
            "calculus".to_string(),
        )),
    )
    .await
    .unwrap_err();
    assert_eq!(missing_topic.to_string(), "Topic not found");
}

#[tokio::test]
async fn test_search_requires_two_characters() {
    let state = test_state();
    let result = catalog::search(
        State(state),
        Query(SearchQuery {
            q: Some(" a ".to_string()),
        }),
    )
    .await;
    assert_eq!(status_of(result), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_matches_both_languages_case_insensitively() {
    let state = test_state();
    let repo = state.repo.as_ref();
    let catalog = seed_catalog(repo).await;
    seed_resource(repo, catalog.topic.id).await;

    let english = data(
        catalog::search(
            State(state.clone()),
            Query(SearchQuery {
                q: Some("LINEAR".to_string()),
            }),
        )
        .await,
    );
    assert_eq!(english.topics.len(), 1);
    assert_eq!(english.query, "LINEAR");

    let turkish = data(
        catalog::search(
            State(state),
            Query(SearchQuery {
                q: Some("matris".to_string()),
            }),
        )
        .await,
    );
    assert_eq!(turkish.resources.len(), 1);
    assert_eq!(turkish.total, 1);
}

// --- Admin: Tracks & Phases ---

#[tokio::test]
async fn test_admin_routes_reject_learners() {
    let state = test_state();
    let learner = seed_learner(state.repo.as_ref(), "learner@test.com").await;

    let result = admin::create_track(
        learner,
        State(state.clone()),
        ApiJson(track_request("deep-learning")),
    )
    .await;
    assert_eq!(status_of(result), StatusCode::FORBIDDEN);

    let stats = admin::get_admin_stats(learner, State(state)).await;
    assert_eq!(status_of(stats), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_then_get_track() {
    let state = test_state();
    let admin_user = seed_admin(state.repo.as_ref()).await;

    let (status, Json(created)) = admin::create_track(
        admin_user,
        State(state.clone()),
        ApiJson(track_request("deep-learning")),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    let track = created.data.unwrap();

    let detail = data(admin::get_track(admin_user, State(state), Path(track.id)).await);
    assert_eq!(detail.track.slug, "deep-learning");
    assert!(detail.phases.is_empty());
}

#[tokio::test]
async fn test_duplicate_track_slug_is_rejected() {
    let state = test_state();
    let admin_user = seed_admin(state.repo.as_ref()).await;
    seed_catalog(state.repo.as_ref()).await;

    let result = admin::create_track(
        admin_user,
        State(state),
        ApiJson(track_request("machine-learning")),
    )
    .await;
    assert_eq!(status_of(result), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_track_validates_and_reports_missing() {
    let state = test_state();
    let admin_user = seed_admin(state.repo.as_ref()).await;
    let catalog = seed_catalog(state.repo.as_ref()).await;

    let updated = data(
        admin::update_track(
            admin_user,
            State(state.clone()),
            Path(catalog.track.id),
            ApiJson(UpdateTrackRequest {
                title_en: Some("ML Engineer".to_string()),
                ..UpdateTrackRequest::default()
            }),
        )
        .await,
    );
    assert_eq!(updated.title_en, "ML Engineer");
    assert_eq!(updated.slug, "machine-learning");

    let bad_slug = admin::update_track(
        admin_user,
        State(state.clone()),
        Path(catalog.track.id),
        ApiJson(UpdateTrackRequest {
            slug: Some("Not A Slug".to_string()),
            ..UpdateTrackRequest::default()
        }),
    )
    .await;
    assert_eq!(status_of(bad_slug), StatusCode::BAD_REQUEST);

    let missing = admin::update_track(
        admin_user,
        State(state),
        Path(Uuid::new_v4()),
        ApiJson(UpdateTrackRequest::default()),
    )
    .await;
    assert_eq!(status_of(missing), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_track_refused_while_phases_exist() {
    let state = test_state();
    let admin_user = seed_admin(state.repo.as_ref()).await;
    let catalog = seed_catalog(state.repo.as_ref()).await;

    let refused = admin::delete_track(admin_user, State(state.clone()), Path(catalog.track.id)).await;
    assert_eq!(status_of(refused), StatusCode::BAD_REQUEST);

    let phase_refused =
        admin::delete_phase(admin_user, State(state.clone()), Path(catalog.phase.id)).await;
    assert_eq!(status_of(phase_refused), StatusCode::BAD_REQUEST);

    admin::delete_topic(admin_user, State(state.clone()), Path(catalog.topic.id))
        .await
        .unwrap();
    admin::delete_phase(admin_user, State(state.clone()), Path(catalog.phase.id))
        .await
        .unwrap();
    admin::delete_track(admin_user, State(state.clone()), Path(catalog.track.id))
        .await
        .unwrap();

    let gone = admin::get_track(admin_user, State(state.clone()), Path(catalog.track.id)).await;
    assert_eq!(status_of(gone), StatusCode::NOT_FOUND);

    let again = admin::delete_track(admin_user, State(state), Path(catalog.track.id)).await;
    assert_eq!(status_of(again), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_phase_requires_existing_track() {
    let state = test_state();
    let admin_user = seed_admin(state.repo.as_ref()).await;

    let result = admin::create_phase(
        admin_user,
        State(state),
        ApiJson(phase_request(Uuid::new_v4(), "foundations")),
    )
    .await;
    assert_eq!(status_of(result), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_phase_detail_includes_track_and_topics() {
    let state = test_state();
    let admin_user = seed_admin(state.repo.as_ref()).await;
    let catalog = seed_catalog(state.repo.as_ref()).await;

    let detail = data(admin::get_phase(admin_user, State(state.clone()), Path(catalog.phase.id)).await);
    assert_eq!(detail.track.id, catalog.track.id);
    assert_eq!(detail.topics.len(), 1);

    let grouped = data(admin::list_tracks_with_phases(admin_user, State(state)).await);
    assert_eq!(grouped.len(), 1);
    assert_eq!(grouped[0].phases[0].id, catalog.phase.id);
}

// --- Admin: Topics ---

#[tokio::test]
async fn test_create_topic_checks_phase_and_slug() {
    let state = test_state();
    let admin_user = seed_admin(state.repo.as_ref()).await;
    let catalog = seed_catalog(state.repo.as_ref()).await;

    let unknown_phase = admin::create_topic(
        admin_user,
        State(state.clone()),
        ApiJson(topic_request(Uuid::new_v4(), "calculus")),
    )
    .await;
    assert_eq!(status_of(unknown_phase), StatusCode::NOT_FOUND);

    let duplicate = admin::create_topic(
        admin_user,
        State(state.clone()),
        ApiJson(topic_request(catalog.phase.id, "linear-algebra")),
    )
    .await;
    assert_eq!(status_of(duplicate), StatusCode::BAD_REQUEST);

    let (status, _) = admin::create_topic(
        admin_user,
        State(state),
        ApiJson(topic_request(catalog.phase.id, "calculus")),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_update_topic_to_unknown_phase_is_404() {
    let state = test_state();
    let admin_user = seed_admin(state.repo.as_ref()).await;
    let catalog = seed_catalog(state.repo.as_ref()).await;

    let result = admin::update_topic(
        admin_user,
        State(state),
        Path(catalog.topic.id),
        ApiJson(UpdateTopicRequest {
            phase_id: Some(Uuid::new_v4()),
            ..UpdateTopicRequest::default()
        }),
    )
    .await;
    assert_eq!(status_of(result), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_topics_is_paginated_with_counts() {
    let state = test_state();
    let repo = state.repo.as_ref();
    let admin_user = seed_admin(repo).await;
    let catalog = seed_catalog(repo).await;
    seed_topics(repo, catalog.phase.id, 3).await;
    seed_resource(repo, catalog.topic.id).await;

    let page = data(
        admin::list_topics(
            admin_user,
            State(state.clone()),
            Query(TopicQuery {
                limit: Some(2),
                ..TopicQuery::default()
            }),
        )
        .await,
    );
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.pagination.total, 4);
    assert_eq!(page.pagination.total_pages, 2);

    let filtered = data(
        admin::list_topics(
            admin_user,
            State(state.clone()),
            Query(TopicQuery {
                phase_id: Some(catalog.phase.id),
                limit: Some(100),
                ..TopicQuery::default()
            }),
        )
        .await,
    );
    let with_resource = filtered
        .items
        .iter()
        .find(|item| item.entry.topic.id == catalog.topic.id)
        .unwrap();
    assert_eq!(with_resource.counts.resources, 1);

    let bad = admin::list_topics(
        admin_user,
        State(state),
        Query(TopicQuery {
            difficulty: Some("expert".to_string()),
            ..TopicQuery::default()
        }),
    )
    .await;
    assert_eq!(status_of(bad), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_topics_past_the_last_page_is_empty() {
    let state = test_state();
    let repo = state.repo.as_ref();
    let admin_user = seed_admin(repo).await;
    seed_catalog(repo).await;

    let page = data(
        admin::list_topics(
            admin_user,
            State(state.clone()),
            Query(TopicQuery {
                page: Some(i64::MAX),
                ..TopicQuery::default()
            }),
        )
        .await,
    );
    assert!(page.items.is_empty());
    assert_eq!(page.pagination.total, 1);

    let users = data(
        admin_users::list_users(
            admin_user,
            State(state),
            Query(UserQuery {
                page: Some(i64::MAX),
                ..UserQuery::default()
            }),
        )
        .await,
    );
    assert!(users.items.is_empty());
}

#[tokio::test]
async fn test_delete_topic_cascades_to_content_and_learner_state() {
    let state = test_state();
    let repo = state.repo.as_ref();
    let admin_user = seed_admin(repo).await;
    let learner = seed_learner(repo, "learner@test.com").await;
    let catalog = seed_catalog(repo).await;
    seed_resource(repo, catalog.topic.id).await;
    let seeded_quiz = seed_quiz(repo, catalog.topic.id).await;
    repo.upsert_progress(learner.id, catalog.topic.id, ProgressStatus::Completed)
        .await
        .unwrap();
    repo.create_bookmark(learner.id, catalog.topic.id).await.unwrap();
    repo.create_note(learner.id, catalog.topic.id, "eigenvalues".to_string())
        .await
        .unwrap();

    admin::delete_topic(admin_user, State(state.clone()), Path(catalog.topic.id))
        .await
        .unwrap();

    assert!(repo.list_resources(Some(catalog.topic.id)).await.unwrap().is_empty());
    assert!(repo.get_quiz(seeded_quiz.id).await.unwrap().is_none());
    assert!(repo.list_progress(learner.id).await.unwrap().is_empty());
    assert!(repo.list_bookmarks(learner.id).await.unwrap().is_empty());
    assert!(repo.list_notes(learner.id, None).await.unwrap().is_empty());

    let missing = admin::get_topic(admin_user, State(state), Path(catalog.topic.id)).await;
    assert_eq!(status_of(missing), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_topic_detail_includes_full_quizzes() {
    let state = test_state();
    let repo = state.repo.as_ref();
    let admin_user = seed_admin(repo).await;
    let catalog = seed_catalog(repo).await;
    seed_quiz(repo, catalog.topic.id).await;

    let detail = data(admin::get_topic(admin_user, State(state), Path(catalog.topic.id)).await);

    assert_eq!(detail.counts.quizzes, 1);
    assert_eq!(detail.quizzes[0].questions.len(), 2);
    assert!(detail.quizzes[0].questions[0].choices[0].is_correct);
}

// --- Admin: Resources ---

#[tokio::test]
async fn test_create_resource_requires_existing_topic() {
    let state = test_state();
    let admin_user = seed_admin(state.repo.as_ref()).await;

    let result = admin::create_resource(
        admin_user,
        State(state),
        ApiJson(common::resource_request(Uuid::new_v4())),
    )
    .await;
    assert_eq!(status_of(result), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_resource_without_type_is_rejected() {
    let state = test_state();
    let admin_user = seed_admin(state.repo.as_ref()).await;
    let catalog = seed_catalog(state.repo.as_ref()).await;

    let mut request = common::resource_request(catalog.topic.id);
    request.resource_type = None;

    let result = admin::create_resource(admin_user, State(state), ApiJson(request)).await;
    assert_eq!(status_of(result), StatusCode::BAD_REQUEST);
}

// --- Admin: Quizzes ---

#[tokio::test]
async fn test_create_quiz_returns_detail_with_answers() {
    let state = test_state();
    let admin_user = seed_admin(state.repo.as_ref()).await;
    let catalog = seed_catalog(state.repo.as_ref()).await;

    let (status, Json(created)) = admin::create_quiz(
        admin_user,
        State(state.clone()),
        ApiJson(quiz_request(catalog.topic.id)),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    let detail = created.data.unwrap();
    assert_eq!(detail.quiz.passing_score, 70);
    assert_eq!(detail.questions.len(), 2);
    assert_eq!(detail.questions[1].choices.len(), 3);

    let listed = data(
        admin::list_quizzes(
            admin_user,
            State(state),
            Query(ml_roadmap::models::TopicIdQuery {
                topic_id: Some(catalog.topic.id),
            }),
        )
        .await,
    );
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].question_count, 2);
}

#[tokio::test]
async fn test_question_needs_exactly_one_correct_choice() {
    let state = test_state();
    let admin_user = seed_admin(state.repo.as_ref()).await;
    let catalog = seed_catalog(state.repo.as_ref()).await;

    let mut request = quiz_request(catalog.topic.id);
    request.questions[0].choices[1].is_correct = true;

    let result = admin::create_quiz(admin_user, State(state), ApiJson(request)).await;
    assert_eq!(status_of(result), StatusCode::BAD_REQUEST);
}

// --- Public Quiz & Submission ---

#[tokio::test]
async fn test_public_quiz_hides_answers() {
    let state = test_state();
    let catalog = seed_catalog(state.repo.as_ref()).await;
    let seeded = seed_quiz(state.repo.as_ref(), catalog.topic.id).await;

    let public = data(quiz::get_quiz(State(state), Path(seeded.id)).await);
    let json = serde_json::to_string(&public).unwrap();

    assert_eq!(public.questions.len(), 2);
    assert!(!json.contains("is_correct"));
    assert!(!json.contains("explanation"));
}

#[tokio::test]
async fn test_submit_quiz_grades_and_records_attempt() {
    let state = test_state();
    let repo = state.repo.as_ref();
    let learner = seed_learner(repo, "learner@test.com").await;
    let catalog = seed_catalog(repo).await;
    let seeded = seed_quiz(repo, catalog.topic.id).await;
    let questions = repo.quiz_questions(seeded.id).await.unwrap();

    let answers = questions
        .iter()
        .map(|q| SubmittedAnswer {
            question_id: q.question.id,
            choice_id: q.choices.iter().find(|c| c.is_correct).map(|c| c.id),
        })
        .collect();

    let result = data(
        quiz::submit_quiz(
            learner,
            State(state.clone()),
            Path(seeded.id),
            ApiJson(SubmitQuizRequest {
                answers,
                locale: Some(Locale::Tr),
            }),
        )
        .await,
    );

    assert_eq!(result.score, 100);
    assert!(result.passed);
    assert_eq!(result.passing_score, 70);
    assert_eq!(result.results[0].question_text, "Vektör nedir?");

    let attempts = data(
        quiz::list_attempts(
            learner,
            State(state),
            Query(AttemptsQuery {
                quiz_id: Some(seeded.id),
            }),
        )
        .await,
    );
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].id, result.attempt_id);
    assert_eq!(attempts[0].score, 100);
}

#[tokio::test]
async fn test_submit_unknown_quiz_is_404() {
    let state = test_state();
    let learner = seed_learner(state.repo.as_ref(), "learner@test.com").await;

    let result = quiz::submit_quiz(
        learner,
        State(state),
        Path(Uuid::new_v4()),
        ApiJson(SubmitQuizRequest::default()),
    )
    .await;
    assert_eq!(status_of(result), StatusCode::NOT_FOUND);
}

// --- Admin: Dashboard & Logs ---

#[tokio::test]
async fn test_admin_stats_counts_entities() {
    let state = test_state();
    let repo = state.repo.as_ref();
    let admin_user = seed_admin(repo).await;
    let learner = seed_learner(repo, "learner@test.com").await;
    let catalog = seed_catalog(repo).await;
    repo.upsert_progress(learner.id, catalog.topic.id, ProgressStatus::Completed)
        .await
        .unwrap();

    let stats = data(admin::get_admin_stats(admin_user, State(state)).await);

    assert_eq!(stats.counts.total_users, 2);
    assert_eq!(stats.counts.admin_count, 1);
    assert_eq!(stats.counts.user_count, 1);
    assert_eq!(stats.counts.new_users_this_week, 2);
    assert_eq!(stats.counts.total_tracks, 1);
    assert_eq!(stats.counts.total_topics, 1);
    assert_eq!(stats.progress.completed, 1);
    assert_eq!(stats.progress.completion_rate, 100);
    assert_eq!(stats.recent.users.len(), 2);
    assert_eq!(stats.recent.topics.len(), 1);
}

#[tokio::test]
async fn test_activity_logs_filter_by_type() {
    let state = test_state();
    let repo = state.repo.as_ref();
    let admin_user = seed_admin(repo).await;
    seed_catalog(repo).await;

    let all = data(
        admin::get_activity_logs(admin_user, State(state.clone()), Query(LogsQuery::default())).await,
    );
    assert_eq!(all.total, 2);

    let topics = data(
        admin::get_activity_logs(
            admin_user,
            State(state.clone()),
            Query(LogsQuery {
                kind: Some("topic".to_string()),
                limit: None,
            }),
        )
        .await,
    );
    assert_eq!(topics.total, 1);
    assert_eq!(topics.activities[0].kind, ActivityKind::Topic);

    let invalid = admin::get_activity_logs(
        admin_user,
        State(state),
        Query(LogsQuery {
            kind: Some("comments".to_string()),
            limit: None,
        }),
    )
    .await;
    assert_eq!(status_of(invalid), StatusCode::BAD_REQUEST);
}

// --- Admin: Badges ---

#[tokio::test]
async fn test_create_badge_validates_threshold() {
    let state = test_state();
    let admin_user = seed_admin(state.repo.as_ref()).await;

    let invalid = admin::create_badge(
        admin_user,
        State(state.clone()),
        ApiJson(CreateBadgeRequest {
            slug: "zero".to_string(),
            name_en: "Zero".to_string(),
            name_tr: "Sıfır".to_string(),
            required_count: Some(0),
            ..CreateBadgeRequest::default()
        }),
    )
    .await;
    assert_eq!(status_of(invalid), StatusCode::BAD_REQUEST);

    let (status, _) = admin::create_badge(
        admin_user,
        State(state.clone()),
        ApiJson(CreateBadgeRequest {
            slug: "three".to_string(),
            name_en: "Three".to_string(),
            name_tr: "Üç".to_string(),
            required_count: Some(3),
            ..CreateBadgeRequest::default()
        }),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(data(admin::list_badges(admin_user, State(state)).await).len(), 1);
}

// --- Admin: Users ---

#[tokio::test]
async fn test_admin_cannot_delete_or_demote_self() {
    let state = test_state();
    let admin_user = seed_admin(state.repo.as_ref()).await;

    let delete_self =
        admin_users::delete_user(admin_user, State(state.clone()), Path(admin_user.id)).await;
    assert_eq!(status_of(delete_self), StatusCode::BAD_REQUEST);

    let demote_self = admin_users::update_user(
        admin_user,
        State(state.clone()),
        Path(admin_user.id),
        ApiJson(AdminUpdateUserRequest {
            role: Some("user".to_string()),
            ..AdminUpdateUserRequest::default()
        }),
    )
    .await;
    assert_eq!(status_of(demote_self), StatusCode::BAD_REQUEST);

    let rename_self = data(
        admin_users::update_user(
            admin_user,
            State(state),
            Path(admin_user.id),
            ApiJson(AdminUpdateUserRequest {
                role: Some("admin".to_string()),
                name: Some("Head Admin".to_string()),
                ..AdminUpdateUserRequest::default()
            }),
        )
        .await,
    );
    assert_eq!(rename_self.profile.name, "Head Admin");
}

#[tokio::test]
async fn test_admin_updates_and_deletes_other_users() {
    let state = test_state();
    let admin_user = seed_admin(state.repo.as_ref()).await;
    let learner = seed_learner(state.repo.as_ref(), "learner@test.com").await;

    let invalid_role = admin_users::update_user(
        admin_user,
        State(state.clone()),
        Path(learner.id),
        ApiJson(AdminUpdateUserRequest {
            role: Some("superuser".to_string()),
            ..AdminUpdateUserRequest::default()
        }),
    )
    .await;
    assert_eq!(status_of(invalid_role), StatusCode::BAD_REQUEST);

    let promoted = data(
        admin_users::update_user(
            admin_user,
            State(state.clone()),
            Path(learner.id),
            ApiJson(AdminUpdateUserRequest {
                role: Some("admin".to_string()),
                preferred_language: Some(Locale::Tr),
                ..AdminUpdateUserRequest::default()
            }),
        )
        .await,
    );
    assert_eq!(promoted.profile.role, Role::Admin);
    assert_eq!(promoted.profile.preferred_language, Locale::Tr);

    admin_users::delete_user(admin_user, State(state.clone()), Path(learner.id))
        .await
        .unwrap();
    let gone = admin_users::get_user(admin_user, State(state.clone()), Path(learner.id)).await;
    assert_eq!(status_of(gone), StatusCode::NOT_FOUND);

    let again = admin_users::delete_user(admin_user, State(state), Path(learner.id)).await;
    assert_eq!(status_of(again), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_users_filters_by_role_and_reports_stats() {
    let state = test_state();
    let repo = state.repo.as_ref();
    let admin_user = seed_admin(repo).await;
    let learner = seed_learner(repo, "learner@test.com").await;
    let catalog = seed_catalog(repo).await;
    repo.upsert_progress(learner.id, catalog.topic.id, ProgressStatus::Completed)
        .await
        .unwrap();

    let learners = data(
        admin_users::list_users(
            admin_user,
            State(state.clone()),
            Query(UserQuery {
                role: Some("user".to_string()),
                ..UserQuery::default()
            }),
        )
        .await,
    );
    assert_eq!(learners.pagination.total, 1);
    assert_eq!(learners.items[0].profile.id, learner.id);
    assert_eq!(learners.items[0].stats.completed_topics, 1);

    let detail = data(admin_users::get_user(admin_user, State(state), Path(learner.id)).await);
    assert_eq!(detail.recent_progress.len(), 1);
}
