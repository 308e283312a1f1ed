mod common;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use common::{TEST_PASSWORD, data, seed_catalog, seed_learner, status_of, test_state};
use ml_roadmap::{
    auth::SESSION_COOKIE,
    badges::ensure_default_badges,
    error::ApiJson,
    handlers::{auth, learner},
    models::{
        CreateNoteRequest, Locale, LoginRequest, NotesQuery, ProgressStatus, RegisterRequest,
        ToggleBookmarkRequest, UpdateNoteRequest, UpdateProfileRequest, UpdateProgressRequest,
    },
};
use tower_cookies::Cookies;
use uuid::Uuid;

fn progress(topic_id: Uuid, status: ProgressStatus) -> ApiJson<UpdateProgressRequest> {
    ApiJson(UpdateProgressRequest {
        topic_id: Some(topic_id),
        status: Some(status),
    })
}

// --- Registration & Login ---

#[tokio::test]
async fn test_register_normalises_email_and_rejects_duplicates() {
    let state = test_state();
    let request = RegisterRequest {
        email: "  Ada@Test.com ".to_string(),
        password: TEST_PASSWORD.to_string(),
        name: "Ada".to_string(),
    };

    let (status, Json(body)) = auth::register_user(State(state.clone()), ApiJson(request.clone()))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    let user = body.data.unwrap();
    assert_eq!(user.email, "ada@test.com");

    let profile = state.repo.get_profile(user.id).await.unwrap().unwrap();
    assert_eq!(profile.preferred_language, Locale::En);

    let err = auth::register_user(State(state), ApiJson(request))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_eq!(err.to_string(), "User already exists");
}

#[tokio::test]
async fn test_register_validates_input() {
    let state = test_state();
    let short_password = auth::register_user(
        State(state),
        ApiJson(RegisterRequest {
            email: "ada@test.com".to_string(),
            password: "12345".to_string(),
            name: "Ada".to_string(),
        }),
    )
    .await;
    assert_eq!(status_of(short_password), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_sets_cookie_and_returns_token() {
    let state = test_state();
    seed_learner(state.repo.as_ref(), "ada@test.com").await;

    let cookies = Cookies::default();
    let Json(body) = auth::login(
        State(state.clone()),
        cookies.clone(),
        ApiJson(LoginRequest {
            email: "ADA@test.com".to_string(),
            password: TEST_PASSWORD.to_string(),
        }),
    )
    .await
    .unwrap();

    let login = body.data.unwrap();
    let cookie = cookies.get(SESSION_COOKIE).unwrap();
    assert_eq!(cookie.value(), login.token);
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(login.user.email, "ada@test.com");
}

#[tokio::test]
async fn test_login_with_wrong_password_or_unknown_email_is_401() {
    let state = test_state();
    seed_learner(state.repo.as_ref(), "ada@test.com").await;

    let wrong_password = auth::login(
        State(state.clone()),
        Cookies::default(),
        ApiJson(LoginRequest {
            email: "ada@test.com".to_string(),
            password: "not-the-password".to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);

    let unknown = auth::login(
        State(state),
        Cookies::default(),
        ApiJson(LoginRequest {
            email: "nobody@test.com".to_string(),
            password: TEST_PASSWORD.to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(unknown.to_string(), wrong_password.to_string());
}

#[tokio::test]
async fn test_logout_expires_cookie() {
    let cookies = Cookies::default();
    let Json(body) = auth::logout(cookies.clone()).await;
    let cookie = cookies.get(SESSION_COOKIE).unwrap();
    assert_eq!(cookie.value(), "");
    assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    assert_eq!(body.message.as_deref(), Some("Logged out"));
}

// --- Session & Profile ---

#[tokio::test]
async fn test_session_and_profile_round_trip() {
    let state = test_state();
    let learner = seed_learner(state.repo.as_ref(), "ada@test.com").await;

    let session = data(auth::get_session(learner, State(state.clone())).await);
    assert_eq!(session.id, learner.id);

    let updated = data(
        auth::update_profile(
            learner,
            State(state.clone()),
            ApiJson(UpdateProfileRequest {
                name: Some("  Ada Lovelace ".to_string()),
                bio: Some("Analytical engines".to_string()),
                preferred_language: Some(Locale::Tr),
                ..UpdateProfileRequest::default()
            }),
        )
        .await,
    );
    assert_eq!(updated.name, "Ada Lovelace");
    assert_eq!(updated.preferred_language, Locale::Tr);

    let profile = data(auth::get_profile(learner, State(state.clone())).await);
    assert_eq!(profile.bio.as_deref(), Some("Analytical engines"));
    assert_eq!(profile.level, 1);

    let too_short = auth::update_profile(
        learner,
        State(state),
        ApiJson(UpdateProfileRequest {
            name: Some("A".to_string()),
            ..UpdateProfileRequest::default()
        }),
    )
    .await;
    assert_eq!(status_of(too_short), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_session_of_deleted_user_is_401() {
    let state = test_state();
    let learner = seed_learner(state.repo.as_ref(), "ada@test.com").await;
    state.repo.delete_user(learner.id).await.unwrap();

    let result = auth::get_session(learner, State(state)).await;
    assert_eq!(status_of(result), StatusCode::UNAUTHORIZED);
}

// --- Progress ---

#[tokio::test]
async fn test_completing_a_topic_awards_first_badge() {
    let state = test_state();
    let repo = state.repo.as_ref();
    ensure_default_badges(repo).await.unwrap();
    let learner = seed_learner(repo, "ada@test.com").await;
    let catalog = seed_catalog(repo).await;

    let started = data(
        learner::update_progress(
            learner,
            State(state.clone()),
            progress(catalog.topic.id, ProgressStatus::InProgress),
        )
        .await,
    );
    assert!(started.progress.completed_at.is_none());
    assert!(started.newly_awarded.is_empty());

    let completed = data(
        learner::update_progress(
            learner,
            State(state.clone()),
            progress(catalog.topic.id, ProgressStatus::Completed),
        )
        .await,
    );
    assert_eq!(completed.progress.status, ProgressStatus::Completed);
    assert!(completed.progress.completed_at.is_some());
    assert_eq!(completed.newly_awarded.len(), 1);
    assert_eq!(completed.newly_awarded[0].slug, "first-step");

    let stats = data(learner::progress_stats(learner, State(state.clone())).await);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.total, 1);

    let items = data(learner::list_progress(learner, State(state)).await);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].topic.topic_slug, "linear-algebra");
}

#[tokio::test]
async fn test_progress_requires_known_topic_and_status() {
    let state = test_state();
    let learner = seed_learner(state.repo.as_ref(), "ada@test.com").await;

    let unknown = learner::update_progress(
        learner,
        State(state.clone()),
        progress(Uuid::new_v4(), ProgressStatus::Planned),
    )
    .await;
    assert_eq!(status_of(unknown), StatusCode::NOT_FOUND);

    let missing_status = learner::update_progress(
        learner,
        State(state),
        ApiJson(UpdateProgressRequest {
            topic_id: Some(Uuid::new_v4()),
            status: None,
        }),
    )
    .await;
    assert_eq!(status_of(missing_status), StatusCode::BAD_REQUEST);
}

// --- Bookmarks ---

#[tokio::test]
async fn test_bookmark_toggle_adds_then_removes() {
    let state = test_state();
    let learner = seed_learner(state.repo.as_ref(), "ada@test.com").await;
    let catalog = seed_catalog(state.repo.as_ref()).await;
    let request = ToggleBookmarkRequest {
        topic_id: Some(catalog.topic.id),
    };

    let added = data(
        learner::toggle_bookmark(learner, State(state.clone()), ApiJson(request.clone())).await,
    );
    assert!(added.bookmarked);
    assert!(added.bookmark.is_some());
    assert_eq!(
        data(learner::list_bookmarks(learner, State(state.clone())).await).len(),
        1
    );

    let removed =
        data(learner::toggle_bookmark(learner, State(state.clone()), ApiJson(request)).await);
    assert!(!removed.bookmarked);
    assert!(removed.bookmark.is_none());

    let absent =
        learner::delete_bookmark(learner, State(state), Path(catalog.topic.id)).await;
    assert_eq!(status_of(absent), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bookmark_unknown_topic_is_404() {
    let state = test_state();
    let learner = seed_learner(state.repo.as_ref(), "ada@test.com").await;

    let result = learner::toggle_bookmark(
        learner,
        State(state),
        ApiJson(ToggleBookmarkRequest {
            topic_id: Some(Uuid::new_v4()),
        }),
    )
    .await;
    assert_eq!(status_of(result), StatusCode::NOT_FOUND);
}

// --- Notes ---

#[tokio::test]
async fn test_notes_are_private_to_their_owner() {
    let state = test_state();
    let owner = seed_learner(state.repo.as_ref(), "ada@test.com").await;
    let other = seed_learner(state.repo.as_ref(), "bob@test.com").await;
    let catalog = seed_catalog(state.repo.as_ref()).await;

    let (status, Json(body)) = learner::create_note(
        owner,
        State(state.clone()),
        ApiJson(CreateNoteRequest {
            topic_id: Some(catalog.topic.id),
            content: "  Eigenvectors keep direction  ".to_string(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    let note = body.data.unwrap();
    assert_eq!(note.content, "Eigenvectors keep direction");

    let foreign_update = learner::update_note(
        other,
        State(state.clone()),
        Path(note.id),
        ApiJson(UpdateNoteRequest {
            content: "hijacked".to_string(),
        }),
    )
    .await;
    assert_eq!(status_of(foreign_update), StatusCode::NOT_FOUND);

    let foreign_delete = learner::delete_note(other, State(state.clone()), Path(note.id)).await;
    assert_eq!(status_of(foreign_delete), StatusCode::NOT_FOUND);

    assert!(
        data(
            learner::list_notes(other, State(state.clone()), Query(NotesQuery::default())).await
        )
        .is_empty()
    );

    let edited = data(
        learner::update_note(
            owner,
            State(state.clone()),
            Path(note.id),
            ApiJson(UpdateNoteRequest {
                content: "Eigenvalues scale them".to_string(),
            }),
        )
        .await,
    );
    assert_eq!(edited.content, "Eigenvalues scale them");

    let listed = data(
        learner::list_notes(
            owner,
            State(state.clone()),
            Query(NotesQuery {
                topic_id: Some(catalog.topic.id),
            }),
        )
        .await,
    );
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].topic.topic_title_en, "Linear Algebra");

    learner::delete_note(owner, State(state), Path(note.id))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_empty_note_content_is_rejected() {
    let state = test_state();
    let learner = seed_learner(state.repo.as_ref(), "ada@test.com").await;
    let catalog = seed_catalog(state.repo.as_ref()).await;

    let result = learner::create_note(
        learner,
        State(state.clone()),
        ApiJson(CreateNoteRequest {
            topic_id: Some(catalog.topic.id),
            content: "   ".to_string(),
        }),
    )
    .await;
    assert_eq!(status_of(result), StatusCode::BAD_REQUEST);

    let blank_update = learner::update_note(
        learner,
        State(state),
        Path(Uuid::new_v4()),
        ApiJson(UpdateNoteRequest::default()),
    )
    .await;
    assert_eq!(status_of(blank_update), StatusCode::BAD_REQUEST);
}

// --- Badges ---

#[tokio::test]
async fn test_badge_overview_runs_the_check() {
    let state = test_state();
    let repo = state.repo.as_ref();
    ensure_default_badges(repo).await.unwrap();
    let learner = seed_learner(repo, "ada@test.com").await;
    let catalog = seed_catalog(repo).await;
    repo.upsert_progress(learner.id, catalog.topic.id, ProgressStatus::Completed)
        .await
        .unwrap();

    let first = data(learner::list_badges(learner, State(state.clone())).await);
    assert_eq!(first.all_badges.len(), 5);
    assert_eq!(first.completed_topics, 1);
    assert_eq!(first.newly_awarded.len(), 1);
    assert_eq!(first.user_badges.len(), 1);
    assert_eq!(first.user_badges[0].badge.slug, "first-step");

    let second = data(learner::list_badges(learner, State(state)).await);
    assert!(second.newly_awarded.is_empty());
    assert_eq!(second.user_badges.len(), 1);
}
