//! Fixtures shared by the integration test binaries.
#![allow(dead_code)]

use axum::Json;
use ml_roadmap::{
    AppConfig, AppState, InMemoryRepository, MockStorageService,
    auth::{self, AuthUser},
    error::{ApiResponse, AppError},
    models::{
        CreateChoiceRequest, CreatePhaseRequest, CreateQuestionRequest, CreateQuizRequest,
        CreateResourceRequest, CreateTopicRequest, CreateTrackRequest, NewUser, Phase, Quiz,
        Resource, ResourceType, Role, Topic, Track, User,
    },
    repository::{Repository, RepositoryState},
    storage::{StorageService, StorageState},
};
use std::sync::Arc;

pub const TEST_PASSWORD: &str = "secret123";

pub fn test_state() -> AppState {
    test_state_with(MockStorageService::new(), AppConfig::default())
}

pub fn test_state_with(storage: impl StorageService + 'static, config: AppConfig) -> AppState {
    AppState {
        repo: Arc::new(InMemoryRepository::new()) as RepositoryState,
        storage: Arc::new(storage) as StorageState,
        config,
    }
}

pub async fn seed_user(repo: &dyn Repository, email: &str, role: Role) -> User {
    repo.create_user(NewUser {
        email: email.to_string(),
        name: "Test User".to_string(),
        password_hash: auth::hash_password(TEST_PASSWORD).unwrap(),
        role,
    })
    .await
    .unwrap()
}

pub async fn seed_admin(repo: &dyn Repository) -> AuthUser {
    AuthUser::from(&seed_user(repo, "admin@test.com", Role::Admin).await)
}

pub async fn seed_learner(repo: &dyn Repository, email: &str) -> AuthUser {
    AuthUser::from(&seed_user(repo, email, Role::User).await)
}

/// One track with one phase holding one topic.
pub struct Catalog {
    pub track: Track,
    pub phase: Phase,
    pub topic: Topic,
}

pub fn track_request(slug: &str) -> CreateTrackRequest {
    CreateTrackRequest {
        slug: slug.to_string(),
        title_en: "Machine Learning".to_string(),
        title_tr: "Makine Öğrenmesi".to_string(),
        ..CreateTrackRequest::default()
    }
}

pub fn phase_request(track_id: uuid::Uuid, slug: &str) -> CreatePhaseRequest {
    CreatePhaseRequest {
        track_id: Some(track_id),
        slug: slug.to_string(),
        title_en: "Foundations".to_string(),
        title_tr: "Temeller".to_string(),
        ..CreatePhaseRequest::default()
    }
}

pub fn topic_request(phase_id: uuid::Uuid, slug: &str) -> CreateTopicRequest {
    CreateTopicRequest {
        phase_id: Some(phase_id),
        slug: slug.to_string(),
        title_en: "Linear Algebra".to_string(),
        title_tr: "Lineer Cebir".to_string(),
        ..CreateTopicRequest::default()
    }
}

pub fn resource_request(topic_id: uuid::Uuid) -> CreateResourceRequest {
    CreateResourceRequest {
        topic_id: Some(topic_id),
        title_en: "Matrix Cookbook".to_string(),
        title_tr: "Matris Yemek Kitabı".to_string(),
        resource_type: Some(ResourceType::Pdf),
        url: "https://example.com/matrix.pdf".to_string(),
        ..CreateResourceRequest::default()
    }
}

pub async fn seed_catalog(repo: &dyn Repository) -> Catalog {
    let track = repo.create_track(track_request("machine-learning")).await.unwrap();
    let phase = repo
        .create_phase(track.id, phase_request(track.id, "foundations"))
        .await
        .unwrap();
    let topic = repo
        .create_topic(phase.id, topic_request(phase.id, "linear-algebra"))
        .await
        .unwrap();
    Catalog {
        track,
        phase,
        topic,
    }
}

/// Extra topics in `phase`, named `topic-1`, `topic-2`, ...
pub async fn seed_topics(repo: &dyn Repository, phase_id: uuid::Uuid, count: usize) -> Vec<Topic> {
    let mut topics = Vec::with_capacity(count);
    for i in 1..=count {
        topics.push(
            repo.create_topic(phase_id, topic_request(phase_id, &format!("topic-{i}")))
                .await
                .unwrap(),
        );
    }
    topics
}

pub async fn seed_resource(repo: &dyn Repository, topic_id: uuid::Uuid) -> Resource {
    repo.create_resource(topic_id, resource_request(topic_id))
        .await
        .unwrap()
}

fn choice(en: &str, tr: &str, is_correct: bool) -> CreateChoiceRequest {
    CreateChoiceRequest {
        choice_text_en: en.to_string(),
        choice_text_tr: tr.to_string(),
        is_correct,
    }
}

/// Two questions; the correct choice is always the first one.
pub fn quiz_request(topic_id: uuid::Uuid) -> CreateQuizRequest {
    CreateQuizRequest {
        topic_id: Some(topic_id),
        title_en: "Vectors".to_string(),
        title_tr: "Vektörler".to_string(),
        passing_score: Some(70),
        questions: vec![
            CreateQuestionRequest {
                question_text_en: "What is a vector?".to_string(),
                question_text_tr: "Vektör nedir?".to_string(),
                explanation_en: Some("A vector has magnitude and direction.".to_string()),
                explanation_tr: Some("Vektörün büyüklüğü ve yönü vardır.".to_string()),
                choices: vec![
                    choice("Magnitude and direction", "Büyüklük ve yön", true),
                    choice("A single number", "Tek bir sayı", false),
                ],
            },
            CreateQuestionRequest {
                question_text_en: "What is a matrix?".to_string(),
                question_text_tr: "Matris nedir?".to_string(),
                choices: vec![
                    choice("A grid of numbers", "Sayı tablosu", true),
                    choice("A scalar", "Skaler", false),
                    choice("A vector", "Vektör", false),
                ],
                ..CreateQuestionRequest::default()
            },
        ],
        ..CreateQuizRequest::default()
    }
}

pub async fn seed_quiz(repo: &dyn Repository, topic_id: uuid::Uuid) -> Quiz {
    repo.create_quiz(topic_id, quiz_request(topic_id)).await.unwrap()
}

/// Unwraps the `data` of a successful handler result.
pub fn data<T: std::fmt::Debug>(result: Result<Json<ApiResponse<T>>, AppError>) -> T {
    let Json(response) = result.unwrap();
    assert!(response.success);
    response.data.unwrap()
}

/// The HTTP status an error result would be rendered with.
pub fn status_of<T: std::fmt::Debug>(result: Result<T, AppError>) -> axum::http::StatusCode {
    result.unwrap_err().status()
}
