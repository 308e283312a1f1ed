use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod activity;
pub mod auth;
pub mod badges;
pub mod config;
pub mod error;
pub mod grading;
pub mod handlers;
pub mod locale;
pub mod models;
pub mod repository;
pub mod storage;

// Routing split by access level (Public, Authenticated, Admin).
pub mod routes;
use auth::AuthUser;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};
pub use storage::{LocalDiskStorage, MockStorageService, StorageState};

/// ApiDoc
///
/// Aggregates every `#[utoipa::path]` handler and every `ToSchema` model into
/// the OpenAPI document served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health_check,
        handlers::auth::register_user, handlers::auth::login, handlers::auth::logout,
        handlers::auth::get_session, handlers::auth::get_profile, handlers::auth::update_profile,
        handlers::catalog::list_tracks, handlers::catalog::get_track, handlers::catalog::get_topic,
        handlers::catalog::list_resources, handlers::catalog::search,
        handlers::quiz::get_quiz, handlers::quiz::submit_quiz, handlers::quiz::list_attempts,
        handlers::learner::list_progress, handlers::learner::update_progress,
        handlers::learner::progress_stats, handlers::learner::list_bookmarks,
        handlers::learner::toggle_bookmark, handlers::learner::delete_bookmark,
        handlers::learner::list_notes, handlers::learner::create_note,
        handlers::learner::update_note, handlers::learner::delete_note,
        handlers::learner::list_badges,
        handlers::admin::get_admin_stats, handlers::admin::get_activity_logs,
        handlers::admin::list_tracks, handlers::admin::create_track, handlers::admin::get_track,
        handlers::admin::update_track, handlers::admin::delete_track,
        handlers::admin::list_tracks_with_phases,
        handlers::admin::list_phases, handlers::admin::create_phase, handlers::admin::get_phase,
        handlers::admin::update_phase, handlers::admin::delete_phase,
        handlers::admin::list_topics, handlers::admin::create_topic, handlers::admin::get_topic,
        handlers::admin::update_topic, handlers::admin::delete_topic,
        handlers::admin::list_resources, handlers::admin::create_resource,
        handlers::admin::get_resource, handlers::admin::update_resource,
        handlers::admin::delete_resource, handlers::admin::upload_resource_file,
        handlers::admin::list_quizzes, handlers::admin::create_quiz, handlers::admin::get_quiz,
        handlers::admin::update_quiz, handlers::admin::delete_quiz,
        handlers::admin::list_badges, handlers::admin::create_badge,
        handlers::admin_users::list_users, handlers::admin_users::get_user,
        handlers::admin_users::update_user, handlers::admin_users::delete_user,
    ),
    components(
        schemas(
            handlers::HealthStatus, models::Locale, models::Pagination,
            models::Role, models::User, models::ProfileView, models::UserStats,
            models::UserOverview, models::UserDetail, models::RegisterRequest,
            models::LoginRequest, models::LoginResponse, models::UpdateProfileRequest,
            models::AdminUpdateUserRequest,
            models::Difficulty, models::ResourceType, models::Track, models::Phase,
            models::Topic, models::Resource, models::TopicPath, models::TrackSummary,
            models::PhaseSummary, models::TopicEntry, models::ResourceEntry,
            models::TopicCounts, models::AdminTopicEntry, models::TrackDetail,
            models::TrackWithPhases, models::PhaseDetail, models::TrackTree, models::PhaseTree,
            models::TopicTree, models::TopicDetail, models::AdminTopicDetail,
            models::SearchResults, models::CreateTrackRequest, models::UpdateTrackRequest,
            models::CreatePhaseRequest, models::UpdatePhaseRequest, models::CreateTopicRequest,
            models::UpdateTopicRequest, models::CreateResourceRequest,
            models::UpdateResourceRequest,
            models::Quiz, models::Question, models::Choice, models::QuizAttempt,
            models::QuizAnswer, models::QuizSummary, models::QuestionWithChoices,
            models::QuizDetail, models::PublicChoice, models::PublicQuestion, models::PublicQuiz,
            models::CreateChoiceRequest, models::CreateQuestionRequest, models::CreateQuizRequest,
            models::UpdateQuizRequest, models::SubmittedAnswer, models::SubmitQuizRequest,
            models::QuestionResult, models::QuizSubmissionResult,
            models::ProgressStatus, models::ProgressItem, models::ProgressEntry,
            models::ProgressStats, models::UpdateProgressRequest, models::ProgressUpdate,
            models::Bookmark, models::BookmarkEntry, models::ToggleBookmarkRequest,
            models::BookmarkToggle, models::Note, models::NoteEntry, models::CreateNoteRequest,
            models::UpdateNoteRequest, models::Badge, models::UserBadge, models::EarnedBadge,
            models::CreateBadgeRequest, models::BadgeOverview,
            models::EntityCounts, models::ProgressOverview, models::RecentContent,
            models::AdminDashboardStats, models::CompletionRecord, models::ActivityKind,
            models::ActivityActor, models::Activity, models::ActivityLog, models::UploadedFile,
        )
    ),
    tags(
        (name = "ml-roadmap", description = "Bilingual ML learning roadmap API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single shared container of application services and configuration,
/// cloned into every request.
#[derive(Clone)]
pub struct AppState {
    /// Persistence: Postgres in production, in-memory for local runs and tests.
    pub repo: RepositoryState,
    /// Where uploaded PDFs are written.
    pub storage: StorageState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Guards the authenticated and admin routers. Resolving `AuthUser` rejects
/// the request with 401 when no valid session is present; on success the
/// identity is stored in the request extensions so the handler's own
/// `AuthUser` extractor does not hit the repository a second time.
async fn auth_middleware(auth_user: AuthUser, mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(auth_user);
    next.run(request).await
}

/// create_router
///
/// Assembles the API under `/api`, the uploads directory under `/uploads`,
/// the Swagger UI, the cookie jar, and the observability layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let api = Router::new()
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .nest(
            "/admin",
            admin::admin_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        );

    let uploads = ServeDir::new(&state.config.uploads_dir);

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api)
        .nest_service("/uploads", uploads)
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(CookieManagerLayer::new())
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the `http_request` span with method, URI and the `x-request-id`
/// set by `SetRequestIdLayer`, so every log line of one request shares an id.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
