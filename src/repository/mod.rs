use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        Badge, Bookmark, BookmarkEntry, CompletionRecord, CreateBadgeRequest, CreatePhaseRequest,
        CreateQuizRequest, CreateResourceRequest, CreateTopicRequest, CreateTrackRequest,
        Credentials, EarnedBadge, EntityCounts, NewQuizAttempt, NewUser, Note, NoteEntry, Phase,
        PhaseSummary, ProfileChanges, ProfileView, ProgressEntry, ProgressItem, ProgressStats,
        ProgressStatus, QuestionWithChoices, Quiz, QuizAttempt, QuizSummary, Resource,
        ResourceEntry, Topic, TopicCounts, TopicEntry, TopicFilter, TopicPath, Track, TrackSummary,
        UpdatePhaseRequest, UpdateQuizRequest, UpdateResourceRequest, UpdateTopicRequest,
        UpdateTrackRequest, User, UserChanges, UserFilter, UserStats,
    },
};

mod memory;
mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;

pub type RepoResult<T> = Result<T, AppError>;

/// Repository Trait
///
/// The abstract contract for all persistence operations. Handlers only ever see
/// `Arc<dyn Repository>`, so the Postgres store and the in-memory store are
/// interchangeable.
///
/// Conventions:
/// - lookups return `Ok(None)` when the row does not exist;
/// - updates return `Ok(None)` when the row to update does not exist;
/// - deletes return `Ok(false)` when nothing was deleted;
/// - unique-constraint violations surface as `AppError::BadRequest`.
///
/// Parent existence and "has children" checks are the caller's job; the
/// store only guarantees the cascades listed on each delete.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Round-trip to the backing store, used by the health check.
    async fn ping(&self) -> RepoResult<()>;

    // --- Users & Profiles ---
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    async fn get_credentials(&self, email: &str) -> RepoResult<Option<Credentials>>;
    /// Creates the account together with its default profile.
    async fn create_user(&self, user: NewUser) -> RepoResult<User>;
    async fn update_user(&self, id: Uuid, changes: UserChanges) -> RepoResult<Option<User>>;
    /// Deletes the account and everything it owns.
    async fn delete_user(&self, id: Uuid) -> RepoResult<bool>;
    /// Newest first. Returns the page and the total number of matches.
    async fn list_users(&self, filter: &UserFilter) -> RepoResult<(Vec<User>, i64)>;
    async fn get_profile(&self, user_id: Uuid) -> RepoResult<Option<ProfileView>>;
    async fn update_profile(
        &self,
        user_id: Uuid,
        changes: ProfileChanges,
    ) -> RepoResult<Option<ProfileView>>;
    async fn user_stats(&self, user_id: Uuid) -> RepoResult<UserStats>;

    // --- Tracks ---
    async fn list_tracks(&self) -> RepoResult<Vec<TrackSummary>>;
    async fn get_track(&self, id: Uuid) -> RepoResult<Option<Track>>;
    async fn get_track_by_slug(&self, slug: &str) -> RepoResult<Option<Track>>;
    async fn create_track(&self, req: CreateTrackRequest) -> RepoResult<Track>;
    async fn update_track(&self, id: Uuid, req: UpdateTrackRequest) -> RepoResult<Option<Track>>;
    async fn delete_track(&self, id: Uuid) -> RepoResult<bool>;

    // --- Phases ---
    async fn list_phases(&self, track_id: Option<Uuid>) -> RepoResult<Vec<PhaseSummary>>;
    async fn get_phase(&self, id: Uuid) -> RepoResult<Option<Phase>>;
    async fn get_phase_by_slug(&self, track_id: Uuid, slug: &str) -> RepoResult<Option<Phase>>;
    async fn create_phase(&self, track_id: Uuid, req: CreatePhaseRequest) -> RepoResult<Phase>;
    async fn update_phase(&self, id: Uuid, req: UpdatePhaseRequest) -> RepoResult<Option<Phase>>;
    async fn delete_phase(&self, id: Uuid) -> RepoResult<bool>;

    // --- Topics ---
    /// Filtered, paginated listing. Returns the page and the total number of matches.
    async fn list_topics(&self, filter: &TopicFilter) -> RepoResult<(Vec<TopicEntry>, i64)>;
    async fn topics_in_phase(&self, phase_id: Uuid) -> RepoResult<Vec<Topic>>;
    async fn get_topic(&self, id: Uuid) -> RepoResult<Option<Topic>>;
    async fn get_topic_by_slug(&self, phase_id: Uuid, slug: &str) -> RepoResult<Option<Topic>>;
    async fn topic_path(&self, topic_id: Uuid) -> RepoResult<Option<TopicPath>>;
    async fn topic_counts(&self, topic_id: Uuid) -> RepoResult<TopicCounts>;
    async fn create_topic(&self, phase_id: Uuid, req: CreateTopicRequest) -> RepoResult<Topic>;
    async fn update_topic(&self, id: Uuid, req: UpdateTopicRequest) -> RepoResult<Option<Topic>>;
    /// Cascades to resources, quizzes, progress items, bookmarks and notes.
    async fn delete_topic(&self, id: Uuid) -> RepoResult<bool>;
    /// Case-insensitive match on titles and descriptions in both languages.
    async fn search_topics(&self, term: &str, limit: i64) -> RepoResult<Vec<TopicEntry>>;
    async fn recent_topics(&self, limit: i64) -> RepoResult<Vec<TopicEntry>>;

    // --- Resources ---
    async fn list_resources(&self, topic_id: Option<Uuid>) -> RepoResult<Vec<ResourceEntry>>;
    async fn get_resource(&self, id: Uuid) -> RepoResult<Option<Resource>>;
    async fn create_resource(&self, topic_id: Uuid, req: CreateResourceRequest)
    -> RepoResult<Resource>;
    async fn update_resource(
        &self,
        id: Uuid,
        req: UpdateResourceRequest,
    ) -> RepoResult<Option<Resource>>;
    async fn delete_resource(&self, id: Uuid) -> RepoResult<bool>;
    async fn search_resources(&self, term: &str, limit: i64) -> RepoResult<Vec<ResourceEntry>>;
    async fn recent_resources(&self, limit: i64) -> RepoResult<Vec<ResourceEntry>>;

    // --- Quizzes ---
    async fn list_quizzes(&self, topic_id: Option<Uuid>) -> RepoResult<Vec<QuizSummary>>;
    async fn get_quiz(&self, id: Uuid) -> RepoResult<Option<Quiz>>;
    /// Questions ordered by position, each with its choices ordered by position.
    async fn quiz_questions(&self, quiz_id: Uuid) -> RepoResult<Vec<QuestionWithChoices>>;
    /// Inserts the quiz, its questions and their choices atomically.
    async fn create_quiz(&self, topic_id: Uuid, req: CreateQuizRequest) -> RepoResult<Quiz>;
    async fn update_quiz(&self, id: Uuid, req: UpdateQuizRequest) -> RepoResult<Option<Quiz>>;
    /// Cascades to questions, choices, attempts and answers.
    async fn delete_quiz(&self, id: Uuid) -> RepoResult<bool>;
    /// Inserts the attempt and its answers atomically.
    async fn record_attempt(&self, attempt: NewQuizAttempt) -> RepoResult<QuizAttempt>;
    async fn list_attempts(&self, user_id: Uuid, quiz_id: Option<Uuid>)
    -> RepoResult<Vec<QuizAttempt>>;

    // --- Progress ---
    /// Most recently updated first.
    async fn list_progress(&self, user_id: Uuid) -> RepoResult<Vec<ProgressEntry>>;
    /// Inserts or updates the (user, topic) item, maintaining `completed_at`.
    async fn upsert_progress(
        &self,
        user_id: Uuid,
        topic_id: Uuid,
        status: ProgressStatus,
    ) -> RepoResult<ProgressItem>;
    /// Counts per status for one user, or across all users when `None`.
    async fn progress_stats(&self, user_id: Option<Uuid>) -> RepoResult<ProgressStats>;
    async fn recent_completions(&self, limit: i64) -> RepoResult<Vec<CompletionRecord>>;

    // --- Bookmarks ---
    async fn list_bookmarks(&self, user_id: Uuid) -> RepoResult<Vec<BookmarkEntry>>;
    async fn find_bookmark(&self, user_id: Uuid, topic_id: Uuid) -> RepoResult<Option<Bookmark>>;
    async fn create_bookmark(&self, user_id: Uuid, topic_id: Uuid) -> RepoResult<Bookmark>;
    async fn delete_bookmark(&self, user_id: Uuid, topic_id: Uuid) -> RepoResult<bool>;

    // --- Notes ---
    /// Most recently updated first.
    async fn list_notes(&self, user_id: Uuid, topic_id: Option<Uuid>) -> RepoResult<Vec<NoteEntry>>;
    async fn create_note(&self, user_id: Uuid, topic_id: Uuid, content: String)
    -> RepoResult<Note>;
    /// Owner-only: updates only when `user_id` owns the note.
    async fn update_note(&self, id: Uuid, user_id: Uuid, content: String)
    -> RepoResult<Option<Note>>;
    /// Owner-only: deletes only when `user_id` owns the note.
    async fn delete_note(&self, id: Uuid, user_id: Uuid) -> RepoResult<bool>;

    // --- Badges ---
    /// Ordered by `required_count`.
    async fn list_badges(&self) -> RepoResult<Vec<Badge>>;
    async fn create_badge(&self, req: CreateBadgeRequest) -> RepoResult<Badge>;
    async fn user_badges(&self, user_id: Uuid) -> RepoResult<Vec<EarnedBadge>>;
    /// Idempotent: returns true if a row was inserted, false if the user already held it.
    async fn award_badge(&self, user_id: Uuid, badge_id: Uuid) -> RepoResult<bool>;

    // --- Admin ---
    async fn entity_counts(&self) -> RepoResult<EntityCounts>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;
