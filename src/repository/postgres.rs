use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, query_builder::QueryBuilder};
use std::collections::HashMap;
use uuid::Uuid;

use super::{RepoResult, Repository};
use crate::{
    error::AppError,
    models::{
        Badge, Bookmark, BookmarkEntry, Choice, CompletionRecord, CreateBadgeRequest,
        CreatePhaseRequest, CreateQuizRequest, CreateResourceRequest, CreateTopicRequest,
        CreateTrackRequest, Credentials, DEFAULT_PASSING_SCORE, EarnedBadge, EntityCounts,
        NewQuizAttempt, NewUser, Note, NoteEntry, Phase, PhaseSummary, ProfileChanges,
        ProfileView, ProgressEntry, ProgressItem, ProgressStats, ProgressStatus, Question,
        QuestionWithChoices, Quiz, QuizAttempt, QuizSummary, Resource, ResourceEntry, Topic,
        TopicCounts, TopicEntry, TopicFilter, TopicPath, Track, TrackSummary, UpdatePhaseRequest,
        UpdateQuizRequest, UpdateResourceRequest, UpdateTopicRequest, UpdateTrackRequest, User,
        UserChanges, UserFilter, UserStats,
    },
};

// --- Column Lists ---

const USER_COLUMNS: &str = "id, email, name, role, image, created_at, updated_at";
const TRACK_COLUMNS: &str = "id, slug, title_en, title_tr, description_en, description_tr, \
     icon, color, position, created_at, updated_at";
const PHASE_COLUMNS: &str = "id, track_id, slug, title_en, title_tr, description_en, \
     description_tr, position, duration_months, created_at, updated_at";
const TOPIC_COLUMNS: &str = "id, phase_id, slug, title_en, title_tr, description_en, \
     description_tr, content_en, content_tr, position, estimated_hours, difficulty, \
     created_at, updated_at";
const RESOURCE_COLUMNS: &str = "id, topic_id, title_en, title_tr, description_en, \
     description_tr, resource_type, url, position, duration_minutes, is_premium, \
     created_at, updated_at";
const QUIZ_COLUMNS: &str = "id, topic_id, title_en, title_tr, description_en, description_tr, \
     passing_score, time_limit_minutes, created_at, updated_at";
const PROGRESS_COLUMNS: &str =
    "id, user_id, topic_id, status, completed_at, created_at, updated_at";
const NOTE_COLUMNS: &str = "id, user_id, topic_id, content, created_at, updated_at";
const BADGE_COLUMNS: &str = "id, slug, name_en, name_tr, description_en, description_tr, icon, \
     required_count, created_at";

/// Breadcrumb columns. Expects the aliases `t` (topics), `ph` (phases) and `tr` (tracks).
const PATH_COLUMNS: &str = "t.id AS topic_id, t.slug AS topic_slug, \
     t.title_en AS topic_title_en, t.title_tr AS topic_title_tr, \
     ph.id AS phase_id, ph.slug AS phase_slug, \
     ph.title_en AS phase_title_en, ph.title_tr AS phase_title_tr, \
     tr.id AS track_id, tr.slug AS track_slug, \
     tr.title_en AS track_title_en, tr.title_tr AS track_title_tr";

const PATH_JOINS: &str =
    "JOIN phases ph ON ph.id = t.phase_id JOIN tracks tr ON tr.id = ph.track_id";

/// Topic rows joined with their breadcrumb. `phase_id` comes from the path columns.
fn topic_entry_select() -> String {
    format!(
        "SELECT t.id, t.slug, t.title_en, t.title_tr, t.description_en, t.description_tr, \
         t.content_en, t.content_tr, t.position, t.estimated_hours, t.difficulty, \
         t.created_at, t.updated_at, {PATH_COLUMNS} \
         FROM topics t {PATH_JOINS}"
    )
}

/// Resource rows joined with their topic breadcrumb. `topic_id` comes from the path columns.
fn resource_entry_select() -> String {
    format!(
        "SELECT r.id, r.title_en, r.title_tr, r.description_en, r.description_tr, \
         r.resource_type, r.url, r.position, r.duration_minutes, r.is_premium, \
         r.created_at, r.updated_at, {PATH_COLUMNS} \
         FROM resources r JOIN topics t ON t.id = r.topic_id {PATH_JOINS}"
    )
}

/// Maps constraint violations onto client errors; everything else stays a database error.
fn constraint_error(err: sqlx::Error, conflict: &str) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return AppError::BadRequest(conflict.to_string());
        }
        if db.is_foreign_key_violation() {
            return AppError::BadRequest(
                "The record is still referenced by other records".to_string(),
            );
        }
    }
    AppError::Database(err)
}

fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn push_user_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &UserFilter) {
    builder.push(" WHERE TRUE");
    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        builder
            .push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR email ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(role) = filter.role {
        builder.push(" AND role = ").push_bind(role);
    }
}

fn push_topic_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &TopicFilter) {
    builder.push(" WHERE TRUE");
    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        builder
            .push(" AND (t.title_en ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR t.title_tr ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR t.slug ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(phase_id) = filter.phase_id {
        builder.push(" AND t.phase_id = ").push_bind(phase_id);
    }
    if let Some(difficulty) = filter.difficulty {
        builder.push(" AND t.difficulty = ").push_bind(difficulty);
    }
}

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
/// Queries are runtime-checked (`query_as::<_, T>`) so the crate builds without
/// a live database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn ping(&self) -> RepoResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // --- Users & Profiles ---

    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_credentials(&self, email: &str) -> RepoResult<Option<Credentials>> {
        Ok(
            sqlx::query_as::<_, Credentials>("SELECT id, password_hash FROM users WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    /// create_user
    ///
    /// Inserts the account and its default profile in one transaction.
    async fn create_user(&self, user: NewUser) -> RepoResult<User> {
        let mut tx = self.pool.begin().await?;
        let sql = format!(
            "INSERT INTO users (id, email, name, password_hash, role) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        );
        let created = sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.email)
            .bind(&user.name)
            .bind(&user.password_hash)
            .bind(user.role)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| constraint_error(e, "A user with this email already exists"))?;

        sqlx::query("INSERT INTO profiles (user_id) VALUES ($1)")
            .bind(created.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::debug!(user_id = %created.id, "user created");
        Ok(created)
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> RepoResult<Option<User>> {
        let sql = format!(
            "UPDATE users SET \
                name = COALESCE($2, name), \
                image = COALESCE($3, image), \
                role = COALESCE($4, role), \
                updated_at = NOW() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(changes.name)
            .bind(changes.image)
            .bind(changes.role)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_user(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// list_users
    ///
    /// Uses QueryBuilder for the optional filters; the count query shares the
    /// same WHERE clause so pagination totals stay consistent.
    async fn list_users(&self, filter: &UserFilter) -> RepoResult<(Vec<User>, i64)> {
        let mut count: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM users");
        push_user_filters(&mut count, filter);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users"));
        push_user_filters(&mut builder, filter);
        builder
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(filter.offset);
        let users = builder
            .build_query_as::<User>()
            .fetch_all(&self.pool)
            .await?;

        Ok((users, total))
    }

    async fn get_profile(&self, user_id: Uuid) -> RepoResult<Option<ProfileView>> {
        Ok(sqlx::query_as::<_, ProfileView>(
            "SELECT u.id, u.email, u.name, u.role, u.image, p.bio, \
                COALESCE(p.preferred_language, 'en'::locale) AS preferred_language, \
                COALESCE(p.level, 1) AS level, \
                COALESCE(p.experience_points, 0) AS experience_points \
             FROM users u LEFT JOIN profiles p ON p.user_id = u.id \
             WHERE u.id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        changes: ProfileChanges,
    ) -> RepoResult<Option<ProfileView>> {
        if self.get_user(user_id).await?.is_none() {
            return Ok(None);
        }
        sqlx::query(
            "INSERT INTO profiles (user_id, bio, preferred_language) \
             VALUES ($1, $2, COALESCE($3, 'en'::locale)) \
             ON CONFLICT (user_id) DO UPDATE SET \
                bio = COALESCE($2, profiles.bio), \
                preferred_language = COALESCE($3, profiles.preferred_language), \
                updated_at = NOW()",
        )
        .bind(user_id)
        .bind(changes.bio)
        .bind(changes.preferred_language)
        .execute(&self.pool)
        .await?;
        self.get_profile(user_id).await
    }

    async fn user_stats(&self, user_id: Uuid) -> RepoResult<UserStats> {
        Ok(sqlx::query_as::<_, UserStats>(
            "SELECT \
                (SELECT COUNT(*) FROM progress_items WHERE user_id = $1) AS total_progress, \
                (SELECT COUNT(*) FROM progress_items WHERE user_id = $1 AND status = 'completed') AS completed_topics, \
                (SELECT COUNT(*) FROM progress_items WHERE user_id = $1 AND status = 'in_progress') AS in_progress_topics, \
                (SELECT COUNT(*) FROM user_badges WHERE user_id = $1) AS total_badges, \
                (SELECT COUNT(*) FROM bookmarks WHERE user_id = $1) AS total_bookmarks, \
                (SELECT COUNT(*) FROM notes WHERE user_id = $1) AS total_notes, \
                (SELECT COUNT(DISTINCT quiz_id) FROM quiz_attempts WHERE user_id = $1 AND passed) AS quizzes_passed",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?)
    }

    // --- Tracks ---

    async fn list_tracks(&self) -> RepoResult<Vec<TrackSummary>> {
        let sql = format!(
            "SELECT {TRACK_COLUMNS}, \
                (SELECT COUNT(*) FROM phases ph WHERE ph.track_id = tracks.id) AS phase_count \
             FROM tracks ORDER BY position, created_at"
        );
        Ok(sqlx::query_as::<_, TrackSummary>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_track(&self, id: Uuid) -> RepoResult<Option<Track>> {
        let sql = format!("SELECT {TRACK_COLUMNS} FROM tracks WHERE id = $1");
        Ok(sqlx::query_as::<_, Track>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_track_by_slug(&self, slug: &str) -> RepoResult<Option<Track>> {
        let sql = format!("SELECT {TRACK_COLUMNS} FROM tracks WHERE slug = $1");
        Ok(sqlx::query_as::<_, Track>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_track(&self, req: CreateTrackRequest) -> RepoResult<Track> {
        let sql = format!(
            "INSERT INTO tracks (id, slug, title_en, title_tr, description_en, description_tr, icon, color, position) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, \
                COALESCE($9, (SELECT COALESCE(MAX(position) + 1, 0) FROM tracks))) \
             RETURNING {TRACK_COLUMNS}"
        );
        sqlx::query_as::<_, Track>(&sql)
            .bind(Uuid::new_v4())
            .bind(req.slug.trim())
            .bind(req.title_en.trim())
            .bind(req.title_tr.trim())
            .bind(req.description_en)
            .bind(req.description_tr)
            .bind(req.icon)
            .bind(req.color)
            .bind(req.position)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "A track with this slug already exists"))
    }

    async fn update_track(&self, id: Uuid, req: UpdateTrackRequest) -> RepoResult<Option<Track>> {
        let sql = format!(
            "UPDATE tracks SET \
                slug = COALESCE($2, slug), \
                title_en = COALESCE($3, title_en), \
                title_tr = COALESCE($4, title_tr), \
                description_en = COALESCE($5, description_en), \
                description_tr = COALESCE($6, description_tr), \
                icon = COALESCE($7, icon), \
                color = COALESCE($8, color), \
                position = COALESCE($9, position), \
                updated_at = NOW() \
             WHERE id = $1 RETURNING {TRACK_COLUMNS}"
        );
        sqlx::query_as::<_, Track>(&sql)
            .bind(id)
            .bind(req.slug)
            .bind(req.title_en)
            .bind(req.title_tr)
            .bind(req.description_en)
            .bind(req.description_tr)
            .bind(req.icon)
            .bind(req.color)
            .bind(req.position)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "A track with this slug already exists"))
    }

    async fn delete_track(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM tracks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "Track is still in use"))?;
        Ok(result.rows_affected() > 0)
    }

    // --- Phases ---

    async fn list_phases(&self, track_id: Option<Uuid>) -> RepoResult<Vec<PhaseSummary>> {
        let sql = format!(
            "SELECT {PHASE_COLUMNS}, \
                (SELECT COUNT(*) FROM topics t WHERE t.phase_id = phases.id) AS topic_count \
             FROM phases \
             WHERE ($1::uuid IS NULL OR track_id = $1) \
             ORDER BY track_id, position, created_at"
        );
        Ok(sqlx::query_as::<_, PhaseSummary>(&sql)
            .bind(track_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_phase(&self, id: Uuid) -> RepoResult<Option<Phase>> {
        let sql = format!("SELECT {PHASE_COLUMNS} FROM phases WHERE id = $1");
        Ok(sqlx::query_as::<_, Phase>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_phase_by_slug(&self, track_id: Uuid, slug: &str) -> RepoResult<Option<Phase>> {
        let sql = format!("SELECT {PHASE_COLUMNS} FROM phases WHERE track_id = $1 AND slug = $2");
        Ok(sqlx::query_as::<_, Phase>(&sql)
            .bind(track_id)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_phase(&self, track_id: Uuid, req: CreatePhaseRequest) -> RepoResult<Phase> {
        let sql = format!(
            "INSERT INTO phases (id, track_id, slug, title_en, title_tr, description_en, description_tr, position, duration_months) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, \
                COALESCE($8, (SELECT COALESCE(MAX(position) + 1, 0) FROM phases WHERE track_id = $2)), \
                COALESCE($9, 1)) \
             RETURNING {PHASE_COLUMNS}"
        );
        sqlx::query_as::<_, Phase>(&sql)
            .bind(Uuid::new_v4())
            .bind(track_id)
            .bind(req.slug.trim())
            .bind(req.title_en.trim())
            .bind(req.title_tr.trim())
            .bind(req.description_en)
            .bind(req.description_tr)
            .bind(req.position)
            .bind(req.duration_months)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "A phase with this slug already exists in the track"))
    }

    async fn update_phase(&self, id: Uuid, req: UpdatePhaseRequest) -> RepoResult<Option<Phase>> {
        let sql = format!(
            "UPDATE phases SET \
                slug = COALESCE($2, slug), \
                title_en = COALESCE($3, title_en), \
                title_tr = COALESCE($4, title_tr), \
                description_en = COALESCE($5, description_en), \
                description_tr = COALESCE($6, description_tr), \
                position = COALESCE($7, position), \
                duration_months = COALESCE($8, duration_months), \
                updated_at = NOW() \
             WHERE id = $1 RETURNING {PHASE_COLUMNS}"
        );
        sqlx::query_as::<_, Phase>(&sql)
            .bind(id)
            .bind(req.slug)
            .bind(req.title_en)
            .bind(req.title_tr)
            .bind(req.description_en)
            .bind(req.description_tr)
            .bind(req.position)
            .bind(req.duration_months)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "A phase with this slug already exists in the track"))
    }

    async fn delete_phase(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM phases WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "Phase is still in use"))?;
        Ok(result.rows_affected() > 0)
    }

    // --- Topics ---

    async fn list_topics(&self, filter: &TopicFilter) -> RepoResult<(Vec<TopicEntry>, i64)> {
        let mut count: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT COUNT(*) FROM topics t {PATH_JOINS}"));
        push_topic_filters(&mut count, filter);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(topic_entry_select());
        push_topic_filters(&mut builder, filter);
        builder
            .push(" ORDER BY tr.position, ph.position, t.position, t.created_at LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(filter.offset);
        let topics = builder
            .build_query_as::<TopicEntry>()
            .fetch_all(&self.pool)
            .await?;

        Ok((topics, total))
    }

    async fn topics_in_phase(&self, phase_id: Uuid) -> RepoResult<Vec<Topic>> {
        let sql = format!(
            "SELECT {TOPIC_COLUMNS} FROM topics WHERE phase_id = $1 ORDER BY position, created_at"
        );
        Ok(sqlx::query_as::<_, Topic>(&sql)
            .bind(phase_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_topic(&self, id: Uuid) -> RepoResult<Option<Topic>> {
        let sql = format!("SELECT {TOPIC_COLUMNS} FROM topics WHERE id = $1");
        Ok(sqlx::query_as::<_, Topic>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_topic_by_slug(&self, phase_id: Uuid, slug: &str) -> RepoResult<Option<Topic>> {
        let sql = format!("SELECT {TOPIC_COLUMNS} FROM topics WHERE phase_id = $1 AND slug = $2");
        Ok(sqlx::query_as::<_, Topic>(&sql)
            .bind(phase_id)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn topic_path(&self, topic_id: Uuid) -> RepoResult<Option<TopicPath>> {
        let sql = format!("SELECT {PATH_COLUMNS} FROM topics t {PATH_JOINS} WHERE t.id = $1");
        Ok(sqlx::query_as::<_, TopicPath>(&sql)
            .bind(topic_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn topic_counts(&self, topic_id: Uuid) -> RepoResult<TopicCounts> {
        Ok(sqlx::query_as::<_, TopicCounts>(
            "SELECT \
                (SELECT COUNT(*) FROM resources WHERE topic_id = $1) AS resources, \
                (SELECT COUNT(*) FROM quizzes WHERE topic_id = $1) AS quizzes, \
                (SELECT COUNT(*) FROM progress_items WHERE topic_id = $1) AS progress_items",
        )
        .bind(topic_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn create_topic(&self, phase_id: Uuid, req: CreateTopicRequest) -> RepoResult<Topic> {
        let sql = format!(
            "INSERT INTO topics (id, phase_id, slug, title_en, title_tr, description_en, description_tr, \
                content_en, content_tr, position, estimated_hours, difficulty) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, \
                COALESCE($10, (SELECT COALESCE(MAX(position) + 1, 0) FROM topics WHERE phase_id = $2)), \
                $11, $12) \
             RETURNING {TOPIC_COLUMNS}"
        );
        sqlx::query_as::<_, Topic>(&sql)
            .bind(Uuid::new_v4())
            .bind(phase_id)
            .bind(req.slug.trim())
            .bind(req.title_en.trim())
            .bind(req.title_tr.trim())
            .bind(req.description_en)
            .bind(req.description_tr)
            .bind(req.content_en)
            .bind(req.content_tr)
            .bind(req.position)
            .bind(req.estimated_hours)
            .bind(req.difficulty)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "A topic with this slug already exists in the phase"))
    }

    async fn update_topic(&self, id: Uuid, req: UpdateTopicRequest) -> RepoResult<Option<Topic>> {
        let sql = format!(
            "UPDATE topics SET \
                phase_id = COALESCE($2, phase_id), \
                slug = COALESCE($3, slug), \
                title_en = COALESCE($4, title_en), \
                title_tr = COALESCE($5, title_tr), \
                description_en = COALESCE($6, description_en), \
                description_tr = COALESCE($7, description_tr), \
                content_en = COALESCE($8, content_en), \
                content_tr = COALESCE($9, content_tr), \
                position = COALESCE($10, position), \
                estimated_hours = COALESCE($11, estimated_hours), \
                difficulty = COALESCE($12, difficulty), \
                updated_at = NOW() \
             WHERE id = $1 RETURNING {TOPIC_COLUMNS}"
        );
        sqlx::query_as::<_, Topic>(&sql)
            .bind(id)
            .bind(req.phase_id)
            .bind(req.slug)
            .bind(req.title_en)
            .bind(req.title_tr)
            .bind(req.description_en)
            .bind(req.description_tr)
            .bind(req.content_en)
            .bind(req.content_tr)
            .bind(req.position)
            .bind(req.estimated_hours)
            .bind(req.difficulty)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "A topic with this slug already exists in the phase"))
    }

    async fn delete_topic(&self, id: Uuid) -> RepoResult<bool> {
        // Children are removed by ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM topics WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn search_topics(&self, term: &str, limit: i64) -> RepoResult<Vec<TopicEntry>> {
        let sql = format!(
            "{} WHERE t.title_en ILIKE $1 OR t.title_tr ILIKE $1 \
                OR t.description_en ILIKE $1 OR t.description_tr ILIKE $1 \
             ORDER BY t.title_en LIMIT $2",
            topic_entry_select()
        );
        Ok(sqlx::query_as::<_, TopicEntry>(&sql)
            .bind(like_pattern(term))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn recent_topics(&self, limit: i64) -> RepoResult<Vec<TopicEntry>> {
        let sql = format!("{} ORDER BY t.created_at DESC LIMIT $1", topic_entry_select());
        Ok(sqlx::query_as::<_, TopicEntry>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?)
    }

    // --- Resources ---

    async fn list_resources(&self, topic_id: Option<Uuid>) -> RepoResult<Vec<ResourceEntry>> {
        let sql = format!(
            "{} WHERE ($1::uuid IS NULL OR r.topic_id = $1) \
             ORDER BY tr.position, ph.position, t.position, r.position, r.created_at",
            resource_entry_select()
        );
        Ok(sqlx::query_as::<_, ResourceEntry>(&sql)
            .bind(topic_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_resource(&self, id: Uuid) -> RepoResult<Option<Resource>> {
        let sql = format!("SELECT {RESOURCE_COLUMNS} FROM resources WHERE id = $1");
        Ok(sqlx::query_as::<_, Resource>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_resource(
        &self,
        topic_id: Uuid,
        req: CreateResourceRequest,
    ) -> RepoResult<Resource> {
        let sql = format!(
            "INSERT INTO resources (id, topic_id, title_en, title_tr, description_en, description_tr, \
                resource_type, url, position, duration_minutes, is_premium) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, \
                COALESCE($9, (SELECT COALESCE(MAX(position) + 1, 0) FROM resources WHERE topic_id = $2)), \
                $10, $11) \
             RETURNING {RESOURCE_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Resource>(&sql)
            .bind(Uuid::new_v4())
            .bind(topic_id)
            .bind(req.title_en.trim())
            .bind(req.title_tr.trim())
            .bind(req.description_en)
            .bind(req.description_tr)
            .bind(req.resource_type.unwrap_or_default())
            .bind(req.url.trim())
            .bind(req.position)
            .bind(req.duration_minutes)
            .bind(req.is_premium.unwrap_or(false))
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_resource(
        &self,
        id: Uuid,
        req: UpdateResourceRequest,
    ) -> RepoResult<Option<Resource>> {
        let sql = format!(
            "UPDATE resources SET \
                topic_id = COALESCE($2, topic_id), \
                title_en = COALESCE($3, title_en), \
                title_tr = COALESCE($4, title_tr), \
                description_en = COALESCE($5, description_en), \
                description_tr = COALESCE($6, description_tr), \
                resource_type = COALESCE($7, resource_type), \
                url = COALESCE($8, url), \
                position = COALESCE($9, position), \
                duration_minutes = COALESCE($10, duration_minutes), \
                is_premium = COALESCE($11, is_premium), \
                updated_at = NOW() \
             WHERE id = $1 RETURNING {RESOURCE_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Resource>(&sql)
            .bind(id)
            .bind(req.topic_id)
            .bind(req.title_en)
            .bind(req.title_tr)
            .bind(req.description_en)
            .bind(req.description_tr)
            .bind(req.resource_type)
            .bind(req.url)
            .bind(req.position)
            .bind(req.duration_minutes)
            .bind(req.is_premium)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_resource(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM resources WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn search_resources(&self, term: &str, limit: i64) -> RepoResult<Vec<ResourceEntry>> {
        let sql = format!(
            "{} WHERE r.title_en ILIKE $1 OR r.title_tr ILIKE $1 \
                OR r.description_en ILIKE $1 OR r.description_tr ILIKE $1 \
             ORDER BY r.title_en LIMIT $2",
            resource_entry_select()
        );
        Ok(sqlx::query_as::<_, ResourceEntry>(&sql)
            .bind(like_pattern(term))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn recent_resources(&self, limit: i64) -> RepoResult<Vec<ResourceEntry>> {
        let sql = format!("{} ORDER BY r.created_at DESC LIMIT $1", resource_entry_select());
        Ok(sqlx::query_as::<_, ResourceEntry>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?)
    }

    // --- Quizzes ---

    async fn list_quizzes(&self, topic_id: Option<Uuid>) -> RepoResult<Vec<QuizSummary>> {
        let sql = format!(
            "SELECT {QUIZ_COLUMNS}, \
                (SELECT COUNT(*) FROM questions qs WHERE qs.quiz_id = quizzes.id) AS question_count \
             FROM quizzes \
             WHERE ($1::uuid IS NULL OR topic_id = $1) \
             ORDER BY created_at DESC"
        );
        Ok(sqlx::query_as::<_, QuizSummary>(&sql)
            .bind(topic_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_quiz(&self, id: Uuid) -> RepoResult<Option<Quiz>> {
        let sql = format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = $1");
        Ok(sqlx::query_as::<_, Quiz>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn quiz_questions(&self, quiz_id: Uuid) -> RepoResult<Vec<QuestionWithChoices>> {
        let questions = sqlx::query_as::<_, Question>(
            "SELECT id, quiz_id, question_text_en, question_text_tr, explanation_en, explanation_tr, position \
             FROM questions WHERE quiz_id = $1 ORDER BY position",
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;

        let question_ids: Vec<Uuid> = questions.iter().map(|q| q.id).collect();
        let choices = sqlx::query_as::<_, Choice>(
            "SELECT id, question_id, choice_text_en, choice_text_tr, is_correct, position \
             FROM choices WHERE question_id = ANY($1) ORDER BY position",
        )
        .bind(&question_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_question: HashMap<Uuid, Vec<Choice>> = HashMap::new();
        for choice in choices {
            by_question.entry(choice.question_id).or_default().push(choice);
        }

        Ok(questions
            .into_iter()
            .map(|question| {
                let choices = by_question.remove(&question.id).unwrap_or_default();
                QuestionWithChoices { question, choices }
            })
            .collect())
    }

    /// create_quiz
    ///
    /// Inserts the quiz, its questions and choices inside one transaction so a
    /// half-written quiz is never visible.
    async fn create_quiz(&self, topic_id: Uuid, req: CreateQuizRequest) -> RepoResult<Quiz> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO quizzes (id, topic_id, title_en, title_tr, description_en, description_tr, \
                passing_score, time_limit_minutes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {QUIZ_COLUMNS}"
        );
        let quiz = sqlx::query_as::<_, Quiz>(&sql)
            .bind(Uuid::new_v4())
            .bind(topic_id)
            .bind(req.title_en.trim())
            .bind(req.title_tr.trim())
            .bind(req.description_en)
            .bind(req.description_tr)
            .bind(req.passing_score.unwrap_or(DEFAULT_PASSING_SCORE))
            .bind(req.time_limit_minutes)
            .fetch_one(&mut *tx)
            .await?;

        for (q_pos, question) in req.questions.into_iter().enumerate() {
            let question_id = Uuid::new_v4();
            sqlx::query(
                "INSERT INTO questions (id, quiz_id, question_text_en, question_text_tr, \
                    explanation_en, explanation_tr, position) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(question_id)
            .bind(quiz.id)
            .bind(question.question_text_en)
            .bind(question.question_text_tr)
            .bind(question.explanation_en)
            .bind(question.explanation_tr)
            .bind(q_pos as i32)
            .execute(&mut *tx)
            .await?;

            for (c_pos, choice) in question.choices.into_iter().enumerate() {
                sqlx::query(
                    "INSERT INTO choices (id, question_id, choice_text_en, choice_text_tr, is_correct, position) \
                     VALUES ($1, $2, $3, $4, $5, $6)",
                )
                .bind(Uuid::new_v4())
                .bind(question_id)
                .bind(choice.choice_text_en)
                .bind(choice.choice_text_tr)
                .bind(choice.is_correct)
                .bind(c_pos as i32)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(quiz)
    }

    async fn update_quiz(&self, id: Uuid, req: UpdateQuizRequest) -> RepoResult<Option<Quiz>> {
        let sql = format!(
            "UPDATE quizzes SET \
                title_en = COALESCE($2, title_en), \
                title_tr = COALESCE($3, title_tr), \
                description_en = COALESCE($4, description_en), \
                description_tr = COALESCE($5, description_tr), \
                passing_score = COALESCE($6, passing_score), \
                time_limit_minutes = COALESCE($7, time_limit_minutes), \
                updated_at = NOW() \
             WHERE id = $1 RETURNING {QUIZ_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Quiz>(&sql)
            .bind(id)
            .bind(req.title_en)
            .bind(req.title_tr)
            .bind(req.description_en)
            .bind(req.description_tr)
            .bind(req.passing_score)
            .bind(req.time_limit_minutes)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_quiz(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM quizzes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn record_attempt(&self, attempt: NewQuizAttempt) -> RepoResult<QuizAttempt> {
        let mut tx = self.pool.begin().await?;

        let saved = sqlx::query_as::<_, QuizAttempt>(
            "INSERT INTO quiz_attempts (id, user_id, quiz_id, score, correct_answers, total_questions, passed) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING id, user_id, quiz_id, score, correct_answers, total_questions, passed, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(attempt.user_id)
        .bind(attempt.quiz_id)
        .bind(attempt.score)
        .bind(attempt.correct_answers)
        .bind(attempt.total_questions)
        .bind(attempt.passed)
        .fetch_one(&mut *tx)
        .await?;

        for answer in attempt.answers {
            sqlx::query(
                "INSERT INTO quiz_answers (id, attempt_id, question_id, choice_id, is_correct) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(Uuid::new_v4())
            .bind(saved.id)
            .bind(answer.question_id)
            .bind(answer.choice_id)
            .bind(answer.is_correct)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(saved)
    }

    async fn list_attempts(
        &self,
        user_id: Uuid,
        quiz_id: Option<Uuid>,
    ) -> RepoResult<Vec<QuizAttempt>> {
        Ok(sqlx::query_as::<_, QuizAttempt>(
            "SELECT id, user_id, quiz_id, score, correct_answers, total_questions, passed, created_at \
             FROM quiz_attempts \
             WHERE user_id = $1 AND ($2::uuid IS NULL OR quiz_id = $2) \
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?)
    }

    // --- Progress ---

    async fn list_progress(&self, user_id: Uuid) -> RepoResult<Vec<ProgressEntry>> {
        let sql = format!(
            "SELECT p.id, p.user_id, p.status, p.completed_at, p.created_at, p.updated_at, {PATH_COLUMNS} \
             FROM progress_items p JOIN topics t ON t.id = p.topic_id {PATH_JOINS} \
             WHERE p.user_id = $1 ORDER BY p.updated_at DESC"
        );
        Ok(sqlx::query_as::<_, ProgressEntry>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    /// upsert_progress
    ///
    /// A re-completed item keeps its first `completed_at`; any other status clears it.
    async fn upsert_progress(
        &self,
        user_id: Uuid,
        topic_id: Uuid,
        status: ProgressStatus,
    ) -> RepoResult<ProgressItem> {
        let completed_at = (status == ProgressStatus::Completed).then(Utc::now);
        let sql = format!(
            "INSERT INTO progress_items (id, user_id, topic_id, status, completed_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (user_id, topic_id) DO UPDATE SET \
                status = EXCLUDED.status, \
                completed_at = CASE WHEN EXCLUDED.status = 'completed' \
                    THEN COALESCE(progress_items.completed_at, EXCLUDED.completed_at) \
                    ELSE NULL END, \
                updated_at = NOW() \
             RETURNING {PROGRESS_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, ProgressItem>(&sql)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(topic_id)
            .bind(status)
            .bind(completed_at)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn progress_stats(&self, user_id: Option<Uuid>) -> RepoResult<ProgressStats> {
        Ok(sqlx::query_as::<_, ProgressStats>(
            "SELECT \
                COUNT(*) FILTER (WHERE status = 'planned') AS planned, \
                COUNT(*) FILTER (WHERE status = 'in_progress') AS in_progress, \
                COUNT(*) FILTER (WHERE status = 'completed') AS completed, \
                COUNT(*) AS total \
             FROM progress_items WHERE ($1::uuid IS NULL OR user_id = $1)",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn recent_completions(&self, limit: i64) -> RepoResult<Vec<CompletionRecord>> {
        Ok(sqlx::query_as::<_, CompletionRecord>(
            "SELECT p.id AS progress_id, u.id AS user_id, u.name AS user_name, u.email AS user_email, \
                t.id AS topic_id, t.title_en AS topic_title_en, t.title_tr AS topic_title_tr, \
                p.completed_at \
             FROM progress_items p \
             JOIN users u ON u.id = p.user_id \
             JOIN topics t ON t.id = p.topic_id \
             WHERE p.status = 'completed' AND p.completed_at IS NOT NULL \
             ORDER BY p.completed_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    // --- Bookmarks ---

    async fn list_bookmarks(&self, user_id: Uuid) -> RepoResult<Vec<BookmarkEntry>> {
        let sql = format!(
            "SELECT b.id, b.user_id, b.created_at, {PATH_COLUMNS} \
             FROM bookmarks b JOIN topics t ON t.id = b.topic_id {PATH_JOINS} \
             WHERE b.user_id = $1 ORDER BY b.created_at DESC"
        );
        Ok(sqlx::query_as::<_, BookmarkEntry>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_bookmark(&self, user_id: Uuid, topic_id: Uuid) -> RepoResult<Option<Bookmark>> {
        Ok(sqlx::query_as::<_, Bookmark>(
            "SELECT id, user_id, topic_id, created_at FROM bookmarks WHERE user_id = $1 AND topic_id = $2",
        )
        .bind(user_id)
        .bind(topic_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn create_bookmark(&self, user_id: Uuid, topic_id: Uuid) -> RepoResult<Bookmark> {
        sqlx::query_as::<_, Bookmark>(
            "INSERT INTO bookmarks (id, user_id, topic_id) VALUES ($1, $2, $3) \
             RETURNING id, user_id, topic_id, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(topic_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| constraint_error(e, "Topic is already bookmarked"))
    }

    async fn delete_bookmark(&self, user_id: Uuid, topic_id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM bookmarks WHERE user_id = $1 AND topic_id = $2")
            .bind(user_id)
            .bind(topic_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- Notes ---

    async fn list_notes(&self, user_id: Uuid, topic_id: Option<Uuid>) -> RepoResult<Vec<NoteEntry>> {
        let sql = format!(
            "SELECT n.id, n.user_id, n.content, n.created_at, n.updated_at, {PATH_COLUMNS} \
             FROM notes n JOIN topics t ON t.id = n.topic_id {PATH_JOINS} \
             WHERE n.user_id = $1 AND ($2::uuid IS NULL OR n.topic_id = $2) \
             ORDER BY n.updated_at DESC"
        );
        Ok(sqlx::query_as::<_, NoteEntry>(&sql)
            .bind(user_id)
            .bind(topic_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn create_note(&self, user_id: Uuid, topic_id: Uuid, content: String) -> RepoResult<Note> {
        let sql = format!(
            "INSERT INTO notes (id, user_id, topic_id, content) VALUES ($1, $2, $3, $4) \
             RETURNING {NOTE_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Note>(&sql)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(topic_id)
            .bind(content)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_note(&self, id: Uuid, user_id: Uuid, content: String) -> RepoResult<Option<Note>> {
        let sql = format!(
            "UPDATE notes SET content = $3, updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 RETURNING {NOTE_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Note>(&sql)
            .bind(id)
            .bind(user_id)
            .bind(content)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_note(&self, id: Uuid, user_id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- Badges ---

    async fn list_badges(&self) -> RepoResult<Vec<Badge>> {
        let sql = format!("SELECT {BADGE_COLUMNS} FROM badges ORDER BY required_count, created_at");
        Ok(sqlx::query_as::<_, Badge>(&sql).fetch_all(&self.pool).await?)
    }

    async fn create_badge(&self, req: CreateBadgeRequest) -> RepoResult<Badge> {
        let sql = format!(
            "INSERT INTO badges (id, slug, name_en, name_tr, description_en, description_tr, icon, required_count) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {BADGE_COLUMNS}"
        );
        sqlx::query_as::<_, Badge>(&sql)
            .bind(Uuid::new_v4())
            .bind(req.slug.trim())
            .bind(req.name_en.trim())
            .bind(req.name_tr.trim())
            .bind(req.description_en)
            .bind(req.description_tr)
            .bind(req.icon)
            .bind(req.required_count.unwrap_or(1))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "A badge with this slug already exists"))
    }

    async fn user_badges(&self, user_id: Uuid) -> RepoResult<Vec<EarnedBadge>> {
        Ok(sqlx::query_as::<_, EarnedBadge>(
            "SELECT b.id, b.slug, b.name_en, b.name_tr, b.description_en, b.description_tr, b.icon, \
                b.required_count, b.created_at, ub.earned_at \
             FROM user_badges ub JOIN badges b ON b.id = ub.badge_id \
             WHERE ub.user_id = $1 ORDER BY ub.earned_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// award_badge
    ///
    /// Idempotent insert. ON CONFLICT DO NOTHING on the (user_id, badge_id)
    /// unique constraint makes a concurrent second award a no-op.
    async fn award_badge(&self, user_id: Uuid, badge_id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query(
            "INSERT INTO user_badges (id, user_id, badge_id) VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, badge_id) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(badge_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    // --- Admin ---

    async fn entity_counts(&self) -> RepoResult<EntityCounts> {
        Ok(sqlx::query_as::<_, EntityCounts>(
            "SELECT \
                (SELECT COUNT(*) FROM users) AS total_users, \
                (SELECT COUNT(*) FROM users WHERE role = 'admin') AS admin_count, \
                (SELECT COUNT(*) FROM users WHERE role = 'user') AS user_count, \
                (SELECT COUNT(*) FROM users WHERE created_at >= NOW() - INTERVAL '7 days') AS new_users_this_week, \
                (SELECT COUNT(*) FROM tracks) AS total_tracks, \
                (SELECT COUNT(*) FROM phases) AS total_phases, \
                (SELECT COUNT(*) FROM topics) AS total_topics, \
                (SELECT COUNT(*) FROM resources) AS total_resources, \
                (SELECT COUNT(*) FROM quizzes) AS total_quizzes, \
                (SELECT COUNT(*) FROM badges) AS total_badges",
        )
        .fetch_one(&self.pool)
        .await?)
    }
}
