use axum::extract::{Path, Query, State};
use uuid::Uuid;

use super::{ApiCreated, created, found};
use crate::{
    AppState,
    auth::AuthUser,
    badges,
    error::{ApiJson, ApiResponse, ApiResult, AppError},
    models::{
        BadgeOverview, BookmarkEntry, BookmarkToggle, CreateNoteRequest, Note, NoteEntry,
        NotesQuery, ProgressEntry, ProgressStats, ProgressStatus, ProgressUpdate,
        ToggleBookmarkRequest, UpdateNoteRequest, UpdateProgressRequest,
    },
};

// --- Progress ---

/// list_progress
///
/// [Authenticated Route] The caller's progress items, most recently updated first.
#[utoipa::path(
    get,
    path = "/api/progress",
    responses((status = 200, description = "Progress items", body = [ProgressEntry]))
)]
pub async fn list_progress(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Vec<ProgressEntry>> {
    Ok(ApiResponse::ok(state.repo.list_progress(id).await?))
}

/// update_progress
///
/// [Authenticated Route] Sets the caller's status on a topic. Completing a
/// topic runs the badge check and reports what it unlocked.
#[utoipa::path(
    post,
    path = "/api/progress",
    request_body = UpdateProgressRequest,
    responses(
        (status = 200, description = "Progress saved", body = ProgressUpdate),
        (status = 400, description = "Missing topic_id or status"),
        (status = 404, description = "Topic not found")
    )
)]
pub async fn update_progress(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<UpdateProgressRequest>,
) -> ApiResult<ProgressUpdate> {
    let (topic_id, status) = payload.validate()?;
    found(state.repo.get_topic(topic_id).await?, "Topic not found")?;

    let progress = state
        .repo
        .upsert_progress(user_id, topic_id, status)
        .await?;

    let newly_awarded = if status == ProgressStatus::Completed {
        badges::award_eligible_badges(state.repo.as_ref(), user_id).await?
    } else {
        Vec::new()
    };

    Ok(ApiResponse::ok(ProgressUpdate {
        progress,
        newly_awarded,
    }))
}

/// progress_stats
///
/// [Authenticated Route] Number of the caller's items per status.
#[utoipa::path(
    get,
    path = "/api/progress/stats",
    responses((status = 200, description = "Counts per status", body = ProgressStats))
)]
pub async fn progress_stats(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<ProgressStats> {
    Ok(ApiResponse::ok(state.repo.progress_stats(Some(id)).await?))
}

// --- Bookmarks ---

/// list_bookmarks
///
/// [Authenticated Route] The caller's bookmarks with the bookmarked topic, newest first.
#[utoipa::path(
    get,
    path = "/api/bookmarks",
    responses((status = 200, description = "Bookmarks", body = [BookmarkEntry]))
)]
pub async fn list_bookmarks(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Vec<BookmarkEntry>> {
    Ok(ApiResponse::ok(state.repo.list_bookmarks(id).await?))
}

/// toggle_bookmark
///
/// [Authenticated Route] Bookmarks the topic, or removes the bookmark if it exists.
#[utoipa::path(
    post,
    path = "/api/bookmarks",
    request_body = ToggleBookmarkRequest,
    responses(
        (status = 200, description = "New bookmark state", body = BookmarkToggle),
        (status = 400, description = "Missing topic_id"),
        (status = 404, description = "Topic not found")
    )
)]
pub async fn toggle_bookmark(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ToggleBookmarkRequest>,
) -> ApiResult<BookmarkToggle> {
    let topic_id = payload
        .topic_id
        .ok_or_else(|| AppError::bad_request("Topic ID is required"))?;

    if state.repo.find_bookmark(user_id, topic_id).await?.is_some() {
        state.repo.delete_bookmark(user_id, topic_id).await?;
        return Ok(ApiResponse::ok(BookmarkToggle {
            bookmarked: false,
            bookmark: None,
        }));
    }

    found(state.repo.get_topic(topic_id).await?, "Topic not found")?;
    let bookmark = state.repo.create_bookmark(user_id, topic_id).await?;
    Ok(ApiResponse::ok(BookmarkToggle {
        bookmarked: true,
        bookmark: Some(bookmark),
    }))
}

/// delete_bookmark
///
/// [Authenticated Route] Removes the caller's bookmark on a topic.
#[utoipa::path(
    delete,
    path = "/api/bookmarks/{topic_id}",
    params(("topic_id" = Uuid, Path, description = "Bookmarked topic ID")),
    responses(
        (status = 200, description = "Bookmark removed"),
        (status = 404, description = "Bookmark not found")
    )
)]
pub async fn delete_bookmark(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(topic_id): Path<Uuid>,
) -> ApiResult<()> {
    if !state.repo.delete_bookmark(user_id, topic_id).await? {
        return Err(AppError::not_found("Bookmark not found"));
    }
    Ok(ApiResponse::message("Bookmark removed"))
}

// --- Notes ---

/// list_notes
///
/// [Authenticated Route] The caller's notes, optionally restricted to one topic.
#[utoipa::path(
    get,
    path = "/api/notes",
    params(NotesQuery),
    responses((status = 200, description = "Notes", body = [NoteEntry]))
)]
pub async fn list_notes(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<NotesQuery>,
) -> ApiResult<Vec<NoteEntry>> {
    Ok(ApiResponse::ok(state.repo.list_notes(id, query.topic_id).await?))
}

/// create_note
///
/// [Authenticated Route] Adds a note on a topic for the caller.
#[utoipa::path(
    post,
    path = "/api/notes",
    request_body = CreateNoteRequest,
    responses(
        (status = 201, description = "Note created", body = Note),
        (status = 400, description = "Missing topic or empty content"),
        (status = 404, description = "Topic not found")
    )
)]
pub async fn create_note(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateNoteRequest>,
) -> ApiCreated<Note> {
    let topic_id = payload.validate()?;
    found(state.repo.get_topic(topic_id).await?, "Topic not found")?;
    let note = state
        .repo
        .create_note(user_id, topic_id, payload.content.trim().to_string())
        .await?;
    Ok(created(note))
}

/// update_note
///
/// [Authenticated Route] Owner-only. A note owned by someone else answers 404.
#[utoipa::path(
    put,
    path = "/api/notes/{id}",
    params(("id" = Uuid, Path, description = "Note ID")),
    request_body = UpdateNoteRequest,
    responses(
        (status = 200, description = "Note updated", body = Note),
        (status = 400, description = "Empty content"),
        (status = 404, description = "Note not found")
    )
)]
pub async fn update_note(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateNoteRequest>,
) -> ApiResult<Note> {
    let content = payload.content.trim();
    if content.is_empty() {
        return Err(AppError::bad_request("Note content must not be empty"));
    }
    let note = found(
        state
            .repo
            .update_note(id, user_id, content.to_string())
            .await?,
        "Note not found",
    )?;
    Ok(ApiResponse::ok(note))
}

/// delete_note
///
/// [Authenticated Route] Owner-only. A note owned by someone else answers 404.
#[utoipa::path(
    delete,
    path = "/api/notes/{id}",
    params(("id" = Uuid, Path, description = "Note ID")),
    responses(
        (status = 200, description = "Note deleted"),
        (status = 404, description = "Note not found")
    )
)]
pub async fn delete_note(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    if !state.repo.delete_note(id, user_id).await? {
        return Err(AppError::not_found("Note not found"));
    }
    Ok(ApiResponse::message("Note deleted"))
}

// --- Badges ---

/// list_badges
///
/// [Authenticated Route] Runs the badge check, then returns the badge catalog
/// and the caller's badges.
#[utoipa::path(
    get,
    path = "/api/badges",
    responses((status = 200, description = "Badges", body = BadgeOverview))
)]
pub async fn list_badges(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<BadgeOverview> {
    let newly_awarded = badges::award_eligible_badges(state.repo.as_ref(), user_id).await?;

    Ok(ApiResponse::ok(BadgeOverview {
        all_badges: state.repo.list_badges().await?,
        user_badges: state.repo.user_badges(user_id).await?,
        completed_topics: state.repo.progress_stats(Some(user_id)).await?.completed,
        newly_awarded,
    }))
}
