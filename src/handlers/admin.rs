use axum::extract::{Multipart, Path, Query, State};
use uuid::Uuid;

use super::{ApiCreated, created, found, quiz::load_quiz_detail};
use crate::{
    AppState,
    activity::{self, ActivitySources},
    auth::AuthUser,
    error::{ApiJson, ApiResponse, ApiResult, AppError},
    models::{
        ActivityKind, ActivityLog, AdminDashboardStats, AdminTopicDetail, AdminTopicEntry, Badge,
        CreateBadgeRequest, CreatePhaseRequest, CreateQuizRequest, CreateResourceRequest,
        CreateTopicRequest, CreateTrackRequest, LogsQuery, Page, Phase, PhaseDetail,
        PhaseSummary, ProgressOverview, QuizDetail, QuizSummary, RecentContent, Resource,
        ResourceEntry, Topic, TopicIdQuery, TopicQuery, Track, TrackDetail, TrackIdQuery,
        TrackSummary, TrackWithPhases, UpdatePhaseRequest, UpdateQuizRequest,
        UpdateResourceRequest, UpdateTopicRequest, UpdateTrackRequest, UploadedFile, UserFilter,
        non_blank,
    },
    storage,
};

/// Number of entries in each "recent" list of the dashboard.
const RECENT_LIMIT: i64 = 5;

// --- Dashboard ---

/// get_admin_stats
///
/// [Admin Route] Entity counts, role distribution, progress overview and the
/// newest users, topics and resources.
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Dashboard statistics", body = AdminDashboardStats),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn get_admin_stats(
    auth: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<AdminDashboardStats> {
    auth.require_admin()?;

    let counts = state.repo.entity_counts().await?;
    let progress = ProgressOverview::from(state.repo.progress_stats(None).await?);
    let (users, _) = state
        .repo
        .list_users(&UserFilter {
            limit: RECENT_LIMIT,
            ..UserFilter::default()
        })
        .await?;

    Ok(ApiResponse::ok(AdminDashboardStats {
        counts,
        progress,
        recent: RecentContent {
            users,
            topics: state.repo.recent_topics(RECENT_LIMIT).await?,
            resources: state.repo.recent_resources(RECENT_LIMIT).await?,
        },
    }))
}

/// get_activity_logs
///
/// [Admin Route] Recent registrations, topic creations, completions and
/// resource creations merged into one feed, newest first.
#[utoipa::path(
    get,
    path = "/api/admin/logs",
    params(LogsQuery),
    responses(
        (status = 200, description = "Activity feed", body = ActivityLog),
        (status = 400, description = "Unknown activity type")
    )
)]
pub async fn get_activity_logs(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> ApiResult<ActivityLog> {
    auth.require_admin()?;

    let kind = match non_blank(&query.kind) {
        None | Some("all") => None,
        Some(value) => Some(value.parse::<ActivityKind>()?),
    };
    let limit = query.limit.unwrap_or(activity::DEFAULT_LOG_LIMIT);
    let wants = |k: ActivityKind| kind.is_none_or(|wanted| wanted == k);

    let mut sources = ActivitySources::default();
    if wants(ActivityKind::User) {
        let filter = UserFilter {
            limit: activity::USER_FETCH_LIMIT,
            ..UserFilter::default()
        };
        sources.users = state.repo.list_users(&filter).await?.0;
    }
    if wants(ActivityKind::Topic) {
        sources.topics = state.repo.recent_topics(activity::TOPIC_FETCH_LIMIT).await?;
    }
    if wants(ActivityKind::Progress) {
        sources.completions = state
            .repo
            .recent_completions(activity::PROGRESS_FETCH_LIMIT)
            .await?;
    }
    if wants(ActivityKind::Resource) {
        sources.resources = state
            .repo
            .recent_resources(activity::RESOURCE_FETCH_LIMIT)
            .await?;
    }

    let activities = activity::build_activity_log(sources, kind, limit);
    Ok(ApiResponse::ok(ActivityLog {
        total: activities.len(),
        activities,
    }))
}

// --- Tracks ---

/// list_tracks
///
/// [Admin Route] Every track with its phase count, ordered by position.
#[utoipa::path(
    get,
    path = "/api/admin/tracks",
    responses((status = 200, description = "Tracks", body = [TrackSummary]))
)]
pub async fn list_tracks(
    auth: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Vec<TrackSummary>> {
    auth.require_admin()?;
    Ok(ApiResponse::ok(state.repo.list_tracks().await?))
}

/// create_track
///
/// [Admin Route] Creates a track. Slugs are unique across tracks.
#[utoipa::path(
    post,
    path = "/api/admin/tracks",
    request_body = CreateTrackRequest,
    responses(
        (status = 201, description = "Track created", body = Track),
        (status = 400, description = "Missing fields or duplicate slug")
    )
)]
pub async fn create_track(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateTrackRequest>,
) -> ApiCreated<Track> {
    auth.require_admin()?;
    payload.validate()?;
    let track = state.repo.create_track(payload).await?;
    tracing::info!(track_id = %track.id, slug = %track.slug, "Track created");
    Ok(created(track))
}

/// get_track
///
/// [Admin Route] A track with its phases.
#[utoipa::path(
    get,
    path = "/api/admin/tracks/{id}",
    params(("id" = Uuid, Path, description = "Track ID")),
    responses(
        (status = 200, description = "Track with phases", body = TrackDetail),
        (status = 404, description = "Track not found")
    )
)]
pub async fn get_track(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<TrackDetail> {
    auth.require_admin()?;
    let track = found(state.repo.get_track(id).await?, "Track not found")?;
    let phases = state.repo.list_phases(Some(id)).await?;
    Ok(ApiResponse::ok(TrackDetail { track, phases }))
}

/// update_track
///
/// [Admin Route] Partial update of a track. A new slug must stay unique.
#[utoipa::path(
    put,
    path = "/api/admin/tracks/{id}",
    params(("id" = Uuid, Path, description = "Track ID")),
    request_body = UpdateTrackRequest,
    responses(
        (status = 200, description = "Track updated", body = Track),
        (status = 400, description = "Invalid fields or duplicate slug"),
        (status = 404, description = "Track not found")
    )
)]
pub async fn update_track(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateTrackRequest>,
) -> ApiResult<Track> {
    auth.require_admin()?;
    payload.validate()?;
    let track = found(state.repo.update_track(id, payload).await?, "Track not found")?;
    Ok(ApiResponse::ok(track))
}

/// delete_track
///
/// [Admin Route] Deletes a track that has no phases.
#[utoipa::path(
    delete,
    path = "/api/admin/tracks/{id}",
    params(("id" = Uuid, Path, description = "Track ID")),
    responses(
        (status = 200, description = "Track deleted"),
        (status = 400, description = "Track still has phases"),
        (status = 404, description = "Track not found")
    )
)]
pub async fn delete_track(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    auth.require_admin()?;
    found(state.repo.get_track(id).await?, "Track not found")?;
    if !state.repo.list_phases(Some(id)).await?.is_empty() {
        return Err(AppError::bad_request(
            "Cannot delete track with existing phases. Delete phases first.",
        ));
    }
    if !state.repo.delete_track(id).await? {
        return Err(AppError::not_found("Track not found"));
    }
    tracing::info!(track_id = %id, "Track deleted");
    Ok(ApiResponse::message("Track deleted successfully"))
}

/// list_tracks_with_phases
///
/// [Admin Route] Every track with its phases, for the phase pickers of the admin UI.
#[utoipa::path(
    get,
    path = "/api/admin/tracks-phases",
    responses((status = 200, description = "Tracks with phases", body = [TrackWithPhases]))
)]
pub async fn list_tracks_with_phases(
    auth: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Vec<TrackWithPhases>> {
    auth.require_admin()?;
    let phases = state.repo.list_phases(None).await?;
    let tracks = state
        .repo
        .list_tracks()
        .await?
        .into_iter()
        .map(|summary| TrackWithPhases {
            phases: phases
                .iter()
                .filter(|p| p.phase.track_id == summary.track.id)
                .map(|p| p.phase.clone())
                .collect(),
            track: summary.track,
        })
        .collect();
    Ok(ApiResponse::ok(tracks))
}

// --- Phases ---

/// list_phases
///
/// [Admin Route] Phases with topic counts, optionally narrowed to one track.
#[utoipa::path(
    get,
    path = "/api/admin/phases",
    params(TrackIdQuery),
    responses((status = 200, description = "Phases", body = [PhaseSummary]))
)]
pub async fn list_phases(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<TrackIdQuery>,
) -> ApiResult<Vec<PhaseSummary>> {
    auth.require_admin()?;
    Ok(ApiResponse::ok(state.repo.list_phases(query.track_id).await?))
}

/// create_phase
///
/// [Admin Route] Creates a phase in an existing track. Slugs are unique per track.
#[utoipa::path(
    post,
    path = "/api/admin/phases",
    request_body = CreatePhaseRequest,
    responses(
        (status = 201, description = "Phase created", body = Phase),
        (status = 400, description = "Missing fields or duplicate slug"),
        (status = 404, description = "Track not found")
    )
)]
pub async fn create_phase(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreatePhaseRequest>,
) -> ApiCreated<Phase> {
    auth.require_admin()?;
    let track_id = payload.validate()?;
    found(state.repo.get_track(track_id).await?, "Track not found")?;
    let phase = state.repo.create_phase(track_id, payload).await?;
    tracing::info!(phase_id = %phase.id, track_id = %track_id, "Phase created");
    Ok(created(phase))
}

/// get_phase
///
/// [Admin Route] A phase with its topics.
#[utoipa::path(
    get,
    path = "/api/admin/phases/{id}",
    params(("id" = Uuid, Path, description = "Phase ID")),
    responses(
        (status = 200, description = "Phase with track and topics", body = PhaseDetail),
        (status = 404, description = "Phase not found")
    )
)]
pub async fn get_phase(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<PhaseDetail> {
    auth.require_admin()?;
    let phase = found(state.repo.get_phase(id).await?, "Phase not found")?;
    let track = found(state.repo.get_track(phase.track_id).await?, "Track not found")?;
    let topics = state.repo.topics_in_phase(id).await?;
    Ok(ApiResponse::ok(PhaseDetail {
        phase,
        track,
        topics,
    }))
}

/// update_phase
///
/// [Admin Route] Partial update of a phase.
#[utoipa::path(
    put,
    path = "/api/admin/phases/{id}",
    params(("id" = Uuid, Path, description = "Phase ID")),
    request_body = UpdatePhaseRequest,
    responses(
        (status = 200, description = "Phase updated", body = Phase),
        (status = 400, description = "Invalid fields or duplicate slug"),
        (status = 404, description = "Phase not found")
    )
)]
pub async fn update_phase(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdatePhaseRequest>,
) -> ApiResult<Phase> {
    auth.require_admin()?;
    payload.validate()?;
    let phase = found(state.repo.update_phase(id, payload).await?, "Phase not found")?;
    Ok(ApiResponse::ok(phase))
}

/// delete_phase
///
/// [Admin Route] Deletes a phase that has no topics.
#[utoipa::path(
    delete,
    path = "/api/admin/phases/{id}",
    params(("id" = Uuid, Path, description = "Phase ID")),
    responses(
        (status = 200, description = "Phase deleted"),
        (status = 400, description = "Phase still has topics"),
        (status = 404, description = "Phase not found")
    )
)]
pub async fn delete_phase(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    auth.require_admin()?;
    found(state.repo.get_phase(id).await?, "Phase not found")?;
    if !state.repo.topics_in_phase(id).await?.is_empty() {
        return Err(AppError::bad_request(
            "Cannot delete phase with existing topics. Delete topics first.",
        ));
    }
    if !state.repo.delete_phase(id).await? {
        return Err(AppError::not_found("Phase not found"));
    }
    tracing::info!(phase_id = %id, "Phase deleted");
    Ok(ApiResponse::message("Phase deleted successfully"))
}

// --- Topics ---

/// list_topics
///
/// [Admin Route] Paginated topic listing filtered by search term, phase and difficulty.
#[utoipa::path(
    get,
    path = "/api/admin/topics",
    params(TopicQuery),
    responses(
        (status = 200, description = "One page of topics with their counts", body = [AdminTopicEntry]),
        (status = 400, description = "Unknown difficulty")
    )
)]
pub async fn list_topics(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<TopicQuery>,
) -> ApiResult<Page<AdminTopicEntry>> {
    auth.require_admin()?;
    let (page, filter) = query.into_filter()?;
    let (entries, total) = state.repo.list_topics(&filter).await?;

    let mut items = Vec::with_capacity(entries.len());
    for entry in entries {
        let counts = state.repo.topic_counts(entry.topic.id).await?;
        items.push(AdminTopicEntry { entry, counts });
    }

    Ok(ApiResponse::ok(Page::new(items, page, filter.limit, total)))
}

/// create_topic
///
/// [Admin Route] Creates a topic in an existing phase. Slugs are unique per phase.
#[utoipa::path(
    post,
    path = "/api/admin/topics",
    request_body = CreateTopicRequest,
    responses(
        (status = 201, description = "Topic created", body = Topic),
        (status = 400, description = "Missing fields or duplicate slug in phase"),
        (status = 404, description = "Phase not found")
    )
)]
pub async fn create_topic(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateTopicRequest>,
) -> ApiCreated<Topic> {
    auth.require_admin()?;
    let phase_id = payload.validate()?;
    found(state.repo.get_phase(phase_id).await?, "Phase not found")?;
    let topic = state.repo.create_topic(phase_id, payload).await?;
    tracing::info!(topic_id = %topic.id, phase_id = %phase_id, "Topic created");
    Ok(created(topic))
}

/// get_topic
///
/// [Admin Route] A topic with breadcrumb, counts, resources and full quizzes.
#[utoipa::path(
    get,
    path = "/api/admin/topics/{id}",
    params(("id" = Uuid, Path, description = "Topic ID")),
    responses(
        (status = 200, description = "Topic", body = AdminTopicDetail),
        (status = 404, description = "Topic not found")
    )
)]
pub async fn get_topic(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<AdminTopicDetail> {
    auth.require_admin()?;
    let repo = state.repo.as_ref();
    let topic = found(repo.get_topic(id).await?, "Topic not found")?;
    let path = found(repo.topic_path(id).await?, "Topic not found")?;
    let counts = repo.topic_counts(id).await?;
    let resources = repo
        .list_resources(Some(id))
        .await?
        .into_iter()
        .map(|entry| entry.resource)
        .collect();

    let mut quizzes = Vec::new();
    for summary in repo.list_quizzes(Some(id)).await? {
        quizzes.push(load_quiz_detail(repo, summary.quiz.id).await?);
    }

    Ok(ApiResponse::ok(AdminTopicDetail {
        topic,
        path,
        counts,
        resources,
        quizzes,
    }))
}

/// update_topic
///
/// [Admin Route] Partial update of a topic. Moving it requires an existing phase.
#[utoipa::path(
    put,
    path = "/api/admin/topics/{id}",
    params(("id" = Uuid, Path, description = "Topic ID")),
    request_body = UpdateTopicRequest,
    responses(
        (status = 200, description = "Topic updated", body = Topic),
        (status = 400, description = "Invalid fields or duplicate slug in phase"),
        (status = 404, description = "Topic or target phase not found")
    )
)]
pub async fn update_topic(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateTopicRequest>,
) -> ApiResult<Topic> {
    auth.require_admin()?;
    payload.validate()?;
    if let Some(phase_id) = payload.phase_id {
        found(state.repo.get_phase(phase_id).await?, "Phase not found")?;
    }
    let topic = found(state.repo.update_topic(id, payload).await?, "Topic not found")?;
    Ok(ApiResponse::ok(topic))
}

/// delete_topic
///
/// [Admin Route] Deletes a topic together with its resources, quizzes and all
/// learner state attached to it.
#[utoipa::path(
    delete,
    path = "/api/admin/topics/{id}",
    params(("id" = Uuid, Path, description = "Topic ID")),
    responses(
        (status = 200, description = "Topic deleted"),
        (status = 404, description = "Topic not found")
    )
)]
pub async fn delete_topic(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    auth.require_admin()?;
    if !state.repo.delete_topic(id).await? {
        return Err(AppError::not_found("Topic not found"));
    }
    tracing::info!(topic_id = %id, "Topic deleted");
    Ok(ApiResponse::message("Topic deleted successfully"))
}

// --- Resources ---

/// list_resources
///
/// [Admin Route] Resources with their topic path, optionally for one topic.
#[utoipa::path(
    get,
    path = "/api/admin/resources",
    params(TopicIdQuery),
    responses((status = 200, description = "Resources", body = [ResourceEntry]))
)]
pub async fn list_resources(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<TopicIdQuery>,
) -> ApiResult<Vec<ResourceEntry>> {
    auth.require_admin()?;
    Ok(ApiResponse::ok(state.repo.list_resources(query.topic_id).await?))
}

/// create_resource
///
/// [Admin Route] Attaches a resource to an existing topic.
#[utoipa::path(
    post,
    path = "/api/admin/resources",
    request_body = CreateResourceRequest,
    responses(
        (status = 201, description = "Resource created", body = Resource),
        (status = 400, description = "Missing fields"),
        (status = 404, description = "Topic not found")
    )
)]
pub async fn create_resource(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateResourceRequest>,
) -> ApiCreated<Resource> {
    auth.require_admin()?;
    let topic_id = payload.validate()?;
    found(state.repo.get_topic(topic_id).await?, "Topic not found")?;
    let resource = state.repo.create_resource(topic_id, payload).await?;
    tracing::info!(resource_id = %resource.id, topic_id = %topic_id, "Resource created");
    Ok(created(resource))
}

/// get_resource
///
/// [Admin Route] A single resource.
#[utoipa::path(
    get,
    path = "/api/admin/resources/{id}",
    params(("id" = Uuid, Path, description = "Resource ID")),
    responses(
        (status = 200, description = "Resource", body = Resource),
        (status = 404, description = "Resource not found")
    )
)]
pub async fn get_resource(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Resource> {
    auth.require_admin()?;
    let resource = found(state.repo.get_resource(id).await?, "Resource not found")?;
    Ok(ApiResponse::ok(resource))
}

/// update_resource
///
/// [Admin Route] Partial update of a resource.
#[utoipa::path(
    put,
    path = "/api/admin/resources/{id}",
    params(("id" = Uuid, Path, description = "Resource ID")),
    request_body = UpdateResourceRequest,
    responses(
        (status = 200, description = "Resource updated", body = Resource),
        (status = 404, description = "Resource or target topic not found")
    )
)]
pub async fn update_resource(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateResourceRequest>,
) -> ApiResult<Resource> {
    auth.require_admin()?;
    payload.validate()?;
    if let Some(topic_id) = payload.topic_id {
        found(state.repo.get_topic(topic_id).await?, "Topic not found")?;
    }
    let resource = found(
        state.repo.update_resource(id, payload).await?,
        "Resource not found",
    )?;
    Ok(ApiResponse::ok(resource))
}

/// delete_resource
///
/// [Admin Route] Deletes a resource. Uploaded files stay on disk.
#[utoipa::path(
    delete,
    path = "/api/admin/resources/{id}",
    params(("id" = Uuid, Path, description = "Resource ID")),
    responses(
        (status = 200, description = "Resource deleted"),
        (status = 404, description = "Resource not found")
    )
)]
pub async fn delete_resource(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    auth.require_admin()?;
    if !state.repo.delete_resource(id).await? {
        return Err(AppError::not_found("Resource not found"));
    }
    Ok(ApiResponse::message("Resource deleted successfully"))
}

/// upload_resource_file
///
/// [Admin Route] Accepts a PDF in the multipart field `file` and stores it in
/// the public uploads directory.
#[utoipa::path(
    post,
    path = "/api/admin/resources/upload",
    request_body(content = String, description = "Multipart form with a `file` field", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File stored", body = UploadedFile),
        (status = 400, description = "Missing file, not a PDF or larger than 10MB"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn upload_resource_file(
    auth: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<UploadedFile> {
    auth.require_admin()?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let original_name = field.file_name().unwrap_or("upload.pdf").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::bad_request(format!("Failed to read upload: {e}")))?;

        storage::validate_upload(content_type.as_deref(), bytes.len())
            .map_err(AppError::BadRequest)?;

        let stored = state
            .storage
            .store_resource_file(&original_name, &bytes)
            .await
            .map_err(AppError::Storage)?;

        tracing::info!(filename = %stored.filename, size = bytes.len(), "Resource file uploaded");
        return Ok(ApiResponse::ok(UploadedFile {
            file_url: stored.url,
            filename: stored.filename,
            size: bytes.len(),
            content_type: storage::PDF_CONTENT_TYPE.to_string(),
        }));
    }

    Err(AppError::bad_request("No file provided"))
}

// --- Quizzes ---

/// list_quizzes
///
/// [Admin Route] Quizzes with their question counts, optionally for one topic.
#[utoipa::path(
    get,
    path = "/api/admin/quizzes",
    params(TopicIdQuery),
    responses((status = 200, description = "Quizzes with question counts", body = [QuizSummary]))
)]
pub async fn list_quizzes(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<TopicIdQuery>,
) -> ApiResult<Vec<QuizSummary>> {
    auth.require_admin()?;
    Ok(ApiResponse::ok(state.repo.list_quizzes(query.topic_id).await?))
}

/// create_quiz
///
/// [Admin Route] Creates a quiz with its questions and choices. Every question
/// needs at least two choices, exactly one of them correct.
#[utoipa::path(
    post,
    path = "/api/admin/quizzes",
    request_body = CreateQuizRequest,
    responses(
        (status = 201, description = "Quiz created", body = QuizDetail),
        (status = 400, description = "Invalid quiz"),
        (status = 404, description = "Topic not found")
    )
)]
pub async fn create_quiz(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateQuizRequest>,
) -> ApiCreated<QuizDetail> {
    auth.require_admin()?;
    let topic_id = payload.validate()?;
    found(state.repo.get_topic(topic_id).await?, "Topic not found")?;
    let quiz = state.repo.create_quiz(topic_id, payload).await?;
    tracing::info!(quiz_id = %quiz.id, topic_id = %topic_id, "Quiz created");
    Ok(created(load_quiz_detail(state.repo.as_ref(), quiz.id).await?))
}

/// get_quiz
///
/// [Admin Route] A quiz with its questions, choices and answers.
#[utoipa::path(
    get,
    path = "/api/admin/quizzes/{id}",
    params(("id" = Uuid, Path, description = "Quiz ID")),
    responses(
        (status = 200, description = "Quiz with answers", body = QuizDetail),
        (status = 404, description = "Quiz not found")
    )
)]
pub async fn get_quiz(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<QuizDetail> {
    auth.require_admin()?;
    Ok(ApiResponse::ok(load_quiz_detail(state.repo.as_ref(), id).await?))
}

/// update_quiz
///
/// [Admin Route] Updates quiz metadata. Questions are left untouched.
#[utoipa::path(
    put,
    path = "/api/admin/quizzes/{id}",
    params(("id" = Uuid, Path, description = "Quiz ID")),
    request_body = UpdateQuizRequest,
    responses(
        (status = 200, description = "Quiz updated", body = QuizDetail),
        (status = 400, description = "Invalid fields"),
        (status = 404, description = "Quiz not found")
    )
)]
pub async fn update_quiz(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateQuizRequest>,
) -> ApiResult<QuizDetail> {
    auth.require_admin()?;
    payload.validate()?;
    found(state.repo.update_quiz(id, payload).await?, "Quiz not found")?;
    Ok(ApiResponse::ok(load_quiz_detail(state.repo.as_ref(), id).await?))
}

/// delete_quiz
///
/// [Admin Route] Deletes a quiz with its questions and attempts.
#[utoipa::path(
    delete,
    path = "/api/admin/quizzes/{id}",
    params(("id" = Uuid, Path, description = "Quiz ID")),
    responses(
        (status = 200, description = "Quiz deleted"),
        (status = 404, description = "Quiz not found")
    )
)]
pub async fn delete_quiz(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    auth.require_admin()?;
    if !state.repo.delete_quiz(id).await? {
        return Err(AppError::not_found("Quiz not found"));
    }
    tracing::info!(quiz_id = %id, "Quiz deleted");
    Ok(ApiResponse::message("Quiz deleted successfully"))
}

// --- Badges ---

/// list_badges
///
/// [Admin Route] All badge definitions.
#[utoipa::path(
    get,
    path = "/api/admin/badges",
    responses((status = 200, description = "Badge definitions", body = [Badge]))
)]
pub async fn list_badges(auth: AuthUser, State(state): State<AppState>) -> ApiResult<Vec<Badge>> {
    auth.require_admin()?;
    Ok(ApiResponse::ok(state.repo.list_badges().await?))
}

/// create_badge
///
/// [Admin Route] Adds a badge definition.
#[utoipa::path(
    post,
    path = "/api/admin/badges",
    request_body = CreateBadgeRequest,
    responses(
        (status = 201, description = "Badge created", body = Badge),
        (status = 400, description = "Invalid fields or duplicate slug")
    )
)]
pub async fn create_badge(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateBadgeRequest>,
) -> ApiCreated<Badge> {
    auth.require_admin()?;
    payload.validate()?;
    let badge = state.repo.create_badge(payload).await?;
    tracing::info!(badge = %badge.slug, "Badge created");
    Ok(created(badge))
}
