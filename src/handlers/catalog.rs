use axum::extract::{Path, Query, State};

use super::found;
use crate::{
    AppState,
    error::{ApiResponse, ApiResult, AppError},
    models::{
        PhaseTree, ResourceEntry, SearchQuery, SearchResults, Topic, TopicDetail, TopicTree,
        TrackSummary, TrackTree, non_blank,
    },
    repository::Repository,
};

/// Search terms shorter than this are rejected.
const MIN_SEARCH_LEN: usize = 2;
/// Maximum number of topics and of resources returned by a search.
const SEARCH_LIMIT: i64 = 10;

/// list_tracks
///
/// [Public Route] All tracks ordered by position, with their phase count.
#[utoipa::path(
    get,
    path = "/api/tracks",
    responses((status = 200, description = "Tracks", body = [TrackSummary]))
)]
pub async fn list_tracks(State(state): State<AppState>) -> ApiResult<Vec<TrackSummary>> {
    Ok(ApiResponse::ok(state.repo.list_tracks().await?))
}

async fn topic_tree(repo: &dyn Repository, topic: Topic) -> Result<TopicTree, AppError> {
    let resources = repo
        .list_resources(Some(topic.id))
        .await?
        .into_iter()
        .map(|entry| entry.resource)
        .collect();
    let quizzes = repo.list_quizzes(Some(topic.id)).await?;
    Ok(TopicTree {
        topic,
        resources,
        quizzes,
    })
}

/// get_track
///
/// [Public Route] The full tree of a track: phases, topics, resources and quiz summaries.
#[utoipa::path(
    get,
    path = "/api/tracks/{slug}",
    params(("slug" = String, Path, description = "Track slug")),
    responses(
        (status = 200, description = "Track tree", body = TrackTree),
        (status = 404, description = "Track not found")
    )
)]
pub async fn get_track(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<TrackTree> {
    let repo = state.repo.as_ref();
    let track = found(repo.get_track_by_slug(&slug).await?, "Track not found")?;

    let mut phases = Vec::new();
    for summary in repo.list_phases(Some(track.id)).await? {
        let mut topics = Vec::new();
        for topic in repo.topics_in_phase(summary.phase.id).await? {
            topics.push(topic_tree(repo, topic).await?);
        }
        phases.push(PhaseTree {
            phase: summary.phase,
            topics,
        });
    }

    Ok(ApiResponse::ok(TrackTree { track, phases }))
}

/// get_topic
///
/// [Public Route] A topic addressed by its slug path. The 404 names the first
/// missing level.
#[utoipa::path(
    get,
    path = "/api/topics/{track_slug}/{phase_slug}/{topic_slug}",
    params(
        ("track_slug" = String, Path, description = "Track slug"),
        ("phase_slug" = String, Path, description = "Phase slug"),
        ("topic_slug" = String, Path, description = "Topic slug")
    ),
    responses(
        (status = 200, description = "Topic", body = TopicDetail),
        (status = 404, description = "Track, phase or topic not found")
    )
)]
pub async fn get_topic(
    State(state): State<AppState>,
    Path((track_slug, phase_slug, topic_slug)): Path<(String, String, String)>,
) -> ApiResult<TopicDetail> {
    let repo = state.repo.as_ref();
    let track = found(repo.get_track_by_slug(&track_slug).await?, "Track not found")?;
    let phase = found(
        repo.get_phase_by_slug(track.id, &phase_slug).await?,
        "Phase not found",
    )?;
    let topic = found(
        repo.get_topic_by_slug(phase.id, &topic_slug).await?,
        "Topic not found",
    )?;
    let path = found(repo.topic_path(topic.id).await?, "Topic not found")?;
    let tree = topic_tree(repo, topic).await?;

    Ok(ApiResponse::ok(TopicDetail {
        topic: tree.topic,
        path,
        resources: tree.resources,
        quizzes: tree.quizzes,
    }))
}

/// list_resources
///
/// [Public Route] Every resource with the titles of its topic, phase and track.
#[utoipa::path(
    get,
    path = "/api/resources",
    responses((status = 200, description = "Resources", body = [ResourceEntry]))
)]
pub async fn list_resources(State(state): State<AppState>) -> ApiResult<Vec<ResourceEntry>> {
    Ok(ApiResponse::ok(state.repo.list_resources(None).await?))
}

/// search
///
/// [Public Route] Case-insensitive search over topics and resources in both languages.
#[utoipa::path(
    get,
    path = "/api/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matches", body = SearchResults),
        (status = 400, description = "Query shorter than two characters")
    )
)]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<SearchResults> {
    let term = non_blank(&query.q)
        .filter(|q| q.chars().count() >= MIN_SEARCH_LEN)
        .ok_or_else(|| {
            AppError::bad_request(format!(
                "Search query must be at least {MIN_SEARCH_LEN} characters"
            ))
        })?
        .to_string();

    let topics = state.repo.search_topics(&term, SEARCH_LIMIT).await?;
    let resources = state.repo.search_resources(&term, SEARCH_LIMIT).await?;
    let total = topics.len() + resources.len();

    Ok(ApiResponse::ok(SearchResults {
        query: term,
        topics,
        resources,
        total,
    }))
}
