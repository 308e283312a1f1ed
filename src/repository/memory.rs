use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::{cmp::Reverse, collections::HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{RepoResult, Repository};
use crate::{
    error::AppError,
    locale::Locale,
    models::{
        Badge, Bookmark, BookmarkEntry, Choice, CompletionRecord, CreateBadgeRequest,
        CreatePhaseRequest, CreateQuizRequest, CreateResourceRequest, CreateTopicRequest,
        CreateTrackRequest, Credentials, DEFAULT_PASSING_SCORE, EarnedBadge, EntityCounts,
        NewQuizAttempt, NewUser, Note, NoteEntry, Phase, PhaseSummary, ProfileChanges,
        ProfileView, ProgressEntry, ProgressItem, ProgressStats, ProgressStatus, Question,
        QuestionWithChoices, Quiz, QuizAnswer, QuizAttempt, QuizSummary, Resource, ResourceEntry,
        Role, Topic, TopicCounts, TopicEntry, TopicFilter, TopicPath, Track, TrackSummary,
        UpdatePhaseRequest, UpdateQuizRequest, UpdateResourceRequest, UpdateTopicRequest,
        UpdateTrackRequest, User, UserBadge, UserChanges, UserFilter, UserStats,
    },
};

struct StoredUser {
    user: User,
    password_hash: String,
}

struct StoredProfile {
    bio: Option<String>,
    preferred_language: Locale,
    level: i32,
    experience_points: i32,
}

impl Default for StoredProfile {
    fn default() -> Self {
        Self {
            bio: None,
            preferred_language: Locale::En,
            level: 1,
            experience_points: 0,
        }
    }
}

#[derive(Default)]
struct Store {
    users: HashMap<Uuid, StoredUser>,
    profiles: HashMap<Uuid, StoredProfile>,
    tracks: HashMap<Uuid, Track>,
    phases: HashMap<Uuid, Phase>,
    topics: HashMap<Uuid, Topic>,
    resources: HashMap<Uuid, Resource>,
    quizzes: HashMap<Uuid, Quiz>,
    questions: HashMap<Uuid, Question>,
    choices: HashMap<Uuid, Choice>,
    attempts: HashMap<Uuid, QuizAttempt>,
    answers: HashMap<Uuid, QuizAnswer>,
    progress: HashMap<Uuid, ProgressItem>,
    bookmarks: HashMap<Uuid, Bookmark>,
    notes: HashMap<Uuid, Note>,
    badges: HashMap<Uuid, Badge>,
    user_badges: HashMap<Uuid, UserBadge>,
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

fn contains_ci_opt(haystack: &Option<String>, needle_lower: &str) -> bool {
    haystack
        .as_deref()
        .is_some_and(|h| contains_ci(h, needle_lower))
}

impl Store {
    fn path(&self, topic_id: Uuid) -> Option<TopicPath> {
        let topic = self.topics.get(&topic_id)?;
        let phase = self.phases.get(&topic.phase_id)?;
        let track = self.tracks.get(&phase.track_id)?;
        Some(TopicPath {
            topic_id: topic.id,
            topic_slug: topic.slug.clone(),
            topic_title_en: topic.title_en.clone(),
            topic_title_tr: topic.title_tr.clone(),
            phase_id: phase.id,
            phase_slug: phase.slug.clone(),
            phase_title_en: phase.title_en.clone(),
            phase_title_tr: phase.title_tr.clone(),
            track_id: track.id,
            track_slug: track.slug.clone(),
            track_title_en: track.title_en.clone(),
            track_title_tr: track.title_tr.clone(),
        })
    }

    /// Sort key placing a topic in catalog order: track, phase, topic position.
    fn catalog_order(&self, topic: &Topic) -> (i32, i32, i32) {
        let phase = self.phases.get(&topic.phase_id);
        let track = phase.and_then(|p| self.tracks.get(&p.track_id));
        (
            track.map(|t| t.position).unwrap_or_default(),
            phase.map(|p| p.position).unwrap_or_default(),
            topic.position,
        )
    }

    fn topic_entry(&self, topic: &Topic) -> Option<TopicEntry> {
        Some(TopicEntry {
            topic: topic.clone(),
            path: self.path(topic.id)?,
        })
    }

    fn resource_entry(&self, resource: &Resource) -> Option<ResourceEntry> {
        Some(ResourceEntry {
            resource: resource.clone(),
            topic: self.path(resource.topic_id)?,
        })
    }

    fn profile_view(&self, user_id: Uuid) -> Option<ProfileView> {
        let stored = self.users.get(&user_id)?;
        let default_profile = StoredProfile::default();
        let profile = self.profiles.get(&user_id).unwrap_or(&default_profile);
        Some(ProfileView {
            id: stored.user.id,
            email: stored.user.email.clone(),
            name: stored.user.name.clone(),
            role: stored.user.role,
            image: stored.user.image.clone(),
            bio: profile.bio.clone(),
            preferred_language: profile.preferred_language,
            level: profile.level,
            experience_points: profile.experience_points,
        })
    }

    fn question_count(&self, quiz_id: Uuid) -> i64 {
        self.questions.values().filter(|q| q.quiz_id == quiz_id).count() as i64
    }

    fn next_position<'a>(positions: impl Iterator<Item = &'a i32>) -> i32 {
        positions.max().map(|p| p + 1).unwrap_or(0)
    }

    fn remove_quiz(&mut self, quiz_id: Uuid) -> bool {
        if self.quizzes.remove(&quiz_id).is_none() {
            return false;
        }
        let question_ids: Vec<Uuid> = self
            .questions
            .values()
            .filter(|q| q.quiz_id == quiz_id)
            .map(|q| q.id)
            .collect();
        self.questions.retain(|_, q| q.quiz_id != quiz_id);
        self.choices
            .retain(|_, c| !question_ids.contains(&c.question_id));
        let attempt_ids: Vec<Uuid> = self
            .attempts
            .values()
            .filter(|a| a.quiz_id == quiz_id)
            .map(|a| a.id)
            .collect();
        self.attempts.retain(|_, a| a.quiz_id != quiz_id);
        self.answers
            .retain(|_, a| !attempt_ids.contains(&a.attempt_id));
        true
    }

    fn slug_taken<'a>(
        mut slugs: impl Iterator<Item = (&'a Uuid, &'a String)>,
        slug: &str,
        except: Option<Uuid>,
    ) -> bool {
        slugs.any(|(id, s)| s == slug && Some(*id) != except)
    }
}

/// InMemoryRepository
///
/// A `Repository` kept entirely in process memory. Used when no database is
/// configured in a local environment, and by the test suite. It mirrors the
/// constraints and cascades of the Postgres schema.
#[derive(Default)]
pub struct InMemoryRepository {
    store: RwLock<Store>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn ping(&self) -> RepoResult<()> {
        Ok(())
    }

    // --- Users & Profiles ---

    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        let store = self.store.read().await;
        Ok(store.users.get(&id).map(|s| s.user.clone()))
    }

    async fn get_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let store = self.store.read().await;
        Ok(store
            .users
            .values()
            .find(|s| s.user.email == email)
            .map(|s| s.user.clone()))
    }

    async fn get_credentials(&self, email: &str) -> RepoResult<Option<Credentials>> {
        let store = self.store.read().await;
        Ok(store
            .users
            .values()
            .find(|s| s.user.email == email)
            .map(|s| Credentials {
                id: s.user.id,
                password_hash: s.password_hash.clone(),
            }))
    }

    async fn create_user(&self, user: NewUser) -> RepoResult<User> {
        let mut store = self.store.write().await;
        if store.users.values().any(|s| s.user.email == user.email) {
            return Err(AppError::bad_request("A user with this email already exists"));
        }
        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            email: user.email,
            name: user.name,
            role: user.role,
            image: None,
            created_at: now,
            updated_at: now,
        };
        store.users.insert(
            created.id,
            StoredUser {
                user: created.clone(),
                password_hash: user.password_hash,
            },
        );
        store.profiles.insert(created.id, StoredProfile::default());
        Ok(created)
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> RepoResult<Option<User>> {
        let mut store = self.store.write().await;
        let Some(stored) = store.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            stored.user.name = name;
        }
        if let Some(image) = changes.image {
            stored.user.image = Some(image);
        }
        if let Some(role) = changes.role {
            stored.user.role = role;
        }
        stored.user.updated_at = Utc::now();
        Ok(Some(stored.user.clone()))
    }

    async fn delete_user(&self, id: Uuid) -> RepoResult<bool> {
        let mut store = self.store.write().await;
        if store.users.remove(&id).is_none() {
            return Ok(false);
        }
        store.profiles.remove(&id);
        let attempt_ids: Vec<Uuid> = store
            .attempts
            .values()
            .filter(|a| a.user_id == id)
            .map(|a| a.id)
            .collect();
        store.attempts.retain(|_, a| a.user_id != id);
        store
            .answers
            .retain(|_, a| !attempt_ids.contains(&a.attempt_id));
        store.progress.retain(|_, p| p.user_id != id);
        store.bookmarks.retain(|_, b| b.user_id != id);
        store.notes.retain(|_, n| n.user_id != id);
        store.user_badges.retain(|_, ub| ub.user_id != id);
        Ok(true)
    }

    async fn list_users(&self, filter: &UserFilter) -> RepoResult<(Vec<User>, i64)> {
        let store = self.store.read().await;
        let needle = filter.search.as_deref().map(str::to_lowercase);
        let mut users: Vec<User> = store
            .users
            .values()
            .map(|s| &s.user)
            .filter(|u| filter.role.is_none_or(|role| u.role == role))
            .filter(|u| match &needle {
                Some(n) => contains_ci(&u.name, n) || contains_ci(&u.email, n),
                None => true,
            })
            .cloned()
            .collect();
        users.sort_by_key(|u| Reverse(u.created_at));
        let total = users.len() as i64;
        let page = users
            .into_iter()
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn get_profile(&self, user_id: Uuid) -> RepoResult<Option<ProfileView>> {
        let store = self.store.read().await;
        Ok(store.profile_view(user_id))
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        changes: ProfileChanges,
    ) -> RepoResult<Option<ProfileView>> {
        let mut store = self.store.write().await;
        if !store.users.contains_key(&user_id) {
            return Ok(None);
        }
        let profile = store.profiles.entry(user_id).or_default();
        if let Some(bio) = changes.bio {
            profile.bio = Some(bio);
        }
        if let Some(language) = changes.preferred_language {
            profile.preferred_language = language;
        }
        Ok(store.profile_view(user_id))
    }

    async fn user_stats(&self, user_id: Uuid) -> RepoResult<UserStats> {
        let store = self.store.read().await;
        let progress: Vec<&ProgressItem> = store
            .progress
            .values()
            .filter(|p| p.user_id == user_id)
            .collect();
        let mut passed_quizzes: Vec<Uuid> = store
            .attempts
            .values()
            .filter(|a| a.user_id == user_id && a.passed)
            .map(|a| a.quiz_id)
            .collect();
        passed_quizzes.sort();
        passed_quizzes.dedup();
        Ok(UserStats {
            total_progress: progress.len() as i64,
            completed_topics: progress
                .iter()
                .filter(|p| p.status == ProgressStatus::Completed)
                .count() as i64,
            in_progress_topics: progress
                .iter()
                .filter(|p| p.status == ProgressStatus::InProgress)
                .count() as i64,
            total_badges: store
                .user_badges
                .values()
                .filter(|ub| ub.user_id == user_id)
                .count() as i64,
            total_bookmarks: store
                .bookmarks
                .values()
                .filter(|b| b.user_id == user_id)
                .count() as i64,
            total_notes: store.notes.values().filter(|n| n.user_id == user_id).count() as i64,
            quizzes_passed: passed_quizzes.len() as i64,
        })
    }

    // --- Tracks ---

    async fn list_tracks(&self) -> RepoResult<Vec<TrackSummary>> {
        let store = self.store.read().await;
        let mut tracks: Vec<TrackSummary> = store
            .tracks
            .values()
            .map(|track| TrackSummary {
                track: track.clone(),
                phase_count: store
                    .phases
                    .values()
                    .filter(|p| p.track_id == track.id)
                    .count() as i64,
            })
            .collect();
        tracks.sort_by_key(|t| (t.track.position, t.track.created_at));
        Ok(tracks)
    }

    async fn get_track(&self, id: Uuid) -> RepoResult<Option<Track>> {
        let store = self.store.read().await;
        Ok(store.tracks.get(&id).cloned())
    }

    async fn get_track_by_slug(&self, slug: &str) -> RepoResult<Option<Track>> {
        let store = self.store.read().await;
        Ok(store.tracks.values().find(|t| t.slug == slug).cloned())
    }

    async fn create_track(&self, req: CreateTrackRequest) -> RepoResult<Track> {
        let mut store = self.store.write().await;
        let slug = req.slug.trim().to_string();
        if Store::slug_taken(store.tracks.iter().map(|(id, t)| (id, &t.slug)), &slug, None) {
            return Err(AppError::bad_request("A track with this slug already exists"));
        }
        let now = Utc::now();
        let track = Track {
            id: Uuid::new_v4(),
            slug,
            title_en: req.title_en.trim().to_string(),
            title_tr: req.title_tr.trim().to_string(),
            description_en: req.description_en,
            description_tr: req.description_tr,
            icon: req.icon,
            color: req.color,
            position: req
                .position
                .unwrap_or_else(|| Store::next_position(store.tracks.values().map(|t| &t.position))),
            created_at: now,
            updated_at: now,
        };
        store.tracks.insert(track.id, track.clone());
        Ok(track)
    }

    async fn update_track(&self, id: Uuid, req: UpdateTrackRequest) -> RepoResult<Option<Track>> {
        let mut store = self.store.write().await;
        if let Some(slug) = &req.slug {
            if Store::slug_taken(store.tracks.iter().map(|(id, t)| (id, &t.slug)), slug, Some(id)) {
                return Err(AppError::bad_request("A track with this slug already exists"));
            }
        }
        let Some(track) = store.tracks.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = req.slug {
            track.slug = v;
        }
        if let Some(v) = req.title_en {
            track.title_en = v;
        }
        if let Some(v) = req.title_tr {
            track.title_tr = v;
        }
        if let Some(v) = req.description_en {
            track.description_en = Some(v);
        }
        if let Some(v) = req.description_tr {
            track.description_tr = Some(v);
        }
        if let Some(v) = req.icon {
            track.icon = Some(v);
        }
        if let Some(v) = req.color {
            track.color = Some(v);
        }
        if let Some(v) = req.position {
            track.position = v;
        }
        track.updated_at = Utc::now();
        Ok(Some(track.clone()))
    }

    async fn delete_track(&self, id: Uuid) -> RepoResult<bool> {
        let mut store = self.store.write().await;
        if store.phases.values().any(|p| p.track_id == id) {
            return Err(AppError::bad_request("Track is still in use"));
        }
        Ok(store.tracks.remove(&id).is_some())
    }

    // --- Phases ---

    async fn list_phases(&self, track_id: Option<Uuid>) -> RepoResult<Vec<PhaseSummary>> {
        let store = self.store.read().await;
        let mut phases: Vec<PhaseSummary> = store
            .phases
            .values()
            .filter(|p| track_id.is_none_or(|id| p.track_id == id))
            .map(|phase| PhaseSummary {
                phase: phase.clone(),
                topic_count: store
                    .topics
                    .values()
                    .filter(|t| t.phase_id == phase.id)
                    .count() as i64,
            })
            .collect();
        phases.sort_by_key(|p| (p.phase.track_id, p.phase.position, p.phase.created_at));
        Ok(phases)
    }

    async fn get_phase(&self, id: Uuid) -> RepoResult<Option<Phase>> {
        let store = self.store.read().await;
        Ok(store.phases.get(&id).cloned())
    }

    async fn get_phase_by_slug(&self, track_id: Uuid, slug: &str) -> RepoResult<Option<Phase>> {
        let store = self.store.read().await;
        Ok(store
            .phases
            .values()
            .find(|p| p.track_id == track_id && p.slug == slug)
            .cloned())
    }

    async fn create_phase(&self, track_id: Uuid, req: CreatePhaseRequest) -> RepoResult<Phase> {
        let mut store = self.store.write().await;
        if !store.tracks.contains_key(&track_id) {
            return Err(AppError::bad_request("The record is still referenced by other records"));
        }
        let slug = req.slug.trim().to_string();
        let siblings = store
            .phases
            .iter()
            .filter(|(_, p)| p.track_id == track_id)
            .map(|(id, p)| (id, &p.slug));
        if Store::slug_taken(siblings, &slug, None) {
            return Err(AppError::bad_request(
                "A phase with this slug already exists in the track",
            ));
        }
        let position = req.position.unwrap_or_else(|| {
            Store::next_position(
                store
                    .phases
                    .values()
                    .filter(|p| p.track_id == track_id)
                    .map(|p| &p.position),
            )
        });
        let now = Utc::now();
        let phase = Phase {
            id: Uuid::new_v4(),
            track_id,
            slug,
            title_en: req.title_en.trim().to_string(),
            title_tr: req.title_tr.trim().to_string(),
            description_en: req.description_en,
            description_tr: req.description_tr,
            position,
            duration_months: req.duration_months.unwrap_or(1),
            created_at: now,
            updated_at: now,
        };
        store.phases.insert(phase.id, phase.clone());
        Ok(phase)
    }

    async fn update_phase(&self, id: Uuid, req: UpdatePhaseRequest) -> RepoResult<Option<Phase>> {
        let mut store = self.store.write().await;
        let Some(track_id) = store.phases.get(&id).map(|p| p.track_id) else {
            return Ok(None);
        };
        if let Some(slug) = &req.slug {
            let siblings = store
                .phases
                .iter()
                .filter(|(_, p)| p.track_id == track_id)
                .map(|(id, p)| (id, &p.slug));
            if Store::slug_taken(siblings, slug, Some(id)) {
                return Err(AppError::bad_request(
                    "A phase with this slug already exists in the track",
                ));
            }
        }
        let Some(phase) = store.phases.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = req.slug {
            phase.slug = v;
        }
        if let Some(v) = req.title_en {
            phase.title_en = v;
        }
        if let Some(v) = req.title_tr {
            phase.title_tr = v;
        }
        if let Some(v) = req.description_en {
            phase.description_en = Some(v);
        }
        if let Some(v) = req.description_tr {
            phase.description_tr = Some(v);
        }
        if let Some(v) = req.position {
            phase.position = v;
        }
        if let Some(v) = req.duration_months {
            phase.duration_months = v;
        }
        phase.updated_at = Utc::now();
        Ok(Some(phase.clone()))
    }

    async fn delete_phase(&self, id: Uuid) -> RepoResult<bool> {
        let mut store = self.store.write().await;
        if store.topics.values().any(|t| t.phase_id == id) {
            return Err(AppError::bad_request("Phase is still in use"));
        }
        Ok(store.phases.remove(&id).is_some())
    }

    // --- Topics ---

    async fn list_topics(&self, filter: &TopicFilter) -> RepoResult<(Vec<TopicEntry>, i64)> {
        let store = self.store.read().await;
        let needle = filter.search.as_deref().map(str::to_lowercase);
        let mut topics: Vec<&Topic> = store
            .topics
            .values()
            .filter(|t| filter.phase_id.is_none_or(|id| t.phase_id == id))
            .filter(|t| filter.difficulty.is_none_or(|d| t.difficulty == Some(d)))
            .filter(|t| match &needle {
                Some(n) => {
                    contains_ci(&t.title_en, n) || contains_ci(&t.title_tr, n) || contains_ci(&t.slug, n)
                }
                None => true,
            })
            .collect();
        topics.sort_by_key(|t| (store.catalog_order(t), t.created_at));
        let total = topics.len() as i64;
        let page = topics
            .into_iter()
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .filter_map(|t| store.topic_entry(t))
            .collect();
        Ok((page, total))
    }

    async fn topics_in_phase(&self, phase_id: Uuid) -> RepoResult<Vec<Topic>> {
        let store = self.store.read().await;
        let mut topics: Vec<Topic> = store
            .topics
            .values()
            .filter(|t| t.phase_id == phase_id)
            .cloned()
            .collect();
        topics.sort_by_key(|t| (t.position, t.created_at));
        Ok(topics)
    }

    async fn get_topic(&self, id: Uuid) -> RepoResult<Option<Topic>> {
        let store = self.store.read().await;
        Ok(store.topics.get(&id).cloned())
    }

    async fn get_topic_by_slug(&self, phase_id: Uuid, slug: &str) -> RepoResult<Option<Topic>> {
        let store = self.store.read().await;
        Ok(store
            .topics
            .values()
            .find(|t| t.phase_id == phase_id && t.slug == slug)
            .cloned())
    }

    async fn topic_path(&self, topic_id: Uuid) -> RepoResult<Option<TopicPath>> {
        let store = self.store.read().await;
        Ok(store.path(topic_id))
    }

    async fn topic_counts(&self, topic_id: Uuid) -> RepoResult<TopicCounts> {
        let store = self.store.read().await;
        Ok(TopicCounts {
            resources: store
                .resources
                .values()
                .filter(|r| r.topic_id == topic_id)
                .count() as i64,
            quizzes: store
                .quizzes
                .values()
                .filter(|q| q.topic_id == topic_id)
                .count() as i64,
            progress_items: store
                .progress
                .values()
                .filter(|p| p.topic_id == topic_id)
                .count() as i64,
        })
    }

    async fn create_topic(&self, phase_id: Uuid, req: CreateTopicRequest) -> RepoResult<Topic> {
        let mut store = self.store.write().await;
        if !store.phases.contains_key(&phase_id) {
            return Err(AppError::bad_request("The record is still referenced by other records"));
        }
        let slug = req.slug.trim().to_string();
        let siblings = store
            .topics
            .iter()
            .filter(|(_, t)| t.phase_id == phase_id)
            .map(|(id, t)| (id, &t.slug));
        if Store::slug_taken(siblings, &slug, None) {
            return Err(AppError::bad_request(
                "A topic with this slug already exists in the phase",
            ));
        }
        let position = req.position.unwrap_or_else(|| {
            Store::next_position(
                store
                    .topics
                    .values()
                    .filter(|t| t.phase_id == phase_id)
                    .map(|t| &t.position),
            )
        });
        let now = Utc::now();
        let topic = Topic {
            id: Uuid::new_v4(),
            phase_id,
            slug,
            title_en: req.title_en.trim().to_string(),
            title_tr: req.title_tr.trim().to_string(),
            description_en: req.description_en,
            description_tr: req.description_tr,
            content_en: req.content_en,
            content_tr: req.content_tr,
            position,
            estimated_hours: req.estimated_hours,
            difficulty: req.difficulty,
            created_at: now,
            updated_at: now,
        };
        store.topics.insert(topic.id, topic.clone());
        Ok(topic)
    }

    async fn update_topic(&self, id: Uuid, req: UpdateTopicRequest) -> RepoResult<Option<Topic>> {
        let mut store = self.store.write().await;
        let Some(current) = store.topics.get(&id) else {
            return Ok(None);
        };
        let phase_id = req.phase_id.unwrap_or(current.phase_id);
        let slug = req.slug.clone().unwrap_or_else(|| current.slug.clone());
        let siblings = store
            .topics
            .iter()
            .filter(|(_, t)| t.phase_id == phase_id)
            .map(|(id, t)| (id, &t.slug));
        if Store::slug_taken(siblings, &slug, Some(id)) {
            return Err(AppError::bad_request(
                "A topic with this slug already exists in the phase",
            ));
        }
        let Some(topic) = store.topics.get_mut(&id) else {
            return Ok(None);
        };
        topic.phase_id = phase_id;
        topic.slug = slug;
        if let Some(v) = req.title_en {
            topic.title_en = v;
        }
        if let Some(v) = req.title_tr {
            topic.title_tr = v;
        }
        if let Some(v) = req.description_en {
            topic.description_en = Some(v);
        }
        if let Some(v) = req.description_tr {
            topic.description_tr = Some(v);
        }
        if let Some(v) = req.content_en {
            topic.content_en = Some(v);
        }
        if let Some(v) = req.content_tr {
            topic.content_tr = Some(v);
        }
        if let Some(v) = req.position {
            topic.position = v;
        }
        if let Some(v) = req.estimated_hours {
            topic.estimated_hours = Some(v);
        }
        if let Some(v) = req.difficulty {
            topic.difficulty = Some(v);
        }
        topic.updated_at = Utc::now();
        Ok(Some(topic.clone()))
    }

    async fn delete_topic(&self, id: Uuid) -> RepoResult<bool> {
        let mut store = self.store.write().await;
        if store.topics.remove(&id).is_none() {
            return Ok(false);
        }
        store.resources.retain(|_, r| r.topic_id != id);
        let quiz_ids: Vec<Uuid> = store
            .quizzes
            .values()
            .filter(|q| q.topic_id == id)
            .map(|q| q.id)
            .collect();
        for quiz_id in quiz_ids {
            store.remove_quiz(quiz_id);
        }
        store.progress.retain(|_, p| p.topic_id != id);
        store.bookmarks.retain(|_, b| b.topic_id != id);
        store.notes.retain(|_, n| n.topic_id != id);
        Ok(true)
    }

    async fn search_topics(&self, term: &str, limit: i64) -> RepoResult<Vec<TopicEntry>> {
        let store = self.store.read().await;
        let needle = term.to_lowercase();
        let mut hits: Vec<&Topic> = store
            .topics
            .values()
            .filter(|t| {
                contains_ci(&t.title_en, &needle)
                    || contains_ci(&t.title_tr, &needle)
                    || contains_ci_opt(&t.description_en, &needle)
                    || contains_ci_opt(&t.description_tr, &needle)
            })
            .collect();
        hits.sort_by(|a, b| a.title_en.cmp(&b.title_en));
        Ok(hits
            .into_iter()
            .take(limit.max(0) as usize)
            .filter_map(|t| store.topic_entry(t))
            .collect())
    }

    async fn recent_topics(&self, limit: i64) -> RepoResult<Vec<TopicEntry>> {
        let store = self.store.read().await;
        let mut topics: Vec<&Topic> = store.topics.values().collect();
        topics.sort_by_key(|t| Reverse(t.created_at));
        Ok(topics
            .into_iter()
            .take(limit.max(0) as usize)
            .filter_map(|t| store.topic_entry(t))
            .collect())
    }

    // --- Resources ---

    async fn list_resources(&self, topic_id: Option<Uuid>) -> RepoResult<Vec<ResourceEntry>> {
        let store = self.store.read().await;
        let mut resources: Vec<&Resource> = store
            .resources
            .values()
            .filter(|r| topic_id.is_none_or(|id| r.topic_id == id))
            .collect();
        resources.sort_by_key(|r| {
            let order = store
                .topics
                .get(&r.topic_id)
                .map(|t| store.catalog_order(t))
                .unwrap_or_default();
            (order, r.position, r.created_at)
        });
        Ok(resources
            .into_iter()
            .filter_map(|r| store.resource_entry(r))
            .collect())
    }

    async fn get_resource(&self, id: Uuid) -> RepoResult<Option<Resource>> {
        let store = self.store.read().await;
        Ok(store.resources.get(&id).cloned())
    }

    async fn create_resource(
        &self,
        topic_id: Uuid,
        req: CreateResourceRequest,
    ) -> RepoResult<Resource> {
        let mut store = self.store.write().await;
        if !store.topics.contains_key(&topic_id) {
            return Err(AppError::bad_request("The record is still referenced by other records"));
        }
        let position = req.position.unwrap_or_else(|| {
            Store::next_position(
                store
                    .resources
                    .values()
                    .filter(|r| r.topic_id == topic_id)
                    .map(|r| &r.position),
            )
        });
        let now = Utc::now();
        let resource = Resource {
            id: Uuid::new_v4(),
            topic_id,
            title_en: req.title_en.trim().to_string(),
            title_tr: req.title_tr.trim().to_string(),
            description_en: req.description_en,
            description_tr: req.description_tr,
            resource_type: req.resource_type.unwrap_or_default(),
            url: req.url.trim().to_string(),
            position,
            duration_minutes: req.duration_minutes,
            is_premium: req.is_premium.unwrap_or(false),
            created_at: now,
            updated_at: now,
        };
        store.resources.insert(resource.id, resource.clone());
        Ok(resource)
    }

    async fn update_resource(
        &self,
        id: Uuid,
        req: UpdateResourceRequest,
    ) -> RepoResult<Option<Resource>> {
        let mut store = self.store.write().await;
        let Some(resource) = store.resources.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = req.topic_id {
            resource.topic_id = v;
        }
        if let Some(v) = req.title_en {
            resource.title_en = v;
        }
        if let Some(v) = req.title_tr {
            resource.title_tr = v;
        }
        if let Some(v) = req.description_en {
            resource.description_en = Some(v);
        }
        if let Some(v) = req.description_tr {
            resource.description_tr = Some(v);
        }
        if let Some(v) = req.resource_type {
            resource.resource_type = v;
        }
        if let Some(v) = req.url {
            resource.url = v;
        }
        if let Some(v) = req.position {
            resource.position = v;
        }
        if let Some(v) = req.duration_minutes {
            resource.duration_minutes = Some(v);
        }
        if let Some(v) = req.is_premium {
            resource.is_premium = v;
        }
        resource.updated_at = Utc::now();
        Ok(Some(resource.clone()))
    }

    async fn delete_resource(&self, id: Uuid) -> RepoResult<bool> {
        let mut store = self.store.write().await;
        Ok(store.resources.remove(&id).is_some())
    }

    async fn search_resources(&self, term: &str, limit: i64) -> RepoResult<Vec<ResourceEntry>> {
        let store = self.store.read().await;
        let needle = term.to_lowercase();
        let mut hits: Vec<&Resource> = store
            .resources
            .values()
            .filter(|r| {
                contains_ci(&r.title_en, &needle)
                    || contains_ci(&r.title_tr, &needle)
                    || contains_ci_opt(&r.description_en, &needle)
                    || contains_ci_opt(&r.description_tr, &needle)
            })
            .collect();
        hits.sort_by(|a, b| a.title_en.cmp(&b.title_en));
        Ok(hits
            .into_iter()
            .take(limit.max(0) as usize)
            .filter_map(|r| store.resource_entry(r))
            .collect())
    }

    async fn recent_resources(&self, limit: i64) -> RepoResult<Vec<ResourceEntry>> {
        let store = self.store.read().await;
        let mut resources: Vec<&Resource> = store.resources.values().collect();
        resources.sort_by_key(|r| Reverse(r.created_at));
        Ok(resources
            .into_iter()
            .take(limit.max(0) as usize)
            .filter_map(|r| store.resource_entry(r))
            .collect())
    }

    // --- Quizzes ---

    async fn list_quizzes(&self, topic_id: Option<Uuid>) -> RepoResult<Vec<QuizSummary>> {
        let store = self.store.read().await;
        let mut quizzes: Vec<QuizSummary> = store
            .quizzes
            .values()
            .filter(|q| topic_id.is_none_or(|id| q.topic_id == id))
            .map(|quiz| QuizSummary {
                quiz: quiz.clone(),
                question_count: store.question_count(quiz.id),
            })
            .collect();
        quizzes.sort_by_key(|q| Reverse(q.quiz.created_at));
        Ok(quizzes)
    }

    async fn get_quiz(&self, id: Uuid) -> RepoResult<Option<Quiz>> {
        let store = self.store.read().await;
        Ok(store.quizzes.get(&id).cloned())
    }

    async fn quiz_questions(&self, quiz_id: Uuid) -> RepoResult<Vec<QuestionWithChoices>> {
        let store = self.store.read().await;
        let mut questions: Vec<QuestionWithChoices> = store
            .questions
            .values()
            .filter(|q| q.quiz_id == quiz_id)
            .map(|question| {
                let mut choices: Vec<Choice> = store
                    .choices
                    .values()
                    .filter(|c| c.question_id == question.id)
                    .cloned()
                    .collect();
                choices.sort_by_key(|c| c.position);
                QuestionWithChoices {
                    question: question.clone(),
                    choices,
                }
            })
            .collect();
        questions.sort_by_key(|q| q.question.position);
        Ok(questions)
    }

    async fn create_quiz(&self, topic_id: Uuid, req: CreateQuizRequest) -> RepoResult<Quiz> {
        let mut store = self.store.write().await;
        if !store.topics.contains_key(&topic_id) {
            return Err(AppError::bad_request("The record is still referenced by other records"));
        }
        let now = Utc::now();
        let quiz = Quiz {
            id: Uuid::new_v4(),
            topic_id,
            title_en: req.title_en.trim().to_string(),
            title_tr: req.title_tr.trim().to_string(),
            description_en: req.description_en,
            description_tr: req.description_tr,
            passing_score: req.passing_score.unwrap_or(DEFAULT_PASSING_SCORE),
            time_limit_minutes: req.time_limit_minutes,
            created_at: now,
            updated_at: now,
        };
        for (q_pos, q) in req.questions.into_iter().enumerate() {
            let question = Question {
                id: Uuid::new_v4(),
                quiz_id: quiz.id,
                question_text_en: q.question_text_en,
                question_text_tr: q.question_text_tr,
                explanation_en: q.explanation_en,
                explanation_tr: q.explanation_tr,
                position: q_pos as i32,
            };
            for (c_pos, c) in q.choices.into_iter().enumerate() {
                let choice = Choice {
                    id: Uuid::new_v4(),
                    question_id: question.id,
                    choice_text_en: c.choice_text_en,
                    choice_text_tr: c.choice_text_tr,
                    is_correct: c.is_correct,
                    position: c_pos as i32,
                };
                store.choices.insert(choice.id, choice);
            }
            store.questions.insert(question.id, question);
        }
        store.quizzes.insert(quiz.id, quiz.clone());
        Ok(quiz)
    }

    async fn update_quiz(&self, id: Uuid, req: UpdateQuizRequest) -> RepoResult<Option<Quiz>> {
        let mut store = self.store.write().await;
        let Some(quiz) = store.quizzes.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = req.title_en {
            quiz.title_en = v;
        }
        if let Some(v) = req.title_tr {
            quiz.title_tr = v;
        }
        if let Some(v) = req.description_en {
            quiz.description_en = Some(v);
        }
        if let Some(v) = req.description_tr {
            quiz.description_tr = Some(v);
        }
        if let Some(v) = req.passing_score {
            quiz.passing_score = v;
        }
        if let Some(v) = req.time_limit_minutes {
            quiz.time_limit_minutes = Some(v);
        }
        quiz.updated_at = Utc::now();
        Ok(Some(quiz.clone()))
    }

    async fn delete_quiz(&self, id: Uuid) -> RepoResult<bool> {
        let mut store = self.store.write().await;
        Ok(store.remove_quiz(id))
    }

    async fn record_attempt(&self, attempt: NewQuizAttempt) -> RepoResult<QuizAttempt> {
        let mut store = self.store.write().await;
        let saved = QuizAttempt {
            id: Uuid::new_v4(),
            user_id: attempt.user_id,
            quiz_id: attempt.quiz_id,
            score: attempt.score,
            correct_answers: attempt.correct_answers,
            total_questions: attempt.total_questions,
            passed: attempt.passed,
            created_at: Utc::now(),
        };
        for answer in attempt.answers {
            let row = QuizAnswer {
                id: Uuid::new_v4(),
                attempt_id: saved.id,
                question_id: answer.question_id,
                choice_id: answer.choice_id,
                is_correct: answer.is_correct,
            };
            store.answers.insert(row.id, row);
        }
        store.attempts.insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn list_attempts(
        &self,
        user_id: Uuid,
        quiz_id: Option<Uuid>,
    ) -> RepoResult<Vec<QuizAttempt>> {
        let store = self.store.read().await;
        let mut attempts: Vec<QuizAttempt> = store
            .attempts
            .values()
            .filter(|a| a.user_id == user_id && quiz_id.is_none_or(|id| a.quiz_id == id))
            .cloned()
            .collect();
        attempts.sort_by_key(|a| Reverse(a.created_at));
        Ok(attempts)
    }

    // --- Progress ---

    async fn list_progress(&self, user_id: Uuid) -> RepoResult<Vec<ProgressEntry>> {
        let store = self.store.read().await;
        let mut items: Vec<&ProgressItem> = store
            .progress
            .values()
            .filter(|p| p.user_id == user_id)
            .collect();
        items.sort_by_key(|p| Reverse(p.updated_at));
        Ok(items
            .into_iter()
            .filter_map(|item| {
                Some(ProgressEntry {
                    item: item.clone(),
                    topic: store.path(item.topic_id)?,
                })
            })
            .collect())
    }

    async fn upsert_progress(
        &self,
        user_id: Uuid,
        topic_id: Uuid,
        status: ProgressStatus,
    ) -> RepoResult<ProgressItem> {
        let mut store = self.store.write().await;
        let now = Utc::now();
        let existing = store
            .progress
            .values_mut()
            .find(|p| p.user_id == user_id && p.topic_id == topic_id);

        let item = match existing {
            Some(item) => {
                item.completed_at = match status {
                    ProgressStatus::Completed => item.completed_at.or(Some(now)),
                    _ => None,
                };
                item.status = status;
                item.updated_at = now;
                item.clone()
            }
            None => {
                let item = ProgressItem {
                    id: Uuid::new_v4(),
                    user_id,
                    topic_id,
                    status,
                    completed_at: (status == ProgressStatus::Completed).then_some(now),
                    created_at: now,
                    updated_at: now,
                };
                store.progress.insert(item.id, item.clone());
                item
            }
        };
        Ok(item)
    }

    async fn progress_stats(&self, user_id: Option<Uuid>) -> RepoResult<ProgressStats> {
        let store = self.store.read().await;
        let mut stats = ProgressStats::default();
        for item in store
            .progress
            .values()
            .filter(|p| user_id.is_none_or(|id| p.user_id == id))
        {
            stats.total += 1;
            match item.status {
                ProgressStatus::Planned => stats.planned += 1,
                ProgressStatus::InProgress => stats.in_progress += 1,
                ProgressStatus::Completed => stats.completed += 1,
            }
        }
        Ok(stats)
    }

    async fn recent_completions(&self, limit: i64) -> RepoResult<Vec<CompletionRecord>> {
        let store = self.store.read().await;
        let mut records: Vec<CompletionRecord> = store
            .progress
            .values()
            .filter(|p| p.status == ProgressStatus::Completed)
            .filter_map(|p| {
                let user = &store.users.get(&p.user_id)?.user;
                let topic = store.topics.get(&p.topic_id)?;
                Some(CompletionRecord {
                    progress_id: p.id,
                    user_id: user.id,
                    user_name: user.name.clone(),
                    user_email: user.email.clone(),
                    topic_id: topic.id,
                    topic_title_en: topic.title_en.clone(),
                    topic_title_tr: topic.title_tr.clone(),
                    completed_at: p.completed_at?,
                })
            })
            .collect();
        records.sort_by_key(|r| Reverse(r.completed_at));
        records.truncate(limit.max(0) as usize);
        Ok(records)
    }

    // --- Bookmarks ---

    async fn list_bookmarks(&self, user_id: Uuid) -> RepoResult<Vec<BookmarkEntry>> {
        let store = self.store.read().await;
        let mut bookmarks: Vec<&Bookmark> = store
            .bookmarks
            .values()
            .filter(|b| b.user_id == user_id)
            .collect();
        bookmarks.sort_by_key(|b| Reverse(b.created_at));
        Ok(bookmarks
            .into_iter()
            .filter_map(|b| {
                Some(BookmarkEntry {
                    bookmark: b.clone(),
                    topic: store.path(b.topic_id)?,
                })
            })
            .collect())
    }

    async fn find_bookmark(&self, user_id: Uuid, topic_id: Uuid) -> RepoResult<Option<Bookmark>> {
        let store = self.store.read().await;
        Ok(store
            .bookmarks
            .values()
            .find(|b| b.user_id == user_id && b.topic_id == topic_id)
            .cloned())
    }

    async fn create_bookmark(&self, user_id: Uuid, topic_id: Uuid) -> RepoResult<Bookmark> {
        let mut store = self.store.write().await;
        if store
            .bookmarks
            .values()
            .any(|b| b.user_id == user_id && b.topic_id == topic_id)
        {
            return Err(AppError::bad_request("Topic is already bookmarked"));
        }
        let bookmark = Bookmark {
            id: Uuid::new_v4(),
            user_id,
            topic_id,
            created_at: Utc::now(),
        };
        store.bookmarks.insert(bookmark.id, bookmark.clone());
        Ok(bookmark)
    }

    async fn delete_bookmark(&self, user_id: Uuid, topic_id: Uuid) -> RepoResult<bool> {
        let mut store = self.store.write().await;
        let before = store.bookmarks.len();
        store
            .bookmarks
            .retain(|_, b| !(b.user_id == user_id && b.topic_id == topic_id));
        Ok(store.bookmarks.len() < before)
    }

    // --- Notes ---

    async fn list_notes(&self, user_id: Uuid, topic_id: Option<Uuid>) -> RepoResult<Vec<NoteEntry>> {
        let store = self.store.read().await;
        let mut notes: Vec<&Note> = store
            .notes
            .values()
            .filter(|n| n.user_id == user_id && topic_id.is_none_or(|id| n.topic_id == id))
            .collect();
        notes.sort_by_key(|n| Reverse(n.updated_at));
        Ok(notes
            .into_iter()
            .filter_map(|n| {
                Some(NoteEntry {
                    note: n.clone(),
                    topic: store.path(n.topic_id)?,
                })
            })
            .collect())
    }

    async fn create_note(&self, user_id: Uuid, topic_id: Uuid, content: String) -> RepoResult<Note> {
        let mut store = self.store.write().await;
        let now = Utc::now();
        let note = Note {
            id: Uuid::new_v4(),
            user_id,
            topic_id,
            content,
            created_at: now,
            updated_at: now,
        };
        store.notes.insert(note.id, note.clone());
        Ok(note)
    }

    async fn update_note(&self, id: Uuid, user_id: Uuid, content: String) -> RepoResult<Option<Note>> {
        let mut store = self.store.write().await;
        match store.notes.get_mut(&id) {
            Some(note) if note.user_id == user_id => {
                note.content = content;
                note.updated_at = Utc::now();
                Ok(Some(note.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_note(&self, id: Uuid, user_id: Uuid) -> RepoResult<bool> {
        let mut store = self.store.write().await;
        match store.notes.get(&id) {
            Some(note) if note.user_id == user_id => Ok(store.notes.remove(&id).is_some()),
            _ => Ok(false),
        }
    }

    // --- Badges ---

    async fn list_badges(&self) -> RepoResult<Vec<Badge>> {
        let store = self.store.read().await;
        let mut badges: Vec<Badge> = store.badges.values().cloned().collect();
        badges.sort_by_key(|b| (b.required_count, b.created_at));
        Ok(badges)
    }

    async fn create_badge(&self, req: CreateBadgeRequest) -> RepoResult<Badge> {
        let mut store = self.store.write().await;
        let slug = req.slug.trim().to_string();
        if store.badges.values().any(|b| b.slug == slug) {
            return Err(AppError::bad_request("A badge with this slug already exists"));
        }
        let badge = Badge {
            id: Uuid::new_v4(),
            slug,
            name_en: req.name_en.trim().to_string(),
            name_tr: req.name_tr.trim().to_string(),
            description_en: req.description_en,
            description_tr: req.description_tr,
            icon: req.icon,
            required_count: req.required_count.unwrap_or(1),
            created_at: Utc::now(),
        };
        store.badges.insert(badge.id, badge.clone());
        Ok(badge)
    }

    async fn user_badges(&self, user_id: Uuid) -> RepoResult<Vec<EarnedBadge>> {
        let store = self.store.read().await;
        let mut earned: Vec<EarnedBadge> = store
            .user_badges
            .values()
            .filter(|ub| ub.user_id == user_id)
            .filter_map(|ub| {
                Some(EarnedBadge {
                    badge: store.badges.get(&ub.badge_id)?.clone(),
                    earned_at: ub.earned_at,
                })
            })
            .collect();
        earned.sort_by_key(|e| Reverse(e.earned_at));
        Ok(earned)
    }

    async fn award_badge(&self, user_id: Uuid, badge_id: Uuid) -> RepoResult<bool> {
        let mut store = self.store.write().await;
        if store
            .user_badges
            .values()
            .any(|ub| ub.user_id == user_id && ub.badge_id == badge_id)
        {
            return Ok(false);
        }
        let row = UserBadge {
            id: Uuid::new_v4(),
            user_id,
            badge_id,
            earned_at: Utc::now(),
        };
        store.user_badges.insert(row.id, row);
        Ok(true)
    }

    // --- Admin ---

    async fn entity_counts(&self) -> RepoResult<EntityCounts> {
        let store = self.store.read().await;
        let week_ago = Utc::now() - Duration::days(7);
        let admin_count = store
            .users
            .values()
            .filter(|s| s.user.role == Role::Admin)
            .count() as i64;
        let total_users = store.users.len() as i64;
        Ok(EntityCounts {
            total_users,
            admin_count,
            user_count: total_users - admin_count,
            new_users_this_week: store
                .users
                .values()
                .filter(|s| s.user.created_at >= week_ago)
                .count() as i64,
            total_tracks: store.tracks.len() as i64,
            total_phases: store.phases.len() as i64,
            total_topics: store.topics.len() as i64,
            total_resources: store.resources.len() as i64,
            total_quizzes: store.quizzes.len() as i64,
            total_badges: store.badges.len() as i64,
        })
    }
}
