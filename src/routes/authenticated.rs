use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, post, put},
};

/// Authenticated Router Module
///
/// Everything a logged-in learner does. All state here is scoped to the
/// caller: handlers only ever read or write rows owned by `AuthUser::id`.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        .route("/auth/session", get(handlers::auth::get_session))
        .route(
            "/profile",
            get(handlers::auth::get_profile).put(handlers::auth::update_profile),
        )
        // --- Progress ---
        // POST /progress
        // Upserts the status of one topic. Completing a topic runs the badge check.
        .route(
            "/progress",
            get(handlers::learner::list_progress).post(handlers::learner::update_progress),
        )
        .route("/progress/stats", get(handlers::learner::progress_stats))
        // --- Bookmarks ---
        // POST /bookmarks toggles; DELETE removes unconditionally.
        .route(
            "/bookmarks",
            get(handlers::learner::list_bookmarks).post(handlers::learner::toggle_bookmark),
        )
        .route(
            "/bookmarks/{topic_id}",
            delete(handlers::learner::delete_bookmark),
        )
        // --- Notes ---
        .route(
            "/notes",
            get(handlers::learner::list_notes).post(handlers::learner::create_note),
        )
        // PUT/DELETE /notes/{id}
        // Owner-only. Someone else's note is reported as missing.
        .route(
            "/notes/{id}",
            put(handlers::learner::update_note).delete(handlers::learner::delete_note),
        )
        .route("/badges", get(handlers::learner::list_badges))
        // --- Quizzes ---
        .route("/quiz/{quiz_id}/submit", post(handlers::quiz::submit_quiz))
        .route("/quiz/attempts", get(handlers::quiz::list_attempts))
}
