use crate::{AppState, handlers::admin, handlers::admin_users, storage::MAX_UPLOAD_BYTES};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

/// Headroom above the file size limit for the multipart framing, so an
/// oversized PDF still reaches the handler and gets the descriptive 400.
const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 2 * 1024 * 1024;

/// Admin Router Module
///
/// Content and user management, mounted at `/api/admin`.
///
/// Access Control:
/// The router is wrapped in the auth middleware, so anonymous requests are
/// rejected with 401 before reaching a handler. Every handler then calls
/// `AuthUser::require_admin`, which answers 403 for non-admins.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/stats
        // Entity counts, progress overview and the newest users, topics and resources.
        .route("/stats", get(admin::get_admin_stats))
        // GET /admin/logs?limit=&type=
        // Activity feed derived from the most recent rows of each kind.
        .route("/logs", get(admin::get_activity_logs))
        // --- Tracks ---
        .route("/tracks", get(admin::list_tracks).post(admin::create_track))
        // DELETE is refused while the track still has phases.
        .route(
            "/tracks/{id}",
            get(admin::get_track)
                .put(admin::update_track)
                .delete(admin::delete_track),
        )
        .route("/tracks-phases", get(admin::list_tracks_with_phases))
        // --- Phases ---
        .route("/phases", get(admin::list_phases).post(admin::create_phase))
        .route(
            "/phases/{id}",
            get(admin::get_phase)
                .put(admin::update_phase)
                .delete(admin::delete_phase),
        )
        // --- Topics ---
        .route("/topics", get(admin::list_topics).post(admin::create_topic))
        // DELETE cascades to resources, quizzes and learner state.
        .route(
            "/topics/{id}",
            get(admin::get_topic)
                .put(admin::update_topic)
                .delete(admin::delete_topic),
        )
        // --- Resources ---
        .route(
            "/resources",
            get(admin::list_resources).post(admin::create_resource),
        )
        .route(
            "/resources/upload",
            post(admin::upload_resource_file).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/resources/{id}",
            get(admin::get_resource)
                .put(admin::update_resource)
                .delete(admin::delete_resource),
        )
        // --- Quizzes ---
        .route("/quizzes", get(admin::list_quizzes).post(admin::create_quiz))
        .route(
            "/quizzes/{id}",
            get(admin::get_quiz)
                .put(admin::update_quiz)
                .delete(admin::delete_quiz),
        )
        // --- Badges ---
        .route("/badges", get(admin::list_badges).post(admin::create_badge))
        // --- Users ---
        .route("/users", get(admin_users::list_users))
        // PUT cannot change the caller's own role; DELETE cannot remove the caller.
        .route(
            "/users/{id}",
            get(admin_users::get_user)
                .put(admin_users::update_user)
                .delete(admin_users::delete_user),
        )
}
