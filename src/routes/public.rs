use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Read-only catalog access and the identity gateway. Nothing here needs a
/// session; quiz grading lives in the authenticated router because attempts
/// are stored per user.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Pings the repository so load balancers notice a lost database.
        .route("/health", get(handlers::health_check))
        // --- Identity ---
        .route("/auth/register", post(handlers::auth::register_user))
        // POST /auth/login
        // Returns the token in the body and also sets the `session-token` cookie.
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        // --- Catalog ---
        .route("/tracks", get(handlers::catalog::list_tracks))
        // GET /tracks/{slug}
        // The full tree of one track, resources and quiz summaries included.
        .route("/tracks/{slug}", get(handlers::catalog::get_track))
        .route(
            "/topics/{track_slug}/{phase_slug}/{topic_slug}",
            get(handlers::catalog::get_topic),
        )
        .route("/resources", get(handlers::catalog::list_resources))
        .route("/search", get(handlers::catalog::search))
        // GET /quiz/{quiz_id}
        // Questions and choices without the correct answers.
        .route("/quiz/{quiz_id}", get(handlers::quiz::get_quiz))
}
