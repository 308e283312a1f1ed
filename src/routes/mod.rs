/// Router Module Index
///
/// Routes are split by access level. Each module returns a `Router<AppState>`
/// that `create_router` nests under `/api` and layers with the matching
/// access control.

/// Catalog browsing, quiz taking, registration and login. No session required.
pub mod public;

/// Learner features. Wrapped in the auth middleware, so every handler gets a
/// resolved `AuthUser`.
pub mod authenticated;

/// Content and user management. Authenticated by the same middleware; the
/// admin role is checked inside each handler.
pub mod admin;
