use axum::{Json, extract::State};
use tower_cookies::Cookies;

use super::{ApiCreated, created, found};
use crate::{
    AppState,
    auth::{self, AuthUser},
    error::{ApiJson, ApiResponse, ApiResult, AppError},
    models::{
        LoginRequest, LoginResponse, NewUser, ProfileView, RegisterRequest, Role,
        UpdateProfileRequest, User, normalize_email,
    },
};

/// register_user
///
/// [Public Route] Creates an account with the `user` role and its default profile.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = User),
        (status = 400, description = "Invalid input or email already registered")
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> ApiCreated<User> {
    let email = payload.validate()?;

    if state.repo.get_user_by_email(&email).await?.is_some() {
        return Err(AppError::bad_request("User already exists"));
    }

    let user = state
        .repo
        .create_user(NewUser {
            email,
            name: payload.name.trim().to_string(),
            password_hash: auth::hash_password(&payload.password)?,
            role: Role::User,
        })
        .await?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok(created(user))
}

/// login
///
/// [Public Route] Verifies the credentials, returns a session token and sets it
/// as the `session-token` cookie.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Invalid email or password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());
    let email = normalize_email(&payload.email);

    let credentials = state
        .repo
        .get_credentials(&email)
        .await?
        .ok_or_else(invalid)?;
    if !auth::verify_password(&payload.password, &credentials.password_hash) {
        tracing::debug!(user_id = %credentials.id, "Login rejected: wrong password");
        return Err(invalid());
    }

    let user = state
        .repo
        .get_user(credentials.id)
        .await?
        .ok_or_else(invalid)?;
    let (token, expires_at) = auth::issue_token(&user, &state.config)?;
    cookies.add(auth::session_cookie(&token, &state.config));

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(ApiResponse::ok(LoginResponse {
        token,
        expires_at,
        user,
    }))
}

/// logout
///
/// [Public Route] Expires the session cookie. Tokens are stateless, so a copy
/// of the token held elsewhere stays valid until it expires.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 200, description = "Logged out"))
)]
pub async fn logout(cookies: Cookies) -> Json<ApiResponse<()>> {
    cookies.add(auth::expired_session_cookie());
    ApiResponse::message("Logged out")
}

/// get_session
///
/// [Authenticated Route] The account behind the current session.
#[utoipa::path(
    get,
    path = "/api/auth/session",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "No valid session")
    )
)]
pub async fn get_session(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<User> {
    let user = state
        .repo
        .get_user(id)
        .await?
        .ok_or_else(AppError::unauthorized)?;
    Ok(ApiResponse::ok(user))
}

/// get_profile
///
/// [Authenticated Route] Account and profile fields of the caller.
#[utoipa::path(
    get,
    path = "/api/profile",
    responses((status = 200, description = "Profile", body = ProfileView))
)]
pub async fn get_profile(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<ProfileView> {
    let profile = found(state.repo.get_profile(id).await?, "Profile not found")?;
    Ok(ApiResponse::ok(profile))
}

/// update_profile
///
/// [Authenticated Route] Partial update of name, image, bio and preferred language.
#[utoipa::path(
    put,
    path = "/api/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileView),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn update_profile(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<UpdateProfileRequest>,
) -> ApiResult<ProfileView> {
    payload.validate()?;
    let (user_changes, profile_changes) = payload.split();

    found(
        state.repo.update_user(id, user_changes).await?,
        "User not found",
    )?;
    let profile = found(
        state.repo.update_profile(id, profile_changes).await?,
        "Profile not found",
    )?;
    Ok(ApiResponse::ok(profile))
}
