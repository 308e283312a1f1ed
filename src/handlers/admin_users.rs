use axum::extract::{Path, Query, State};
use uuid::Uuid;

use super::found;
use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiJson, ApiResponse, ApiResult, AppError},
    models::{AdminUpdateUserRequest, Page, User, UserDetail, UserOverview, UserQuery},
    repository::Repository,
};

/// Number of progress items shown on the user detail page.
const RECENT_PROGRESS_LIMIT: usize = 5;

async fn user_overview(repo: &dyn Repository, user: User) -> Result<UserOverview, AppError> {
    let profile = found(repo.get_profile(user.id).await?, "User not found")?;
    let stats = repo.user_stats(user.id).await?;
    Ok(UserOverview {
        profile,
        created_at: user.created_at,
        stats,
    })
}

/// list_users
///
/// [Admin Route] Paginated accounts with profile fields and activity counts,
/// filtered by name/email search and role.
#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(UserQuery),
    responses(
        (status = 200, description = "One page of users", body = [UserOverview]),
        (status = 400, description = "Unknown role"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn list_users(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Page<UserOverview>> {
    auth.require_admin()?;
    let (page, filter) = query.into_filter()?;
    let (users, total) = state.repo.list_users(&filter).await?;

    let mut items = Vec::with_capacity(users.len());
    for user in users {
        items.push(user_overview(state.repo.as_ref(), user).await?);
    }

    Ok(ApiResponse::ok(Page::new(items, page, filter.limit, total)))
}

/// get_user
///
/// [Admin Route] A user with profile, learning stats and recent progress.
#[utoipa::path(
    get,
    path = "/api/admin/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User with recent progress", body = UserDetail),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<UserDetail> {
    auth.require_admin()?;
    let user = found(state.repo.get_user(id).await?, "User not found")?;
    let overview = user_overview(state.repo.as_ref(), user).await?;

    let mut recent_progress = state.repo.list_progress(id).await?;
    recent_progress.truncate(RECENT_PROGRESS_LIMIT);

    Ok(ApiResponse::ok(UserDetail {
        overview,
        recent_progress,
    }))
}

/// update_user
///
/// [Admin Route] Changes role, name, bio or preferred language. An admin
/// cannot change their own role.
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = AdminUpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserOverview),
        (status = 400, description = "Invalid fields or own role change"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<AdminUpdateUserRequest>,
) -> ApiResult<UserOverview> {
    auth.require_admin()?;
    let (user_changes, profile_changes) = payload.into_changes()?;

    if id == auth.id && user_changes.role.is_some_and(|role| role != auth.role) {
        return Err(AppError::bad_request("Cannot change your own role"));
    }

    let user = found(state.repo.update_user(id, user_changes).await?, "User not found")?;
    state.repo.update_profile(id, profile_changes).await?;

    tracing::info!(admin_id = %auth.id, user_id = %id, role = ?user.role, "User updated by admin");
    Ok(ApiResponse::ok(user_overview(state.repo.as_ref(), user).await?))
}

/// delete_user
///
/// [Admin Route] Deletes an account with its profile, progress, bookmarks,
/// notes, badges and quiz attempts. An admin cannot delete their own account.
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 400, description = "Own account"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    auth.require_admin()?;
    if id == auth.id {
        return Err(AppError::bad_request("Cannot delete your own account"));
    }
    if !state.repo.delete_user(id).await? {
        return Err(AppError::not_found("User not found"));
    }
    tracing::warn!(admin_id = %auth.id, user_id = %id, "User deleted by admin");
    Ok(ApiResponse::message("User deleted successfully"))
}
