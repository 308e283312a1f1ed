use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::{learner::ProgressEntry, non_blank};
use crate::{error::AppError, locale::Locale};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_NAME_LEN: usize = 2;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl std::str::FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(AppError::bad_request(format!(
                "Invalid role '{other}': expected 'user' or 'admin'"
            ))),
        }
    }
}

/// User
///
/// The account record. The password hash lives in a separate row type
/// ([`Credentials`]) so it can never end up in a response body.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub image: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Login lookup row. Internal only.
#[derive(Debug, Clone, FromRow)]
pub struct Credentials {
    pub id: Uuid,
    pub password_hash: String,
}

/// Insert payload for a new account. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: Role,
}

/// Partial update of the account row.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub image: Option<String>,
    pub role: Option<Role>,
}

/// Partial update of the profile row.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub bio: Option<String>,
    pub preferred_language: Option<Locale>,
}

/// ProfileView
///
/// Account and profile fields merged into one response (GET /profile).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct ProfileView {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub image: Option<String>,
    pub bio: Option<String>,
    pub preferred_language: Locale,
    pub level: i32,
    pub experience_points: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct UserStats {
    pub total_progress: i64,
    pub completed_topics: i64,
    pub in_progress_topics: i64,
    pub total_badges: i64,
    pub total_bookmarks: i64,
    pub total_notes: i64,
    pub quizzes_passed: i64,
}

/// A user as listed on the admin users page.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserOverview {
    #[serde(flatten)]
    pub profile: ProfileView,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    pub stats: UserStats,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserDetail {
    #[serde(flatten)]
    pub overview: UserOverview,
    pub recent_progress: Vec<ProgressEntry>,
}

// --- Request Payloads ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl RegisterRequest {
    /// Validates the payload and returns the normalised email address.
    pub fn validate(&self) -> Result<String, AppError> {
        let email = normalize_email(&self.email);
        if !is_plausible_email(&email) {
            return Err(AppError::bad_request("A valid email address is required"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::bad_request(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        if self.name.trim().chars().count() < MIN_NAME_LEN {
            return Err(AppError::bad_request(format!(
                "Name must be at least {MIN_NAME_LEN} characters"
            )));
        }
        Ok(email)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginResponse {
    pub token: String,
    #[ts(type = "string")]
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_language: Option<Locale>,
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(name) = &self.name {
            if name.trim().chars().count() < MIN_NAME_LEN {
                return Err(AppError::bad_request(format!(
                    "Name must be at least {MIN_NAME_LEN} characters"
                )));
            }
        }
        Ok(())
    }

    pub fn split(self) -> (UserChanges, ProfileChanges) {
        (
            UserChanges {
                name: self.name.map(|n| n.trim().to_string()),
                image: self.image,
                role: None,
            },
            ProfileChanges {
                bio: self.bio,
                preferred_language: self.preferred_language,
            },
        )
    }
}

/// AdminUpdateUserRequest
///
/// Admin edit of another account. `role` is taken as a raw string so an
/// unknown value is reported as a validation error.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AdminUpdateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_language: Option<Locale>,
}

impl AdminUpdateUserRequest {
    pub fn into_changes(self) -> Result<(UserChanges, ProfileChanges), AppError> {
        let role = self.role.as_deref().map(str::parse::<Role>).transpose()?;
        if let Some(name) = &self.name {
            if name.trim().chars().count() < MIN_NAME_LEN {
                return Err(AppError::bad_request(format!(
                    "Name must be at least {MIN_NAME_LEN} characters"
                )));
            }
        }
        Ok((
            UserChanges {
                name: self.name.map(|n| n.trim().to_string()),
                image: None,
                role,
            },
            ProfileChanges {
                bio: self.bio,
                preferred_language: self.preferred_language,
            },
        ))
    }
}

/// Raw query parameters of the admin user listing. `role=all` means no filter.
#[derive(Debug, Clone, Deserialize, IntoParams, Default)]
pub struct UserQuery {
    pub search: Option<String>,
    pub role: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub search: Option<String>,
    pub role: Option<Role>,
    pub limit: i64,
    pub offset: i64,
}

impl UserQuery {
    pub fn into_filter(self) -> Result<(i64, UserFilter), AppError> {
        let role = match non_blank(&self.role) {
            None | Some("all") => None,
            Some(value) => Some(value.parse::<Role>()?),
        };
        let (page, limit, offset) = super::page_window(self.page, self.limit, 10);
        Ok((
            page,
            UserFilter {
                search: non_blank(&self.search).map(str::to_string),
                role,
                limit,
                offset,
            },
        ))
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}
