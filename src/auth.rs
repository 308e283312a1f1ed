use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::{
    RequestPartsExt,
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use tower_cookies::{Cookie, Cookies, cookie::SameSite};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    error::AppError,
    models::{Role, User},
    repository::RepositoryState,
};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session-token";

/// Claims
///
/// Payload of a session token, signed with the server's HS256 secret.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the UUID of the user.
    pub sub: Uuid,
    /// Role at issue time. Informational only; the extractor re-reads the role
    /// from the repository on every request.
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
}

/// AuthUser Extractor Result
///
/// The resolved identity of an authenticated request. Handlers take it as an
/// argument to get the caller's id and check permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Rejects the request with 403 unless the caller is an admin.
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            tracing::warn!(user_id = %self.id, "Non-admin attempted an admin operation");
            Err(AppError::forbidden())
        }
    }
}

impl From<&User> for AuthUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            role: user.role,
        }
    }
}

// --- Passwords ---

/// Hashes a password into a PHC string with a random salt.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {e}")))
}

/// Checks a password against a stored PHC string. A malformed hash never verifies.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::error!("Stored password hash is malformed: {}", e);
            false
        }
    }
}

// --- Tokens ---

/// issue_token
///
/// Signs a session token for `user`. Returns the token and its expiry.
pub fn issue_token(user: &User, config: &AppConfig) -> Result<(String, DateTime<Utc>), AppError> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.session_ttl_hours);
    let claims = Claims {
        sub: user.id,
        role: user.role,
        iat: now.timestamp() as usize,
        exp: expires_at.timestamp() as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token signing failed: {e}")))?;
    Ok((token, expires_at))
}

/// Verifies the signature and expiry of a session token.
pub fn decode_token(token: &str, config: &AppConfig) -> Result<Claims, AppError> {
    let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
    let mut validation = Validation::default();
    validation.validate_exp = true;

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => tracing::debug!("Session token expired"),
                _ => tracing::debug!("Session token rejected: {}", e),
            }
            AppError::unauthorized()
        })
}

// --- Cookies ---

/// The session cookie carrying a freshly issued token.
pub fn session_cookie(token: &str, config: &AppConfig) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies())
        .max_age(time::Duration::hours(config.session_ttl_hours))
        .build()
}

/// An empty session cookie that expires immediately.
pub fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::ZERO)
        .build()
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Reads the session cookie through the `CookieManagerLayer` jar. Without the
/// layer there are no cookies to read.
async fn cookie_token(parts: &mut Parts) -> Option<String> {
    let cookies = parts.extract::<Cookies>().await.ok()?;
    cookies
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

/// AuthUser Extractor Implementation
///
/// Resolution order:
/// 1. An `AuthUser` already placed in the request extensions by the auth middleware.
/// 2. Local bypass: in `Env::Local` an `x-user-id` header naming an existing user.
/// 3. A `Bearer` token from the `Authorization` header.
/// 4. The `session-token` cookie.
///
/// Tokens are followed by a repository lookup, so deleted users lose access
/// and role changes apply immediately.
///
/// Rejection: `AppError::Unauthorized` (401) on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(*user);
        }

        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        if config.env == Env::Local {
            let bypass_id = parts
                .headers
                .get("x-user-id")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| Uuid::parse_str(value).ok());
            if let Some(user_id) = bypass_id {
                if let Some(user) = repo.get_user(user_id).await? {
                    return Ok(AuthUser::from(&user));
                }
            }
        }

        let bearer = bearer_token(&parts.headers).map(str::to_string);
        let token = match bearer {
            Some(token) => token,
            None => cookie_token(parts)
                .await
                .ok_or_else(AppError::unauthorized)?,
        };

        let claims = decode_token(&token, &config)?;

        let user = repo
            .get_user(claims.sub)
            .await?
            .ok_or_else(AppError::unauthorized)?;

        Ok(AuthUser::from(&user))
    }
}
