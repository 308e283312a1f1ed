use std::{env, path::PathBuf};

const LOCAL_JWT_SECRET: &str = "ml-roadmap-local-development-secret";

/// AppConfig
///
/// Holds the application's entire configuration state. Loaded once at start-up
/// and cloned into handlers through `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Runtime environment marker. Controls the local auth bypass and log format.
    pub env: Env,
    /// Postgres connection string. Only optional in `Env::Local`, where the
    /// in-memory repository is used when it is absent.
    pub db_url: Option<String>,
    /// HS256 secret used to sign and verify session tokens.
    pub jwt_secret: String,
    /// Lifetime of an issued session token.
    pub session_ttl_hours: i64,
    /// Directory PDF uploads are written to and `/uploads` is served from.
    pub uploads_dir: PathBuf,
    pub bind_addr: String,
}

/// Env
///
/// Runtime context: development conveniences in `Local`, hardened settings in `Production`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Safe, non-panicking configuration for test setup.
    fn default() -> Self {
        Self {
            env: Env::Local,
            db_url: None,
            jwt_secret: "super-secure-test-secret-value-local".to_string(),
            session_ttl_hours: 720,
            uploads_dir: PathBuf::from("public/uploads"),
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

/// One year.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// # Panics
    /// Panics in production when `DATABASE_URL` or `JWT_SECRET` is missing, and
    /// in any environment when `SESSION_TTL_HOURS` is not an integer between 1
    /// and `MAX_SESSION_TTL_HOURS`.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let (db_url, jwt_secret) = match env {
            Env::Production => (
                Some(env::var("DATABASE_URL").expect("FATAL: DATABASE_URL required in production")),
                env::var("JWT_SECRET").expect("FATAL: JWT_SECRET must be set in production."),
            ),
            Env::Local => (
                env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()),
                env::var("JWT_SECRET").unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string()),
            ),
        };

        let session_ttl_hours = match env::var("SESSION_TTL_HOURS") {
            Ok(raw) => match raw.parse::<i64>() {
                Ok(hours) if (1..=MAX_SESSION_TTL_HOURS).contains(&hours) => hours,
                _ => panic!(
                    "FATAL: SESSION_TTL_HOURS must be an integer between 1 and {MAX_SESSION_TTL_HOURS}, got '{raw}'"
                ),
            },
            Err(_) => 720,
        };

        Self {
            env,
            db_url,
            jwt_secret,
            session_ttl_hours,
            uploads_dir: env::var("UPLOADS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("public/uploads")),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
        }
    }

    /// Session cookies are only marked `Secure` in production.
    pub fn secure_cookies(&self) -> bool {
        self.env == Env::Production
    }
}
