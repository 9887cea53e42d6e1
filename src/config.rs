//! Application configuration.
//!
//! Plain structs with documented defaults; the binary fills them from
//! environment variables.

use std::env;
use std::time::Duration as StdDuration;

use chrono::Duration;

use crate::session::{SameSite, SessionConfig};
use crate::SecretString;

/// Which password hashing scheme the verifier uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PasswordScheme {
    /// Unsalted single-pass SHA-256, bit-compatible with stored hashes from
    /// earlier deployments.
    #[default]
    Sha256,
    /// Salted Argon2id; preferred for fresh installations.
    Argon2,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// TCP port to listen on. Default: 5000.
    pub port: u16,

    /// SQLite connection string. Default: `sqlite:bookshelf.db?mode=rwc`.
    pub database_url: String,

    /// Allowed CORS origin(s) for a browser front end, comma-separated.
    /// `None` disables CORS headers entirely.
    pub cors_origin: Option<String>,

    pub password_scheme: PasswordScheme,

    /// Deadline for a whole request, bounding every store call within it.
    pub request_timeout: StdDuration,

    pub session: SessionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            database_url: "sqlite:bookshelf.db?mode=rwc".to_owned(),
            cors_origin: None,
            password_scheme: PasswordScheme::default(),
            request_timeout: StdDuration::from_secs(30),
            session: SessionConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment variables, falling back to the
    /// defaults above.
    ///
    /// Recognized variables: `PORT`, `DATABASE_URL`, `CORS_ORIGIN`,
    /// `PASSWORD_SCHEME` (`sha256` | `argon2`), `REQUEST_TIMEOUT_SECS`,
    /// `SESSION_SECRET`, `SESSION_LIFETIME_HOURS`, `COOKIE_NAME`,
    /// `COOKIE_SECURE`.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let mut session = defaults.session;
        session.cookie_same_site = SameSite::Lax;
        if let Ok(name) = env::var("COOKIE_NAME") {
            session.cookie_name = name;
        }
        if let Ok(value) = env::var("COOKIE_SECURE") {
            session.cookie_secure = value != "false" && value != "0";
        }
        if let Some(hours) = env::var("SESSION_LIFETIME_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            session.session_lifetime = Duration::hours(hours);
        }
        if let Ok(secret) = env::var("SESSION_SECRET") {
            session.secret_key = SecretString::new(secret);
        }

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            cors_origin: env::var("CORS_ORIGIN").ok(),
            password_scheme: match env::var("PASSWORD_SCHEME").as_deref() {
                Ok("argon2") => PasswordScheme::Argon2,
                _ => PasswordScheme::Sha256,
            },
            request_timeout: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(StdDuration::from_secs)
                .unwrap_or(defaults.request_timeout),
            session,
        }
    }
}
