use crate::auth::jwt::JwtConfig;

/// Default number of note views held by the in-process cache.
const DEFAULT_NOTE_CACHE_CAPACITY: usize = 1000;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Grace period for background tasks after the listener stops (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Whether auth cookies carry the `Secure` attribute (default: `true`).
    pub cookie_secure: bool,
    /// Maximum number of cached note views; `0` disables the cache.
    pub note_cache_capacity: usize,
    /// Lifetime of a share link when the request names no expiry (default: `24`).
    pub share_default_ttl_hours: i64,
    /// JWT token configuration (secret, issuer, expiry durations).
    pub jwt: JwtConfig,
    /// Credentials for an admin account created on startup, if set.
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// Admin account created at startup when it does not exist yet.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                    |
    /// |--------------------------|----------------------------|
    /// | `HOST`                   | `0.0.0.0`                  |
    /// | `PORT`                   | `3000`                     |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`  | `30`                       |
    /// | `COOKIE_SECURE`          | `true`                     |
    /// | `NOTE_CACHE_CAPACITY`    | `1000`                     |
    /// | `SHARE_DEFAULT_TTL_HOURS`| `24`                       |
    /// | `ADMIN_USERNAME`, `ADMIN_EMAIL`, `ADMIN_PASSWORD` | unset |
    ///
    /// # Panics
    ///
    /// Panics on unparsable values so misconfiguration fails at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let cookie_secure: bool = std::env::var("COOKIE_SECURE")
            .unwrap_or_else(|_| "true".into())
            .parse()
            .expect("COOKIE_SECURE must be true or false");

        let note_cache_capacity: usize = std::env::var("NOTE_CACHE_CAPACITY")
            .unwrap_or_else(|_| DEFAULT_NOTE_CACHE_CAPACITY.to_string())
            .parse()
            .expect("NOTE_CACHE_CAPACITY must be a valid usize");

        let share_default_ttl_hours: i64 = std::env::var("SHARE_DEFAULT_TTL_HOURS")
            .unwrap_or_else(|_| notekeep_core::share::DEFAULT_SHARE_TTL_HOURS.to_string())
            .parse()
            .expect("SHARE_DEFAULT_TTL_HOURS must be a valid i64");

        let jwt = JwtConfig::from_env();

        let bootstrap_admin = match (
            std::env::var("ADMIN_USERNAME"),
            std::env::var("ADMIN_EMAIL"),
            std::env::var("ADMIN_PASSWORD"),
        ) {
            (Ok(username), Ok(email), Ok(password)) if !username.trim().is_empty() => {
                Some(BootstrapAdmin {
                    username,
                    email,
                    password,
                })
            }
            _ => None,
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            cookie_secure,
            note_cache_capacity,
            share_default_ttl_hours,
            jwt,
            bootstrap_admin,
        }
    }

    /// Default share-link lifetime as a `chrono` duration.
    pub fn share_default_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.share_default_ttl_hours)
    }
}
