use warden_core::cookie::CookieOptions;

/// Default session lifetime: 30 days.
const DEFAULT_SESSION_LIFETIME_SECS: i64 = 30 * 24 * 60 * 60;

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
    /// Graceful shutdown timeout in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Public origin used when building links in outbound emails
    /// (default: `http://localhost:3000`).
    pub public_origin: String,
    /// Session cookie and lifetime configuration.
    pub session: SessionConfig,
    /// Bootstrap super admin account configuration.
    pub admin: AdminConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    /// | `PUBLIC_ORIGIN`        | `http://localhost:3000`    |
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

        let public_origin = std::env::var("PUBLIC_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".into());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            public_origin,
            session: SessionConfig::from_env(),
            admin: AdminConfig::from_env(),
        }
    }
}

/// Session lifetime and SID cookie attributes.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Sliding session lifetime in seconds (default: 30 days).
    pub lifetime_secs: i64,
    /// `path` attribute placed on session cookies.
    pub cookie_path: Option<String>,
    /// `domain` attribute placed on session cookies.
    pub cookie_domain: Option<String>,
    /// Mark session cookies `secure` (HTTPS only).
    pub cookie_secure: bool,
    /// Persistent cookies carry an `expires` attribute so the browser keeps
    /// them across restarts. When `false`, cookies last for the browser
    /// session only.
    pub persistent: bool,
}

impl SessionConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default   |
    /// |-------------------------|-----------|
    /// | `SESSION_LIFETIME_SECS` | `2592000` |
    /// | `SESSION_COOKIE_PATH`   | `/`       |
    /// | `SESSION_COOKIE_DOMAIN` | unset     |
    /// | `SESSION_COOKIE_SECURE` | `false`   |
    /// | `SESSION_PERSISTENT`    | `true`    |
    pub fn from_env() -> Self {
        let lifetime_secs: i64 = std::env::var("SESSION_LIFETIME_SECS")
            .unwrap_or_else(|_| DEFAULT_SESSION_LIFETIME_SECS.to_string())
            .parse()
            .expect("SESSION_LIFETIME_SECS must be a valid i64");

        let cookie_path = match std::env::var("SESSION_COOKIE_PATH") {
            Ok(path) if path.is_empty() => None,
            Ok(path) => Some(path),
            Err(_) => Some("/".to_string()),
        };

        let cookie_domain = std::env::var("SESSION_COOKIE_DOMAIN")
            .ok()
            .filter(|d| !d.is_empty());

        let cookie_secure = std::env::var("SESSION_COOKIE_SECURE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let persistent = std::env::var("SESSION_PERSISTENT")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        Self {
            lifetime_secs,
            cookie_path,
            cookie_domain,
            cookie_secure,
            persistent,
        }
    }

    /// Sliding window applied on session creation and on every refresh.
    pub fn lifetime(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.lifetime_secs)
    }

    /// Cookie attributes derived from this configuration.
    pub fn cookie_options(&self) -> CookieOptions {
        CookieOptions {
            path: self.cookie_path.clone(),
            domain: self.cookie_domain.clone(),
            persistent: self.persistent,
            secure: self.cookie_secure,
        }
    }
}

/// Bootstrap super admin account, created on startup when absent.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Username of the bootstrap account (default: `admin`).
    pub username: String,
    /// Email of the bootstrap account (default: `admin@example.com`).
    pub email: String,
    /// Plaintext password for the bootstrap account. When unset, a random
    /// password is generated and logged once at startup.
    pub password: Option<String>,
}

impl AdminConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var          | Default             |
    /// |------------------|---------------------|
    /// | `ADMIN_USERNAME` | `admin`             |
    /// | `ADMIN_EMAIL`    | `admin@example.com` |
    /// | `ADMIN_PASSWORD` | unset (randomized)  |
    pub fn from_env() -> Self {
        Self {
            username: std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".into()),
            email: std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".into()),
            password: std::env::var("ADMIN_PASSWORD").ok().filter(|p| !p.is_empty()),
        }
    }
}
