use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// SQLite file path. `":memory:"` opens a throwaway in-memory database.
    #[serde(default = "default_db_path")]
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    #[serde(default = "default_token_expiry")]
    pub token_expiry_minutes: u64,
    /// HMAC key used to sign and verify tokens.
    ///
    /// Prefer loading this via the `JWT_SECRET` environment variable.  This
    /// config field is the fallback for deployments that cannot inject env
    /// vars at runtime.
    ///
    /// **Minimum length:** 32 characters.  Read once at startup; rotating it
    /// invalidates every token in circulation.
    pub jwt_secret: Option<String>,
}

/// Bootstrap administrator, created at startup when the email is not yet
/// registered.  Without one nobody can create tasks.
#[derive(Debug, Deserialize, Clone)]
pub struct AdminSeedConfig {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub admin: Option<AdminSeedConfig>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_expiry_minutes: default_token_expiry(),
            jwt_secret: None,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            admin: None,
        }
    }
}

impl ServerConfig {
    /// Full bind address, e.g. `"127.0.0.1:8080"`
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

impl AuthConfig {
    pub fn token_expiry_secs(&self) -> u64 {
        self.token_expiry_minutes.saturating_mul(60)
    }

    /// Resolve the JWT secret with `JWT_SECRET` env-var taking priority over
    /// the config file field.
    ///
    /// Returns `None` when neither source is set (the server startup code
    /// treats this as a hard error).
    pub fn resolved_jwt_secret(&self) -> Option<String> {
        std::env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(|| self.jwt_secret.clone())
            .filter(|s| !s.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Serde defaults
// ---------------------------------------------------------------------------

pub fn default_bind() -> String {
    "127.0.0.1".to_string()
}

pub fn default_port() -> u16 {
    8080
}

pub fn default_db_path() -> String {
    "tasks.db".to_string()
}

/// One day.
pub fn default_token_expiry() -> u64 {
    24 * 60
}

/// One year. Longer lifetimes are refused at load time.
pub const MAX_TOKEN_EXPIRY_MINUTES: u64 = 365 * 24 * 60;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addr_joins_bind_and_port() {
        let cfg = ServerConfig {
            bind: "0.0.0.0".to_string(),
            port: 9000,
        };
        assert_eq!(cfg.addr(), "0.0.0.0:9000");
    }

    #[test]
    fn expiry_minutes_convert_to_seconds() {
        let auth = AuthConfig {
            token_expiry_minutes: 2,
            jwt_secret: None,
        };
        assert_eq!(auth.token_expiry_secs(), 120);
    }

    #[test]
    fn huge_expiry_saturates_instead_of_overflowing() {
        let auth = AuthConfig {
            token_expiry_minutes: u64::MAX,
            jwt_secret: None,
        };
        assert_eq!(auth.token_expiry_secs(), u64::MAX);
    }

    #[test]
    fn minimal_toml_fills_defaults() {
        let cfg: AppConfig = toml::from_str("[auth]\njwt_secret = \"x\"\n").unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.database.path, "tasks.db");
        assert_eq!(cfg.auth.token_expiry_minutes, 1440);
        assert!(cfg.admin.is_none());
    }
}
