//! # configs
//!
//! Layered settings: built-in defaults, then `config/default.toml`, then
//! `config/{PROMO_ENV}.toml`, then `PROMO__SECTION__KEY` environment variables.
//! A `.env` file, if present, is loaded into the environment first.

use config::{Config, Environment, File};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

pub const ENV_PREFIX: &str = "PROMO";
pub const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid setting `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

fn invalid(key: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { key, reason: reason.into() }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Prefix for every API route, e.g. `/api`
    pub base_path: String,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub backend: DatabaseBackend,
    pub url: SecretString,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: SecretString,
    pub token_ttl_secs: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSettings {
    pub login_max_attempts: u32,
    pub login_window_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    pub filter: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub rate_limit: RateLimitSettings,
    pub log: LogSettings,
}

// Shapes as they come out of `config`; secrets are wrapped right after deserialization.
#[derive(Deserialize)]
struct RawServer {
    host: String,
    port: u16,
    base_path: String,
    cors_origins: Vec<String>,
}

#[derive(Deserialize)]
struct RawDatabase {
    backend: DatabaseBackend,
    url: String,
    max_connections: u32,
    acquire_timeout_secs: u64,
}

#[derive(Deserialize)]
struct RawAuth {
    jwt_secret: String,
    token_ttl_secs: i64,
}

#[derive(Deserialize)]
struct RawSettings {
    server: RawServer,
    database: RawDatabase,
    auth: RawAuth,
    rate_limit: RateLimitSettings,
    log: LogSettings,
}

impl Settings {
    /// Loads from `.env`, the config directory and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(invalid("dotenv", e.to_string())),
        }
        Self::load_with(&[])
    }

    /// Same layering as [`Settings::load`] without touching `.env`, with explicit
    /// overrides applied last.
    pub fn load_with(overrides: &[(&str, &str)]) -> Result<Self, ConfigError> {
        let profile = std::env::var(format!("{ENV_PREFIX}_ENV")).unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.base_path", "/api")?
            .set_default("server.cors_origins", Vec::<String>::new())?
            .set_default("database.backend", "postgres")?
            .set_default("database.url", "")?
            .set_default("database.max_connections", 10)?
            .set_default("database.acquire_timeout_secs", 5)?
            .set_default("auth.jwt_secret", "")?
            .set_default("auth.token_ttl_secs", 3600)?
            .set_default("rate_limit.login_max_attempts", 5)?
            .set_default("rate_limit.login_window_secs", 900)?
            .set_default("log.filter", "info")?
            .set_default("log.format", "json")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{profile}")).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins"),
            );

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        let raw: RawSettings = builder.build()?.try_deserialize()?;
        let settings = Settings::from(raw);
        settings.validate()?;
        debug!(profile, backend = ?settings.database.backend, "settings loaded");
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        // an empty base path mounts the API at the root
        if !self.server.base_path.is_empty() && !self.server.base_path.starts_with('/') {
            return Err(invalid("server.base_path", "must be empty or start with '/'"));
        }
        if self.auth.jwt_secret.expose_secret().len() < MIN_JWT_SECRET_LEN {
            return Err(invalid(
                "auth.jwt_secret",
                format!("must be at least {MIN_JWT_SECRET_LEN} characters"),
            ));
        }
        if self.auth.token_ttl_secs <= 0 {
            return Err(invalid("auth.token_ttl_secs", "must be positive"));
        }
        if self.database.backend == DatabaseBackend::Postgres && self.database.url.expose_secret().is_empty() {
            return Err(invalid("database.url", "required for the postgres backend"));
        }
        if self.database.max_connections == 0 {
            return Err(invalid("database.max_connections", "must be positive"));
        }
        if self.rate_limit.login_max_attempts == 0 || self.rate_limit.login_window_secs == 0 {
            return Err(invalid("rate_limit", "attempts and window must be positive"));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl From<RawSettings> for Settings {
    fn from(raw: RawSettings) -> Self {
        Settings {
            server: ServerSettings {
                host: raw.server.host,
                port: raw.server.port,
                base_path: raw.server.base_path.trim_end_matches('/').to_string(),
                cors_origins: raw.server.cors_origins,
            },
            database: DatabaseSettings {
                backend: raw.database.backend,
                url: SecretString::from(raw.database.url),
                max_connections: raw.database.max_connections,
                acquire_timeout_secs: raw.database.acquire_timeout_secs,
            },
            auth: AuthSettings {
                jwt_secret: SecretString::from(raw.auth.jwt_secret),
                token_ttl_secs: raw.auth.token_ttl_secs,
            },
            rate_limit: raw.rate_limit,
            log: raw.log,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: (&str, &str) = ("auth.jwt_secret", "0123456789abcdef0123456789abcdef");

    #[test]
    fn test_defaults_with_memory_backend() {
        let settings = Settings::load_with(&[SECRET, ("database.backend", "memory")]).unwrap();
        assert_eq!(settings.server.base_path, "/api");
        assert_eq!(settings.auth.token_ttl_secs, 3600);
        assert_eq!(settings.rate_limit.login_max_attempts, 5);
        assert_eq!(settings.rate_limit.login_window_secs, 900);
        assert_eq!(settings.database.backend, DatabaseBackend::Memory);
    }

    #[test]
    fn test_short_secret_rejected() {
        let err = Settings::load_with(&[("auth.jwt_secret", "short"), ("database.backend", "memory")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "auth.jwt_secret", .. }));
    }

    #[test]
    fn test_postgres_requires_url() {
        let err = Settings::load_with(&[SECRET, ("database.backend", "postgres"), ("database.url", "")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "database.url", .. }));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let settings =
            Settings::load_with(&[SECRET, ("database.backend", "memory"), ("server.base_path", "/promo/")]).unwrap();
        assert_eq!(settings.server.base_path, "/promo");
    }

    #[test]
    fn test_secrets_redacted_in_debug() {
        let settings = Settings::load_with(&[SECRET, ("database.backend", "memory")]).unwrap();
        assert!(!format!("{settings:?}").contains(SECRET.1));
    }
}
