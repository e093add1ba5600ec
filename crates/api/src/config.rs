use std::path::PathBuf;
use std::str::FromStr;

use axum::http::HeaderValue;

use crate::auth::jwt::JwtConfig;
use crate::auth::password::{hash_password, is_phc_hash};

/// Configuration could not be loaded from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has an invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Read `var` and parse it, falling back to `default` when unset.
pub fn env_or<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(var) {
        Ok(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

/// The built-in administrator account.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub username: String,
    /// Argon2 PHC hash, computed once at startup when only a plaintext
    /// password is configured.
    pub password_hash: String,
}

impl AdminCredentials {
    /// | Env Var               | Default                              |
    /// |-----------------------|--------------------------------------|
    /// | `ADMIN_USERNAME`      | `admin`                              |
    /// | `ADMIN_PASSWORD_HASH` | -- (PHC string, preferred)           |
    /// | `ADMIN_PASSWORD`      | -- (used only if no hash is set)     |
    pub fn from_env() -> Result<Self, ConfigError> {
        let username = std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".into());

        let password_hash = match std::env::var("ADMIN_PASSWORD_HASH") {
            Ok(hash) if is_phc_hash(&hash) => hash,
            Ok(hash) => {
                return Err(ConfigError::Invalid {
                    var: "ADMIN_PASSWORD_HASH",
                    value: hash,
                    reason: "not a PHC password hash".into(),
                })
            }
            Err(_) => {
                let password = std::env::var("ADMIN_PASSWORD")
                    .ok()
                    .filter(|p| !p.is_empty())
                    .ok_or(ConfigError::Missing("ADMIN_PASSWORD_HASH or ADMIN_PASSWORD"))?;
                hash_password(&password).map_err(|e| ConfigError::Invalid {
                    var: "ADMIN_PASSWORD",
                    value: "<redacted>".into(),
                    reason: e.to_string(),
                })?
            }
        };

        Ok(Self {
            username,
            password_hash,
        })
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields except the secrets have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<HeaderValue>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Directory holding the JSON documents (default: `data`).
    pub data_dir: PathBuf,
    /// Optional directory of `<collection>.json` seed overrides.
    pub seed_dir: Option<PathBuf>,
    /// Token signing configuration.
    pub jwt: JwtConfig,
    /// Built-in administrator account.
    pub admin: AdminCredentials,
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
    /// | `DATA_DIR`             | `data`                     |
    /// | `SEED_DIR`             | unset (built-in seeds)     |
    ///
    /// See [`JwtConfig::from_env`] and [`AdminCredentials::from_env`] for
    /// the auth variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env_or("PORT", 3000)?;

        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|origin| {
                origin.parse::<HeaderValue>().map_err(|e| ConfigError::Invalid {
                    var: "CORS_ORIGINS",
                    value: origin.to_string(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", 30)?;
        let data_dir: PathBuf = env_or("DATA_DIR", PathBuf::from("data"))?;
        let seed_dir = std::env::var("SEED_DIR")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            data_dir,
            seed_dir,
            jwt: JwtConfig::from_env()?,
            admin: AdminCredentials::from_env()?,
        })
    }
}
