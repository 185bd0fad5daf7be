use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderValue;
use wanted_core::collection::CollectionPath;

/// Problems found while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is absent or blank.
    #[error("{0} must be set")]
    Missing(&'static str),

    /// A variable is present but cannot be parsed.
    #[error("{var} has an invalid value: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Listener settings. Every field has a default, so this always loads
/// unless a value is malformed.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// Load listener configuration from environment variables.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());
        if host.parse::<std::net::IpAddr>().is_err() {
            return Err(ConfigError::Invalid {
                var: "HOST",
                value: host,
            });
        }

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if let Some(bad) = cors_origins
            .iter()
            .find(|o| o.parse::<HeaderValue>().is_err())
        {
            return Err(ConfigError::Invalid {
                var: "CORS_ORIGINS",
                value: bad.clone(),
            });
        }

        Ok(Self {
            host,
            port: parse_or(&lookup, "PORT", 3000)?,
            cors_origins,
            request_timeout_secs: parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?,
        })
    }
}

/// Settings the board cannot run without. When any required value is
/// missing the server starts in setup mode instead.
#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// Leaderboard collection, derived from `APP_ID`.
    pub collection: CollectionPath,
    /// Shared admin password, compared in cleartext.
    pub admin_password: String,
    /// Quiet period before the displayed order re-sorts.
    pub sort_delay: Duration,
    /// Lifetime of an admin session token.
    pub session_hours: i64,
    /// Optional newline-separated list of names used to seed an empty board.
    pub seed_file: Option<PathBuf>,
}

impl BoardConfig {
    /// Load board configuration from environment variables.
    ///
    /// | Env Var               | Required | Default |
    /// |-----------------------|----------|---------|
    /// | `APP_ID`              | **yes**  | --      |
    /// | `ADMIN_PASSWORD`      | **yes**  | --      |
    /// | `SORT_DELAY_MS`       | no       | `750`   |
    /// | `ADMIN_SESSION_HOURS` | no       | `12`    |
    /// | `SEED_FILE`           | no       | unset   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let app_id = required(&lookup, "APP_ID")?;
        let collection = CollectionPath::leaderboard(&app_id).map_err(|_| ConfigError::Invalid {
            var: "APP_ID",
            value: app_id.clone(),
        })?;
        let admin_password = required(&lookup, "ADMIN_PASSWORD")?;
        let sort_delay_ms: u64 = parse_or(&lookup, "SORT_DELAY_MS", 750)?;
        let session_hours: i64 = parse_or(&lookup, "ADMIN_SESSION_HOURS", 12)?;
        if session_hours <= 0 {
            return Err(ConfigError::Invalid {
                var: "ADMIN_SESSION_HOURS",
                value: session_hours.to_string(),
            });
        }
        let seed_file = lookup("SEED_FILE")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            collection,
            admin_password,
            sort_delay: Duration::from_millis(sort_delay_ms),
            session_hours,
            seed_file,
        })
    }
}

fn required<F>(lookup: &F, var: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(var))
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value: raw }),
    }
}
