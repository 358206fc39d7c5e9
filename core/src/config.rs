//! Runtime configuration
//!
//! Resolved in three layers: built-in defaults, then an optional TOML file
//! (`RELIEF_CONFIG`, or `./relief.toml` when present), then `RELIEF_*`
//! environment variables. A broken file or a malformed variable is logged and
//! skipped rather than aborting start-up.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

use crate::weather::WeatherConfig;
use crate::{ReliefError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReliefConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub weather: WeatherConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Built front-end bundle to serve at `/`
    pub static_dir: Option<PathBuf>,
    /// Allowed CORS origins; empty means same-origin only, `*` allows any
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            static_dir: None,
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./var/relief.db"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub session_ttl_hours: i64,
    /// Accept identity headers on every request, not only at login.
    /// Only enable behind a proxy that strips client-supplied copies.
    pub trust_identity_headers: bool,
    pub user_header: String,
    pub email_header: String,
    pub name_header: String,
}

/// Longest accepted session lifetime (one year)
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

impl AuthConfig {
    /// Session lifetime, clamped to 1..=`MAX_SESSION_TTL_HOURS` hours.
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_ttl_hours.clamp(1, MAX_SESSION_TTL_HOURS))
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_hours: 24 * 7,
            trust_identity_headers: false,
            user_header: "x-auth-request-user".to_string(),
            email_header: "x-auth-request-email".to_string(),
            name_header: "x-auth-request-preferred-username".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = ReliefError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(ReliefError::ConfigError(format!("unknown log format '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Fallback filter when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: "info".to_string(),
        }
    }
}

impl ReliefConfig {
    /// Defaults, overlaid by the TOML file, overlaid by the environment.
    pub fn load() -> Self {
        let path = std::env::var("RELIEF_CONFIG").unwrap_or_else(|_| "relief.toml".into());
        let mut config = Self::from_file_or_default(Path::new(&path));
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut config: Self =
            toml::from_str(raw).map_err(|e| ReliefError::ConfigError(e.to_string()))?;
        config.enforce_bounds();
        Ok(config)
    }

    /// Out-of-range values are logged and replaced by their defaults.
    fn enforce_bounds(&mut self) {
        let ttl = self.auth.session_ttl_hours;
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&ttl) {
            let fallback = AuthConfig::default().session_ttl_hours;
            warn!(
                target: "config",
                session_ttl_hours = ttl,
                fallback,
                "Session lifetime out of range; using default"
            );
            self.auth.session_ttl_hours = fallback;
        }
    }

    fn from_file_or_default(path: &Path) -> Self {
        if !path.exists() {
            info!(target: "config", path = %path.display(), "No TOML config found; using defaults/env");
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(raw) => match Self::from_toml_str(&raw) {
                Ok(config) => {
                    info!(target: "config", path = %path.display(), "Loaded TOML config");
                    config
                }
                Err(e) => {
                    warn!(target: "config", error = %e, "Failed to parse TOML; using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(target: "config", error = %e, "Failed to read TOML; using defaults");
                Self::default()
            }
        }
    }

    /// Overlay `RELIEF_*` variables using the given lookup.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = get("RELIEF_HOST") {
            self.server.host = host;
        }
        overlay_parsed(&get, "RELIEF_PORT", &mut self.server.port);
        if let Some(dir) = get("RELIEF_STATIC_DIR") {
            self.server.static_dir = Some(PathBuf::from(dir));
        }
        if let Some(origins) = get("RELIEF_CORS_ORIGINS") {
            self.server.cors_origins = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }
        if let Some(path) = get("RELIEF_DATABASE") {
            self.database.path = PathBuf::from(path);
        }

        overlay_parsed(&get, "RELIEF_SESSION_TTL_HOURS", &mut self.auth.session_ttl_hours);
        overlay_parsed(
            &get,
            "RELIEF_TRUST_IDENTITY_HEADERS",
            &mut self.auth.trust_identity_headers,
        );
        if let Some(header) = get("RELIEF_USER_HEADER") {
            self.auth.user_header = header.to_ascii_lowercase();
        }
        if let Some(header) = get("RELIEF_EMAIL_HEADER") {
            self.auth.email_header = header.to_ascii_lowercase();
        }
        if let Some(header) = get("RELIEF_NAME_HEADER") {
            self.auth.name_header = header.to_ascii_lowercase();
        }

        if let Some(endpoint) = get("RELIEF_WEATHER_ENDPOINT") {
            self.weather.api_endpoint = endpoint;
        }
        if let Some(endpoint) = get("RELIEF_GEOCODING_ENDPOINT") {
            self.weather.geocoding_endpoint = endpoint;
        }
        overlay_parsed(&get, "RELIEF_WEATHER_TIMEOUT_MS", &mut self.weather.timeout_ms);
        overlay_parsed(&get, "RELIEF_WEATHER_CACHE_SECS", &mut self.weather.cache_ttl_secs);

        overlay_parsed(&get, "RELIEF_LOG_FORMAT", &mut self.logging.format);

        self.enforce_bounds();
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn overlay_parsed<T, G>(get: &G, key: &str, target: &mut T)
where
    T: FromStr,
    T::Err: Display,
    G: Fn(&str) -> Option<String>,
{
    if let Some(raw) = get(key) {
        match raw.trim().parse() {
            Ok(value) => *target = value,
            Err(e) => warn!(target: "config", key, error = %e, "Ignoring invalid value"),
        }
    }
}
