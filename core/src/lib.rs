// Relief Core Library
// Flood relief coordination: zones, affected people, stock, teams and alerts

pub mod config;
pub mod events;
pub mod model;
pub mod stats;
pub mod store;
pub mod telemetry;
pub mod validation;
pub mod weather;

// Export core types
pub use config::{AuthConfig, LogFormat, ReliefConfig};
pub use events::{ChangeAction, ChangeEvent, EntityKind, EventBroadcaster};
pub use stats::DashboardStats;
pub use store::Store;
pub use validation::{FieldError, Validate};
pub use weather::{
    Units, WeatherConfig, WeatherProvider, WeatherQuery, WeatherReport, WeatherSource,
};

// Error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReliefError {
    #[error("Validation failed: {}", validation::summarize(.0))]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] rusqlite::Error),

    #[error("Upstream error: {0}")]
    UpstreamError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReliefError>;

impl ReliefError {
    pub fn not_found(what: &str, id: impl std::fmt::Display) -> Self {
        ReliefError::NotFound(format!("{what} {id} not found"))
    }
}
