use thiserror::Error;

/// Reference data that cannot back a playable game. Fatal at startup.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("country catalog is empty")]
    Empty,
    #[error("country catalog has no sovereign entries for the daily pool")]
    NoSovereign,
    #[error("country '{name}' has invalid code '{code}' (expected two ASCII letters)")]
    InvalidCode { name: String, code: String },
    #[error("duplicate country code '{code}'")]
    DuplicateCode { code: String },
    #[error("duplicate country name '{name}'")]
    DuplicateName { name: String },
    #[error("country with code '{code}' has an empty name")]
    EmptyName { code: String },
    #[error("country '{code}' has coordinates out of range (lat {lat}, lon {lon})")]
    CoordinatesOutOfRange { code: String, lat: f64, lon: f64 },
    #[error("country catalog JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Invalid `GameConfig` values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("rollover poll interval must be at least 1 second (got {0})")]
    PollInterval(u64),
    #[error("storage prefix must not be empty")]
    EmptyStoragePrefix,
    #[error("game config JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A persisted blob that no longer decodes. Recovered by starting fresh.
#[derive(Debug, Error)]
#[error("persisted {what} is corrupted: {source}")]
pub struct PersistenceCorruption {
    pub what: &'static str,
    #[source]
    pub source: serde_json::Error,
}

/// No catalog entries survive the requested filter. Recovered by widening to
/// the full catalog.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("no countries match the requested filter")]
pub struct EmptyFilterResult;

/// Errors surfaced while assembling a game session.
#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to load game data: {0}")]
    Load(#[source] Box<dyn std::error::Error + Send + Sync>),
}
