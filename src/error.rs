//! Error types
//!
//! Configuration and placement failures surface from `Game::new`/`Game::reset`.
//! Per-tick logic never fails; malformed actions degrade to no-ops.

use std::fmt;

/// Invalid or unreadable game configuration.
#[derive(Debug)]
pub enum ConfigError {
    UnknownWeapon(String),
    UnknownMap(String),
    UnknownRules(String),
    UnknownPlayer(String),
    /// A `kind:weapon:count` player spec that could not be parsed
    MalformedPlayerSpec(String),
    /// Random map builder with no entries or a weight <= 0
    InvalidMapWeights(String),
    /// Structurally valid JSON with values that make no sense (zero fps etc.)
    Invalid(String),
    Json(serde_json::Error),
    Io(std::io::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownWeapon(name) => write!(f, "unknown weapon '{name}'"),
            ConfigError::UnknownMap(name) => write!(f, "unknown map '{name}'"),
            ConfigError::UnknownRules(name) => write!(f, "unknown rules '{name}'"),
            ConfigError::UnknownPlayer(name) => write!(f, "unknown player kind '{name}'"),
            ConfigError::MalformedPlayerSpec(spec) => {
                write!(f, "malformed player spec '{spec}' (expected kind[:weapon[:count]])")
            }
            ConfigError::InvalidMapWeights(reason) => {
                write!(f, "invalid random map weights: {reason}")
            }
            ConfigError::Invalid(reason) => write!(f, "invalid configuration: {reason}"),
            ConfigError::Json(e) => write!(f, "configuration JSON error: {e}"),
            ConfigError::Io(e) => write!(f, "configuration I/O error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Json(e) => Some(e),
            ConfigError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

/// Failure to place a fighter on the map.
#[derive(Debug, Clone, PartialEq)]
pub enum SpawnError {
    /// The map offers no spawn region for this kind of fighter
    NoSpawnRegions { what: &'static str },
    /// Every sampled point overlapped a wall or another fighter
    Exhausted { what: &'static str, attempts: u32 },
}

impl fmt::Display for SpawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpawnError::NoSpawnRegions { what } => write!(f, "no spawn regions for {what}"),
            SpawnError::Exhausted { what, attempts } => {
                write!(f, "could not place {what} after {attempts} attempts")
            }
        }
    }
}

impl std::error::Error for SpawnError {}

/// Umbrella error for building and resetting games.
#[derive(Debug)]
pub enum Error {
    Config(ConfigError),
    Spawn(SpawnError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => e.fmt(f),
            Error::Spawn(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(e) => Some(e),
            Error::Spawn(e) => Some(e),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<SpawnError> for Error {
    fn from(e: SpawnError) -> Self {
        Error::Spawn(e)
    }
}
