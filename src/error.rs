//! Error types
//!
//! Boundary violations and degenerate smell distances are not errors; they are
//! handled inline by the simulation.

use std::path::PathBuf;

use thiserror::Error;

/// Rejection sampling ran out of attempts
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlacementError {
    #[error("{label} couldn't be placed randomly after {attempts} attempts")]
    Exhausted { label: &'static str, attempts: u32 },
}

/// Invalid reset parameters or settings. Raised before any arena is reset.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing reset parameter `{0}`")]
    MissingParameter(&'static str),

    #[error("reset parameter `{key}` must be a finite number, got {value}")]
    NonFinite { key: &'static str, value: f64 },

    #[error("reset parameter `{key}` must not be negative, got {value}")]
    NegativeCount { key: &'static str, value: f64 },

    #[error("spawn range must be positive, got {0}")]
    InvalidSpawnRange(f64),

    #[error("invalid setting `{key}`: {reason}")]
    InvalidSetting { key: &'static str, reason: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// An action channel held a value outside {0, 1, 2}
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionError {
    #[error("movement channel must be 0, 1 or 2, got {0}")]
    Movement(u32),

    #[error("rotation channel must be 0, 1 or 2, got {0}")]
    Rotation(u32),
}
