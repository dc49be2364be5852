//! Error types for the engine boundary
//!
//! The combat loop itself is total; only fighter construction and
//! configuration loading can fail.

use thiserror::Error;

/// Errors raised while assembling a fighter from caller data
#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    #[error("fighter name is empty")]
    MissingName,

    #[error("{fighter}: hp must be positive (got {hp})")]
    NonPositiveHp { fighter: String, hp: i32 },

    #[error("{fighter}: {field} must not be negative (got {value})")]
    NegativeStat {
        fighter: String,
        field: &'static str,
        value: i32,
    },

    #[error("{fighter}: {field} multiplier must be positive (got {value})")]
    InvalidMultiplier {
        fighter: String,
        field: &'static str,
        value: f64,
    },

    #[error("scenario is missing {0}")]
    MissingParticipant(&'static str),
}

/// Errors raised while loading [`crate::config::CombatConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config extraction failed: {0}")]
    Extract(#[from] Box<figment::Error>),

    #[error("invalid config: {field} {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Errors raised while loading or running a scenario file
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Build(#[from] BuildError),
}
