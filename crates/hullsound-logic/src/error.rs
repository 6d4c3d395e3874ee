//! Error types for configuration handling.
//!
//! The propagation search itself never fails: an unreachable listener is an
//! empty result list, not an error.

use thiserror::Error;

/// Configuration validation error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("closed door penalty must be finite and non-negative, got {0}")]
    InvalidDoorPenalty(f32),

    #[error("water surface penalty must be finite and non-negative, got {0}")]
    InvalidWaterPenalty(f32),

    #[error("open door threshold must be within [0, 1], got {0}")]
    InvalidOpenDoorThreshold(f32),

    #[error("open wall threshold must be within [0, 1], got {0}")]
    InvalidOpenWallThreshold(f32),

    #[error("max raw distance must be positive, got {0}")]
    InvalidMaxRawDistance(f32),

    #[error("max paths must be at least 1")]
    ZeroMaxPaths,
}

/// Failure loading a configuration file.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {}", describe(.0))]
    Invalid(Vec<ConfigError>),
}

fn describe(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
