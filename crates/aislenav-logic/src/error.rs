//! Error types for the navigation core.

use thiserror::Error;

/// Why a navigation request was refused.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NavError {
    /// No section with this id or name exists in the catalog.
    #[error("unknown store section: {0}")]
    UnknownSection(String),

    #[error("invalid simulator config: {}", join_errors(.0))]
    InvalidConfig(Vec<ConfigError>),

    #[error("config parse error: {0}")]
    ConfigParse(String),
}

/// A single configuration problem.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("segment duration must be positive")]
    ZeroSegmentDuration,
    #[error("step period must be positive")]
    ZeroStepPeriod,
    #[error("frame interval must be positive")]
    ZeroFrameInterval,
    /// Default location outside the 0–100 plan.
    #[error("default location ({x}, {y}) is outside the floor plan")]
    LocationOutOfPlan { x: f32, y: f32 },
}

fn join_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, NavError>;
