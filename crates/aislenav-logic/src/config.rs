//! Simulator configuration: timing constants, entry point and user toggles.
//!
//! The configuration is a plain value handed to
//! [`NavigationSimulator::new`](crate::simulator::NavigationSimulator::new).
//! Nothing reads settings from ambient state.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, NavError, Result};
use crate::geometry::Point;

/// Interface language. Cycling only; no translations live in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    English,
    Spanish,
    French,
    German,
    Chinese,
    Japanese,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::English,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Chinese,
        Language::Japanese,
    ];

    /// The next language in the cycle, wrapping around.
    pub fn next(self) -> Language {
        let i = Self::ALL.iter().position(|l| *l == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Spanish => "Spanish",
            Language::French => "French",
            Language::German => "German",
            Language::Chinese => "Chinese",
            Language::Japanese => "Japanese",
        }
    }

    /// Two-letter badge shown on the language button.
    pub fn code(&self) -> &'static str {
        &self.name()[..2]
    }
}

/// Navigation simulator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Time to walk one path segment.
    pub segment_duration_ms: u64,
    /// Interval between instruction steps.
    pub step_period_ms: u64,
    /// Display refresh interval used by the virtual scheduler.
    pub frame_interval_ms: u64,
    /// Where the shopper is placed after navigation stops or a floor change.
    pub default_location: Point,
    pub default_floor: i32,
    pub accessibility_mode: bool,
    pub language: Language,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            segment_duration_ms: 2000,
            step_period_ms: 3000,
            frame_interval_ms: 16,
            default_location: Point::new(50.0, 85.0),
            default_floor: 1,
            accessibility_mode: false,
            language: Language::English,
        }
    }
}

impl SimulatorConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SimulatorConfig =
            serde_json::from_str(json).map_err(|e| NavError::ConfigParse(e.to_string()))?;
        config.validated()
    }

    /// Every problem with this config, empty when valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.segment_duration_ms == 0 {
            errors.push(ConfigError::ZeroSegmentDuration);
        }
        if self.step_period_ms == 0 {
            errors.push(ConfigError::ZeroStepPeriod);
        }
        if self.frame_interval_ms == 0 {
            errors.push(ConfigError::ZeroFrameInterval);
        }
        if !self.default_location.in_plan() {
            errors.push(ConfigError::LocationOutOfPlan {
                x: self.default_location.x,
                y: self.default_location.y,
            });
        }
        errors
    }

    pub fn validated(self) -> Result<Self> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(NavError::InvalidConfig(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SimulatorConfig::default().validate().is_empty());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config =
            SimulatorConfig::from_json(r#"{ "step_period_ms": 1500, "accessibility_mode": true }"#)
                .unwrap();
        assert_eq!(config.step_period_ms, 1500);
        assert!(config.accessibility_mode);
        assert_eq!(config.segment_duration_ms, 2000);
        assert_eq!(config.default_location, Point::new(50.0, 85.0));
    }

    #[test]
    fn test_from_json_reports_all_errors() {
        let err = SimulatorConfig::from_json(
            r#"{ "segment_duration_ms": 0, "step_period_ms": 0, "default_location": { "x": 120.0, "y": 5.0 } }"#,
        )
        .unwrap_err();
        match err {
            NavError::InvalidConfig(errors) => {
                assert_eq!(errors.len(), 3);
                assert_eq!(errors[0], ConfigError::ZeroSegmentDuration);
                assert_eq!(errors[1], ConfigError::ZeroStepPeriod);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            SimulatorConfig::from_json("not json"),
            Err(NavError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_language_cycle_wraps() {
        let mut lang = Language::English;
        for _ in 0..Language::ALL.len() {
            lang = lang.next();
        }
        assert_eq!(lang, Language::English);
        assert_eq!(Language::English.next(), Language::Spanish);
        assert_eq!(Language::Japanese.next(), Language::English);
        assert_eq!(Language::German.code(), "Ge");
    }
}
