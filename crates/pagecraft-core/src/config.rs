//! Editor configuration.

use crate::history::DEFAULT_HISTORY_DEPTH;
use crate::layout::{MATCH_TOLERANCE, MatchOptions, ResolveOptions};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunables of an editing session. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of undo steps.
    pub history_depth: usize,
    /// Positional element/cell matching tolerance, percentage points.
    pub match_tolerance: f64,
    /// Pair elements with cells by index when no position matches.
    pub index_fallback: bool,
    /// Pointer travel before a press becomes a drag, screen pixels.
    pub drag_threshold_px: f64,
    /// Handle hit radius, screen pixels.
    pub handle_hit_tolerance_px: f64,
    /// Arrow-key nudge, percentage points.
    pub nudge_step: f64,
    /// Shift+arrow nudge, percentage points.
    pub nudge_step_large: f64,
    /// Offset of duplicated elements, percentage points.
    pub duplicate_offset: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_depth: DEFAULT_HISTORY_DEPTH,
            match_tolerance: MATCH_TOLERANCE,
            index_fallback: true,
            drag_threshold_px: 3.0,
            handle_hit_tolerance_px: 12.0,
            nudge_step: 1.0,
            nudge_step_large: 10.0,
            duplicate_offset: 2.0,
        }
    }
}

impl EditorConfig {
    /// Parse from JSON, sanitizing out-of-range values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Load from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Clamp every value to a usable minimum.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let non_negative = |value: f64, fallback: f64| {
            if value.is_finite() && value >= 0.0 {
                value
            } else {
                fallback
            }
        };
        if self.history_depth == 0 {
            log::warn!("history_depth must be at least 1");
            self.history_depth = 1;
        }
        self.match_tolerance = non_negative(self.match_tolerance, defaults.match_tolerance);
        self.drag_threshold_px = non_negative(self.drag_threshold_px, defaults.drag_threshold_px);
        self.handle_hit_tolerance_px =
            non_negative(self.handle_hit_tolerance_px, defaults.handle_hit_tolerance_px);
        self.nudge_step = non_negative(self.nudge_step, defaults.nudge_step);
        self.nudge_step_large = non_negative(self.nudge_step_large, defaults.nudge_step_large);
        self.duplicate_offset = non_negative(self.duplicate_offset, defaults.duplicate_offset);
        self
    }

    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            matching: MatchOptions {
                tolerance: self.match_tolerance,
                index_fallback: self.index_fallback,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.history_depth, 30);
        assert_eq!(config.match_tolerance, 2.0);
        assert!(config.index_fallback);
        assert_eq!(config.drag_threshold_px, 3.0);
    }

    #[test]
    fn test_partial_json() {
        let config = EditorConfig::from_json(r#"{"index_fallback": false}"#).unwrap();
        assert!(!config.index_fallback);
        assert_eq!(config.history_depth, 30);
        assert!(!config.resolve_options().matching.index_fallback);
    }

    #[test]
    fn test_invalid_values_sanitized() {
        let config =
            EditorConfig::from_json(r#"{"history_depth": 0, "match_tolerance": -4}"#).unwrap();
        assert_eq!(config.history_depth, 1);
        assert_eq!(config.match_tolerance, MATCH_TOLERANCE);
    }

    #[test]
    fn test_load_errors() {
        assert!(matches!(
            EditorConfig::from_json("{"),
            Err(ConfigError::Parse(_))
        ));
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            EditorConfig::load(dir.path().join("missing.json")),
            Err(ConfigError::Io(_))
        ));

        let path = dir.path().join("editor.json");
        std::fs::write(&path, r#"{"nudge_step": 0.5}"#).unwrap();
        assert_eq!(EditorConfig::load(&path).unwrap().nudge_step, 0.5);
    }
}
