//! Analyzer configuration
//!
//! Every field has a default, so an empty TOML or JSON document is a valid
//! configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ComputeError;
use crate::landmarks::DEFAULT_MIN_VISIBILITY;

/// Default number of frames in the rolling score window
pub const DEFAULT_SCORE_WINDOW: usize = 30;

/// Action classification mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Video or live input: motion candidates and label stabilization
    #[default]
    Temporal,
    /// Independent still images
    Static,
}

/// Tunables for an [`crate::ErgoProcessor`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Landmarks below this visibility are treated as missing
    pub min_visibility: f64,
    pub mode: AnalysisMode,
    pub classify_actions: bool,
    pub estimate_force: bool,
    /// Frames in the rolling mean score window
    pub score_window: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            min_visibility: DEFAULT_MIN_VISIBILITY,
            mode: AnalysisMode::Temporal,
            classify_actions: true,
            estimate_force: true,
            score_window: DEFAULT_SCORE_WINDOW,
        }
    }
}

impl AnalyzerConfig {
    /// Configuration for independent still images
    pub fn still() -> Self {
        Self {
            mode: AnalysisMode::Static,
            estimate_force: false,
            ..Self::default()
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ComputeError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ComputeError::ConfigError(e.to_string()))?;
        config.validated()
    }

    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ComputeError::ConfigError(e.to_string()))?;
        config.validated()
    }

    /// Load from a file; `.json` files are parsed as JSON, anything else as TOML
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ComputeError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ComputeError::ConfigError(format!("{}: {e}", path.display())))?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    pub fn to_toml_string(&self) -> Result<String, ComputeError> {
        toml::to_string_pretty(self).map_err(|e| ComputeError::ConfigError(e.to_string()))
    }

    fn validated(self) -> Result<Self, ComputeError> {
        if !(0.0..=1.0).contains(&self.min_visibility) {
            return Err(ComputeError::ConfigError(format!(
                "min_visibility must be within [0, 1], got {}",
                self.min_visibility
            )));
        }
        if self.score_window == 0 {
            return Err(ComputeError::ConfigError(
                "score_window must be at least 1".to_string(),
            ));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_documents_use_defaults() {
        assert_eq!(AnalyzerConfig::from_toml_str("").unwrap(), AnalyzerConfig::default());
        assert_eq!(AnalyzerConfig::from_json("{}").unwrap(), AnalyzerConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = AnalyzerConfig::from_toml_str(
            r#"
            mode = "static"
            score_window = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.mode, AnalysisMode::Static);
        assert_eq!(config.score_window, 10);
        assert_eq!(config.min_visibility, DEFAULT_MIN_VISIBILITY);
        assert!(config.classify_actions);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            AnalyzerConfig::from_toml_str("min_visibility = 1.5"),
            Err(ComputeError::ConfigError(_))
        ));
        assert!(matches!(
            AnalyzerConfig::from_json(r#"{"score_window": 0}"#),
            Err(ComputeError::ConfigError(_))
        ));
        assert!(matches!(
            AnalyzerConfig::from_json(r#"{"mode": "sideways"}"#),
            Err(ComputeError::ConfigError(_))
        ));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AnalyzerConfig::still();
        let text = config.to_toml_string().unwrap();
        assert_eq!(AnalyzerConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let err = AnalyzerConfig::load("/nonexistent/ergo.toml").unwrap_err();
        assert!(err.to_string().contains("ergo.toml"));
    }
}
