//! Configuration management for the ATS analyzer

use crate::error::{AnalyzerError, Result};
use crate::processing::document::SectionType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Documents above this size are rejected before parsing (10 MiB).
pub const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

/// Ceiling on the decompressed DOCX body part (50 MiB).
pub const MAX_INFLATED_BYTES: u64 = 50 * 1024 * 1024;

/// Job descriptions are truncated to this many characters.
pub const MAX_JOB_DESCRIPTION_CHARS: usize = 20_000;

/// Per-request budget for the whole pipeline.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub limits: LimitsConfig,
    pub scoring: ScoringConfig,
    pub formatting: FormattingConfig,
    pub suggestions: SuggestionConfig,
    pub taxonomy: TaxonomyConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_document_bytes: usize,
    pub max_inflated_bytes: u64,
    pub max_job_description_chars: usize,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub formatting_weight: f64,
    pub keyword_weight: f64,
    pub structure_weight: f64,
    /// Skill-token share of all content tokens that earns a full keyword
    /// score when no job description is supplied.
    pub density_target: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormattingConfig {
    pub min_words: usize,
    pub max_words: usize,
    pub required_sections: Vec<SectionType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionConfig {
    /// Impact strictly above this is high priority.
    pub high_impact_threshold: u32,
    /// Impact at or above this (and not high) is medium priority.
    pub medium_impact_threshold: u32,
    pub max_improvements: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxonomyConfig {
    /// Optional TOML taxonomy replacing the built-in one.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
    Html,
    Pdf,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_document_bytes: MAX_DOCUMENT_BYTES,
            max_inflated_bytes: MAX_INFLATED_BYTES,
            max_job_description_chars: MAX_JOB_DESCRIPTION_CHARS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            formatting_weight: crate::processing::scoring::FORMATTING_WEIGHT,
            keyword_weight: crate::processing::scoring::KEYWORD_WEIGHT,
            structure_weight: crate::processing::scoring::STRUCTURE_WEIGHT,
            density_target: crate::processing::keyword_matcher::DENSITY_TARGET,
        }
    }
}

impl Default for FormattingConfig {
    fn default() -> Self {
        Self {
            min_words: 200,
            max_words: 1000,
            required_sections: vec![
                SectionType::Experience,
                SectionType::Education,
                SectionType::Skills,
            ],
        }
    }
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            high_impact_threshold: crate::processing::suggestions::HIGH_IMPACT_THRESHOLD,
            medium_impact_threshold: crate::processing::suggestions::MEDIUM_IMPACT_THRESHOLD,
            max_improvements: crate::processing::suggestions::MAX_IMPROVEMENTS,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Console,
            detailed: false,
            color_output: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            limits: LimitsConfig::default(),
            scoring: ScoringConfig::default(),
            formatting: FormattingConfig::default(),
            suggestions: SuggestionConfig::default(),
            taxonomy: TaxonomyConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Load the user config, writing the defaults on first run
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            AnalyzerError::Configuration(format!("Failed to parse config '{}': {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("ats-analyzer")
            .join("config.toml")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.limits.timeout_secs)
    }

    /// Reject values that would break score or priority invariants
    pub fn validate(&self) -> Result<()> {
        let s = &self.scoring;
        let weights = [s.formatting_weight, s.keyword_weight, s.structure_weight];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(AnalyzerError::Configuration(
                "scoring weights must be non-negative numbers".to_string(),
            ));
        }
        let total: f64 = weights.iter().sum();
        if (total - 1.0).abs() > 0.001 {
            return Err(AnalyzerError::Configuration(format!(
                "scoring weights must sum to 1.0 (got {:.3})",
                total
            )));
        }
        if !(s.density_target > 0.0 && s.density_target <= 1.0) {
            return Err(AnalyzerError::Configuration(
                "scoring.density_target must be in (0, 1]".to_string(),
            ));
        }

        if self.formatting.min_words >= self.formatting.max_words {
            return Err(AnalyzerError::Configuration(
                "formatting.min_words must be below formatting.max_words".to_string(),
            ));
        }

        let sg = &self.suggestions;
        if sg.medium_impact_threshold > sg.high_impact_threshold {
            return Err(AnalyzerError::Configuration(
                "suggestions.medium_impact_threshold must not exceed high_impact_threshold".to_string(),
            ));
        }
        if sg.max_improvements == 0 {
            return Err(AnalyzerError::Configuration(
                "suggestions.max_improvements must be at least 1".to_string(),
            ));
        }

        let limits = &self.limits;
        if limits.max_document_bytes == 0 || limits.max_inflated_bytes == 0 || limits.timeout_secs == 0 {
            return Err(AnalyzerError::Configuration(
                "limits must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.limits.max_document_bytes, 10 * 1024 * 1024);
        assert_eq!(config.limits.max_inflated_bytes, 50 * 1024 * 1024);
        assert_eq!(config.limits.max_job_description_chars, 20_000);
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let mut config = Config::default();
        config.scoring.keyword_weight = 0.5;
        assert!(matches!(config.validate(), Err(AnalyzerError::Configuration(_))));
    }

    #[test]
    fn test_config_roundtrips_through_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.suggestions.max_improvements = 3;
        config.output.format = OutputFormat::Markdown;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[limits]\ntimeout_secs = 5\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.limits.timeout_secs, 5);
        assert_eq!(loaded.scoring, ScoringConfig::default());
    }
}
