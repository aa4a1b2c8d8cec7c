//! Run configuration — input/output paths and tunable thresholds.
//!
//! Loaded from a TOML file or assembled from CLI flags. Everything except
//! the input path has a default matching the original analysis:
//!
//! ```toml
//! [io]
//! input = "data/King_County_House_prices_dataset.csv"
//! output_dir = "out"
//!
//! [filter]
//! share_threshold = 80.0
//! min_zip_support = 2
//!
//! [derive]
//! reference_lat = 47.60621
//! reference_long = -122.33207
//! renovation_reference_year = 2023
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Seattle center, the default distance reference point.
pub const SEATTLE_CENTER: (f64, f64) = (47.60621, -122.33207);

/// Errors from loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Complete configuration for one cleaning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanConfig {
    pub io: IoConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub derive: DeriveConfig,
}

/// File locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IoConfig {
    /// Raw sales CSV.
    pub input: PathBuf,
    /// Directory the two cleaned CSVs and the manifest are written into.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

/// Target-population selection thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Minimum share (percent) of at-or-below-median properties for a zip
    /// code to enter the target population.
    #[serde(default = "default_share_threshold")]
    pub share_threshold: f64,
    /// Minimum property count for a zip code to take part in the share
    /// computation at all.
    #[serde(default = "default_min_zip_support")]
    pub min_zip_support: usize,
}

/// Parameters of the derived columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeriveConfig {
    #[serde(default = "default_reference_lat")]
    pub reference_lat: f64,
    #[serde(default = "default_reference_long")]
    pub reference_long: f64,
    /// Year renovation ages are measured against.
    #[serde(default = "default_renovation_reference_year")]
    pub renovation_reference_year: i32,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("out")
}

fn default_share_threshold() -> f64 {
    80.0
}

fn default_min_zip_support() -> usize {
    2
}

fn default_reference_lat() -> f64 {
    SEATTLE_CENTER.0
}

fn default_reference_long() -> f64 {
    SEATTLE_CENTER.1
}

fn default_renovation_reference_year() -> i32 {
    2023
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            share_threshold: default_share_threshold(),
            min_zip_support: default_min_zip_support(),
        }
    }
}

impl Default for DeriveConfig {
    fn default() -> Self {
        Self {
            reference_lat: default_reference_lat(),
            reference_long: default_reference_long(),
            renovation_reference_year: default_renovation_reference_year(),
        }
    }
}

impl CleanConfig {
    /// Build a config for the given paths with all thresholds at their
    /// defaults.
    pub fn new(input: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            io: IoConfig { input, output_dir },
            filter: FilterConfig::default(),
            derive: DeriveConfig::default(),
        }
    }

    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges. Called by the loaders and again by the pipeline,
    /// since a config can also be assembled programmatically.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let f = &self.filter;
        if !(f.share_threshold > 0.0 && f.share_threshold <= 100.0) {
            return Err(ConfigError::Invalid(format!(
                "share_threshold must be in (0, 100], got {}",
                f.share_threshold
            )));
        }
        if f.min_zip_support < 1 {
            return Err(ConfigError::Invalid(
                "min_zip_support must be at least 1".into(),
            ));
        }
        let d = &self.derive;
        if !(-90.0..=90.0).contains(&d.reference_lat) {
            return Err(ConfigError::Invalid(format!(
                "reference_lat must be in [-90, 90], got {}",
                d.reference_lat
            )));
        }
        if !(-180.0..=180.0).contains(&d.reference_long) {
            return Err(ConfigError::Invalid(format!(
                "reference_long must be in [-180, 180], got {}",
                d.reference_long
            )));
        }
        Ok(())
    }

    /// The (lat, long) distance reference point.
    pub fn reference_point(&self) -> (f64, f64) {
        (self.derive.reference_lat, self.derive.reference_long)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_toml_fills_defaults() {
        let config = CleanConfig::from_toml(
            r#"
            [io]
            input = "data/sales.csv"
            "#,
        )
        .unwrap();
        assert_eq!(config.io.input, PathBuf::from("data/sales.csv"));
        assert_eq!(config.io.output_dir, PathBuf::from("out"));
        assert_eq!(config.filter.share_threshold, 80.0);
        assert_eq!(config.filter.min_zip_support, 2);
        assert_eq!(config.derive.renovation_reference_year, 2023);
        assert_eq!(config.reference_point(), SEATTLE_CENTER);
    }

    #[test]
    fn full_toml_overrides_defaults() {
        let config = CleanConfig::from_toml(
            r#"
            [io]
            input = "sales.csv"
            output_dir = "cleaned"

            [filter]
            share_threshold = 75.0
            min_zip_support = 3

            [derive]
            reference_lat = 47.0
            reference_long = -122.0
            renovation_reference_year = 2024
            "#,
        )
        .unwrap();
        assert_eq!(config.filter.share_threshold, 75.0);
        assert_eq!(config.filter.min_zip_support, 3);
        assert_eq!(config.derive.renovation_reference_year, 2024);
        assert_eq!(config.io.output_dir, PathBuf::from("cleaned"));
    }

    #[test]
    fn missing_input_fails_parse() {
        let err = CleanConfig::from_toml("[io]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn out_of_range_threshold_is_invalid() {
        let err = CleanConfig::from_toml(
            r#"
            [io]
            input = "sales.csv"

            [filter]
            share_threshold = 0.0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = CleanConfig::from_toml(
            r#"
            [io]
            input = "sales.csv"

            [filter]
            share_threshold = 101.0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn zero_support_is_invalid() {
        let err = CleanConfig::from_toml(
            r#"
            [io]
            input = "sales.csv"

            [filter]
            min_zip_support = 0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = CleanConfig::new(PathBuf::from("a.csv"), PathBuf::from("out"));
        let toml_str = toml::to_string(&config).unwrap();
        let parsed = CleanConfig::from_toml(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }
}
