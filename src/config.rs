//! Configuration loading
//!
//! Enumeration limits and batch settings come from three layers: the
//! embedded `defaults/compoundtree.default.toml`, an optional user TOML file
//! and the command-line [`Overrides`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/compoundtree.default.toml");

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    pub limits: Limits,
    pub batch: BatchConfig,
}

/// Safety bounds for the bracketing enumeration
///
/// The number of trees grows with the Catalan numbers in the number of
/// subtrees, so both the input size and the output size are capped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    pub max_segments: usize,
    pub max_trees: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_segments: 10,
            max_trees: 10_000,
        }
    }
}

/// Batch execution settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Worker threads; 0 means one per core
    pub workers: usize,
    pub on_error: ErrorPolicy,
}

/// What to do with a word whose analysis failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    /// Write a single row with an `error` tree
    #[default]
    Record,
    /// Leave the word out of the output
    Skip,
}

/// Command-line settings; each one set here wins over every file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overrides {
    /// `--max-workers`
    pub workers: Option<usize>,
    /// `--max-segments`
    pub max_segments: Option<usize>,
    /// `--max-trees`
    pub max_trees: Option<usize>,
    /// `--skip-errors`
    pub skip_errors: bool,
}

/// Builds an [`AnalyzerConfig`] from the embedded defaults, an optional
/// user file and [`Overrides`], in that order of precedence
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a user TOML file (`--config`); it must exist
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).format(FileFormat::Toml));
        self
    }

    /// Layer the command-line settings that were given
    pub fn with_overrides(mut self, overrides: &Overrides) -> Result<Self, ConfigError> {
        let sizes = [
            ("batch.workers", overrides.workers),
            ("limits.max_segments", overrides.max_segments),
            ("limits.max_trees", overrides.max_trees),
        ];
        for (key, value) in sizes {
            if let Some(value) = value {
                self.builder = self.builder.set_override(key, value as u64)?;
            }
        }
        if overrides.skip_errors {
            self.builder = self.builder.set_override("batch.on_error", "skip")?;
        }
        Ok(self)
    }

    pub fn build(self) -> Result<AnalyzerConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyzerConfig {
    /// Defaults, then `path` if given, then `overrides`
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Self, ConfigError> {
        let mut loader = Loader::new();
        if let Some(path) = path {
            loader = loader.with_file(path);
        }
        loader.with_overrides(overrides)?.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_embedded_file() {
        let config = Loader::new().build().unwrap();
        assert_eq!(config, AnalyzerConfig::default());
        assert_eq!(config.batch.on_error, ErrorPolicy::Record);
    }

    #[test]
    fn test_override() {
        let overrides = Overrides {
            max_segments: Some(4),
            skip_errors: true,
            ..Overrides::default()
        };
        let config = AnalyzerConfig::load(None, &overrides).unwrap();

        assert_eq!(config.batch.on_error, ErrorPolicy::Skip);
        assert_eq!(config.limits.max_segments, 4);
        assert_eq!(config.limits.max_trees, Limits::default().max_trees);
    }

    #[test]
    fn test_user_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[batch]\nworkers = 3").unwrap();

        let config = Loader::new().with_file(file.path()).build().unwrap();
        assert_eq!(config.batch.workers, 3);
        assert_eq!(config.limits, Limits::default());

        // command-line settings win over the file
        let overrides = Overrides {
            workers: Some(1),
            ..Overrides::default()
        };
        let config = AnalyzerConfig::load(Some(file.path()), &overrides).unwrap();
        assert_eq!(config.batch.workers, 1);
    }

    #[test]
    fn test_missing_user_file() {
        let result = Loader::new()
            .with_file("/nonexistent/compoundtree.toml")
            .build();
        assert!(result.is_err());
    }
}
