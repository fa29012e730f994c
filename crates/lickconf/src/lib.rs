//! Layered configuration loading for licklab.
//!
//! The analysis engine itself takes plain parameters; this crate only
//! decides where they come from.
//!
//! # Usage
//!
//! ```rust,no_run
//! use lickconf::LickConfig;
//!
//! let config = LickConfig::load().expect("Failed to load config");
//! println!("beats per bar: {}", config.analysis.beats_per_bar);
//! println!("packs go to: {}", config.practice.output_dir.display());
//! ```
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/licklab/config.toml` (system)
//! 2. `~/.config/licklab/config.toml` (user)
//! 3. `./licklab.toml` (local override), or the path given with `--config`
//! 4. Environment variables (`LICKLAB_*`, `RUST_LOG`)
//!
//! Files are merged key by key before being read, so a local file that only
//! sets `[analysis] beats_per_bar` keeps everything else from the files
//! before it.
//!
//! # Example Config
//!
//! ```toml
//! [analysis]
//! beats_per_bar = 4
//! strong_beat_tolerance = 0.05
//!
//! [practice]
//! output_dir = "~/licks/packs"
//! include_original = true
//!
//! [logging]
//! level = "info"
//! ```

pub mod loader;
pub mod sections;

pub use loader::{discover_config_files_with_override, ConfigSources};
pub use sections::{AnalysisConfig, LoggingConfig, PracticeConfig};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Environment variable {var} has unusable value {value:?}")]
    Env { var: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete licklab configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LickConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub practice: PracticeConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl LickConfig {
    /// Load configuration from all sources.
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Load configuration with an explicit file standing in for
    /// `./licklab.toml`. System and user configs still load first.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Load configuration and report which files and variables were used.
    pub fn load_with_sources_from(
        config_path: Option<&Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let files = loader::discover_config_files_with_override(config_path);
        let (mut config, mut sources) = Self::from_files(&files)?;

        loader::apply_env_overrides(&mut config, &mut sources)?;
        config.validate()?;

        Ok((config, sources))
    }

    /// Merge exactly `files`, in order, without looking at the environment.
    pub fn from_files(files: &[PathBuf]) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut merged = toml::Table::new();

        for path in files {
            let table = loader::load_table(path)?;
            loader::merge_tables(&mut merged, table);
            sources.files.push(path.clone());
        }

        let origin = files
            .last()
            .cloned()
            .unwrap_or_else(|| PathBuf::from("<defaults>"));
        let config = loader::from_table(merged, &origin)?;
        Ok((config, sources))
    }

    /// Reject values no analysis can use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.analysis.beats_per_bar == 0 {
            return Err(ConfigError::Invalid(
                "analysis.beats_per_bar must be at least 1".to_string(),
            ));
        }
        let tolerance = self.analysis.strong_beat_tolerance;
        if !(0.0..0.5).contains(&tolerance) {
            return Err(ConfigError::Invalid(format!(
                "analysis.strong_beat_tolerance must be in [0, 0.5), got {tolerance}"
            )));
        }
        Ok(())
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> String {
        let mut output = String::new();

        output.push_str("# licklab configuration\n\n");

        output.push_str("[analysis]\n");
        output.push_str(&format!("beats_per_bar = {}\n", self.analysis.beats_per_bar));
        output.push_str(&format!(
            "strong_beat_tolerance = {:?}\n",
            self.analysis.strong_beat_tolerance
        ));

        output.push_str("\n[practice]\n");
        output.push_str(&format!(
            "output_dir = {:?}\n",
            self.practice.output_dir.display().to_string()
        ));
        output.push_str(&format!(
            "include_original = {}\n",
            self.practice.include_original
        ));

        output.push_str("\n[logging]\n");
        output.push_str(&format!("level = {:?}\n", self.logging.level));

        output
    }
}
