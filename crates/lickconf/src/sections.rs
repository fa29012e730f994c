//! Typed config sections.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Metric assumptions used when scoring resolution targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Default: 4
    #[serde(default = "AnalysisConfig::default_beats_per_bar")]
    pub beats_per_bar: u32,

    /// How far (in beats) an onset may sit from a strong beat and still
    /// count as on it.
    /// Default: 0.05
    #[serde(default = "AnalysisConfig::default_strong_beat_tolerance")]
    pub strong_beat_tolerance: f64,
}

impl AnalysisConfig {
    fn default_beats_per_bar() -> u32 {
        4
    }

    fn default_strong_beat_tolerance() -> f64 {
        0.05
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            beats_per_bar: Self::default_beats_per_bar(),
            strong_beat_tolerance: Self::default_strong_beat_tolerance(),
        }
    }
}

/// Practice-pack output defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeConfig {
    /// Where packs are written when `--out` is not given.
    /// Default: ~/.local/share/licklab/packs
    #[serde(default = "PracticeConfig::default_output_dir")]
    pub output_dir: PathBuf,

    /// Add the source key when the requested keys leave it out.
    /// Default: true
    #[serde(default = "PracticeConfig::default_include_original")]
    pub include_original: bool,
}

impl PracticeConfig {
    fn default_output_dir() -> PathBuf {
        directories::BaseDirs::new()
            .map(|dirs| dirs.data_dir().join("licklab/packs"))
            .unwrap_or_else(|| PathBuf::from("licklab-packs"))
    }

    fn default_include_original() -> bool {
        true
    }
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            output_dir: Self::default_output_dir(),
            include_original: Self::default_include_original(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// An `EnvFilter` directive, e.g. `info` or `harmony=debug`.
    /// Default: warn
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "warn".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}
