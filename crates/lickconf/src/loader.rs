//! Config file discovery, table merging, and environment variable overlay.

use crate::{ConfigError, LickConfig};
use std::env;
use std::path::{Path, PathBuf};

/// Information about where config values came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files in standard locations.
///
/// Returns paths in load order (system, user, local). Only returns files
/// that exist.
pub fn discover_config_files() -> Vec<PathBuf> {
    discover_config_files_with_override(None)
}

/// Discover config files, optionally with a CLI override path.
///
/// If `cli_path` is provided it replaces the local `./licklab.toml`. Unlike
/// the standard locations, an explicit path is returned even when missing
/// so that loading it reports the error.
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/licklab/config.toml");
    if system.exists() {
        files.push(system);
    }

    // XDG_CONFIG_HOME or ~/.config
    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("licklab/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = cli_path {
        files.push(path.to_path_buf());
        return files;
    }

    let local = PathBuf::from("licklab.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Read one config file as a raw TOML table.
pub fn load_table(path: &Path) -> Result<toml::Table, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_table(&contents, path)
}

fn parse_table(contents: &str, path: &Path) -> Result<toml::Table, ConfigError> {
    contents.parse().map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Merge `overlay` into `base`, key by key. Nested tables merge
/// recursively; any other value in `overlay` replaces the one in `base`.
pub fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(incoming) => match base.get_mut(&key) {
                Some(toml::Value::Table(existing)) => merge_tables(existing, incoming),
                _ => {
                    base.insert(key, toml::Value::Table(incoming));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}

/// Deserialize a merged table into a typed config; missing keys take
/// their defaults.
pub fn from_table(table: toml::Table, origin: &Path) -> Result<LickConfig, ConfigError> {
    let mut config: LickConfig =
        toml::Value::Table(table)
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Parse {
                path: origin.to_path_buf(),
                message: e.to_string(),
            })?;

    config.practice.output_dir = expand_path(&config.practice.output_dir.to_string_lossy());
    Ok(config)
}

/// Apply environment variable overrides from the process environment.
pub fn apply_env_overrides(
    config: &mut LickConfig,
    sources: &mut ConfigSources,
) -> Result<(), ConfigError> {
    apply_env_overrides_with(config, sources, |name| env::var(name).ok())
}

/// Apply environment variable overrides read through `lookup`.
pub fn apply_env_overrides_with<F>(
    config: &mut LickConfig,
    sources: &mut ConfigSources,
    lookup: F,
) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("LICKLAB_BEATS_PER_BAR") {
        config.analysis.beats_per_bar = parse_env("LICKLAB_BEATS_PER_BAR", &v)?;
        sources.env_overrides.push("LICKLAB_BEATS_PER_BAR".to_string());
    }
    if let Some(v) = lookup("LICKLAB_STRONG_BEAT_TOLERANCE") {
        config.analysis.strong_beat_tolerance = parse_env("LICKLAB_STRONG_BEAT_TOLERANCE", &v)?;
        sources.env_overrides.push("LICKLAB_STRONG_BEAT_TOLERANCE".to_string());
    }

    if let Some(v) = lookup("LICKLAB_PACK_DIR") {
        config.practice.output_dir = expand_path(&v);
        sources.env_overrides.push("LICKLAB_PACK_DIR".to_string());
    }
    if let Some(v) = lookup("LICKLAB_INCLUDE_ORIGINAL") {
        config.practice.include_original = parse_env("LICKLAB_INCLUDE_ORIGINAL", &v)?;
        sources.env_overrides.push("LICKLAB_INCLUDE_ORIGINAL".to_string());
    }

    if let Some(v) = lookup("LICKLAB_LOG_LEVEL") {
        config.logging.level = v;
        sources.env_overrides.push("LICKLAB_LOG_LEVEL".to_string());
    }
    // RUST_LOG wins over everything
    if let Some(v) = lookup("RUST_LOG") {
        config.logging.level = v;
        sources.env_overrides.push("RUST_LOG".to_string());
    }

    Ok(())
}

fn parse_env<T: std::str::FromStr>(var: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Env {
        var: var.to_string(),
        value: value.to_string(),
    })
}

/// Expand ~ and environment variables in a path.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        match directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            Some(home) => home.join(stripped),
            None => PathBuf::from(path),
        }
    } else if let Some(stripped) = path.strip_prefix('$') {
        // $VAR/rest/of/path
        match stripped.split_once('/') {
            Some((var_name, rest)) => env::var(var_name)
                .map(|value| PathBuf::from(value).join(rest))
                .unwrap_or_else(|_| PathBuf::from(path)),
            None => env::var(stripped)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(path)),
        }
    } else {
        PathBuf::from(path)
    }
}
