// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading
//!
//! Loads `stagetrack_configuration.toml` from an explicit path, an
//! environment-variable override, or by searching upward from the working
//! directory. Missing sections fall back to their defaults; the merged
//! result is validated before use.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{ConfigError, ConfigResult, TrackerConfig};

/// File name searched for when no explicit path is given.
pub const CONFIG_FILE_NAME: &str = "stagetrack_configuration.toml";

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "STAGETRACK_CONFIG_PATH";

/// Find the stagetrack configuration file
///
/// Search order:
/// 1. `STAGETRACK_CONFIG_PATH` environment variable
/// 2. Current working directory
/// 3. Ancestor directories (up to 5 levels, for workspace roots)
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by {} not found: {}",
            CONFIG_PATH_ENV,
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd;
        for _ in 0..5 {
            if let Some(parent) = current.parent() {
                search_paths.push(parent.join(CONFIG_FILE_NAME));
                current = parent.to_path_buf();
            }
        }
    }

    for path in &search_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "Configuration file '{}' not found in any of these locations:\n{}\n\nSet {} to specify a custom location.",
        CONFIG_FILE_NAME, search_list, CONFIG_PATH_ENV
    )))
}

/// Load configuration from a TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
///
/// # Errors
///
/// Returns an error if the config file is not found, contains invalid TOML,
/// or fails validation.
pub fn load_config(config_path: Option<&Path>) -> ConfigResult<TrackerConfig> {
    let path = match config_path {
        Some(p) => p.to_path_buf(),
        None => find_config_file()?,
    };

    let raw = fs::read_to_string(&path)?;
    let config: TrackerConfig = toml::from_str(&raw)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from a file if one can be found, otherwise fall back
/// to defaults. Parse and validation errors are still surfaced — only a
/// missing file falls back.
pub fn load_config_or_default() -> ConfigResult<TrackerConfig> {
    match find_config_file() {
        Ok(path) => load_config(Some(&path)),
        Err(ConfigError::FileNotFound(_)) => Ok(TrackerConfig::default()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_fills_missing_sections_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[control]\ngain = 9.5\n\n[vision]\nsegmentation_interval_ms = 120\n"
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert!((config.control.gain - 9.5).abs() < f64::EPSILON);
        assert_eq!(config.vision.segmentation_interval_ms, 120);
        // Untouched sections keep defaults.
        assert_eq!(config.optics.crop_size, 770);
        assert_eq!(config.control.poll_interval_ms, 50);
    }

    #[test]
    fn invalid_values_fail_validation_on_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[control]\ngain = -2.0\n").unwrap();
        assert!(matches!(
            load_config(Some(file.path())),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[control\ngain = ").unwrap();
        assert!(matches!(
            load_config(Some(file.path())),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_explicit_path_is_an_io_error() {
        let result = load_config(Some(Path::new("/nonexistent/stagetrack.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
