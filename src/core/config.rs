//! Configuration: optional JSON file, then environment overrides.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::export::ExportOptions;
use crate::core::paths;

pub const BULLET_ENV: &str = "TUTOR_MD_BULLET";
pub const RESPACE_ENV: &str = "TUTOR_MD_RESPACE";
pub const WIDTH_ENV: &str = "TUTOR_MD_WIDTH";

const DEFAULT_WIDTH: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub export: ExportOptions,
    /// Wrap width for terminal output; 0 disables wrapping.
    pub width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            export: ExportOptions::default(),
            width: DEFAULT_WIDTH,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config file {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid {name} value {value:?}: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// JSON structure on disk. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ConfigFile {
    bullet_marker: Option<String>,
    respace: Option<bool>,
    width: Option<usize>,
}

/// Load configuration from the config file (if present) and environment.
pub fn load() -> Result<Config, ConfigError> {
    let file = match paths::config_file() {
        Some(path) => read_file(&path)?,
        None => ConfigFile::default(),
    };
    resolve(file, |name| env::var(name).ok())
}

pub(crate) fn read_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    if !path.exists() {
        log::debug!("No config file at {}", path.display());
        return Ok(ConfigFile::default());
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_bullet(name: &'static str, value: &str) -> Result<char, ConfigError> {
    match value.trim() {
        "-" => Ok('-'),
        "*" => Ok('*'),
        "+" => Ok('+'),
        _ => Err(ConfigError::InvalidValue {
            name,
            value: value.to_string(),
            reason: "expected one of -, *, +",
        }),
    }
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name,
            value: value.to_string(),
            reason: "expected true or false",
        }),
    }
}

/// Merge file values with environment overrides (env wins).
pub(crate) fn resolve<F>(file: ConfigFile, env: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = Config::default();

    if let Some(bullet) = file.bullet_marker {
        config.export.bullet_marker = parse_bullet("bullet_marker", &bullet)?;
    }
    if let Some(respace) = file.respace {
        config.export.respace = respace;
    }
    if let Some(width) = file.width {
        config.width = width;
    }

    if let Some(bullet) = env(BULLET_ENV) {
        config.export.bullet_marker = parse_bullet(BULLET_ENV, &bullet)?;
    }
    if let Some(respace) = env(RESPACE_ENV) {
        config.export.respace = parse_bool(RESPACE_ENV, &respace)?;
    }
    if let Some(width) = env(WIDTH_ENV) {
        config.width = width
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                name: WIDTH_ENV,
                value: width.clone(),
                reason: "expected a non-negative integer",
            })?;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_without_file_or_env() {
        let config = resolve(ConfigFile::default(), env_from(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.export.bullet_marker, '-');
        assert!(config.export.respace);
    }

    #[test]
    fn env_overrides_file() {
        let file = ConfigFile {
            bullet_marker: Some("*".to_string()),
            respace: Some(false),
            width: Some(60),
        };
        let config = resolve(file, env_from(&[(BULLET_ENV, "+"), (WIDTH_ENV, "0")])).unwrap();
        assert_eq!(config.export.bullet_marker, '+');
        assert!(!config.export.respace);
        assert_eq!(config.width, 0);
    }

    #[test]
    fn invalid_env_values_rejected() {
        let err = resolve(ConfigFile::default(), env_from(&[(BULLET_ENV, "#")])).unwrap_err();
        assert!(err.to_string().contains(BULLET_ENV));
        assert!(resolve(ConfigFile::default(), env_from(&[(RESPACE_ENV, "maybe")])).is_err());
        assert!(resolve(ConfigFile::default(), env_from(&[(WIDTH_ENV, "-3")])).is_err());
    }

    #[test]
    fn read_file_missing_is_default() {
        let tmp = tempfile::TempDir::new().unwrap();
        let file = read_file(&tmp.path().join("absent.json")).unwrap();
        assert!(file.bullet_marker.is_none());
    }

    #[test]
    fn read_file_parses_json() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, r#"{"bullet_marker": "*", "width": 72}"#).unwrap();
        let config = resolve(read_file(&path).unwrap(), env_from(&[])).unwrap();
        assert_eq!(config.export.bullet_marker, '*');
        assert_eq!(config.width, 72);
    }

    #[test]
    fn read_file_rejects_unknown_fields() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, r#"{"heading_style": "setext"}"#).unwrap();
        assert!(matches!(read_file(&path), Err(ConfigError::Json { .. })));
    }
}
