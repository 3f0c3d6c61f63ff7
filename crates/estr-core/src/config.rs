//! Configuration loading for estr
//!
//! Reads `estr.toml`, found by walking up from a starting directory.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "estr.toml";
pub const DEFAULT_TAGS_OUTPUT: &str = "tags";

const KNOWN_TOP_LEVEL_KEYS: &[&str] = &["tags", "rename"];
const KNOWN_TAGS_KEYS: &[&str] = &["classic", "output", "exclude"];
const KNOWN_RENAME_KEYS: &[&str] = &["check_only"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid TOML in '{path}': {message}")]
    ParseError { path: PathBuf, message: String },
}

#[derive(Debug, Clone, Default)]
pub struct ConfigResult {
    pub config: Config,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub tags: TagsConfig,
    pub rename: RenameConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TagsConfig {
    pub classic: bool,
    pub output: String,
    /// Directory names skipped while collecting files.
    pub exclude: Vec<String>,
}

impl Default for TagsConfig {
    fn default() -> Self {
        Self {
            classic: false,
            output: DEFAULT_TAGS_OUTPUT.to_string(),
            exclude: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenameConfig {
    /// Validate renames without printing the rewritten source.
    pub check_only: bool,
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if !current.pop() {
            return None;
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    load_config_with_warnings(path).map(|result| result.config)
}

pub fn load_config_with_warnings(path: &Path) -> Result<ConfigResult, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })?;

    let warnings = detect_unknown_keys(&content);
    for warning in &warnings {
        tracing::warn!(path = %path.display(), "{warning}");
    }

    Ok(ConfigResult { config, warnings })
}

fn detect_unknown_keys(content: &str) -> Vec<String> {
    let mut warnings = Vec::new();

    let table: toml::Table = match content.parse() {
        Ok(t) => t,
        Err(_) => return warnings,
    };

    let known_top: HashSet<&str> = KNOWN_TOP_LEVEL_KEYS.iter().copied().collect();
    for key in table.keys() {
        if !known_top.contains(key.as_str()) {
            warnings.push(format!("Unknown config option: '{}'", key));
        }
    }

    for (section, known) in [("tags", KNOWN_TAGS_KEYS), ("rename", KNOWN_RENAME_KEYS)] {
        if let Some(toml::Value::Table(entries)) = table.get(section) {
            for key in entries.keys() {
                if !known.contains(&key.as_str()) {
                    warnings.push(format!("Unknown config option in [{section}]: '{key}'"));
                }
            }
        }
    }

    warnings
}

/// Missing files give the defaults; so do unreadable or invalid ones, with
/// the failure reported as a warning.
pub fn load_config_or_default_with_warnings(start_dir: &Path) -> ConfigResult {
    match find_config_file(start_dir) {
        Some(path) => load_config_with_warnings(&path).unwrap_or_else(|error| ConfigResult {
            config: Config::default(),
            warnings: vec![error.to_string()],
        }),
        None => ConfigResult::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn create_temp_dir() -> tempfile::TempDir {
        tempfile::tempdir().expect("Failed to create temp dir")
    }

    #[test]
    fn load_config_from_file() {
        let dir = create_temp_dir();
        let config_path = dir.path().join(CONFIG_FILENAME);
        fs::write(
            &config_path,
            r#"
[tags]
classic = true
output = "TAGS"
exclude = ["vendor", "dist"]

[rename]
check_only = true
"#,
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();

        assert!(config.tags.classic);
        assert_eq!(config.tags.output, "TAGS");
        assert_eq!(config.tags.exclude, vec!["vendor", "dist"]);
        assert!(config.rename.check_only);
    }

    #[test]
    fn default_config_when_missing() {
        let dir = create_temp_dir();
        let result = load_config_or_default_with_warnings(dir.path());

        assert_eq!(result.config, Config::default());
        assert_eq!(result.config.tags.output, DEFAULT_TAGS_OUTPUT);
        assert!(!result.config.tags.classic);
        assert!(!result.config.rename.check_only);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn error_on_invalid_toml() {
        let dir = create_temp_dir();
        let config_path = dir.path().join(CONFIG_FILENAME);
        fs::write(&config_path, "this is not valid { toml }").unwrap();

        match load_config(&config_path) {
            Err(ConfigError::ParseError { path, message }) => {
                assert_eq!(path, config_path);
                assert!(!message.is_empty());
            }
            other => panic!("Expected ParseError, got {other:?}"),
        }
    }

    #[test]
    fn invalid_config_falls_back_with_warning() {
        let dir = create_temp_dir();
        fs::write(dir.path().join(CONFIG_FILENAME), "[tags]\nclassic = \"yes\"").unwrap();

        let result = load_config_or_default_with_warnings(dir.path());

        assert_eq!(result.config, Config::default());
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains(CONFIG_FILENAME));
    }

    #[test]
    fn find_config_file_in_parent_directory() {
        let parent = create_temp_dir();
        let child = parent.path().join("nested").join("deeper");
        fs::create_dir_all(&child).unwrap();
        let config_path = parent.path().join(CONFIG_FILENAME);
        fs::write(&config_path, "").unwrap();

        assert_eq!(find_config_file(&child), Some(config_path));
    }

    #[test]
    fn find_config_file_returns_none_when_not_found() {
        let dir = create_temp_dir();

        assert!(find_config_file(dir.path()).is_none());
    }

    #[test]
    fn partial_config_uses_defaults() {
        let dir = create_temp_dir();
        let config_path = dir.path().join(CONFIG_FILENAME);
        fs::write(&config_path, "[tags]\nclassic = true").unwrap();

        let config = load_config(&config_path).unwrap();

        assert!(config.tags.classic);
        assert_eq!(config.tags.output, DEFAULT_TAGS_OUTPUT);
        assert!(config.tags.exclude.is_empty());
    }

    #[test]
    fn warns_on_unknown_options() {
        let dir = create_temp_dir();
        let config_path = dir.path().join(CONFIG_FILENAME);
        fs::write(
            &config_path,
            r#"
verbose = true

[tags]
clasic = true

[rename]
check_only = false
"#,
        )
        .unwrap();

        let result = load_config_with_warnings(&config_path).unwrap();

        assert_eq!(result.warnings.len(), 2);
        assert!(result.warnings.iter().any(|w| w.contains("'verbose'")));
        assert!(
            result
                .warnings
                .iter()
                .any(|w| w.contains("[tags]") && w.contains("clasic"))
        );
    }

    #[test]
    fn no_warnings_for_valid_config() {
        let dir = create_temp_dir();
        let config_path = dir.path().join(CONFIG_FILENAME);
        fs::write(
            &config_path,
            "[tags]\noutput = \"tags\"\nexclude = []\n\n[rename]\ncheck_only = true\n",
        )
        .unwrap();

        let result = load_config_with_warnings(&config_path).unwrap();

        assert!(result.warnings.is_empty());
    }

    #[test]
    fn config_error_display_is_helpful() {
        let err = ConfigError::ParseError {
            path: PathBuf::from("/path/to/estr.toml"),
            message: "expected `=`".to_string(),
        };

        let msg = err.to_string();

        assert!(msg.contains("/path/to/estr.toml"));
        assert!(msg.contains("expected `=`"));
    }
}
