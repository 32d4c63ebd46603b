//! Global datebook configuration.

use std::path::{Path, PathBuf};

use chrono::NaiveTime;
use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::backend::FileBackend;
use crate::error::{DatebookError, DatebookResult};
use crate::event::{Category, parse_time};
use crate::store::DEFAULT_STORAGE_KEY;

static DEFAULT_DATA_DIR: &str = "~/.datebook";
static DEFAULT_TIME: &str = "09:00";

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_time() -> String {
    DEFAULT_TIME.to_string()
}

/// Global configuration at ~/.config/datebook/config.toml
///
/// Every key can also be set from the environment, e.g. `DATEBOOK_DATA_DIR`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DatebookConfig {
    /// Directory holding the event blob
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Name of the blob inside `data_dir` (without extension)
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Time used for new events when none is given (HH:MM)
    #[serde(default = "default_time")]
    pub default_time: String,

    #[serde(default)]
    pub default_category: Category,
}

impl Default for DatebookConfig {
    fn default() -> Self {
        DatebookConfig {
            data_dir: default_data_dir(),
            storage_key: default_storage_key(),
            default_time: default_time(),
            default_category: Category::default(),
        }
    }
}

impl DatebookConfig {
    pub fn config_path() -> DatebookResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| DatebookError::Config("Could not determine config directory".into()))?
            .join("datebook");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the global config, writing a commented default file on first run.
    pub fn load() -> DatebookResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load from an explicit file. A missing file yields the defaults
    /// (plus any environment overrides).
    pub fn load_from(path: &Path) -> DatebookResult<Self> {
        let config: DatebookConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("DATEBOOK"))
            .build()
            .map_err(|e| DatebookError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| DatebookError::Config(e.to_string()))?;

        parse_time(&config.default_time)
            .map_err(|e| DatebookError::Config(format!("default_time: {}", e)))?;

        Ok(config)
    }

    /// `data_dir` with `~` expanded
    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    pub fn backend(&self) -> FileBackend {
        FileBackend::new(self.data_path())
    }

    pub fn default_time(&self) -> NaiveTime {
        parse_time(&self.default_time).unwrap_or_default()
    }

    /// Write this config to `path`, replacing what is there.
    pub fn save_to(&self, path: &Path) -> DatebookResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| DatebookError::Config(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)
            .map_err(|e| DatebookError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> DatebookResult<()> {
        let contents = format!(
            "\
# datebook configuration

# Where your events are stored:
# data_dir = \"{}\"

# File name (without .json) of the event store:
# storage_key = \"{}\"

# Defaults for new events:
# default_time = \"{}\"
# default_category = \"personal\"
",
            DEFAULT_DATA_DIR, DEFAULT_STORAGE_KEY, DEFAULT_TIME
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatebookError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| DatebookError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commented_default_file_loads_as_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("datebook/config.toml");

        DatebookConfig::create_default_config(&path).unwrap();
        let config = DatebookConfig::load_from(&path).unwrap();

        assert_eq!(config.storage_key, "calendar_events");
        assert_eq!(config.default_category, Category::Personal);
        assert_eq!(config.default_time(), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
    }

    #[test]
    fn saved_values_are_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = DatebookConfig {
            data_dir: dir.path().join("data"),
            storage_key: "work_calendar".to_string(),
            default_time: "08:30".to_string(),
            default_category: Category::Work,
        };
        config.save_to(&path).unwrap();

        let loaded = DatebookConfig::load_from(&path).unwrap();
        assert_eq!(loaded.storage_key, "work_calendar");
        assert_eq!(loaded.default_category, Category::Work);
        assert_eq!(loaded.data_path(), dir.path().join("data"));
        assert_eq!(loaded.backend().path_for("x"), dir.path().join("data/x.json"));
    }

    #[test]
    fn invalid_default_time_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_time = \"nine\"\n").unwrap();

        assert!(matches!(
            DatebookConfig::load_from(&path),
            Err(DatebookError::Config(_))
        ));
    }

    #[test]
    fn tilde_is_expanded() {
        let config = DatebookConfig::default();
        assert!(!config.data_path().to_string_lossy().starts_with('~'));
    }
}
