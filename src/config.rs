//! Application configuration.

use crate::consts::cli_consts::{api, rate_limiting};
use crate::model::{DisplayMode, Pollutant, Region};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::{fs, path::Path};

/// Get the path to the dashboard config file, typically located at ~/.openaq-dashboard/config.json.
pub fn get_config_path() -> Result<PathBuf, std::io::Error> {
    let home_path = home::home_dir().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Failed to determine home directory",
        )
    })?;
    Ok(home_path.join(".openaq-dashboard").join("config.json"))
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Sent as `X-API-KEY` when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub region: Region,
    pub pollutant: Pollutant,
    pub display_mode: DisplayMode,
    pub page_limit: u32,
    pub max_pages: u32,
    pub request_timeout_secs: u64,
    pub rate_limit_backoff_ms: u64,
    pub min_request_interval_ms: u64,
    pub history_days: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            region: Region::default(),
            pollutant: Pollutant::default(),
            display_mode: DisplayMode::default(),
            page_limit: api::PAGE_LIMIT,
            max_pages: api::MAX_PAGES,
            request_timeout_secs: api::REQUEST_TIMEOUT_SECS,
            rate_limit_backoff_ms: rate_limiting::BACKOFF_MS,
            min_request_interval_ms: rate_limiting::MIN_REQUEST_INTERVAL_MS,
            history_days: api::HISTORY_DAYS,
        }
    }
}

impl Config {
    /// Loads configuration from a JSON file at the given path.
    /// Missing fields take their default values.
    ///
    /// # Errors
    /// Returns an `std::io::Error` if reading from file fails or JSON is invalid.
    pub fn load_from_file(path: &Path) -> Result<Self, std::io::Error> {
        let buf = fs::read(path)?;
        let config: Config = serde_json::from_slice(&buf)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(config)
    }

    /// Loads the configuration at `path`, or the defaults when no file exists yet.
    pub fn load_or_default(path: &Path) -> Result<Self, std::io::Error> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Saves the configuration to a JSON file at the given path.
    ///
    /// Directories will be created if they don't exist. This method overwrites existing files.
    ///
    /// # Errors
    /// Returns an `std::io::Error` if writing to file fails or serialization fails.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Serialization failed: {}", e),
            )
        })?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    // Loading a saved configuration file should return the same configuration.
    fn test_load_recovers_saved_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = Config {
            api_key: Some("secret".to_string()),
            region: Region::Europe,
            pollutant: Pollutant::Pm10,
            ..Config::default()
        };
        config.save(&path).unwrap();

        let loaded_config = Config::load_from_file(&path).unwrap();
        assert_eq!(config, loaded_config);
    }

    #[test]
    // Saving a configuration should create directories if they don't exist.
    fn test_save_creates_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nonexistent_dir").join("config.json");

        let result = Config::default().save(&path);

        assert!(result.is_ok(), "Failed to save config");
        assert!(
            path.parent().unwrap().exists(),
            "Parent directory does not exist"
        );
    }

    #[test]
    // Fields missing from the file fall back to their defaults.
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut file = File::create(&path).unwrap();
        writeln!(file, r#"{{"region": "south-america", "max_pages": 3}}"#).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.region, Region::SouthAmerica);
        assert_eq!(loaded.max_pages, 3);
        assert_eq!(loaded.page_limit, api::PAGE_LIMIT);
        assert_eq!(loaded.api_key, None);
    }

    #[test]
    // A missing file yields the default configuration.
    fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.json");

        let loaded = Config::load_or_default(&path).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    // Loading an invalid JSON file should return an error.
    fn test_load_rejects_invalid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("invalid_config.json");

        let mut file = File::create(&path).unwrap();
        writeln!(file, "invalid json").unwrap();

        let result = Config::load_from_file(&path);
        assert!(result.is_err());
    }
}
