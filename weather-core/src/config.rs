use anyhow::{Context, Result, anyhow};
use chrono_tz::Tz;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::{fetch::RetryPolicy, provider::DEFAULT_BASE_URL, units::TemperatureUnit};

/// Environment variable that overrides the API key stored on disk.
pub const API_KEY_ENV: &str = "OWM_KEY";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// units = "celsius"
/// timezone = "America/Denver"
///
/// [retry]
/// max_attempts = 3
/// initial_delay_ms = 400
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    pub base_url: String,

    pub units: TemperatureUnit,

    /// IANA zone name used to decide which calendar day a forecast sample belongs to.
    pub timezone: String,

    /// Upper bound for a whole search (both requests, retries included). 0 disables it.
    pub request_timeout_secs: u64,

    pub favorites: Vec<String>,

    pub retry: RetryPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            units: TemperatureUnit::default(),
            timezone: "UTC".to_string(),
            request_timeout_secs: 30,
            favorites: Vec::new(),
            retry: RetryPolicy::default(),
        }
    }
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// API key from `OWM_KEY`, falling back to the config file.
    pub fn api_key(&self) -> Result<String> {
        self.api_key_with_env(std::env::var(API_KEY_ENV).ok())
    }

    fn api_key_with_env(&self, env_value: Option<String>) -> Result<String> {
        env_value
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.api_key.clone().filter(|k| !k.trim().is_empty()))
            .ok_or_else(|| {
                anyhow!(
                    "No OpenWeatherMap API key configured.\n\
                     Hint: set the {API_KEY_ENV} environment variable or run `weather configure`."
                )
            })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn reference_zone(&self) -> Result<Tz> {
        parse_zone(&self.timezone)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    /// Adds a favorite unless one with the same label (ignoring case) exists.
    /// Returns whether the list changed.
    pub fn add_favorite(&mut self, label: &str) -> bool {
        let label = label.trim();
        if label.is_empty() || self.favorites.iter().any(|f| f.to_lowercase() == label.to_lowercase()) {
            return false;
        }
        self.favorites.push(label.to_string());
        true
    }

    pub fn clear_favorites(&mut self) {
        self.favorites.clear();
    }
}

pub fn parse_zone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| anyhow!("Unknown time zone '{name}': {e}. Use an IANA name such as 'UTC' or 'America/Denver'."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_file_is_empty() {
        let cfg = Config::from_toml("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.reference_zone().unwrap(), Tz::UTC);
        assert_eq!(cfg.request_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(cfg.retry.max_attempts, 3);
    }

    #[test]
    fn reads_all_sections() {
        let cfg = Config::from_toml(
            r#"
            api_key = "FILE_KEY"
            units = "celsius"
            timezone = "America/Denver"
            request_timeout_secs = 0
            favorites = ["Rexburg, US"]

            [retry]
            max_attempts = 5
            initial_delay_ms = 100
            "#,
        )
        .unwrap();

        assert_eq!(cfg.units, TemperatureUnit::Celsius);
        assert_eq!(cfg.reference_zone().unwrap(), chrono_tz::America::Denver);
        assert_eq!(cfg.request_timeout(), None);
        assert_eq!(cfg.retry.max_attempts, 5);
        assert_eq!(cfg.retry.initial_delay, Duration::from_millis(100));
        assert_eq!(cfg.favorites, ["Rexburg, US"]);
    }

    #[test]
    fn roundtrips_through_toml() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        cfg.add_favorite("Boise, US");

        let text = toml::to_string_pretty(&cfg).unwrap();
        assert_eq!(Config::from_toml(&text).unwrap(), cfg);
    }

    #[test]
    fn unknown_zone_is_rejected() {
        let cfg = Config { timezone: "Mars/Olympus".into(), ..Config::default() };
        let err = cfg.reference_zone().unwrap_err();
        assert!(err.to_string().contains("Unknown time zone"));
    }

    #[test]
    fn env_key_wins_over_file_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY".into());

        assert_eq!(cfg.api_key_with_env(Some("ENV_KEY".into())).unwrap(), "ENV_KEY");
        assert_eq!(cfg.api_key_with_env(Some("  ".into())).unwrap(), "FILE_KEY");
        assert_eq!(cfg.api_key_with_env(None).unwrap(), "FILE_KEY");
    }

    #[test]
    fn missing_key_explains_how_to_configure() {
        let err = Config::default().api_key_with_env(None).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("No OpenWeatherMap API key configured"));
        assert!(msg.contains("OWM_KEY"));
        assert!(msg.contains("weather configure"));
    }

    #[test]
    fn favorites_dedupe_ignoring_case() {
        let mut cfg = Config::default();
        assert!(cfg.add_favorite("Rexburg, US"));
        assert!(!cfg.add_favorite("rexburg, us"));
        assert!(!cfg.add_favorite("   "));
        assert!(cfg.add_favorite("Boise, US"));
        assert_eq!(cfg.favorites, ["Rexburg, US", "Boise, US"]);

        cfg.clear_favorites();
        assert!(cfg.favorites.is_empty());
    }
}
