use crate::api::RetryPolicy;
use crate::core::error::ChatError;
use crate::store::{Settings, SettingsPatch};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_BASE_URL: &str = "https://api-flask-wcad.onrender.com";
pub const BACKEND_URL_ENV: &str = "GCHAT_BACKEND_URL";
pub const LOG_LEVEL_ENV: &str = "GCHAT_LOG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend root; `None` means the built-in default host.
    pub base_url: Option<String>,
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Whole-request timeout in seconds. 0 disables it.
    pub request_timeout_secs: u64,
    /// Extra attempts per backend call.
    pub retries: u32,
    /// How long an error stays on screen, in seconds.
    pub error_display_secs: u64,
    /// Overrides applied on top of the built-in generation settings.
    pub defaults: SettingsPatch,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: None,
            log_level: "warn".to_string(),
            request_timeout_secs: 60,
            retries: RetryPolicy::default().retries,
            error_display_secs: 5,
            defaults: SettingsPatch::default(),
        }
    }
}

impl Config {
    fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".gchat")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    pub fn history_path() -> PathBuf {
        Self::config_dir().join("history.txt")
    }

    /// Loads `path`, writing a default file there first if none exists.
    pub fn load_from(path: &Path) -> Result<Config, ChatError> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            if contents.trim().is_empty() {
                return Ok(Config::default());
            }
            return serde_yml::from_str::<Config>(&contents)
                .map_err(|e| ChatError::Config(format!("Parse {}: {}", path.display(), e)));
        }

        let config = Config::default();
        if let Err(e) = config.save_to(path) {
            warn!(path = %path.display(), error = %e, "could not write default config");
        }
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ChatError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let yaml_content = serde_yml::to_string(self)?;
        fs::write(path, yaml_content)?;
        Ok(())
    }

    /// Applies `GCHAT_BACKEND_URL` and `GCHAT_LOG` from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(BACKEND_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.base_url = Some(url);
        }
        if let Some(level) = lookup(LOG_LEVEL_ENV).filter(|v| !v.trim().is_empty()) {
            self.log_level = level;
        }
        self
    }

    pub fn base_url(&self) -> String {
        self.base_url
            .as_deref()
            .map(|url| url.trim().trim_end_matches('/'))
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
            .to_string()
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.retries,
        }
    }

    pub fn error_display_window(&self) -> Duration {
        Duration::from_secs(self.error_display_secs)
    }

    /// Built-in defaults with the configured overrides merged in.
    pub fn initial_settings(&self) -> Settings {
        let mut settings = Settings::default();
        settings.merge(&self.defaults);
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "base_url: http://localhost:8000/\nretries: 0\ndefaults:\n  model: qwen-qwq-32b\n  max_tokens: 1200\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.base_url(), "http://localhost:8000");
        assert_eq!(config.retry_policy(), RetryPolicy { retries: 0 });
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(60)));
        assert_eq!(config.error_display_window(), Duration::from_secs(5));

        let settings = config.initial_settings();
        assert_eq!(settings.model, "qwen-qwq-32b");
        assert_eq!(settings.max_tokens, 1200);
        assert_eq!(settings.temperature, 0.7);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "retries: [not, a, number]\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(ChatError::Config(_))));
    }

    #[test]
    fn environment_overrides_file_values() {
        let config = Config {
            base_url: Some("http://from-file".to_string()),
            ..Config::default()
        }
        .with_overrides_from(|key| match key {
            BACKEND_URL_ENV => Some("http://from-env:9000".to_string()),
            LOG_LEVEL_ENV => Some("debug".to_string()),
            _ => None,
        });

        assert_eq!(config.base_url(), "http://from-env:9000");
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn default_host_and_disabled_timeout() {
        let config = Config {
            request_timeout_secs: 0,
            ..Config::default()
        }
        .with_overrides_from(|_| None);

        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout(), None);
    }
}
