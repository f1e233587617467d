//! Configuration for the Wellness Sensor Agent.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable overriding [`Config::api_base`].
pub const ENV_API_BASE: &str = "WELLNESS_API_BASE";
/// Environment variable overriding [`Config::account_email`].
pub const ENV_ACCOUNT_EMAIL: &str = "WELLNESS_ACCOUNT_EMAIL";
/// Environment variable overriding [`Config::account_secret`].
pub const ENV_ACCOUNT_SECRET: &str = "WELLNESS_ACCOUNT_SECRET";
/// Environment variable overriding [`Config::sampling_interval`] (seconds).
pub const ENV_SAMPLING_INTERVAL: &str = "WELLNESS_SAMPLING_INTERVAL";

const REDACTED: &str = "********";

/// Main configuration for the sensor agent.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base address of the wellness API, e.g. `https://host/api/v1`
    pub api_base: String,

    /// Account the device logs in as
    pub account_email: String,

    /// Password for `account_email`
    pub account_secret: String,

    /// Minimum time between two classifier invocations
    #[serde(with = "duration_serde")]
    pub sampling_interval: Duration,

    /// Timeout applied to every HTTP request
    #[serde(with = "duration_serde")]
    pub request_timeout: Duration,

    /// Deadline for a single classification
    #[serde(with = "duration_serde")]
    pub classifier_timeout: Duration,

    /// Deadline for capturing a single frame
    #[serde(with = "duration_serde")]
    pub capture_timeout: Duration,

    /// Skip TLS certificate verification (development APIs with self-signed certs)
    pub accept_invalid_certs: bool,

    /// Command that writes one encoded frame to stdout per invocation
    pub capture_command: Vec<String>,

    /// Command that reads a frame on stdin and prints the analysis as JSON
    pub classifier_command: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: "https://localhost:7034/api/v1".to_string(),
            account_email: String::new(),
            account_secret: String::new(),
            sampling_interval: Duration::from_secs(10),
            request_timeout: Duration::from_secs(5),
            classifier_timeout: Duration::from_secs(5),
            capture_timeout: Duration::from_secs(10),
            accept_invalid_certs: false,
            capture_command: vec![
                "ffmpeg".to_string(),
                "-loglevel".to_string(),
                "error".to_string(),
                "-f".to_string(),
                "v4l2".to_string(),
                "-i".to_string(),
                "/dev/video0".to_string(),
                "-frames:v".to_string(),
                "1".to_string(),
                "-f".to_string(),
                "image2pipe".to_string(),
                "-vcodec".to_string(),
                "mjpeg".to_string(),
                "-".to_string(),
            ],
            classifier_command: vec!["wellness-classify".to_string()],
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_base", &self.api_base)
            .field("account_email", &self.account_email)
            .field("account_secret", &REDACTED)
            .field("sampling_interval", &self.sampling_interval)
            .field("request_timeout", &self.request_timeout)
            .field("classifier_timeout", &self.classifier_timeout)
            .field("capture_timeout", &self.capture_timeout)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("capture_command", &self.capture_command)
            .field("classifier_command", &self.classifier_command)
            .finish()
    }
}

impl Config {
    /// Load configuration from the default location, then apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::config_path())?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from `path`, falling back to defaults when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wellness-sensor-agent")
            .join("config.json")
    }

    /// Apply overrides from a variable lookup (normally the process environment).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base) = lookup(ENV_API_BASE) {
            self.api_base = base;
        }
        if let Some(email) = lookup(ENV_ACCOUNT_EMAIL) {
            self.account_email = email;
        }
        if let Some(secret) = lookup(ENV_ACCOUNT_SECRET) {
            self.account_secret = secret;
        }
        if let Some(raw) = lookup(ENV_SAMPLING_INTERVAL) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("{ENV_SAMPLING_INTERVAL} must be whole seconds, got '{raw}'"))
            })?;
            self.sampling_interval = Duration::from_secs(secs);
        }
        Ok(())
    }

    /// Check that the agent can run with this configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base.trim().is_empty() {
            return Err(ConfigError::Missing("api_base"));
        }
        if self.account_email.trim().is_empty() {
            return Err(ConfigError::Missing("account_email"));
        }
        if self.account_secret.is_empty() {
            return Err(ConfigError::Missing("account_secret"));
        }
        if self.sampling_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "sampling_interval must be at least one second".to_string(),
            ));
        }
        if self.classifier_timeout.is_zero() || self.capture_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "classifier_timeout and capture_timeout must be at least one second".to_string(),
            ));
        }
        if self.capture_command.is_empty() {
            return Err(ConfigError::Missing("capture_command"));
        }
        if self.classifier_command.is_empty() {
            return Err(ConfigError::Missing("classifier_command"));
        }
        Ok(())
    }

    /// A copy of this configuration that is safe to print.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.account_secret.is_empty() {
            copy.account_secret = REDACTED.to_string();
        }
        copy
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Serialize error: {0}")]
    Serialize(String),
    #[error("Missing required setting: {0}")]
    Missing(&'static str),
    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Serde support for Duration.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn valid_config() -> Config {
        Config {
            account_email: "iot.device@example.com".to_string(),
            account_secret: "hunter2".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sampling_interval, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.capture_timeout, Duration::from_secs(10));
        assert!(!config.accept_invalid_certs);
        assert!(config.account_email.is_empty());
    }

    #[test]
    fn test_validate_requires_credentials() {
        let config = Config::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing("account_email"))
        ));

        let config = Config {
            account_secret: String::new(),
            ..valid_config()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing("account_secret"))
        ));

        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = Config {
            sampling_interval: Duration::ZERO,
            ..valid_config()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_zero_capture_timeout() {
        let config = Config {
            capture_timeout: Duration::ZERO,
            ..valid_config()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_API_BASE, "http://127.0.0.1:9000/api"),
            (ENV_ACCOUNT_EMAIL, "kiosk@example.com"),
            (ENV_SAMPLING_INTERVAL, "30"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_env(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.api_base, "http://127.0.0.1:9000/api");
        assert_eq!(config.account_email, "kiosk@example.com");
        assert_eq!(config.sampling_interval, Duration::from_secs(30));
        assert!(config.account_secret.is_empty());
    }

    #[test]
    fn test_env_interval_must_be_numeric() {
        let mut config = Config::default();
        let result = config.apply_env(|key| {
            (key == ENV_SAMPLING_INTERVAL).then(|| "ten".to_string())
        });
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            sampling_interval: Duration::from_secs(42),
            ..valid_config()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.sampling_interval, Duration::from_secs(42));
        assert_eq!(loaded.account_email, "iot.device@example.com");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded.sampling_interval, Duration::from_secs(10));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"account_email": "a@b.c", "sampling_interval": 3}"#).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.account_email, "a@b.c");
        assert_eq!(loaded.sampling_interval, Duration::from_secs(3));
        assert_eq!(loaded.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_secret_is_redacted() {
        let config = valid_config();
        assert!(!format!("{config:?}").contains("hunter2"));
        assert_eq!(config.redacted().account_secret, REDACTED);
        assert_eq!(config.account_secret, "hunter2");
    }
}
