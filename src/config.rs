//! Configuration loader and validator for the vendor-portal admin tools.
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Overrides `api.base_url` (the portal's `VITE_API_URL`).
pub const ENV_API_URL: &str = "VP_API_URL";
/// Overrides `api.subscription_key`.
pub const ENV_SUBSCRIPTION_KEY: &str = "VP_SUBSCRIPTION_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub app: App,
    pub api: Api,
}

/// App-level settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct App {
    pub data_dir: String,
}

/// Backend endpoints shared by the admin and retail-catalog clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Api {
    pub base_url: String,
    #[serde(default)]
    pub subscription_key: Option<String>,
}

impl Config {
    /// Ensure required directories exist (creates `app.data_dir` if missing).
    pub fn ensure_dirs(&self) -> Result<(), std::io::Error> {
        if self.app.data_dir.trim().is_empty() {
            return Ok(());
        }
        fs::create_dir_all(&self.app.data_dir)
    }

    /// Location of the persisted login session.
    pub fn session_path(&self) -> PathBuf {
        Path::new(&self.app.data_dir).join("session.json")
    }

    /// Base URL with a guaranteed trailing slash so endpoint paths join
    /// underneath it instead of replacing the last segment.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let mut raw = self.api.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw).map_err(|_| ConfigError::Invalid("api.base_url must be an absolute URL"))
    }

    /// Subscription key with blank values treated as absent.
    pub fn subscription_key(&self) -> Option<&str> {
        self.api
            .subscription_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(ENV_API_URL) {
            if !url.trim().is_empty() {
                self.api.base_url = url;
            }
        }
        if let Ok(key) = std::env::var(ENV_SUBSCRIPTION_KEY) {
            self.api.subscription_key = Some(key);
        }
    }
}

/// Load configuration from a YAML file, apply environment overrides and
/// validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let mut cfg: Config = serde_yaml::from_str(&content)?;
    cfg.apply_env_overrides();
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.app.data_dir.trim().is_empty() {
        return Err(ConfigError::Invalid("app.data_dir must be non-empty"));
    }
    if cfg.api.base_url.trim().is_empty() {
        return Err(ConfigError::Invalid("api.base_url must be non-empty"));
    }
    let url = cfg.base_url()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Invalid("api.base_url must use http or https"));
    }
    Ok(())
}

/// Returns the example YAML content.
pub fn example() -> &'static str {
    r#"app:
  data_dir: "./data"

api:
  base_url: "https://vendor-portal.example.com/"
  subscription_key: "YOUR_SUBSCRIPTION_KEY"
"#
}
