use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Environment id shipped in the default config until the operator sets a
/// real one from the data-collection console.
pub const PLACEHOLDER_ENVIRONMENT_ID: &str = "YOUR_ENV_ID_HERE";

// ── Top-level config ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed at load time, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Datastream environment id the collect endpoint is addressed with
    #[serde(default = "default_environment_id")]
    pub environment_id: String,

    #[serde(default)]
    pub edge: EdgeConfig,
}

// ── Edge network ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeConfig {
    /// Base url of the collect deployment
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout applied by the HTTP client
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_environment_id() -> String {
    PLACEHOLDER_ENVIRONMENT_ID.to_string()
}

fn default_base_url() -> String {
    "https://edge.adobedc.net".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            environment_id: default_environment_id(),
            edge: EdgeConfig::default(),
        }
    }
}

impl Config {
    /// Load `~/.edgeprobe/config.toml`, writing a default one on first run.
    pub fn load_or_init() -> Result<Self, ConfigError> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .ok_or_else(|| ConfigError::Load("could not find home directory".to_string()))?;
        let edgeprobe_dir = home.join(".edgeprobe");
        let config_path = edgeprobe_dir.join("config.toml");

        if !edgeprobe_dir.exists() {
            fs::create_dir_all(&edgeprobe_dir)?;
        }

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self {
                config_path: config_path.clone(),
                ..Self::default()
            };
            config.save()?;
            Ok(config)
        }
    }

    /// Load an explicit config file (`--config`).
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let mut config: Config =
            toml::from_str(&contents).map_err(|e| ConfigError::Load(e.to_string()))?;
        config.config_path = path.to_path_buf();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to config
    pub fn apply_env_overrides(&mut self) {
        if let Ok(id) = std::env::var("EDGEPROBE_ENVIRONMENT_ID") {
            if !id.is_empty() {
                self.environment_id = id;
            }
        }

        if let Ok(base_url) = std::env::var("EDGEPROBE_EDGE_BASE_URL") {
            if !base_url.is_empty() {
                self.edge.base_url = base_url;
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.edge.base_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "edge.base_url must not be empty".to_string(),
            ));
        }
        Url::parse(&self.edge.base_url).map_err(|e| {
            ConfigError::Validation(format!("edge.base_url is not a valid url: {e}"))
        })?;
        if self.edge.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "edge.request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Load(e.to_string()))?;
        fs::write(&self.config_path, contents)?;
        Ok(())
    }
}
