use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::services::CredentialCipher;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
    /// Also append logs to this file when set
    #[serde(default)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

/// Vendor cloud account and target device.
#[derive(Clone, Serialize, Deserialize)]
pub struct Cloud {
    pub base_url: String,
    pub device_id: String,
    pub app_key: String,
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    #[serde(default = "Cloud::default_timeout")]
    pub timeout_secs: u64,
}

impl Cloud {
    fn default_timeout() -> u64 {
        30
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl std::fmt::Debug for Cloud {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cloud")
            .field("base_url", &self.base_url)
            .field("device_id", &self.device_id)
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    pub url: String,
    #[serde(default)]
    pub clean_start: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenCache {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cycle {
    pub steps_path: PathBuf,
    /// Seconds
    pub total_runtime: u64,
    pub patterns: Vec<Vec<String>>,
}

impl Cycle {
    pub fn total_runtime(&self) -> Duration {
        Duration::from_secs(self.total_runtime)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub logger: Logger,
    pub server: Server,
    pub cloud: Cloud,
    pub database: Database,
    pub token: TokenCache,
    pub cycle: Cycle,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_dir("configs")
    }

    /// Layers `<dir>/default`, `<dir>/<RUN_MODE>` and `HEYCYCLE__SECTION__KEY` variables.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        let settings: Settings = Config::builder()
            .add_source(File::from(dir.join("default")))
            .add_source(File::from(dir.join(&run_mode)).required(false))
            .add_source(Environment::with_prefix("HEYCYCLE").separator("__"))
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }

    /// Rejects settings the control loop cannot start without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("cloud.base_url", &self.cloud.base_url),
            ("cloud.device_id", &self.cloud.device_id),
            ("cloud.app_key", &self.cloud.app_key),
            ("cloud.client_id", &self.cloud.client_id),
            ("cloud.client_secret", &self.cloud.client_secret),
            ("cloud.username", &self.cloud.username),
            ("cloud.password", &self.cloud.password),
            ("database.url", &self.database.url),
        ];

        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ConfigError::Missing(*field));
        }

        // key and IV are cut from the first 32 characters, which must be 32 bytes
        CredentialCipher::new(&self.cloud.app_key).map_err(|e| ConfigError::Invalid {
            field: "cloud.app_key",
            reason: e.to_string(),
        })?;

        if self.cycle.patterns.iter().all(|pattern| pattern.is_empty()) {
            return Err(ConfigError::Invalid {
                field: "cycle.patterns",
                reason: String::from("at least one non-empty pattern group is required"),
            });
        }

        Ok(())
    }
}
