use crate::api::{Backend, HttpApi, LocalApi};
use crate::error::{DirectoryError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const API_URL_ENV: &str = "SCHOOL_DIRECTORY_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote endpoint base; the in-process backend is used when unset
    pub api_base_url: Option<String>,
    pub database_path: Option<PathBuf>,
    pub upload_dir: Option<PathBuf>,
    pub carousel_interval_ms: u64,
    pub refresh_delay_ms: u64,
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: None,
            database_path: None,
            upload_dir: None,
            carousel_interval_ms: 3000,
            refresh_delay_ms: 2000,
            timeout_seconds: 30,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_json(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse a config file body, rejecting settings the runtime cannot use
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(content)?;
        if config.carousel_interval_ms == 0 {
            return Err(DirectoryError::Config(
                "carousel_interval_ms must be greater than zero".into(),
            ));
        }
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| DirectoryError::Config("home directory not found".into()))?;
        Ok(home.join(".config").join("school-directory").join("config.json"))
    }

    fn data_dir() -> Result<PathBuf> {
        let base = dirs::data_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| DirectoryError::Config("data directory not found".into()))?;
        Ok(base.join("school-directory"))
    }

    /// Environment takes precedence over the file
    pub fn api_base_url(&self) -> Option<String> {
        match std::env::var(API_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Some(url),
            _ => self.api_base_url.clone().filter(|u| !u.trim().is_empty()),
        }
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join("schools.db")),
        }
    }

    pub fn upload_dir(&self) -> Result<PathBuf> {
        match &self.upload_dir {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join("schoolImages")),
        }
    }

    pub fn carousel_interval(&self) -> Duration {
        Duration::from_millis(self.carousel_interval_ms)
    }

    pub fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_delay_ms)
    }

    pub fn set_api_base_url(&mut self, url: String) -> Result<()> {
        self.api_base_url = Some(url);
        self.save()
    }

    /// Build the transport this configuration selects
    pub fn backend(&self) -> Result<Backend> {
        match self.api_base_url() {
            Some(url) => {
                let api = HttpApi::new(url, Duration::from_secs(self.timeout_seconds))
                    .map_err(|e| DirectoryError::Config(e.to_string()))?;
                Ok(Backend::Http(api))
            }
            None => {
                let api = LocalApi::open(&self.database_path()?, &self.upload_dir()?)?;
                Ok(Backend::Local(api))
            }
        }
    }
}
