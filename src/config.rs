// File: ./src/config.rs
use crate::workflow::ReminderPolicy;
use directories::ProjectDirs;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("'{0}' is not configured")]
    NotConfigured(&'static str),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub endpoint: String,
    pub model: String,
    pub api_key: String,
    pub timeout_secs: u64,
    /// Optional file replacing the built-in prompt.
    pub prompt_template: Option<PathBuf>,
    pub reminder_policy: ReminderPolicy,
    pub heuristic_fallback: bool,
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: String::new(),
            timeout_secs: 30,
            prompt_template: None,
            reminder_policy: ReminderPolicy::default(),
            heuristic_fallback: false,
            data_dir: None,
        }
    }
}

impl Config {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "sagetask", "sagetask")
    }

    pub fn get_path() -> Option<PathBuf> {
        Self::project_dirs().map(|p| p.config_dir().join("config.toml"))
    }

    /// Loads the user config (defaults if absent) and applies env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::get_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => Self::default(),
        };
        config.apply_env(|key| env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// `GEMINI_API_KEY` wins over `GOOGLE_API_KEY`; `SAGETASK_DATA_DIR` over `data_dir`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("GEMINI_API_KEY").or_else(|| lookup("GOOGLE_API_KEY"))
            && !key.is_empty()
        {
            self.api_key = key;
        }
        if let Some(dir) = lookup("SAGETASK_DATA_DIR")
            && !dir.is_empty()
        {
            self.data_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        if self.api_key.is_empty() {
            return Err(ConfigError::NotConfigured("api_key"));
        }
        Ok(&self.api_key)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn data_dir(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Some(dir.clone());
        }
        Self::project_dirs().map(|p| p.data_dir().to_path_buf())
    }
}
