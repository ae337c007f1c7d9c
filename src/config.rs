use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable that overrides `api.base_url`.
pub const API_URL_ENV: &str = "DRIVE_MEDIA_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_check_path")]
    pub check_path: String,
    #[serde(default = "default_resolve_path")]
    pub resolve_path: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_check_path() -> String {
    "/api/drive/check-access".to_string()
}

fn default_resolve_path() -> String {
    "/api/drive/resolve".to_string()
}

fn default_timeout_secs() -> u64 {
    12
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            check_path: default_check_path(),
            resolve_path: default_resolve_path(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl ValidationConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn default_debounce_ms() -> u64 {
    500
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_enabled() -> bool {
    true
}

fn default_ttl_secs() -> u64 {
    300
}

fn default_max_entries() -> usize {
    256
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            ttl_secs: default_ttl_secs(),
            max_entries: default_max_entries(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

impl Config {
    fn apply_env(mut self) -> Self {
        if let Ok(base_url) = env::var(API_URL_ENV) {
            if !base_url.trim().is_empty() {
                tracing::info!(base_url = %base_url, "Using API base URL from {}", API_URL_ENV);
                self.api.base_url = base_url.trim().to_string();
            }
        }
        self
    }
}

fn config_dir() -> PathBuf {
    // ~/.config/drive-media on every platform, matching the other tools
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("drive-media")
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.yml")
}

pub fn parse_config(contents: &str) -> Result<Config, serde_yaml::Error> {
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml::from_str(contents)
}

pub fn get_config() -> Result<Config, Box<dyn std::error::Error>> {
    let path = config_path();
    let config = if path.exists() {
        let contents = fs::read_to_string(&path)?;
        parse_config(&contents)?
    } else {
        tracing::debug!(path = %path.display(), "No config file, using defaults");
        Config::default()
    };
    Ok(config.apply_env())
}

pub fn save_config(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let contents = serde_yaml::to_string(config)?;
    fs::write(path, contents)?;
    Ok(())
}
