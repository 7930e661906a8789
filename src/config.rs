use std::env;
use std::str::FromStr;
use std::time::Duration;

use dotenvy::dotenv;

use crate::error::ConfigError;

pub const DEFAULT_CATALOG_PATH: &str = "index.json";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_BATCH_SIZE: usize = 3;
pub const DEFAULT_MAX_ITEMS: usize = 5;

/// Process configuration, built once at startup and handed to whatever needs it.
#[derive(Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub catalog_path: String,
    pub bind_addr: String,
    pub base_url: String,
    pub model: String,
    pub request_timeout: Duration,
    pub batch_size: usize,
    pub max_items: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            catalog_path: DEFAULT_CATALOG_PATH.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            request_timeout: Duration::from_secs(60),
            batch_size: DEFAULT_BATCH_SIZE,
            max_items: DEFAULT_MAX_ITEMS,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("catalog_path", &self.catalog_path)
            .field("bind_addr", &self.bind_addr)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("request_timeout", &self.request_timeout)
            .field("batch_size", &self.batch_size)
            .field("max_items", &self.max_items)
            .finish()
    }
}

impl Config {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        let defaults = Self::default();
        Ok(Self {
            api_key: get_env("API_KEY").filter(|k| !k.is_empty()),
            catalog_path: get_env_or_default("CATALOG_PATH", &defaults.catalog_path),
            bind_addr: get_env_or_default("BIND_ADDR", &defaults.bind_addr),
            base_url: get_env_or_default("OPENAI_BASE_URL", &defaults.base_url),
            model: get_env_or_default("SUMMARY_MODEL", &defaults.model),
            request_timeout: Duration::from_secs(parse_env("REQUEST_TIMEOUT_SECS", 60)?),
            batch_size: parse_env("BATCH_SIZE", defaults.batch_size)?,
            max_items: parse_env("MAX_ITEMS", defaults.max_items)?,
        })
    }

    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .ok_or(ConfigError::MissingVar("API_KEY"))
    }
}

fn get_env(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        Err(_) => Ok(default),
    }
}

#[test]
fn test_require_api_key() {
    let mut config = Config::default();
    assert!(matches!(
        config.require_api_key(),
        Err(ConfigError::MissingVar("API_KEY"))
    ));

    config.api_key = Some("sk-test".to_string());
    assert_eq!(config.require_api_key().unwrap(), "sk-test");
    assert!(!format!("{:?}", config).contains("sk-test"));
}
