use std::collections::BTreeMap;

use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;
use tracing::warn;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Named route patterns, e.g. `question = "/questions/{question_id}"`.
    #[serde(default)]
    pub routes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    #[serde(default = "default_app_name")]
    pub name: String,
}

impl Default for AppSection {
    fn default() -> Self { Self { name: default_app_name() } }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
    #[serde(default)]
    pub default_ttl_secs: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self { Self { max_capacity: default_max_capacity(), default_ttl_secs: None } }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_root")]
    pub root: String,
}

impl Default for StorageConfig {
    fn default() -> Self { Self { root: default_storage_root() } }
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Json => "json",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

fn default_app_name() -> String { "forum".into() }
fn default_max_capacity() -> u64 { 10_000 }
fn default_storage_root() -> String { "data".into() }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `CONFIG_PATH`, falling back to defaults when the file is absent.
    pub fn load_and_validate() -> Result<Self> {
        Self::validated_or_default(load_default())
    }

    /// Finish a [`load_default`] result: defaults on failure, then
    /// [`AppConfig::normalize_and_validate`]. Callers that must set up logging
    /// from the loaded format first load, then call this.
    pub fn validated_or_default(loaded: Result<AppConfig>) -> Result<Self> {
        let mut cfg = match loaded {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(error = %e, "config file unavailable; using defaults");
                AppConfig::default()
            }
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        if self.app.name.trim().is_empty() {
            self.app.name = default_app_name();
        }
        self.storage.normalize_from_env();
        self.storage.validate()?;
        self.cache.validate()?;
        for (name, pattern) in &self.routes {
            if name.trim().is_empty() {
                return Err(anyhow!("routes: route name must not be empty"));
            }
            if !pattern.starts_with('/') {
                return Err(anyhow!("routes.{name}: pattern must start with '/'"));
            }
        }
        Ok(())
    }
}

impl StorageConfig {
    pub fn normalize_from_env(&mut self) {
        if let Ok(root) = std::env::var("STORAGE_ROOT") {
            if !root.trim().is_empty() {
                self.root = root;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.root.trim().is_empty() {
            return Err(anyhow!("storage.root is empty; set it in config.toml or STORAGE_ROOT"));
        }
        Ok(())
    }
}

impl CacheConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_capacity == 0 {
            return Err(anyhow!("cache.max_capacity must be >= 1"));
        }
        if self.default_ttl_secs == Some(0) {
            return Err(anyhow!("cache.default_ttl_secs must be a positive number of seconds"));
        }
        Ok(())
    }
}
