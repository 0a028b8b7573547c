//! # Client Configuration
//!
//! API location, retry policy and storage path for the storefront client.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TIENDA_API_URL=https://api.example.com                             │
//! │     TIENDA_MAX_RETRIES=5                                               │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/storefront/storefront.toml (Linux)                       │
//! │     ~/Library/Application Support/com.tienda.storefront/ (macOS)       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     3 retries, 1000 ms apart, 10000 ms timeout                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # storefront.toml
//! [api]
//! base_url = "https://eedlh-web-back.onrender.com"
//!
//! [retry]
//! max_retries = 3
//! retry_delay_ms = 1000
//! timeout_ms = 10000
//! backoff = "constant"   # constant | exponential
//! max_delay_ms = 30000   # cap for exponential
//!
//! [admin]
//! max_retries = 0
//!
//! [storage]
//! path = "/var/lib/storefront/storage.json"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};
use crate::fetcher::{BackoffStrategy, RetryPolicy};

/// Default storefront API.
pub const DEFAULT_API_URL: &str = "https://eedlh-web-back.onrender.com";

// =============================================================================
// Backoff Kind
// =============================================================================

/// Delay growth between retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffKind {
    /// Same delay before every retry.
    #[default]
    Constant,

    /// Delay doubles after each retry, up to `max_delay_ms`.
    Exponential,
}

impl std::fmt::Display for BackoffKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackoffKind::Constant => write!(f, "constant"),
            BackoffKind::Exponential => write!(f, "exponential"),
        }
    }
}

impl std::str::FromStr for BackoffKind {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "constant" | "fixed" => Ok(BackoffKind::Constant),
            "exponential" | "exp" => Ok(BackoffKind::Exponential),
            other => Err(ClientError::InvalidConfig(format!(
                "Unknown backoff: '{}'. Valid options: constant, exponential",
                other
            ))),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

/// Where the storefront API lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_api_url")]
    pub base_url: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_api_url(),
        }
    }
}

/// Retry behaviour for shop requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Retries after the first attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before each retry (milliseconds).
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,

    /// Per-attempt timeout (milliseconds). Must be > 0.
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,

    #[serde(default)]
    pub backoff: BackoffKind,

    /// Upper bound for exponential delays (milliseconds).
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
}

fn default_max_retries() -> u32 {
    3
}
fn default_retry_delay() -> u64 {
    1000
}
fn default_timeout() -> u64 {
    10_000
}
fn default_max_delay() -> u64 {
    30_000
}

impl Default for RetrySettings {
    fn default() -> Self {
        RetrySettings {
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay(),
            timeout_ms: default_timeout(),
            backoff: BackoffKind::default(),
            max_delay_ms: default_max_delay(),
        }
    }
}

/// Admin page requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminSettings {
    /// Retries for admin calls. The admin page makes single attempts.
    #[serde(default)]
    pub max_retries: u32,
}

/// Where the cart and admin session are kept on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Storage file; defaults to the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

// =============================================================================
// Main Client Configuration
// =============================================================================

/// Complete client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub retry: RetrySettings,

    #[serde(default)]
    pub admin: AdminSettings,

    #[serde(default)]
    pub storage: StorageSettings,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (storefront.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading storefront config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load storefront config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ClientError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Storefront config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        let url = Url::parse(&self.api.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(format!(
                "API URL must start with http:// or https://, got: {}",
                self.api.base_url
            )));
        }

        if self.retry.timeout_ms == 0 {
            return Err(ClientError::InvalidConfig(
                "timeout_ms must be greater than 0".into(),
            ));
        }

        if self.retry.backoff == BackoffKind::Exponential
            && self.retry.max_delay_ms < self.retry.retry_delay_ms
        {
            return Err(ClientError::InvalidConfig(
                "max_delay_ms must be at least retry_delay_ms".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup.
    ///
    /// Unparseable numbers are ignored with a warning.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("TIENDA_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Some(value) = lookup("TIENDA_MAX_RETRIES") {
            match value.parse::<u32>() {
                Ok(n) => self.retry.max_retries = n,
                Err(_) => warn!(value = %value, "Ignoring invalid TIENDA_MAX_RETRIES"),
            }
        }

        if let Some(value) = lookup("TIENDA_RETRY_DELAY_MS") {
            match value.parse::<u64>() {
                Ok(ms) => self.retry.retry_delay_ms = ms,
                Err(_) => warn!(value = %value, "Ignoring invalid TIENDA_RETRY_DELAY_MS"),
            }
        }

        if let Some(value) = lookup("TIENDA_TIMEOUT_MS") {
            match value.parse::<u64>() {
                Ok(ms) => self.retry.timeout_ms = ms,
                Err(_) => warn!(value = %value, "Ignoring invalid TIENDA_TIMEOUT_MS"),
            }
        }

        if let Some(value) = lookup("TIENDA_BACKOFF") {
            match value.parse::<BackoffKind>() {
                Ok(kind) => self.retry.backoff = kind,
                Err(_) => warn!(value = %value, "Unknown backoff in environment"),
            }
        }

        if let Some(path) = lookup("TIENDA_STORAGE_PATH") {
            self.storage.path = Some(PathBuf::from(path));
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "tienda", "storefront")
            .map(|dirs| dirs.config_dir().join("storefront.toml"))
    }

    /// Storage file: the configured path or `storage.json` in the platform
    /// data directory.
    pub fn storage_path(&self) -> Option<PathBuf> {
        self.storage.path.clone().or_else(|| {
            directories::ProjectDirs::from("com", "tienda", "storefront")
                .map(|dirs| dirs.data_dir().join("storage.json"))
        })
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn base_url(&self) -> &str {
        &self.api.base_url
    }

    /// Retry policy for shop requests (catalog, orders).
    pub fn retry_policy(&self) -> ClientResult<RetryPolicy> {
        let policy = RetryPolicy::new(
            self.retry.max_retries,
            Duration::from_millis(self.retry.retry_delay_ms),
            Duration::from_millis(self.retry.timeout_ms),
        )?;

        Ok(match self.retry.backoff {
            BackoffKind::Constant => policy,
            BackoffKind::Exponential => policy.with_backoff(BackoffStrategy::Exponential {
                max_delay: Duration::from_millis(self.retry.max_delay_ms),
            }),
        })
    }

    /// Retry policy for admin requests: same timeout and delay, admin retry
    /// count.
    pub fn admin_retry_policy(&self) -> ClientResult<RetryPolicy> {
        RetryPolicy::new(
            self.admin.max_retries,
            Duration::from_millis(self.retry.retry_delay_ms),
            Duration::from_millis(self.retry.timeout_ms),
        )
    }

    /// Reads a config file without applying env overrides; used by tests and
    /// tooling that want the file alone.
    pub fn from_file(path: &Path) -> ClientResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url(), DEFAULT_API_URL);
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.retry.retry_delay_ms, 1000);
        assert_eq!(config.retry.timeout_ms, 10_000);
        assert_eq!(config.retry.backoff, BackoffKind::Constant);
        assert_eq!(config.admin.max_retries, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ClientConfig::default();

        config.api.base_url = "ftp://example.com".to_string();
        assert!(matches!(config.validate(), Err(ClientError::InvalidUrl(_))));

        config.api.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.api.base_url = "http://localhost:3000".to_string();
        assert!(config.validate().is_ok());

        config.retry.timeout_ms = 0;
        assert!(matches!(config.validate(), Err(ClientError::InvalidConfig(_))));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            [retry]
            max_retries = 5
            backoff = "exponential"
            "#,
        )
        .unwrap();

        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.retry.retry_delay_ms, 1000);
        assert_eq!(config.retry.backoff, BackoffKind::Exponential);
        assert_eq!(config.base_url(), DEFAULT_API_URL);
    }

    #[test]
    fn test_overrides() {
        let mut config = ClientConfig::default();
        config.apply_overrides(lookup(&[
            ("TIENDA_API_URL", "http://localhost:8080"),
            ("TIENDA_MAX_RETRIES", "1"),
            ("TIENDA_TIMEOUT_MS", "oops"),
            ("TIENDA_BACKOFF", "exponential"),
            ("TIENDA_STORAGE_PATH", "/tmp/tienda.json"),
        ]));

        assert_eq!(config.base_url(), "http://localhost:8080");
        assert_eq!(config.retry.max_retries, 1);
        assert_eq!(config.retry.timeout_ms, 10_000);
        assert_eq!(config.retry.backoff, BackoffKind::Exponential);
        assert_eq!(config.storage_path(), Some(PathBuf::from("/tmp/tienda.json")));
    }

    #[test]
    fn test_retry_policies() {
        let config = ClientConfig::default();
        let policy = config.retry_policy().unwrap();
        assert_eq!(policy.max_retries(), 3);
        assert_eq!(policy.timeout(), Duration::from_secs(10));

        let admin = config.admin_retry_policy().unwrap();
        assert_eq!(admin.max_retries(), 0);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storefront.toml");

        let mut config = ClientConfig::default();
        config.retry.max_retries = 7;
        config.save(Some(path.clone())).unwrap();

        let loaded = ClientConfig::from_file(&path).unwrap();
        assert_eq!(loaded.retry.max_retries, 7);
    }

    #[test]
    fn test_backoff_kind_parsing() {
        assert_eq!("constant".parse::<BackoffKind>().unwrap(), BackoffKind::Constant);
        assert_eq!("EXPONENTIAL".parse::<BackoffKind>().unwrap(), BackoffKind::Exponential);
        assert!("linear".parse::<BackoffKind>().is_err());
    }
}
