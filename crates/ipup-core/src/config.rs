//! Configuration types for ipup
//!
//! The configuration is a single JSON artifact loaded at process start.
//! Tagged enums select the resolver, publisher, and state store
//! implementations; factories registered in the [`ComponentRegistry`]
//! turn them into live components.
//!
//! [`ComponentRegistry`]: crate::registry::ComponentRegistry

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main ipup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpupConfig {
    /// IP resolver configuration
    pub resolver: ResolverConfig,

    /// Publish destination configuration
    pub publisher: PublisherConfig,

    /// State store configuration
    #[serde(default)]
    pub state_store: StateStoreConfig,

    /// Cycle settings (retry budget, lock)
    #[serde(default)]
    pub cycle: CycleConfig,

    /// Log settings
    #[serde(default)]
    pub log: LogConfig,
}

impl IpupConfig {
    /// Load and parse a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, crate::Error> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::config(format!(
                "failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: Self = serde_json::from_str(&content).map_err(|e| {
            crate::Error::config(format!(
                "failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.resolver.validate()?;
        self.publisher.validate()?;
        self.cycle.validate()?;
        self.log.validate()?;
        Ok(())
    }
}

/// IP resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResolverConfig {
    /// HTTP detection endpoints, tried in order
    Http {
        /// Ordered "what is my IP" service URLs
        #[serde(default = "default_endpoints")]
        endpoints: Vec<String>,
        /// Per-request timeout in seconds
        #[serde(default = "default_request_timeout_secs")]
        timeout_secs: u64,
    },

    /// Custom resolver
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl ResolverConfig {
    /// Validate the resolver configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ResolverConfig::Http {
                endpoints,
                timeout_secs,
            } => {
                if endpoints.is_empty() {
                    return Err(crate::Error::config(
                        "resolver endpoint list cannot be empty",
                    ));
                }
                for url in endpoints {
                    if !url.starts_with("https://") && !url.starts_with("http://") {
                        return Err(crate::Error::config(format!(
                            "resolver endpoint must be an HTTP(S) URL: {}",
                            url
                        )));
                    }
                }
                if *timeout_secs == 0 {
                    return Err(crate::Error::config("resolver timeout must be > 0"));
                }
                Ok(())
            }
            ResolverConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "custom resolver factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config("custom resolver config cannot be null"));
                }
                Ok(())
            }
        }
    }

    /// Get the resolver type name used for registry lookup
    pub fn type_name(&self) -> &str {
        match self {
            ResolverConfig::Http { .. } => "http",
            ResolverConfig::Custom { factory, .. } => factory,
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig::Http {
            endpoints: default_endpoints(),
            timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Publish destination configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PublisherConfig {
    /// Generic HTTP destination (webhook, status endpoint, DNS API gateway)
    Http {
        /// Destination URL
        url: String,
        /// HTTP method to use
        #[serde(default)]
        method: PublishMethod,
        /// Optional bearer token
        #[serde(default)]
        token: Option<String>,
        /// Per-request timeout in seconds
        #[serde(default = "default_request_timeout_secs")]
        timeout_secs: u64,
    },

    /// Custom publisher
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl PublisherConfig {
    /// Validate the publisher configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            PublisherConfig::Http {
                url, timeout_secs, ..
            } => {
                if url.is_empty() {
                    return Err(crate::Error::config("publisher URL cannot be empty"));
                }
                if !url.starts_with("https://") && !url.starts_with("http://") {
                    return Err(crate::Error::config(format!(
                        "publisher URL must be an HTTP(S) URL: {}",
                        url
                    )));
                }
                if *timeout_secs == 0 {
                    return Err(crate::Error::config("publisher timeout must be > 0"));
                }
                Ok(())
            }
            PublisherConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "custom publisher factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "custom publisher config cannot be null",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the publisher type name used for registry lookup
    pub fn type_name(&self) -> &str {
        match self {
            PublisherConfig::Http { .. } => "http",
            PublisherConfig::Custom { factory, .. } => factory,
        }
    }
}

/// HTTP method used to publish the address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishMethod {
    /// POST the address (default)
    #[default]
    Post,
    /// PUT the address
    Put,
}

/// State store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateStoreConfig {
    /// File-based state store
    File {
        /// Path to the state file
        path: String,
    },

    /// In-memory state store (not persistent; every run looks like a first
    /// run)
    Memory,

    /// Custom state store
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl StateStoreConfig {
    /// Get the state store type name used for registry lookup
    pub fn type_name(&self) -> &str {
        match self {
            StateStoreConfig::File { .. } => "file",
            StateStoreConfig::Memory => "memory",
            StateStoreConfig::Custom { factory, .. } => factory,
        }
    }
}

impl Default for StateStoreConfig {
    fn default() -> Self {
        StateStoreConfig::File {
            path: default_state_path(),
        }
    }
}

/// Cycle settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleConfig {
    /// Total publish attempts per cycle (1 = no retries)
    #[serde(default = "default_max_publish_attempts")]
    pub max_publish_attempts: usize,

    /// Delay before the first publish retry, in seconds; doubles per attempt
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// Optional advisory lock file guarding against overlapping invocations
    #[serde(default)]
    pub lock_path: Option<String>,

    /// Publish even when the resolved address matches the stored one
    #[serde(default)]
    pub force: bool,
}

impl CycleConfig {
    /// Validate the cycle configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.max_publish_attempts == 0 {
            return Err(crate::Error::config("max_publish_attempts must be >= 1"));
        }
        if self.max_publish_attempts > 10 {
            return Err(crate::Error::config(format!(
                "max_publish_attempts must be <= 10, got {}",
                self.max_publish_attempts
            )));
        }
        Ok(())
    }

    /// The retry policy described by this configuration
    pub fn retry_policy(&self) -> crate::retry::RetryPolicy {
        crate::retry::RetryPolicy::new(
            self.max_publish_attempts,
            Duration::from_secs(self.retry_delay_secs),
        )
    }
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            max_publish_attempts: default_max_publish_attempts(),
            retry_delay_secs: default_retry_delay_secs(),
            lock_path: None,
            force: false,
        }
    }
}

/// Log settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Append log lines to this file instead of stdout
    #[serde(default)]
    pub path: Option<String>,
}

impl LogConfig {
    /// Validate the log configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(crate::Error::config(format!(
                "invalid log level '{}': expected trace, debug, info, warn, or error",
                other
            ))),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            path: None,
        }
    }
}

fn default_endpoints() -> Vec<String> {
    vec![
        "https://ipinfo.io/ip".to_string(),
        "https://checkip.amazonaws.com".to_string(),
    ]
}

fn default_request_timeout_secs() -> u64 {
    5
}

fn default_max_publish_attempts() -> usize {
    3
}

fn default_retry_delay_secs() -> u64 {
    2
}

fn default_state_path() -> String {
    "ipup_state.json".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}
