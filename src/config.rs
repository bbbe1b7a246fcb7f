//! Configuration for recordstore
//!
//! Centralized configuration with sensible defaults. Values can come from
//! the builder, from the process environment, or from both (environment
//! first, explicit overrides after).

use std::path::PathBuf;

use crate::error::{Result, StoreError};

/// Environment variable holding the HTTP port
pub const ENV_PORT: &str = "PORT";

/// Environment variable holding the path of the store file
pub const ENV_BINARY_FILE_PATH: &str = "BINARY_FILE_PATH";

/// Environment variable enabling debug logging
pub const ENV_LOG_DEBUG: &str = "LOG_DEBUG";

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_FILE: &str = "./records.bin";

/// Main configuration for a recordstore instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Path of the slot file (created if absent)
    pub data_file: PathBuf,

    /// When mutations are flushed to stable storage
    pub sync_strategy: SyncStrategy,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// HTTP listen address
    pub listen_addr: String,

    // -------------------------------------------------------------------------
    // Logging
    // -------------------------------------------------------------------------
    /// Default log level is `debug` instead of `info`
    pub log_debug: bool,
}

/// File sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// fsync only when the engine is closed
    OnClose,

    /// fsync after every create/update/delete (safest, slowest)
    EveryWrite,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            sync_strategy: SyncStrategy::OnClose,
            listen_addr: listen_addr_for_port(DEFAULT_PORT),
            log_debug: false,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Load configuration from the process environment
    ///
    /// Reads `PORT`, `BINARY_FILE_PATH` and `LOG_DEBUG`; unset or empty
    /// variables fall back to the defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let mut config = Config::default();

        if let Some(port) = get(ENV_PORT) {
            let port: u16 = port.trim().parse().map_err(|_| {
                StoreError::Config(format!("{} is not a valid port: {:?}", ENV_PORT, port))
            })?;
            config.listen_addr = listen_addr_for_port(port);
        }

        if let Some(path) = get(ENV_BINARY_FILE_PATH) {
            config.data_file = PathBuf::from(path);
        }

        config.log_debug = get(ENV_LOG_DEBUG)
            .and_then(|v| parse_bool(&v))
            .unwrap_or(false);

        Ok(config)
    }
}

/// Listen on all interfaces at the given port
pub fn listen_addr_for_port(port: u16) -> String {
    format!("0.0.0.0:{}", port)
}

/// Parse the boolean spellings accepted for `LOG_DEBUG`
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Start from an existing config (e.g. one loaded from the environment)
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    /// Set the path of the slot file
    pub fn data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_file = path.into();
        self
    }

    /// Set the sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    /// Set the HTTP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Enable or disable debug logging
    pub fn log_debug(mut self, enabled: bool) -> Self {
        self.config.log_debug = enabled;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
