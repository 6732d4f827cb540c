//! CLI Configuration
//!
//! The dispatcher section is handed to the plugin unchanged; the host section
//! controls the simulated host loop.
//!
//! ```toml
//! [dispatcher]
//! hash_version = "2y"
//! executor = "pool"
//! pool_workers = 4
//!
//! [host]
//! tick_interval_ms = 5
//! ```

use std::path::Path;
use std::time::Duration;

use bcrypt_queue_core::DispatcherConfig;
use serde::{Deserialize, Serialize};

use crate::error::{CliError, Result};

/// Settings of the simulated host main loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostLoopConfig {
    /// Delay between two ticks
    pub tick_interval_ms: u64,
    /// How long to wait for every expected callback
    pub wait_timeout_secs: u64,
}

impl Default for HostLoopConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 5,
            wait_timeout_secs: 120,
        }
    }
}

impl HostLoopConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub dispatcher: DispatcherConfig,
    pub host: HostLoopConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.dispatcher.validate()?;
        if self.host.tick_interval_ms == 0 {
            return Err(CliError::Config(
                "tick_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.host.wait_timeout_secs == 0 {
            return Err(CliError::Config(
                "wait_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
