//! Application configuration.
//!
//! A small TOML file supplies defaults for things the CLI can also set per
//! invocation. Missing file means built-in defaults; the file is never
//! written implicitly.
//!
//! # Example
//!
//! ```toml
//! backend = "powershell"
//! command_timeout_secs = 10
//! watch_interval_secs = 3
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{PrnError, Result};
use crate::printer::{Backend, CallOptions};

/// Loaded application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Default spooler backend.
    pub backend: Backend,
    /// Upper bound for any one spawned command, in seconds.
    pub command_timeout_secs: u64,
    /// Poll interval for the watch loop, in seconds.
    pub watch_interval_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Auto,
            command_timeout_secs: 30,
            watch_interval_secs: 5,
        }
    }
}

impl AppConfig {
    /// Load from the default location, falling back to defaults when no
    /// file exists.
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                trace!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load and validate a specific config file.
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading config file");
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)
            .map_err(|e| PrnError::ConfigParse(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Default config file location: `<config_dir>/prn/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("prn").join("config.toml"))
    }

    /// Validate field ranges.
    pub fn validate(&self) -> Result<()> {
        if self.command_timeout_secs == 0 {
            return Err(PrnError::ConfigInvalid(
                "command_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.watch_interval_secs == 0 {
            return Err(PrnError::ConfigInvalid(
                "watch_interval_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// External-call options derived from this config.
    pub fn call_options(&self) -> CallOptions {
        CallOptions {
            timeout: Duration::from_secs(self.command_timeout_secs),
        }
    }

    /// Watch loop interval derived from this config.
    pub fn watch_interval(&self) -> Duration {
        Duration::from_secs(self.watch_interval_secs)
    }
}
