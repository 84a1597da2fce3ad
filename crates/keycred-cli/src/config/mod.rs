//! Configuration management.
//!
//! Bearer tokens are never written here; they come from `--token` or
//! `KEYCRED_GRAPH_TOKEN` on every run.

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::output::OutputFormat;

/// Overrides the config file location (used by tests and CI)
pub const CONFIG_ENV: &str = "KEYCRED_CONFIG";

/// Settable keys with a short description each
pub const KEYS: &[(&str, &str)] = &[
    ("tenant", "Tenant ID or domain used for discovery URLs"),
    ("output_format", "Default output format (pretty/json/yaml)"),
    ("graph_base_url", "Graph endpoint, for national clouds"),
    ("login_base_url", "Identity platform authority, for national clouds"),
    ("timeout_secs", "Request timeout in seconds"),
    ("display_name", "Default display name for uploaded credentials"),
];

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Tenant for discovery URLs.
    pub tenant: Option<String>,

    /// Default output format.
    pub output_format: Option<OutputFormat>,

    /// Graph base URL.
    pub graph_base_url: Option<String>,

    /// Identity platform base URL.
    pub login_base_url: Option<String>,

    /// Request timeout.
    pub timeout_secs: Option<u64>,

    /// Default credential display name.
    pub display_name: Option<String>,
}

impl Config {
    /// Get the config file path.
    pub fn path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }

        let dirs = ProjectDirs::from("", "", "keycred")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load configuration from `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config file {}: {e}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Set a key from its string form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "tenant" => self.tenant = Some(value.to_string()),
            "output_format" | "output" => self.output_format = Some(value.parse()?),
            "graph_base_url" => self.graph_base_url = Some(value.to_string()),
            "login_base_url" => self.login_base_url = Some(value.to_string()),
            "timeout_secs" | "timeout" => {
                let secs: u64 = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("timeout_secs must be a whole number of seconds"))?;
                self.timeout_secs = Some(secs);
            }
            "display_name" => self.display_name = Some(value.to_string()),
            "token" | "graph_token" => anyhow::bail!(
                "Tokens are not stored in the config file.\n\
                 Pass --token or set KEYCRED_GRAPH_TOKEN instead."
            ),
            _ => {
                let available = KEYS
                    .iter()
                    .map(|(k, d)| format!("  {k:<16} - {d}"))
                    .collect::<Vec<_>>()
                    .join("\n");
                anyhow::bail!("Unknown config key: {key}\n\nAvailable keys:\n{available}");
            }
        }
        Ok(())
    }

    /// Request timeout, falling back to the library default.
    pub fn timeout(&self) -> Duration {
        self.timeout_secs
            .map_or(keycred::DEFAULT_TIMEOUT, Duration::from_secs)
    }
}
