//! Configuration management for linkdrop.
//!
//! Configuration is read from `~/.config/linkdrop/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is
//! created. Missing fields fall back to defaults.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::app::{LinkdropError, Result};

pub const DEFAULT_FAVICON_ENDPOINT: &str = "https://www.google.com/s2/favicons?sz=128&domain=";
pub const DEFAULT_STAGE_TIMEOUT_SECS: u64 = 10;
pub const USER_AGENT: &str = concat!("linkdrop/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Override for the shared store path. `None` means the platform data
    /// directory.
    pub db_path: Option<PathBuf>,
    /// Favicon-by-domain endpoint; the URL host is appended verbatim.
    pub favicon_endpoint: String,
    /// Upper bound on each thumbnail resolution stage.
    pub stage_timeout_secs: u64,
    /// User agent sent with metadata and image requests.
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: None,
            favicon_endpoint: DEFAULT_FAVICON_ENDPOINT.to_string(),
            stage_timeout_secs: DEFAULT_STAGE_TIMEOUT_SECS,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default path, creating a commented
    /// default file if none exists.
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| LinkdropError::Config(format!("{}: {}", config_path.display(), e)))?;

        Ok(config)
    }

    /// `~/.config/linkdrop/config.toml`
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| LinkdropError::Config("Could not find config directory".into()))?;
        Ok(config_dir.join("linkdrop").join("config.toml"))
    }

    pub fn stage_timeout(&self) -> Duration {
        Duration::from_secs(self.stage_timeout_secs)
    }

    fn create_default_config(path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = fs::File::create(path)?;
        file.write_all(Self::default_config_content().as_bytes())?;

        Ok(())
    }

    fn default_config_content() -> String {
        format!(
            r##"# linkdrop configuration
#
# db_path: override the shared store location (defaults to the platform
#          data directory, e.g. ~/.local/share/linkdrop/linkdrop.db)
# db_path = "/path/to/linkdrop.db"

# Favicon-by-domain service; the URL host is appended to this prefix.
favicon_endpoint = "{DEFAULT_FAVICON_ENDPOINT}"

# Upper bound, in seconds, on each thumbnail resolution stage.
stage_timeout_secs = {DEFAULT_STAGE_TIMEOUT_SECS}

# User agent sent with metadata and image requests.
user_agent = "{USER_AGENT}"
"##
        )
    }
}
