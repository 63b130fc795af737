//! Runtime configuration
//!
//! Settings are layered: built-in defaults, then the optional `config.toml`,
//! then command line flags (applied by the binary).

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::monitor::MonitorConfig;

pub const CONFIG_DIR_NAME: &str = "quota-watch";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchConfig {
    pub monitor: MonitorConfig,
    /// Running WebDriver server to use instead of spawning geckodriver
    pub webdriver_url: Option<String>,
    /// geckodriver binary; searched on `PATH` when unset
    pub geckodriver: Option<PathBuf>,
    pub headless: bool,
    /// Also raise a desktop notification for every quota change
    pub notify: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            monitor: MonitorConfig::default(),
            webdriver_url: None,
            geckodriver: None,
            headless: true,
            notify: false,
        }
    }
}

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub offerings_url: Option<String>,
    pub table_id: Option<String>,
    pub interval_secs: Option<u64>,
    pub max_tries: Option<u32>,
    pub retry_delay_ms: Option<u64>,
    pub row_timeout_secs: Option<u64>,
    pub webdriver_url: Option<String>,
    pub geckodriver: Option<PathBuf>,
    pub headless: Option<bool>,
    pub notify: Option<bool>,
}

impl FileConfig {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }
}

impl WatchConfig {
    /// Override defaults with the values present in a config file.
    pub fn apply_file(&mut self, file: FileConfig) {
        if let Some(url) = file.offerings_url {
            self.monitor.offerings_url = url;
        }
        if let Some(table_id) = file.table_id {
            self.monitor.table_id = table_id;
        }
        if let Some(secs) = file.interval_secs {
            self.monitor.poll_interval = Duration::from_secs(secs);
        }
        if let Some(max_tries) = file.max_tries {
            self.monitor.max_tries = max_tries;
        }
        if let Some(ms) = file.retry_delay_ms {
            self.monitor.retry_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = file.row_timeout_secs {
            self.monitor.row_timeout = Some(Duration::from_secs(secs));
        }
        if file.webdriver_url.is_some() {
            self.webdriver_url = file.webdriver_url;
        }
        if file.geckodriver.is_some() {
            self.geckodriver = file.geckodriver;
        }
        if let Some(headless) = file.headless {
            self.headless = headless;
        }
        if let Some(notify) = file.notify {
            self.notify = notify;
        }
    }

    /// Reject settings the monitor cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.monitor.max_tries == 0 {
            bail!("max_tries must be at least 1");
        }
        if self.monitor.poll_interval.is_zero() {
            bail!("interval must be at least 1 second");
        }
        if self.monitor.table_id.trim().is_empty() {
            bail!("table_id cannot be empty");
        }

        let offerings = reqwest::Url::parse(&self.monitor.offerings_url)
            .with_context(|| format!("Invalid offerings_url: {}", self.monitor.offerings_url))?;
        if offerings.query().is_some() {
            bail!("offerings_url must not contain a query string; the course code is appended");
        }

        if let Some(url) = &self.webdriver_url {
            reqwest::Url::parse(url).with_context(|| format!("Invalid webdriver_url: {url}"))?;
        }

        Ok(())
    }
}

/// `<config_dir>/quota-watch/config.toml`, if the platform has a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Load the config file.
///
/// # Arguments
/// * `explicit` - Path given on the command line; must exist
///
/// # Returns
/// * `Ok(Some(FileConfig))` - A config file was found and parsed
/// * `Ok(None)` - No path was given and the default file does not exist
/// * `Err(_)` - The file is missing (explicit path), unreadable or invalid
pub fn load_file_config(explicit: Option<&Path>) -> Result<Option<FileConfig>> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            path.to_path_buf()
        }
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(None),
        },
    };

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config = FileConfig::parse(&content)
        .with_context(|| format!("Invalid config file: {}", path.display()))?;

    Ok(Some(config))
}
