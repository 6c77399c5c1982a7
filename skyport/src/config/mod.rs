//! Persistent tool configuration.
//!
//! Settings live in an INI file at `~/.config/skyport/config.ini`:
//!
//! ```ini
//! [remote]
//! endpoint = https://bundles.example.com
//! channel = stable
//!
//! [sync]
//! dir = /srv/bundles
//! concurrency = 4
//! clean = true
//! ```
//!
//! Command-line flags always take precedence over config values; the
//! config supplies defaults so routine invocations stay short.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::Ini;
use thiserror::Error;

/// Name of the directory under the user config root.
const CONFIG_DIR: &str = "skyport";
/// Name of the config file itself.
const CONFIG_FILE: &str = "config.ini";

/// Errors from config handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform reports no user config directory.
    #[error("could not determine the user config directory")]
    NoConfigDir,

    /// Reading or writing the config file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid INI.
    #[error("failed to parse config file: {0}")]
    Parse(String),

    /// A `section.key` name that this tool does not define.
    #[error("unknown configuration key: {0}")]
    UnknownKey(String),

    /// A value that does not parse for its key.
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// `[remote]` section: where bundles come from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteSection {
    /// Catalog server base URL.
    pub endpoint: Option<String>,
    /// Default release channel.
    pub channel: Option<String>,
}

/// `[sync]` section: how bundles are installed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSection {
    /// Default destination directory.
    pub dir: Option<PathBuf>,
    /// Default parallel download bound.
    pub concurrency: Option<usize>,
    /// Whether sync cleans the destination by default.
    pub clean: bool,
}

/// The parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    /// Remote catalog settings.
    pub remote: RemoteSection,
    /// Sync behavior settings.
    pub sync: SyncSection,
}

impl ConfigFile {
    /// Path of the config file for the current user.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(base.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load the user's config; a missing file yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load a config from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let ini =
            Ini::load_from_file(path).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let mut config = Self::default();
        if let Some(section) = ini.section(Some("remote")) {
            config.remote.endpoint = section.get("endpoint").map(str::to_string);
            config.remote.channel = section.get("channel").map(str::to_string);
        }
        if let Some(section) = ini.section(Some("sync")) {
            config.sync.dir = section.get("dir").map(PathBuf::from);
            if let Some(raw) = section.get("concurrency") {
                let parsed =
                    raw.parse::<usize>()
                        .map_err(|_| ConfigError::InvalidValue {
                            key: "sync.concurrency".to_string(),
                            value: raw.to_string(),
                        })?;
                config.sync.concurrency = Some(parsed);
            }
            if let Some(raw) = section.get("clean") {
                config.sync.clean = parse_bool(raw).ok_or_else(|| ConfigError::InvalidValue {
                    key: "sync.clean".to_string(),
                    value: raw.to_string(),
                })?;
            }
        }
        Ok(config)
    }

    /// Save to the user's config path.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Save to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let mut ini = Ini::new();
        {
            let mut section = ini.with_section(Some("remote"));
            if let Some(endpoint) = &self.remote.endpoint {
                section.set("endpoint", endpoint.clone());
            }
            if let Some(channel) = &self.remote.channel {
                section.set("channel", channel.clone());
            }
        }
        {
            let mut section = ini.with_section(Some("sync"));
            if let Some(dir) = &self.sync.dir {
                section.set("dir", dir.to_string_lossy().to_string());
            }
            if let Some(concurrency) = self.sync.concurrency {
                section.set("concurrency", concurrency.to_string());
            }
            if self.sync.clean {
                section.set("clean", "true");
            }
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        ini.write_to_file(path)?;
        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}

/// A `section.key` configuration setting addressable from the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    /// `remote.endpoint`
    RemoteEndpoint,
    /// `remote.channel`
    RemoteChannel,
    /// `sync.dir`
    SyncDir,
    /// `sync.concurrency`
    SyncConcurrency,
    /// `sync.clean`
    SyncClean,
}

impl ConfigKey {
    /// All keys, grouped by section.
    pub fn all() -> &'static [ConfigKey] {
        &[
            Self::RemoteEndpoint,
            Self::RemoteChannel,
            Self::SyncDir,
            Self::SyncConcurrency,
            Self::SyncClean,
        ]
    }

    /// Full `section.key` name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RemoteEndpoint => "remote.endpoint",
            Self::RemoteChannel => "remote.channel",
            Self::SyncDir => "sync.dir",
            Self::SyncConcurrency => "sync.concurrency",
            Self::SyncClean => "sync.clean",
        }
    }

    /// INI section this key lives in.
    pub fn section(&self) -> &'static str {
        match self {
            Self::RemoteEndpoint | Self::RemoteChannel => "remote",
            Self::SyncDir | Self::SyncConcurrency | Self::SyncClean => "sync",
        }
    }

    /// Key name within its section.
    pub fn key_name(&self) -> &'static str {
        match self {
            Self::RemoteEndpoint => "endpoint",
            Self::RemoteChannel => "channel",
            Self::SyncDir => "dir",
            Self::SyncConcurrency => "concurrency",
            Self::SyncClean => "clean",
        }
    }

    /// Current value as a display string; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            Self::RemoteEndpoint => config.remote.endpoint.clone().unwrap_or_default(),
            Self::RemoteChannel => config.remote.channel.clone().unwrap_or_default(),
            Self::SyncDir => config
                .sync
                .dir
                .as_ref()
                .map(|d| d.to_string_lossy().to_string())
                .unwrap_or_default(),
            Self::SyncConcurrency => config
                .sync
                .concurrency
                .map(|n| n.to_string())
                .unwrap_or_default(),
            Self::SyncClean => config.sync.clean.to_string(),
        }
    }

    /// Set this key from a string value.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        match self {
            Self::RemoteEndpoint => config.remote.endpoint = Some(value.to_string()),
            Self::RemoteChannel => config.remote.channel = Some(value.to_string()),
            Self::SyncDir => config.sync.dir = Some(PathBuf::from(value)),
            Self::SyncConcurrency => {
                config.sync.concurrency =
                    Some(value.parse::<usize>().map_err(|_| {
                        ConfigError::InvalidValue {
                            key: self.name().to_string(),
                            value: value.to_string(),
                        }
                    })?);
            }
            Self::SyncClean => {
                config.sync.clean =
                    parse_bool(value).ok_or_else(|| ConfigError::InvalidValue {
                        key: self.name().to_string(),
                        value: value.to_string(),
                    })?;
            }
        }
        Ok(())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::all()
            .iter()
            .find(|key| key.name() == s)
            .copied()
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}
