//! calmirror configuration at ~/.config/calmirror/config.toml

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};
use crate::protocol::RemoteConfig;
use crate::provider::{Provider, ProviderDestination};

static DEFAULT_SOURCE_TIMEZONE: &str = "UTC";

fn default_source_timezone() -> String {
    DEFAULT_SOURCE_TIMEZONE.to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Exported `.ics` file to mirror. `--ics` takes precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ics_path: Option<String>,

    /// Zone for floating times, all-day dates and TZIDs chrono-tz does not know
    #[serde(default = "default_source_timezone")]
    pub source_timezone: String,

    /// Append the run log to this file as well
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,

    pub destination: DestinationConfig,
}

/// The `[destination]` table: a provider name plus whatever keys that
/// provider needs (account, calendar id, ...).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DestinationConfig {
    pub provider: Provider,
    #[serde(flatten)]
    pub params: HashMap<String, toml::Value>,
}

impl DestinationConfig {
    /// Provider-specific keys as sent with every provider request.
    pub fn remote_config(&self) -> RemoteConfig {
        self.params
            .iter()
            .filter_map(|(k, v)| serde_json::to_value(v).ok().map(|v| (k.clone(), v)))
            .collect()
    }

    pub fn destination(&self) -> ProviderDestination {
        ProviderDestination::new(self.provider.clone(), self.remote_config())
    }
}

impl Config {
    pub fn config_dir() -> SyncResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SyncError::Config("Could not determine config directory".into()))?
            .join("calmirror");
        Ok(config_dir)
    }

    pub fn default_path() -> SyncResult<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load the config file, explaining how to create it when it is missing.
    pub fn load(path: &Path) -> SyncResult<Config> {
        if !path.exists() {
            return Err(SyncError::Config(format!(
                "Config file not found at {}\n\n\
                Create it with the calendar to mirror and where to mirror it:\n\n\
                ics_path = \"~/Documents/outlook-export.ics\"\n\
                source_timezone = \"Europe/Amsterdam\"\n\n\
                [destination]\n\
                provider = \"google\"\n\
                google_account = \"you@gmail.com\"\n\
                google_calendar_id = \"primary\"\n\n\
                Run `calmirror auth google` first to connect the account.",
                path.display()
            )));
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            SyncError::Config(format!("Failed to read config file at {}: {e}", path.display()))
        })?;

        Self::from_toml(&contents).map_err(|e| match e {
            SyncError::Config(msg) => SyncError::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    pub fn from_toml(contents: &str) -> SyncResult<Config> {
        let config: Config =
            toml::from_str(contents).map_err(|e| SyncError::Config(e.to_string()))?;
        config.source_tz()?;
        Ok(config)
    }

    pub fn source_tz(&self) -> SyncResult<Tz> {
        self.source_timezone.parse::<Tz>().map_err(|_| {
            SyncError::Config(format!(
                "Unknown source_timezone '{}', expected an IANA name such as Europe/Berlin",
                self.source_timezone
            ))
        })
    }

    /// The calendar file to read, `cli_override` first.
    pub fn ics_path(&self, cli_override: Option<&Path>) -> SyncResult<PathBuf> {
        if let Some(path) = cli_override {
            return Ok(path.to_path_buf());
        }
        self.ics_path
            .as_deref()
            .map(expand_path)
            .ok_or_else(|| SyncError::Config("No ics_path configured and no --ics given".into()))
    }

    pub fn log_file(&self) -> Option<PathBuf> {
        self.log_file.as_deref().map(expand_path)
    }
}

/// Expand `~` and environment variables in a configured path.
pub fn expand_path(path: &str) -> PathBuf {
    match shellexpand::full(path) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(shellexpand::tilde(path).as_ref()),
    }
}
