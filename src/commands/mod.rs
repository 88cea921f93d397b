pub mod auth;
pub mod status;
pub mod sync;

use std::path::{Path, PathBuf};

use anyhow::Result;
use calmirror_core::config::Config;
use calmirror_core::ics;
use calmirror_core::provider::ProviderDestination;
use calmirror_core::SourceEvent;
use tracing::info;

/// Everything a status or sync run needs, loaded once at startup.
pub struct Context {
    pub config: Config,
    pub ics_path: PathBuf,
}

impl Context {
    pub fn load(config_path: Option<&Path>, ics_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_path {
            Some(path) => path.to_path_buf(),
            None => Config::default_path()?,
        };
        let config = Config::load(&config_path)?;
        let ics_path = config.ics_path(ics_override.as_deref())?;

        Ok(Context { config, ics_path })
    }

    /// Parse the exported calendar. A missing or unreadable file ends the run.
    pub fn source_events(&self) -> Result<Vec<SourceEvent>> {
        let events = ics::read_file(&self.ics_path, self.config.source_tz()?)?;
        info!(
            count = events.len(),
            path = %self.ics_path.display(),
            "Read source calendar"
        );
        Ok(events)
    }

    pub fn destination(&self) -> ProviderDestination {
        self.config.destination.destination()
    }
}
