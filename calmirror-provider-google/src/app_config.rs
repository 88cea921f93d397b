//! App-level configuration for the Google provider.
//!
//! User-provided OAuth credentials stored at:
//!   ~/.config/calmirror/providers/google/app_config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Google OAuth client credentials (user-provided).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

pub fn base_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Could not determine config directory")?
        .join("calmirror")
        .join("providers")
        .join("google"))
}

pub fn load() -> Result<Credentials> {
    let path = base_dir()?.join("app_config.toml");

    if !path.exists() {
        anyhow::bail!(
            "Google credentials not found.\n\n\
            Create {} with:\n\n\
            client_id = \"your-client-id.apps.googleusercontent.com\"\n\
            client_secret = \"your-client-secret\"\n\n\
            Create a Desktop OAuth client at https://console.cloud.google.com/apis/credentials \
            with the Google Calendar API enabled.",
            path.display()
        );
    }

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read credentials from {}", path.display()))?;

    parse(&contents).with_context(|| format!("Failed to parse credentials from {}", path.display()))
}

fn parse(contents: &str) -> Result<Credentials> {
    Ok(toml::from_str(contents)?)
}
