//! Creates a valid Google session (access token) that we can use to call the gcal API

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use google_calendar::{AccessToken, Client};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app_config::{self, base_dir};
use crate::commands::authenticate::redirect_uri;

/// Refresh this long before Google's stated expiry
const EXPIRY_MARGIN_SECS: i64 = 60;

pub struct Session {
    account_email: String,
    data: SessionData,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SessionData {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_at: Option<DateTime<Utc>>,
}

impl From<&AccessToken> for SessionData {
    fn from(tokens: &AccessToken) -> Self {
        let expires_at = (tokens.expires_in > 0)
            .then(|| Utc::now() + Duration::seconds(tokens.expires_in));

        SessionData {
            access_token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token.clone(),
            expires_at,
        }
    }
}

impl SessionData {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now + Duration::seconds(EXPIRY_MARGIN_SECS) >= expires_at,
            None => false,
        }
    }
}

impl Session {
    fn path_for_account_email(account_email: &str) -> Result<PathBuf> {
        Ok(base_dir()?
            .join("tokens")
            .join(format!("{}.json", account_slug(account_email))))
    }

    fn path(&self) -> Result<PathBuf> {
        Self::path_for_account_email(&self.account_email)
    }

    pub fn new(account_email: &str, data: SessionData) -> Self {
        Session {
            account_email: account_email.to_string(),
            data,
        }
    }

    pub fn client(&self) -> Result<Client> {
        let creds = app_config::load()?;

        Ok(Client::new(
            creds.client_id,
            creds.client_secret,
            redirect_uri(),
            self.data.access_token.clone(),
            self.data.refresh_token.clone(),
        ))
    }

    /// Load a session and refresh it if expired.
    pub async fn load_valid(account_email: &str) -> Result<Self> {
        let mut session = Self::load(account_email)?;

        if session.data.is_expired(Utc::now()) {
            debug!(account = %account_email, "Access token expired, refreshing");
            session.refresh().await?;
        }

        Ok(session)
    }

    fn load(account_email: &str) -> Result<Self> {
        let path = Self::path_for_account_email(account_email)?;

        if !path.exists() {
            anyhow::bail!(
                "Google OAuth session for {} not found. Run `calmirror auth google` first.",
                account_email
            );
        }

        let contents = std::fs::read_to_string(&path).with_context(|| {
            format!("Failed to read Google OAuth session from {}", path.display())
        })?;

        let data: SessionData = serde_json::from_str(&contents).with_context(|| {
            format!("Failed to parse Google OAuth session from {}", path.display())
        })?;

        Ok(Session::new(account_email, data))
    }

    pub fn save(&self) -> Result<()> {
        let contents =
            serde_json::to_string_pretty(&self.data).context("Failed to serialize session")?;

        let path = self.path()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write session to {}", path.display()))?;

        // Owner-only: the file holds OAuth tokens
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to set permissions on {}", path.display()))?;
        }

        Ok(())
    }

    async fn refresh(&mut self) -> Result<()> {
        let mut tokens = self
            .client()?
            .refresh_access_token()
            .await
            .context("Failed to refresh token")?;

        // Google typically doesn't return a new refresh_token on refresh
        if tokens.refresh_token.is_empty() {
            tokens.refresh_token = self.data.refresh_token.clone();
        }

        self.data = (&tokens).into();
        self.save()
    }
}

fn account_slug(account_email: &str) -> String {
    account_email.replace(['/', '\\', ':'], "_")
}

/// Client for calendar calls on behalf of `account_email`.
pub async fn authed_client(account_email: &str) -> Result<Client> {
    Session::load_valid(account_email).await?.client()
}
