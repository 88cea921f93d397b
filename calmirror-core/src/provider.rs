//! Provider subprocess client.
//!
//! This module handles communication with external provider binaries
//! (e.g., `calmirror-provider-google`) using JSON over stdin/stdout.
//!
//! Providers manage their own credentials and tokens. The core only passes
//! the `[destination]` config table along with every request.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::destination::Destination;
use crate::error::{SyncError, SyncResult};
use crate::event::{CanonicalEvent, DestinationEvent};
use crate::protocol::{
    Authenticate, Command, DeleteEvent, ErrorKind, GetTimeZone, InsertEvent, ListEvents,
    ListInstances, ProviderCommand, RemoteConfig, Request, Response, UpdateEvent, UpdateInstance,
};

/// Listing a large calendar takes several pages.
const PROVIDER_TIMEOUT: Duration = Duration::from_secs(60);
/// Authentication waits for the user to finish in the browser.
const AUTH_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Provider(String);

impl Provider {
    pub fn from_name(name: &str) -> Self {
        Provider(name.to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn binary_name(&self) -> String {
        format!("calmirror-provider-{}", self.0)
    }

    fn binary_path(&self) -> SyncResult<PathBuf> {
        let binary_name = self.binary_name();
        which::which(&binary_name).map_err(|_| SyncError::ProviderNotInstalled(binary_name))
    }

    /// Run the provider's interactive login. Returns the account identifier.
    pub async fn authenticate(&self) -> SyncResult<String> {
        self.call_with_timeout(Authenticate {}, AUTH_TIMEOUT).await
    }

    /// Call a typed provider command and return the result.
    ///
    /// The response type is inferred from the command's associated type.
    pub async fn call<C: ProviderCommand>(&self, cmd: C) -> SyncResult<C::Response> {
        self.call_with_timeout(cmd, PROVIDER_TIMEOUT).await
    }

    async fn call_with_timeout<C: ProviderCommand>(
        &self,
        cmd: C,
        limit: Duration,
    ) -> SyncResult<C::Response> {
        timeout(limit, self.call_raw(C::command(), cmd))
            .await
            .map_err(|_| SyncError::ProviderTimeout(limit.as_secs()))?
    }

    /// Low-level call that sends a command with params and deserializes the response.
    async fn call_raw<P: Serialize, R: serde::de::DeserializeOwned>(
        &self,
        command: Command,
        params: P,
    ) -> SyncResult<R> {
        let params =
            serde_json::to_value(params).map_err(|e| SyncError::Serialization(e.to_string()))?;
        let request = Request { command, params };
        let request_json =
            serde_json::to_string(&request).map_err(|e| SyncError::Serialization(e.to_string()))?;

        let binary_path = self.binary_path()?;
        debug!(provider = %self.0, ?command, "Calling provider");

        let mut child = TokioCommand::new(&binary_path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                SyncError::Provider(format!("Failed to spawn {}: {}", binary_path.display(), e))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| SyncError::Provider("Provider stdin unavailable".into()))?;
        stdin
            .write_all(format!("{request_json}\n").as_bytes())
            .await?;
        drop(stdin);

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            return Err(SyncError::Provider(format!(
                "Provider exited with status: {}",
                output.status.code().unwrap_or(-1)
            )));
        }

        let response_str = String::from_utf8_lossy(&output.stdout);
        if response_str.trim().is_empty() {
            return Err(SyncError::Provider("Provider returned no response".into()));
        }

        parse_response(&response_str)
    }
}

fn parse_response<R: serde::de::DeserializeOwned>(line: &str) -> SyncResult<R> {
    let response: Response<R> = serde_json::from_str(line.trim())
        .map_err(|e| SyncError::Provider(format!("Failed to parse response: {}", e)))?;

    match response {
        Response::Success { data } => Ok(data),
        Response::Error {
            error,
            kind: ErrorKind::Connectivity,
        } => Err(SyncError::Connectivity(error)),
        Response::Error {
            error,
            kind: ErrorKind::Other,
        } => Err(SyncError::Provider(error)),
    }
}

/// A calendar reached through a provider binary.
pub struct ProviderDestination {
    provider: Provider,
    remote_config: RemoteConfig,
}

impl ProviderDestination {
    pub fn new(provider: Provider, remote_config: RemoteConfig) -> Self {
        ProviderDestination {
            provider,
            remote_config,
        }
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    fn config(&self) -> RemoteConfig {
        self.remote_config.clone()
    }
}

#[async_trait]
impl Destination for ProviderDestination {
    async fn get_time_zone(&self) -> SyncResult<String> {
        self.provider
            .call(GetTimeZone {
                remote_config: self.config(),
            })
            .await
    }

    async fn list_events(&self) -> SyncResult<Vec<DestinationEvent>> {
        self.provider
            .call(ListEvents {
                remote_config: self.config(),
            })
            .await
    }

    async fn list_instances(&self, parent_id: &str) -> Vec<DestinationEvent> {
        let result = self
            .provider
            .call(ListInstances {
                remote_config: self.config(),
                event_id: parent_id.to_string(),
            })
            .await;

        match result {
            Ok(instances) => instances,
            Err(e) => {
                warn!(id = %parent_id, error = %e, "Could not list instances");
                Vec::new()
            }
        }
    }

    async fn insert(&self, event: &CanonicalEvent) -> SyncResult<String> {
        self.provider
            .call(InsertEvent {
                remote_config: self.config(),
                event: event.clone(),
            })
            .await
    }

    async fn update(&self, event: &CanonicalEvent, id: &str) -> SyncResult<String> {
        self.provider
            .call(UpdateEvent {
                remote_config: self.config(),
                event_id: id.to_string(),
                event: event.clone(),
            })
            .await
    }

    async fn update_instance(&self, instance: &DestinationEvent) -> SyncResult<String> {
        self.provider
            .call(UpdateInstance {
                remote_config: self.config(),
                instance: instance.clone(),
            })
            .await
    }

    async fn delete(&self, id: &str) -> SyncResult<()> {
        self.provider
            .call(DeleteEvent {
                remote_config: self.config(),
                event_id: id.to_string(),
            })
            .await
    }
}
