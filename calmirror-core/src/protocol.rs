//! Defines the JSON protocol used for communication between calmirror
//! and provider binaries over stdin/stdout.
//!
//! One request line in, one response line out. Every request carries the
//! `[destination]` config table flattened into its params, so a provider
//! knows which account and calendar it is talking to.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::event::{CanonicalEvent, DestinationEvent};

pub trait ProviderCommand: Serialize {
    type Response: DeserializeOwned;
    fn command() -> Command;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Authenticate,
    GetTimeZone,
    ListEvents,
    ListInstances,
    InsertEvent,
    UpdateEvent,
    UpdateInstance,
    DeleteEvent,
}

/// Destination config table as sent to the provider.
pub type RemoteConfig = serde_json::Map<String, serde_json::Value>;

/// Request sent from calmirror to a provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// How a provider classifies a failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The remote store could not be reached (connect failure, timeout)
    Connectivity,
    #[default]
    Other,
}

/// Response sent from a provider to calmirror.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success {
        data: T,
    },
    Error {
        error: String,
        #[serde(default)]
        kind: ErrorKind,
    },
}

impl<T: Serialize> Response<T> {
    pub fn success(data: T) -> serde_json::Result<String> {
        serde_json::to_string(&Response::Success { data })
    }
}

impl Response<()> {
    pub fn error(msg: &str, kind: ErrorKind) -> String {
        // A struct of two strings always serializes
        serde_json::to_string(&Response::<()>::Error {
            error: msg.to_string(),
            kind,
        })
        .unwrap_or_default()
    }
}

// ============================================================================
// Commands
// ============================================================================

/// Run the provider's interactive authentication.
#[derive(Debug, Serialize, Deserialize)]
pub struct Authenticate {}

impl ProviderCommand for Authenticate {
    /// Account identifier (e.g. the Google account email)
    type Response = String;
    fn command() -> Command {
        Command::Authenticate
    }
}

/// IANA timezone of the configured calendar.
#[derive(Debug, Serialize, Deserialize)]
pub struct GetTimeZone {
    #[serde(flatten)]
    pub remote_config: RemoteConfig,
}

impl ProviderCommand for GetTimeZone {
    type Response = String;
    fn command() -> Command {
        Command::GetTimeZone
    }
}

/// Every event in the calendar.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListEvents {
    #[serde(flatten)]
    pub remote_config: RemoteConfig,
}

impl ProviderCommand for ListEvents {
    type Response = Vec<DestinationEvent>;
    fn command() -> Command {
        Command::ListEvents
    }
}

/// Every occurrence of a recurring event, cancelled ones included.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListInstances {
    #[serde(flatten)]
    pub remote_config: RemoteConfig,
    pub event_id: String,
}

impl ProviderCommand for ListInstances {
    type Response = Vec<DestinationEvent>;
    fn command() -> Command {
        Command::ListInstances
    }
}

/// Create an event under the id it carries.
#[derive(Debug, Serialize, Deserialize)]
pub struct InsertEvent {
    #[serde(flatten)]
    pub remote_config: RemoteConfig,
    pub event: CanonicalEvent,
}

impl ProviderCommand for InsertEvent {
    /// Id of the stored event
    type Response = String;
    fn command() -> Command {
        Command::InsertEvent
    }
}

/// Replace the event stored under `event_id`.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateEvent {
    #[serde(flatten)]
    pub remote_config: RemoteConfig,
    pub event_id: String,
    pub event: CanonicalEvent,
}

impl ProviderCommand for UpdateEvent {
    type Response = String;
    fn command() -> Command {
        Command::UpdateEvent
    }
}

/// Write back an occurrence. Rejected when `instance.etag` is stale.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateInstance {
    #[serde(flatten)]
    pub remote_config: RemoteConfig,
    pub instance: DestinationEvent,
}

impl ProviderCommand for UpdateInstance {
    type Response = String;
    fn command() -> Command {
        Command::UpdateInstance
    }
}

/// Delete an event by id.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteEvent {
    #[serde(flatten)]
    pub remote_config: RemoteConfig,
    pub event_id: String,
}

impl ProviderCommand for DeleteEvent {
    type Response = ();
    fn command() -> Command {
        Command::DeleteEvent
    }
}
