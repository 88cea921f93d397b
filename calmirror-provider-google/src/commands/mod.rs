pub mod authenticate;
pub mod delete_event;
pub mod get_time_zone;
pub mod insert_event;
pub mod list_events;
pub mod list_instances;
pub mod update_event;
pub mod update_instance;

use anyhow::{Context, Result};
use google_calendar::Client;
use serde::Deserialize;

/// Google's alias for the user's main calendar
pub const DEFAULT_CALENDAR_ID: &str = "primary";

fn default_calendar_id() -> String {
    DEFAULT_CALENDAR_ID.to_string()
}

/// The `[destination]` keys every calendar command needs.
#[derive(Debug, Deserialize)]
pub struct CalendarParams {
    pub google_account: String,
    #[serde(default = "default_calendar_id")]
    pub google_calendar_id: String,
}

/// Fetch one event (or occurrence) by id.
pub async fn get_event(
    client: &Client,
    calendar_id: &str,
    event_id: &str,
) -> Result<google_calendar::types::Event> {
    let response = client
        .events()
        .get(calendar_id, event_id, 0, "")
        .await
        .with_context(|| format!("Failed to fetch event {}", event_id))?;
    Ok(response.body)
}
