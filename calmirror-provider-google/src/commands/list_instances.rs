use anyhow::{Context, Result};
use calmirror_core::event::DestinationEvent;
use serde::Deserialize;

use super::CalendarParams;
use crate::google_event::FromGoogle;
use crate::session::authed_client;

#[derive(Debug, Deserialize)]
struct ListInstancesParams {
    #[serde(flatten)]
    calendar: CalendarParams,
    event_id: String,
}

/// Every occurrence of a recurring event, cancelled ones included.
pub async fn handle(params: serde_json::Value) -> Result<serde_json::Value> {
    let params: ListInstancesParams = serde_json::from_value(params)?;
    let calendar_id = params.calendar.google_calendar_id;
    let parent_id = params.event_id;

    let client = authed_client(&params.calendar.google_account).await?;

    let response = client
        .events()
        .get_all_instances(
            &calendar_id,
            &parent_id,
            0,
            "",
            true, // show_deleted
            "",
            "",
            "",
        )
        .await
        .with_context(|| format!("Failed to fetch instances of {}", parent_id))?;

    let instances: Vec<DestinationEvent> = response
        .body
        .into_iter()
        .map(DestinationEvent::from_google)
        .collect::<Result<_, _>>()?;

    Ok(serde_json::to_value(instances)?)
}
