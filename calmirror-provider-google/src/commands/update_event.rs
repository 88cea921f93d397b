use anyhow::{Context, Result};
use calmirror_core::event::CanonicalEvent;
use google_calendar::types::SendUpdates;
use serde::Deserialize;

use super::CalendarParams;
use crate::google_event::ToGoogle;
use crate::session::authed_client;

#[derive(Debug, Deserialize)]
struct UpdateEventParams {
    #[serde(flatten)]
    calendar: CalendarParams,
    event_id: String,
    event: CanonicalEvent,
}

pub async fn handle(params: serde_json::Value) -> Result<serde_json::Value> {
    let params: UpdateEventParams = serde_json::from_value(params)?;
    let calendar_id = params.calendar.google_calendar_id;
    let event_id = params.event_id;

    let client = authed_client(&params.calendar.google_account).await?;

    let mut google_event = params.event.to_google();
    google_event.id = event_id.clone();

    let response = client
        .events()
        .update(
            &calendar_id,
            &event_id,
            0,
            0,
            false,
            SendUpdates::None,
            false,
            &google_event,
        )
        .await
        .with_context(|| format!("Failed to update event: {}", event_id))?;

    Ok(serde_json::to_value(response.body.id)?)
}
