use anyhow::{Context, Result};
use calmirror_core::event::CanonicalEvent;
use google_calendar::types::SendUpdates;
use serde::Deserialize;

use super::CalendarParams;
use crate::google_event::ToGoogle;
use crate::session::authed_client;

#[derive(Debug, Deserialize)]
struct InsertEventParams {
    #[serde(flatten)]
    calendar: CalendarParams,
    event: CanonicalEvent,
}

pub async fn handle(params: serde_json::Value) -> Result<serde_json::Value> {
    let params: InsertEventParams = serde_json::from_value(params)?;
    let calendar_id = params.calendar.google_calendar_id;
    let event = params.event;

    let client = authed_client(&params.calendar.google_account).await?;

    let response = client
        .events()
        .insert(
            &calendar_id,
            0,
            0,
            false,
            SendUpdates::None,
            false,
            &event.to_google(),
        )
        .await
        .with_context(|| format!("Failed to insert event: {}", event.id))?;

    Ok(serde_json::to_value(response.body.id)?)
}
