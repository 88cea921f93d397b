use anyhow::{Context, Result};
use google_calendar::types::SendUpdates;
use serde::Deserialize;

use super::CalendarParams;
use crate::google_error::is_gone;
use crate::session::authed_client;

#[derive(Debug, Deserialize)]
struct DeleteEventParams {
    #[serde(flatten)]
    calendar: CalendarParams,
    event_id: String,
}

pub async fn handle(params: serde_json::Value) -> Result<serde_json::Value> {
    let params: DeleteEventParams = serde_json::from_value(params)?;
    let calendar_id = params.calendar.google_calendar_id;
    let event_id = params.event_id;

    let client = authed_client(&params.calendar.google_account).await?;

    let result = client
        .events()
        .delete(&calendar_id, &event_id, false, SendUpdates::None)
        .await;

    match result {
        Ok(_) => Ok(serde_json::Value::Null),
        Err(e) if is_gone(&e) => Ok(serde_json::Value::Null),
        Err(e) => Err(e).with_context(|| format!("Failed to delete event: {}", event_id)),
    }
}
