use anyhow::{Context, Result, bail};
use calmirror_core::event::DestinationEvent;
use google_calendar::types::SendUpdates;
use serde::Deserialize;

use super::{CalendarParams, get_event};
use crate::google_event::status_to_google;
use crate::session::authed_client;

#[derive(Debug, Deserialize)]
struct UpdateInstanceParams {
    #[serde(flatten)]
    calendar: CalendarParams,
    instance: DestinationEvent,
}

/// Write an occurrence's status, unless it changed since it was listed.
pub async fn handle(params: serde_json::Value) -> Result<serde_json::Value> {
    let params: UpdateInstanceParams = serde_json::from_value(params)?;
    let calendar_id = params.calendar.google_calendar_id;
    let instance = params.instance;

    let client = authed_client(&params.calendar.google_account).await?;

    let mut current = get_event(&client, &calendar_id, &instance.id).await?;
    if current.etag != instance.etag {
        bail!(
            "Instance {} changed since it was listed (etag {} != {})",
            instance.id,
            current.etag,
            instance.etag
        );
    }

    current.status = status_to_google(instance.status).to_string();

    let response = client
        .events()
        .update(
            &calendar_id,
            &instance.id,
            0,
            0,
            false,
            SendUpdates::None,
            false,
            &current,
        )
        .await
        .with_context(|| format!("Failed to update instance: {}", instance.id))?;

    Ok(serde_json::to_value(response.body.id)?)
}
