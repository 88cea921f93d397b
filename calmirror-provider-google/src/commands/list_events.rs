use anyhow::{Context, Result};
use calmirror_core::event::DestinationEvent;
use google_calendar::types::OrderBy;
use serde::Deserialize;

use super::CalendarParams;
use crate::google_event::FromGoogle;
use crate::session::authed_client;

#[derive(Debug, Deserialize)]
struct ListEventsParams {
    #[serde(flatten)]
    calendar: CalendarParams,
}

/// Every event of the calendar, recurring series unexpanded, no time window.
pub async fn handle(params: serde_json::Value) -> Result<serde_json::Value> {
    let params: ListEventsParams = serde_json::from_value(params)?;
    let calendar_id = params.calendar.google_calendar_id;

    let client = authed_client(&params.calendar.google_account).await?;

    let response = client
        .events()
        .list_all(
            &calendar_id,
            "",                 // i_cal_uid
            0,                  // max_attendees
            OrderBy::default(), // order_by
            &[],                // private_extended_property
            "",                 // q (search query)
            &[],                // shared_extended_property
            false,              // show_deleted
            false,              // show_hidden_invitations
            false,              // single_events
            "",                 // time_max
            "",                 // time_min
            "",                 // time_zone
            "",                 // updated_min
        )
        .await
        .context("Failed to fetch events")?;

    let events: Vec<DestinationEvent> = response
        .body
        .into_iter()
        .map(DestinationEvent::from_google)
        .collect::<Result<_, _>>()?;

    Ok(serde_json::to_value(events)?)
}
