use anyhow::{Context, Result};
use google_calendar::types::MinAccessRole;
use serde::Deserialize;

use super::{CalendarParams, DEFAULT_CALENDAR_ID};
use crate::session::authed_client;

#[derive(Debug, Deserialize)]
struct GetTimeZoneParams {
    #[serde(flatten)]
    calendar: CalendarParams,
}

pub async fn handle(params: serde_json::Value) -> Result<serde_json::Value> {
    let params: GetTimeZoneParams = serde_json::from_value(params)?;
    let calendar_id = params.calendar.google_calendar_id;

    let client = authed_client(&params.calendar.google_account).await?;

    let calendars = client
        .calendar_list()
        .list_all(MinAccessRole::default(), false, false)
        .await
        .context("Failed to fetch calendars")?
        .body;

    let entry = calendars
        .iter()
        .find(|cal| {
            cal.id == calendar_id || (calendar_id == DEFAULT_CALENDAR_ID && cal.primary)
        })
        .with_context(|| format!("Calendar {} not found", calendar_id))?;

    if entry.time_zone.is_empty() {
        anyhow::bail!("Calendar {} has no time zone", calendar_id);
    }

    Ok(serde_json::to_value(&entry.time_zone)?)
}
