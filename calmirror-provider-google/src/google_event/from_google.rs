use anyhow::{Result, bail};
use calmirror_core::event::{DestinationEvent, EventStatus};

pub trait FromGoogle {
    fn from_google(event: google_calendar::types::Event) -> Result<Self>
    where
        Self: Sized;
}

impl FromGoogle for DestinationEvent {
    fn from_google(event: google_calendar::types::Event) -> Result<Self> {
        if event.id.is_empty() {
            bail!("Event has no id");
        }

        // All-day events carry a date and no instant
        let start = event.start.as_ref().and_then(|s| s.date_time);
        let end = event.end.as_ref().and_then(|e| e.date_time);

        let status = match event.status.as_str() {
            "tentative" => EventStatus::Tentative,
            "cancelled" => EventStatus::Cancelled,
            _ => EventStatus::Confirmed,
        };

        let description = if event.description.is_empty() {
            None
        } else {
            Some(event.description)
        };

        Ok(DestinationEvent {
            id: event.id,
            summary: event.summary,
            description,
            start,
            end,
            status,
            etag: event.etag,
        })
    }
}
