use calmirror_core::event::{CanonicalEvent, EventDateTime, EventStatus};

pub trait ToGoogle {
    fn to_google(&self) -> google_calendar::types::Event;
}

impl ToGoogle for CanonicalEvent {
    /// The organizer is left out: Google rejects it on insert.
    fn to_google(&self) -> google_calendar::types::Event {
        google_calendar::types::Event {
            id: self.id.clone(),
            summary: self.summary.clone(),
            description: self.description.clone(),
            location: self.location.clone(),
            start: Some(event_time_to_google(&self.start)),
            end: Some(event_time_to_google(&self.end)),
            recurrence: self.recurrence.clone(),
            recurring_event_id: self.recurring_event_id.clone().unwrap_or_default(),
            sequence: self.sequence,
            ..Default::default()
        }
    }
}

fn event_time_to_google(time: &EventDateTime) -> google_calendar::types::EventDateTime {
    google_calendar::types::EventDateTime {
        date: None,
        date_time: Some(time.date_time),
        time_zone: time.time_zone.clone(),
    }
}

pub fn status_to_google(status: EventStatus) -> &'static str {
    match status {
        EventStatus::Confirmed => "confirmed",
        EventStatus::Tentative => "tentative",
        EventStatus::Cancelled => "cancelled",
    }
}
