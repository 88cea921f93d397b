//! Event types shared by the reconciliation engine and the providers.
//!
//! There are three views of an event:
//! - [`SourceEvent`]: what the exported `.ics` file says, already resolved to
//!   absolute instants.
//! - [`CanonicalEvent`]: the destination-facing projection of a source event.
//! - [`DestinationEvent`]: what the remote store currently holds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Source side
// =============================================================================

/// One event as read from the exported calendar.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceEvent {
    /// The exporter's own UID. Not guaranteed unique or stable, may be empty.
    pub uid: String,
    pub summary: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub organizer: Option<SourceAttendee>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// TZID the start was written in, if any
    pub time_zone: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub sequence: i64,
    /// RRULE bodies, without the `RRULE:` prefix
    pub recurrence_rules: Vec<String>,
    /// RECURRENCE-ID; only set on a modified occurrence of a series
    pub recurrence_id: Option<DateTime<Utc>>,
    pub attendees: Vec<SourceAttendee>,
    /// EXDATE entries: occurrences removed from the series
    pub exception_dates: Vec<ExceptionPeriod>,
}

/// An attendee or organizer of a source event.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceAttendee {
    /// Common name (CN parameter)
    pub name: Option<String>,
    /// Address with the URI scheme stripped
    pub email: Option<String>,
}

/// An occurrence of a series that has been removed from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionPeriod {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

impl ExceptionPeriod {
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        ExceptionPeriod { start, end: None }
    }
}

/// Exceptions collected for one canonical event.
pub type ExceptionSet = Vec<ExceptionPeriod>;

// =============================================================================
// Destination side
// =============================================================================

/// A point in time paired with the destination calendar's timezone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDateTime {
    pub date_time: DateTime<Utc>,
    pub time_zone: String,
}

/// A source event projected into the shape the destination stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalEvent {
    pub id: String,
    pub created: Option<DateTime<Utc>>,
    pub summary: String,
    pub description: String,
    pub location: String,
    /// Organizer display name
    pub organizer: String,
    pub start: EventDateTime,
    pub end: EventDateTime,
    pub sequence: i64,
    /// Recurrence lines, e.g. `RRULE:FREQ=WEEKLY;BYDAY=MO`
    pub recurrence: Vec<String>,
    /// Set on a moved occurrence of a recurring series
    pub recurring_event_id: Option<String>,
}

/// An event as it currently exists in the destination store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationEvent {
    pub id: String,
    pub summary: String,
    pub description: Option<String>,
    /// None for all-day events, which carry a date instead of an instant
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub status: EventStatus,
    /// Server-managed version token
    pub etag: String,
}

impl DestinationEvent {
    pub fn is_cancelled(&self) -> bool {
        self.status == EventStatus::Cancelled
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Confirmed,
    Tentative,
    Cancelled,
}
