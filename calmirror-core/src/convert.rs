//! Source event → canonical event conversion.

use chrono::SecondsFormat;

use crate::event::{CanonicalEvent, EventDateTime, ExceptionSet, SourceAttendee, SourceEvent};
use crate::identity;

/// Line marker the destination expects in front of each recurrence rule.
pub const RRULE_PREFIX: &str = "RRULE:";

const ATTENDEES_HEADER: &str = "Attendees:";
const UNKNOWN_ATTENDEE: &str = "Unknown";

/// Project a source event into the destination's representation.
///
/// `time_zone` is the destination calendar's timezone, resolved once per run
/// by the caller. Exception dates are returned separately because they belong
/// to the series, not to this occurrence.
pub fn convert(event: &SourceEvent, time_zone: &str) -> (CanonicalEvent, ExceptionSet) {
    let recurring_event_id = event
        .recurrence_id
        .filter(|anchor| *anchor != event.start)
        .map(|anchor| anchor.to_rfc3339_opts(SecondsFormat::Secs, true));

    let canonical = CanonicalEvent {
        id: identity::normalize(event),
        created: event.created,
        summary: event.summary.clone(),
        description: description_with_attendees(event),
        location: event.location.clone().unwrap_or_default(),
        organizer: event
            .organizer
            .as_ref()
            .and_then(|o| o.name.clone())
            .unwrap_or_default(),
        start: EventDateTime {
            date_time: event.start,
            time_zone: time_zone.to_string(),
        },
        end: EventDateTime {
            date_time: event.end,
            time_zone: time_zone.to_string(),
        },
        sequence: event.sequence,
        recurrence: event
            .recurrence_rules
            .iter()
            .map(|rule| format!("{RRULE_PREFIX}{rule}"))
            .collect(),
        recurring_event_id,
    };

    (canonical, event.exception_dates.clone())
}

/// Attendees are folded into the description instead of being sent as real
/// attendees: creating them on the destination would mail out invitations.
fn description_with_attendees(event: &SourceEvent) -> String {
    let description = event.description.clone().unwrap_or_default();

    if event.attendees.is_empty() {
        return description;
    }

    let lines: Vec<String> = event.attendees.iter().map(attendee_line).collect();
    format!("{description}\n\n{ATTENDEES_HEADER}\n{}", lines.join("\n"))
}

fn attendee_line(attendee: &SourceAttendee) -> String {
    let name = attendee
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(UNKNOWN_ATTENDEE);

    let email = attendee.email.as_deref().map(clean_address).unwrap_or_default();

    format!("{name} <{email}>")
}

/// Strip a leftover URI scheme and reject values that are not addresses.
fn clean_address(raw: &str) -> String {
    let raw = raw.trim();
    let address = match raw.split_once(':') {
        Some((scheme, rest)) if !scheme.contains('@') => rest.trim(),
        _ => raw,
    };

    if address.is_empty() || !address.contains('@') {
        String::new()
    } else {
        address.to_string()
    }
}
