//! ICS parsing using the icalendar crate's parser.

use std::path::Path;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use icalendar::{
    CalendarDateTime, DatePerhapsTime,
    parser::{Component, Property, read_calendar, unfold},
};
use tracing::debug;

use crate::error::{SyncError, SyncResult};
use crate::event::{ExceptionPeriod, SourceAttendee, SourceEvent};

/// Title given to a moved occurrence whose exporter left the title blank.
pub const MOVED_OCCURRENCE_TITLE: &str = "unknown moved recurring event";

/// Read and parse an exported `.ics` file.
pub fn read_file(path: &Path, default_tz: Tz) -> SyncResult<Vec<SourceEvent>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| SyncError::Source(format!("{}: {}", path.display(), e)))?;
    parse_calendar(&content, default_tz)
}

/// Parse every VEVENT of a calendar.
///
/// Floating times, all-day dates and unknown TZIDs are interpreted in
/// `default_tz`. Events without a usable start or end, and events without a
/// title (other than moved occurrences) are dropped.
pub fn parse_calendar(content: &str, default_tz: Tz) -> SyncResult<Vec<SourceEvent>> {
    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded).map_err(SyncError::Source)?;

    let mut vevents = Vec::new();
    collect_vevents(&calendar.components, &mut vevents);

    let total = vevents.len();
    let events: Vec<SourceEvent> = vevents
        .into_iter()
        .filter_map(|vevent| parse_event(vevent, default_tz))
        .collect();

    debug!(total, kept = events.len(), "Parsed source calendar");
    Ok(events)
}

fn collect_vevents<'a, 'b>(components: &'b [Component<'a>], out: &mut Vec<&'b Component<'a>>) {
    for component in components {
        if component.name == "VEVENT" {
            out.push(component);
        } else {
            collect_vevents(&component.components, out);
        }
    }
}

fn parse_event(vevent: &Component<'_>, default_tz: Tz) -> Option<SourceEvent> {
    let uid = vevent
        .find_prop("UID")
        .map(|p| p.val.to_string())
        .unwrap_or_default();

    let Some(start_prop) = vevent.find_prop("DTSTART") else {
        debug!(uid = %uid, "Skipping event without start");
        return None;
    };
    let start = resolve_property(start_prop, default_tz)?;
    let time_zone = param(start_prop, "TZID").map(str::to_string);

    let end = match vevent.find_prop("DTEND") {
        Some(prop) => resolve_property(prop, default_tz),
        None => vevent
            .find_prop("DURATION")
            .and_then(|p| parse_duration(p.val.as_ref()))
            .map(|duration| start + duration),
    };
    let Some(end) = end else {
        debug!(uid = %uid, "Skipping event without end");
        return None;
    };

    let recurrence_id = vevent
        .find_prop("RECURRENCE-ID")
        .and_then(|p| resolve_property(p, default_tz));

    let summary = vevent.find_prop("SUMMARY").map(text).unwrap_or_default();
    let summary = if !summary.trim().is_empty() {
        summary
    } else if recurrence_id.is_some() {
        MOVED_OCCURRENCE_TITLE.to_string()
    } else {
        debug!(uid = %uid, "Skipping event without title");
        return None;
    };

    let description = vevent.find_prop("DESCRIPTION").map(text);
    let location = vevent
        .find_prop("LOCATION")
        .map(text)
        .filter(|l| !l.is_empty());
    let created = vevent
        .find_prop("CREATED")
        .and_then(|p| resolve_property(p, default_tz));
    let sequence = vevent
        .find_prop("SEQUENCE")
        .and_then(|p| p.val.as_ref().trim().parse().ok())
        .unwrap_or(0);

    let recurrence_rules: Vec<String> = vevent
        .properties
        .iter()
        .filter(|p| p.name == "RRULE")
        .map(|p| p.val.to_string())
        .collect();

    let exception_dates: Vec<ExceptionPeriod> = vevent
        .properties
        .iter()
        .filter(|p| p.name == "EXDATE")
        .flat_map(|p| parse_exdate_property(p, default_tz))
        .map(ExceptionPeriod::starting_at)
        .collect();

    let organizer = vevent.find_prop("ORGANIZER").map(parse_attendee);
    let attendees: Vec<SourceAttendee> = vevent
        .properties
        .iter()
        .filter(|p| p.name == "ATTENDEE")
        .map(parse_attendee)
        .collect();

    Some(SourceEvent {
        uid,
        summary,
        description,
        location,
        organizer,
        start,
        end,
        time_zone,
        created,
        sequence,
        recurrence_rules,
        recurrence_id,
        attendees,
        exception_dates,
    })
}

fn param<'a>(prop: &'a Property<'_>, key: &str) -> Option<&'a str> {
    prop.params
        .iter()
        .find(|p| p.key == key)
        .and_then(|p| p.val.as_ref())
        .map(|v| v.as_ref().trim_matches('"'))
}

/// TEXT value with RFC 5545 escapes removed.
fn text(prop: &Property<'_>) -> String {
    let raw = prop.val.as_ref();
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn resolve_property(prop: &Property<'_>, default_tz: Tz) -> Option<DateTime<Utc>> {
    let value = DatePerhapsTime::try_from(prop).ok()?;
    resolve(value, default_tz)
}

/// Resolve icalendar's DatePerhapsTime to an absolute instant
fn resolve(value: DatePerhapsTime, default_tz: Tz) -> Option<DateTime<Utc>> {
    match value {
        DatePerhapsTime::Date(date) => localize(date.and_hms_opt(0, 0, 0)?, default_tz),
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => Some(dt),
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => {
            localize(naive, default_tz)
        }
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
            localize(date_time, zone(&tzid, default_tz))
        }
    }
}

fn zone(tzid: &str, default_tz: Tz) -> Tz {
    match tzid.parse::<Tz>() {
        Ok(tz) => tz,
        Err(_) => {
            debug!(tzid, fallback = %default_tz, "Unknown TZID");
            default_tz
        }
    }
}

/// Local wall time to UTC. Times skipped by a DST jump move forward an hour.
fn localize(naive: NaiveDateTime, tz: Tz) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim().trim_start_matches('+');
    if value.starts_with('-') {
        return None;
    }
    let duration = iso8601::duration(value).ok()?;
    let std_duration: std::time::Duration = duration.into();
    Duration::from_std(std_duration).ok()
}

/// Parse an EXDATE property into instants.
///
/// Handles:
/// - TZID parameter: `EXDATE;TZID=America/New_York:20240108T100000`
/// - VALUE=DATE: `EXDATE;VALUE=DATE:20240108`
/// - UTC: `EXDATE:20240108T100000Z`
/// - Floating: `EXDATE:20240108T100000`
/// - Comma-separated values: `EXDATE;TZID=...:20240108T100000,20240115T100000`
fn parse_exdate_property(prop: &Property<'_>, default_tz: Tz) -> Vec<DateTime<Utc>> {
    let tz = param(prop, "TZID")
        .map(|tzid| zone(tzid, default_tz))
        .unwrap_or(default_tz);
    let is_date = param(prop, "VALUE") == Some("DATE");

    prop.val
        .as_ref()
        .split(',')
        .filter_map(|s| {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            if is_date {
                let date = NaiveDate::parse_from_str(s, "%Y%m%d").ok()?;
                localize(date.and_hms_opt(0, 0, 0)?, tz)
            } else if let Some(utc) = s.strip_suffix('Z') {
                NaiveDateTime::parse_from_str(utc, "%Y%m%dT%H%M%S")
                    .ok()
                    .map(|dt| dt.and_utc())
            } else {
                let dt = NaiveDateTime::parse_from_str(s, "%Y%m%dT%H%M%S").ok()?;
                localize(dt, tz)
            }
        })
        .collect()
}

/// Parse ATTENDEE/ORGANIZER property
fn parse_attendee(prop: &Property<'_>) -> SourceAttendee {
    let raw = prop.val.as_ref().trim();
    let address = match raw.get(..7) {
        Some(scheme) if scheme.eq_ignore_ascii_case("mailto:") => &raw[7..],
        _ => raw,
    };

    SourceAttendee {
        name: param(prop, "CN").map(str::to_string),
        email: Some(address.to_string()).filter(|a| !a.is_empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::{America, UTC};

    fn calendar(body: &str) -> String {
        format!("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:TEST\r\n{body}END:VCALENDAR\r\n")
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn parse_one(body: &str, tz: Tz) -> SourceEvent {
        let mut events = parse_calendar(&calendar(body), tz).expect("Should parse");
        assert_eq!(events.len(), 1, "Expected exactly one event");
        events.remove(0)
    }

    #[test]
    fn test_parse_basic_fields() {
        let event = parse_one(
            "BEGIN:VEVENT\r\n\
UID:abc-1\r\n\
SUMMARY:Design review\r\n\
DESCRIPTION:Line one\\nLine two\\, with comma\r\n\
LOCATION:Room 4\r\n\
DTSTART:20250602T080000Z\r\n\
DTEND:20250602T090000Z\r\n\
CREATED:20250101T120000Z\r\n\
SEQUENCE:3\r\n\
END:VEVENT\r\n",
            UTC,
        );

        assert_eq!(event.uid, "abc-1");
        assert_eq!(event.summary, "Design review");
        assert_eq!(
            event.description.as_deref(),
            Some("Line one\nLine two, with comma")
        );
        assert_eq!(event.location.as_deref(), Some("Room 4"));
        assert_eq!(event.start, utc(2025, 6, 2, 8, 0));
        assert_eq!(event.end, utc(2025, 6, 2, 9, 0));
        assert_eq!(event.created, Some(utc(2025, 1, 1, 12, 0)));
        assert_eq!(event.sequence, 3);
        assert_eq!(event.time_zone, None);
        assert_eq!(event.recurrence_id, None);
    }

    #[test]
    fn test_parse_resolves_tzid() {
        let event = parse_one(
            "BEGIN:VEVENT\r\n\
UID:tz\r\n\
SUMMARY:Berlin morning\r\n\
DTSTART;TZID=Europe/Berlin:20250602T100000\r\n\
DTEND;TZID=Europe/Berlin:20250602T110000\r\n\
END:VEVENT\r\n",
            UTC,
        );

        assert_eq!(event.start, utc(2025, 6, 2, 8, 0));
        assert_eq!(event.end, utc(2025, 6, 2, 9, 0));
        assert_eq!(event.time_zone.as_deref(), Some("Europe/Berlin"));
    }

    #[test]
    fn test_parse_unknown_tzid_and_floating_use_default_zone() {
        let events = parse_calendar(
            &calendar(
                "BEGIN:VEVENT\r\n\
UID:win\r\n\
SUMMARY:Windows zone\r\n\
DTSTART;TZID=W. Europe Standard Time:20250602T100000\r\n\
DTEND;TZID=W. Europe Standard Time:20250602T110000\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:float\r\n\
SUMMARY:Floating\r\n\
DTSTART:20250602T100000\r\n\
DTEND:20250602T110000\r\n\
END:VEVENT\r\n",
            ),
            America::New_York,
        )
        .unwrap();

        assert_eq!(events.len(), 2);
        for event in &events {
            assert_eq!(event.start, utc(2025, 6, 2, 14, 0), "{}", event.uid);
        }
    }

    #[test]
    fn test_parse_all_day_event_starts_at_midnight() {
        let event = parse_one(
            "BEGIN:VEVENT\r\n\
UID:day\r\n\
SUMMARY:Holiday\r\n\
DTSTART;VALUE=DATE:20251225\r\n\
DTEND;VALUE=DATE:20251226\r\n\
END:VEVENT\r\n",
            America::New_York,
        );

        assert_eq!(event.start, utc(2025, 12, 25, 5, 0));
        assert_eq!(event.end, utc(2025, 12, 26, 5, 0));
    }

    #[test]
    fn test_parse_duration_when_end_missing() {
        let event = parse_one(
            "BEGIN:VEVENT\r\n\
UID:dur\r\n\
SUMMARY:Workshop\r\n\
DTSTART:20250602T080000Z\r\n\
DURATION:PT1H30M\r\n\
END:VEVENT\r\n",
            UTC,
        );

        assert_eq!(event.end, utc(2025, 6, 2, 9, 30));
    }

    #[test]
    fn test_parse_drops_unusable_events() {
        let events = parse_calendar(
            &calendar(
                "BEGIN:VEVENT\r\n\
UID:no-end\r\n\
SUMMARY:Open ended\r\n\
DTSTART:20250602T080000Z\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:no-title\r\n\
SUMMARY:  \r\n\
DTSTART:20250602T080000Z\r\n\
DTEND:20250602T090000Z\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:no-start\r\n\
SUMMARY:Nowhere\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:kept\r\n\
SUMMARY:Kept\r\n\
DTSTART:20250602T080000Z\r\n\
DTEND:20250602T090000Z\r\n\
END:VEVENT\r\n",
            ),
            UTC,
        )
        .unwrap();

        let uids: Vec<&str> = events.iter().map(|e| e.uid.as_str()).collect();
        assert_eq!(uids, vec!["kept"]);
    }

    #[test]
    fn test_parse_moved_occurrence_without_title_gets_fallback() {
        let event = parse_one(
            "BEGIN:VEVENT\r\n\
UID:series\r\n\
RECURRENCE-ID:20250609T080000Z\r\n\
DTSTART:20250610T080000Z\r\n\
DTEND:20250610T090000Z\r\n\
END:VEVENT\r\n",
            UTC,
        );

        assert_eq!(event.summary, MOVED_OCCURRENCE_TITLE);
        assert_eq!(event.recurrence_id, Some(utc(2025, 6, 9, 8, 0)));
    }

    #[test]
    fn test_parse_recurrence_and_exdates() {
        let event = parse_one(
            "BEGIN:VEVENT\r\n\
UID:weekly\r\n\
SUMMARY:Weekly\r\n\
DTSTART;TZID=America/New_York:20240101T100000\r\n\
DTEND;TZID=America/New_York:20240101T110000\r\n\
RRULE:FREQ=WEEKLY;BYDAY=MO\r\n\
EXDATE;TZID=America/New_York:20240108T100000,20240115T100000\r\n\
EXDATE:20240122T150000Z\r\n\
EXDATE;VALUE=DATE:20240129\r\n\
END:VEVENT\r\n",
            UTC,
        );

        assert_eq!(event.recurrence_rules, vec!["FREQ=WEEKLY;BYDAY=MO"]);
        let starts: Vec<DateTime<Utc>> = event.exception_dates.iter().map(|e| e.start).collect();
        assert_eq!(
            starts,
            vec![
                utc(2024, 1, 8, 15, 0),
                utc(2024, 1, 15, 15, 0),
                utc(2024, 1, 22, 15, 0),
                utc(2024, 1, 29, 0, 0),
            ]
        );
        assert!(event.exception_dates.iter().all(|e| e.end.is_none()));
    }

    #[test]
    fn test_parse_attendees_and_organizer() {
        let event = parse_one(
            "BEGIN:VEVENT\r\n\
UID:meet\r\n\
SUMMARY:Meeting\r\n\
DTSTART:20250602T080000Z\r\n\
DTEND:20250602T090000Z\r\n\
ORGANIZER;CN=Boss:mailto:boss@example.com\r\n\
ATTENDEE;CN=Ann:MAILTO:ann@example.com\r\n\
ATTENDEE:mailto:bob@example.com\r\n\
END:VEVENT\r\n",
            UTC,
        );

        assert_eq!(
            event.organizer,
            Some(SourceAttendee {
                name: Some("Boss".to_string()),
                email: Some("boss@example.com".to_string()),
            })
        );
        assert_eq!(
            event.attendees,
            vec![
                SourceAttendee {
                    name: Some("Ann".to_string()),
                    email: Some("ann@example.com".to_string()),
                },
                SourceAttendee {
                    name: None,
                    email: Some("bob@example.com".to_string()),
                },
            ]
        );
    }

    #[test]
    fn test_parse_line_folding_preserves_whitespace() {
        let event = parse_one(
            "BEGIN:VEVENT\r\n\
UID:fold\r\n\
SUMMARY:Test\r\n\
DTSTART:20240101T100000Z\r\n\
DTEND:20240101T110000Z\r\n\
DESCRIPTION:Hello \r\n world and \r\n more text\r\n\
END:VEVENT\r\n",
            UTC,
        );

        assert_eq!(
            event.description.as_deref(),
            Some("Hello world and more text")
        );
    }

    #[test]
    fn test_read_missing_file_is_source_error() {
        let err = read_file(Path::new("/nonexistent/calendar.ics"), UTC).unwrap_err();
        assert!(matches!(err, SyncError::Source(_)));
    }
}
