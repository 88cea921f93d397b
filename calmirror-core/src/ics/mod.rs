//! Reading the exported calendar.
//!
//! This module turns an RFC 5545 export into [`SourceEvent`](crate::event::SourceEvent)s
//! with every time resolved to an absolute instant.

mod parse;

pub use parse::{MOVED_OCCURRENCE_TITLE, parse_calendar, read_file};
