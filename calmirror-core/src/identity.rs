//! Deterministic event identity.
//!
//! Exported UIDs are not reliable: they can be missing, duplicated across
//! unrelated events, or change between exports. The destination id is instead
//! derived from the event's content so that the same logical event maps to the
//! same id on every run.

use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256};

use crate::event::SourceEvent;

/// Bump whenever the hashed field set changes, so new ids never collide
/// with ids produced by an earlier scheme.
pub const IDENTITY_VERSION: &str = "3";

/// Longest id the destination store accepts.
pub const MAX_ID_LEN: usize = 1024;

/// Derive the destination id for a source event.
///
/// Hashes uid, summary, start, end and [`IDENTITY_VERSION`]. Description
/// edits keep the id and show up as updates.
pub fn normalize(event: &SourceEvent) -> String {
    let material = format!(
        "{}{}{}{}{}",
        event.uid,
        event.summary,
        instant(&event.start),
        instant(&event.end),
        IDENTITY_VERSION
    );

    let digest = Sha256::digest(material.as_bytes());
    let mut id = hex::encode(digest);
    id.truncate(MAX_ID_LEN);
    id
}

fn instant(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}
