//! Three-way partitioning of destination and canonical events.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::diff::DiffKind;
use crate::event::{CanonicalEvent, DestinationEvent};

/// Descriptions are compared on this many leading characters only; the
/// destination may truncate long descriptions on its side.
pub const DESCRIPTION_COMPARE_LIMIT: usize = 8000;

/// The mutations needed to bring the destination in line with the source.
///
/// Applied in field order: deletes, then updates, then inserts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiffResult {
    pub to_delete: Vec<DestinationEvent>,
    pub to_update: Vec<(DestinationEvent, CanonicalEvent)>,
    pub to_insert: Vec<CanonicalEvent>,
}

impl DiffResult {
    pub fn is_empty(&self) -> bool {
        self.to_delete.is_empty() && self.to_update.is_empty() && self.to_insert.is_empty()
    }

    /// (kind, id, summary) for every planned mutation, in application order.
    pub fn changes(&self) -> Vec<(DiffKind, &str, &str)> {
        let deletes = self
            .to_delete
            .iter()
            .map(|e| (DiffKind::Delete, e.id.as_str(), e.summary.as_str()));
        let updates = self
            .to_update
            .iter()
            .map(|(_, e)| (DiffKind::Update, e.id.as_str(), e.summary.as_str()));
        let inserts = self
            .to_insert
            .iter()
            .map(|e| (DiffKind::Insert, e.id.as_str(), e.summary.as_str()));

        deletes.chain(updates).chain(inserts).collect()
    }
}

/// Classify the canonical set against the already-fetched destination set.
pub fn diff(destination: &[DestinationEvent], canonical: &[CanonicalEvent]) -> DiffResult {
    // Source events with equal uid, title and times share an id; the first one wins.
    let mut canonical_by_id: HashMap<&str, &CanonicalEvent> = HashMap::new();
    for event in canonical {
        match canonical_by_id.entry(event.id.as_str()) {
            Entry::Vacant(slot) => {
                slot.insert(event);
            }
            Entry::Occupied(_) => {
                debug!(
                    id = %event.id,
                    summary = %event.summary,
                    "Duplicate source event, keeping first"
                );
            }
        }
    }

    let mut result = DiffResult::default();

    // Destination events that survive this run, keyed by id. Cancelled
    // events still occupy their id on the destination.
    let mut kept: HashSet<&str> = HashSet::new();
    for existing in destination {
        match canonical_by_id.get(existing.id.as_str()) {
            Some(wanted) => {
                if !kept.insert(existing.id.as_str()) {
                    continue;
                }
                if is_changed(existing, wanted) {
                    result.to_update.push((existing.clone(), (*wanted).clone()));
                }
            }
            None if !existing.is_cancelled() => result.to_delete.push(existing.clone()),
            None => {}
        }
    }

    let mut inserted: HashSet<&str> = HashSet::new();
    for event in canonical {
        if kept.contains(event.id.as_str()) || !inserted.insert(event.id.as_str()) {
            continue;
        }
        result.to_insert.push(event.clone());
    }

    result
}

/// Only summary, description and the start/end instants are compared.
fn is_changed(existing: &DestinationEvent, wanted: &CanonicalEvent) -> bool {
    let existing_description = existing.description.as_deref().unwrap_or_default();

    existing.summary != wanted.summary
        || compare_window(existing_description) != compare_window(&wanted.description)
        || existing.start != Some(wanted.start.date_time)
        || existing.end != Some(wanted.end.date_time)
}

fn compare_window(text: &str) -> &str {
    match text.char_indices().nth(DESCRIPTION_COMPARE_LIMIT) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}
