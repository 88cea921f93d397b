//! One full mirroring run: fetch, convert, diff, apply, cancel exceptions.

use tracing::{debug, info, warn};

use crate::convert;
use crate::destination::Destination;
use crate::diff::{self, DiffResult};
use crate::error::{SyncError, SyncResult};
use crate::event::{CanonicalEvent, ExceptionSet, SourceEvent};
use crate::exceptions::{self, ExceptionStats};

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub deleted: usize,
    pub updated: usize,
    pub inserted: usize,
    /// Mutations of the delete/update/insert phases that the destination rejected
    pub failed: usize,
    pub exceptions: ExceptionStats,
}

/// Everything computed before the first mutation.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub time_zone: String,
    pub events: Vec<(CanonicalEvent, ExceptionSet)>,
    pub diff: DiffResult,
}

impl SyncPlan {
    /// Series that carry exceptions to cancel after the main phases.
    pub fn with_exceptions(&self) -> impl Iterator<Item = (&CanonicalEvent, &ExceptionSet)> {
        self.events
            .iter()
            .filter(|(_, exceptions)| !exceptions.is_empty())
            .map(|(event, exceptions)| (event, exceptions))
    }
}

/// Fetch the destination state and compute the diff without mutating anything.
///
/// Fails if the timezone or the event list cannot be fetched; nothing has been
/// written at that point.
pub async fn plan<D: Destination + ?Sized>(
    destination: &D,
    source: &[SourceEvent],
) -> SyncResult<SyncPlan> {
    let time_zone = destination.get_time_zone().await.map_err(|e| {
        if e.is_connectivity() {
            e
        } else {
            SyncError::TimeZone(e.to_string())
        }
    })?;
    debug!(time_zone = %time_zone, "Resolved destination time zone");

    let existing = destination.list_events().await?;
    info!(count = existing.len(), "Fetched destination events");

    let events: Vec<(CanonicalEvent, ExceptionSet)> = source
        .iter()
        .map(|event| convert::convert(event, &time_zone))
        .collect();

    let canonical: Vec<CanonicalEvent> = events.iter().map(|(e, _)| e.clone()).collect();
    let diff = diff::diff(&existing, &canonical);

    Ok(SyncPlan {
        time_zone,
        events,
        diff,
    })
}

/// Apply a plan: deletes, updates, inserts, then exception cancellations.
///
/// Every mutation is attempted once. Failures are logged and counted; they
/// never abort the run, the next run picks them up again.
pub async fn apply<D: Destination + ?Sized>(destination: &D, plan: &SyncPlan) -> SyncStats {
    let mut stats = SyncStats::default();
    let diff = &plan.diff;

    if !diff.to_delete.is_empty() {
        info!(count = diff.to_delete.len(), "Events to delete");
    }
    for event in &diff.to_delete {
        match destination.delete(&event.id).await {
            Ok(()) => {
                info!(id = %event.id, "Deleted event");
                stats.deleted += 1;
            }
            Err(e) => {
                warn!(id = %event.id, error = %e, "Error deleting event");
                stats.failed += 1;
            }
        }
    }

    if !diff.to_update.is_empty() {
        info!(count = diff.to_update.len(), "Events to update");
    }
    for (existing, wanted) in &diff.to_update {
        match destination.update(wanted, &existing.id).await {
            Ok(id) => {
                info!(id = %id, "Updated event");
                stats.updated += 1;
            }
            Err(e) => {
                warn!(id = %existing.id, error = %e, "Error updating event");
                stats.failed += 1;
            }
        }
    }

    if !diff.to_insert.is_empty() {
        info!(count = diff.to_insert.len(), "Events to insert");
    }
    for event in &diff.to_insert {
        match destination.insert(event).await {
            Ok(id) => {
                info!(id = %id, "Inserted event");
                stats.inserted += 1;
            }
            Err(e) => {
                warn!(id = %event.id, error = %e, "Error inserting event");
                stats.failed += 1;
            }
        }
    }

    for (event, exceptions) in plan.with_exceptions() {
        let result = exceptions::reconcile_exceptions(destination, event, exceptions).await;
        stats.exceptions.add(result);
    }

    stats
}

/// Plan and apply in one go.
pub async fn run<D: Destination + ?Sized>(
    destination: &D,
    source: &[SourceEvent],
) -> SyncResult<SyncStats> {
    let plan = plan(destination, source).await?;
    Ok(apply(destination, &plan).await)
}
