//! Cancellation of occurrences removed from a recurring series.

use tracing::{info, warn};

use crate::destination::Destination;
use crate::event::{CanonicalEvent, DestinationEvent, EventStatus, ExceptionPeriod};

/// Outcome of reconciling one series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExceptionStats {
    pub cancelled: usize,
    /// Instances that disappeared between listing and cancelling
    pub skipped: usize,
    pub failed: usize,
}

impl ExceptionStats {
    pub fn add(&mut self, other: ExceptionStats) {
        self.cancelled += other.cancelled;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// Cancel every live occurrence of `parent` that starts on one of `exceptions`.
///
/// Occurrences are listed again before each cancellation: cancelling one
/// occurrence can bump the version token of its siblings, so the token from
/// the first listing may already be stale.
pub async fn reconcile_exceptions<D: Destination + ?Sized>(
    destination: &D,
    parent: &CanonicalEvent,
    exceptions: &[ExceptionPeriod],
) -> ExceptionStats {
    let mut stats = ExceptionStats::default();

    if exceptions.is_empty() {
        return stats;
    }

    let to_cancel: Vec<DestinationEvent> = destination
        .list_instances(&parent.id)
        .await
        .into_iter()
        .filter(|instance| matches_exception(instance, exceptions))
        .collect();

    if to_cancel.is_empty() {
        return stats;
    }

    info!(id = %parent.id, count = to_cancel.len(), "Cancelling exceptions");

    for stale in to_cancel {
        let refreshed = destination
            .list_instances(&parent.id)
            .await
            .into_iter()
            .find(|i| i.id == stale.id);

        let Some(mut instance) = refreshed else {
            warn!(
                id = %stale.id,
                parent = %parent.id,
                "Instance vanished before it could be cancelled"
            );
            stats.skipped += 1;
            continue;
        };

        instance.status = EventStatus::Cancelled;

        match destination.update_instance(&instance).await {
            Ok(_) => stats.cancelled += 1,
            Err(e) => {
                warn!(
                    id = %instance.id,
                    parent = %parent.id,
                    error = %e,
                    "Error cancelling instance"
                );
                stats.failed += 1;
            }
        }
    }

    stats
}

fn matches_exception(instance: &DestinationEvent, exceptions: &[ExceptionPeriod]) -> bool {
    if instance.is_cancelled() {
        return false;
    }
    match instance.start {
        Some(start) => exceptions.iter().any(|e| e.start == start),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::destination::memory::{Call, MemoryDestination};
    use crate::event::EventDateTime;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn monday(week: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap() + Duration::weeks(week)
    }

    fn parent() -> CanonicalEvent {
        CanonicalEvent {
            id: "series".to_string(),
            created: None,
            summary: "Weekly sync".to_string(),
            description: String::new(),
            location: String::new(),
            organizer: String::new(),
            start: EventDateTime {
                date_time: monday(0),
                time_zone: "UTC".to_string(),
            },
            end: EventDateTime {
                date_time: monday(0) + Duration::hours(1),
                time_zone: "UTC".to_string(),
            },
            sequence: 0,
            recurrence: vec!["RRULE:FREQ=WEEKLY".to_string()],
            recurring_event_id: None,
        }
    }

    fn instance(week: i64) -> DestinationEvent {
        DestinationEvent {
            id: format!("series_{week}"),
            summary: "Weekly sync".to_string(),
            description: None,
            start: Some(monday(week)),
            end: Some(monday(week) + Duration::hours(1)),
            status: EventStatus::Confirmed,
            etag: format!("\"w{week}\""),
        }
    }

    fn series() -> Vec<DestinationEvent> {
        (0..4).map(instance).collect()
    }

    #[tokio::test]
    async fn test_cancels_matching_instance_once() {
        let dest = MemoryDestination::new("UTC").with_instances("series", series());
        let exceptions = vec![ExceptionPeriod::starting_at(monday(2))];

        let stats = reconcile_exceptions(&dest, &parent(), &exceptions).await;

        assert_eq!(stats.cancelled, 1);
        assert_eq!(dest.calls(), vec![Call::UpdateInstance("series_2".to_string())]);
        let cancelled: Vec<_> = dest
            .instances("series")
            .into_iter()
            .filter(|i| i.is_cancelled())
            .map(|i| i.id)
            .collect();
        assert_eq!(cancelled, vec!["series_2"]);

        // Running again finds nothing left to do
        let again = reconcile_exceptions(&dest, &parent(), &exceptions).await;
        assert_eq!(again, ExceptionStats::default());
        assert_eq!(dest.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_relists_before_each_cancellation() {
        let dest = MemoryDestination::new("UTC").with_instances("series", series());
        let exceptions = vec![
            ExceptionPeriod::starting_at(monday(1)),
            ExceptionPeriod::starting_at(monday(3)),
        ];

        let stats = reconcile_exceptions(&dest, &parent(), &exceptions).await;

        assert_eq!(stats.cancelled, 2);
        // One initial listing plus one per cancellation
        assert_eq!(dest.instance_listings(), 3);
    }

    #[tokio::test]
    async fn test_no_matching_instances_is_noop() {
        let dest = MemoryDestination::new("UTC").with_instances("series", series());
        let exceptions = vec![ExceptionPeriod::starting_at(monday(9))];

        let stats = reconcile_exceptions(&dest, &parent(), &exceptions).await;

        assert_eq!(stats, ExceptionStats::default());
        assert!(dest.calls().is_empty());
    }

    #[tokio::test]
    async fn test_already_cancelled_instance_is_left_alone() {
        let mut instances = series();
        instances[1].status = EventStatus::Cancelled;
        let dest = MemoryDestination::new("UTC").with_instances("series", instances);

        let exceptions = [ExceptionPeriod::starting_at(monday(1))];
        let stats = reconcile_exceptions(&dest, &parent(), &exceptions).await;

        assert_eq!(stats, ExceptionStats::default());
        assert!(dest.calls().is_empty());
    }

    #[tokio::test]
    async fn test_vanished_instance_is_skipped() {
        let dest = MemoryDestination::new("UTC")
            .with_instances("series", series())
            .vanishing_after("series_1", 1);
        let exceptions = vec![
            ExceptionPeriod::starting_at(monday(1)),
            ExceptionPeriod::starting_at(monday(2)),
        ];

        let stats = reconcile_exceptions(&dest, &parent(), &exceptions).await;

        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.cancelled, 1);
        assert_eq!(dest.calls(), vec![Call::UpdateInstance("series_2".to_string())]);
    }

    #[tokio::test]
    async fn test_failed_cancellation_does_not_stop_the_rest() {
        let dest = MemoryDestination::new("UTC")
            .with_instances("series", series())
            .failing_on("series_1");
        let exceptions = vec![
            ExceptionPeriod::starting_at(monday(1)),
            ExceptionPeriod::starting_at(monday(2)),
        ];

        let stats = reconcile_exceptions(&dest, &parent(), &exceptions).await;

        assert_eq!(stats.failed, 1);
        assert_eq!(stats.cancelled, 1);
    }

    #[tokio::test]
    async fn test_unlisted_series_is_noop() {
        let dest = MemoryDestination::new("UTC");

        let exceptions = [ExceptionPeriod::starting_at(monday(1))];
        let stats = reconcile_exceptions(&dest, &parent(), &exceptions).await;

        assert_eq!(stats, ExceptionStats::default());
    }
}
