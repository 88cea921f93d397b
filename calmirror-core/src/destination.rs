//! The narrow interface the engine uses to talk to a destination store.

use async_trait::async_trait;

use crate::error::SyncResult;
use crate::event::{CanonicalEvent, DestinationEvent};

/// A remote calendar the source is mirrored into.
///
/// Implementations own pagination, authentication and transport. Mutations
/// return errors rather than logging them; the caller decides whether a
/// failure is fatal.
#[async_trait]
pub trait Destination: Send + Sync {
    /// IANA timezone of the destination calendar.
    async fn get_time_zone(&self) -> SyncResult<String>;

    /// Every event in the calendar, all pages.
    async fn list_events(&self) -> SyncResult<Vec<DestinationEvent>>;

    /// Every occurrence of a recurring event, all pages. Returns an empty
    /// list (and logs) when the occurrences cannot be listed.
    async fn list_instances(&self, parent_id: &str) -> Vec<DestinationEvent>;

    /// Create an event. Returns the id the store assigned.
    async fn insert(&self, event: &CanonicalEvent) -> SyncResult<String>;

    /// Replace the event stored under `id`.
    async fn update(&self, event: &CanonicalEvent, id: &str) -> SyncResult<String>;

    /// Write back an occurrence instance, guarded by its version token.
    async fn update_instance(&self, instance: &DestinationEvent) -> SyncResult<String>;

    /// Remove an event. Removing an event that is already gone succeeds.
    async fn delete(&self, id: &str) -> SyncResult<()>;
}

#[cfg(test)]
pub mod memory {
    //! In-memory destination for engine tests.

    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::Destination;
    use crate::error::{SyncError, SyncResult};
    use crate::event::{CanonicalEvent, DestinationEvent, EventStatus};

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Insert(String),
        Update(String),
        UpdateInstance(String),
        Delete(String),
    }

    #[derive(Default)]
    struct State {
        events: Vec<DestinationEvent>,
        instances: HashMap<String, Vec<DestinationEvent>>,
        calls: Vec<Call>,
        failing: HashSet<String>,
        /// instance id -> number of listings after which it disappears
        vanishing: HashMap<String, usize>,
        instance_listings: usize,
        version: u64,
        /// Reads that succeed before the destination becomes unreachable
        offline_after: Option<usize>,
        reads: usize,
    }

    pub struct MemoryDestination {
        time_zone: Option<String>,
        state: Mutex<State>,
    }

    impl MemoryDestination {
        pub fn new(time_zone: &str) -> Self {
            MemoryDestination {
                time_zone: Some(time_zone.to_string()),
                state: Mutex::new(State::default()),
            }
        }

        /// A destination whose timezone lookup fails.
        pub fn without_time_zone() -> Self {
            MemoryDestination {
                time_zone: None,
                state: Mutex::new(State::default()),
            }
        }

        pub fn with_events(self, events: Vec<DestinationEvent>) -> Self {
            self.state.lock().unwrap().events = events;
            self
        }

        pub fn with_instances(self, parent_id: &str, instances: Vec<DestinationEvent>) -> Self {
            self.state
                .lock()
                .unwrap()
                .instances
                .insert(parent_id.to_string(), instances);
            self
        }

        /// Every mutation touching `id` fails.
        pub fn failing_on(self, id: &str) -> Self {
            self.state.lock().unwrap().failing.insert(id.to_string());
            self
        }

        /// The instance is missing from every listing after the first `after`.
        pub fn vanishing_after(self, instance_id: &str, after: usize) -> Self {
            self.state
                .lock()
                .unwrap()
                .vanishing
                .insert(instance_id.to_string(), after);
            self
        }

        /// Timezone and event reads fail with a connectivity error once
        /// `reads` of them have succeeded.
        pub fn offline_after(self, reads: usize) -> Self {
            self.state.lock().unwrap().offline_after = Some(reads);
            self
        }

        pub fn events(&self) -> Vec<DestinationEvent> {
            self.state.lock().unwrap().events.clone()
        }

        pub fn instances(&self, parent_id: &str) -> Vec<DestinationEvent> {
            self.state
                .lock()
                .unwrap()
                .instances
                .get(parent_id)
                .cloned()
                .unwrap_or_default()
        }

        pub fn calls(&self) -> Vec<Call> {
            self.state.lock().unwrap().calls.clone()
        }

        pub fn instance_listings(&self) -> usize {
            self.state.lock().unwrap().instance_listings
        }
    }

    impl State {
        fn next_etag(&mut self) -> String {
            self.version += 1;
            format!("\"v{}\"", self.version)
        }

        fn read(&mut self) -> SyncResult<()> {
            if self.offline_after.is_some_and(|after| self.reads >= after) {
                return Err(SyncError::Connectivity("connection refused".to_string()));
            }
            self.reads += 1;
            Ok(())
        }

        fn check(&self, id: &str) -> SyncResult<()> {
            if self.failing.contains(id) {
                Err(SyncError::Destination(format!("rejected {id}")))
            } else {
                Ok(())
            }
        }

        fn stored(&mut self, event: &CanonicalEvent, id: &str) -> DestinationEvent {
            DestinationEvent {
                id: id.to_string(),
                summary: event.summary.clone(),
                description: Some(event.description.clone()),
                start: Some(event.start.date_time),
                end: Some(event.end.date_time),
                status: EventStatus::Confirmed,
                etag: self.next_etag(),
            }
        }
    }

    #[async_trait]
    impl Destination for MemoryDestination {
        async fn get_time_zone(&self) -> SyncResult<String> {
            self.state.lock().unwrap().read()?;
            self.time_zone
                .clone()
                .ok_or_else(|| SyncError::TimeZone("calendar not found".to_string()))
        }

        async fn list_events(&self) -> SyncResult<Vec<DestinationEvent>> {
            self.state.lock().unwrap().read()?;
            Ok(self.events())
        }

        async fn list_instances(&self, parent_id: &str) -> Vec<DestinationEvent> {
            let mut state = self.state.lock().unwrap();
            state.instance_listings += 1;
            let listing = state.instance_listings;
            let vanishing = state.vanishing.clone();

            state
                .instances
                .get(parent_id)
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .filter(|i| vanishing.get(&i.id).is_none_or(|after| listing <= *after))
                .collect()
        }

        async fn insert(&self, event: &CanonicalEvent) -> SyncResult<String> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call::Insert(event.id.clone()));
            state.check(&event.id)?;

            let stored = state.stored(event, &event.id);
            state.events.push(stored);
            Ok(event.id.clone())
        }

        async fn update(&self, event: &CanonicalEvent, id: &str) -> SyncResult<String> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call::Update(id.to_string()));
            state.check(id)?;

            let stored = state.stored(event, id);
            let slot = state
                .events
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or_else(|| SyncError::Destination(format!("no event {id}")))?;
            *slot = stored;
            Ok(id.to_string())
        }

        async fn update_instance(&self, instance: &DestinationEvent) -> SyncResult<String> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call::UpdateInstance(instance.id.clone()));
            state.check(&instance.id)?;

            let etag = state.next_etag();
            let slot = state
                .instances
                .values_mut()
                .flatten()
                .find(|i| i.id == instance.id)
                .ok_or_else(|| SyncError::Destination(format!("no instance {}", instance.id)))?;
            if slot.etag != instance.etag {
                return Err(SyncError::Destination(format!(
                    "stale version token for {}",
                    instance.id
                )));
            }
            *slot = DestinationEvent {
                etag,
                ..instance.clone()
            };
            Ok(instance.id.clone())
        }

        async fn delete(&self, id: &str) -> SyncResult<()> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call::Delete(id.to_string()));
            state.check(id)?;

            state.events.retain(|e| e.id != id);
            Ok(())
        }
    }
}
