//! In-memory event store.
//!
//! Holds the validated event collection for the lifetime of the process.
//! Events missing `time` or `distinct_id` are skipped at construction
//! (skip-and-continue: one bad record must not sink the batch) and counted so
//! data quality stays visible.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::error::EventError;
use crate::events::model::Event;
use crate::events::source::EventSource;

/// Validated, immutable event collection.
pub struct EventStore {
    events: Vec<Event>,
    skipped: usize,
}

impl EventStore {
    /// Build a store from raw events, dropping malformed records.
    pub fn new(raw: Vec<Event>) -> Self {
        let total = raw.len();
        let mut skipped = 0;
        let events: Vec<Event> = raw
            .into_iter()
            .filter(|event| {
                if event.is_well_formed() {
                    true
                } else {
                    warn!(
                        name = %event.name,
                        has_distinct_id = event.distinct_id().is_some(),
                        has_time = event.time().is_some(),
                        "Skipping malformed event"
                    );
                    skipped += 1;
                    false
                }
            })
            .collect();

        if skipped > 0 {
            warn!(skipped, total, "Event export contained malformed records");
        }
        info!(count = events.len(), "Event store ready");

        Self { events, skipped }
    }

    /// Build a store by draining an event source.
    pub async fn from_source(source: &dyn EventSource) -> Result<Self, EventError> {
        let raw = source.fetch_all().await?;
        Ok(Self::new(raw))
    }

    /// All retained events, in arrival order.
    pub fn all(&self) -> &[Event] {
        &self.events
    }

    /// Number of retained events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the store holds no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of malformed records dropped at construction.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Partition events by user, preserving arrival order within each user.
    ///
    /// Every retained event has a `distinct_id` (validation guarantees it).
    pub fn by_user(&self) -> HashMap<&str, Vec<&Event>> {
        let mut users: HashMap<&str, Vec<&Event>> = HashMap::new();
        for event in &self.events {
            if let Some(user_id) = event.distinct_id() {
                users.entry(user_id).or_default().push(event);
            }
        }
        users
    }

    /// Events for one user, in arrival order.
    pub fn for_user(&self, user_id: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.distinct_id() == Some(user_id))
            .collect()
    }
}
