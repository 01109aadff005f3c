//! Corpus-wide event inventory.
//!
//! Summarizes the whole export rather than one user: which event names exist,
//! how often each fires, which property keys each carries, and which names
//! look like user-journey steps or struggle points. Useful when deciding
//! which feature the outreach campaign should target.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::events::store::EventStore;

/// Event-name fragments that mark a user-journey step.
const JOURNEY_WORDS: &[&str] = &[
    "view", "click", "start", "complete", "submit", "create", "edit", "update", "delete",
    "search", "filter",
];

/// Event-name fragments that mark a struggle point.
const STRUGGLE_WORDS: &[&str] = &[
    "error", "fail", "abandon", "cancel", "timeout", "invalid", "retry", "exception",
];

/// Corpus summary over the full event collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventInventory {
    /// Number of distinct event names.
    pub total_unique_events: usize,
    /// Occurrences per event name.
    pub event_counts: BTreeMap<String, usize>,
    /// Property keys observed per event name (beyond the required pair).
    pub event_properties: BTreeMap<String, BTreeSet<String>>,
    /// Event names that look like user-journey steps.
    pub journey_events: BTreeSet<String>,
    /// Event names that look like struggle points.
    pub struggle_events: BTreeSet<String>,
}

impl EventInventory {
    /// Build the inventory from the store.
    pub fn build(store: &EventStore) -> Self {
        let mut event_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut event_properties: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for event in store.all() {
            *event_counts.entry(event.name.clone()).or_insert(0) += 1;
            let keys = event_properties.entry(event.name.clone()).or_default();
            for key in event.properties.extra.keys() {
                keys.insert(key.clone());
            }
        }

        let journey_events = event_counts
            .keys()
            .filter(|name| contains_any(name, JOURNEY_WORDS))
            .cloned()
            .collect();
        let struggle_events = event_counts
            .keys()
            .filter(|name| contains_any(name, STRUGGLE_WORDS))
            .cloned()
            .collect();

        Self {
            total_unique_events: event_counts.len(),
            event_counts,
            event_properties,
            journey_events,
            struggle_events,
        }
    }
}

fn contains_any(name: &str, words: &[&str]) -> bool {
    let lower = name.to_lowercase();
    words.iter().any(|word| lower.contains(word))
}
