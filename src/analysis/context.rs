//! Per-user behavioral context.
//!
//! The analyzer turns one user's raw event stream into a structured summary:
//! what they attempted, what errored, where they navigated, and what they did
//! last. Pure function of its input — nothing is cached or persisted.

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::AnalysisConfig;
use crate::events::model::{Event, EventProperties};

/// One entry in the recent-actions window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Event name.
    pub event: String,
    /// Event timestamp, epoch seconds.
    pub time: i64,
    /// Event properties, verbatim.
    pub properties: EventProperties,
}

/// One navigation step (`page_view` / `screen_view`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationStep {
    /// Screen name, `"unknown"` when the event carried none.
    pub screen: String,
    /// Event timestamp, epoch seconds.
    pub time: i64,
}

/// Structured behavioral summary for one user.
///
/// Rebuilt fresh on every analysis call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserContext {
    /// Attempt count per feature (`feature_` prefix stripped).
    pub feature_attempts: BTreeMap<String, u32>,
    /// Most recent actions, chronological, capped.
    pub last_actions: Vec<ActionRecord>,
    /// Events whose name mentions an error or failure.
    pub error_events: Vec<Event>,
    /// Chronological navigation steps.
    pub navigation_pattern: Vec<NavigationStep>,
    /// Seconds spent per screen. No duration tracker feeds this yet, so live
    /// analysis always leaves it empty; the classifier rule over it stays
    /// dormant until a producer exists.
    pub time_spent: BTreeMap<String, u64>,
}

/// Builds a [`UserContext`] from one user's events.
pub struct ContextAnalyzer {
    error_pattern: Regex,
    last_actions_limit: usize,
}

impl ContextAnalyzer {
    /// Create an analyzer with the configured recent-actions window.
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            // "error" or "failed" anywhere in the event name, any casing.
            error_pattern: Regex::new(r"(?i)(error|failed)").unwrap(),
            last_actions_limit: config.last_actions_limit,
        }
    }

    /// Analyze one user's events.
    ///
    /// Events are processed in ascending `time` order regardless of arrival
    /// order. Events without a `time` are skipped with a warning rather than
    /// failing the batch.
    pub fn analyze(&self, events: &[&Event]) -> UserContext {
        let mut sorted: Vec<&Event> = Vec::with_capacity(events.len());
        for event in events {
            if event.time().is_some() {
                sorted.push(*event);
            } else {
                warn!(name = %event.name, "Skipping event without time in analysis");
            }
        }
        // Stable sort: equal timestamps keep arrival order.
        sorted.sort_by_key(|e| e.time());

        let mut context = UserContext::default();

        for event in sorted {
            let time = event.time().unwrap_or_default();

            if let Some(feature) = event.feature_name() {
                *context.feature_attempts.entry(feature.to_string()).or_insert(0) += 1;
            }

            context.last_actions.push(ActionRecord {
                event: event.name.clone(),
                time,
                properties: event.properties.clone(),
            });

            if self.error_pattern.is_match(&event.name) {
                context.error_events.push((*event).clone());
            }

            if event.is_navigation() {
                context.navigation_pattern.push(NavigationStep {
                    screen: event.screen_name().to_string(),
                    time,
                });
            }
        }

        // Keep only the tail of the chronological stream.
        if context.last_actions.len() > self.last_actions_limit {
            let drop = context.last_actions.len() - self.last_actions_limit;
            context.last_actions.drain(..drop);
        }

        context
    }
}

impl Default for ContextAnalyzer {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_event(name: &str, time: Option<i64>) -> Event {
        Event {
            name: name.into(),
            properties: EventProperties {
                distinct_id: Some("u1".into()),
                time,
                extra: serde_json::Map::new(),
            },
        }
    }

    fn make_nav(screen: &str, time: i64) -> Event {
        let mut extra = serde_json::Map::new();
        extra.insert("screen_name".into(), serde_json::json!(screen));
        Event {
            name: "screen_view".into(),
            properties: EventProperties {
                distinct_id: Some("u1".into()),
                time: Some(time),
                extra,
            },
        }
    }

    fn analyze(events: &[Event]) -> UserContext {
        let refs: Vec<&Event> = events.iter().collect();
        ContextAnalyzer::default().analyze(&refs)
    }

    #[test]
    fn counts_feature_attempts() {
        let events = vec![
            make_event("feature_favorite_sandwich", Some(1)),
            make_event("feature_favorite_sandwich", Some(2)),
            make_event("feature_search", Some(3)),
            make_event("app open", Some(4)),
        ];
        let context = analyze(&events);
        assert_eq!(context.feature_attempts["favorite_sandwich"], 2);
        assert_eq!(context.feature_attempts["search"], 1);
        assert_eq!(context.feature_attempts.len(), 2);
    }

    #[test]
    fn last_actions_capped_and_chronological() {
        let events: Vec<Event> = (0..15)
            .rev() // arrive newest-first to exercise the sort
            .map(|i| make_event(&format!("event_{i}"), Some(i)))
            .collect();
        let context = analyze(&events);
        assert_eq!(context.last_actions.len(), 10);
        // Tail of the chronological stream: times 5..=14, ascending.
        let times: Vec<i64> = context.last_actions.iter().map(|a| a.time).collect();
        assert_eq!(times, (5..15).collect::<Vec<i64>>());
    }

    #[test]
    fn collects_error_events_case_insensitively() {
        let events = vec![
            make_event("favorite_Error_x", Some(1)),
            make_event("payment FAILED", Some(2)),
            make_event("checkout", Some(3)),
        ];
        let context = analyze(&events);
        assert_eq!(context.error_events.len(), 2);
    }

    #[test]
    fn collects_navigation_with_unknown_screen() {
        let events = vec![
            make_nav("menu", 1),
            make_event("page_view", Some(2)), // no screen_name
            make_event("checkout", Some(3)),
        ];
        let context = analyze(&events);
        assert_eq!(context.navigation_pattern.len(), 2);
        assert_eq!(context.navigation_pattern[0].screen, "menu");
        assert_eq!(context.navigation_pattern[1].screen, "unknown");
    }

    #[test]
    fn skips_events_without_time() {
        let events = vec![
            make_event("feature_search", None),
            make_event("feature_search", Some(1)),
        ];
        let context = analyze(&events);
        // The timeless event contributes to nothing.
        assert_eq!(context.feature_attempts["search"], 1);
        assert_eq!(context.last_actions.len(), 1);
    }

    #[test]
    fn time_spent_is_empty_without_a_producer() {
        let events = vec![make_nav("menu", 1), make_nav("builder", 2)];
        let context = analyze(&events);
        assert!(context.time_spent.is_empty());
    }

    #[test]
    fn empty_input_yields_default_context() {
        let context = analyze(&[]);
        assert!(context.feature_attempts.is_empty());
        assert!(context.last_actions.is_empty());
        assert!(context.error_events.is_empty());
        assert!(context.navigation_pattern.is_empty());
    }
}
