//! Stuck-user detection.
//!
//! A stuck user opens the app over and over without ever performing the one
//! tracked success action. The detector scans the whole store, and for each
//! candidate attaches the analyzer's context and the classifier's tags so the
//! outreach conversation can be personalized.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::analysis::context::{ContextAnalyzer, UserContext};
use crate::analysis::struggle::{StruggleClassifier, StruggleTag};
use crate::config::AnalysisConfig;
use crate::events::model::Event;
use crate::events::store::EventStore;

/// One flagged user, ready for outreach.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StuckUserRecord {
    /// User identifier.
    pub user_id: String,
    /// How many times the user opened the app.
    pub app_open_count: usize,
    /// The user's chronologically latest event.
    pub last_event: Event,
    /// Behavioral summary.
    pub context: UserContext,
    /// Detected struggle tags.
    pub struggling_with: BTreeSet<StruggleTag>,
}

/// Scans the event store for stuck users.
pub struct StuckUserDetector {
    config: AnalysisConfig,
    analyzer: ContextAnalyzer,
    classifier: StruggleClassifier,
}

impl StuckUserDetector {
    pub fn new(config: AnalysisConfig) -> Self {
        let analyzer = ContextAnalyzer::new(&config);
        let classifier = StruggleClassifier::new(config.clone());
        Self {
            config,
            analyzer,
            classifier,
        }
    }

    /// Scan all users in the store.
    ///
    /// Recomputes from scratch on every call — no memory of prior runs, so
    /// repeated calls over an unchanged store yield the same candidates.
    /// Output order carries no meaning.
    pub fn detect(&self, store: &EventStore) -> Vec<StuckUserRecord> {
        let users = store.by_user();
        let scanned = users.len();

        let records: Vec<StuckUserRecord> = users
            .into_iter()
            .filter_map(|(user_id, events)| self.evaluate(user_id, &events))
            .collect();

        info!(scanned, flagged = records.len(), "Stuck-user scan complete");
        records
    }

    /// Detect a single user's record, if they qualify.
    pub fn detect_user(&self, store: &EventStore, user_id: &str) -> Option<StuckUserRecord> {
        self.evaluate(user_id, &store.for_user(user_id))
    }

    fn evaluate(&self, user_id: &str, events: &[&Event]) -> Option<StuckUserRecord> {
        let app_open_count = events
            .iter()
            .filter(|e| e.name == self.config.app_open_event)
            .count();
        let feature_use_count = events
            .iter()
            .filter(|e| e.name == self.config.core_feature_event)
            .count();

        if app_open_count < self.config.min_app_opens || feature_use_count > 0 {
            return None;
        }

        let context = self.analyzer.analyze(events);
        let struggling_with = self.classifier.classify(&context);

        // Latest by timestamp; equal timestamps resolve to the last
        // occurrence in arrival order.
        let last_event = events.iter().copied().max_by_key(|e| e.time()).cloned()?;

        debug!(
            user_id,
            app_open_count,
            tags = struggling_with.len(),
            "Flagged stuck user"
        );

        Some(StuckUserRecord {
            user_id: user_id.to_string(),
            app_open_count,
            last_event,
            context,
            struggling_with,
        })
    }
}

impl Default for StuckUserDetector {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}
