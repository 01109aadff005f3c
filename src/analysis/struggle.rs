//! Struggle classification.
//!
//! Maps a [`UserContext`] onto a set of named struggle tags. Rules are
//! independent — a user can carry any combination — and deterministic: the
//! same context always produces the same set.

use std::collections::{BTreeSet, HashSet};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::analysis::context::UserContext;
use crate::config::AnalysisConfig;

/// A detected behavioral difficulty pattern.
///
/// Serializes to the wire vocabulary: `repeated_attempts_<feature>`,
/// `frequent_errors`, `confused_navigation`, `long_time_<screen>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StruggleTag {
    /// The user tried one feature repeatedly.
    RepeatedAttempts(String),
    /// The user hit several error events.
    FrequentErrors,
    /// The user bounced across many screens.
    ConfusedNavigation,
    /// The user lingered on one screen.
    LongTime(String),
}

impl std::fmt::Display for StruggleTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RepeatedAttempts(feature) => write!(f, "repeated_attempts_{feature}"),
            Self::FrequentErrors => write!(f, "frequent_errors"),
            Self::ConfusedNavigation => write!(f, "confused_navigation"),
            Self::LongTime(screen) => write!(f, "long_time_{screen}"),
        }
    }
}

impl FromStr for StruggleTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(feature) = s.strip_prefix("repeated_attempts_") {
            return Ok(Self::RepeatedAttempts(feature.to_string()));
        }
        if let Some(screen) = s.strip_prefix("long_time_") {
            return Ok(Self::LongTime(screen.to_string()));
        }
        match s {
            "frequent_errors" => Ok(Self::FrequentErrors),
            "confused_navigation" => Ok(Self::ConfusedNavigation),
            other => Err(format!("unknown struggle tag: '{other}'")),
        }
    }
}

impl Serialize for StruggleTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StruggleTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Applies the struggle heuristics to a user context.
pub struct StruggleClassifier {
    config: AnalysisConfig,
}

impl StruggleClassifier {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Classify a context. Rules are evaluated independently; none excludes
    /// another.
    pub fn classify(&self, context: &UserContext) -> BTreeSet<StruggleTag> {
        let mut tags = BTreeSet::new();

        for (feature, attempts) in &context.feature_attempts {
            if *attempts >= self.config.repeated_attempts_threshold {
                tags.insert(StruggleTag::RepeatedAttempts(feature.clone()));
            }
        }

        if context.error_events.len() >= self.config.frequent_errors_threshold {
            tags.insert(StruggleTag::FrequentErrors);
        }

        // Disorientation needs spread, not a single back-and-forth: enough
        // events overall AND enough distinct screens.
        if context.navigation_pattern.len() >= self.config.navigation_min_events {
            let screens: HashSet<&str> = context
                .navigation_pattern
                .iter()
                .map(|step| step.screen.as_str())
                .collect();
            if screens.len() >= self.config.navigation_distinct_screens
                && context.navigation_pattern.len() >= self.config.navigation_min_total
            {
                tags.insert(StruggleTag::ConfusedNavigation);
            }
        }

        for (screen, seconds) in &context.time_spent {
            if *seconds > self.config.long_screen_seconds {
                tags.insert(StruggleTag::LongTime(screen.clone()));
            }
        }

        tags
    }
}

impl Default for StruggleClassifier {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}
