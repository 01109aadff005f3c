//! The behavioral event record.
//!
//! Events arrive in the analytics export shape: the event name sits in an
//! `"event"` field, everything else lives under `"properties"` with
//! `distinct_id` and `time` (epoch seconds) as the two fields the analysis
//! requires. Extra properties are kept verbatim.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One behavioral event from the analytics export. Immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Event name, e.g. `"app open"`, `"feature_favorite_sandwich"`.
    #[serde(rename = "event")]
    pub name: String,
    /// Event properties.
    pub properties: EventProperties,
}

/// Properties attached to an event.
///
/// `distinct_id` and `time` are required for analysis but optional in the
/// wire format — events missing either are skipped at load time rather than
/// failing the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventProperties {
    /// User identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distinct_id: Option<String>,
    /// Event timestamp, epoch seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    /// Remaining export properties, untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Event {
    /// Event timestamp as epoch seconds, if present.
    pub fn time(&self) -> Option<i64> {
        self.properties.time
    }

    /// Event timestamp as a UTC datetime, if present and in range.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.properties.time.and_then(|t| DateTime::from_timestamp(t, 0))
    }

    /// User identifier, if present.
    pub fn distinct_id(&self) -> Option<&str> {
        self.properties.distinct_id.as_deref()
    }

    /// Whether the event carries both fields the analysis requires.
    pub fn is_well_formed(&self) -> bool {
        self.properties.distinct_id.is_some() && self.properties.time.is_some()
    }

    /// Feature identifier for `feature_*` events (prefix stripped).
    pub fn feature_name(&self) -> Option<&str> {
        self.name.strip_prefix("feature_")
    }

    /// Whether this is a navigation event (`page_view` / `screen_view`).
    pub fn is_navigation(&self) -> bool {
        self.name == "page_view" || self.name == "screen_view"
    }

    /// Screen name for navigation events, `"unknown"` when absent.
    pub fn screen_name(&self) -> &str {
        self.properties
            .extra
            .get("screen_name")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Event {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn deserializes_export_shape() {
        let event = parse(
            r#"{"event": "app open", "properties": {"distinct_id": "u1", "time": 1742400000, "os": "ios"}}"#,
        );
        assert_eq!(event.name, "app open");
        assert_eq!(event.distinct_id(), Some("u1"));
        assert_eq!(event.time(), Some(1742400000));
        assert_eq!(event.properties.extra["os"], "ios");
        assert!(event.is_well_formed());
    }

    #[test]
    fn missing_time_is_malformed() {
        let event = parse(r#"{"event": "app open", "properties": {"distinct_id": "u1"}}"#);
        assert!(!event.is_well_formed());
        assert!(event.timestamp().is_none());
    }

    #[test]
    fn missing_distinct_id_is_malformed() {
        let event = parse(r#"{"event": "app open", "properties": {"time": 1742400000}}"#);
        assert!(!event.is_well_formed());
    }

    #[test]
    fn feature_name_strips_prefix() {
        let event = parse(
            r#"{"event": "feature_favorite_sandwich", "properties": {"distinct_id": "u1", "time": 1}}"#,
        );
        assert_eq!(event.feature_name(), Some("favorite_sandwich"));

        let other = parse(r#"{"event": "app open", "properties": {"distinct_id": "u1", "time": 1}}"#);
        assert_eq!(other.feature_name(), None);
    }

    #[test]
    fn navigation_detection_and_screen_name() {
        let page = parse(
            r#"{"event": "page_view", "properties": {"distinct_id": "u1", "time": 1, "screen_name": "menu"}}"#,
        );
        assert!(page.is_navigation());
        assert_eq!(page.screen_name(), "menu");

        let screen = parse(r#"{"event": "screen_view", "properties": {"distinct_id": "u1", "time": 1}}"#);
        assert!(screen.is_navigation());
        assert_eq!(screen.screen_name(), "unknown");

        let other = parse(r#"{"event": "checkout", "properties": {"distinct_id": "u1", "time": 1}}"#);
        assert!(!other.is_navigation());
    }

    #[test]
    fn serde_roundtrip_preserves_extra_properties() {
        let event = parse(
            r#"{"event": "page_view", "properties": {"distinct_id": "u1", "time": 5, "screen_name": "menu", "build": 42}}"#,
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "page_view");
        assert_eq!(json["properties"]["screen_name"], "menu");
        assert_eq!(json["properties"]["build"], 42);
    }
}
