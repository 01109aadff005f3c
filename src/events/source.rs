//! Event sources — pure I/O, no analysis logic.
//!
//! The analytics export is an external collaborator: a source hands the full
//! event collection to the store and nothing else. The stock implementation
//! reads a local export file; a live export API client would implement the
//! same trait.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::EventError;
use crate::events::model::Event;

/// Trait for event sources.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Source name for logging (e.g. "json-export").
    fn name(&self) -> &str;

    /// Fetch the full event collection.
    async fn fetch_all(&self) -> Result<Vec<Event>, EventError>;
}

/// File-backed export source.
///
/// Accepts both shapes the export tooling produces: a single JSON array, or
/// one JSON object per line (the streaming export format).
pub struct JsonExportSource {
    path: String,
}

impl JsonExportSource {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl EventSource for JsonExportSource {
    fn name(&self) -> &str {
        "json-export"
    }

    async fn fetch_all(&self) -> Result<Vec<Event>, EventError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| EventError::Read {
                path: self.path.clone(),
                source,
            })?;

        let trimmed = raw.trim_start();
        if trimmed.is_empty() {
            return Err(EventError::Empty {
                path: self.path.clone(),
            });
        }

        let events = if trimmed.starts_with('[') {
            serde_json::from_str::<Vec<Event>>(&raw).map_err(|e| EventError::Parse {
                path: self.path.clone(),
                message: e.to_string(),
            })?
        } else {
            // Line-delimited export: tolerate blank lines, fail on bad records.
            let mut events = Vec::new();
            for (lineno, line) in raw.lines().enumerate() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let event: Event = serde_json::from_str(line).map_err(|e| EventError::Parse {
                    path: self.path.clone(),
                    message: format!("line {}: {}", lineno + 1, e),
                })?;
                events.push(event);
            }
            events
        };

        debug!(source = self.name(), count = events.len(), "Export parsed");
        info!(path = %self.path, count = events.len(), "Loaded event export");
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fixture(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn reads_json_array_export() {
        let file = write_fixture(
            r#"[
                {"event": "app open", "properties": {"distinct_id": "u1", "time": 1}},
                {"event": "page_view", "properties": {"distinct_id": "u1", "time": 2, "screen_name": "menu"}}
            ]"#,
        );
        let source = JsonExportSource::new(file.path().to_string_lossy());
        let events = source.fetch_all().await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name, "app open");
        assert_eq!(events[1].screen_name(), "menu");
    }

    #[tokio::test]
    async fn reads_line_delimited_export() {
        let file = write_fixture(
            "{\"event\": \"app open\", \"properties\": {\"distinct_id\": \"u1\", \"time\": 1}}\n\
             \n\
             {\"event\": \"checkout\", \"properties\": {\"distinct_id\": \"u2\", \"time\": 2}}\n",
        );
        let source = JsonExportSource::new(file.path().to_string_lossy());
        let events = source.fetch_all().await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].distinct_id(), Some("u2"));
    }

    #[tokio::test]
    async fn missing_file_is_read_error() {
        let source = JsonExportSource::new("/nonexistent/events.json");
        let err = source.fetch_all().await.unwrap_err();
        assert!(matches!(err, EventError::Read { .. }));
    }

    #[tokio::test]
    async fn empty_file_is_empty_error() {
        let file = write_fixture("   ");
        let source = JsonExportSource::new(file.path().to_string_lossy());
        let err = source.fetch_all().await.unwrap_err();
        assert!(matches!(err, EventError::Empty { .. }));
    }

    #[tokio::test]
    async fn bad_line_reports_line_number() {
        let file = write_fixture(
            "{\"event\": \"app open\", \"properties\": {\"time\": 1}}\nnot json\n",
        );
        let source = JsonExportSource::new(file.path().to_string_lossy());
        let err = source.fetch_all().await.unwrap_err();
        match err {
            EventError::Parse { message, .. } => assert!(message.contains("line 2")),
            other => panic!("Expected Parse, got {other:?}"),
        }
    }
}
