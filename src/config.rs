//! Configuration types.

use std::time::Duration;

/// Analysis configuration — event names and struggle thresholds.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Event name counted as "opened the app".
    pub app_open_event: String,
    /// Event name counted as the one tracked success action.
    pub core_feature_event: String,
    /// Minimum app opens before a user with zero core-feature uses is flagged.
    pub min_app_opens: usize,
    /// Attempts at a single feature before `repeated_attempts_<feature>` fires.
    pub repeated_attempts_threshold: u32,
    /// Error events before `frequent_errors` fires.
    pub frequent_errors_threshold: usize,
    /// Navigation events required before the navigation rule is considered.
    pub navigation_min_events: usize,
    /// Distinct screens required for `confused_navigation`.
    pub navigation_distinct_screens: usize,
    /// Total navigation events required for `confused_navigation`.
    pub navigation_min_total: usize,
    /// Seconds on one screen before `long_time_<screen>` fires.
    pub long_screen_seconds: u64,
    /// Most-recent actions retained in a user context.
    pub last_actions_limit: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            app_open_event: "app open".to_string(),
            core_feature_event: "favorite sandwich".to_string(),
            min_app_opens: 5,
            repeated_attempts_threshold: 3,
            frequent_errors_threshold: 2,
            navigation_min_events: 3,
            navigation_distinct_screens: 3,
            navigation_min_total: 5,
            long_screen_seconds: 300, // 5 minutes
            last_actions_limit: 10,
        }
    }
}

impl AnalysisConfig {
    /// Build config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let app_open_event =
            std::env::var("REACH_ASSIST_APP_OPEN_EVENT").unwrap_or(defaults.app_open_event);
        let core_feature_event =
            std::env::var("REACH_ASSIST_CORE_FEATURE_EVENT").unwrap_or(defaults.core_feature_event);
        let min_app_opens: usize = std::env::var("REACH_ASSIST_MIN_APP_OPENS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.min_app_opens);

        Self {
            app_open_event,
            core_feature_event,
            min_app_opens,
            ..defaults
        }
    }
}

/// Conversation engine configuration.
#[derive(Debug, Clone)]
pub struct ConversationConfig {
    /// Session idle timeout (sessions are pruned after this duration).
    pub session_idle_timeout: Duration,
    /// How often the eviction task sweeps idle sessions.
    pub eviction_interval: Duration,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            session_idle_timeout: Duration::from_secs(3600), // 1 hour
            eviction_interval: Duration::from_secs(60),
        }
    }
}

impl ConversationConfig {
    /// Build config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let session_idle_timeout = std::env::var("REACH_ASSIST_SESSION_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.session_idle_timeout);

        Self {
            session_idle_timeout,
            ..defaults
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port.
    pub port: u16,
    /// Path to the analytics event export (JSON array or JSONL).
    pub events_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            events_path: "./data/events-export.json".to_string(),
        }
    }
}

impl ServerConfig {
    /// Build config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port: u16 = std::env::var("REACH_ASSIST_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);
        let events_path =
            std::env::var("REACH_ASSIST_EVENTS_PATH").unwrap_or(defaults.events_path);

        Self { port, events_path }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_defaults_match_detection_rules() {
        let config = AnalysisConfig::default();
        assert_eq!(config.app_open_event, "app open");
        assert_eq!(config.min_app_opens, 5);
        assert_eq!(config.repeated_attempts_threshold, 3);
        assert_eq!(config.frequent_errors_threshold, 2);
        assert_eq!(config.navigation_distinct_screens, 3);
        assert_eq!(config.navigation_min_total, 5);
        assert_eq!(config.long_screen_seconds, 300);
        assert_eq!(config.last_actions_limit, 10);
    }

    #[test]
    fn conversation_defaults() {
        let config = ConversationConfig::default();
        assert_eq!(config.session_idle_timeout, Duration::from_secs(3600));
    }
}
