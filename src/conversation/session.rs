//! Conversation sessions — one per user, in memory.
//!
//! Sessions are created on a user's first turn and pruned once idle past the
//! configured TTL. The store is the only owner of session state; the engine
//! mutates sessions exclusively through its write lock, which also serializes
//! racing turns for the same user.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::analysis::struggle::StruggleTag;
use crate::conversation::stage::Stage;

/// One user's conversation state.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSession {
    /// Session id, for log correlation.
    pub id: Uuid,
    /// Owning user.
    pub user_id: String,
    /// Current dialogue stage.
    pub stage: Stage,
    /// Struggle tags captured at session creation, verbatim.
    pub context: Option<BTreeSet<StruggleTag>>,
    /// Whether the tag-specific opener has already fired.
    pub greeted: bool,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// Last turn timestamp — drives idle eviction.
    pub last_active_at: DateTime<Utc>,
}

impl ConversationSession {
    fn new(user_id: &str, context: Option<BTreeSet<StruggleTag>>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            stage: Stage::Initial,
            context,
            greeted: false,
            created_at: now,
            last_active_at: now,
        }
    }
}

/// In-memory session store keyed by user id.
///
/// At most one session per user exists at any time; re-creating an evicted
/// session starts the script over.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, ConversationSession>>,
}

impl SessionStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sessions: RwLock::new(HashMap::new()),
        })
    }

    /// Run `f` against the user's session, creating it first if absent.
    ///
    /// The store's write guard is held for the whole closure, so turns for
    /// the same user (and, coarsely, for all users) are serialized — stage
    /// transitions cannot interleave.
    pub async fn with_session<T>(
        &self,
        user_id: &str,
        context: Option<BTreeSet<StruggleTag>>,
        f: impl FnOnce(&mut ConversationSession) -> T,
    ) -> T {
        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(user_id.to_string()).or_insert_with(|| {
            let session = ConversationSession::new(user_id, context);
            info!(
                user_id,
                session_id = %session.id,
                has_context = session.context.is_some(),
                "Created conversation session"
            );
            session
        });
        session.last_active_at = Utc::now();
        f(session)
    }

    /// Snapshot one session.
    pub async fn get(&self, user_id: &str) -> Option<ConversationSession> {
        self.sessions.read().await.get(user_id).cloned()
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether no sessions are live.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Drop sessions idle longer than `ttl`. Returns how many were removed.
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::hours(1));
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|user_id, session| {
            let keep = session.last_active_at > cutoff;
            if !keep {
                debug!(%user_id, session_id = %session.id, "Evicting idle session");
            }
            keep
        });
        before - sessions.len()
    }
}

/// Spawn the periodic idle-session sweep.
pub fn spawn_eviction_task(
    store: Arc<SessionStore>,
    ttl: Duration,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let evicted = store.evict_idle(ttl).await;
            if evicted > 0 {
                info!(evicted, "Idle sessions evicted");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_session_on_first_use() {
        let store = SessionStore::new();
        assert!(store.is_empty().await);

        let stage = store
            .with_session("u1", None, |session| session.stage)
            .await;
        assert_eq!(stage, Stage::Initial);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn one_session_per_user() {
        let store = SessionStore::new();
        let first = store.with_session("u1", None, |s| s.id).await;
        let second = store.with_session("u1", None, |s| s.id).await;
        assert_eq!(first, second);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn context_stored_only_at_creation() {
        let store = SessionStore::new();
        let tags = BTreeSet::from([StruggleTag::FrequentErrors]);
        store.with_session("u1", Some(tags), |_| ()).await;

        // A later turn with different context does not overwrite.
        let other = BTreeSet::from([StruggleTag::ConfusedNavigation]);
        let stored = store
            .with_session("u1", Some(other), |s| s.context.clone())
            .await;
        assert_eq!(stored, Some(BTreeSet::from([StruggleTag::FrequentErrors])));
    }

    #[tokio::test]
    async fn mutations_persist_across_turns() {
        let store = SessionStore::new();
        store
            .with_session("u1", None, |s| s.stage = Stage::Tutorial)
            .await;
        let session = store.get("u1").await.unwrap();
        assert_eq!(session.stage, Stage::Tutorial);
    }

    #[tokio::test]
    async fn evicts_only_idle_sessions() {
        let store = SessionStore::new();
        store.with_session("old", None, |_| ()).await;
        store.with_session("fresh", None, |_| ()).await;

        // Age the first session by hand.
        {
            let mut sessions = store.sessions.write().await;
            sessions.get_mut("old").unwrap().last_active_at =
                Utc::now() - chrono::Duration::hours(2);
        }

        let evicted = store.evict_idle(Duration::from_secs(3600)).await;
        assert_eq!(evicted, 1);
        assert!(store.get("old").await.is_none());
        assert!(store.get("fresh").await.is_some());
    }

    #[tokio::test]
    async fn different_users_get_distinct_sessions() {
        let store = SessionStore::new();
        store.with_session("u1", None, |s| s.stage = Stage::Complete).await;
        let stage = store.with_session("u2", None, |s| s.stage).await;
        assert_eq!(stage, Stage::Initial);
    }
}
