use std::sync::Arc;

use anyhow::Context;

use reach_assist::analysis::detector::StuckUserDetector;
use reach_assist::config::{AnalysisConfig, ConversationConfig, ServerConfig};
use reach_assist::conversation::engine::ConversationEngine;
use reach_assist::conversation::script::Script;
use reach_assist::conversation::session::{self, SessionStore};
use reach_assist::events::source::JsonExportSource;
use reach_assist::events::store::EventStore;
use reach_assist::server::api_routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let analysis_config = AnalysisConfig::from_env();
    let conversation_config = ConversationConfig::from_env();
    let server_config = ServerConfig::from_env();

    eprintln!("🥪 Reach Assist v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Events: {}", server_config.events_path);
    eprintln!("   Core feature event: {:?}", analysis_config.core_feature_event);
    eprintln!("   API: http://0.0.0.0:{}/api/stuck-users", server_config.port);

    // ── Event store ──────────────────────────────────────────────────────
    let source = JsonExportSource::new(server_config.events_path.clone());
    let store = Arc::new(
        EventStore::from_source(&source)
            .await
            .with_context(|| format!("loading event export {}", server_config.events_path))?,
    );
    if store.skipped() > 0 {
        eprintln!(
            "   Warning: {} malformed events skipped during load",
            store.skipped()
        );
    }

    // ── Detection ────────────────────────────────────────────────────────
    let detector = Arc::new(StuckUserDetector::new(analysis_config));
    let flagged = detector.detect(&store).len();
    eprintln!("   Events loaded: {} ({} stuck users)", store.len(), flagged);

    // ── Conversation engine ──────────────────────────────────────────────
    let sessions = SessionStore::new();
    let _eviction_handle = session::spawn_eviction_task(
        Arc::clone(&sessions),
        conversation_config.session_idle_timeout,
        conversation_config.eviction_interval,
    );
    let engine = Arc::new(ConversationEngine::new(Script::default_script(), sessions));

    // ── HTTP server ──────────────────────────────────────────────────────
    let app = api_routes(store, detector, engine);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", server_config.port))
        .await
        .with_context(|| format!("binding port {}", server_config.port))?;
    tracing::info!(port = server_config.port, "Reach Assist API started");
    axum::serve(listener, app).await?;

    Ok(())
}
