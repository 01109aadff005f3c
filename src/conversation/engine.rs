//! The conversation turn engine.
//!
//! One entry point: [`ConversationEngine::advance`]. Sessions are created on
//! the first turn; a stored struggle context personalizes that first turn
//! with a canned opener, after which the scripted keyword flow takes over.
//! The engine never fails a turn — there is always a reply.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::analysis::struggle::StruggleTag;
use crate::conversation::script::Script;
use crate::conversation::session::SessionStore;
use crate::conversation::stage::Stage;

/// The outcome of one turn.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationReply {
    /// What the assistant says.
    pub response: String,
    /// The stage the session is in after this turn.
    pub stage: Stage,
}

/// Drives scripted conversations over the session store.
pub struct ConversationEngine {
    script: Script,
    sessions: Arc<SessionStore>,
}

impl ConversationEngine {
    pub fn new(script: Script, sessions: Arc<SessionStore>) -> Self {
        Self { script, sessions }
    }

    /// Open a proactive outreach conversation.
    ///
    /// Seeds the session with the user's struggle tags and returns the
    /// greeting. The tag-specific opener stays available for the user's
    /// first actual reply.
    pub async fn open_outreach(
        &self,
        user_id: &str,
        tags: BTreeSet<StruggleTag>,
    ) -> ConversationReply {
        info!(user_id, tags = tags.len(), "Opening outreach conversation");
        self.sessions
            .with_session(user_id, Some(tags), |session| ConversationReply {
                response: self.script.greeting().to_string(),
                stage: session.stage,
            })
            .await
    }

    /// Process one turn for a user.
    ///
    /// `context` is consulted only if this turn creates the session; an
    /// existing session keeps the context it was created with.
    pub async fn advance(
        &self,
        user_id: &str,
        utterance: &str,
        context: Option<BTreeSet<StruggleTag>>,
    ) -> ConversationReply {
        self.sessions
            .with_session(user_id, context, |session| {
                // Tag-specific opener: first turn only. The flag flips even
                // when no opener matches so the check is never repeated.
                if !session.greeted {
                    session.greeted = true;
                    if let Some(tags) = &session.context
                        && let Some(opener) = self.script.opener_for(tags)
                    {
                        info!(user_id, stage = %session.stage, "Struggle opener served");
                        return ConversationReply {
                            response: opener.to_string(),
                            stage: session.stage,
                        };
                    }
                }

                let from = session.stage;
                let (next, reply) = self.script.respond(from, utterance);
                session.stage = next;
                debug!(user_id, %from, to = %next, "Conversation turn");

                ConversationReply {
                    response: reply.to_string(),
                    stage: next,
                }
            })
            .await
    }

    /// The session store backing this engine.
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }
}
