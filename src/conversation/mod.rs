//! Scripted outreach conversation — stages, transition script, session store,
//! and the turn engine.

pub mod engine;
pub mod script;
pub mod session;
pub mod stage;

pub use engine::{ConversationEngine, ConversationReply};
pub use script::Script;
pub use session::{ConversationSession, SessionStore};
pub use stage::Stage;
