//! The conversation script — a declarative transition table.
//!
//! Each stage carries an ordered list of keyword rules plus exactly one
//! fallback, so every (stage, utterance) pair resolves to a next stage and a
//! reply. Keyword matching is lower-cased substring containment, any-of.
//! Swapping this table out is how a real intent classifier would land without
//! touching the engine.

use std::collections::BTreeSet;

use crate::analysis::struggle::StruggleTag;
use crate::conversation::stage::Stage;

/// One keyword rule: any listed keyword moves the session to `next`.
#[derive(Debug, Clone)]
pub struct KeywordRule {
    pub keywords: Vec<String>,
    pub next: Stage,
    pub reply: String,
}

/// Scripted behavior for one stage.
#[derive(Debug, Clone)]
pub struct StageScript {
    pub stage: Stage,
    pub rules: Vec<KeywordRule>,
    /// Where an unmatched utterance lands (the stage itself, or `Initial`).
    pub fallback_next: Stage,
    pub fallback_reply: String,
}

/// A tag-specific canned opener for the first turn of a tagged session.
#[derive(Debug, Clone)]
pub struct StruggleOpener {
    pub tag: StruggleTag,
    pub reply: String,
}

/// The full conversation script.
#[derive(Debug, Clone)]
pub struct Script {
    stages: Vec<StageScript>,
    /// Checked in order — the first stored tag that matches wins.
    openers: Vec<StruggleOpener>,
    greeting: String,
}

/// Reply used when a session somehow points at a stage the script does not
/// cover; the session is sent back to `Initial` instead of crashing.
const UNSCRIPTED_STAGE_REPLY: &str =
    "Let's start over. What are you trying to do with the favorite sandwich feature?";

impl Script {
    /// Build a script from custom tables — stages are looked up in order,
    /// openers are checked in order.
    pub fn new(stages: Vec<StageScript>, openers: Vec<StruggleOpener>, greeting: String) -> Self {
        Self {
            stages,
            openers,
            greeting,
        }
    }

    /// The favorite-sandwich outreach script.
    pub fn default_script() -> Self {
        let stages = vec![
            StageScript {
                stage: Stage::Initial,
                rules: vec![
                    rule(
                        &["help", "stuck", "confused", "how", "what"],
                        Stage::HelpNeeded,
                        "I understand you need help. Could you tell me what you're trying to do \
                         with the favorite sandwich feature?",
                    ),
                    rule(
                        &["don't know", "not sure", "explain"],
                        Stage::ExplanationNeeded,
                        "Let me explain how the favorite sandwich feature works. You can save \
                         your favorite sandwich combinations to quickly reorder them later. \
                         Would you like me to show you how to use it?",
                    ),
                ],
                fallback_next: Stage::ClarificationNeeded,
                fallback_reply: "I'm not sure I understand. Are you having trouble finding the \
                                 favorite sandwich feature, or would you like to know more about \
                                 how it works?"
                    .into(),
            },
            StageScript {
                stage: Stage::HelpNeeded,
                rules: vec![rule(
                    &["save", "remember", "store"],
                    Stage::Tutorial,
                    "Great! To save a sandwich as your favorite, first customize your sandwich, \
                     then look for the heart icon. Click it to save your creation. Would you \
                     like me to guide you through this process?",
                )],
                fallback_next: Stage::HelpNeeded,
                fallback_reply: "Could you be more specific about what you're trying to do? Are \
                                 you trying to save a sandwich, find your saved sandwiches, or \
                                 something else?"
                    .into(),
            },
            StageScript {
                stage: Stage::ExplanationNeeded,
                rules: vec![rule(
                    &["yes", "sure", "okay", "show"],
                    Stage::Tutorial,
                    "Perfect! Let's start by creating your first favorite sandwich. First, go to \
                     the sandwich builder. Can you see that option on your screen?",
                )],
                fallback_next: Stage::Initial,
                fallback_reply: "No problem! Let me know if you change your mind and want to \
                                 learn more about the favorite sandwich feature."
                    .into(),
            },
            StageScript {
                stage: Stage::ClarificationNeeded,
                rules: vec![rule(
                    &["find", "where", "location"],
                    Stage::LocationHelp,
                    "The favorite sandwich feature is located in the sandwich builder. Look for \
                     the heart icon at the top of the screen. Can you see it?",
                )],
                fallback_next: Stage::Initial,
                fallback_reply: "I understand. If you need help with the favorite sandwich \
                                 feature in the future, just let me know!"
                    .into(),
            },
            StageScript {
                stage: Stage::LocationHelp,
                rules: vec![rule(
                    &["yes", "see", "found"],
                    Stage::Tutorial,
                    "Perfect! Open the sandwich builder and put your sandwich together. Let me \
                     know once you're in.",
                )],
                fallback_next: Stage::LocationHelp,
                fallback_reply: "Take another look. The heart icon sits at the top of the \
                                 sandwich builder screen. Can you spot it?"
                    .into(),
            },
            StageScript {
                stage: Stage::Tutorial,
                rules: vec![rule(
                    &["yes", "see", "found"],
                    Stage::NextStep,
                    "Great! Now, customize your sandwich as you like. Once you're happy with \
                     your creation, look for the heart icon and click it to save. Let me know \
                     when you've done that!",
                )],
                fallback_next: Stage::Tutorial,
                fallback_reply: "Take your time to find the sandwich builder. It should be on \
                                 the main menu. Can you see it?"
                    .into(),
            },
            StageScript {
                stage: Stage::NextStep,
                rules: vec![rule(
                    &["done", "finished", "saved"],
                    Stage::Complete,
                    "Excellent! You've successfully saved your favorite sandwich. You can find \
                     it anytime by clicking the 'Favorites' tab. Is there anything else you'd \
                     like to know?",
                )],
                fallback_next: Stage::NextStep,
                fallback_reply: "No rush! Let me know when you've saved your sandwich, and I'll \
                                 help you with the next step."
                    .into(),
            },
            StageScript {
                stage: Stage::Complete,
                rules: vec![],
                fallback_next: Stage::Complete,
                fallback_reply: "You're all set! Your favorite sandwich is saved. You can find \
                                 it in the 'Favorites' tab whenever you're hungry."
                    .into(),
            },
        ];

        let openers = vec![
            StruggleOpener {
                tag: StruggleTag::RepeatedAttempts("favorite_sandwich".into()),
                reply: "I notice you've tried to use the favorite sandwich feature several \
                        times. Let me help you with that. What specific part are you finding \
                        difficult?"
                    .into(),
            },
            StruggleOpener {
                tag: StruggleTag::FrequentErrors,
                reply: "I see you've encountered some errors. Let me help you avoid those. \
                        Could you tell me what you're trying to do?"
                    .into(),
            },
            StruggleOpener {
                tag: StruggleTag::ConfusedNavigation,
                reply: "I notice you've been looking around different screens. Let me help you \
                        find what you're looking for. What are you trying to accomplish?"
                    .into(),
            },
            StruggleOpener {
                tag: StruggleTag::LongTime("sandwich_builder".into()),
                reply: "I see you've spent some time in the sandwich builder. Would you like \
                        help saving your creation as a favorite?"
                    .into(),
            },
        ];

        Self {
            stages,
            openers,
            greeting: "I notice you haven't used the favorite sandwich feature yet. What are \
                       you trying to do?"
                .into(),
        }
    }

    /// The outreach greeting that opens a proactive conversation.
    pub fn greeting(&self) -> &str {
        &self.greeting
    }

    /// Resolve one turn: `(next stage, reply)`. Total — every stage/utterance
    /// combination yields a result, falling back to `Initial` for a stage the
    /// script does not cover.
    pub fn respond(&self, stage: Stage, utterance: &str) -> (Stage, &str) {
        let Some(script) = self.stages.iter().find(|s| s.stage == stage) else {
            return (Stage::Initial, UNSCRIPTED_STAGE_REPLY);
        };

        let text = utterance.to_lowercase();
        for rule in &script.rules {
            if rule.keywords.iter().any(|k| text.contains(k.as_str())) {
                return (rule.next, &rule.reply);
            }
        }
        (script.fallback_next, &script.fallback_reply)
    }

    /// The canned opener for the highest-priority stored tag, if any.
    pub fn opener_for(&self, tags: &BTreeSet<StruggleTag>) -> Option<&str> {
        self.openers
            .iter()
            .find(|opener| tags.contains(&opener.tag))
            .map(|opener| opener.reply.as_str())
    }
}

impl Default for Script {
    fn default() -> Self {
        Self::default_script()
    }
}

fn rule(keywords: &[&str], next: Stage, reply: &str) -> KeywordRule {
    KeywordRule {
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        next,
        reply: reply.into(),
    }
}
