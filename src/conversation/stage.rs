//! Conversation stages — the nodes of the scripted dialogue.

use serde::{Deserialize, Serialize};

/// The stage of one user's outreach conversation.
///
/// `Initial` branches into the three assessment stages, which converge
/// through `Tutorial` and `NextStep` to `Complete`. Only `Complete` is
/// terminal; every other stage either loops or falls back to `Initial`, so
/// there is always a scripted reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Initial,
    HelpNeeded,
    ExplanationNeeded,
    ClarificationNeeded,
    LocationHelp,
    Tutorial,
    NextStep,
    Complete,
}

impl Stage {
    /// Whether the scripted flow has finished.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// All stages, for exhaustiveness checks in tests.
    pub fn all() -> [Stage; 8] {
        [
            Self::Initial,
            Self::HelpNeeded,
            Self::ExplanationNeeded,
            Self::ClarificationNeeded,
            Self::LocationHelp,
            Self::Tutorial,
            Self::NextStep,
            Self::Complete,
        ]
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::Initial
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Initial => "initial",
            Self::HelpNeeded => "help_needed",
            Self::ExplanationNeeded => "explanation_needed",
            Self::ClarificationNeeded => "clarification_needed",
            Self::LocationHelp => "location_help",
            Self::Tutorial => "tutorial",
            Self::NextStep => "next_step",
            Self::Complete => "complete",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_complete_is_terminal() {
        for stage in Stage::all() {
            assert_eq!(stage.is_terminal(), stage == Stage::Complete);
        }
    }

    #[test]
    fn display_matches_serde() {
        for stage in Stage::all() {
            let display = format!("{stage}");
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(format!("\"{display}\""), json);
        }
    }

    #[test]
    fn default_is_initial() {
        assert_eq!(Stage::default(), Stage::Initial);
    }
}
