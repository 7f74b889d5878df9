//! Dialogue state machine.
//!
//! Defines the lifecycle of a Socratic dialogue and its valid transitions.
//! The two in-flight states double as the re-entrancy guard: while a start or
//! submit is awaiting the tutor, no other start or submit is accepted.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// The lifecycle state of a dialogue.
///
/// - `Uninitialized`: session has a topic but no turns
/// - `AwaitingFirstQuestion`: start is in flight
/// - `AwaitingUserTurn`: waiting for the learner to answer
/// - `AwaitingAiTurn`: a submitted answer is being processed
/// - `Evaluated`: final assessment recorded, read-only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DialogueState {
    #[default]
    Uninitialized,
    AwaitingFirstQuestion,
    AwaitingUserTurn,
    AwaitingAiTurn,
    Evaluated,
}

impl DialogueState {
    /// Returns true while a start or submit is being processed.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::AwaitingFirstQuestion | Self::AwaitingAiTurn)
    }

    /// Returns true if the learner can submit an answer.
    pub fn accepts_user_input(&self) -> bool {
        matches!(self, Self::AwaitingUserTurn)
    }

    /// Returns true if the first question can be requested.
    pub fn can_start(&self) -> bool {
        matches!(self, Self::Uninitialized)
    }
}

impl StateMachine for DialogueState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use DialogueState::*;
        matches!(
            (self, target),
            (Uninitialized, AwaitingFirstQuestion)
                // First question stored, or start failed and can be retried
                | (AwaitingFirstQuestion, AwaitingUserTurn)
                | (AwaitingFirstQuestion, Uninitialized)
                | (AwaitingUserTurn, AwaitingAiTurn)
                // Continued, or failed and the learner may retry
                | (AwaitingAiTurn, AwaitingUserTurn)
                | (AwaitingAiTurn, Evaluated)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use DialogueState::*;
        match self {
            Uninitialized => vec![AwaitingFirstQuestion],
            AwaitingFirstQuestion => vec![AwaitingUserTurn, Uninitialized],
            AwaitingUserTurn => vec![AwaitingAiTurn],
            AwaitingAiTurn => vec![AwaitingUserTurn, Evaluated],
            Evaluated => vec![],
        }
    }
}
