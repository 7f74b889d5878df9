//! Conversation domain module.
//!
//! Turns, the dialogue lifecycle, the response analyzer and the text
//! conventions used to talk to the tutor model.

mod analyzer;
mod protocol;
mod state;
mod turn;

pub use analyzer::{
    analyze, LearnerLevel, LearnerProfile, ResponseAnalysis, ResponseMetrics, ResponseTiming,
    COMPLEX_WORD_LENGTH, CONCEPTUAL_TERMS, FAST_RESPONSE, SLOW_RESPONSE,
};
pub use protocol::{extract_json_array, extract_json_block, parse_continuation, TutorReply};
pub use state::DialogueState;
pub use turn::{next_sequence, user_turn_count, Sender, Turn, TurnDraft, TurnKind};
