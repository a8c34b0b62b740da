//! Workflow state machine vocabulary
//!
//! The pipeline is a branching graph rather than a straight line: ingest
//! states fan in to transcription, processing fans out per discriminant, and
//! packaging can loop back for more outputs. The full graph lives in
//! `transitions`; this module is the source of truth for which states exist
//! and which are terminal.

use crate::schemas::State;

/// Every declared workflow state.
///
/// IMPORTANT: the transition map must have an entry for each of these; the
/// completeness tests iterate this list.
pub const ALL_STATES: &[State] = &[
    State::ProjectInit,
    State::InputSelect,
    State::InputYoutube,
    State::InputAudio,
    State::InputText,
    State::Transcription,
    State::TranscriptReview,
    State::ProcessingSelect,
    State::ResearchPromptGen,
    State::ResearchExecute,
    State::ArticleGenerate,
    State::ArticleReview,
    State::Translate,
    State::OutputSelect,
    State::ScriptGenerate,
    State::TtsRender,
    State::Package,
    State::Complete,
    State::Error,
];

/// Check if a state is terminal (no outgoing transitions).
pub fn is_terminal_state(state: State) -> bool {
    matches!(state, State::Complete | State::Error)
}
