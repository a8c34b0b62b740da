//! The authoritative state graph
//!
//! For each state either a fixed set of allowed next states or a pure
//! function of the context that picks exactly one. Multi-element static sets
//! mean "any member is legal"; the handler's return value makes the actual
//! choice (`Package` may loop back to `OutputSelect` or finish, ingest
//! states may bounce back to `InputSelect` on recoverable input errors).

use crate::errors::{RelatoError, Result};
use crate::schemas::{Context, InputType, OutputType, ProcessingType, State};

/// Hard cap on article regeneration attempts. Once exhausted, a still-failing
/// review converts into forward progress to `OutputSelect`.
pub const MAX_ARTICLE_ATTEMPTS: u32 = 3;

/// Transition rule for one state
pub enum Rule {
    /// Any member of the set is a legal next state
    Static(&'static [State]),
    /// The context's discriminant picks exactly one next state
    Dynamic(fn(&Context) -> Result<State>),
    /// No outgoing transitions
    Terminal,
}

/// Look up the transition rule for a state.
///
/// Exhaustive by construction: adding a `State` variant without extending
/// this match is a compile error.
pub fn transition_rule(state: State) -> Rule {
    match state {
        State::ProjectInit => Rule::Static(&[State::InputSelect]),
        State::InputSelect => Rule::Dynamic(route_input_select),
        State::InputYoutube => Rule::Static(&[State::Transcription, State::InputSelect]),
        State::InputAudio => Rule::Static(&[State::Transcription, State::InputSelect]),
        // Text is already text: transcription is bypassed
        State::InputText => Rule::Static(&[State::ProcessingSelect, State::InputSelect]),
        State::Transcription => Rule::Static(&[State::TranscriptReview]),
        State::TranscriptReview => Rule::Static(&[State::ProcessingSelect]),
        State::ProcessingSelect => Rule::Dynamic(route_processing_select),
        State::ResearchPromptGen => Rule::Dynamic(route_research_prompt_gen),
        State::ResearchExecute => Rule::Static(&[State::OutputSelect]),
        State::ArticleGenerate => Rule::Static(&[State::ArticleReview]),
        State::ArticleReview => Rule::Dynamic(route_article_review),
        State::Translate => Rule::Static(&[State::OutputSelect]),
        State::OutputSelect => Rule::Dynamic(route_output_select),
        State::ScriptGenerate => Rule::Dynamic(route_script_generate),
        State::TtsRender => Rule::Static(&[State::Package]),
        State::Package => Rule::Static(&[State::OutputSelect, State::Complete]),
        State::Complete => Rule::Terminal,
        State::Error => Rule::Terminal,
    }
}

fn route_input_select(ctx: &Context) -> Result<State> {
    match ctx.input_type {
        Some(InputType::Youtube) => Ok(State::InputYoutube),
        Some(InputType::Audio) => Ok(State::InputAudio),
        Some(InputType::Textfile) | Some(InputType::Raw) => Ok(State::InputText),
        None => Err(RelatoError::Routing(
            "Unknown inputType: field is not set".to_string(),
        )),
    }
}

fn route_processing_select(ctx: &Context) -> Result<State> {
    match ctx.processing_type {
        Some(ProcessingType::Prompt) | Some(ProcessingType::Article) => {
            Ok(State::ResearchPromptGen)
        }
        Some(ProcessingType::PodcastScript) => Ok(State::ScriptGenerate),
        Some(ProcessingType::Export) => Ok(State::Package),
        Some(ProcessingType::Translate) => Ok(State::Translate),
        None => Err(RelatoError::Routing(
            "Unknown processingType: field is not set".to_string(),
        )),
    }
}

fn route_research_prompt_gen(ctx: &Context) -> Result<State> {
    match ctx.processing_type {
        // Prompt-only short-circuit: the prompt itself is the deliverable
        Some(ProcessingType::Prompt) => Ok(State::OutputSelect),
        Some(ProcessingType::Article) => Ok(State::ResearchExecute),
        other => Err(RelatoError::Routing(format!(
            "Unknown processingType for RESEARCH_PROMPT_GEN: {}",
            other.map(|p| p.to_string()).unwrap_or_else(|| "unset".to_string())
        ))),
    }
}

fn route_article_review(ctx: &Context) -> Result<State> {
    // Retry while an error marker is set and attempts remain; exhaustion
    // silently converts a still-failing review into forward progress.
    if ctx.last_error.is_some() && ctx.article_attempts < MAX_ARTICLE_ATTEMPTS {
        Ok(State::ArticleGenerate)
    } else {
        Ok(State::OutputSelect)
    }
}

fn route_output_select(ctx: &Context) -> Result<State> {
    match ctx.output_type {
        Some(OutputType::Podcast) | Some(OutputType::ReelScript) => Ok(State::ScriptGenerate),
        Some(OutputType::Article) => Ok(State::ArticleGenerate),
        Some(OutputType::ExportZip) => Ok(State::Package),
        None => Err(RelatoError::Routing(
            "Unknown outputType: field is not set".to_string(),
        )),
    }
}

fn route_script_generate(ctx: &Context) -> Result<State> {
    match ctx.output_type {
        Some(OutputType::Podcast) => Ok(State::TtsRender),
        Some(OutputType::ReelScript) => Ok(State::Package),
        other => Err(RelatoError::Routing(format!(
            "Unknown outputType for SCRIPT_GENERATE: {}",
            other.map(|o| o.to_string()).unwrap_or_else(|| "unset".to_string())
        ))),
    }
}

/// Resolve the allowed next state(s) for `from` given the context.
///
/// Static rules return the full allowed set; dynamic rules resolve the
/// discriminant to a single state. Terminal states return the empty set.
pub fn next_states(from: State, ctx: &Context) -> Result<Vec<State>> {
    match transition_rule(from) {
        Rule::Static(targets) => Ok(targets.to_vec()),
        Rule::Dynamic(resolve) => Ok(vec![resolve(ctx)?]),
        Rule::Terminal => Ok(Vec::new()),
    }
}

/// Resolve the single next state for `from`.
///
/// For multi-target static sets the first element is the forward edge;
/// callers that want the full set use `next_states`.
pub fn get_next_state(from: State, ctx: &Context) -> Result<State> {
    let allowed = next_states(from, ctx)?;
    allowed.first().copied().ok_or_else(|| {
        RelatoError::InvalidTransition {
            from: from.to_string(),
            to: "(terminal)".to_string(),
        }
    })
}

/// Assert that the transition `from -> to` is legal.
///
/// A failure here after a handler returned is a programming-error class:
/// either the handler proposed an edge the map doesn't have, or it wrote a
/// discriminant that resolves elsewhere.
pub fn assert_valid_transition(from: State, to: State, ctx: &Context) -> Result<()> {
    let allowed = next_states(from, ctx)?;
    if allowed.contains(&to) {
        Ok(())
    } else {
        Err(RelatoError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}
