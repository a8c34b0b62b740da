//! Per-state precondition validation
//!
//! Pure checks that a context carries everything required to *enter* a given
//! state. The runner calls this unconditionally before every handler
//! invocation, including on resume, so no stage side effect ever happens
//! against an incomplete context.

use crate::errors::{RelatoError, Result};
use crate::schemas::{Context, State};

fn missing(state: State, field: &str) -> RelatoError {
    RelatoError::Validation {
        state: state.to_string(),
        field: field.to_string(),
    }
}

/// Validate that `ctx` satisfies the preconditions to enter `state`.
///
/// Checks in order: meta fields for every state beyond `PROJECT_INIT`
/// (`projectName`, `runDir`, `runId`), then state-specific requirements.
/// Fails with a `Validation` error naming the first missing field.
pub fn validate_context_for_state(ctx: &Context, state: State) -> Result<()> {
    if state != State::ProjectInit {
        if ctx.project_name.is_empty() {
            return Err(missing(state, "projectName"));
        }
        if ctx.run_dir.as_os_str().is_empty() {
            return Err(missing(state, "runDir"));
        }
        if ctx.run_id.is_empty() {
            return Err(missing(state, "runId"));
        }
    }

    match state {
        State::InputYoutube => {
            if ctx.input_type.is_none() {
                return Err(missing(state, "inputType"));
            }
            if ctx.youtube_url.as_deref().map_or(true, str::is_empty) {
                return Err(missing(state, "youtubeUrl"));
            }
        }
        State::TranscriptReview => {
            if ctx.transcript_path.is_none() {
                return Err(missing(state, "transcriptPath"));
            }
        }
        State::ResearchExecute => {
            if ctx.research_prompt_path.is_none() {
                return Err(missing(state, "researchPromptPath"));
            }
        }
        State::ScriptGenerate => {
            if ctx.output_type.is_none() {
                return Err(missing(state, "outputType"));
            }
        }
        _ => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::{ContextOptions, InputType, OutputType};
    use std::path::Path;
    use tempfile::TempDir;

    fn make_context(temp: &TempDir) -> Context {
        Context::create(ContextOptions {
            project_name: "p".to_string(),
            base_dir: temp.path().to_path_buf(),
            lang: None,
            initial_state: None,
        })
        .unwrap()
    }

    fn missing_field(result: Result<()>) -> String {
        match result.unwrap_err() {
            RelatoError::Validation { field, .. } => field,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_project_init_passes_with_empty_meta() {
        let temp = TempDir::new().unwrap();
        let mut ctx = make_context(&temp);
        ctx.project_name = String::new();
        assert!(validate_context_for_state(&ctx, State::ProjectInit).is_ok());
    }

    #[test]
    fn test_meta_fields_checked_in_order() {
        let temp = TempDir::new().unwrap();
        let mut ctx = make_context(&temp);

        ctx.project_name = String::new();
        assert_eq!(missing_field(validate_context_for_state(&ctx, State::InputSelect)), "projectName");

        ctx.project_name = "p".to_string();
        ctx.run_dir = std::path::PathBuf::new();
        assert_eq!(missing_field(validate_context_for_state(&ctx, State::InputSelect)), "runDir");

        ctx.run_dir = temp.path().to_path_buf();
        ctx.run_id = String::new();
        assert_eq!(missing_field(validate_context_for_state(&ctx, State::InputSelect)), "runId");
    }

    #[test]
    fn test_input_youtube_requires_type_then_url() {
        let temp = TempDir::new().unwrap();
        let ctx = make_context(&temp);

        assert_eq!(
            missing_field(validate_context_for_state(&ctx, State::InputYoutube)),
            "inputType"
        );

        let with_type = ctx.clone().with_input_type(InputType::Youtube);
        assert_eq!(
            missing_field(validate_context_for_state(&with_type, State::InputYoutube)),
            "youtubeUrl"
        );

        let with_both = with_type.with_youtube_url(Some("https://youtu.be/abc".to_string()));
        assert!(validate_context_for_state(&with_both, State::InputYoutube).is_ok());
    }

    #[test]
    fn test_empty_url_counts_as_missing() {
        let temp = TempDir::new().unwrap();
        let ctx = make_context(&temp)
            .with_input_type(InputType::Youtube)
            .with_youtube_url(Some(String::new()));
        assert_eq!(
            missing_field(validate_context_for_state(&ctx, State::InputYoutube)),
            "youtubeUrl"
        );
    }

    #[test]
    fn test_transcript_review_requires_transcript() {
        let temp = TempDir::new().unwrap();
        let ctx = make_context(&temp);

        assert_eq!(
            missing_field(validate_context_for_state(&ctx, State::TranscriptReview)),
            "transcriptPath"
        );
        let ok = ctx.with_transcript(Path::new("/tmp/t.txt"));
        assert!(validate_context_for_state(&ok, State::TranscriptReview).is_ok());
    }

    #[test]
    fn test_research_execute_requires_prompt() {
        let temp = TempDir::new().unwrap();
        let ctx = make_context(&temp);

        assert_eq!(
            missing_field(validate_context_for_state(&ctx, State::ResearchExecute)),
            "researchPromptPath"
        );
        let ok = ctx.with_research_prompt(Path::new("/tmp/p.md"));
        assert!(validate_context_for_state(&ok, State::ResearchExecute).is_ok());
    }

    #[test]
    fn test_script_generate_requires_output_type() {
        let temp = TempDir::new().unwrap();
        let ctx = make_context(&temp);

        assert_eq!(
            missing_field(validate_context_for_state(&ctx, State::ScriptGenerate)),
            "outputType"
        );
        let ok = ctx.with_output_type(OutputType::Podcast);
        assert!(validate_context_for_state(&ok, State::ScriptGenerate).is_ok());
    }

    #[test]
    fn test_states_without_extra_preconditions_pass() {
        let temp = TempDir::new().unwrap();
        let ctx = make_context(&temp);

        for state in [
            State::InputSelect,
            State::ProcessingSelect,
            State::OutputSelect,
            State::Package,
            State::Complete,
        ] {
            assert!(validate_context_for_state(&ctx, state).is_ok(), "{} should pass", state);
        }
    }
}
