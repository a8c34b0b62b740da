//! Stage handlers - one per workflow state
//!
//! Contract: a handler may assume the validator passed for the state it is
//! handling; it performs that state's side effects through the collaborators
//! in `StageDeps`; recoverable input problems route back to an earlier
//! selection state instead of raising; when the next state depends on a
//! discriminant, the handler asks the transition map and honors the result.

pub mod article;
pub mod init;
pub mod input;
pub mod output;
pub mod package;
pub mod processing;
pub mod transcription;

use std::path::{Path, PathBuf};

use crate::errors::{RelatoError, Result};
use crate::fs;
use crate::schemas::{Context, State};

use super::{StageDeps, StageOutcome};

/// Invoke the handler registered for the context's current state.
pub async fn dispatch(ctx: Context, deps: &StageDeps<'_>) -> Result<StageOutcome> {
    match ctx.current_state {
        State::ProjectInit => init::project_init(ctx, deps).await,
        State::InputSelect => input::input_select(ctx, deps).await,
        State::InputYoutube => input::input_youtube(ctx, deps).await,
        State::InputAudio => input::input_audio(ctx, deps).await,
        State::InputText => input::input_text(ctx, deps).await,
        State::Transcription => transcription::transcription(ctx, deps).await,
        State::TranscriptReview => transcription::transcript_review(ctx, deps).await,
        State::ProcessingSelect => processing::processing_select(ctx, deps).await,
        State::ResearchPromptGen => processing::research_prompt_gen(ctx, deps).await,
        State::ResearchExecute => processing::research_execute(ctx, deps).await,
        State::ArticleGenerate => article::article_generate(ctx, deps).await,
        State::ArticleReview => article::article_review(ctx, deps).await,
        State::Translate => processing::translate(ctx, deps).await,
        State::OutputSelect => output::output_select(ctx, deps).await,
        State::ScriptGenerate => output::script_generate(ctx, deps).await,
        State::TtsRender => output::tts_render(ctx, deps).await,
        State::Package => package::package(ctx, deps).await,
        State::Complete | State::Error => Err(RelatoError::Routing(format!(
            "No handler for terminal state {}",
            ctx.current_state
        ))),
    }
}

// ===== SHARED HELPERS =====

/// The text the generation stages transform: the research summary when it
/// exists, otherwise the cleaned transcript, otherwise the raw transcript.
pub(crate) fn read_source_text(ctx: &Context) -> Result<String> {
    let path = ctx
        .summary_path
        .as_ref()
        .or(ctx.cleaned_transcript_path.as_ref())
        .or(ctx.transcript_path.as_ref())
        .ok_or_else(|| {
            RelatoError::EngineError("No source text available for generation".to_string())
        })?;
    std::fs::read_to_string(path).map_err(RelatoError::Io)
}

/// Copy an approved artifact into the project's export area and record it
/// in `outputFiles`. Returns the updated context.
pub(crate) fn export_artifact(
    ctx: Context,
    deps: &StageDeps<'_>,
    artifact: &Path,
) -> Result<Context> {
    let export_dir = fs::get_export_dir(&ctx.project_dir, &deps.config.export_dir_name);
    std::fs::create_dir_all(&export_dir)?;

    let file_name = artifact.file_name().ok_or_else(|| {
        RelatoError::EngineError(format!("Artifact has no file name: {}", artifact.display()))
    })?;
    let dest = export_dir.join(file_name);
    std::fs::copy(artifact, &dest)?;

    Ok(ctx.with_output_file(&dest))
}

/// Mark a legacy sub-step done, persisting the run-state file and mirroring
/// it into the context.
pub(crate) fn mark_stage_done(ctx: Context, stage: &str) -> Result<Context> {
    let legacy = ctx.legacy_state.clone().with_done(stage);
    fs::write_run_state(&ctx.run_dir, &legacy)?;
    Ok(ctx.with_legacy_state(legacy))
}

/// Path of an artifact inside the run directory.
pub(crate) fn run_artifact(ctx: &Context, name: &str) -> PathBuf {
    ctx.run_dir.join(name)
}
