//! Transcription and transcript review stages

use tracing::info;

use crate::errors::{RelatoError, Result};
use crate::fs;
use crate::interact::{Prompted, SelectOption};
use crate::prompts::{build_prompt, PromptKind};
use crate::schemas::{Context, InputType, State};
use crate::workflow::{StageDeps, StageOutcome};

use super::{export_artifact, mark_stage_done, run_artifact};

/// Transcribe the staged audio. Skipped when a resume (or a registry reuse)
/// already marked the sub-step done.
pub async fn transcription(ctx: Context, deps: &StageDeps<'_>) -> Result<StageOutcome> {
    if ctx.legacy_state.is_done("transcription") && ctx.transcript_path.is_some() {
        info!("transcription already done, skipping");
        return Ok(StageOutcome::advance(State::TranscriptReview, ctx));
    }

    let audio = ctx.audio_path.clone().ok_or_else(|| {
        RelatoError::EngineError("No audio file staged for transcription".to_string())
    })?;

    let dest = run_artifact(&ctx, "transcript.txt");
    info!(audio = %audio.display(), lang = %ctx.lang, "transcribing");
    deps.engine.transcribe(&audio, &ctx.lang, &dest).await?;

    let mut ctx = ctx.with_transcript(&dest);
    ctx = record_in_registry(ctx)?;
    let ctx = mark_stage_done(ctx, "transcription")?;
    Ok(StageOutcome::advance(State::TranscriptReview, ctx))
}

/// Record the fresh transcript in the project registry so a later run with
/// the same source and language can reuse it.
fn record_in_registry(ctx: Context) -> Result<Context> {
    let (kind, identifier) = match (ctx.input_type, &ctx.youtube_url, &ctx.audio_path) {
        (Some(InputType::Youtube), Some(url), _) => {
            match super::input::youtube_video_id(url) {
                Some(id) => (InputType::Youtube, id),
                None => return Ok(ctx),
            }
        }
        (Some(InputType::Audio), _, Some(audio)) => (
            InputType::Audio,
            audio
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
        ),
        _ => return Ok(ctx),
    };

    if let Some(transcript) = &ctx.transcript_path {
        let mut registry = fs::read_registry(&ctx.project_dir)?;
        registry.record(kind, &identifier, &ctx.lang, transcript);
        fs::write_registry(&ctx.project_dir, &registry)?;
    }
    Ok(ctx)
}

/// Review gate for the transcript: clean it up, show it, then let the user
/// approve, edit or regenerate the cleanup.
pub async fn transcript_review(ctx: Context, deps: &StageDeps<'_>) -> Result<StageOutcome> {
    if ctx.legacy_state.is_done("transcript_review") {
        info!("transcript already reviewed, skipping");
        return Ok(StageOutcome::advance(State::ProcessingSelect, ctx));
    }

    let mut ctx = ensure_cleaned_transcript(ctx, deps).await?;

    let options = [
        SelectOption::new("approve", "Approve the transcript"),
        SelectOption::new("edit", "Edit it, then approve"),
        SelectOption::new("retry", "Run the cleanup again"),
    ];

    loop {
        let reviewed = ctx
            .cleaned_transcript_path
            .clone()
            .or(ctx.transcript_path.clone())
            .ok_or_else(|| {
                RelatoError::EngineError("No transcript available for review".to_string())
            })?;

        let body = std::fs::read_to_string(&reviewed)?;
        deps.interact.show("Transcript", &body);

        match deps.interact.select("What now?", &options)? {
            Prompted::Value(choice) => match choice.as_str() {
                "approve" => {
                    ctx = export_artifact(ctx, deps, &reviewed)?;
                    let ctx = mark_stage_done(ctx, "transcript_review")?;
                    return Ok(StageOutcome::advance(State::ProcessingSelect, ctx));
                }
                "edit" => {
                    // An edited transcript counts as approved
                    match deps.interact.edit_file(&reviewed)? {
                        Prompted::Value(()) => {
                            ctx = export_artifact(ctx, deps, &reviewed)?;
                            let ctx = mark_stage_done(ctx, "transcript_review")?;
                            return Ok(StageOutcome::advance(State::ProcessingSelect, ctx));
                        }
                        Prompted::Cancelled => return Ok(StageOutcome::Cancelled),
                    }
                }
                "retry" => {
                    let legacy = ctx.legacy_state.clone().with_pending("transcript_cleanup");
                    fs::write_run_state(&ctx.run_dir, &legacy)?;
                    ctx = ctx.with_legacy_state(legacy);
                    ctx = ensure_cleaned_transcript(ctx, deps).await?;
                }
                other => {
                    return Err(RelatoError::Routing(format!(
                        "Unknown review choice: {}",
                        other
                    )))
                }
            },
            Prompted::Cancelled => return Ok(StageOutcome::Cancelled),
        }
    }
}

/// Run the cleanup pass over the raw transcript unless it is already done.
async fn ensure_cleaned_transcript(ctx: Context, deps: &StageDeps<'_>) -> Result<Context> {
    if ctx.legacy_state.is_done("transcript_cleanup") && ctx.cleaned_transcript_path.is_some() {
        return Ok(ctx);
    }

    let transcript = ctx.transcript_path.clone().ok_or_else(|| {
        RelatoError::EngineError("No transcript available for cleanup".to_string())
    })?;
    let raw = std::fs::read_to_string(&transcript)?;

    let dest = run_artifact(&ctx, "transcript_clean.txt");
    let prompt = build_prompt(&ctx, PromptKind::CleanupTranscript, &raw)?;
    deps.engine
        .generate(PromptKind::CleanupTranscript, &prompt, &dest)
        .await?;

    let ctx = ctx.with_cleaned_transcript(&dest);
    mark_stage_done(ctx, "transcript_cleanup")
}
