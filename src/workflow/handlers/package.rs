//! Packaging stage and the "produce another output?" loop

use std::path::PathBuf;

use tracing::info;

use crate::errors::{RelatoError, Result};
use crate::fs;
use crate::interact::Prompted;
use crate::schemas::{Context, State};
use crate::workflow::{StageDeps, StageOutcome};

use super::mark_stage_done;

/// Zip the exported artifacts, then ask whether to produce another output.
/// Looping back clears the output choice so the next selection starts fresh.
pub async fn package(ctx: Context, deps: &StageDeps<'_>) -> Result<StageOutcome> {
    let files = collect_artifacts(&ctx);
    if files.is_empty() {
        return Err(RelatoError::EngineError(
            "No artifacts to package".to_string(),
        ));
    }

    let export_dir = fs::get_export_dir(&ctx.project_dir, &deps.config.export_dir_name);
    std::fs::create_dir_all(&export_dir)?;
    let dest = export_dir.join(format!("{}-{}.zip", ctx.project_name, ctx.run_id));

    info!(files = files.len(), dest = %dest.display(), "packaging");
    deps.engine.package(&files, &dest).await?;

    let ctx = ctx.with_zip(&dest).with_output_file(&dest);
    let ctx = mark_stage_done(ctx, "package")?;

    match deps.interact.confirm("Produce another output?")? {
        Prompted::Value(true) => {
            let ctx = ctx.clear_output_type();
            Ok(StageOutcome::advance(State::OutputSelect, ctx))
        }
        Prompted::Value(false) => Ok(StageOutcome::advance(State::Complete, ctx)),
        Prompted::Cancelled => Ok(StageOutcome::Cancelled),
    }
}

/// Everything exported so far, minus any archive from a previous loop pass.
/// When nothing has been through a review gate yet (packaging straight after
/// ingest), fall back to the artifacts the run has produced so far.
fn collect_artifacts(ctx: &Context) -> Vec<PathBuf> {
    let exported: Vec<PathBuf> = ctx
        .output_files
        .iter()
        .filter(|p| p.extension().map(|e| e != "zip").unwrap_or(true))
        .cloned()
        .collect();
    if !exported.is_empty() {
        return exported;
    }

    [
        &ctx.article_path,
        &ctx.social_posts_path,
        &ctx.podcast_script_path,
        &ctx.reel_script_path,
        &ctx.audio_path,
        &ctx.summary_path,
        &ctx.research_prompt_path,
        &ctx.cleaned_transcript_path,
        &ctx.transcript_path,
    ]
    .into_iter()
    .flatten()
    .filter(|p| p.is_file())
    .cloned()
    .collect()
}
