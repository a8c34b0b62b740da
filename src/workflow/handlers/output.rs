//! Output selection, script generation and TTS stages

use std::str::FromStr;

use tracing::info;

use crate::domain::get_next_state;
use crate::errors::{RelatoError, Result};
use crate::interact::{Prompted, SelectOption};
use crate::prompts::{build_prompt, PromptKind};
use crate::schemas::{Context, OutputType, State};
use crate::workflow::{StageDeps, StageOutcome};

use super::{export_artifact, mark_stage_done, read_source_text, run_artifact};

/// Ask which final artifact to produce and route on the answer.
pub async fn output_select(ctx: Context, deps: &StageDeps<'_>) -> Result<StageOutcome> {
    let options = [
        SelectOption::new("podcast", "Podcast episode (script + audio)"),
        SelectOption::new("article", "Written article"),
        SelectOption::new("reel_script", "Short-form reel script"),
        SelectOption::new("export_zip", "Package everything into a zip"),
    ];

    let choice = match deps.interact.select("What should be produced?", &options)? {
        Prompted::Value(v) => v,
        Prompted::Cancelled => return Ok(StageOutcome::Cancelled),
    };

    let output_type = OutputType::from_str(&choice).map_err(RelatoError::Routing)?;
    let ctx = ctx.with_output_type(output_type);

    let next = get_next_state(State::OutputSelect, &ctx)?;
    info!(output = %output_type, next = %next, "output selected");
    Ok(StageOutcome::advance(next, ctx))
}

/// Generate the script matching the chosen output kind. Podcast scripts go
/// on to TTS; reel scripts go straight to packaging.
pub async fn script_generate(ctx: Context, deps: &StageDeps<'_>) -> Result<StageOutcome> {
    let source = read_source_text(&ctx)?;

    let ctx = match ctx.output_type {
        Some(OutputType::Podcast) => {
            let prompt = build_prompt(&ctx, PromptKind::PodcastScript, &source)?;
            let dest = run_artifact(&ctx, "podcast_script.md");
            info!("generating podcast script");
            deps.engine
                .generate(PromptKind::PodcastScript, &prompt, &dest)
                .await?;
            let ctx = ctx.with_podcast_script(&dest);
            export_artifact(ctx, deps, &dest)?
        }
        Some(OutputType::ReelScript) => {
            let prompt = build_prompt(&ctx, PromptKind::ReelScript, &source)?;
            let dest = run_artifact(&ctx, "reel_script.md");
            info!("generating reel script");
            deps.engine
                .generate(PromptKind::ReelScript, &prompt, &dest)
                .await?;
            let ctx = ctx.with_reel_script(&dest);
            export_artifact(ctx, deps, &dest)?
        }
        other => {
            return Err(RelatoError::Routing(format!(
                "Unknown outputType for script generation: {}",
                other.map(|o| o.to_string()).unwrap_or_else(|| "unset".to_string())
            )))
        }
    };

    let ctx = mark_stage_done(ctx, "script_generate")?;
    let next = get_next_state(State::ScriptGenerate, &ctx)?;
    Ok(StageOutcome::advance(next, ctx))
}

/// Render the podcast script to audio.
pub async fn tts_render(ctx: Context, deps: &StageDeps<'_>) -> Result<StageOutcome> {
    let script = ctx.podcast_script_path.clone().ok_or_else(|| {
        RelatoError::EngineError("No podcast script available for TTS".to_string())
    })?;

    let dest = run_artifact(&ctx, "podcast.mp3");
    info!(script = %script.display(), lang = %ctx.lang, "rendering audio");
    deps.engine.render_tts(&script, &ctx.lang, &dest).await?;

    let ctx = ctx.with_audio(&dest);
    let ctx = export_artifact(ctx, deps, &dest)?;
    let ctx = mark_stage_done(ctx, "tts")?;
    Ok(StageOutcome::advance(State::Package, ctx))
}
