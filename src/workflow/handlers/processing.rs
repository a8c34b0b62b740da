//! Processing selection, research and translation stages

use std::str::FromStr;

use tracing::info;

use crate::domain::get_next_state;
use crate::errors::{RelatoError, Result};
use crate::interact::{Prompted, SelectOption};
use crate::prompts::{build_prompt, PromptKind};
use crate::schemas::{Context, OutputType, ProcessingType, State};
use crate::workflow::{StageDeps, StageOutcome};

use super::{export_artifact, mark_stage_done, read_source_text, run_artifact};

/// Ask what to do with the approved transcript and route on the answer.
pub async fn processing_select(ctx: Context, deps: &StageDeps<'_>) -> Result<StageOutcome> {
    let options = [
        SelectOption::new("prompt", "Generate a research prompt only"),
        SelectOption::new("article", "Research and write an article"),
        SelectOption::new("podcast_script", "Write a podcast script"),
        SelectOption::new("translate", "Translate the transcript"),
        SelectOption::new("export", "Package what exists so far"),
    ];

    let choice = match deps.interact.select("How should this be processed?", &options)? {
        Prompted::Value(v) => v,
        Prompted::Cancelled => return Ok(StageOutcome::Cancelled),
    };

    let processing_type = ProcessingType::from_str(&choice).map_err(RelatoError::Routing)?;
    let mut ctx = ctx.with_processing_type(processing_type);

    // A podcast script chosen here is an output choice too; the script
    // stage routes on the output kind.
    if processing_type == ProcessingType::PodcastScript {
        ctx = ctx.with_output_type(OutputType::Podcast);
    }

    let next = get_next_state(State::ProcessingSelect, &ctx)?;
    info!(processing = %processing_type, next = %next, "processing selected");
    Ok(StageOutcome::advance(next, ctx))
}

/// Render the research prompt from the transcript. For the prompt-only path
/// the rendered prompt is itself the deliverable and gets exported.
pub async fn research_prompt_gen(ctx: Context, deps: &StageDeps<'_>) -> Result<StageOutcome> {
    let source = read_source_text(&ctx)?;
    let prompt = build_prompt(&ctx, PromptKind::ResearchPrompt, &source)?;

    let dest = run_artifact(&ctx, "research_prompt.md");
    std::fs::write(&dest, &prompt)?;

    let mut ctx = ctx.with_research_prompt(&dest);
    if ctx.processing_type == Some(ProcessingType::Prompt) {
        ctx = export_artifact(ctx, deps, &dest)?;
    }
    let ctx = mark_stage_done(ctx, "research_prompt")?;

    let next = get_next_state(State::ResearchPromptGen, &ctx)?;
    Ok(StageOutcome::advance(next, ctx))
}

/// Run the research prompt through the generation engine to produce the
/// summary the downstream stages write from.
pub async fn research_execute(ctx: Context, deps: &StageDeps<'_>) -> Result<StageOutcome> {
    let prompt_path = ctx.research_prompt_path.clone().ok_or_else(|| {
        RelatoError::EngineError("No research prompt available".to_string())
    })?;
    let prompt = std::fs::read_to_string(&prompt_path)?;

    let dest = run_artifact(&ctx, "summary.md");
    info!("running research");
    deps.engine.generate(PromptKind::Research, &prompt, &dest).await?;

    let ctx = ctx.with_summary(&dest);
    let ctx = mark_stage_done(ctx, "research")?;
    Ok(StageOutcome::advance(State::OutputSelect, ctx))
}

/// Translate the working text into the run language. The translation
/// replaces the cleaned transcript as the source for later stages.
pub async fn translate(ctx: Context, deps: &StageDeps<'_>) -> Result<StageOutcome> {
    let source = read_source_text(&ctx)?;
    let prompt = build_prompt(&ctx, PromptKind::Translate, &source)?;

    let dest = run_artifact(&ctx, format!("translated_{}.md", ctx.lang).as_str());
    info!(lang = %ctx.lang, "translating");
    deps.engine.generate(PromptKind::Translate, &prompt, &dest).await?;

    let ctx = ctx.with_cleaned_transcript(&dest);
    let ctx = export_artifact(ctx, deps, &dest)?;
    let ctx = mark_stage_done(ctx, "translate")?;
    Ok(StageOutcome::advance(State::OutputSelect, ctx))
}
