//! Ingest stages: source selection, video URL, audio file, text
//!
//! Recoverable input problems (invalid URL, missing file, empty text) never
//! raise; they route back to `InputSelect` so the user can try again within
//! the same run.

use regex::Regex;
use tracing::{info, warn};

use crate::domain::get_next_state;
use crate::errors::{RelatoError, Result};
use crate::fs;
use crate::interact::{Prompted, SelectOption};
use crate::schemas::{Context, InputType, State};
use crate::workflow::{StageDeps, StageOutcome};

use super::{mark_stage_done, run_artifact};

/// Minimum usable length for ingested text, after trimming
const MIN_TEXT_LEN: usize = 10;

/// Ask for the input kind and collect its source value.
pub async fn input_select(ctx: Context, deps: &StageDeps<'_>) -> Result<StageOutcome> {
    let options = [
        SelectOption::new("youtube", "Video URL (YouTube)"),
        SelectOption::new("audio", "Local audio file"),
        SelectOption::new("textfile", "Local text file"),
        SelectOption::new("raw", "Paste text"),
    ];
    let choice = match deps.interact.select("What do you want to ingest?", &options)? {
        Prompted::Value(v) => v,
        Prompted::Cancelled => return Ok(StageOutcome::Cancelled),
    };
    let input_type: InputType = choice.parse().map_err(RelatoError::Routing)?;
    let mut ctx = ctx.with_input_type(input_type);

    match input_type {
        InputType::Youtube => loop {
            match deps.interact.text("Video URL")? {
                Prompted::Value(url) if !url.trim().is_empty() => {
                    ctx = ctx.with_youtube_url(Some(url.trim().to_string()));
                    break;
                }
                Prompted::Value(_) => println!("The URL cannot be empty."),
                Prompted::Cancelled => return Ok(StageOutcome::Cancelled),
            }
        },
        InputType::Audio | InputType::Textfile => loop {
            match deps.interact.text("Path to the file")? {
                Prompted::Value(path) if !path.trim().is_empty() => {
                    ctx = ctx.with_source_path(Some(path.trim().into()));
                    break;
                }
                Prompted::Value(_) => println!("The path cannot be empty."),
                Prompted::Cancelled => return Ok(StageOutcome::Cancelled),
            }
        },
        InputType::Raw => match deps.interact.text("Paste the text")? {
            // Emptiness is judged by the INPUT_TEXT stage, which routes back
            Prompted::Value(text) => ctx = ctx.with_raw_text(Some(text)),
            Prompted::Cancelled => return Ok(StageOutcome::Cancelled),
        },
    }

    let next = get_next_state(State::InputSelect, &ctx)?;
    Ok(StageOutcome::advance(next, ctx))
}

pub(crate) fn youtube_video_id(url: &str) -> Option<String> {
    let re = Regex::new(
        r"^https?://(?:www\.)?(?:youtube\.com/watch\?v=|youtu\.be/)([A-Za-z0-9_-]{6,})",
    )
    .expect("static regex");
    re.captures(url).map(|caps| caps[1].to_string())
}

/// Validate the URL, offer transcript reuse from the registry, then fetch
/// the audio track.
pub async fn input_youtube(ctx: Context, deps: &StageDeps<'_>) -> Result<StageOutcome> {
    let url = match ctx.youtube_url.clone() {
        Some(url) => url,
        None => return Ok(StageOutcome::advance(State::InputSelect, ctx)),
    };

    let video_id = match youtube_video_id(&url) {
        Some(id) => id,
        None => {
            warn!(%url, "not a valid YouTube URL");
            println!("'{}' is not a valid YouTube URL.", url);
            return Ok(StageOutcome::advance(State::InputSelect, ctx));
        }
    };

    // Reuse check: a prior transcript for the same (source, lang) can be
    // copied forward instead of re-transcribing.
    let registry = fs::read_registry(&ctx.project_dir)?;
    if let Some(prior) = registry.lookup(InputType::Youtube, &video_id, &ctx.lang) {
        if prior.exists() {
            match deps
                .interact
                .confirm("A transcript for this video already exists. Reuse it?")?
            {
                Prompted::Value(true) => {
                    let dest = run_artifact(&ctx, "transcript.txt");
                    std::fs::copy(prior, &dest)?;
                    info!(source = %prior.display(), "reusing prior transcript");
                    let ctx = ctx.with_transcript(&dest);
                    let ctx = mark_stage_done(ctx, "transcription")?;
                    return Ok(StageOutcome::advance(State::Transcription, ctx));
                }
                Prompted::Value(false) => {}
                Prompted::Cancelled => return Ok(StageOutcome::Cancelled),
            }
        }
    }

    info!(%url, "fetching audio");
    let audio = deps.engine.fetch_media(&url, &ctx.run_dir).await?;
    let ctx = ctx.with_audio(&audio);
    Ok(StageOutcome::advance(State::Transcription, ctx))
}

/// Stage a local audio file into the run directory.
pub async fn input_audio(ctx: Context, _deps: &StageDeps<'_>) -> Result<StageOutcome> {
    let source = match ctx.source_path.clone() {
        Some(path) => path,
        None => return Ok(StageOutcome::advance(State::InputSelect, ctx)),
    };

    if !source.is_file() {
        println!("File not found: {}", source.display());
        return Ok(StageOutcome::advance(State::InputSelect, ctx));
    }

    let file_name = source
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "source.mp3".into());
    let dest = ctx.run_dir.join(file_name);
    std::fs::copy(&source, &dest)?;

    let ctx = ctx.with_audio(&dest);
    Ok(StageOutcome::advance(State::Transcription, ctx))
}

/// Read a text file or pasted text and promote it straight to transcript;
/// transcription is bypassed because the input is already text.
pub async fn input_text(ctx: Context, _deps: &StageDeps<'_>) -> Result<StageOutcome> {
    let text = match ctx.input_type {
        Some(InputType::Raw) => ctx.raw_text.clone().unwrap_or_default(),
        _ => {
            let source = match ctx.source_path.clone() {
                Some(path) => path,
                None => return Ok(StageOutcome::advance(State::InputSelect, ctx)),
            };
            match std::fs::read_to_string(&source) {
                Ok(content) => content,
                Err(e) => {
                    println!("Could not read {}: {}", source.display(), e);
                    return Ok(StageOutcome::advance(State::InputSelect, ctx));
                }
            }
        }
    };

    if text.trim().len() < MIN_TEXT_LEN {
        println!("The text is empty or too short to work with.");
        return Ok(StageOutcome::advance(State::InputSelect, ctx));
    }

    let dest = run_artifact(&ctx, "transcript.txt");
    std::fs::write(&dest, text.trim())?;

    let ctx = ctx.with_transcript(&dest).with_raw_text(None);
    let ctx = mark_stage_done(ctx, "ingest")?;
    Ok(StageOutcome::advance(State::ProcessingSelect, ctx))
}
