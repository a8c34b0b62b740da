//! Command-line entry for relato
//!
//! Parses flags, loads the project configuration once, builds the
//! collaborators and hands a context to the runner. New runs start from
//! `PROJECT_INIT`; `--resume` picks up a checkpoint instead.

use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use tracing::info;

use crate::engine::ProcessEngine;
use crate::errors::{RelatoError, Result};
use crate::fs::{self, read_checkpoint};
use crate::interact::TerminalInteraction;
use crate::schemas::{Config, Context, ContextOptions, RunState, State};
use crate::workflow::{RunOutcome, Runner, StageDeps};

/// Guided content-transformation workflow: source to transcript to
/// article, podcast, reel or social posts.
#[derive(Parser, Debug)]
#[command(name = "relato", version, about)]
pub struct Cli {
    /// Project name (defaults to the working directory's name)
    #[arg(long)]
    pub project: Option<String>,

    /// Language code for transcription and generation
    #[arg(long)]
    pub lang: Option<String>,

    /// Resume a run from its checkpoint.json
    #[arg(long, value_name = "PATH")]
    pub resume: Option<PathBuf>,

    /// Start a new run from a specific state (diagnostic restarts)
    #[arg(long, value_name = "STATE")]
    pub from: Option<String>,

    /// Run against seeded sample artifacts; nothing is persisted
    #[arg(long)]
    pub sample: bool,

    /// Print external commands instead of executing them
    #[arg(long)]
    pub dry_run: bool,

    /// Working directory override
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Execute the CLI and return the process exit code.
pub async fn run(cli: Cli) -> Result<i32> {
    let cwd = fs::resolve_cwd(cli.cwd.as_deref());
    let project_name = cli
        .project
        .clone()
        .unwrap_or_else(|| fs::project_name_from_dir(&cwd));

    let project_dir = fs::get_project_dir(&cwd, &project_name);
    let config = load_or_init_config(&project_dir)?;

    let ctx = match &cli.resume {
        Some(path) => {
            let ctx = read_checkpoint(path)?;
            info!(run = %ctx.run_id, state = %ctx.current_state, "resuming");
            ctx
        }
        None => {
            let initial_state = match &cli.from {
                Some(name) => Some(
                    State::from_str(name).map_err(RelatoError::ConfigError)?,
                ),
                None => None,
            };
            let ctx = Context::create(ContextOptions {
                project_name,
                base_dir: cwd,
                lang: cli.lang.clone().or_else(|| Some(config.default_lang.clone())),
                initial_state: if cli.sample && initial_state.is_none() {
                    Some(State::ProcessingSelect)
                } else {
                    initial_state
                },
            })?;
            if cli.sample {
                seed_sample_artifacts(ctx)?
            } else {
                ctx
            }
        }
    };

    let interact = TerminalInteraction::new(config.editor.clone());
    let engine = ProcessEngine::new(config.clone(), cli.dry_run || cli.sample);
    let deps = StageDeps {
        config: &config,
        interact: &interact,
        engine: &engine,
    };

    let runner = if cli.sample {
        Runner::new(deps).without_checkpoints()
    } else {
        Runner::new(deps)
    };

    let interrupt = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    match runner.run_until(ctx, interrupt).await? {
        RunOutcome::Completed(ctx) => {
            println!("Done. Artifacts in {}", ctx.project_dir.join(&config.export_dir_name).display());
            Ok(0)
        }
        RunOutcome::Cancelled(ctx) => {
            println!(
                "Stopped at {}. Resume with: relato --resume {}",
                ctx.current_state,
                fs::get_checkpoint_path(&ctx.run_dir).display()
            );
            // Cancellation exits like an interrupt
            Ok(130)
        }
        RunOutcome::Errored { context, message } => {
            eprintln!("Run failed at {}: {}", last_working_state(&context), message);
            if !cli.sample {
                eprintln!(
                    "Checkpoint: {}",
                    fs::get_checkpoint_path(&context.run_dir).display()
                );
            }
            Ok(1)
        }
    }
}

/// Load the project configuration, writing the defaults on first use so the
/// user has a file to edit.
fn load_or_init_config(project_dir: &std::path::Path) -> Result<Config> {
    let path = fs::get_config_path(project_dir);
    if path.exists() {
        return fs::read_json(&path);
    }
    let config = Config::default();
    std::fs::create_dir_all(project_dir)?;
    fs::write_json(&path, &config)?;
    Ok(config)
}

/// The state the failure happened in: the one before the `ERROR` entry.
fn last_working_state(ctx: &Context) -> State {
    let n = ctx.state_history.len();
    if n >= 2 {
        ctx.state_history[n - 2]
    } else {
        ctx.current_state
    }
}

const SAMPLE_TRANSCRIPT: &str = "\
This is a sample transcript about growing tomatoes on a balcony. It covers \
choosing a variety, the size of pot that actually works, how often to water \
in summer, and what to do when the leaves start curling.";

/// Seed a transcript so a sample run can start at processing selection.
fn seed_sample_artifacts(ctx: Context) -> Result<Context> {
    let transcript = ctx.run_dir.join("transcript.txt");
    std::fs::write(&transcript, SAMPLE_TRANSCRIPT)?;

    let legacy = RunState::default().with_done("ingest");
    fs::write_run_state(&ctx.run_dir, &legacy)?;

    Ok(ctx.with_transcript(&transcript).with_legacy_state(legacy))
}
