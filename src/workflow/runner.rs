//! The state machine loop
//!
//! One iteration = validate the current state, run its handler, check the
//! proposed transition against the map, commit it, checkpoint. The
//! checkpoint is written strictly after the commit, so a resumed run always
//! starts from a state whose effects are already on disk.

use tracing::{error, info};

use crate::domain::{assert_valid_transition, validate_context_for_state};
use crate::errors::{RelatoError, Result};
use crate::fs::write_checkpoint;
use crate::schemas::{Context, State};

use super::handlers::dispatch;
use super::{StageDeps, StageOutcome};

/// How a run ended
#[derive(Debug)]
pub enum RunOutcome {
    /// The workflow reached `COMPLETE`
    Completed(Context),
    /// A stage failed; the context was parked in `ERROR` with the message
    Errored { context: Context, message: String },
    /// The user cancelled inside a prompt; the last checkpoint still points
    /// at the state that was interrupted
    Cancelled(Context),
}

/// Drives the workflow from the context's current state to a terminal state.
pub struct Runner<'a> {
    deps: StageDeps<'a>,
    persist_checkpoints: bool,
}

impl<'a> Runner<'a> {
    pub fn new(deps: StageDeps<'a>) -> Self {
        Runner {
            deps,
            persist_checkpoints: true,
        }
    }

    /// Disable checkpoint writes (sample runs).
    pub fn without_checkpoints(mut self) -> Self {
        self.persist_checkpoints = false;
        self
    }

    /// Run until a terminal state or a cancellation.
    ///
    /// Resuming a checkpoint parked in `ERROR` reports the recorded failure
    /// instead of re-running anything.
    pub async fn run(&self, mut ctx: Context) -> Result<RunOutcome> {
        if ctx.current_state == State::Error {
            let message = ctx
                .last_error
                .clone()
                .unwrap_or_else(|| "unknown failure".to_string());
            return Ok(RunOutcome::Errored {
                context: ctx,
                message,
            });
        }

        loop {
            if ctx.current_state == State::Complete {
                info!(run = %ctx.run_id, "workflow complete");
                return Ok(RunOutcome::Completed(ctx));
            }

            if let Err(err) = validate_context_for_state(&ctx, ctx.current_state) {
                return self.fail(ctx, err);
            }

            info!(state = %ctx.current_state, "entering stage");
            let outcome = match dispatch(ctx.clone(), &self.deps).await {
                Ok(outcome) => outcome,
                Err(err) => return self.fail(ctx, err),
            };

            match outcome {
                StageOutcome::Cancelled => {
                    info!(state = %ctx.current_state, "cancelled by user");
                    return Ok(RunOutcome::Cancelled(ctx));
                }
                StageOutcome::Advance {
                    next_state,
                    context,
                } => {
                    if let Err(err) =
                        assert_valid_transition(ctx.current_state, next_state, &context)
                    {
                        return self.fail(context, err);
                    }
                    let committed = context.advance_to(next_state);
                    if self.persist_checkpoints {
                        write_checkpoint(&committed)?;
                    }
                    ctx = committed;
                }
            }
        }
    }

    /// Run the workflow, aborting with `Interrupted` if the given future
    /// resolves first. The CLI passes the Ctrl-C signal here; `Interrupted`
    /// propagates out so the process exits with 130.
    pub async fn run_until<F>(&self, ctx: Context, interrupt: F) -> Result<RunOutcome>
    where
        F: std::future::Future<Output = ()>,
    {
        tokio::select! {
            outcome = self.run(ctx) => outcome,
            () = interrupt => Err(RelatoError::Interrupted),
        }
    }

    /// Park the run in `ERROR` with the failure recorded, checkpoint it, and
    /// report. `ERROR` is reachable from anywhere; it bypasses the map.
    fn fail(&self, ctx: Context, err: RelatoError) -> Result<RunOutcome> {
        let message = err.to_string();
        error!(state = %ctx.current_state, %message, "stage failed");

        let errored = ctx.with_error(Some(message.clone())).advance_to(State::Error);
        if self.persist_checkpoints {
            write_checkpoint(&errored)?;
        }
        Ok(RunOutcome::Errored {
            context: errored,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::stub::StubEngine;
    use crate::fs::{get_checkpoint_path, read_checkpoint};
    use crate::interact::scripted::{Answer, ScriptedInteraction};
    use crate::schemas::{Config, ContextOptions};
    use tempfile::TempDir;

    fn make_ctx(temp: &TempDir) -> Context {
        Context::create(ContextOptions {
            project_name: "p".to_string(),
            base_dir: temp.path().to_path_buf(),
            lang: None,
            initial_state: None,
        })
        .unwrap()
    }

    async fn run_with(
        ctx: Context,
        answers: Vec<Answer>,
        engine: &StubEngine,
    ) -> (RunOutcome, ScriptedInteraction) {
        let config = Config::default();
        let interact = ScriptedInteraction::new(answers);
        let outcome = {
            let deps = StageDeps {
                config: &config,
                interact: &interact,
                engine,
            };
            Runner::new(deps).run(ctx).await.unwrap()
        };
        (outcome, interact)
    }

    #[tokio::test]
    async fn test_text_input_through_prompt_only_to_completion() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("notes.txt");
        std::fs::write(&source, "a long enough body of source text").unwrap();

        let ctx = make_ctx(&temp);
        let engine = StubEngine::default();
        let answers = vec![
            Answer::Select("textfile".to_string()),
            Answer::Text(source.display().to_string()),
            Answer::Select("prompt".to_string()),
            Answer::Select("export_zip".to_string()),
            Answer::Confirm(false),
        ];

        let (outcome, interact) = run_with(ctx, answers, &engine).await;
        let ctx = match outcome {
            RunOutcome::Completed(ctx) => ctx,
            other => panic!("expected completion, got {:?}", other),
        };
        assert!(interact.is_exhausted());

        assert_eq!(ctx.current_state, State::Complete);
        assert_eq!(
            ctx.state_history,
            vec![
                State::ProjectInit,
                State::InputSelect,
                State::InputText,
                State::ProcessingSelect,
                State::ResearchPromptGen,
                State::OutputSelect,
                State::Package,
                State::Complete,
            ]
        );
        assert!(ctx.zip_path.as_ref().unwrap().exists());

        // The checkpoint on disk matches the final context
        let restored = read_checkpoint(&get_checkpoint_path(&ctx.run_dir)).unwrap();
        assert_eq!(restored, ctx);
    }

    #[tokio::test]
    async fn test_cancellation_leaves_checkpoint_at_interrupted_state() {
        let temp = TempDir::new().unwrap();
        let ctx = make_ctx(&temp);
        let engine = StubEngine::default();

        // Cancel at the input selection
        let (outcome, _) = run_with(ctx, vec![Answer::Cancel], &engine).await;
        let ctx = match outcome {
            RunOutcome::Cancelled(ctx) => ctx,
            other => panic!("expected cancellation, got {:?}", other),
        };
        assert_eq!(ctx.current_state, State::InputSelect);

        // The checkpoint still points at INPUT_SELECT, not past it
        let restored = read_checkpoint(&get_checkpoint_path(&ctx.run_dir)).unwrap();
        assert_eq!(restored.current_state, State::InputSelect);
    }

    #[tokio::test]
    async fn test_resume_from_checkpoint_continues_history() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("notes.txt");
        std::fs::write(&source, "a long enough body of source text").unwrap();

        let engine = StubEngine::default();

        // First session: ingest, then cancel at processing selection
        let ctx = make_ctx(&temp);
        let answers = vec![
            Answer::Select("textfile".to_string()),
            Answer::Text(source.display().to_string()),
            Answer::Cancel,
        ];
        let (outcome, _) = run_with(ctx, answers, &engine).await;
        let parked = match outcome {
            RunOutcome::Cancelled(ctx) => ctx,
            other => panic!("expected cancellation, got {:?}", other),
        };
        assert_eq!(parked.current_state, State::ProcessingSelect);

        // Second session: resume the checkpoint and finish
        let restored = read_checkpoint(&get_checkpoint_path(&parked.run_dir)).unwrap();
        assert_eq!(restored.state_history, parked.state_history);

        let answers = vec![
            Answer::Select("prompt".to_string()),
            Answer::Select("export_zip".to_string()),
            Answer::Confirm(false),
        ];
        let (outcome, _) = run_with(restored, answers, &engine).await;
        let finished = match outcome {
            RunOutcome::Completed(ctx) => ctx,
            other => panic!("expected completion, got {:?}", other),
        };

        // One continuous history across both sessions
        assert_eq!(finished.state_history[..parked.state_history.len()], parked.state_history[..]);
        assert_eq!(finished.current_state, State::Complete);
    }

    #[tokio::test]
    async fn test_engine_failure_parks_run_in_error() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("notes.txt");
        std::fs::write(&source, "a long enough body of source text").unwrap();

        let engine = StubEngine {
            fail_with: Some("llm provider unreachable".to_string()),
            ..Default::default()
        };

        let ctx = make_ctx(&temp);
        let answers = vec![
            Answer::Select("textfile".to_string()),
            Answer::Text(source.display().to_string()),
            Answer::Select("article".to_string()),
        ];
        let (outcome, _) = run_with(ctx, answers, &engine).await;
        let (ctx, message) = match outcome {
            RunOutcome::Errored { context, message } => (context, message),
            other => panic!("expected error, got {:?}", other),
        };

        assert_eq!(ctx.current_state, State::Error);
        assert!(message.contains("llm provider unreachable"));
        assert_eq!(ctx.last_error.as_deref(), Some(message.as_str()));

        // The error checkpoint is on disk
        let restored = read_checkpoint(&get_checkpoint_path(&ctx.run_dir)).unwrap();
        assert_eq!(restored.current_state, State::Error);
    }

    #[tokio::test]
    async fn test_resuming_error_checkpoint_reports_prior_failure() {
        let temp = TempDir::new().unwrap();
        let ctx = make_ctx(&temp)
            .with_error(Some("previous failure".to_string()))
            .advance_to(State::Error);

        let engine = StubEngine::default();
        let (outcome, _) = run_with(ctx, vec![], &engine).await;
        match outcome {
            RunOutcome::Errored { message, .. } => {
                assert_eq!(message, "previous failure");
            }
            other => panic!("expected error, got {:?}", other),
        }
        // Nothing ran
        assert!(engine.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_without_checkpoints_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let ctx = make_ctx(&temp);
        let run_dir = ctx.run_dir.clone();

        let config = Config::default();
        let interact = ScriptedInteraction::new(vec![Answer::Cancel]);
        let engine = StubEngine::default();
        let deps = StageDeps {
            config: &config,
            interact: &interact,
            engine: &engine,
        };

        let outcome = Runner::new(deps).without_checkpoints().run(ctx).await.unwrap();
        assert!(matches!(outcome, RunOutcome::Cancelled(_)));
        assert!(!get_checkpoint_path(&run_dir).exists());
    }

    #[tokio::test]
    async fn test_text_input_straight_to_export_completes() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("notes.txt");
        std::fs::write(&source, "a long enough body of source text").unwrap();

        // Nothing has been through a review gate when export is chosen;
        // packaging still has the ingested transcript to work with.
        let engine = StubEngine::default();
        let ctx = make_ctx(&temp);
        let answers = vec![
            Answer::Select("textfile".to_string()),
            Answer::Text(source.display().to_string()),
            Answer::Select("export".to_string()),
            Answer::Confirm(false),
        ];

        let (outcome, interact) = run_with(ctx, answers, &engine).await;
        let ctx = match outcome {
            RunOutcome::Completed(ctx) => ctx,
            other => panic!("expected completion, got {:?}", other),
        };
        assert!(interact.is_exhausted());
        assert_eq!(ctx.current_state, State::Complete);
        assert!(ctx.zip_path.as_ref().unwrap().exists());
    }

    /// Engine whose operations never finish, standing in for a hung tool.
    struct StalledEngine;

    #[async_trait::async_trait]
    impl crate::engine::Engine for StalledEngine {
        async fn fetch_media(
            &self,
            _url: &str,
            _dest_dir: &std::path::Path,
        ) -> crate::errors::Result<std::path::PathBuf> {
            std::future::pending().await
        }

        async fn transcribe(
            &self,
            _audio: &std::path::Path,
            _lang: &str,
            _dest: &std::path::Path,
        ) -> crate::errors::Result<()> {
            std::future::pending().await
        }

        async fn generate(
            &self,
            _kind: crate::prompts::PromptKind,
            _prompt: &str,
            _dest: &std::path::Path,
        ) -> crate::errors::Result<()> {
            std::future::pending().await
        }

        async fn render_tts(
            &self,
            _script: &std::path::Path,
            _lang: &str,
            _dest: &std::path::Path,
        ) -> crate::errors::Result<()> {
            std::future::pending().await
        }

        async fn package(
            &self,
            _files: &[std::path::PathBuf],
            _dest: &std::path::Path,
        ) -> crate::errors::Result<()> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_interrupt_signal_aborts_the_run() {
        let temp = TempDir::new().unwrap();
        let ctx = Context::create(ContextOptions {
            project_name: "p".to_string(),
            base_dir: temp.path().to_path_buf(),
            lang: None,
            initial_state: Some(State::Transcription),
        })
        .unwrap();
        let audio = ctx.run_dir.join("source.mp3");
        std::fs::write(&audio, b"audio").unwrap();
        let ctx = ctx.with_audio(&audio);

        let config = Config::default();
        let interact = ScriptedInteraction::new(vec![]);
        let engine = StalledEngine;
        let deps = StageDeps {
            config: &config,
            interact: &interact,
            engine: &engine,
        };

        let err = Runner::new(deps)
            .run_until(ctx, tokio::time::sleep(std::time::Duration::from_millis(20)))
            .await
            .unwrap_err();
        assert!(matches!(err, RelatoError::Interrupted));
        assert_eq!(crate::errors::to_exit_code(&err), 130);
    }

    #[tokio::test]
    async fn test_package_loop_produces_two_outputs() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("notes.txt");
        std::fs::write(&source, "a long enough body of source text").unwrap();

        let engine = StubEngine::default();
        let ctx = make_ctx(&temp);
        let answers = vec![
            Answer::Select("textfile".to_string()),
            Answer::Text(source.display().to_string()),
            Answer::Select("prompt".to_string()),
            // First pass: reel script
            Answer::Select("reel_script".to_string()),
            Answer::Confirm(true),
            // Second pass: just the zip
            Answer::Select("export_zip".to_string()),
            Answer::Confirm(false),
        ];

        let (outcome, interact) = run_with(ctx, answers, &engine).await;
        let ctx = match outcome {
            RunOutcome::Completed(ctx) => ctx,
            other => panic!("expected completion, got {:?}", other),
        };
        assert!(interact.is_exhausted());
        assert!(ctx.reel_script_path.is_some());
        // Two Package passes appear in the history
        let packages = ctx
            .state_history
            .iter()
            .filter(|s| **s == State::Package)
            .count();
        assert_eq!(packages, 2);
    }
}
