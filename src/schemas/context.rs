//! Workflow context - the snapshot of run data threaded through the state machine
//!
//! The context is mutated only by replacement: every builder method consumes
//! the receiver and returns a new value, so a checkpoint is always consistent
//! with exactly one committed transition.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::fs::paths::{get_project_dir, get_run_dir};
use crate::schemas::{InputType, OutputType, ProcessingType, RunState, State};

/// Options for creating a fresh context
#[derive(Debug, Clone)]
pub struct ContextOptions {
    /// Project name (required; the CLI defaults it to the cwd directory name)
    pub project_name: String,

    /// Base directory that holds project directories
    pub base_dir: PathBuf,

    /// Language code (default "es")
    pub lang: Option<String>,

    /// Initial-state override for diagnostic restarts
    pub initial_state: Option<State>,
}

/// The full snapshot of run data threaded through the state machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    /// Project this run belongs to
    pub project_name: String,

    /// Directory holding the project's runs, registry, config and exports
    pub project_dir: PathBuf,

    /// Directory holding this run's artifacts and checkpoint
    pub run_dir: PathBuf,

    /// Unique run identifier
    pub run_id: String,

    /// ISO 8601 timestamp of run creation
    pub started_at: String,

    /// State the run is currently in; always the last element of `state_history`
    pub current_state: State,

    /// Append-only sequence of states entered, in order
    pub state_history: Vec<State>,

    /// Kind of source being ingested
    #[serde(default)]
    pub input_type: Option<InputType>,

    /// What to do with the transcript
    #[serde(default)]
    pub processing_type: Option<ProcessingType>,

    /// Final artifact kind
    #[serde(default)]
    pub output_type: Option<OutputType>,

    /// Video URL for youtube input
    #[serde(default)]
    pub youtube_url: Option<String>,

    /// Local source file (audio or text) staged for ingestion
    #[serde(default)]
    pub source_path: Option<PathBuf>,

    /// Pasted text captured before it is written to a file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,

    #[serde(default)]
    pub transcript_path: Option<PathBuf>,

    #[serde(default)]
    pub cleaned_transcript_path: Option<PathBuf>,

    #[serde(default)]
    pub summary_path: Option<PathBuf>,

    #[serde(default)]
    pub research_prompt_path: Option<PathBuf>,

    #[serde(default)]
    pub article_path: Option<PathBuf>,

    #[serde(default)]
    pub podcast_script_path: Option<PathBuf>,

    #[serde(default)]
    pub reel_script_path: Option<PathBuf>,

    #[serde(default)]
    pub social_posts_path: Option<PathBuf>,

    #[serde(default)]
    pub audio_path: Option<PathBuf>,

    #[serde(default)]
    pub zip_path: Option<PathBuf>,

    /// Every artifact exported so far
    #[serde(default)]
    pub output_files: Vec<PathBuf>,

    /// Article generation attempts; only ever increases within a run
    #[serde(default)]
    pub article_attempts: u32,

    /// Error marker consumed by the retry policy, or the unrecoverable failure
    #[serde(default)]
    pub last_error: Option<String>,

    /// Language code for transcription and generation
    pub lang: String,

    /// Mirror of the per-run stage-status file
    #[serde(default)]
    pub legacy_state: RunState,
}

impl Context {
    /// Create a fresh context and allocate its run directory on disk.
    ///
    /// The run id combines a UTC timestamp with a short random suffix so two
    /// runs started in the same second do not collide.
    pub fn create(options: ContextOptions) -> Result<Self> {
        let now = chrono::Utc::now();
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let run_id = format!("{}-{}", now.format("%Y%m%d-%H%M%S"), &suffix[..8]);

        let project_dir = get_project_dir(&options.base_dir, &options.project_name);
        let run_dir = get_run_dir(&project_dir, &run_id);
        std::fs::create_dir_all(&run_dir)?;

        let initial = options.initial_state.unwrap_or(State::ProjectInit);

        Ok(Context {
            project_name: options.project_name,
            project_dir,
            run_dir,
            run_id,
            started_at: now.to_rfc3339(),
            current_state: initial,
            state_history: vec![initial],
            input_type: None,
            processing_type: None,
            output_type: None,
            youtube_url: None,
            source_path: None,
            raw_text: None,
            transcript_path: None,
            cleaned_transcript_path: None,
            summary_path: None,
            research_prompt_path: None,
            article_path: None,
            podcast_script_path: None,
            reel_script_path: None,
            social_posts_path: None,
            audio_path: None,
            zip_path: None,
            output_files: Vec::new(),
            article_attempts: 0,
            last_error: None,
            lang: options.lang.unwrap_or_else(|| "es".to_string()),
            legacy_state: RunState::default(),
        })
    }

    /// Enter the given state: set `current_state` and append to the history.
    ///
    /// This is the only way the progress fields change, which keeps the
    /// history append-only and `current_state` equal to its last element.
    pub fn advance_to(mut self, state: State) -> Self {
        self.current_state = state;
        self.state_history.push(state);
        self
    }

    // ===== IMMUTABLE BUILDER METHODS =====

    pub fn with_input_type(mut self, input_type: InputType) -> Self {
        self.input_type = Some(input_type);
        self
    }

    pub fn with_processing_type(mut self, processing_type: ProcessingType) -> Self {
        self.processing_type = Some(processing_type);
        self
    }

    pub fn with_output_type(mut self, output_type: OutputType) -> Self {
        self.output_type = Some(output_type);
        self
    }

    pub fn with_youtube_url(mut self, url: Option<String>) -> Self {
        self.youtube_url = url;
        self
    }

    pub fn with_source_path(mut self, path: Option<PathBuf>) -> Self {
        self.source_path = path;
        self
    }

    pub fn with_raw_text(mut self, text: Option<String>) -> Self {
        self.raw_text = text;
        self
    }

    pub fn with_transcript(mut self, path: &Path) -> Self {
        self.transcript_path = Some(path.to_path_buf());
        self
    }

    pub fn with_cleaned_transcript(mut self, path: &Path) -> Self {
        self.cleaned_transcript_path = Some(path.to_path_buf());
        self
    }

    pub fn with_summary(mut self, path: &Path) -> Self {
        self.summary_path = Some(path.to_path_buf());
        self
    }

    pub fn with_research_prompt(mut self, path: &Path) -> Self {
        self.research_prompt_path = Some(path.to_path_buf());
        self
    }

    pub fn with_article(mut self, path: &Path) -> Self {
        self.article_path = Some(path.to_path_buf());
        self
    }

    pub fn with_podcast_script(mut self, path: &Path) -> Self {
        self.podcast_script_path = Some(path.to_path_buf());
        self
    }

    pub fn with_reel_script(mut self, path: &Path) -> Self {
        self.reel_script_path = Some(path.to_path_buf());
        self
    }

    pub fn with_social_posts(mut self, path: &Path) -> Self {
        self.social_posts_path = Some(path.to_path_buf());
        self
    }

    pub fn with_audio(mut self, path: &Path) -> Self {
        self.audio_path = Some(path.to_path_buf());
        self
    }

    pub fn with_zip(mut self, path: &Path) -> Self {
        self.zip_path = Some(path.to_path_buf());
        self
    }

    /// Record an exported artifact
    pub fn with_output_file(mut self, path: &Path) -> Self {
        self.output_files.push(path.to_path_buf());
        self
    }

    /// Forget the chosen output kind so a new one can be selected
    pub fn clear_output_type(mut self) -> Self {
        self.output_type = None;
        self
    }

    pub fn with_error(mut self, error: Option<String>) -> Self {
        self.last_error = error;
        self
    }

    /// Increment the article attempt counter; it never resets within a run
    pub fn bump_article_attempts(mut self) -> Self {
        self.article_attempts += 1;
        self
    }

    pub fn with_legacy_state(mut self, legacy_state: RunState) -> Self {
        self.legacy_state = legacy_state;
        self
    }
}
