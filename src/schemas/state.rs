//! Workflow state and discriminant vocabularies
//!
//! All of these are closed sets. The wire names (used in checkpoints and on
//! the CLI) are the SCREAMING_SNAKE state tags and snake_case discriminants.

use serde::{Deserialize, Serialize};

/// One stage of the content-transformation pipeline.
///
/// `Complete` and `Error` are terminal: no outgoing transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum State {
    /// Run directory allocated, nothing ingested yet
    ProjectInit,
    /// User picks the input kind and provides its source
    InputSelect,
    /// Validate the video URL, check the registry, fetch audio
    InputYoutube,
    /// Validate and stage a local audio file
    InputAudio,
    /// Read a text file or pasted text; bypasses transcription
    InputText,
    /// Speech-to-text via the external engine
    Transcription,
    /// Review gate for the transcript
    TranscriptReview,
    /// User picks what to do with the transcript
    ProcessingSelect,
    /// Generate a research prompt
    ResearchPromptGen,
    /// Execute the research prompt
    ResearchExecute,
    /// Generate the article (and social posts)
    ArticleGenerate,
    /// Review gate for the article, with a bounded retry loop
    ArticleReview,
    /// Translate the transcript
    Translate,
    /// User picks the output artifact kind
    OutputSelect,
    /// Generate a podcast or reel script
    ScriptGenerate,
    /// Render the podcast script to audio
    TtsRender,
    /// Package artifacts; may loop back for more outputs
    Package,
    /// Terminal: run finished
    Complete,
    /// Terminal: run failed unrecoverably
    Error,
}

impl State {
    /// Wire name of this state, as stored in checkpoints and accepted by `--from`.
    pub fn as_str(&self) -> &'static str {
        match self {
            State::ProjectInit => "PROJECT_INIT",
            State::InputSelect => "INPUT_SELECT",
            State::InputYoutube => "INPUT_YOUTUBE",
            State::InputAudio => "INPUT_AUDIO",
            State::InputText => "INPUT_TEXT",
            State::Transcription => "TRANSCRIPTION",
            State::TranscriptReview => "TRANSCRIPT_REVIEW",
            State::ProcessingSelect => "PROCESSING_SELECT",
            State::ResearchPromptGen => "RESEARCH_PROMPT_GEN",
            State::ResearchExecute => "RESEARCH_EXECUTE",
            State::ArticleGenerate => "ARTICLE_GENERATE",
            State::ArticleReview => "ARTICLE_REVIEW",
            State::Translate => "TRANSLATE",
            State::OutputSelect => "OUTPUT_SELECT",
            State::ScriptGenerate => "SCRIPT_GENERATE",
            State::TtsRender => "TTS_RENDER",
            State::Package => "PACKAGE",
            State::Complete => "COMPLETE",
            State::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for State {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PROJECT_INIT" => Ok(State::ProjectInit),
            "INPUT_SELECT" => Ok(State::InputSelect),
            "INPUT_YOUTUBE" => Ok(State::InputYoutube),
            "INPUT_AUDIO" => Ok(State::InputAudio),
            "INPUT_TEXT" => Ok(State::InputText),
            "TRANSCRIPTION" => Ok(State::Transcription),
            "TRANSCRIPT_REVIEW" => Ok(State::TranscriptReview),
            "PROCESSING_SELECT" => Ok(State::ProcessingSelect),
            "RESEARCH_PROMPT_GEN" => Ok(State::ResearchPromptGen),
            "RESEARCH_EXECUTE" => Ok(State::ResearchExecute),
            "ARTICLE_GENERATE" => Ok(State::ArticleGenerate),
            "ARTICLE_REVIEW" => Ok(State::ArticleReview),
            "TRANSLATE" => Ok(State::Translate),
            "OUTPUT_SELECT" => Ok(State::OutputSelect),
            "SCRIPT_GENERATE" => Ok(State::ScriptGenerate),
            "TTS_RENDER" => Ok(State::TtsRender),
            "PACKAGE" => Ok(State::Package),
            "COMPLETE" => Ok(State::Complete),
            "ERROR" => Ok(State::Error),
            _ => Err(format!("Unknown workflow state: {}", s)),
        }
    }
}

/// Kind of source being ingested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    Youtube,
    Audio,
    Textfile,
    Raw,
}

impl std::fmt::Display for InputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputType::Youtube => write!(f, "youtube"),
            InputType::Audio => write!(f, "audio"),
            InputType::Textfile => write!(f, "textfile"),
            InputType::Raw => write!(f, "raw"),
        }
    }
}

impl std::str::FromStr for InputType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "youtube" => Ok(InputType::Youtube),
            "audio" => Ok(InputType::Audio),
            "textfile" => Ok(InputType::Textfile),
            "raw" => Ok(InputType::Raw),
            _ => Err(format!("Unknown inputType: {}", s)),
        }
    }
}

/// What to do with the transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingType {
    Prompt,
    Article,
    PodcastScript,
    Export,
    Translate,
}

impl std::fmt::Display for ProcessingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingType::Prompt => write!(f, "prompt"),
            ProcessingType::Article => write!(f, "article"),
            ProcessingType::PodcastScript => write!(f, "podcast_script"),
            ProcessingType::Export => write!(f, "export"),
            ProcessingType::Translate => write!(f, "translate"),
        }
    }
}

impl std::str::FromStr for ProcessingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prompt" => Ok(ProcessingType::Prompt),
            "article" => Ok(ProcessingType::Article),
            "podcast_script" => Ok(ProcessingType::PodcastScript),
            "export" => Ok(ProcessingType::Export),
            "translate" => Ok(ProcessingType::Translate),
            _ => Err(format!("Unknown processingType: {}", s)),
        }
    }
}

/// Final artifact kind produced by the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputType {
    Podcast,
    Article,
    ReelScript,
    ExportZip,
}

impl std::fmt::Display for OutputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputType::Podcast => write!(f, "podcast"),
            OutputType::Article => write!(f, "article"),
            OutputType::ReelScript => write!(f, "reel_script"),
            OutputType::ExportZip => write!(f, "export_zip"),
        }
    }
}

impl std::str::FromStr for OutputType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "podcast" => Ok(OutputType::Podcast),
            "article" => Ok(OutputType::Article),
            "reel_script" => Ok(OutputType::ReelScript),
            "export_zip" => Ok(OutputType::ExportZip),
            _ => Err(format!("Unknown outputType: {}", s)),
        }
    }
}
