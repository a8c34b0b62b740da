//! Project configuration schema
//!
//! Loaded once per run from `<project>/config.json` and passed read-only to
//! every stage handler. Missing file means defaults.

use serde::{Deserialize, Serialize};

/// External command invocation for one engine capability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandConfig {
    /// Executable name or path
    pub command: String,

    /// Fixed arguments passed before the per-call ones
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandConfig {
    fn new(command: &str, args: &[&str]) -> Self {
        CommandConfig {
            command: command.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Read-only configuration snapshot for a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Default language code for new runs
    #[serde(default = "default_lang")]
    pub default_lang: String,

    /// Timeout in seconds for any single engine invocation
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,

    /// Editor command used by review gates (falls back to $EDITOR at runtime)
    #[serde(default)]
    pub editor: Option<String>,

    /// Directory name (under the project dir) where approved artifacts land
    #[serde(default = "default_export_dir")]
    pub export_dir_name: String,

    /// Command that downloads audio for a video URL
    #[serde(default = "default_media_fetch")]
    pub media_fetch: CommandConfig,

    /// Command that transcribes an audio file
    #[serde(default = "default_transcriber")]
    pub transcriber: CommandConfig,

    /// Command that runs text-generation prompts
    #[serde(default = "default_generator")]
    pub generator: CommandConfig,

    /// Command that renders a script to audio
    #[serde(default = "default_tts")]
    pub tts: CommandConfig,

    /// Command that builds the export archive
    #[serde(default = "default_packager")]
    pub packager: CommandConfig,
}

fn default_lang() -> String {
    "es".to_string()
}

fn default_timeout() -> u32 {
    1800
}

fn default_export_dir() -> String {
    "export".to_string()
}

fn default_media_fetch() -> CommandConfig {
    CommandConfig::new("yt-dlp", &["-x", "--audio-format", "mp3"])
}

fn default_transcriber() -> CommandConfig {
    CommandConfig::new("whisper", &[])
}

fn default_generator() -> CommandConfig {
    CommandConfig::new("llm", &[])
}

fn default_tts() -> CommandConfig {
    CommandConfig::new("tts", &[])
}

fn default_packager() -> CommandConfig {
    CommandConfig::new("zip", &["-j"])
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_lang: default_lang(),
            timeout_seconds: default_timeout(),
            editor: None,
            export_dir_name: default_export_dir(),
            media_fetch: default_media_fetch(),
            transcriber: default_transcriber(),
            generator: default_generator(),
            tts: default_tts(),
            packager: default_packager(),
        }
    }
}
