//! Process-based engine implementation
//!
//! Executes the configured external tools via process spawning with
//! stdin/stdout streaming and a per-invocation timeout. In dry-run mode
//! every operation writes a placeholder artifact without spawning.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::errors::{RelatoError, Result};
use crate::prompts::PromptKind;
use crate::schemas::{CommandConfig, Config};

use super::Engine;

/// Engine that shells out to the commands named in the project config
pub struct ProcessEngine {
    config: Config,
    dry_run: bool,
}

/// Captured output of one external command
struct CommandOutput {
    stdout: String,
}

impl ProcessEngine {
    pub fn new(config: Config, dry_run: bool) -> Self {
        ProcessEngine { config, dry_run }
    }

    /// Spawn a configured command with extra args, optionally feeding stdin.
    ///
    /// Applies the configured timeout; a non-zero exit becomes `EngineError`
    /// with the stderr tail attached.
    async fn run_command(
        &self,
        command: &CommandConfig,
        extra_args: &[String],
        stdin_data: Option<&str>,
    ) -> Result<CommandOutput> {
        debug!(command = %command.command, ?extra_args, "spawning engine command");

        let mut cmd = Command::new(&command.command);
        cmd.args(&command.args)
            .args(extra_args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| {
            RelatoError::EngineError(format!("Failed to spawn {}: {}", command.command, e))
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Some(data) = stdin_data {
                stdin.write_all(data.as_bytes()).await.map_err(|e| {
                    RelatoError::EngineError(format!("Failed to write to stdin: {}", e))
                })?;
            }
            // stdin is dropped here, closing it
        }

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let timeout_duration = Duration::from_secs(self.config.timeout_seconds as u64);

        let result = timeout(timeout_duration, async {
            let stdout_handle = tokio::spawn(async move {
                let mut output = String::new();
                if let Some(stdout) = stdout {
                    let mut reader = BufReader::new(stdout).lines();
                    while let Ok(Some(line)) = reader.next_line().await {
                        output.push_str(&line);
                        output.push('\n');
                    }
                }
                output
            });

            let stderr_handle = tokio::spawn(async move {
                let mut output = String::new();
                if let Some(stderr) = stderr {
                    let mut reader = BufReader::new(stderr).lines();
                    while let Ok(Some(line)) = reader.next_line().await {
                        output.push_str(&line);
                        output.push('\n');
                    }
                }
                output
            });

            let stdout_output = stdout_handle.await.unwrap_or_default();
            let stderr_output = stderr_handle.await.unwrap_or_default();
            (stdout_output, stderr_output, child.wait().await)
        })
        .await;

        match result {
            Ok((stdout_output, stderr_output, wait_result)) => {
                let status = wait_result.map_err(|e| {
                    RelatoError::EngineError(format!("Failed to wait for {}: {}", command.command, e))
                })?;
                if !status.success() {
                    let tail: String = stderr_output
                        .lines()
                        .rev()
                        .take(5)
                        .collect::<Vec<_>>()
                        .into_iter()
                        .rev()
                        .collect::<Vec<_>>()
                        .join("\n");
                    return Err(RelatoError::EngineError(format!(
                        "{} exited with {:?}: {}",
                        command.command,
                        status.code(),
                        tail
                    )));
                }
                Ok(CommandOutput {
                    stdout: stdout_output,
                })
            }
            Err(_) => {
                let _ = child.kill().await;
                Err(RelatoError::Timeout(format!(
                    "{} did not finish within {}s",
                    command.command, self.config.timeout_seconds
                )))
            }
        }
    }

    fn dry_run_artifact(&self, dest: &Path, label: &str) -> Result<()> {
        std::fs::write(dest, format!("[DRY RUN] {}\n", label))?;
        Ok(())
    }
}

#[async_trait]
impl Engine for ProcessEngine {
    async fn fetch_media(&self, url: &str, dest_dir: &Path) -> Result<PathBuf> {
        let dest = dest_dir.join("source.mp3");
        if self.dry_run {
            self.dry_run_artifact(&dest, &format!("media for {}", url))?;
            return Ok(dest);
        }
        let args = vec![url.to_string(), "-o".to_string(), dest.display().to_string()];
        self.run_command(&self.config.media_fetch, &args, None).await?;
        if !dest.exists() {
            return Err(RelatoError::EngineError(format!(
                "{} reported success but {} was not created",
                self.config.media_fetch.command,
                dest.display()
            )));
        }
        Ok(dest)
    }

    async fn transcribe(&self, audio: &Path, lang: &str, dest: &Path) -> Result<()> {
        if self.dry_run {
            return self.dry_run_artifact(dest, "transcript");
        }
        let args = vec![
            audio.display().to_string(),
            "--language".to_string(),
            lang.to_string(),
            "--output".to_string(),
            dest.display().to_string(),
        ];
        self.run_command(&self.config.transcriber, &args, None).await?;
        Ok(())
    }

    async fn generate(&self, kind: PromptKind, prompt: &str, dest: &Path) -> Result<()> {
        if self.dry_run {
            return self.dry_run_artifact(dest, kind.template_name());
        }
        // The generator reads the prompt from stdin and answers on stdout
        let output = self
            .run_command(&self.config.generator, &[], Some(prompt))
            .await?;
        if output.stdout.trim().is_empty() {
            return Err(RelatoError::EngineError(format!(
                "{} produced no output for {}",
                self.config.generator.command,
                kind.template_name()
            )));
        }
        std::fs::write(dest, output.stdout)?;
        Ok(())
    }

    async fn render_tts(&self, script: &Path, lang: &str, dest: &Path) -> Result<()> {
        if self.dry_run {
            return self.dry_run_artifact(dest, "audio");
        }
        let args = vec![
            script.display().to_string(),
            "--language".to_string(),
            lang.to_string(),
            "-o".to_string(),
            dest.display().to_string(),
        ];
        self.run_command(&self.config.tts, &args, None).await?;
        Ok(())
    }

    async fn package(&self, files: &[PathBuf], dest: &Path) -> Result<()> {
        if self.dry_run {
            return self.dry_run_artifact(dest, "archive");
        }
        let mut args = vec![dest.display().to_string()];
        args.extend(files.iter().map(|f| f.display().to_string()));
        self.run_command(&self.config.packager, &args, None).await?;
        Ok(())
    }
}
