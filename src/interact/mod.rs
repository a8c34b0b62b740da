//! Interaction collaborator
//!
//! Stage handlers never talk to the terminal directly; they go through the
//! `Interaction` trait. Every prompt can come back cancelled, and handlers
//! must pattern-match `Prompted` before using the value - a cancellation is
//! an outcome, never an error.

use std::io::{BufRead, Write};

use crate::errors::Result;

/// Result of a prompt: either the answer or an explicit cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompted<T> {
    Value(T),
    Cancelled,
}

/// One entry in a selection menu
#[derive(Debug, Clone)]
pub struct SelectOption {
    /// Value returned when this option is chosen
    pub value: String,
    /// Text shown to the user
    pub label: String,
}

impl SelectOption {
    pub fn new(value: &str, label: &str) -> Self {
        SelectOption {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

/// Boundary to the interactive prompt layer.
///
/// Implementations block until the user answers or cancels. The workflow
/// loop is suspended for the duration; no other handler runs meanwhile.
pub trait Interaction: Send + Sync {
    /// Pick one value from a list of options.
    fn select(&self, prompt: &str, options: &[SelectOption]) -> Result<Prompted<String>>;

    /// Yes/no question.
    fn confirm(&self, prompt: &str) -> Result<Prompted<bool>>;

    /// Free-form single-value text input.
    fn text(&self, prompt: &str) -> Result<Prompted<String>>;

    /// Open the given file in an editor and block until the user is done.
    fn edit_file(&self, path: &std::path::Path) -> Result<Prompted<()>>;

    /// Show an artifact to the user (review gates).
    fn show(&self, heading: &str, body: &str);
}

/// Terminal implementation reading answers line-by-line from stdin.
///
/// An empty line on `select`/`confirm`, or the literal `q`, cancels.
pub struct TerminalInteraction {
    editor: Option<String>,
}

impl TerminalInteraction {
    pub fn new(editor: Option<String>) -> Self {
        TerminalInteraction { editor }
    }

    fn read_line(&self) -> Result<Option<String>> {
        let mut line = String::new();
        let n = std::io::stdin().lock().read_line(&mut line)?;
        if n == 0 {
            // EOF counts as cancellation
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn resolve_editor(&self) -> String {
        self.editor
            .clone()
            .or_else(|| std::env::var("EDITOR").ok())
            .unwrap_or_else(|| "vi".to_string())
    }
}

impl Interaction for TerminalInteraction {
    fn select(&self, prompt: &str, options: &[SelectOption]) -> Result<Prompted<String>> {
        println!("{}", prompt);
        for (i, option) in options.iter().enumerate() {
            println!("  {}) {}", i + 1, option.label);
        }
        print!("> ");
        std::io::stdout().flush()?;

        loop {
            let line = match self.read_line()? {
                Some(line) => line,
                None => return Ok(Prompted::Cancelled),
            };
            if line.is_empty() || line == "q" {
                return Ok(Prompted::Cancelled);
            }
            if let Ok(index) = line.parse::<usize>() {
                if index >= 1 && index <= options.len() {
                    return Ok(Prompted::Value(options[index - 1].value.clone()));
                }
            }
            // Also accept the option value typed out
            if let Some(option) = options.iter().find(|o| o.value == line) {
                return Ok(Prompted::Value(option.value.clone()));
            }
            println!("Choose 1-{} (or q to cancel)", options.len());
        }
    }

    fn confirm(&self, prompt: &str) -> Result<Prompted<bool>> {
        print!("{} [y/n] ", prompt);
        std::io::stdout().flush()?;

        loop {
            let line = match self.read_line()? {
                Some(line) => line.to_lowercase(),
                None => return Ok(Prompted::Cancelled),
            };
            match line.as_str() {
                "y" | "yes" | "s" | "si" => return Ok(Prompted::Value(true)),
                "n" | "no" => return Ok(Prompted::Value(false)),
                "" | "q" => return Ok(Prompted::Cancelled),
                _ => println!("Answer y or n (or q to cancel)"),
            }
        }
    }

    fn text(&self, prompt: &str) -> Result<Prompted<String>> {
        print!("{}: ", prompt);
        std::io::stdout().flush()?;

        match self.read_line()? {
            Some(line) => Ok(Prompted::Value(line)),
            None => Ok(Prompted::Cancelled),
        }
    }

    fn edit_file(&self, path: &std::path::Path) -> Result<Prompted<()>> {
        let editor = self.resolve_editor();
        let status = std::process::Command::new(&editor).arg(path).status()?;
        if status.success() {
            Ok(Prompted::Value(()))
        } else {
            Ok(Prompted::Cancelled)
        }
    }

    fn show(&self, heading: &str, body: &str) {
        println!("--- {} ---", heading);
        println!("{}", body);
        println!("---");
    }
}


#[cfg(test)]
mod tests {
    use super::scripted::{Answer, ScriptedInteraction};
    use super::*;

    #[test]
    fn test_scripted_select() {
        let interaction = ScriptedInteraction::new(vec![Answer::Select("youtube".to_string())]);
        let options = vec![
            SelectOption::new("youtube", "Video URL"),
            SelectOption::new("audio", "Audio file"),
        ];
        let answer = interaction.select("Input?", &options).unwrap();
        assert_eq!(answer, Prompted::Value("youtube".to_string()));
        assert!(interaction.is_exhausted());
    }

    #[test]
    fn test_scripted_cancel() {
        let interaction = ScriptedInteraction::new(vec![Answer::Cancel]);
        let answer = interaction.confirm("Continue?").unwrap();
        assert_eq!(answer, Prompted::Cancelled);
    }
}
