//! File system utilities
//!
//! JSON read/write primitives, path construction and persistence helpers for
//! the checkpoint, the per-run stage-status file and the project registry.

pub mod checkpoint;
pub mod json;
pub mod paths;

use std::path::Path;

use crate::errors::Result;
use crate::schemas::{Registry, RunState};

pub use checkpoint::{read_checkpoint, write_checkpoint, Checkpoint, CHECKPOINT_VERSION};
pub use json::{read_json, write_json};
pub use paths::*;

/// Read a project's registry, or an empty one if the file doesn't exist.
pub fn read_registry(project_dir: &Path) -> Result<Registry> {
    let path = get_registry_path(project_dir);
    if !path.exists() {
        return Ok(Registry::default());
    }
    read_json(&path)
}

/// Write a project's registry.
pub fn write_registry(project_dir: &Path, registry: &Registry) -> Result<()> {
    write_json(&get_registry_path(project_dir), registry)
}

/// Write a run's stage-status file.
pub fn write_run_state(run_dir: &Path, run_state: &RunState) -> Result<()> {
    write_json(&get_run_state_path(run_dir), run_state)
}

/// Read a run's stage-status file, or a fresh one if it doesn't exist.
pub fn read_run_state(run_dir: &Path) -> Result<RunState> {
    let path = get_run_state_path(run_dir);
    if !path.exists() {
        return Ok(RunState::default());
    }
    read_json(&path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::InputType;
    use tempfile::TempDir;

    #[test]
    fn test_registry_defaults_when_missing() {
        let temp = TempDir::new().unwrap();
        let registry = read_registry(temp.path()).unwrap();
        assert!(registry.transcripts.is_empty());
    }

    #[test]
    fn test_registry_write_then_read() {
        let temp = TempDir::new().unwrap();
        let mut registry = Registry::default();
        registry.record(InputType::Youtube, "vid1", "es", Path::new("/t/x.txt"));

        write_registry(temp.path(), &registry).unwrap();
        let read = read_registry(temp.path()).unwrap();
        assert_eq!(read, registry);
    }

    #[test]
    fn test_run_state_defaults_when_missing() {
        let temp = TempDir::new().unwrap();
        let state = read_run_state(temp.path()).unwrap();
        assert!(state.stages.is_empty());
    }

    #[test]
    fn test_run_state_write_then_read() {
        let temp = TempDir::new().unwrap();
        let state = RunState::default().with_done("transcription");

        write_run_state(temp.path(), &state).unwrap();
        let read = read_run_state(temp.path()).unwrap();
        assert!(read.is_done("transcription"));
    }
}
