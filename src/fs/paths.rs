//! Path resolution utilities for relato
//!
//! Construct paths to the project directory, run directories and the JSON
//! files the workflow persists.

use std::path::{Path, PathBuf};

/// Resolve the current working directory, optionally using an override.
pub fn resolve_cwd(cwd_option: Option<&Path>) -> PathBuf {
    match cwd_option {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Derive a project name from a directory path (its final component).
pub fn project_name_from_dir(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "project".to_string())
}

/// Get the path to a project's directory.
pub fn get_project_dir(base: &Path, project_name: &str) -> PathBuf {
    base.join(project_name)
}

/// Get the path to a project's config.json file.
pub fn get_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join("config.json")
}

/// Get the path to a project's registry.json file.
pub fn get_registry_path(project_dir: &Path) -> PathBuf {
    project_dir.join("registry.json")
}

/// Get the path to a project's export directory.
pub fn get_export_dir(project_dir: &Path, export_dir_name: &str) -> PathBuf {
    project_dir.join(export_dir_name)
}

/// Get the path to the directory holding all runs of a project.
pub fn get_runs_dir(project_dir: &Path) -> PathBuf {
    project_dir.join("runs")
}

/// Get the path to a specific run's directory.
pub fn get_run_dir(project_dir: &Path, run_id: &str) -> PathBuf {
    get_runs_dir(project_dir).join(run_id)
}

/// Get the path to a run's checkpoint.json file.
pub fn get_checkpoint_path(run_dir: &Path) -> PathBuf {
    run_dir.join("checkpoint.json")
}

/// Get the path to a run's run_state.json file.
pub fn get_run_state_path(run_dir: &Path) -> PathBuf {
    run_dir.join("run_state.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_paths() {
        let base = PathBuf::from("/work");
        let project = get_project_dir(&base, "talk");

        assert_eq!(project, PathBuf::from("/work/talk"));
        assert_eq!(get_config_path(&project), PathBuf::from("/work/talk/config.json"));
        assert_eq!(get_registry_path(&project), PathBuf::from("/work/talk/registry.json"));
        assert_eq!(get_export_dir(&project, "export"), PathBuf::from("/work/talk/export"));
    }

    #[test]
    fn test_run_paths() {
        let project = PathBuf::from("/work/talk");
        let run = get_run_dir(&project, "20260101-120000-ab12cd34");

        assert_eq!(run, PathBuf::from("/work/talk/runs/20260101-120000-ab12cd34"));
        assert_eq!(
            get_checkpoint_path(&run),
            PathBuf::from("/work/talk/runs/20260101-120000-ab12cd34/checkpoint.json")
        );
        assert_eq!(
            get_run_state_path(&run),
            PathBuf::from("/work/talk/runs/20260101-120000-ab12cd34/run_state.json")
        );
    }

    #[test]
    fn test_project_name_from_dir() {
        assert_eq!(project_name_from_dir(Path::new("/work/talk")), "talk");
        assert_eq!(project_name_from_dir(Path::new("/")), "project");
    }

    #[test]
    fn test_resolve_cwd_with_override() {
        let path = PathBuf::from("/custom/path");
        assert_eq!(resolve_cwd(Some(&path)), path);
    }

    #[test]
    fn test_resolve_cwd_without_override() {
        assert!(!resolve_cwd(None).as_os_str().is_empty());
    }
}
