//! Checkpoint persistence
//!
//! A checkpoint is a versioned snapshot of the workflow context, written
//! after every committed transition and read back on `--resume`. The runner
//! writes one strictly after a transition is validated and before the next
//! handler starts, so a resumed run never re-enters a state whose effects
//! were not already committed.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{RelatoError, Result};
use crate::fs::json::{read_json, write_json};
use crate::fs::paths::get_checkpoint_path;
use crate::schemas::Context;

/// Current checkpoint format version
pub const CHECKPOINT_VERSION: u32 = 1;

/// On-disk checkpoint document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    /// Checkpoint format version
    pub version: u32,

    /// ISO 8601 timestamp of when this checkpoint was written
    pub written_at: String,

    /// The full context at the committed transition
    pub context: Context,
}

/// Write a checkpoint for the given context into its run directory.
pub fn write_checkpoint(context: &Context) -> Result<()> {
    let checkpoint = Checkpoint {
        version: CHECKPOINT_VERSION,
        written_at: chrono::Utc::now().to_rfc3339(),
        context: context.clone(),
    };
    let path = get_checkpoint_path(&context.run_dir);
    write_json(&path, &checkpoint)
}

/// Read a checkpoint file and return the context it holds.
///
/// # Errors
/// * `FileNotFound` / `InvalidJson` - from the underlying read
/// * `InvalidJson` - if the checkpoint version is unsupported
pub fn read_checkpoint(path: &Path) -> Result<Context> {
    let checkpoint: Checkpoint = read_json(path)?;
    if checkpoint.version != CHECKPOINT_VERSION {
        return Err(RelatoError::InvalidJson(format!(
            "Unsupported checkpoint version {} in {}, supported: {}",
            checkpoint.version,
            path.display(),
            CHECKPOINT_VERSION
        )));
    }
    Ok(checkpoint.context)
}
