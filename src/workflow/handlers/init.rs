//! Project initialization stage

use tracing::info;

use crate::errors::Result;
use crate::fs;
use crate::schemas::{Context, State};
use crate::workflow::{StageDeps, StageOutcome};

/// Prepare the project layout: the export area and the per-run state file.
/// The run directory itself was allocated when the context was created.
pub async fn project_init(ctx: Context, deps: &StageDeps<'_>) -> Result<StageOutcome> {
    info!(project = %ctx.project_name, run = %ctx.run_id, "initializing run");

    let export_dir = fs::get_export_dir(&ctx.project_dir, &deps.config.export_dir_name);
    std::fs::create_dir_all(&export_dir)?;

    fs::write_run_state(&ctx.run_dir, &ctx.legacy_state)?;

    Ok(StageOutcome::advance(State::InputSelect, ctx))
}
