//! Schema definitions for relato
//!
//! JSON-backed types: the workflow context and its vocabularies, project
//! configuration, the per-run stage-status file and the transcript registry.

pub mod config;
pub mod context;
pub mod registry;
pub mod run_state;
pub mod state;

pub use config::{CommandConfig, Config};
pub use context::{Context, ContextOptions};
pub use registry::{registry_key, Registry};
pub use run_state::{RunState, StageStatus};
pub use state::{InputType, OutputType, ProcessingType, State};
