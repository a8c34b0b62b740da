//! Workflow execution
//!
//! `runner` drives the state machine loop; `handlers` holds one stage
//! handler per workflow state. Handlers receive the context by value and a
//! read-only bundle of collaborators, and return either the next state with
//! an updated context snapshot or a cancellation.

pub mod handlers;
pub mod runner;

use crate::engine::Engine;
use crate::interact::Interaction;
use crate::schemas::{Config, Context, State};

pub use runner::{RunOutcome, Runner};

/// Read-only collaborators passed to every stage handler.
///
/// The configuration snapshot is loaded once by the CLI entry; handlers
/// never read config or credentials from disk themselves.
pub struct StageDeps<'a> {
    pub config: &'a Config,
    pub interact: &'a dyn Interaction,
    pub engine: &'a dyn Engine,
}

/// What a stage handler produced
#[derive(Debug)]
pub enum StageOutcome {
    /// Proposed transition with the updated context snapshot
    Advance { next_state: State, context: Context },
    /// The user cancelled inside a prompt; the run stops without advancing
    Cancelled,
}

impl StageOutcome {
    /// Shorthand used by every handler
    pub fn advance(next_state: State, context: Context) -> Self {
        StageOutcome::Advance {
            next_state,
            context,
        }
    }
}
