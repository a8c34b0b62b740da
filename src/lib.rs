//! relato - guided content-transformation workflow
//!
//! Takes a source (video URL, audio file, or text) through transcription,
//! review and generation stages to produce articles, podcast episodes, reel
//! scripts and social posts, with every step checkpointed so an interrupted
//! session can be resumed.

pub mod cli;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod interact;
pub mod prompts;
pub mod schemas;
pub mod workflow;

pub use errors::{RelatoError, Result};
pub use schemas::{Config, Context, ContextOptions, State};
pub use workflow::{RunOutcome, Runner};
