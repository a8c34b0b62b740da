//! Per-project transcript registry
//!
//! Maps a composite key of (source kind, source identifier, language) to a
//! previously produced transcript path so ingest stages can offer reuse
//! instead of re-transcribing.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::schemas::InputType;

/// Registry file contents (`registry.json` at the project root)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    /// "kind:identifier:lang" -> transcript path
    #[serde(default)]
    pub transcripts: BTreeMap<String, PathBuf>,
}

/// Build the composite lookup key
pub fn registry_key(kind: InputType, identifier: &str, lang: &str) -> String {
    format!("{}:{}:{}", kind, identifier, lang)
}

impl Registry {
    /// Look up a prior transcript for the given source
    pub fn lookup(&self, kind: InputType, identifier: &str, lang: &str) -> Option<&PathBuf> {
        self.transcripts.get(&registry_key(kind, identifier, lang))
    }

    /// Record a transcript for the given source
    pub fn record(&mut self, kind: InputType, identifier: &str, lang: &str, path: &Path) {
        self.transcripts
            .insert(registry_key(kind, identifier, lang), path.to_path_buf());
    }
}
