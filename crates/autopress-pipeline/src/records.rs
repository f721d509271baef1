//! Published-record store for idempotent resume
//!
//! A flat JSON file of work-item identifiers that have actually been
//! published. The set is append-only from the orchestrator's perspective
//! and is the resume checkpoint: a restarted run filters its queue against
//! it instead of publishing duplicates.
//!
//! `add` is read-merge-write on every call, never an in-memory overlay, so
//! a killed run or a second invocation sharing the file stays consistent.

use autopress_core::Result;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Persisted set of published work-item identifiers
#[derive(Debug, Clone)]
pub struct PublishedRecordStore {
    path: PathBuf,
}

impl PublishedRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the persisted set.
    ///
    /// Accepts either a plain JSON array of identifiers or an object with
    /// a `urls` array (an older layout that may still be on disk). A
    /// missing or corrupt file degrades to an empty set with a warning.
    pub fn load(&self) -> HashSet<String> {
        if !self.path.exists() {
            return HashSet::new();
        }

        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                warn!(
                    "Could not read published records {}: {}",
                    self.path.display(),
                    e
                );
                return HashSet::new();
            }
        };

        match serde_json::from_str::<serde_json::Value>(&content) {
            Ok(serde_json::Value::Array(entries)) => collect_strings(entries),
            Ok(serde_json::Value::Object(mut map)) => match map.remove("urls") {
                Some(serde_json::Value::Array(entries)) => collect_strings(entries),
                _ => {
                    warn!(
                        "Published records {} has an unexpected layout",
                        self.path.display()
                    );
                    HashSet::new()
                }
            },
            Ok(_) => {
                warn!(
                    "Published records {} has an unexpected layout",
                    self.path.display()
                );
                HashSet::new()
            }
            Err(e) => {
                warn!(
                    "Published records {} are not valid JSON ({}), treating as empty",
                    self.path.display(),
                    e
                );
                HashSet::new()
            }
        }
    }

    /// Record an identifier as published.
    ///
    /// Re-reads the persisted set, inserts, and writes the whole set back
    /// as a sorted plain array. Idempotent: adding the same identifier
    /// twice leaves a single occurrence.
    pub fn add(&self, identifier: &str) -> Result<()> {
        let mut records = self.load();
        records.insert(identifier.to_string());

        let mut sorted: Vec<&String> = records.iter().collect();
        sorted.sort();

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&sorted)?)?;
        debug!("Recorded published item: {}", identifier);
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn collect_strings(entries: Vec<serde_json::Value>) -> HashSet<String> {
    entries
        .into_iter()
        .filter_map(|v| match v {
            serde_json::Value::String(s) => Some(s),
            _ => None,
        })
        .collect()
}
