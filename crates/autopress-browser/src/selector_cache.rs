//! Persistent role-to-locator cache
//!
//! The target UI's markup drifts between deployments, so each element role
//! carries an ordered candidate list and the cache remembers which
//! candidate last worked. The file is a flat JSON object mapping role key
//! to the locator's serialized form, shared across process invocations.
//!
//! Writes are read-merge-write on every call so a run that is killed and
//! restarted (or a second invocation racing on the same file) never loses
//! entries it did not touch.

use autopress_core::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::driver::Locator;

/// On-disk cache of the last-successful locator per role
#[derive(Debug)]
pub struct SelectorCache {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl SelectorCache {
    /// Load the cache file, degrading to an empty cache on any problem.
    ///
    /// A corrupt or missing cache only costs extra candidate probes, so it
    /// is never an error.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = read_entries(&path).unwrap_or_else(|e| {
            warn!(
                "Selector cache {} unreadable ({}), starting empty",
                path.display(),
                e
            );
            HashMap::new()
        });

        if !entries.is_empty() {
            info!("Loaded selector cache: {} entries", entries.len());
        }

        Self { path, entries }
    }

    /// The cached locator for a role, if one parses
    pub fn get(&self, role: &str) -> Option<Locator> {
        let raw = self.entries.get(role)?;
        match raw.parse::<Locator>() {
            Ok(locator) => Some(locator),
            Err(_) => {
                debug!("Discarding unparseable cache entry for {}: {}", role, raw);
                None
            }
        }
    }

    /// Record a locator observed to succeed for `role`, overwriting any
    /// stale entry and writing through to disk immediately.
    pub fn record(&mut self, role: &str, locator: &Locator) {
        let serialized = locator.to_string();
        self.entries.insert(role.to_string(), serialized.clone());

        // Merge with whatever is on disk before writing back, so entries
        // recorded by another invocation survive.
        let mut merged = read_entries(&self.path).unwrap_or_default();
        merged.insert(role.to_string(), serialized);

        if let Err(e) = write_entries(&self.path, &merged) {
            warn!("Failed to save selector cache {}: {}", self.path.display(), e);
        } else {
            debug!("Cached selector for {}: {}", role, locator);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn read_entries(path: &Path) -> Result<HashMap<String, String>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn write_entries(path: &Path, entries: &HashMap<String, String>) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let content = serde_json::to_string_pretty(entries)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SelectorCache::load(dir.path().join("cache.json"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "{not json").unwrap();

        let cache = SelectorCache::load(&path);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_record_writes_through_and_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let mut cache = SelectorCache::load(&path);
        cache.record("title_input", &Locator::css("textarea.title"));

        let reloaded = SelectorCache::load(&path);
        assert_eq!(
            reloaded.get("title_input"),
            Some(Locator::css("textarea.title"))
        );
    }

    #[test]
    fn test_record_overwrites_stale_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let mut cache = SelectorCache::load(&path);
        cache.record("publish_btn", &Locator::xpath("//button[1]"));
        cache.record("publish_btn", &Locator::xpath("//button[2]"));

        assert_eq!(
            cache.get("publish_btn"),
            Some(Locator::xpath("//button[2]"))
        );
        assert_eq!(SelectorCache::load(&path).len(), 1);
    }

    #[test]
    fn test_record_merges_with_foreign_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let mut cache = SelectorCache::load(&path);
        // Another invocation writes its own entry behind our back.
        std::fs::write(&path, r#"{"editor_body": "css=.ProseMirror"}"#).unwrap();
        cache.record("title_input", &Locator::css("textarea.title"));

        let reloaded = SelectorCache::load(&path);
        assert_eq!(reloaded.len(), 2);
        assert_eq!(
            reloaded.get("editor_body"),
            Some(Locator::css(".ProseMirror"))
        );
    }

    #[test]
    fn test_legacy_bare_xpath_entry_still_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, r#"{"confirm_btn": "//button[contains(text(),'确定')]"}"#)
            .unwrap();

        let cache = SelectorCache::load(&path);
        assert_eq!(
            cache.get("confirm_btn"),
            Some(Locator::xpath("//button[contains(text(),'确定')]"))
        );
    }
}
