//! Work-item queue file and resume filtering

use autopress_core::{Result, WorkItem};
use std::collections::HashSet;
use std::path::Path;
use tracing::{error, info, warn};

/// Read the work-item queue file (a JSON array of items).
///
/// A missing or malformed file yields an empty queue with a log line;
/// an empty queue simply means there is nothing to do.
pub fn load_work_items(path: &Path) -> Vec<WorkItem> {
    if !path.exists() {
        error!("Work-item queue file not found: {}", path.display());
        return Vec::new();
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            error!("Could not read queue file {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<WorkItem>>(&content) {
        Ok(items) => items,
        Err(e) => {
            error!("Queue file {} is malformed: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Write the queue file as a JSON array
pub fn save_work_items(path: &Path, items: &[WorkItem]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, serde_json::to_string_pretty(items)?)?;
    info!("Saved {} work items to {}", items.len(), path.display());
    Ok(())
}

/// Drop every item whose identifier is already published, preserving the
/// relative order of the remainder.
pub fn filter_unpublished(items: Vec<WorkItem>, published: &HashSet<String>) -> Vec<WorkItem> {
    let before = items.len();
    let remaining: Vec<WorkItem> = items
        .into_iter()
        .filter(|item| !published.contains(item.identifier()))
        .collect();

    let skipped = before - remaining.len();
    if skipped > 0 {
        warn!(
            "Skipping {} already-published items, {} left to process",
            skipped,
            remaining.len()
        );
    }
    remaining
}
