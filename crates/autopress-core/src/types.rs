//! Core type definitions for the Autopress pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One trending topic awaiting content generation and publishing.
///
/// The `url` is the canonical dedup key: the published-record store keys on
/// it, and resume filtering compares against it. Work items are immutable
/// once read from the queue file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Topic headline used to seed article generation
    pub title: String,
    /// Source link, also the canonical identifier
    pub url: String,
    /// Popularity figure as reported by the trend feed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heat: Option<String>,
    /// Position on the trend board
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<String>,
}

impl WorkItem {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            heat: None,
            rank: None,
        }
    }

    /// The identifier used for dedup and resume filtering
    pub fn identifier(&self) -> &str {
        &self.url
    }
}

/// A generated cover image on disk, transient for one work item.
///
/// The orchestrator deletes the file after the publish attempt, whether it
/// succeeded or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverArtifact {
    /// Absolute or working-directory-relative path of the saved image
    pub path: PathBuf,
    /// When the image was written
    pub created_at: DateTime<Utc>,
}

impl CoverArtifact {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            created_at: Utc::now(),
        }
    }

    /// Remove the backing file, tolerating a file that is already gone.
    pub fn remove(&self) -> std::io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// How the pipeline handles article covers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverMode {
    /// Publish without a cover image
    None,
    /// Generate a cover through the image API and upload it
    #[default]
    Generate,
}

impl std::fmt::Display for CoverMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Generate => write!(f, "generate"),
        }
    }
}

impl std::str::FromStr for CoverMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "generate" => Ok(Self::Generate),
            _ => Err(format!("Invalid cover mode: {}. Use none or generate.", s)),
        }
    }
}

/// Strip characters that are unsafe in filenames, keeping CJK intact.
///
/// Mirrors the archive naming scheme: alphanumerics (any script), spaces,
/// dashes and underscores survive; spaces become underscores afterwards.
pub fn sanitize_for_filename(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-' || *c == '_')
        .collect::<String>()
        .trim()
        .replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_item_identifier_is_url() {
        let item = WorkItem::new("某地取消景区门票", "https://example.com/t/1");
        assert_eq!(item.identifier(), "https://example.com/t/1");
    }

    #[test]
    fn test_work_item_optional_fields_roundtrip() {
        let json = r#"{"title":"话题","url":"https://u","heat":"482万","rank":"3"}"#;
        let item: WorkItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.heat.as_deref(), Some("482万"));

        let bare: WorkItem = serde_json::from_str(r#"{"title":"t","url":"u"}"#).unwrap();
        assert!(bare.heat.is_none());
        assert!(bare.rank.is_none());
    }

    #[test]
    fn test_cover_artifact_remove_is_tolerant() {
        let artifact = CoverArtifact::new("/tmp/does-not-exist-autopress.png");
        assert!(artifact.remove().is_ok());
    }

    #[test]
    fn test_cover_mode_parsing() {
        assert_eq!("generate".parse::<CoverMode>().unwrap(), CoverMode::Generate);
        assert_eq!("NONE".parse::<CoverMode>().unwrap(), CoverMode::None);
        assert!("auto".parse::<CoverMode>().is_err());
    }

    #[test]
    fn test_sanitize_for_filename() {
        assert_eq!(sanitize_for_filename("杭州 取消/门票!"), "杭州_取消门票");
        assert_eq!(sanitize_for_filename("a b-c_d"), "a_b-c_d");
    }
}
