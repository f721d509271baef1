//! # autopress-core
//!
//! Core types for the Autopress content-publishing pipeline.
//!
//! Autopress automates a trend-to-article loop: discover trending topics,
//! draft articles and covers through external generation APIs, and publish
//! the result into a web authoring UI that has no public API. This crate
//! holds what every other crate shares: the unified error taxonomy, the
//! TOML configuration, the work-item and artifact types, and the bounded
//! retry executor.

mod config;
mod error;
mod retry;
mod types;

pub use config::{
    AutopressConfig, BrowserLaunchConfig, CoverConfig, PipelineConfig, PortalConfig, TrendsConfig,
    WriterConfig,
};
pub use error::{AutopressError, Result};
pub use retry::{Exhausted, RetryPolicy};
pub use types::{sanitize_for_filename, CoverArtifact, CoverMode, WorkItem};
