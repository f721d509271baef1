//! Work-item queue, resume records and the publishing orchestrator
//!
//! This crate sequences the whole trend-to-publish loop:
//!
//! - [`trends`]: fetch trending topics from a JSON feed into the queue
//!   file, screening sensitive ones on the way in
//! - [`queue`]: the queue file format and resume filtering
//! - [`records`]: the published-record store backing idempotent resume
//! - [`orchestrator`]: the [`Pipeline`] walking the queue one item at a
//!   time — draft, cover (with retry), publish, record, clean up, delay
//! - [`archive`]: the local Markdown archive for generate-only runs

pub mod archive;
pub mod orchestrator;
pub mod queue;
pub mod records;
pub mod trends;

// Re-export commonly used types
pub use orchestrator::{Pipeline, PipelineOptions, RunSummary};
pub use queue::{filter_unpublished, load_work_items, save_work_items};
pub use records::PublishedRecordStore;
pub use trends::{crawl_trends, JsonTrendFeed, TrendSource};
