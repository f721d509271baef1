//! Text and image generation clients for the Autopress pipeline
//!
//! Everything here talks to an external generation API and hands the
//! pipeline plain values:
//!
//! - [`ArticleWriter`]: drafts an article for a topic through a
//!   chat-completions [`TextGenerator`], shaping the raw completion into a
//!   title and body
//! - [`TopicScreen`]: yes/no sensitive-topic classification, failing open
//! - [`CoverStudio`]: generates a cover through an [`ImageGenerator`]
//!   (TC3-signed TextToImageLite client) and persists it as a transient
//!   [`autopress_core::CoverArtifact`]
//!
//! The traits exist so the pipeline tests can script every collaborator.

pub mod cover;
pub mod draft;
pub mod screen;
pub mod tc3;
pub mod writer;

// Re-export commonly used types
pub use cover::{CoverRequest, CoverStudio, ImageGenerator, TextToImageClient};
pub use draft::{split_title_body, Article, ArticleWriter};
pub use screen::TopicScreen;
pub use tc3::{SignedRequest, Tc3Signer};
pub use writer::{ChatCompletionClient, TextGenerator};
