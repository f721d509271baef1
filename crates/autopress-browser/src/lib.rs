//! Browser driver abstraction and self-healing selector resolution
//!
//! The target authoring UI has no public API, so publishing drives a real
//! browser. Its markup drifts between deployments; this crate keeps the
//! rest of the pipeline insulated from that drift:
//!
//! - [`Driver`]: the abstract automation capability (navigate, find,
//!   click, type, cookies, screenshot), implemented over CDP by
//!   [`CdpDriver`] and by a scripted [`MockDriver`] for tests
//! - [`SelectorResolver`]: resolves a logical element role through an
//!   ordered candidate list with a persistent last-success cache
//! - [`SelectorCache`]: the write-through JSON cache behind the resolver
//! - [`Cookie`] / [`load_cookie_file`]: the exported-session cookie format

pub mod cdp;
pub mod cookies;
pub mod driver;
pub mod resolver;
pub mod selector_cache;

// Re-export commonly used types
pub use cdp::CdpDriver;
pub use cookies::{load_cookie_file, Cookie};
pub use driver::{Driver, ElementHandle, Locator, MockDriver};
pub use resolver::{RoleQuery, SelectorResolver};
pub use selector_cache::SelectorCache;
