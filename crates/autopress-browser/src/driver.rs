//! Browser driver abstraction
//!
//! The publish flow only ever talks to this trait, never to a concrete
//! automation toolkit. That keeps the retry and state-machine logic
//! testable with [`MockDriver`] and leaves the CDP backend swappable.
//!
//! Element handles are re-resolvable locator references: an action looks
//! the element up again at call time instead of holding a live DOM node.
//! The target UI re-renders aggressively, so a node pinned at find time is
//! often stale by the time it is clicked.

use async_trait::async_trait;
use autopress_core::{AutopressError, Result};
use std::path::Path;
use std::time::Duration;

use crate::cookies::Cookie;

/// A concrete expression identifying a DOM element
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    Css(String),
    Xpath(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    pub fn xpath(expression: impl Into<String>) -> Self {
        Self::Xpath(expression.into())
    }

    /// The raw selector text without the scheme prefix
    pub fn expression(&self) -> &str {
        match self {
            Self::Css(s) | Self::Xpath(s) => s,
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css={}", s),
            Self::Xpath(s) => write!(f, "xpath={}", s),
        }
    }
}

impl std::str::FromStr for Locator {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if let Some(rest) = s.strip_prefix("css=") {
            Ok(Self::Css(rest.to_string()))
        } else if let Some(rest) = s.strip_prefix("xpath=") {
            Ok(Self::Xpath(rest.to_string()))
        } else if s.starts_with('/') || s.starts_with("(/") {
            // Bare XPath from a cache written by an older build
            Ok(Self::Xpath(s.to_string()))
        } else if s.is_empty() {
            Err("empty locator".to_string())
        } else {
            Ok(Self::Css(s.to_string()))
        }
    }
}

/// A located element, expressed as the locator that found it.
///
/// Actions re-resolve the locator, so the handle stays valid across UI
/// re-renders as long as the selector still matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    locator: Locator,
}

impl ElementHandle {
    pub fn new(locator: Locator) -> Self {
        Self { locator }
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }
}

/// Abstract browser automation capability.
///
/// One implementation drives Chrome over CDP ([`crate::CdpDriver`]); the
/// scripted [`MockDriver`] backs the unit and pipeline tests.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Navigate the single automation tab and wait for the load to settle
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Wait until `locator` matches, bounded by `timeout`.
    ///
    /// `clickable` additionally requires the element to be actionable
    /// (scrolled into view for the CDP backend).
    async fn find(&self, locator: &Locator, timeout: Duration, clickable: bool)
        -> Result<ElementHandle>;

    async fn click(&self, handle: &ElementHandle) -> Result<()>;

    /// Empty an input/textarea value
    async fn clear(&self, handle: &ElementHandle) -> Result<()>;

    /// Send keystrokes into the element
    async fn type_text(&self, handle: &ElementHandle, text: &str) -> Result<()>;

    /// Replace the element's rendered content wholesale
    async fn set_inner_html(&self, handle: &ElementHandle, html: &str) -> Result<()>;

    /// Submit a local file path to a file input
    async fn upload_file(&self, handle: &ElementHandle, path: &Path) -> Result<()>;

    /// Install session cookies into the browser context
    async fn inject_cookies(&self, cookies: &[Cookie]) -> Result<()>;

    /// Reload the current page
    async fn reload(&self) -> Result<()>;

    async fn current_url(&self) -> Result<String>;

    /// Write a full-page screenshot to `path`
    async fn screenshot(&self, path: &Path) -> Result<()>;
}

/// Scripted driver for tests.
///
/// Resolvable locators are declared up front; every probe and action is
/// recorded so tests can assert on exact lookup order.
#[derive(Debug, Default)]
pub struct MockDriver {
    resolvable: std::sync::Mutex<std::collections::HashSet<String>>,
    probes: std::sync::Mutex<Vec<String>>,
    actions: std::sync::Mutex<Vec<String>>,
    url: std::sync::Mutex<String>,
    reload_redirect: std::sync::Mutex<Option<String>>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a locator that `find` will resolve
    pub fn with_resolvable(self, locator: &Locator) -> Self {
        self.resolvable.lock().unwrap().insert(locator.to_string());
        self
    }

    /// Change whether a locator resolves, mid-test
    pub fn set_resolvable(&self, locator: &Locator, resolves: bool) {
        let mut set = self.resolvable.lock().unwrap();
        if resolves {
            set.insert(locator.to_string());
        } else {
            set.remove(&locator.to_string());
        }
    }

    pub fn with_url(self, url: &str) -> Self {
        *self.url.lock().unwrap() = url.to_string();
        self
    }

    pub fn set_url(&self, url: &str) {
        *self.url.lock().unwrap() = url.to_string();
    }

    /// Make the next `reload` land on `url`, like a server-side redirect
    pub fn with_reload_redirect(self, url: &str) -> Self {
        *self.reload_redirect.lock().unwrap() = Some(url.to_string());
        self
    }

    /// Every locator probed by `find`, in order
    pub fn probes(&self) -> Vec<String> {
        self.probes.lock().unwrap().clone()
    }

    /// Every non-find interaction, in order
    pub fn actions(&self) -> Vec<String> {
        self.actions.lock().unwrap().clone()
    }

    fn record(&self, action: String) {
        self.actions.lock().unwrap().push(action);
    }
}

#[async_trait]
impl Driver for MockDriver {
    async fn navigate(&self, url: &str) -> Result<()> {
        *self.url.lock().unwrap() = url.to_string();
        self.record(format!("navigate {}", url));
        Ok(())
    }

    async fn find(
        &self,
        locator: &Locator,
        _timeout: Duration,
        _clickable: bool,
    ) -> Result<ElementHandle> {
        let key = locator.to_string();
        self.probes.lock().unwrap().push(key.clone());
        if self.resolvable.lock().unwrap().contains(&key) {
            Ok(ElementHandle::new(locator.clone()))
        } else {
            Err(AutopressError::Browser(format!("timed out waiting for {}", key)))
        }
    }

    async fn click(&self, handle: &ElementHandle) -> Result<()> {
        self.record(format!("click {}", handle.locator()));
        Ok(())
    }

    async fn clear(&self, handle: &ElementHandle) -> Result<()> {
        self.record(format!("clear {}", handle.locator()));
        Ok(())
    }

    async fn type_text(&self, handle: &ElementHandle, text: &str) -> Result<()> {
        self.record(format!("type {} <- {}", handle.locator(), text));
        Ok(())
    }

    async fn set_inner_html(&self, handle: &ElementHandle, html: &str) -> Result<()> {
        self.record(format!("html {} <- {}", handle.locator(), html));
        Ok(())
    }

    async fn upload_file(&self, handle: &ElementHandle, path: &Path) -> Result<()> {
        self.record(format!("upload {} <- {}", handle.locator(), path.display()));
        Ok(())
    }

    async fn inject_cookies(&self, cookies: &[Cookie]) -> Result<()> {
        self.record(format!("cookies x{}", cookies.len()));
        Ok(())
    }

    async fn reload(&self) -> Result<()> {
        self.record("reload".to_string());
        if let Some(target) = self.reload_redirect.lock().unwrap().clone() {
            *self.url.lock().unwrap() = target;
        }
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.url.lock().unwrap().clone())
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        self.record(format!("screenshot {}", path.display()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_display_roundtrip() {
        let css = Locator::css(".ProseMirror");
        let xpath = Locator::xpath("//button[contains(text(),'确定')]");

        assert_eq!(css.to_string().parse::<Locator>().unwrap(), css);
        assert_eq!(xpath.to_string().parse::<Locator>().unwrap(), xpath);
    }

    #[test]
    fn test_bare_xpath_parses_as_xpath() {
        let parsed: Locator = "//div[@class='article-cover']//input".parse().unwrap();
        assert!(matches!(parsed, Locator::Xpath(_)));
    }

    #[test]
    fn test_bare_css_parses_as_css() {
        let parsed: Locator = "textarea.title".parse().unwrap();
        assert!(matches!(parsed, Locator::Css(_)));
    }

    #[test]
    fn test_empty_locator_rejected() {
        assert!("".parse::<Locator>().is_err());
    }

    #[tokio::test]
    async fn test_mock_driver_records_probes_in_order() {
        let good = Locator::css("#ok");
        let bad = Locator::css("#missing");
        let driver = MockDriver::new().with_resolvable(&good);

        assert!(driver.find(&bad, Duration::from_secs(1), false).await.is_err());
        let handle = driver.find(&good, Duration::from_secs(1), false).await.unwrap();
        driver.click(&handle).await.unwrap();

        assert_eq!(driver.probes(), vec!["css=#missing", "css=#ok"]);
        assert_eq!(driver.actions(), vec!["click css=#ok"]);
    }
}
