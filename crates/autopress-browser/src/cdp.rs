//! Chrome DevTools Protocol driver
//!
//! Concrete [`Driver`] implementation over `headless_chrome`. One browser
//! process, one tab, owned for the lifetime of the publish session and
//! torn down when the driver drops.

use async_trait::async_trait;
use autopress_core::{AutopressError, BrowserLaunchConfig, Result};
use headless_chrome::protocol::cdp::Network::CookieParam;
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, Element, LaunchOptions, Tab};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::cookies::Cookie;
use crate::driver::{Driver, ElementHandle, Locator};

/// Live Chrome session speaking CDP
pub struct CdpDriver {
    /// Underlying browser instance (kept alive for tab lifetime)
    #[allow(dead_code)]
    browser: Browser,
    tab: Arc<Tab>,
}

impl CdpDriver {
    /// Launch a browser and prepare the single automation tab
    pub async fn launch(config: &BrowserLaunchConfig, user_agent: &str) -> Result<Self> {
        info!(
            "Launching browser (headless: {}, size: {}x{})",
            config.headless, config.window_width, config.window_height
        );

        let launch_options = LaunchOptions::default_builder()
            .headless(config.headless)
            .window_size(Some((config.window_width, config.window_height)))
            .sandbox(false)
            .build()
            .map_err(|e| AutopressError::Browser(format!("Failed to build launch options: {}", e)))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| AutopressError::Browser(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| AutopressError::Browser(format!("Failed to create tab: {}", e)))?;

        tab.set_user_agent(user_agent, None, None)
            .map_err(|e| AutopressError::Browser(format!("Failed to set user agent: {}", e)))?;
        tab.set_default_timeout(Duration::from_secs(config.timeout_seconds));

        info!("Browser launched successfully");

        Ok(Self { browser, tab })
    }

    /// Re-resolve a handle to a live element.
    ///
    /// Handles carry locators rather than node ids, so an element that the
    /// UI re-rendered since `find` is looked up fresh here.
    fn element(&self, handle: &ElementHandle) -> Result<Element<'_>> {
        let lookup = match handle.locator() {
            Locator::Css(sel) => self.tab.find_element(sel),
            Locator::Xpath(xp) => self.tab.find_element_by_xpath(xp),
        };
        lookup.map_err(|e| {
            AutopressError::Browser(format!("Element vanished for {}: {}", handle.locator(), e))
        })
    }
}

#[async_trait]
impl Driver for CdpDriver {
    async fn navigate(&self, url: &str) -> Result<()> {
        debug!("Navigating to {}", url);

        self.tab
            .navigate_to(url)
            .map_err(|e| AutopressError::Browser(format!("Failed to navigate to {}: {}", url, e)))?;
        self.tab
            .wait_until_navigated()
            .map_err(|e| AutopressError::Browser(format!("Navigation timeout for {}: {}", url, e)))?;

        Ok(())
    }

    async fn find(
        &self,
        locator: &Locator,
        timeout: Duration,
        clickable: bool,
    ) -> Result<ElementHandle> {
        debug!("Waiting for {} (timeout: {:?})", locator, timeout);

        let found = match locator {
            Locator::Css(sel) => self.tab.wait_for_element_with_custom_timeout(sel, timeout),
            Locator::Xpath(xp) => self.tab.wait_for_xpath_with_custom_timeout(xp, timeout),
        };
        let element =
            found.map_err(|e| AutopressError::Browser(format!("Not found {}: {}", locator, e)))?;

        if clickable {
            element.scroll_into_view().map_err(|e| {
                AutopressError::Browser(format!("Cannot scroll {} into view: {}", locator, e))
            })?;
        }

        Ok(ElementHandle::new(locator.clone()))
    }

    async fn click(&self, handle: &ElementHandle) -> Result<()> {
        // JS click rather than a synthesized mouse event: the portal
        // stacks overlays over its buttons and a coordinate click lands on
        // the overlay instead.
        self.element(handle)?
            .call_js_fn("function() { this.click(); }", vec![], false)
            .map_err(|e| {
                AutopressError::Browser(format!("Click failed for {}: {}", handle.locator(), e))
            })?;
        Ok(())
    }

    async fn clear(&self, handle: &ElementHandle) -> Result<()> {
        self.element(handle)?
            .call_js_fn(
                "function() { this.value = ''; this.dispatchEvent(new Event('input', { bubbles: true })); }",
                vec![],
                false,
            )
            .map_err(|e| {
                AutopressError::Browser(format!("Clear failed for {}: {}", handle.locator(), e))
            })?;
        Ok(())
    }

    async fn type_text(&self, handle: &ElementHandle, text: &str) -> Result<()> {
        self.element(handle)?.type_into(text).map_err(|e| {
            AutopressError::Browser(format!("Typing failed for {}: {}", handle.locator(), e))
        })?;
        Ok(())
    }

    async fn set_inner_html(&self, handle: &ElementHandle, html: &str) -> Result<()> {
        self.element(handle)?
            .call_js_fn(
                "function(html) { this.innerHTML = html; }",
                vec![serde_json::Value::String(html.to_string())],
                false,
            )
            .map_err(|e| {
                AutopressError::Browser(format!(
                    "Setting content failed for {}: {}",
                    handle.locator(),
                    e
                ))
            })?;
        Ok(())
    }

    async fn upload_file(&self, handle: &ElementHandle, path: &Path) -> Result<()> {
        let element = self.element(handle)?;

        // File inputs on the portal are display:none decoys behind styled
        // drop zones; make the real input interactable before submitting.
        element
            .call_js_fn(
                "function() { \
                     this.style.display = 'block'; \
                     this.style.visibility = 'visible'; \
                     this.style.opacity = '1'; \
                 }",
                vec![],
                false,
            )
            .map_err(|e| {
                AutopressError::Browser(format!("Cannot reveal file input: {}", e))
            })?;

        let path_str = path.to_string_lossy();
        element.set_input_files(&[path_str.as_ref()]).map_err(|e| {
            AutopressError::Browser(format!("Upload failed for {}: {}", handle.locator(), e))
        })?;
        Ok(())
    }

    async fn inject_cookies(&self, cookies: &[Cookie]) -> Result<()> {
        let params: Vec<CookieParam> = cookies
            .iter()
            .map(to_cdp_cookie)
            .collect::<Result<Vec<_>>>()?;

        debug!("Injecting {} cookies", params.len());
        self.tab
            .set_cookies(params)
            .map_err(|e| AutopressError::Browser(format!("Cookie injection failed: {}", e)))?;
        Ok(())
    }

    async fn reload(&self) -> Result<()> {
        self.tab
            .reload(false, None)
            .map_err(|e| AutopressError::Browser(format!("Reload failed: {}", e)))?;
        self.tab
            .wait_until_navigated()
            .map_err(|e| AutopressError::Browser(format!("Reload never settled: {}", e)))?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.tab.get_url())
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        let data = self
            .tab
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(|e| AutopressError::Browser(format!("Screenshot failed: {}", e)))?;
        std::fs::write(path, data)?;
        info!("Screenshot saved to {}", path.display());
        Ok(())
    }
}

/// Convert an exported cookie into the CDP parameter shape.
///
/// Goes through JSON so optional protocol fields we do not set stay absent.
/// The export's expiry is dropped: replaying a stale expiry makes the
/// browser discard the cookie instead of starting a session with it.
fn to_cdp_cookie(cookie: &Cookie) -> Result<CookieParam> {
    let mut value = serde_json::to_value(cookie)?;
    if let Some(obj) = value.as_object_mut() {
        obj.remove("expires");
    }
    Ok(serde_json::from_value(value)?)
}
