//! Publish session against the portal's authoring UI
//!
//! [`PublishSession`] owns the one authenticated browser context of a run.
//! Login happens at most once (cookie injection plus a post-reload check);
//! each work item then moves through the staged publish protocol, with
//! per-stage failure policy delegated to [`crate::stage`].

use autopress_browser::{Cookie, Driver, SelectorResolver};
use autopress_core::{AutopressError, PortalConfig, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::roles;
use crate::stage::{Criticality, Stage};

/// Settle pauses between UI interactions.
///
/// The portal's editor hydrates asynchronously and its abuse controls
/// watch for inhumanly fast input, so every step breathes. Tests swap in
/// [`Pace::instant`].
#[derive(Debug, Clone, Copy)]
pub struct Pace {
    /// After opening the authoring page
    pub page_load: Duration,
    /// Between landing on the home page and injecting cookies
    pub pre_inject: Duration,
    /// After the post-injection reload
    pub post_refresh: Duration,
    /// After writing editor content
    pub editor: Duration,
    /// After submitting a cover file
    pub upload: Duration,
    /// After a click that may open a dialog
    pub dialog: Duration,
    /// After flipping a radio/checkbox
    pub toggle: Duration,
}

impl Default for Pace {
    fn default() -> Self {
        Self {
            page_load: Duration::from_secs(4),
            pre_inject: Duration::from_secs(2),
            post_refresh: Duration::from_secs(5),
            editor: Duration::from_secs(2),
            upload: Duration::from_secs(3),
            dialog: Duration::from_secs(3),
            toggle: Duration::from_secs(1),
        }
    }
}

impl Pace {
    /// No pauses at all, for tests
    pub fn instant() -> Self {
        Self {
            page_load: Duration::ZERO,
            pre_inject: Duration::ZERO,
            post_refresh: Duration::ZERO,
            editor: Duration::ZERO,
            upload: Duration::ZERO,
            dialog: Duration::ZERO,
            toggle: Duration::ZERO,
        }
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

/// Advance the stage machine past one completed (or failed) step.
///
/// A failure reaching a mandatory stage propagates; a best-effort stage
/// logs and moves on.
fn advance(stage: Stage, cover_stage: bool, outcome: Result<()>) -> Result<Stage> {
    let to = stage.next(cover_stage).ok_or_else(|| {
        AutopressError::Publish(format!("publish flow cannot advance past {:?}", stage))
    })?;

    match outcome {
        Ok(()) => Ok(to),
        Err(e) => match to.criticality() {
            Criticality::Mandatory => Err(e),
            Criticality::BestEffort => {
                warn!("Optional step toward {:?} failed ({}); continuing", to, e);
                Ok(to)
            }
        },
    }
}

/// One authenticated browser context executing the publish protocol
pub struct PublishSession<D: Driver> {
    driver: D,
    resolver: SelectorResolver,
    portal: PortalConfig,
    cookies: Vec<Cookie>,
    pace: Pace,
    logged_in: bool,
}

impl<D: Driver> PublishSession<D> {
    pub fn new(
        driver: D,
        resolver: SelectorResolver,
        portal: PortalConfig,
        cookies: Vec<Cookie>,
    ) -> Self {
        Self {
            driver,
            resolver,
            portal,
            cookies,
            pace: Pace::default(),
            logged_in: false,
        }
    }

    pub fn with_pace(mut self, pace: Pace) -> Self {
        self.pace = pace;
        self
    }

    /// Authenticate by replaying exported cookies (at most once per run).
    ///
    /// Landing back on a login page after the reload means the cookies are
    /// dead; that is fatal to the whole run, with a screenshot left behind
    /// for diagnosis.
    pub async fn ensure_login(&mut self) -> Result<()> {
        if self.logged_in {
            info!("Already logged in, skipping login step.");
            return Ok(());
        }

        info!("Injecting session cookies...");
        self.driver.navigate(&self.portal.home_url).await?;
        pause(self.pace.pre_inject).await;
        self.driver.inject_cookies(&self.cookies).await?;
        self.driver.reload().await?;
        pause(self.pace.post_refresh).await;

        let url = self.driver.current_url().await?;
        if url.to_lowercase().contains("login") {
            let shot = PathBuf::from(format!("login_failed_{}.png", Utc::now().timestamp()));
            if let Err(e) = self.driver.screenshot(&shot).await {
                warn!("Could not capture login-failure screenshot: {}", e);
            }
            return Err(AutopressError::Auth(
                "Session cookies are no longer valid; export a fresh set".to_string(),
            ));
        }

        match self
            .resolver
            .resolve(&self.driver, &roles::account_badge())
            .await
        {
            Ok(_) => info!("Account session verified."),
            Err(_) => warn!("Could not locate the account badge, but the page is past login."),
        }

        self.logged_in = true;
        Ok(())
    }

    /// Publish one article: title, content, optional cover, then the
    /// two-step confirmation.
    ///
    /// Mandatory stages (title, content, the initial publish click) abort
    /// this work item on failure; cover handling and the final
    /// confirmation degrade to warnings.
    pub async fn publish(
        &mut self,
        title: &str,
        content_html: &str,
        cover_path: Option<&Path>,
        use_cover: bool,
    ) -> Result<()> {
        info!("Opening the authoring page...");
        self.driver.navigate(&self.portal.publish_url).await?;
        pause(self.pace.page_load).await;

        let cover_stage = (cover_path.is_some() && use_cover) || !use_cover;
        let mut stage = Stage::NotStarted;

        let outcome = self.fill_title(title).await;
        stage = advance(stage, cover_stage, outcome)?;

        let outcome = self.fill_content(content_html).await;
        stage = advance(stage, cover_stage, outcome)?;

        if cover_stage {
            let outcome = match cover_path {
                Some(path) if use_cover => self.upload_cover(path).await,
                _ => self.switch_no_cover().await,
            };
            stage = advance(stage, cover_stage, outcome)?;
        }

        let outcome = self.request_preview().await;
        stage = advance(stage, cover_stage, outcome)?;

        let outcome = self.confirm_publish().await;
        stage = advance(stage, cover_stage, outcome)?;

        stage = advance(stage, cover_stage, Ok(()))?;
        if stage != Stage::Done {
            return Err(AutopressError::Publish(format!(
                "publish flow ended in {:?} instead of Done",
                stage
            )));
        }

        pause(self.pace.dialog).await;
        info!("Publish flow complete.");
        Ok(())
    }

    async fn fill_title(&mut self, title: &str) -> Result<()> {
        let title = title.trim();
        info!("Filling title: {}", title);

        let (handle, _) = self
            .resolver
            .resolve(&self.driver, &roles::title_input())
            .await?;
        self.driver.clear(&handle).await?;
        self.driver.type_text(&handle, title).await?;
        Ok(())
    }

    async fn fill_content(&mut self, content_html: &str) -> Result<()> {
        info!("Writing article content...");

        let (handle, _) = self
            .resolver
            .resolve(&self.driver, &roles::editor_body())
            .await?;
        self.driver.set_inner_html(&handle, content_html).await?;
        pause(self.pace.editor).await;
        Ok(())
    }

    /// Upload the cover artifact. The single-image mode switch and the
    /// confirmation dialog are tolerated when absent; only the file input
    /// itself failing bubbles up (and even that is downgraded by the
    /// caller's stage policy).
    async fn upload_cover(&mut self, path: &Path) -> Result<()> {
        let absolute = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        info!("Uploading cover: {}", absolute.display());

        self.switch_single_cover().await;
        pause(self.pace.toggle).await;

        let (input, _) = self
            .resolver
            .resolve(&self.driver, &roles::cover_file_input())
            .await?;
        self.driver.upload_file(&input, &absolute).await?;
        pause(self.pace.upload).await;
        info!("Cover submitted.");

        self.confirm_cover().await;
        Ok(())
    }

    async fn switch_single_cover(&mut self) {
        match self
            .resolver
            .resolve(&self.driver, &roles::single_cover_mode())
            .await
        {
            Ok((handle, _)) => {
                if let Err(e) = self.driver.click(&handle).await {
                    warn!("Could not select single-cover mode: {}", e);
                    return;
                }
                pause(self.pace.toggle).await;
                info!("Switched to single-cover mode.");
            }
            Err(_) => {
                warn!("Could not find the single-cover option; the UI may have changed.");
            }
        }
    }

    async fn switch_no_cover(&mut self) -> Result<()> {
        let (handle, _) = self
            .resolver
            .resolve(&self.driver, &roles::no_cover_mode())
            .await?;
        self.driver.click(&handle).await?;
        pause(self.pace.toggle).await;
        info!("Switched to no-cover mode.");
        Ok(())
    }

    async fn confirm_cover(&mut self) {
        pause(self.pace.dialog).await;
        match self
            .resolver
            .resolve(&self.driver, &roles::cover_confirm())
            .await
        {
            Ok((handle, _)) => {
                if let Err(e) = self.driver.click(&handle).await {
                    warn!("Cover confirmation click failed: {}", e);
                    return;
                }
                pause(self.pace.toggle).await;
                info!("Confirmed cover upload.");
            }
            Err(_) => {
                debug!("No cover confirmation dialog; assuming auto-confirm.");
            }
        }
    }

    async fn request_preview(&mut self) -> Result<()> {
        info!("Clicking the publish button...");
        let (button, _) = self
            .resolver
            .resolve(&self.driver, &roles::preview_publish())
            .await?;
        self.driver.click(&button).await?;
        pause(self.pace.dialog).await;
        Ok(())
    }

    async fn confirm_publish(&mut self) -> Result<()> {
        info!("Clicking the confirmation button...");
        let (button, _) = self
            .resolver
            .resolve(&self.driver, &roles::confirm_publish())
            .await?;
        self.driver.click(&button).await?;
        Ok(())
    }
}
