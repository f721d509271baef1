//! Self-healing selector resolution
//!
//! Given a logical role and its ordered candidate locators, the resolver
//! returns a live handle plus the locator that worked. The cached locator
//! is probed first; when it fails (or was never recorded) the full
//! candidate list is walked in order and the first success is written back
//! to the cache, healing stale entries.

use autopress_core::{AutopressError, Result};
use std::time::Duration;
use tracing::{debug, info};

use crate::driver::{Driver, ElementHandle, Locator};
use crate::selector_cache::SelectorCache;

/// A UI element role: stable key, ordered candidates, wait parameters.
///
/// Candidates are hand-authored, most specific first; the last entries are
/// the loose fallbacks that survive markup drift.
#[derive(Debug, Clone)]
pub struct RoleQuery {
    pub key: String,
    pub candidates: Vec<Locator>,
    pub timeout: Duration,
    pub clickable: bool,
}

impl RoleQuery {
    pub fn new(key: impl Into<String>, candidates: Vec<Locator>, timeout: Duration) -> Self {
        Self {
            key: key.into(),
            candidates,
            timeout,
            clickable: false,
        }
    }

    pub fn clickable(mut self) -> Self {
        self.clickable = true;
        self
    }
}

/// Resolver over a persistent [`SelectorCache`]
#[derive(Debug)]
pub struct SelectorResolver {
    cache: SelectorCache,
}

impl SelectorResolver {
    pub fn new(cache: SelectorCache) -> Self {
        Self { cache }
    }

    /// Resolve a role to a live element handle.
    ///
    /// A cache hit that still resolves short-circuits the candidate walk
    /// and leaves the cache untouched. A newly succeeding candidate is
    /// recorded (overwriting the stale entry). All candidates failing is
    /// [`AutopressError::ElementNotFound`] for the caller to interpret.
    pub async fn resolve<D: Driver + ?Sized>(
        &mut self,
        driver: &D,
        query: &RoleQuery,
    ) -> Result<(ElementHandle, Locator)> {
        if let Some(cached) = self.cache.get(&query.key) {
            // Only trust the cache while the locator is still one the role
            // actually declares; retired candidates must not resurface.
            if query.candidates.contains(&cached) {
                match driver.find(&cached, query.timeout, query.clickable).await {
                    Ok(handle) => {
                        debug!("Resolved {} from cache: {}", query.key, cached);
                        return Ok((handle, cached));
                    }
                    Err(_) => {
                        debug!("Cached locator for {} no longer matches", query.key);
                    }
                }
            }
        }

        for candidate in &query.candidates {
            match driver.find(candidate, query.timeout, query.clickable).await {
                Ok(handle) => {
                    self.cache.record(&query.key, candidate);
                    info!("Resolved {} and cached: {}", query.key, candidate);
                    return Ok((handle, candidate.clone()));
                }
                Err(_) => continue,
            }
        }

        Err(AutopressError::element_not_found(&query.key))
    }

    pub fn cache(&self) -> &SelectorCache {
        &self.cache
    }
}
