//! Session cookies exported from a logged-in browser
//!
//! The portal has no credential API; authentication is replayed from a
//! cookie file the operator exports after a manual login. The file is a
//! JSON array of cookie objects carrying at least name/value/domain.

use autopress_core::{AutopressError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// One exported browser cookie.
///
/// Field names follow the DevTools export format; unknown keys in the file
/// are ignored rather than rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_only: Option<bool>,
    /// Expiry from the export; never replayed into the browser
    #[serde(
        default,
        alias = "expiry",
        alias = "expirationDate",
        skip_serializing_if = "Option::is_none"
    )]
    pub expires: Option<f64>,
}

/// Load the cookie file, failing loudly when it is absent.
///
/// A missing or non-array file is fatal: without a session there is
/// nothing the pipeline can publish.
pub fn load_cookie_file(path: &Path) -> Result<Vec<Cookie>> {
    if !path.exists() {
        return Err(AutopressError::Auth(format!(
            "Cookie file not found: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)?;
    let cookies: Vec<Cookie> = serde_json::from_str(&content).map_err(|e| {
        AutopressError::Auth(format!(
            "Cookie file {} is not a JSON array of cookies: {}",
            path.display(),
            e
        ))
    })?;

    info!("Loaded {} cookies from {}", cookies.len(), path.display());
    Ok(cookies)
}
