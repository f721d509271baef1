//! Configuration management for Autopress
//!
//! Loaded from `autopress.toml` in the working directory. Every field has a
//! serde default so a partial (or absent) file still yields a runnable
//! configuration; secrets are only ever referenced by environment variable
//! name.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{AutopressError, Result};

/// Top-level Autopress configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutopressConfig {
    /// Target authoring portal
    #[serde(default)]
    pub portal: PortalConfig,

    /// Browser launch parameters
    #[serde(default)]
    pub browser: BrowserLaunchConfig,

    /// Text-generation API
    #[serde(default)]
    pub writer: WriterConfig,

    /// Image-generation API and cover defaults
    #[serde(default)]
    pub cover: CoverConfig,

    /// Trend feed used by crawl mode
    #[serde(default)]
    pub trends: TrendsConfig,

    /// File locations and pacing
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// The web application the pipeline publishes into
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Landing page used for cookie injection
    #[serde(default = "default_home_url")]
    pub home_url: String,

    /// Authoring page where articles are composed
    #[serde(default = "default_publish_url")]
    pub publish_url: String,

    /// User agent presented by the automated browser
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Browser launch parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserLaunchConfig {
    #[serde(default)]
    pub headless: bool,

    #[serde(default = "default_window_width")]
    pub window_width: u32,

    #[serde(default = "default_window_height")]
    pub window_height: u32,

    /// Default element-wait timeout in seconds
    #[serde(default = "default_wait_timeout")]
    pub timeout_seconds: u64,
}

/// Chat-completions endpoint used for article drafting and topic screening
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriterConfig {
    #[serde(default = "default_writer_url")]
    pub api_url: String,

    #[serde(default = "default_writer_model")]
    pub model: String,

    /// Environment variable holding the bearer token
    #[serde(default = "default_writer_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

/// Image API and default cover parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverConfig {
    #[serde(default = "default_image_host")]
    pub api_host: String,

    #[serde(default = "default_image_region")]
    pub region: String,

    #[serde(default = "default_image_id_env")]
    pub secret_id_env: String,

    #[serde(default = "default_image_key_env")]
    pub secret_key_env: String,

    /// Style number understood by the image API
    #[serde(default = "default_image_style")]
    pub style: String,

    /// Resolution in the API's `W:H` form
    #[serde(default = "default_image_resolution")]
    pub resolution: String,

    #[serde(default)]
    pub negative_prompt: String,

    /// 1 adds the provider watermark, 0 omits it
    #[serde(default)]
    pub watermark: i64,

    #[serde(default = "default_image_dir")]
    pub output_dir: PathBuf,
}

/// Trend feed used to build the work-item queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendsConfig {
    /// JSON feed returning an array of work items
    #[serde(default = "default_feed_url")]
    pub feed_url: String,

    /// Cap on fetched topics per crawl
    #[serde(default = "default_crawl_limit")]
    pub limit: usize,

    /// Screen each topic through the text generator before keeping it
    #[serde(default = "default_true")]
    pub screen_topics: bool,
}

/// File locations and pacing intervals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_queue_file")]
    pub queue_file: PathBuf,

    #[serde(default = "default_records_file")]
    pub records_file: PathBuf,

    #[serde(default = "default_cache_file")]
    pub selector_cache_file: PathBuf,

    #[serde(default = "default_cookie_file")]
    pub cookie_file: PathBuf,

    /// Local archive for generate-only mode
    #[serde(default = "default_article_dir")]
    pub article_dir: PathBuf,

    /// Pause between generation API calls, in seconds
    #[serde(default = "default_generate_delay")]
    pub generate_delay_secs: f64,

    /// Pause after each publish, in seconds
    #[serde(default = "default_publish_delay")]
    pub publish_delay_secs: f64,
}

// Default value providers

fn default_home_url() -> String {
    "https://mp.toutiao.com/".to_string()
}

fn default_publish_url() -> String {
    "https://mp.toutiao.com/profile_v4/graphic/publish".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}

fn default_window_width() -> u32 {
    1920
}

fn default_window_height() -> u32 {
    1080
}

fn default_wait_timeout() -> u64 {
    20
}

fn default_writer_url() -> String {
    "https://api.deepseek.com/v1/chat/completions".to_string()
}

fn default_writer_model() -> String {
    "deepseek-reasoner".to_string()
}

fn default_writer_key_env() -> String {
    "DEEPSEEK_API_KEY".to_string()
}

fn default_max_tokens() -> usize {
    4096
}

fn default_temperature() -> f64 {
    0.7
}

fn default_image_host() -> String {
    "hunyuan.tencentcloudapi.com".to_string()
}

fn default_image_region() -> String {
    "ap-guangzhou".to_string()
}

fn default_image_id_env() -> String {
    "IMAGE_API_SECRET_ID".to_string()
}

fn default_image_key_env() -> String {
    "IMAGE_API_SECRET_KEY".to_string()
}

fn default_image_style() -> String {
    "201".to_string()
}

fn default_image_resolution() -> String {
    "1024:1024".to_string()
}

fn default_image_dir() -> PathBuf {
    PathBuf::from("generated_images")
}

fn default_feed_url() -> String {
    "https://example.invalid/hot.json".to_string()
}

fn default_crawl_limit() -> usize {
    100
}

fn default_true() -> bool {
    true
}

fn default_queue_file() -> PathBuf {
    PathBuf::from("filtered_hot_searches.json")
}

fn default_records_file() -> PathBuf {
    PathBuf::from("published_articles.json")
}

fn default_cache_file() -> PathBuf {
    PathBuf::from("selector_cache.json")
}

fn default_cookie_file() -> PathBuf {
    PathBuf::from("cookies/portal.json")
}

fn default_article_dir() -> PathBuf {
    PathBuf::from("generated_articles")
}

fn default_generate_delay() -> f64 {
    1.5
}

fn default_publish_delay() -> f64 {
    900.0
}

impl AutopressConfig {
    /// Load configuration from the given path, or fall back to defaults
    /// when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)
                .map_err(|e| AutopressError::Config(format!("Failed to parse {}: {}", path.display(), e)))
        } else {
            Ok(Self::default())
        }
    }

    /// Write the default configuration as a starting point
    pub fn write_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = toml::to_string_pretty(&Self::default())
            .map_err(|e| AutopressError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            home_url: default_home_url(),
            publish_url: default_publish_url(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for BrowserLaunchConfig {
    fn default() -> Self {
        Self {
            headless: false,
            window_width: default_window_width(),
            window_height: default_window_height(),
            timeout_seconds: default_wait_timeout(),
        }
    }
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            api_url: default_writer_url(),
            model: default_writer_model(),
            api_key_env: default_writer_key_env(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl Default for CoverConfig {
    fn default() -> Self {
        Self {
            api_host: default_image_host(),
            region: default_image_region(),
            secret_id_env: default_image_id_env(),
            secret_key_env: default_image_key_env(),
            style: default_image_style(),
            resolution: default_image_resolution(),
            negative_prompt: String::new(),
            watermark: 0,
            output_dir: default_image_dir(),
        }
    }
}

impl Default for TrendsConfig {
    fn default() -> Self {
        Self {
            feed_url: default_feed_url(),
            limit: default_crawl_limit(),
            screen_topics: true,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue_file: default_queue_file(),
            records_file: default_records_file(),
            selector_cache_file: default_cache_file(),
            cookie_file: default_cookie_file(),
            article_dir: default_article_dir(),
            generate_delay_secs: default_generate_delay(),
            publish_delay_secs: default_publish_delay(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_complete() {
        let config = AutopressConfig::default();
        assert!(config.portal.home_url.starts_with("https://"));
        assert_eq!(config.browser.timeout_seconds, 20);
        assert_eq!(config.pipeline.publish_delay_secs, 900.0);
        assert_eq!(config.cover.resolution, "1024:1024");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = AutopressConfig::load_or_default(Path::new("/nonexistent/autopress.toml"))
            .unwrap();
        assert_eq!(config.trends.limit, 100);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autopress.toml");
        std::fs::write(&path, "[pipeline]\npublish_delay_secs = 30.0\n").unwrap();

        let config = AutopressConfig::load_or_default(&path).unwrap();
        assert_eq!(config.pipeline.publish_delay_secs, 30.0);
        assert_eq!(config.pipeline.generate_delay_secs, 1.5);
        assert_eq!(config.writer.model, "deepseek-reasoner");
    }

    #[test]
    fn test_write_default_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autopress.toml");
        AutopressConfig::write_default(&path).unwrap();

        let config = AutopressConfig::load_or_default(&path).unwrap();
        assert_eq!(config.cover.style, "201");
    }
}
