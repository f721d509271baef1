//! Cover image generation
//!
//! Builds an image prompt from the article title and an excerpt, calls a
//! TextToImageLite-style API (TC3-signed), downloads the resulting image
//! URL and writes the PNG into the cover output directory. The caller
//! wraps [`CoverStudio::create`] in the pipeline's retry policy; every
//! failure here is transient from the orchestrator's point of view.

use async_trait::async_trait;
use autopress_core::{sanitize_for_filename, AutopressError, CoverArtifact, CoverConfig, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::tc3::Tc3Signer;

const API_ACTION: &str = "TextToImageLite";
const API_VERSION: &str = "2023-09-01";
const API_SERVICE: &str = "hunyuan";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Prompt template for cover generation
const COVER_PROMPT: &str = "\
请为资讯文章生成一张配图，要求美观、合规，不含文字水印，画面不要过于复杂。

标题：{title}
文章摘要：{summary}

画面风格应体现热点资讯视觉，避免血腥、暴力与敏感元素。
";

/// Parameters for one cover generation call
#[derive(Debug, Clone)]
pub struct CoverRequest {
    pub prompt: String,
    pub negative_prompt: String,
    pub style: String,
    pub resolution: String,
    /// 1 adds the provider watermark, 0 omits it
    pub watermark: i64,
}

/// Abstract image-generation capability (allows scripted fakes in tests)
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generate an image, returning the raw bytes
    async fn generate(&self, request: &CoverRequest) -> Result<Vec<u8>>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ImagePayload<'a> {
    prompt: &'a str,
    rsp_img_type: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    negative_prompt: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    style: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    resolution: &'a str,
    logo_add: i64,
}

#[derive(Debug, Deserialize)]
struct ImageEnvelope {
    #[serde(rename = "Response")]
    response: ImageResponse,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(rename = "ResultImage")]
    result_image: Option<String>,
    #[serde(rename = "Error")]
    error: Option<ImageError>,
}

#[derive(Debug, Deserialize)]
struct ImageError {
    #[serde(rename = "Code")]
    code: String,
    #[serde(rename = "Message")]
    message: String,
}

/// Live TextToImageLite client
#[derive(Debug, Clone)]
pub struct TextToImageClient {
    config: CoverConfig,
}

impl TextToImageClient {
    pub fn new(config: CoverConfig) -> Self {
        Self { config }
    }

    fn signer(&self) -> Result<Tc3Signer> {
        let secret_id = std::env::var(&self.config.secret_id_env).map_err(|_| {
            AutopressError::Config(format!(
                "Image API secret id not set; export {}",
                self.config.secret_id_env
            ))
        })?;
        let secret_key = std::env::var(&self.config.secret_key_env).map_err(|_| {
            AutopressError::Config(format!(
                "Image API secret key not set; export {}",
                self.config.secret_key_env
            ))
        })?;
        Ok(Tc3Signer::new(
            secret_id,
            secret_key,
            API_SERVICE,
            self.config.api_host.clone(),
        ))
    }
}

#[async_trait]
impl ImageGenerator for TextToImageClient {
    async fn generate(&self, request: &CoverRequest) -> Result<Vec<u8>> {
        let payload = ImagePayload {
            prompt: &request.prompt,
            rsp_img_type: "url",
            negative_prompt: &request.negative_prompt,
            style: &request.style,
            resolution: &request.resolution,
            logo_add: request.watermark,
        };
        let body = serde_json::to_string(&payload)?;
        let signed = self.signer()?.sign(&body, Utc::now());

        debug!("Requesting cover image from {}", self.config.api_host);

        let client = reqwest::Client::new();
        let response = client
            .post(format!("https://{}", self.config.api_host))
            .header("Authorization", &signed.authorization)
            .header("Content-Type", Tc3Signer::content_type())
            .header("Host", &self.config.api_host)
            .header("X-TC-Timestamp", signed.timestamp.to_string())
            .header("X-TC-Action", API_ACTION)
            .header("X-TC-Version", API_VERSION)
            .header("X-TC-Region", &self.config.region)
            .body(body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| AutopressError::Generation(format!("Image request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown".to_string());
            return Err(AutopressError::Generation(format!(
                "Image API error {}: {}",
                status, text
            )));
        }

        let envelope: ImageEnvelope = response
            .json()
            .await
            .map_err(|e| AutopressError::Generation(format!("Malformed image response: {}", e)))?;

        if let Some(err) = envelope.response.error {
            return Err(AutopressError::Generation(format!(
                "Image API rejected the request: {} ({})",
                err.message, err.code
            )));
        }

        let image_url = envelope.response.result_image.ok_or_else(|| {
            AutopressError::Generation("Image response carried no result URL".to_string())
        })?;

        let image = client
            .get(&image_url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| AutopressError::Generation(format!("Image download failed: {}", e)))?
            .error_for_status()
            .map_err(|e| AutopressError::Generation(format!("Image download failed: {}", e)))?
            .bytes()
            .await
            .map_err(|e| AutopressError::Generation(format!("Image download failed: {}", e)))?;

        Ok(image.to_vec())
    }
}

/// Turns a drafted article into a cover file on disk
pub struct CoverStudio<G: ImageGenerator> {
    generator: G,
    config: CoverConfig,
}

impl<G: ImageGenerator> CoverStudio<G> {
    pub fn new(generator: G, config: CoverConfig) -> Self {
        Self { generator, config }
    }

    /// Build the image prompt from the title and a body excerpt
    pub fn build_prompt(title: &str, excerpt: &str) -> String {
        let summary: String = excerpt
            .replace('\n', " ")
            .chars()
            .take(400)
            .collect::<String>()
            .trim()
            .to_string();
        COVER_PROMPT
            .replace("{title}", title.trim())
            .replace("{summary}", &summary)
    }

    /// Generate and persist a cover for the article.
    ///
    /// The saved file is a transient artifact: the orchestrator deletes it
    /// once the work item is finished, successfully or not.
    pub async fn create(&self, title: &str, excerpt: &str) -> Result<CoverArtifact> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let request = CoverRequest {
            prompt: Self::build_prompt(title, excerpt),
            negative_prompt: self.config.negative_prompt.clone(),
            style: self.config.style.clone(),
            resolution: self.config.resolution.clone(),
            watermark: self.config.watermark,
        };

        let image = self.generator.generate(&request).await?;

        let safe_title = sanitize_for_filename(title);
        let filename = format!(
            "{}_{}.png",
            Utc::now().format("%Y%m%d_%H%M%S"),
            if safe_title.is_empty() {
                "article"
            } else {
                safe_title.as_str()
            }
        );
        let path = self.config.output_dir.join(filename);
        std::fs::write(&path, &image)?;

        info!("Cover for '{}' saved to {}", title, path.display());
        Ok(CoverArtifact::new(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedImage;

    #[async_trait]
    impl ImageGenerator for CannedImage {
        async fn generate(&self, _request: &CoverRequest) -> Result<Vec<u8>> {
            Ok(vec![0x89, 0x50, 0x4e, 0x47])
        }
    }

    fn config_in(dir: &tempfile::TempDir) -> CoverConfig {
        CoverConfig {
            output_dir: dir.path().join("covers"),
            ..CoverConfig::default()
        }
    }

    #[test]
    fn test_payload_serializes_in_api_shape() {
        let payload = ImagePayload {
            prompt: "p",
            rsp_img_type: "url",
            negative_prompt: "",
            style: "201",
            resolution: "1024:1024",
            logo_add: 0,
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["Prompt"], "p");
        assert_eq!(json["RspImgType"], "url");
        assert_eq!(json["Style"], "201");
        assert_eq!(json["LogoAdd"], 0);
        // Empty optional fields stay off the wire entirely.
        assert!(json.get("NegativePrompt").is_none());
    }

    #[test]
    fn test_error_envelope_parses() {
        let raw = r#"{"Response":{"Error":{"Code":"LimitExceeded","Message":"too fast"}}}"#;
        let envelope: ImageEnvelope = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.response.error.unwrap().code, "LimitExceeded");
        assert!(envelope.response.result_image.is_none());
    }

    #[test]
    fn test_build_prompt_flattens_and_caps_excerpt() {
        let excerpt = "第一段\n第二段\n".repeat(200);
        let prompt = CoverStudio::<CannedImage>::build_prompt("标题", &excerpt);
        assert!(prompt.contains("标题：标题"));
        // Newlines in the excerpt are flattened to spaces.
        assert!(!prompt.contains("第一段\n"));
        // The excerpt is capped at 400 characters after flattening.
        assert!(prompt.chars().count() < COVER_PROMPT.chars().count() + 450);
    }

    #[tokio::test]
    async fn test_create_writes_timestamped_png() {
        let dir = tempfile::tempdir().unwrap();
        let studio = CoverStudio::new(CannedImage, config_in(&dir));

        let artifact = studio.create("测试 标题", "正文摘要").await.unwrap();
        assert!(artifact.path.exists());
        let name = artifact.path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.ends_with("_测试_标题.png"));
    }

    #[tokio::test]
    async fn test_create_with_unsanitizable_title() {
        let dir = tempfile::tempdir().unwrap();
        let studio = CoverStudio::new(CannedImage, config_in(&dir));

        let artifact = studio.create("!!!", "正文").await.unwrap();
        let name = artifact.path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.ends_with("_article.png"));
    }
}
