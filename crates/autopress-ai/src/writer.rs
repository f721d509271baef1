//! Chat-completions client for article drafting
//!
//! The text generator is an OpenAI-style chat-completions endpoint. Each
//! call is stateless: one user message in, one completion out, no
//! conversation history.

use async_trait::async_trait;
use autopress_core::{AutopressError, Result, WriterConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Abstract text-generation capability (allows scripted fakes in tests)
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for the prompt.
    ///
    /// Transport and protocol failures are errors; what counts as a usable
    /// article is the caller's decision.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Chat message in the completions wire format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: usize,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Live chat-completions client
#[derive(Debug, Clone)]
pub struct ChatCompletionClient {
    config: WriterConfig,
}

impl ChatCompletionClient {
    pub fn new(config: WriterConfig) -> Self {
        Self { config }
    }

    fn api_key(&self) -> Result<String> {
        std::env::var(&self.config.api_key_env).map_err(|_| {
            AutopressError::Config(format!(
                "Text generation API key not set; export {}",
                self.config.api_key_env
            ))
        })
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let api_key = self.api_key()?;
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!("Requesting completion from {}", self.config.api_url);

        let client = reqwest::Client::new();
        let response = client
            .post(&self.config.api_url)
            .bearer_auth(&api_key)
            .json(&request)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| AutopressError::Generation(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown".to_string());
            return Err(AutopressError::Generation(format!(
                "Completion API error {}: {}",
                status, body
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AutopressError::Generation(format!("Malformed response: {}", e)))?;

        let content = parsed
            .choices
            .first()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| {
                AutopressError::Generation("Completion response had no choices".to_string())
            })?;

        info!("Completion received ({} chars)", content.len());
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_in_wire_shape() {
        let request = ChatRequest {
            model: "deepseek-reasoner".to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: "写一篇文章".to_string(),
            }],
            max_tokens: 4096,
            temperature: 0.7,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "deepseek-reasoner");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["max_tokens"], 4096);
    }

    #[test]
    fn test_response_parses_first_choice() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"标题：测试\n\n正文"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content, "标题：测试\n\n正文");
    }

    #[tokio::test]
    async fn test_missing_api_key_is_config_error() {
        let mut config = WriterConfig::default();
        config.api_key_env = "AUTOPRESS_TEST_MISSING_KEY".to_string();
        std::env::remove_var("AUTOPRESS_TEST_MISSING_KEY");

        let client = ChatCompletionClient::new(config);
        let err = client.generate("prompt").await.unwrap_err();
        assert!(matches!(err, AutopressError::Config(_)));
    }
}
