//! Sensitive-topic screening for crawled trends
//!
//! Each fetched trend title is classified through the text generator with
//! a strict yes/no prompt before it enters the work-item queue.
//! Classification failures fail open: an unreachable classifier must not
//! empty the queue, so the topic is kept and a warning logged.

use tracing::{debug, warn};

use crate::writer::TextGenerator;

/// Prompt template for topic screening; `{title}` is substituted
const SCREEN_PROMPT: &str = "\
请严格判断以下话题是否主要涉及政治敏感内容（包括政府、政策、领导人、选举、国际关系、\
军事、敏感事件等）。只考虑明显的政治敏感内容，普通的社会新闻、娱乐、科技、体育等内容\
不要误判。如果话题中出现了任何国家名字，一律判定为敏感内容。

话题: \"{title}\"

请只回复一个字：\"是\" 或 \"否\"，不要添加任何其他文字说明。
";

/// Screens topics through a [`TextGenerator`] classifier
#[derive(Debug, Clone)]
pub struct TopicScreen<G: TextGenerator> {
    generator: G,
}

impl<G: TextGenerator> TopicScreen<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    /// Whether a topic may enter the queue.
    ///
    /// `是` means sensitive and the topic is dropped; any other verdict or
    /// a classifier failure keeps it.
    pub async fn allows(&self, title: &str) -> bool {
        let prompt = SCREEN_PROMPT.replace("{title}", title);
        match self.generator.generate(&prompt).await {
            Ok(verdict) => {
                let blocked = verdict.trim() == "是";
                debug!("Screened '{}': {}", title, verdict.trim());
                !blocked
            }
            Err(e) => {
                warn!("Topic screening failed for '{}' ({}), keeping it", title, e);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use autopress_core::{AutopressError, Result};

    struct Verdict(&'static str);

    #[async_trait]
    impl TextGenerator for Verdict {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct Unreachable;

    #[async_trait]
    impl TextGenerator for Unreachable {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Err(AutopressError::Generation("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_sensitive_verdict_blocks() {
        assert!(!TopicScreen::new(Verdict("是")).allows("某国峰会").await);
    }

    #[tokio::test]
    async fn test_clear_verdict_allows() {
        assert!(TopicScreen::new(Verdict("否")).allows("景区门票").await);
    }

    #[tokio::test]
    async fn test_chatty_verdict_allows() {
        // Anything other than a bare 是 keeps the topic.
        assert!(TopicScreen::new(Verdict("可能是")).allows("话题").await);
    }

    #[tokio::test]
    async fn test_classifier_failure_fails_open() {
        assert!(TopicScreen::new(Unreachable).allows("话题").await);
    }
}
