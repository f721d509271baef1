//! Article drafting and title/body shaping
//!
//! The generator is asked to lead with a `标题：` line; real completions
//! only sometimes comply, so extraction runs a three-branch fallback:
//! marker line, then a plausibly-title-sized first line, then the first 30
//! characters of the first line. In the last branch the title line stays
//! inside the body — that asymmetry matches the shipped behavior and is
//! kept deliberately.

use autopress_core::Result;
use tracing::info;

use crate::writer::TextGenerator;

/// Prompt template for article drafting; `{topic}` is substituted
const ARTICLE_PROMPT: &str = "\
你是一位拥有百万粉丝的头部创作者，擅长撰写爆款深度分析文章。请针对以下热点话题，\
创作一篇高质量、高吸引力的文章。

话题：{topic}

要求：
- 开头必须抓人眼球，制造悬念和冲突感
- 多角度分析：现象、原因、影响、趋势，提供独特见解
- 段落短小精悍，使用 ### 小标题清晰分割内容（3-5个）
- 不要使用分割线（---）和加粗字体（**）
- 结尾提出一个引发思考的开放性问题
- 字数控制在 1200-1500 字之间

重要：请在文章开头第一行生成一个新颖、吸引人的标题，格式为\"标题：你的标题内容\"，\
长度控制在15-30字之间，不要标题党。

请开始撰写（记得在开头第一行写标题）：
";

/// A drafted article ready for rendering and publishing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub body: String,
}

/// Split raw generated text into a title and a body.
///
/// Precedence, applied once, stopping at the first match:
/// 1. a line starting with `标题：` or `标题:` — the remainder is the
///    title, the body starts after it;
/// 2. a first line of strictly more than 5 and fewer than 50 characters —
///    it becomes the title, the body starts at line 2;
/// 3. the first 30 characters of the first line — the body keeps the full
///    first line.
///
/// Lengths are character counts, not bytes. Leading blank lines are
/// stripped from the body.
pub fn split_title_body(raw: &str) -> (Option<String>, String) {
    let lines: Vec<&str> = raw.trim().split('\n').collect();

    let mut title: Option<String> = None;
    let mut content_start = 0;

    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed
            .strip_prefix("标题：")
            .or_else(|| trimmed.strip_prefix("标题:"))
        {
            title = Some(rest.trim().to_string());
            content_start = i + 1;
            break;
        }
    }

    if title.is_none() {
        if let Some(first) = lines.first() {
            let first = first.trim();
            let length = first.chars().count();
            if length > 5 && length < 50 {
                title = Some(first.to_string());
                content_start = 1;
            }
        }
    }

    if title.is_none() {
        if let Some(first) = lines.first() {
            title = Some(first.trim().chars().take(30).collect());
            content_start = 0;
        }
    }

    let mut content_lines = &lines[content_start.min(lines.len())..];
    while let Some((head, rest)) = content_lines.split_first() {
        if head.trim().is_empty() {
            content_lines = rest;
        } else {
            break;
        }
    }

    let body = content_lines.join("\n").trim().to_string();
    (title.filter(|t| !t.is_empty()), body)
}

/// Drafts articles for trending topics through a [`TextGenerator`]
#[derive(Debug, Clone)]
pub struct ArticleWriter<G: TextGenerator> {
    generator: G,
}

impl<G: TextGenerator> ArticleWriter<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    /// Draft an article for a topic.
    ///
    /// Returns `Ok(None)` when the completion carried no usable body; the
    /// caller skips the work item rather than failing the run. A title the
    /// extraction could not find falls back to the topic string itself.
    pub async fn draft(&self, topic: &str, source_url: Option<&str>) -> Result<Option<Article>> {
        let mut prompt = ARTICLE_PROMPT.replace("{topic}", topic);
        if let Some(url) = source_url {
            prompt.push_str(&format!(
                "\n参考链接：{}\n请结合该链接可能涉及的事实背景，输出一篇具有洞察力的文章。",
                url
            ));
        }

        let completion = self.generator.generate(&prompt).await?;
        let (title, body) = split_title_body(&completion);

        if body.is_empty() {
            return Ok(None);
        }

        let title = title.unwrap_or_else(|| topic.to_string());
        info!("Drafted article: {}", title);
        Ok(Some(Article { title, body }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use autopress_core::AutopressError;

    struct CannedGenerator(String);

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Err(AutopressError::Generation("503".to_string()))
        }
    }

    #[test]
    fn test_marker_line_fullwidth_colon() {
        let (title, body) = split_title_body("标题：Foo\n\nBar\nBaz");
        assert_eq!(title.as_deref(), Some("Foo"));
        assert_eq!(body, "Bar\nBaz");
    }

    #[test]
    fn test_marker_line_ascii_colon() {
        let (title, body) = split_title_body("标题: 一个标题\n正文第一段");
        assert_eq!(title.as_deref(), Some("一个标题"));
        assert_eq!(body, "正文第一段");
    }

    #[test]
    fn test_marker_beyond_first_line_still_wins() {
        // The marker scan runs over every line before the length-based
        // fallbacks get a chance.
        let (title, body) = split_title_body("引言放在最前面一行\n标题：迟到的标题\n正文");
        assert_eq!(title.as_deref(), Some("迟到的标题"));
        assert_eq!(body, "正文");
    }

    #[test]
    fn test_title_sized_first_line_becomes_title() {
        // 10 characters, no marker: the line is promoted to title and
        // excluded from the body.
        let (title, body) = split_title_body("这是一个十字的标题行\n后面是正文内容");
        assert_eq!(title.as_deref(), Some("这是一个十字的标题行"));
        assert_eq!(body, "后面是正文内容");
    }

    #[test]
    fn test_long_first_line_truncated_but_kept_in_body() {
        let first_line: String = "长".repeat(60);
        let raw = format!("{}\n第二行", first_line);
        let (title, body) = split_title_body(&raw);

        assert_eq!(title.as_deref(), Some("长".repeat(30).as_str()));
        // Documented fallback: the title line is NOT excluded from the body.
        assert!(body.starts_with(&first_line));
        assert!(body.ends_with("第二行"));
    }

    #[test]
    fn test_short_first_line_falls_through_to_truncation_branch() {
        // 4 characters is not title-sized (needs strictly more than 5), so
        // branch 3 applies and the line stays in the body.
        let (title, body) = split_title_body("四字标题\n正文");
        assert_eq!(title.as_deref(), Some("四字标题"));
        assert_eq!(body, "四字标题\n正文");
    }

    #[test]
    fn test_leading_blank_lines_stripped_from_body() {
        let (_, body) = split_title_body("标题：T\n\n\n\n正文");
        assert_eq!(body, "正文");
    }

    #[test]
    fn test_empty_input() {
        let (title, body) = split_title_body("");
        assert!(title.is_none());
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_draft_empty_body_is_unusable() {
        let writer = ArticleWriter::new(CannedGenerator("标题：只有标题".to_string()));
        let drafted = writer.draft("话题", None).await.unwrap();
        assert!(drafted.is_none());
    }

    #[tokio::test]
    async fn test_draft_falls_back_to_topic_for_title() {
        let writer = ArticleWriter::new(CannedGenerator("\n\n".to_string()));
        assert!(writer.draft("话题", None).await.unwrap().is_none());

        let writer = ArticleWriter::new(CannedGenerator("标题：写好了\n\n正文在此".to_string()));
        let article = writer.draft("话题", None).await.unwrap().unwrap();
        assert_eq!(article.title, "写好了");
        assert_eq!(article.body, "正文在此");
    }

    #[tokio::test]
    async fn test_draft_propagates_generator_errors() {
        let writer = ArticleWriter::new(FailingGenerator);
        assert!(writer.draft("话题", Some("https://u")).await.is_err());
    }
}
