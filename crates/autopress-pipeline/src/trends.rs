//! Trend feed: where work items come from
//!
//! The crawl mode fetches trending topics from a JSON feed, optionally
//! screens each one through the text generator, and writes the surviving
//! items to the queue file. HTML scraping is deliberately out of scope;
//! the boundary is a feed that already speaks JSON.

use async_trait::async_trait;
use autopress_ai::{TextGenerator, TopicScreen};
use autopress_core::{AutopressError, Result, WorkItem};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::queue::save_work_items;

const FEED_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of trending work items (allows scripted fakes in tests)
#[async_trait]
pub trait TrendSource: Send + Sync {
    /// Fetch up to `limit` trending topics, most prominent first
    async fn fetch(&self, limit: usize) -> Result<Vec<WorkItem>>;
}

/// HTTP trend feed returning a JSON array of work items
#[derive(Debug, Clone)]
pub struct JsonTrendFeed {
    url: String,
}

impl JsonTrendFeed {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl TrendSource for JsonTrendFeed {
    async fn fetch(&self, limit: usize) -> Result<Vec<WorkItem>> {
        info!("Fetching trends from {}", self.url);

        let client = reqwest::Client::new();
        let mut items: Vec<WorkItem> = client
            .get(&self.url)
            .timeout(FEED_TIMEOUT)
            .send()
            .await
            .map_err(|e| AutopressError::Other(format!("Trend feed request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| AutopressError::Other(format!("Trend feed request failed: {}", e)))?
            .json()
            .await
            .map_err(|e| AutopressError::Other(format!("Trend feed is not a JSON array: {}", e)))?;

        items.truncate(limit);
        info!("Fetched {} trending topics", items.len());
        Ok(items)
    }
}

/// Crawl the feed into the queue file.
///
/// Topics failing the screen are dropped; the rest are written to
/// `queue_path` in feed order. Returns how many items were kept.
pub async fn crawl_trends<S, G>(
    source: &S,
    screen: Option<&TopicScreen<G>>,
    limit: usize,
    queue_path: &Path,
) -> Result<usize>
where
    S: TrendSource,
    G: TextGenerator,
{
    let fetched = source.fetch(limit).await?;
    if fetched.is_empty() {
        return Err(AutopressError::Other(
            "Trend feed returned no topics".to_string(),
        ));
    }

    let total = fetched.len();
    let mut kept = Vec::with_capacity(total);
    for (idx, item) in fetched.into_iter().enumerate() {
        if let Some(screen) = screen {
            info!("[{}/{}] Screening topic: {}", idx + 1, total, item.title);
            if !screen.allows(&item.title).await {
                info!("Dropped sensitive topic: {}", item.title);
                continue;
            }
        }
        kept.push(item);
    }

    if kept.is_empty() {
        return Err(AutopressError::Other(
            "Every fetched topic was screened out".to_string(),
        ));
    }

    save_work_items(queue_path, &kept)?;
    Ok(kept.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::load_work_items;

    struct CannedSource(Vec<WorkItem>);

    #[async_trait]
    impl TrendSource for CannedSource {
        async fn fetch(&self, limit: usize) -> Result<Vec<WorkItem>> {
            let mut items = self.0.clone();
            items.truncate(limit);
            Ok(items)
        }
    }

    struct BlockContaining(&'static str);

    #[async_trait]
    impl TextGenerator for BlockContaining {
        async fn generate(&self, prompt: &str) -> Result<String> {
            Ok(if prompt.contains(self.0) { "是" } else { "否" }.to_string())
        }
    }

    fn items() -> Vec<WorkItem> {
        vec![
            WorkItem::new("景区门票新政", "https://example.com/1"),
            WorkItem::new("某国大选开锣", "https://example.com/2"),
            WorkItem::new("新款手机发布", "https://example.com/3"),
        ]
    }

    #[tokio::test]
    async fn test_crawl_without_screening_keeps_feed_order() {
        let dir = tempfile::tempdir().unwrap();
        let queue = dir.path().join("queue.json");

        let kept = crawl_trends::<_, BlockContaining>(&CannedSource(items()), None, 10, &queue)
            .await
            .unwrap();

        assert_eq!(kept, 3);
        let saved = load_work_items(&queue);
        assert_eq!(saved[0].title, "景区门票新政");
        assert_eq!(saved[2].title, "新款手机发布");
    }

    #[tokio::test]
    async fn test_crawl_drops_screened_topics() {
        let dir = tempfile::tempdir().unwrap();
        let queue = dir.path().join("queue.json");
        let screen = TopicScreen::new(BlockContaining("大选"));

        let kept = crawl_trends(&CannedSource(items()), Some(&screen), 10, &queue)
            .await
            .unwrap();

        assert_eq!(kept, 2);
        let saved = load_work_items(&queue);
        assert!(saved.iter().all(|i| !i.title.contains("大选")));
    }

    #[tokio::test]
    async fn test_crawl_respects_limit() {
        let dir = tempfile::tempdir().unwrap();
        let queue = dir.path().join("queue.json");

        let kept = crawl_trends::<_, BlockContaining>(&CannedSource(items()), None, 1, &queue)
            .await
            .unwrap();

        assert_eq!(kept, 1);
    }

    #[tokio::test]
    async fn test_empty_feed_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let queue = dir.path().join("queue.json");

        let result = crawl_trends::<_, BlockContaining>(
            &CannedSource(Vec::new()),
            None,
            10,
            &queue,
        )
        .await;

        assert!(result.is_err());
        assert!(!queue.exists());
    }
}
