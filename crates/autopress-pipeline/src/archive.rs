//! Local article archive for generate-only runs

use autopress_ai::Article;
use autopress_core::{sanitize_for_filename, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::info;

/// Save a drafted article as a Markdown file, title as the `#` heading.
///
/// Files are named `YYYYmmdd_HHMMSS_<sanitized topic>.md` so repeated runs
/// never overwrite each other.
pub fn save_article(dir: &Path, topic: &str, article: &Article) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let safe_topic = sanitize_for_filename(topic);
    let filename = format!(
        "{}_{}.md",
        Utc::now().format("%Y%m%d_%H%M%S"),
        if safe_topic.is_empty() {
            "article"
        } else {
            safe_topic.as_str()
        }
    );
    let path = dir.join(filename);

    let content = format!("# {}\n\n{}", article.title, article.body);
    std::fs::write(&path, content)?;

    info!("Article archived locally: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_article_writes_heading_and_body() {
        let dir = tempfile::tempdir().unwrap();
        let article = Article {
            title: "一个标题".to_string(),
            body: "正文内容".to_string(),
        };

        let path = save_article(dir.path(), "话题 名称", &article).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();

        assert_eq!(content, "# 一个标题\n\n正文内容");
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.ends_with("_话题_名称.md"));
    }
}
