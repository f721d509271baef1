//! Minimal Markdown-to-HTML rendering for the portal's rich-text editor
//!
//! The editor accepts raw HTML through its content model, so the drafted
//! article body is rendered with a deliberately small mapping: blocks are
//! split on blank lines; `###`/`##`/`#` become headings, `>` a blockquote,
//! a block fully wrapped in `**` becomes `<strong>`, and anything else a
//! paragraph with newlines as `<br>`.

/// Render markdown-ish article text to editor HTML
pub fn markdown_to_html(markdown: &str) -> String {
    let mut parts: Vec<String> = Vec::new();

    for block in markdown.split("\n\n") {
        let stripped = block.trim();
        if stripped.is_empty() {
            continue;
        }

        if let Some(rest) = stripped.strip_prefix("### ") {
            parts.push(format!("<h3>{}</h3>", rest.trim()));
        } else if let Some(rest) = stripped.strip_prefix("## ") {
            parts.push(format!("<h2>{}</h2>", rest.trim()));
        } else if let Some(rest) = stripped.strip_prefix("# ") {
            parts.push(format!("<h1>{}</h1>", rest.trim()));
        } else if stripped.starts_with('>') {
            let quote = stripped
                .trim_start_matches(|c| c == '>' || c == ' ')
                .trim();
            parts.push(format!("<blockquote>{}</blockquote>", quote));
        } else if stripped.starts_with("**") && stripped.ends_with("**") {
            parts.push(format!("<strong>{}</strong>", stripped.trim_matches('*')));
        } else {
            parts.push(format!("<p>{}</p>", stripped.replace('\n', "<br>")));
        }
    }

    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings() {
        assert_eq!(markdown_to_html("# 大标题"), "<h1>大标题</h1>");
        assert_eq!(markdown_to_html("## 小标题"), "<h2>小标题</h2>");
        assert_eq!(markdown_to_html("### 更小的标题"), "<h3>更小的标题</h3>");
    }

    #[test]
    fn test_blockquote_strips_markers() {
        assert_eq!(markdown_to_html("> 引用内容"), "<blockquote>引用内容</blockquote>");
        assert_eq!(markdown_to_html(">>嵌套"), "<blockquote>嵌套</blockquote>");
    }

    #[test]
    fn test_bold_block() {
        assert_eq!(markdown_to_html("**重点**"), "<strong>重点</strong>");
    }

    #[test]
    fn test_paragraph_with_line_breaks() {
        assert_eq!(
            markdown_to_html("第一行\n第二行"),
            "<p>第一行<br>第二行</p>"
        );
    }

    #[test]
    fn test_blocks_split_on_blank_lines() {
        let html = markdown_to_html("### 段落标题\n\n正文内容\n\n> 引用");
        assert_eq!(
            html,
            "<h3>段落标题</h3>\n<p>正文内容</p>\n<blockquote>引用</blockquote>"
        );
    }

    #[test]
    fn test_empty_blocks_skipped() {
        assert_eq!(markdown_to_html("a\n\n\n\n\n\nb"), "<p>a</p>\n<p>b</p>");
        assert_eq!(markdown_to_html(""), "");
    }

    #[test]
    fn test_heading_without_space_is_a_paragraph() {
        // Only the spaced marker forms are headings.
        assert_eq!(markdown_to_html("#无空格"), "<p>#无空格</p>");
    }
}
