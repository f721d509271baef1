//! Element roles of the authoring UI
//!
//! Each role is a stable logical name plus an ordered, hand-authored
//! candidate list: most specific first, loosest fallback last. Timeouts
//! are per role — the publish button gets the page-load budget, the
//! optional cover controls only a short probe.

use autopress_browser::{Locator, RoleQuery};
use std::time::Duration;

/// Article title textarea
pub fn title_input() -> RoleQuery {
    RoleQuery::new(
        "title_input",
        vec![
            Locator::css("textarea[placeholder*='请输入文章标题']"),
            Locator::css("div.article-title textarea"),
            Locator::xpath("//textarea[contains(@placeholder,'标题')]"),
        ],
        Duration::from_secs(20),
    )
}

/// Rich-text editor body
pub fn editor_body() -> RoleQuery {
    RoleQuery::new(
        "editor_body",
        vec![
            Locator::css(".ProseMirror"),
            Locator::css("div[contenteditable='true']"),
        ],
        Duration::from_secs(20),
    )
}

/// Radio switching the cover section to single-image mode
pub fn single_cover_mode() -> RoleQuery {
    RoleQuery::new(
        "single_cover_mode",
        vec![
            Locator::xpath(
                "//label[@class='byte-radio']//input[@type='radio' and @value='2']/ancestor::label[1]",
            ),
            Locator::xpath(
                "//span[contains(@class,'byte-radio-inner-text') and text()='单图']/ancestor::label[1]",
            ),
        ],
        Duration::from_secs(5),
    )
}

/// Radio switching the cover section to no-cover mode
pub fn no_cover_mode() -> RoleQuery {
    RoleQuery::new(
        "no_cover_mode",
        vec![
            Locator::xpath(
                "//label[@class='byte-radio']//input[@type='radio' and @value='1']/ancestor::label[1]",
            ),
            Locator::xpath(
                "//span[contains(@class,'byte-radio-inner-text') and text()='无封面']/ancestor::label[1]",
            ),
            Locator::xpath(
                "//label[contains(@class,'byte-radio')]//span[text()='无封面']/ancestor::label[1]",
            ),
        ],
        Duration::from_secs(5),
    )
}

/// Hidden file input behind the cover drop zone
pub fn cover_file_input() -> RoleQuery {
    RoleQuery::new(
        "cover_upload_input",
        vec![
            Locator::xpath("//div[contains(@class,'article-cover-add')]//input[@type='file']"),
            Locator::xpath("//div[contains(@class,'article-cover')]//input[@type='file']"),
            Locator::xpath("//input[@type='file' and contains(@accept,'image')]"),
        ],
        Duration::from_secs(5),
    )
}

/// Confirmation button of the cover-upload dialog (absent on some variants)
pub fn cover_confirm() -> RoleQuery {
    RoleQuery::new(
        "cover_upload_confirm",
        vec![
            Locator::xpath("//span[contains(text(),'确定')]/ancestor::button[1]"),
            Locator::xpath("//button[contains(text(),'确定')]"),
            Locator::xpath("//button[contains(@class,'primary')]"),
        ],
        Duration::from_secs(3),
    )
    .clickable()
}

/// Primary publish-initiating button ("preview and publish")
pub fn preview_publish() -> RoleQuery {
    RoleQuery::new(
        "preview_publish_btn",
        vec![
            Locator::xpath("//span[contains(text(),'预览并发布')]/ancestor::button[1]"),
            Locator::xpath("//button[contains(text(),'预览并发布')]"),
            Locator::xpath("//button[contains(@class,'publish-btn')]"),
        ],
        Duration::from_secs(20),
    )
    .clickable()
}

/// Secondary confirmation button; some flows auto-publish without it
pub fn confirm_publish() -> RoleQuery {
    RoleQuery::new(
        "confirm_publish_btn",
        vec![
            Locator::xpath("//span[contains(text(),'确认发布')]/ancestor::button[1]"),
            Locator::xpath("//button[contains(text(),'确认发布')]"),
            Locator::xpath("//div[contains(@class,'modal')]//button[contains(@class,'primary')]"),
        ],
        Duration::from_secs(10),
    )
    .clickable()
}

/// Account badge proving the session is authenticated
pub fn account_badge() -> RoleQuery {
    RoleQuery::new(
        "account_badge",
        vec![
            Locator::css(".username"),
            Locator::css(".user-name"),
        ],
        Duration::from_secs(10),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_keys_are_unique() {
        let roles = [
            title_input(),
            editor_body(),
            single_cover_mode(),
            no_cover_mode(),
            cover_file_input(),
            cover_confirm(),
            preview_publish(),
            confirm_publish(),
            account_badge(),
        ];

        let mut keys: Vec<&str> = roles.iter().map(|r| r.key.as_str()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), roles.len());
    }

    #[test]
    fn test_every_role_has_candidates() {
        for role in [
            title_input(),
            editor_body(),
            single_cover_mode(),
            no_cover_mode(),
            cover_file_input(),
            cover_confirm(),
            preview_publish(),
            confirm_publish(),
            account_badge(),
        ] {
            assert!(!role.candidates.is_empty(), "{} has no candidates", role.key);
            assert!(role.timeout.as_secs() > 0);
        }
    }

    #[test]
    fn test_buttons_are_clickable_roles() {
        assert!(preview_publish().clickable);
        assert!(confirm_publish().clickable);
        assert!(cover_confirm().clickable);
        assert!(!title_input().clickable);
    }
}
