//! HTML sanitization for user-authored content.
//!
//! Post and comment bodies arrive as rich-text HTML from the client editor.
//! Everything is run through a fixed allow-list before storage: text-structuring
//! tags, anchors with `href`/`title`, images with `src`/`alt`. All other tags and
//! attributes are stripped, not escaped.

use std::collections::{HashMap, HashSet};

use ammonia::Builder;

/// Tags a post or comment body is allowed to contain.
const ALLOWED_TAGS: &[&str] = &[
    "a", "abbr", "acronym", "address", "b", "br", "dl", "dt", "em", "h1", "h2", "h3", "h4", "h5",
    "h6", "hr", "i", "img", "li", "ol", "p", "pre", "q", "s", "small", "strike", "strong", "span",
    "sub", "sup", "table", "tbody", "td", "tfoot", "th", "thead", "tr", "tt", "u", "ul",
];

/// Cleans untrusted HTML down to the allow-list.
///
/// Anchors keep `href` and `title`, images keep `src` and `alt`; no tag keeps
/// anything else. Scripts, event handlers, and unknown tags are removed entirely.
pub fn clean_html(content: &str) -> String {
    let tags: HashSet<&str> = ALLOWED_TAGS.iter().copied().collect();

    let mut tag_attributes: HashMap<&str, HashSet<&str>> = HashMap::new();
    tag_attributes.insert("a", ["href", "title"].into_iter().collect());
    tag_attributes.insert("img", ["src", "alt"].into_iter().collect());

    Builder::default()
        .tags(tags)
        .tag_attributes(tag_attributes)
        .generic_attributes(HashSet::new())
        // No injected rel attribute; the allow-list is exhaustive.
        .link_rel(None)
        .clean(content)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_stripped_content_kept() {
        let cleaned = clean_html("<script>alert(1)</script><b>ok</b>");
        assert!(cleaned.contains("ok"));
        assert!(!cleaned.contains("<script"));
        assert!(!cleaned.contains("alert(1)"));
        assert!(cleaned.contains("<b>"));
    }

    #[test]
    fn test_anchor_keeps_href_drops_event_handlers() {
        let cleaned = clean_html(r#"<a href="https://example.com" onclick="steal()">link</a>"#);
        assert!(cleaned.contains(r#"href="https://example.com""#));
        assert!(!cleaned.contains("onclick"));
    }

    #[test]
    fn test_img_attributes_filtered() {
        let cleaned = clean_html(r#"<img src="/pic.png" alt="pic" width="300">"#);
        assert!(cleaned.contains(r#"src="/pic.png""#));
        assert!(cleaned.contains(r#"alt="pic""#));
        assert!(!cleaned.contains("width"));
    }

    #[test]
    fn test_unknown_tags_removed() {
        let cleaned = clean_html("<iframe src=\"x\"></iframe><p>text</p>");
        assert!(!cleaned.contains("iframe"));
        assert!(cleaned.contains("<p>text</p>"));
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(clean_html("just words"), "just words");
    }
}
