use ammonia::Builder;
use std::collections::HashSet;

/// Clean user-authored HTML: scripts, event handlers and unknown tags are
/// dropped, links get `rel="noopener noreferrer"`.
pub fn sanitize_html(content: &str) -> String {
    Builder::default()
        .link_rel(Some("noopener noreferrer"))
        .clean(content)
        .to_string()
}

/// Strip all markup, leaving plain text for single-line fields. The result
/// is unescaped text; whoever renders it as HTML escapes it.
pub fn sanitize_text(text: &str) -> String {
    let cleaned = Builder::default().tags(HashSet::new()).clean(text).to_string();
    html_escape::decode_html_entities(&cleaned).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripts_are_removed() {
        let clean = sanitize_html("<p>Привет</p><script>alert(1)</script>");
        assert_eq!(clean, "<p>Привет</p>");
    }

    #[test]
    fn event_handlers_are_removed() {
        let clean = sanitize_html(r#"<img src="a.png" onerror="alert(1)">"#);
        assert!(!clean.contains("onerror"));
    }

    #[test]
    fn links_get_rel() {
        let clean = sanitize_html(r#"<a href="https://example.com">x</a>"#);
        assert!(clean.contains(r#"rel="noopener noreferrer""#));
    }

    #[test]
    fn text_loses_all_tags() {
        assert_eq!(sanitize_text("<b>Rust</b> и <i>Go</i>"), "Rust и Go");
    }

    #[test]
    fn text_keeps_literal_characters() {
        assert_eq!(sanitize_text("C++ & Rust <3"), "C++ & Rust <3");
        assert_eq!(sanitize_text("\"Рога & копыта\""), "\"Рога & копыта\"");
    }
}
