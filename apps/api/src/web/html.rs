use scraper::{Html, Node};

/// Returns the visible text of an HTML document.
///
/// Text under any element named in `skipped` is dropped. Text nodes are joined
/// with spaces and whitespace runs collapse to a single space.
pub fn html_to_text(html: &str, skipped: &[&str]) -> String {
    let document = Html::parse_document(html);

    let fragments: Vec<&str> = document
        .tree
        .root()
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node.ancestors().any(|ancestor| match ancestor.value() {
                Node::Element(element) => skipped.iter().any(|name| *name == element.name()),
                _ => false,
            });
            (!hidden).then_some(&**text)
        })
        .collect();

    collapse_whitespace(&fragments.join(" "))
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncates to at most `max_chars` characters, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE_SKIPS: &[&str] = &["script", "style", "nav", "footer", "header"];

    #[test]
    fn test_html_to_text_drops_skipped_subtrees() {
        let html = r#"<html><head><style>body { color: red }</style></head><body>
            <header><a href="/">Logo</a></header>
            <nav><ul><li>Home</li><li>About</li></ul></nav>
            <main><h1>Our mission</h1><p>We build <b>tools</b> for teams.</p></main>
            <footer>© 2024 Acme</footer>
            <script>track();</script>
        </body></html>"#;

        assert_eq!(
            html_to_text(html, PAGE_SKIPS),
            "Our mission We build tools for teams."
        );
    }

    #[test]
    fn test_html_to_text_keeps_elements_not_listed() {
        let html = "<body><nav>Menu</nav><p>Body</p></body>";
        assert_eq!(html_to_text(html, &["script"]), "Menu Body");
    }

    #[test]
    fn test_html_to_text_plain_text_input() {
        assert_eq!(html_to_text("just   some\n\ttext", PAGE_SKIPS), "just some text");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\n b\t c  "), "a b c");
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }
}
