//! Plain-text extraction from fetched HTML.
//!
//! Container priority: `<article>`, then `<main>`, then the full body.
//! Script/style/navigation subtrees are skipped during the text walk,
//! whitespace runs collapse to single spaces, and the result is truncated
//! to a fixed character budget.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Elements whose subtrees carry no article text.
const EXCLUDED_TAGS: [&str; 6] = ["script", "style", "nav", "footer", "header", "noscript"];

/// Content containers, most specific first.
const CONTAINER_SELECTORS: [&str; 3] = ["article", "main", "body"];

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Extract a plain-text excerpt of at most `max_chars` characters from
/// an HTML document. Returns an empty string if the document has no
/// extractable text.
pub fn extract_excerpt(html: &str, max_chars: usize) -> String {
    let doc = Html::parse_document(html);

    for sel_str in CONTAINER_SELECTORS {
        let sel = Selector::parse(sel_str).expect("valid selector");
        if let Some(container) = doc.select(&sel).next() {
            let mut raw = String::new();
            collect_text(container, &mut raw);

            // A container with no text nodes at all falls through to the
            // next one; whitespace-only text claims the container and
            // collapses to an empty excerpt.
            if raw.is_empty() {
                continue;
            }

            let collapsed = WHITESPACE_RE.replace_all(&raw, " ");
            return truncate_chars(collapsed.trim(), max_chars).to_string();
        }
    }

    String::new()
}

/// Walk the element's subtree collecting text nodes, skipping excluded
/// subtrees entirely.
fn collect_text(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            scraper::Node::Text(text) => out.push_str(&text.text),
            scraper::Node::Element(element) => {
                if EXCLUDED_TAGS.contains(&element.name()) {
                    continue;
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
            }
            _ => {}
        }
    }
}

/// Truncate at a character boundary (not bytes) so multi-byte text
/// survives the cut.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_article_over_main_and_body() {
        let html = r#"<html><body>
            <main>Main text</main>
            <article>Article text</article>
            Loose body text
        </body></html>"#;
        assert_eq!(extract_excerpt(html, 6000), "Article text");
    }

    #[test]
    fn falls_back_to_main_then_body() {
        let html = "<html><body><main>Main text</main> Loose text</body></html>";
        assert_eq!(extract_excerpt(html, 6000), "Main text");

        let html = "<html><body><p>Only body text</p></body></html>";
        assert_eq!(extract_excerpt(html, 6000), "Only body text");
    }

    #[test]
    fn whitespace_only_article_yields_empty_excerpt() {
        let html = "<html><body><article>   </article><p>Real text</p></body></html>";
        assert_eq!(extract_excerpt(html, 6000), "");
    }

    #[test]
    fn textless_article_falls_through_to_body() {
        let html = "<html><body><article></article><p>Real text</p></body></html>";
        assert_eq!(extract_excerpt(html, 6000), "Real text");
    }

    #[test]
    fn strips_chrome_elements() {
        let html = r#"<html><body><article>
            <script>var x = 1;</script>
            <style>p { color: red; }</style>
            <nav>Menu</nav>
            <header>Site header</header>
            <p>Keep this.</p>
            <footer>Site footer</footer>
            <noscript>Enable JS</noscript>
        </article></body></html>"#;
        let excerpt = extract_excerpt(html, 6000);
        assert_eq!(excerpt, "Keep this.");
    }

    #[test]
    fn collapses_whitespace_runs() {
        let html = "<html><body><article><p>one\n\n  two\t\tthree</p></article></body></html>";
        assert_eq!(extract_excerpt(html, 6000), "one two three");
    }

    #[test]
    fn truncates_to_char_budget() {
        let para = "word ".repeat(2000);
        let html = format!("<html><body><article><p>{para}</p></article></body></html>");
        let excerpt = extract_excerpt(&html, 6000);
        assert_eq!(excerpt.chars().count(), 6000);
    }

    #[test]
    fn truncates_multibyte_text_on_char_boundary() {
        let text = "é".repeat(50);
        let html = format!("<html><body><article>{text}</article></body></html>");
        let excerpt = extract_excerpt(&html, 10);
        assert_eq!(excerpt.chars().count(), 10);
        assert_eq!(excerpt, "é".repeat(10));
    }

    #[test]
    fn empty_document_yields_empty_excerpt() {
        assert_eq!(extract_excerpt("", 6000), "");
        assert_eq!(extract_excerpt("<html><body></body></html>", 6000), "");
    }
}
