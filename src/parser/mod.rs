pub mod detail;
pub mod example;
pub mod messages;
pub mod page;
pub mod params;

use std::path::Path;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Load and parse an HTML file. Unreadable files count as absent; bytes that
/// are not UTF-8 are replaced rather than rejected.
pub fn load_document(path: &Path) -> Option<Html> {
    match std::fs::read(path) {
        Ok(bytes) => Some(Html::parse_document(&String::from_utf8_lossy(&bytes))),
        Err(e) => {
            debug!("skipping {}: {}", path.display(), e);
            None
        }
    }
}

/// Text content of a node with whitespace collapsed.
pub fn text_of(node: ElementRef) -> String {
    let raw: String = node.text().collect();
    normalize_ws(&raw)
}

/// Collapse runs of whitespace (including non-breaking spaces) into one space and trim.
pub fn normalize_ws(s: &str) -> String {
    s.split(|c: char| c.is_whitespace() || c == '\u{a0}')
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// First descendant matched by `sel` with non-blank text.
pub fn first_text(scope: ElementRef, sel: &Selector) -> Option<String> {
    scope
        .select(sel)
        .map(text_of)
        .find(|t| !t.is_empty())
}

/// The `div.subsection`-style block whose title reads `title` (case-insensitive).
pub fn find_subsection<'a>(
    scope: ElementRef<'a>,
    subsection: &Selector,
    title_sel: &Selector,
    title: &str,
) -> Option<ElementRef<'a>> {
    scope.select(subsection).find(|s| {
        s.select(title_sel)
            .next()
            .map(|h| text_of(h).eq_ignore_ascii_case(title))
            .unwrap_or(false)
    })
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_encoded_pages_still_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.html");
        let mut bytes = b"<h1>MonoBehaviour</h1><p>Caf".to_vec();
        bytes.push(0xe9);
        bytes.extend_from_slice(b" in Latin-1</p>");
        std::fs::write(&path, bytes).unwrap();

        let doc = load_document(&path).unwrap();
        let h1 = Selector::parse("h1").unwrap();
        assert_eq!(first_text(doc.root_element(), &h1).as_deref(), Some("MonoBehaviour"));
        let p = Selector::parse("p").unwrap();
        assert_eq!(first_text(doc.root_element(), &p).as_deref(), Some("Caf\u{fffd} in Latin-1"));
    }

    #[test]
    fn missing_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_document(&dir.path().join("nope.html")).is_none());
    }

    #[test]
    fn whitespace_collapsed() {
        assert_eq!(normalize_ws("  a\n\t b\u{a0}c  "), "a b c");
        assert_eq!(normalize_ws(""), "");
    }

    #[test]
    fn subsection_by_title() {
        let doc = Html::parse_document(
            r#"<div class="subsection"><h2>Description</h2><p>x</p></div>
               <div class="subsection"><h2> messages </h2><table><tr><td>a</td></tr></table></div>"#,
        );
        let sub = Selector::parse("div.subsection").unwrap();
        let title = Selector::parse("h2, h3").unwrap();
        let found = find_subsection(doc.root_element(), &sub, &title, "Messages").unwrap();
        assert!(text_of(found).contains("messages a"));
        assert!(find_subsection(doc.root_element(), &sub, &title, "Parameters").is_none());
    }

    #[test]
    fn missing_file_is_none() {
        assert!(load_document(Path::new("tests/fixtures/does-not-exist.html")).is_none());
    }
}
