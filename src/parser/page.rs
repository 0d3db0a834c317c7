use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html};

use super::{find_subsection, first_text, text_of};
use crate::model::Kind;
use crate::settings::CompiledSelectors;

static KIND_IN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<kind>[a-z]+) in (?P<ns>[A-Za-z_][\w.]*)$").unwrap());
static STRUCT_IN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i:struct) in (?P<ns>[A-Za-z_][\w.]*)$").unwrap());
static NAMESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Namespace: ?(?P<ns>[A-Za-z_][\w.]*)$").unwrap());

/// Identity of a type page that documents callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeHeader {
    pub name: String,
    pub namespace: String,
    /// `None` when the subtitle form carries no kind word.
    pub kind: Option<Kind>,
}

/// Parse a subtitle line such as `class in UnityEngine`, `struct in UnityEngine`
/// or the older `Namespace: UnityEngine`.
pub fn parse_subtitle(line: &str) -> Option<(String, Option<Kind>)> {
    if let Some(caps) = STRUCT_IN_RE.captures(line) {
        return Some((caps["ns"].to_string(), Some(Kind::Struct)));
    }
    if let Some(caps) = KIND_IN_RE.captures(line) {
        return Some((caps["ns"].to_string(), Some(Kind::from_word(Some(&caps["kind"])))));
    }
    NAMESPACE_RE
        .captures(line)
        .map(|caps| (caps["ns"].to_string(), None))
}

/// Decide whether a page describes a type with a non-empty Messages section.
/// Most reference pages do not; they yield `None`.
pub fn extract_type<'a>(
    doc: &'a Html,
    sel: &CompiledSelectors,
) -> Option<(TypeHeader, ElementRef<'a>)> {
    let root = doc.root_element();
    let name = first_text(root, &sel.type_heading)?;
    let (namespace, kind) = root
        .select(&sel.type_subtitle)
        .find_map(|p| parse_subtitle(&text_of(p)))?;
    let messages = find_subsection(root, &sel.subsection, &sel.subsection_title, "Messages")?;
    messages.select(&sel.row).next()?;

    Some((
        TypeHeader {
            name,
            namespace,
            kind,
        },
        messages,
    ))
}

// ── Tests ──
