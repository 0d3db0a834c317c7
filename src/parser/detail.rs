use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html};

use super::example::{parse_example, ExampleSignature};
use super::messages::MessageRow;
use super::params::{resolve, ParamDoc};
use super::{find_subsection, first_text, load_document, text_of};
use crate::model::RawObservation;
use crate::settings::CompiledSelectors;
use crate::version::Version;

static COROUTINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bcan (?:also )?be (?:used as |declared as )?an? co-?routine").unwrap()
});

/// Where a detail page sits and what owns it.
#[derive(Debug, Clone, Copy)]
pub struct DetailContext<'a> {
    /// Namespace used for unqualified parameter types.
    pub namespace: &'a str,
    pub version: &'a Version,
    /// Path recorded on the observation, relative to the reference directory.
    pub rel_path: &'a str,
}

/// Load a message's detail page and describe the callback it documents.
pub fn extract(
    row: &MessageRow,
    detail_path: &Path,
    ctx: DetailContext,
    sel: &CompiledSelectors,
) -> Option<RawObservation> {
    let doc = load_document(detail_path)?;
    extract_from(&doc, row, ctx, sel)
}

pub fn extract_from(
    doc: &Html,
    row: &MessageRow,
    ctx: DetailContext,
    sel: &CompiledSelectors,
) -> Option<RawObservation> {
    let root = doc.root_element();
    let signature = first_text(root, &sel.signature)?;

    let example = select_example(root, sel).and_then(|text| parse_example(&row.name, &text));
    let table = parameter_table(root, sel);
    let (example_names, example_return, example_static) = match example {
        Some(ExampleSignature {
            return_type,
            names,
            is_static,
        }) => (names, return_type, is_static),
        None => (Vec::new(), None, false),
    };

    let marked_static = root
        .select(&sel.static_marker)
        .any(|n| text_of(n) == "static")
        || signature.starts_with("static ");

    let description = find_subsection(root, &sel.subsection, &sel.subsection_title, "Description")
        .and_then(|s| first_text(s, &sel.paragraph))
        .unwrap_or_else(|| row.summary.clone());

    Some(RawObservation {
        name: row.name.clone(),
        is_static: marked_static || example_static,
        is_coroutine: COROUTINE_RE.is_match(&text_of(root)),
        return_type: example_return.unwrap_or_else(|| "void".to_string()),
        parameters: resolve(&signature, &row.name, ctx.namespace, &example_names, &table),
        description,
        path: ctx.rel_path.to_string(),
        version: ctx.version.clone(),
    })
}

/// First non-blank code example in selector priority order.
pub fn select_example(root: ElementRef, sel: &CompiledSelectors) -> Option<String> {
    sel.examples.iter().find_map(|s| {
        root.select(s)
            .map(|n| n.text().collect::<String>())
            .find(|t| !t.trim().is_empty())
    })
}

/// Rows of the Parameters table, in document order.
pub fn parameter_table(root: ElementRef, sel: &CompiledSelectors) -> Vec<ParamDoc> {
    let Some(section) = find_subsection(root, &sel.subsection, &sel.subsection_title, "Parameters")
    else {
        return Vec::new();
    };
    section
        .select(&sel.row)
        .filter_map(|tr| {
            let cells: Vec<ElementRef> = tr.select(&sel.cell).collect();
            if cells.is_empty() {
                return None;
            }
            let name = first_text(tr, &sel.param_name)
                .or_else(|| cells.first().map(|c| text_of(*c)))
                .unwrap_or_default();
            let description = first_text(tr, &sel.row_description)
                .or_else(|| cells.iter().skip(1).last().map(|c| text_of(*c)))
                .unwrap_or_default();
            Some(ParamDoc { name, description })
        })
        .collect()
}

// ── Tests ──
