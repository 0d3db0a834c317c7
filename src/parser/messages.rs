use std::path::{Path, PathBuf};

use scraper::ElementRef;
use tracing::debug;

use super::{first_text, text_of};
use crate::settings::CompiledSelectors;

/// A row of a type page's Messages table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRow {
    pub name: String,
    pub href: String,
    pub summary: String,
}

/// A message row whose detail page exists on disk.
#[derive(Debug, Clone)]
pub struct ResolvedRow {
    pub row: MessageRow,
    pub detail_path: PathBuf,
}

/// Lazily yield the usable rows of a Messages section. Rows without a link
/// or with an empty target are dropped.
pub fn rows<'a>(
    section: ElementRef<'a>,
    sel: &'a CompiledSelectors,
) -> impl Iterator<Item = MessageRow> + 'a {
    section.select(&sel.row).filter_map(move |tr| {
        let Some(link) = tr.select(&sel.row_link).next() else {
            debug!("message row without link: {:?}", text_of(tr));
            return None;
        };
        let name = text_of(link);
        let href = link
            .value()
            .attr("href")
            .map(strip_fragment)
            .unwrap_or_default();
        if name.is_empty() || href.is_empty() {
            debug!("message row without usable link: {:?}", text_of(tr));
            return None;
        }
        let summary = first_text(tr, &sel.row_description)
            .or_else(|| tr.select(&sel.cell).last().map(text_of))
            .unwrap_or_default();
        Some(MessageRow {
            name,
            href: href.to_string(),
            summary,
        })
    })
}

/// Resolve a row against the directory of the page that listed it. Rows
/// whose detail file is missing are dropped.
pub fn resolve(base_dir: &Path, row: MessageRow) -> Option<ResolvedRow> {
    let detail_path = base_dir.join(&row.href);
    if !detail_path.is_file() {
        debug!("detail page {} for {} does not exist", detail_path.display(), row.name);
        return None;
    }
    Some(ResolvedRow { row, detail_path })
}

fn strip_fragment(href: &str) -> &str {
    let end = href.find(['#', '?']).unwrap_or(href.len());
    href[..end].trim()
}

// ── Tests ──
