use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{CatalogError, Result};
use crate::model::{Catalog, RawObservation};
use crate::parser::detail::{self, DetailContext};
use crate::parser::load_document;
use crate::parser::messages::{resolve, rows};
use crate::parser::page::{extract_type, TypeHeader};
use crate::settings::{CompiledSelectors, Settings};
use crate::version::Version;

/// Fired once per processed page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub completed: usize,
    pub total: usize,
}

/// Counts for one version sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    pub version: Version,
    pub pages: usize,
    pub type_pages: usize,
    pub observations: usize,
    pub conflicts: usize,
}

/// Everything one type page contributes, computed before any merge.
#[derive(Debug, Clone)]
pub struct PageResult {
    pub header: TypeHeader,
    pub path: String,
    pub observations: Vec<RawObservation>,
}

pub struct Scanner {
    settings: Settings,
    selectors: CompiledSelectors,
}

impl Scanner {
    pub fn new(settings: Settings) -> Result<Self> {
        let selectors = settings.selectors.compile()?;
        Ok(Scanner {
            settings,
            selectors,
        })
    }

    pub fn selectors(&self) -> &CompiledSelectors {
        &self.selectors
    }

    pub fn reference_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.settings.reference_subpath)
    }

    /// Sweep every root in version order.
    pub fn scan_all<F>(
        &self,
        catalog: &mut Catalog,
        mut roots: Vec<(Version, PathBuf)>,
        mut on_progress: F,
    ) -> Result<Vec<ScanSummary>>
    where
        F: FnMut(&Version, ProgressEvent),
    {
        roots.sort_by(|a, b| a.0.cmp(&b.0));
        let mut summaries = Vec::with_capacity(roots.len());
        for (version, root) in &roots {
            let summary = self.scan(catalog, root, version, |ev| on_progress(version, ev))?;
            summaries.push(summary);
        }
        Ok(summaries)
    }

    /// Extract every reference page under `root` for `version` and merge the
    /// results into `catalog`. Pages are extracted in parallel chunks; merges
    /// happen here, one page at a time, in page order.
    pub fn scan<F>(
        &self,
        catalog: &mut Catalog,
        root: &Path,
        version: &Version,
        mut on_progress: F,
    ) -> Result<ScanSummary>
    where
        F: FnMut(ProgressEvent),
    {
        let dir = self.reference_dir(root);
        let pages = list_pages(&dir)?;
        let total = pages.len();
        info!("Scanning {} pages for {} in {}", total, version, dir.display());

        let mut summary = ScanSummary {
            version: version.clone(),
            pages: total,
            type_pages: 0,
            observations: 0,
            conflicts: 0,
        };
        let mut completed = 0;

        for chunk in pages.chunks(self.settings.chunk_size.max(1)) {
            let results: Vec<Option<PageResult>> = chunk
                .par_iter()
                .map(|page| self.extract_page(&dir, page, version))
                .collect();

            for page in results.into_iter().flatten() {
                merge_page(catalog, &page, version, &mut summary);
            }
            for _ in chunk {
                completed += 1;
                on_progress(ProgressEvent { completed, total });
            }
        }

        info!(
            "{}: {} pages, {} type pages, {} callbacks, {} conflicts",
            version, summary.pages, summary.type_pages, summary.observations, summary.conflicts
        );
        Ok(summary)
    }

    /// Everything one page contributes, or `None` when it is not a type page
    /// with at least one usable callback.
    pub fn extract_page(&self, dir: &Path, page: &Path, version: &Version) -> Option<PageResult> {
        let doc = load_document(page)?;
        let (header, messages) = extract_type(&doc, &self.selectors)?;
        let base = page.parent().unwrap_or(dir);

        let observations: Vec<RawObservation> = rows(messages, &self.selectors)
            .filter_map(|row| resolve(base, row))
            .filter_map(|resolved| {
                let rel_path = relative(dir, &resolved.detail_path);
                let ctx = DetailContext {
                    namespace: &header.namespace,
                    version,
                    rel_path: &rel_path,
                };
                detail::extract(&resolved.row, &resolved.detail_path, ctx, &self.selectors)
            })
            .collect();

        if observations.is_empty() {
            debug!("{}: no usable messages", page.display());
            return None;
        }

        Some(PageResult {
            header,
            path: relative(dir, page),
            observations,
        })
    }
}

fn merge_page(catalog: &mut Catalog, page: &PageResult, version: &Version, summary: &mut ScanSummary) {
    let header = &page.header;
    let ty = catalog.add_type(&header.namespace, &header.name, header.kind, &page.path, version);
    summary.type_pages += 1;
    for obs in &page.observations {
        match ty.merge_event_function(obs, version) {
            Ok(_) => summary.observations += 1,
            Err(e) => {
                warn!("{}: {}", page.path, e);
                summary.conflicts += 1;
            }
        }
    }
}

/// Reference pages directly under `dir`, sorted by file name.
pub fn list_pages(dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::read_dir(dir).map_err(|source| CatalogError::InputRoot {
        path: dir.to_path_buf(),
        source,
    })?;

    let pages = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                debug!("skipping unreadable entry: {}", err);
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("html"))
        })
        .collect();
    Ok(pages)
}

/// `path` relative to `base` with forward slashes; falls back to the full path.
fn relative(base: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(base).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

// ── Tests ──
