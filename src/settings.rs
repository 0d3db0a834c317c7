use std::path::{Path, PathBuf};

use scraper::Selector;
use serde::Deserialize;

use crate::error::{CatalogError, Result};

const ENV_PREFIX: &str = "API_CATALOG";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory under each documentation root that holds the reference pages.
    pub reference_subpath: PathBuf,
    /// Pages extracted in parallel before their results are merged.
    pub chunk_size: usize,
    pub selectors: Selectors,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            reference_subpath: PathBuf::from("ScriptReference"),
            chunk_size: 64,
            selectors: Selectors::default(),
        }
    }
}

/// CSS paths for every fragment the extractors read.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub type_heading: String,
    pub type_subtitle: String,
    pub subsection: String,
    pub subsection_title: String,
    pub row: String,
    pub row_link: String,
    pub row_description: String,
    pub cell: String,
    pub param_name: String,
    pub signature: String,
    pub static_marker: String,
    pub paragraph: String,
    /// Code example selectors in priority order.
    pub examples: Vec<String>,
}

impl Default for Selectors {
    fn default() -> Self {
        Selectors {
            type_heading: "h1".into(),
            type_subtitle: "p".into(),
            subsection: "div.subsection".into(),
            subsection_title: "h2, h3".into(),
            row: "tr".into(),
            row_link: "a".into(),
            row_description: "td.desc".into(),
            cell: "td".into(),
            param_name: "td.name".into(),
            signature: "h1".into(),
            static_marker: "div.signature-CS span.sig-kw, span.static".into(),
            paragraph: "p".into(),
            examples: vec![
                "pre.codeExampleCS".into(),
                "pre.codeExampleJS".into(),
                "pre.codeExampleRaw".into(),
            ],
        }
    }
}

impl Settings {
    /// Defaults, then an optional config file, then `API_CATALOG_*` environment
    /// variables (`__` separates nested keys).
    pub fn load(file: Option<&Path>) -> Result<Settings> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("selectors.examples")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}

#[derive(Debug)]
pub struct CompiledSelectors {
    pub type_heading: Selector,
    pub type_subtitle: Selector,
    pub subsection: Selector,
    pub subsection_title: Selector,
    pub row: Selector,
    pub row_link: Selector,
    pub row_description: Selector,
    pub cell: Selector,
    pub param_name: Selector,
    pub signature: Selector,
    pub static_marker: Selector,
    pub paragraph: Selector,
    pub examples: Vec<Selector>,
}

impl Selectors {
    pub fn compile(&self) -> Result<CompiledSelectors> {
        Ok(CompiledSelectors {
            type_heading: parse(&self.type_heading)?,
            type_subtitle: parse(&self.type_subtitle)?,
            subsection: parse(&self.subsection)?,
            subsection_title: parse(&self.subsection_title)?,
            row: parse(&self.row)?,
            row_link: parse(&self.row_link)?,
            row_description: parse(&self.row_description)?,
            cell: parse(&self.cell)?,
            param_name: parse(&self.param_name)?,
            signature: parse(&self.signature)?,
            static_marker: parse(&self.static_marker)?,
            paragraph: parse(&self.paragraph)?,
            examples: self
                .examples
                .iter()
                .map(|css| parse(css))
                .collect::<Result<Vec<_>>>()?,
        })
    }
}

fn parse(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| CatalogError::Selector {
        css: css.to_string(),
        message: e.to_string(),
    })
}

// ── Tests ──
