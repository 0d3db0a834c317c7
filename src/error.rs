use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

/// Failures surfaced to the caller. Missing or malformed documentation
/// fragments are never errors; extraction skips them.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("documentation root {path:?} is not a readable directory: {source}")]
    InputRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid version {0:?}")]
    InvalidVersion(String),

    #[error("callback {callback}: version {incoming} is older than already merged {latest}")]
    VersionOrder {
        callback: String,
        latest: String,
        incoming: String,
    },

    #[error("invalid selector {css:?}: {message}")]
    Selector { css: String, message: String },

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Xml(#[from] quick_xml::Error),
}
