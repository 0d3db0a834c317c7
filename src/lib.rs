//! Versioned catalog of an engine's event functions, scraped from its HTML
//! scripting reference.
//!
//! Each documentation root is swept once per release version: type pages with
//! a Messages section are found, every listed message's detail page is read,
//! and the resulting observations are merged into a [`Catalog`] that records
//! the version range over which each callback signature held.

pub mod error;
pub mod export;
pub mod model;
pub mod parser;
pub mod scan;
pub mod settings;
pub mod version;

pub use error::{CatalogError, Result};
pub use model::{ApiType, CallbackEntry, Catalog, Kind, Parameter, RawObservation, Shape, Transition};
pub use scan::{ProgressEvent, ScanSummary, Scanner};
pub use settings::Settings;
pub use version::Version;
