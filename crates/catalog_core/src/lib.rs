//! Catalog loading and view derivation.
//!
//! [`DatasetLoader`] fetches the listing, fans out one detail request per entry and
//! keeps the records that normalize cleanly. [`project`] filters and sorts a dataset
//! for display. [`CatalogSession`] ties the two together for a front end.

pub mod format;
mod loader;
mod projector;
mod session;

pub use loader::{
    normalize_base_url, normalize_detail, CatalogSource, DatasetLoader, HttpCatalogSource,
    LoadReport, DEFAULT_API_BASE_URL,
};
pub use projector::{compare_names, project, sort_items};
pub use session::{CatalogEvent, CatalogSession, LoadOutcome, LoadStatus};
