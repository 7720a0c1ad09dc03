//! Name filtering and region catalogs for proxy-group templates

pub mod config;
pub mod error;
pub mod filter;

// Re-export commonly used types
pub use config::{CatalogValidator, GroupGraphValidator, Region, RegionCatalog};
pub use error::{FilterError, Result, ValidationError};
pub use filter::{EntryClassifier, EntryRef, FilterEngine, FilterRules, PatternCache};
