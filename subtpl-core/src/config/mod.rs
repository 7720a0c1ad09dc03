//! Engine configuration
//!
//! - EngineConfig: region catalog, marker vocabulary and document key names
//! - ConfigLoader: builtin defaults layered under an optional user file

pub mod builtin;
pub mod loader;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{CommonConfig, EngineConfig, Marker, MarkerConfig, TemplateConfig};
pub use subtpl_filter::{Region, RegionCatalog};
