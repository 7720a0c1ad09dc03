//! Region catalog data and validation

pub mod schema;
pub mod validator;

pub use schema::{Region, RegionCatalog};
pub use validator::{CatalogValidator, GroupGraphValidator};
