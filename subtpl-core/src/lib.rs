//! Core library for proxy-group template expansion
//!
//! Loads the engine configuration, parses node inventories and resolves
//! declarative templates into concrete proxy groups.

pub mod config;
pub mod error;
pub mod inventory;
pub mod template;

pub use config::{ConfigLoader, EngineConfig};
pub use error::{Result, TemplateError};
pub use inventory::{Inventory, ProviderMap, ProxyRecord};
pub use template::{process_template, ProcessReport, TemplateProcessor};
