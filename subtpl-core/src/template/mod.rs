//! Template-v3 proxy-group expansion
//!
//! A template declares proxy groups with directives (`include-all`,
//! `filter`, markers, ...) instead of literal proxy lists. Processing
//! resolves every group against a live node inventory, removes groups that
//! end up empty along with references to them, and rewrites the document's
//! node inventory to the nodes still in use.

pub mod group;
pub mod inject;
pub mod order;
pub mod processor;
pub mod prune;
pub mod region;
pub mod resolve;
pub mod tree;
pub mod unicode;

pub use group::{GroupSpec, ResolvedGroup};
pub use processor::{process_template, ProcessReport, TemplateProcessor};

/// Policies every client provides without a group definition
pub const BUILTIN_POLICIES: &[&str] = &["DIRECT", "REJECT", "PASS"];

pub(crate) const PROXY_GROUPS_KEY: &str = "proxy-groups";
pub(crate) const ADD_REGION_GROUPS_KEY: &str = "add-region-proxy-groups";

pub fn is_builtin_policy(name: &str) -> bool {
    BUILTIN_POLICIES.contains(&name)
}
