//! Group specification extracted from a template group node

use super::tree::{to_sequence, NodeExt};
use crate::config::MarkerConfig;
use serde_yaml::{Mapping, Value};
use subtpl_filter::filter::parse_type_list;
use subtpl_filter::FilterRules;

/// Per-group directive keys consumed by the engine and removed on output
pub const DIRECTIVE_KEYS: &[&str] = &[
    "use",
    "include-all",
    "include-type",
    "include-all-proxies",
    "include-all-providers",
    "include-region-proxy-groups",
    "filter",
    "exclude-filter",
    "exclude-type",
];

/// Structured view of one template group
///
/// Keys not modelled here stay on the tree node and are written back as-is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupSpec {
    pub name: String,
    pub kind: String,
    /// Literal `proxies` entries, markers included
    pub static_proxies: Vec<String>,
    pub include_all: bool,
    pub include_all_proxies: bool,
    pub include_all_providers: bool,
    pub include_region_groups: bool,
    /// Pipe-separated type allow list
    pub include_type: String,
    /// Pipe-separated type deny list
    pub exclude_type: String,
    /// Providers named by `use`
    pub uses: Vec<String>,
    pub filter: String,
    pub exclude_filter: String,
    pub url: String,
    pub interval: u64,
    pub tolerance: u64,
}

impl GroupSpec {
    pub fn from_node(node: &Mapping) -> Self {
        Self {
            name: node.get_str("name").unwrap_or_default(),
            kind: node.get_str("type").unwrap_or_default(),
            static_proxies: node.get_list("proxies"),
            include_all: node.get_flag("include-all"),
            include_all_proxies: node.get_flag("include-all-proxies"),
            include_all_providers: node.get_flag("include-all-providers"),
            include_region_groups: node.get_flag("include-region-proxy-groups"),
            include_type: node.get_str("include-type").unwrap_or_default(),
            exclude_type: node.get_str("exclude-type").unwrap_or_default(),
            uses: node.get_list("use"),
            filter: node.get_str("filter").unwrap_or_default(),
            exclude_filter: node.get_str("exclude-filter").unwrap_or_default(),
            url: node.get_str("url").unwrap_or_default(),
            interval: node.get_int("interval"),
            tolerance: node.get_int("tolerance"),
        }
    }

    pub fn include_types(&self) -> Vec<String> {
        parse_type_list(&self.include_type)
    }

    pub fn filter_rules(&self) -> FilterRules {
        FilterRules {
            filter: self.filter.clone(),
            exclude_filter: self.exclude_filter.clone(),
            exclude_types: parse_type_list(&self.exclude_type),
        }
    }

    pub fn has_markers(&self, markers: &MarkerConfig) -> bool {
        self.static_proxies
            .iter()
            .any(|entry| markers.parse(entry).is_some())
    }

    /// Whether this group needs the synthetic region groups to exist
    pub fn requests_regions(&self, markers: &MarkerConfig) -> bool {
        self.include_region_groups
            || self
                .static_proxies
                .iter()
                .any(|entry| *entry == markers.region_groups)
    }
}

/// A group after resolution: its tree node plus the final proxy list
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedGroup {
    pub name: String,
    pub node: Mapping,
    pub proxies: Vec<String>,
}

impl ResolvedGroup {
    /// Write the resolved list back and drop directive keys
    pub fn into_value(mut self) -> Value {
        let proxies = to_sequence(&self.proxies);
        if self.node.get_value("proxies").is_some() {
            self.node.set("proxies", proxies);
        } else if self.node.get_value("type").is_some() {
            self.node.insert_after("type", "proxies", proxies);
        } else {
            self.node.insert_after("name", "proxies", proxies);
        }

        for key in DIRECTIVE_KEYS {
            self.node.delete(key);
        }

        Value::Mapping(self.node)
    }
}
