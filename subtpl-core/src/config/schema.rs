//! Engine configuration schema types

use serde::{Deserialize, Serialize};
use subtpl_filter::RegionCatalog;

/// Complete engine configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub template: TemplateConfig,
    #[serde(default)]
    pub markers: MarkerConfig,
    #[serde(default)]
    pub regions: RegionCatalog,
}

/// Common settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CommonConfig {
    #[serde(default = "default_config_version")]
    pub config_version: String,
    #[serde(default)]
    pub verbose: bool,
}

fn default_config_version() -> String {
    "1.0".to_string()
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            verbose: false,
        }
    }
}

/// Names the engine reads from and writes into the document
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TemplateConfig {
    /// Top-level key holding the node inventory
    #[serde(default = "default_inventory_key")]
    pub inventory_key: String,
    /// Group whose nodes are forced through the relay group
    #[serde(default = "default_landing_group")]
    pub landing_group: String,
    #[serde(default = "default_relay_group")]
    pub relay_group: String,
    /// Node attribute naming the upstream hop
    #[serde(default = "default_dialer_proxy_key")]
    pub dialer_proxy_key: String,
}

fn default_inventory_key() -> String {
    "proxies".to_string()
}

fn default_landing_group() -> String {
    "🛬 落地节点".to_string()
}

fn default_relay_group() -> String {
    "🛫 中转节点".to_string()
}

fn default_dialer_proxy_key() -> String {
    "dialer-proxy".to_string()
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            inventory_key: default_inventory_key(),
            landing_group: default_landing_group(),
            relay_group: default_relay_group(),
            dialer_proxy_key: default_dialer_proxy_key(),
        }
    }
}

/// Placeholder tokens expanded in place inside a group's `proxies`
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MarkerConfig {
    #[serde(default = "default_proxy_nodes_marker")]
    pub proxy_nodes: String,
    #[serde(default = "default_proxy_providers_marker")]
    pub proxy_providers: String,
    #[serde(default = "default_region_groups_marker")]
    pub region_groups: String,
}

fn default_proxy_nodes_marker() -> String {
    "__PROXY_NODES__".to_string()
}

fn default_proxy_providers_marker() -> String {
    "__PROXY_PROVIDERS__".to_string()
}

fn default_region_groups_marker() -> String {
    "__REGION_PROXY_GROUPS__".to_string()
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            proxy_nodes: default_proxy_nodes_marker(),
            proxy_providers: default_proxy_providers_marker(),
            region_groups: default_region_groups_marker(),
        }
    }
}

/// Which computed list a marker stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    ProxyNodes,
    ProxyProviders,
    RegionGroups,
}

impl MarkerConfig {
    pub fn parse(&self, entry: &str) -> Option<Marker> {
        if entry == self.proxy_nodes {
            Some(Marker::ProxyNodes)
        } else if entry == self.proxy_providers {
            Some(Marker::ProxyProviders)
        } else if entry == self.region_groups {
            Some(Marker::RegionGroups)
        } else {
            None
        }
    }
}
