//! Region catalog schema types

use serde::{Deserialize, Serialize};

/// A named geographic grouping defined by a node-name regex
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Region {
    pub name: String,
    /// Backtick-separated regex alternatives matched against node names
    pub filter: String,
}

impl Region {
    pub fn new(name: impl Into<String>, filter: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filter: filter.into(),
        }
    }
}

/// Ordered list of regions plus the scheduling metadata stamped on the
/// synthetic groups generated from it
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RegionCatalog {
    /// Name of the implicit group collecting nodes no region claims
    #[serde(default = "default_other_name")]
    pub other_name: String,
    #[serde(default = "default_group_type")]
    pub group_type: String,
    #[serde(default = "default_test_url")]
    pub url: String,
    #[serde(default = "default_interval")]
    pub interval: u64,
    #[serde(default = "default_tolerance")]
    pub tolerance: u64,
    #[serde(default)]
    pub entries: Vec<Region>,
}

fn default_other_name() -> String {
    "🌐 其他地区".to_string()
}

fn default_group_type() -> String {
    "url-test".to_string()
}

fn default_test_url() -> String {
    "https://www.gstatic.com/generate_204".to_string()
}

fn default_interval() -> u64 {
    300
}

fn default_tolerance() -> u64 {
    50
}

impl Default for RegionCatalog {
    fn default() -> Self {
        Self {
            other_name: default_other_name(),
            group_type: default_group_type(),
            url: default_test_url(),
            interval: default_interval(),
            tolerance: default_tolerance(),
            entries: Vec::new(),
        }
    }
}

impl RegionCatalog {
    /// Exclusion filter for the "other regions" group: every alternative of
    /// every region, so a node matching any region is rejected
    pub fn catch_all_filter(&self) -> String {
        self.entries
            .iter()
            .map(|r| r.filter.as_str())
            .filter(|f| !f.is_empty())
            .collect::<Vec<_>>()
            .join("`")
    }

    /// Names of all synthetic groups, catalog order first, catch-all last
    pub fn group_names(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|r| r.name.clone())
            .chain(std::iter::once(self.other_name.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> RegionCatalog {
        RegionCatalog {
            entries: vec![
                Region::new("🇭🇰 香港节点", "港|HK"),
                Region::new("🇯🇵 日本节点", "日本|JP`(?i)tokyo"),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_catch_all_joins_every_alternative() {
        assert_eq!(catalog().catch_all_filter(), "港|HK`日本|JP`(?i)tokyo");
    }

    #[test]
    fn test_group_names_end_with_other() {
        let names = catalog().group_names();
        assert_eq!(names, vec!["🇭🇰 香港节点", "🇯🇵 日本节点", "🌐 其他地区"]);
    }

    #[test]
    fn test_empty_catalog_has_only_other() {
        let catalog = RegionCatalog::default();
        assert_eq!(catalog.catch_all_filter(), "");
        assert_eq!(catalog.group_names(), vec!["🌐 其他地区"]);
    }
}
