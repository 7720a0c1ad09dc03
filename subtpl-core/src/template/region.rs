//! Injection of synthetic region groups

use super::tree::NodeExt;
use serde_yaml::{Mapping, Value};
use std::collections::HashSet;
use subtpl_filter::RegionCatalog;

/// Prepends one group per catalog region plus a catch-all group
///
/// Runs at most once; later calls only report the region names.
#[derive(Debug)]
pub struct RegionInjector<'a> {
    catalog: &'a RegionCatalog,
    injected: bool,
}

impl<'a> RegionInjector<'a> {
    pub fn new(catalog: &'a RegionCatalog) -> Self {
        Self {
            catalog,
            injected: false,
        }
    }

    pub fn is_injected(&self) -> bool {
        self.injected
    }

    /// Prepend region groups to `groups` and register their names in
    /// `known`. Returns every region group name, in catalog order.
    ///
    /// A template group that already uses a region's name takes precedence
    /// and no synthetic group is generated for it.
    pub fn inject(
        &mut self,
        groups: &mut Vec<Mapping>,
        known: &mut HashSet<String>,
    ) -> Vec<String> {
        let names = self.catalog.group_names();
        if self.injected {
            return names;
        }
        self.injected = true;

        let mut synthetic = Vec::with_capacity(names.len());
        for region in &self.catalog.entries {
            if known.contains(&region.name) {
                tracing::debug!("Template already defines region group {}", region.name);
                continue;
            }
            synthetic.push(self.group_node(&region.name, "filter", &region.filter));
        }

        if known.contains(&self.catalog.other_name) {
            tracing::debug!("Template already defines region group {}", self.catalog.other_name);
        } else {
            let catch_all = self.catalog.catch_all_filter();
            synthetic.push(self.group_node(&self.catalog.other_name, "exclude-filter", &catch_all));
        }

        tracing::debug!("Injecting {} region groups", synthetic.len());
        known.extend(names.iter().cloned());
        groups.splice(0..0, synthetic);
        names
    }

    fn group_node(&self, name: &str, filter_key: &str, filter: &str) -> Mapping {
        let mut node = Mapping::new();
        node.set("name", Value::String(name.to_string()));
        node.set("type", Value::String(self.catalog.group_type.clone()));
        node.set("url", Value::String(self.catalog.url.clone()));
        node.set("interval", Value::from(self.catalog.interval));
        node.set("tolerance", Value::from(self.catalog.tolerance));
        node.set("include-all-proxies", Value::Bool(true));
        if !filter.is_empty() {
            node.set(filter_key, Value::String(filter.to_string()));
        }
        node
    }
}
