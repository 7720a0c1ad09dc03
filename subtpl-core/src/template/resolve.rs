//! Candidate resolution of nodes and provider nodes for a group

use super::group::GroupSpec;
use super::is_builtin_policy;
use super::order::dedup_stable;
use crate::inventory::{ProviderMap, ProxyRecord};
use std::collections::{HashMap, HashSet};
use subtpl_filter::EntryClassifier;

/// Name and type lookup over the live inventory, in inventory order
#[derive(Debug, Clone, Default)]
pub struct NodeIndex {
    order: Vec<String>,
    types: HashMap<String, String>,
}

impl NodeIndex {
    pub fn from_records(records: &[ProxyRecord]) -> Self {
        let mut order = Vec::with_capacity(records.len());
        let mut types = HashMap::with_capacity(records.len());
        for record in records {
            if types.contains_key(record.name()) {
                tracing::debug!("Duplicate proxy name in inventory: {}", record.name());
                continue;
            }
            order.push(record.name().to_string());
            types.insert(record.name().to_string(), record.kind().to_string());
        }
        Self { order, types }
    }

    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn node_type(&self, name: &str) -> Option<&str> {
        self.types.get(name).map(String::as_str)
    }
}

/// Classifies entries against the current group set and the inventory
pub struct GroupClassifier<'a> {
    groups: &'a HashSet<String>,
    nodes: &'a NodeIndex,
}

impl<'a> GroupClassifier<'a> {
    pub fn new(groups: &'a HashSet<String>, nodes: &'a NodeIndex) -> Self {
        Self { groups, nodes }
    }
}

impl EntryClassifier for GroupClassifier<'_> {
    fn is_group(&self, name: &str) -> bool {
        self.groups.contains(name) || is_builtin_policy(name)
    }

    fn node_type(&self, name: &str) -> Option<&str> {
        self.nodes.node_type(name)
    }
}

/// Nodes and provider nodes a group's directives pull in
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidates {
    pub nodes: Vec<String>,
    pub providers: Vec<String>,
}

/// Compute the candidate lists implied by a group's include directives
pub fn resolve_candidates(
    spec: &GroupSpec,
    nodes: &NodeIndex,
    providers: &ProviderMap,
) -> Candidates {
    Candidates {
        nodes: resolve_nodes(spec, nodes),
        providers: resolve_providers(spec, providers),
    }
}

fn resolve_nodes(spec: &GroupSpec, nodes: &NodeIndex) -> Vec<String> {
    if spec.include_all || spec.include_all_proxies {
        return nodes.names().to_vec();
    }

    let include_types = spec.include_types();
    if !include_types.is_empty() {
        return nodes
            .names()
            .iter()
            .filter(|name| {
                nodes
                    .node_type(name)
                    .is_some_and(|kind| include_types.iter().any(|t| t == kind))
            })
            .cloned()
            .collect();
    }

    // A group that only carries filters means "filter over every node";
    // provider directives do not change that
    if !spec.filter.is_empty() || !spec.exclude_filter.is_empty() {
        return nodes.names().to_vec();
    }

    Vec::new()
}

fn resolve_providers(spec: &GroupSpec, providers: &ProviderMap) -> Vec<String> {
    let selected: Vec<String> = if spec.include_all || spec.include_all_providers {
        providers.values().flatten().cloned().collect()
    } else {
        spec.uses
            .iter()
            .flat_map(|name| match providers.get(name) {
                Some(list) => list.clone(),
                None => {
                    tracing::debug!("Group {} uses unknown provider {}", spec.name, name);
                    Vec::new()
                }
            })
            .collect()
    };

    dedup_stable(selected)
}
