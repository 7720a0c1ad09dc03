//! Ordering of a group's working list and stable de-duplication

use super::group::GroupSpec;
use super::resolve::Candidates;
use crate::config::{Marker, MarkerConfig};
use std::collections::HashSet;

/// Merge static entries, resolved candidates and region names into the
/// pre-filter working list
///
/// When the static list carries markers, each marker is replaced in place by
/// the list it names. Otherwise the order is region groups (if requested),
/// static entries, nodes, provider nodes.
pub fn order_entries(
    spec: &GroupSpec,
    candidates: Candidates,
    region_names: &[String],
    markers: &MarkerConfig,
) -> Vec<String> {
    let Candidates { nodes, providers } = candidates;

    if spec.has_markers(markers) {
        let mut out = Vec::new();
        for entry in &spec.static_proxies {
            match markers.parse(entry) {
                Some(Marker::ProxyNodes) => out.extend(nodes.iter().cloned()),
                Some(Marker::ProxyProviders) => out.extend(providers.iter().cloned()),
                Some(Marker::RegionGroups) => out.extend(region_names.iter().cloned()),
                None => out.push(entry.clone()),
            }
        }
        return out;
    }

    let mut out = Vec::new();
    if spec.include_region_groups {
        out.extend(region_names.iter().cloned());
    }
    out.extend(spec.static_proxies.iter().cloned());
    out.extend(nodes);
    out.extend(providers);
    out
}

/// Drop repeated entries, keeping the first occurrence
pub fn dedup_stable(entries: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(entries.len());
    entries
        .into_iter()
        .filter(|entry| seen.insert(entry.clone()))
        .collect()
}
