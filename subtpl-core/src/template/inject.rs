//! Rewrite of the top-level node inventory and landing-node tagging

use super::group::ResolvedGroup;
use super::tree::NodeExt;
use super::{is_builtin_policy, PROXY_GROUPS_KEY};
use crate::config::TemplateConfig;
use crate::inventory::ProxyRecord;
use serde_yaml::{Mapping, Value};
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InjectOutcome {
    /// Records written to the inventory key
    pub emitted: usize,
    /// Nodes tagged with the relay hop
    pub landing_nodes: Vec<String>,
}

/// Write the subset of `records` referenced by `groups` into the document
///
/// Records keep inventory order. The inventory key is replaced in place, or
/// created ahead of `proxy-groups` when absent and something is referenced.
/// Landing-group nodes are tagged on the caller's records before copying.
pub fn inject_proxies(
    doc: &mut Mapping,
    groups: &[ResolvedGroup],
    known: &HashSet<String>,
    records: &mut [ProxyRecord],
    names: &TemplateConfig,
) -> InjectOutcome {
    let referenced: HashSet<&str> = groups
        .iter()
        .flat_map(|g| g.proxies.iter())
        .filter(|entry| is_plain_node(entry, known))
        .map(String::as_str)
        .collect();

    let landing_nodes = tag_landing_nodes(groups, known, records, names);

    let mut emitted_names = HashSet::new();
    let subset: Vec<Value> = records
        .iter()
        .filter(|r| referenced.contains(r.name()) && emitted_names.insert(r.name().to_string()))
        .map(ProxyRecord::to_value)
        .collect();
    let emitted = subset.len();

    let key = names.inventory_key.as_str();
    if doc.get_value(key).is_some() {
        doc.set(key, Value::Sequence(subset));
    } else if !subset.is_empty() {
        doc.insert_before(PROXY_GROUPS_KEY, key, Value::Sequence(subset));
    }

    InjectOutcome {
        emitted,
        landing_nodes,
    }
}

fn is_plain_node(entry: &str, known: &HashSet<String>) -> bool {
    !known.contains(entry) && !is_builtin_policy(entry)
}

/// Set the dialer attribute on the nodes the landing group resolved to
///
/// Narrower than tagging every landing node: nothing is tagged unless the
/// relay group also survived pruning, as the attribute must name a group in
/// the output. Nodes the relay group lists directly are left alone. Each of
/// these cases logs one warning.
fn tag_landing_nodes(
    groups: &[ResolvedGroup],
    known: &HashSet<String>,
    records: &mut [ProxyRecord],
    names: &TemplateConfig,
) -> Vec<String> {
    let Some(landing) = groups.iter().find(|g| g.name == names.landing_group) else {
        return Vec::new();
    };
    if names.landing_group == names.relay_group {
        tracing::warn!(
            "Landing and relay group are both {}, nodes left untagged",
            names.landing_group
        );
        return Vec::new();
    }
    let Some(relay) = groups.iter().find(|g| g.name == names.relay_group) else {
        tracing::warn!(
            "Landing group {} has no relay group {}, nodes left untagged",
            names.landing_group,
            names.relay_group
        );
        return Vec::new();
    };

    let (looped, targets): (Vec<&str>, Vec<&str>) = landing
        .proxies
        .iter()
        .filter(|entry| is_plain_node(entry, known))
        .map(String::as_str)
        .partition(|entry| relay.proxies.iter().any(|p| p.as_str() == *entry));
    if !looped.is_empty() {
        tracing::warn!(
            "Nodes in both {} and {} left untagged: {}",
            names.landing_group,
            names.relay_group,
            looped.join(", ")
        );
    }

    let targets: HashSet<&str> = targets.into_iter().collect();
    let mut tagged = Vec::new();
    for record in records.iter_mut() {
        if targets.contains(record.name()) {
            record.set(
                &names.dialer_proxy_key,
                Value::String(names.relay_group.clone()),
            );
            tagged.push(record.name().to_string());
        }
    }

    tagged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::tree::scalar_to_string;

    fn group(name: &str, proxies: &[&str]) -> ResolvedGroup {
        ResolvedGroup {
            name: name.to_string(),
            node: Mapping::new(),
            proxies: proxies.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn records() -> Vec<ProxyRecord> {
        vec![
            ProxyRecord::new("n1", "ss"),
            ProxyRecord::new("n2", "ss"),
            ProxyRecord::new("n3", "vmess"),
        ]
    }

    fn known(groups: &[ResolvedGroup]) -> HashSet<String> {
        groups.iter().map(|g| g.name.clone()).collect()
    }

    fn emitted_names(doc: &Mapping, key: &str) -> Vec<String> {
        doc.get_value(key)
            .and_then(Value::as_sequence)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_mapping().and_then(|m| m.get_str("name")))
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn test_only_referenced_nodes_in_inventory_order() {
        let mut doc: Mapping = serde_yaml::from_str("proxies: []\nproxy-groups: []").unwrap();
        let groups = vec![group("A", &["n3", "DIRECT", "B"]), group("B", &["n1"])];
        let mut records = records();

        let outcome = inject_proxies(
            &mut doc,
            &groups,
            &known(&groups),
            &mut records,
            &TemplateConfig::default(),
        );
        assert_eq!(outcome.emitted, 2);
        assert_eq!(emitted_names(&doc, "proxies"), vec!["n1", "n3"]);
    }

    #[test]
    fn test_inventory_key_created_before_groups() {
        let mut doc: Mapping = serde_yaml::from_str("mode: rule\nproxy-groups: []").unwrap();
        let groups = vec![group("A", &["n2"])];
        let mut records = records();

        inject_proxies(
            &mut doc,
            &groups,
            &known(&groups),
            &mut records,
            &TemplateConfig::default(),
        );
        let keys: Vec<String> = doc.keys().filter_map(scalar_to_string).collect();
        assert_eq!(keys, vec!["mode", "proxies", "proxy-groups"]);
    }

    #[test]
    fn test_absent_key_not_created_when_nothing_referenced() {
        let mut doc: Mapping = serde_yaml::from_str("proxy-groups: []").unwrap();
        let groups = vec![group("A", &["DIRECT"])];
        let mut records = records();

        inject_proxies(
            &mut doc,
            &groups,
            &known(&groups),
            &mut records,
            &TemplateConfig::default(),
        );
        assert!(doc.get_value("proxies").is_none());
    }

    #[test]
    fn test_landing_nodes_tagged_in_place() {
        let names = TemplateConfig::default();
        let mut doc = Mapping::new();
        let groups = vec![
            group(&names.relay_group, &["n1"]),
            group(&names.landing_group, &["n2", "n3", "n1"]),
        ];
        let mut records = records();

        let outcome = inject_proxies(&mut doc, &groups, &known(&groups), &mut records, &names);
        assert_eq!(outcome.landing_nodes, vec!["n2", "n3"]);

        let relay = Value::String(names.relay_group.clone());
        assert_eq!(records[1].get("dialer-proxy"), Some(&relay));
        assert_eq!(records[2].get("dialer-proxy"), Some(&relay));
        assert!(records[0].get("dialer-proxy").is_none());

        let emitted = doc.get_value("proxies").and_then(Value::as_sequence).unwrap();
        let tagged = emitted[1].as_mapping().unwrap();
        assert_eq!(tagged.get_str("dialer-proxy"), Some(names.relay_group.clone()));
    }

    #[test]
    fn test_landing_same_as_relay_is_untagged() {
        let names = TemplateConfig {
            relay_group: "Hop".to_string(),
            landing_group: "Hop".to_string(),
            ..Default::default()
        };
        let mut doc = Mapping::new();
        let groups = vec![group("Hop", &["n1", "n2"])];
        let mut records = records();

        let outcome = inject_proxies(&mut doc, &groups, &known(&groups), &mut records, &names);
        assert!(outcome.landing_nodes.is_empty());
        assert!(records.iter().all(|r| r.get("dialer-proxy").is_none()));
        assert_eq!(outcome.emitted, 2);
    }

    #[test]
    fn test_landing_without_relay_is_untagged() {
        let names = TemplateConfig::default();
        let mut doc = Mapping::new();
        let groups = vec![group(&names.landing_group, &["n2"])];
        let mut records = records();

        let outcome = inject_proxies(&mut doc, &groups, &known(&groups), &mut records, &names);
        assert!(outcome.landing_nodes.is_empty());
        assert!(records[1].get("dialer-proxy").is_none());
    }
}
