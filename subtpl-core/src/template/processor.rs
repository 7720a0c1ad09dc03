//! Template processing: parse, resolve every group, prune, serialize

use super::group::{GroupSpec, ResolvedGroup};
use super::inject::inject_proxies;
use super::order::{dedup_stable, order_entries};
use super::prune::{prune_empty_groups, strip_dangling};
use super::region::RegionInjector;
use super::resolve::{resolve_candidates, GroupClassifier, NodeIndex};
use super::tree::NodeExt;
use super::unicode::restore_unicode_escapes;
use super::{ADD_REGION_GROUPS_KEY, PROXY_GROUPS_KEY};
use crate::config::{builtin, EngineConfig};
use crate::error::{Result, TemplateError};
use crate::inventory::{ProviderMap, ProxyRecord};
use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};
use std::collections::HashSet;
use subtpl_filter::{FilterEngine, GroupGraphValidator};

/// Summary of what processing changed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessReport {
    /// Region group names made available to the template
    pub region_groups: Vec<String>,
    /// Surviving groups
    pub groups: usize,
    /// Groups removed for having nothing to select, in removal order
    pub pruned_groups: Vec<String>,
    /// `(group, entry)` references to names that do not exist
    pub dangling_refs: Vec<(String, String)>,
    /// Nodes written to the inventory key
    pub emitted_proxies: usize,
    /// Nodes tagged to dial through the relay group
    pub landing_nodes: Vec<String>,
}

/// Resolves a single template document
///
/// Processing consumes the processor: the group-name set, the region guard
/// and the pattern cache belong to one document. Use one processor per
/// template when resolving several concurrently.
pub struct TemplateProcessor<'cfg> {
    config: &'cfg EngineConfig,
}

impl<'cfg> TemplateProcessor<'cfg> {
    pub fn new(config: &'cfg EngineConfig) -> Self {
        Self { config }
    }

    /// Resolve `template` against the node inventory and providers
    ///
    /// Nodes of the landing group are tagged on `proxies` in place.
    pub fn process(
        self,
        template: &str,
        proxies: &mut [ProxyRecord],
        providers: &ProviderMap,
    ) -> Result<String> {
        self.process_with_report(template, proxies, providers)
            .map(|(text, _)| text)
    }

    pub fn process_with_report(
        self,
        template: &str,
        proxies: &mut [ProxyRecord],
        providers: &ProviderMap,
    ) -> Result<(String, ProcessReport)> {
        let mut doc = parse_document(template)?;

        let mut session = Session::new(self.config, proxies);
        session.resolve(&mut doc, proxies, providers);

        let text = serde_yaml::to_string(&Value::Mapping(doc)).map_err(TemplateError::Emit)?;
        Ok((restore_unicode_escapes(&text), session.report))
    }
}

/// Resolve a template with the builtin configuration
pub fn process_template(
    template: &str,
    proxies: &mut [ProxyRecord],
    providers: &ProviderMap,
) -> Result<String> {
    TemplateProcessor::new(builtin::get_builtin()).process(template, proxies, providers)
}

fn parse_document(template: &str) -> Result<Mapping> {
    let value: Value = serde_yaml::from_str(template).map_err(TemplateError::Parse)?;
    match value {
        Value::Mapping(doc) => Ok(doc),
        Value::Null => Ok(Mapping::new()),
        _ => Err(TemplateError::NotAMapping),
    }
}

/// Working state for one document
struct Session<'cfg> {
    config: &'cfg EngineConfig,
    nodes: NodeIndex,
    /// Authoritative set of current group names
    known_groups: HashSet<String>,
    regions: RegionInjector<'cfg>,
    filters: FilterEngine,
    report: ProcessReport,
}

impl<'cfg> Session<'cfg> {
    fn new(config: &'cfg EngineConfig, proxies: &[ProxyRecord]) -> Self {
        Self {
            config,
            nodes: NodeIndex::from_records(proxies),
            known_groups: HashSet::new(),
            regions: RegionInjector::new(&config.regions),
            filters: FilterEngine::new(),
            report: ProcessReport::default(),
        }
    }

    fn resolve(&mut self, doc: &mut Mapping, proxies: &mut [ProxyRecord], providers: &ProviderMap) {
        let config = self.config;

        let add_regions = doc.get_flag(ADD_REGION_GROUPS_KEY);
        doc.delete(ADD_REGION_GROUPS_KEY);

        let had_groups = doc.get_value(PROXY_GROUPS_KEY).is_some();
        let Some(mut nodes) = self.collect_groups(doc) else {
            return;
        };

        let wants_regions = add_regions
            || nodes
                .iter()
                .any(|node| GroupSpec::from_node(node).requests_regions(&config.markers));
        let region_names = if wants_regions {
            self.regions.inject(&mut nodes, &mut self.known_groups)
        } else {
            Vec::new()
        };

        let mut resolved: Vec<ResolvedGroup> = nodes
            .into_iter()
            .map(|node| self.resolve_group(node, &region_names, providers))
            .collect();

        self.report.dangling_refs = strip_dangling(&mut resolved, &self.known_groups, &self.nodes);
        self.report.pruned_groups = prune_empty_groups(&mut resolved, &mut self.known_groups);
        check_cycles(&resolved);

        let outcome = inject_proxies(doc, &resolved, &self.known_groups, proxies, &config.template);

        self.report.region_groups = region_names;
        self.report.groups = resolved.len();
        self.report.emitted_proxies = outcome.emitted;
        self.report.landing_nodes = outcome.landing_nodes;

        if had_groups || !resolved.is_empty() {
            let groups = resolved.into_iter().map(ResolvedGroup::into_value).collect();
            doc.set(PROXY_GROUPS_KEY, Value::Sequence(groups));
        }
    }

    /// Read the template's groups and seed the group-name set
    ///
    /// Returns `None` when `proxy-groups` exists but is not a list; the
    /// document is then left as it is.
    fn collect_groups(&mut self, doc: &Mapping) -> Option<Vec<Mapping>> {
        let items = match doc.get_value(PROXY_GROUPS_KEY) {
            Some(Value::Sequence(items)) => items.clone(),
            Some(Value::Null) | None => Vec::new(),
            Some(_) => {
                tracing::warn!("{} is not a list, leaving template untouched", PROXY_GROUPS_KEY);
                return None;
            }
        };

        let mut groups = Vec::with_capacity(items.len());
        for item in items {
            let Value::Mapping(node) = item else {
                tracing::warn!("Skipping proxy group that is not a mapping");
                continue;
            };
            let Some(name) = node.get_str("name").filter(|n| !n.is_empty()) else {
                tracing::warn!("Skipping proxy group without a name");
                continue;
            };
            if !self.known_groups.insert(name.clone()) {
                tracing::warn!("Duplicate proxy group {}, keeping the first", name);
                continue;
            }
            groups.push(node);
        }

        Some(groups)
    }

    fn resolve_group(
        &mut self,
        node: Mapping,
        region_names: &[String],
        providers: &ProviderMap,
    ) -> ResolvedGroup {
        let spec = GroupSpec::from_node(&node);
        let candidates = resolve_candidates(&spec, &self.nodes, providers);
        let ordered = order_entries(&spec, candidates, region_names, &self.config.markers);

        let classifier = GroupClassifier::new(&self.known_groups, &self.nodes);
        let filtered = self.filters.apply(ordered, &spec.filter_rules(), &classifier);
        let proxies = dedup_stable(filtered);

        tracing::debug!(
            "Resolved group {} ({}): {} entries",
            spec.name,
            spec.kind,
            proxies.len()
        );

        ResolvedGroup {
            name: spec.name,
            node,
            proxies,
        }
    }
}

/// Group loops are rejected by clients; report them without failing
fn check_cycles(groups: &[ResolvedGroup]) {
    let graph: IndexMap<String, Vec<String>> = groups
        .iter()
        .map(|g| (g.name.clone(), g.proxies.clone()))
        .collect();

    if let Err(e) = GroupGraphValidator::check_cycles(&graph) {
        tracing::warn!("{}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use subtpl_filter::{Region, RegionCatalog};

    fn config() -> EngineConfig {
        EngineConfig {
            regions: RegionCatalog {
                entries: vec![Region::new("HK", "港|HK"), Region::new("US", "美国|US")],
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn records() -> Vec<ProxyRecord> {
        vec![
            ProxyRecord::new("🇭🇰 香港 01", "ss"),
            ProxyRecord::new("🇺🇸 美国 01", "vmess"),
            ProxyRecord::new("🇩🇪 德国 01", "trojan"),
        ]
    }

    fn groups(text: &str) -> Vec<(String, Vec<String>)> {
        let doc: Mapping = serde_yaml::from_str(text).unwrap();
        doc.get_value("proxy-groups")
            .and_then(Value::as_sequence)
            .unwrap()
            .iter()
            .map(|g| {
                let g = g.as_mapping().unwrap();
                (g.get_str("name").unwrap(), g.get_list("proxies"))
            })
            .collect()
    }

    #[test]
    fn test_region_flag_injects_groups_and_is_removed() {
        let config = config();
        let mut proxies = records();
        let template = r#"
add-region-proxy-groups: true
proxy-groups:
  - name: Proxy
    type: select
    include-region-proxy-groups: true
"#;
        let (out, report) = TemplateProcessor::new(&config)
            .process_with_report(template, &mut proxies, &ProviderMap::new())
            .unwrap();

        assert!(!out.contains("add-region-proxy-groups"));
        assert_eq!(report.region_groups, vec!["HK", "US", "🌐 其他地区"]);
        assert_eq!(
            groups(&out),
            vec![
                ("HK".to_string(), vec!["🇭🇰 香港 01".to_string()]),
                ("US".to_string(), vec!["🇺🇸 美国 01".to_string()]),
                ("🌐 其他地区".to_string(), vec!["🇩🇪 德国 01".to_string()]),
                (
                    "Proxy".to_string(),
                    vec!["HK".to_string(), "US".to_string(), "🌐 其他地区".to_string()]
                ),
            ]
        );
    }

    #[test]
    fn test_empty_region_group_pruned_from_references() {
        let config = config();
        let mut proxies = vec![ProxyRecord::new("🇭🇰 香港 01", "ss")];
        let template = r#"
proxy-groups:
  - name: Proxy
    type: select
    proxies: [__REGION_PROXY_GROUPS__, DIRECT]
"#;
        let (out, report) = TemplateProcessor::new(&config)
            .process_with_report(template, &mut proxies, &ProviderMap::new())
            .unwrap();

        assert_eq!(report.pruned_groups, vec!["US", "🌐 其他地区"]);
        let groups = groups(&out);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].1, vec!["HK", "DIRECT"]);
    }

    #[test]
    fn test_duplicate_and_malformed_groups_dropped() {
        let config = config();
        let mut proxies = records();
        let template = r#"
proxy-groups:
  - name: A
    type: select
    proxies: [DIRECT]
  - just-a-string
  - type: select
    proxies: [DIRECT]
  - name: A
    type: select
    proxies: [REJECT]
"#;
        let out = TemplateProcessor::new(&config)
            .process(template, &mut proxies, &ProviderMap::new())
            .unwrap();

        assert_eq!(groups(&out), vec![("A".to_string(), vec!["DIRECT".to_string()])]);
    }

    #[test]
    fn test_non_list_groups_left_untouched() {
        let config = config();
        let mut proxies = records();
        let out = TemplateProcessor::new(&config)
            .process("proxy-groups: oops\n", &mut proxies, &ProviderMap::new())
            .unwrap();
        assert_eq!(out, "proxy-groups: oops\n");
    }

    #[test]
    fn test_scalar_root_rejected() {
        let config = config();
        let result =
            TemplateProcessor::new(&config).process("42", &mut records(), &ProviderMap::new());
        assert!(matches!(result, Err(TemplateError::NotAMapping)));
    }

    #[test]
    fn test_malformed_yaml_rejected() {
        let config = config();
        let result = TemplateProcessor::new(&config).process(
            "proxy-groups: [unclosed",
            &mut records(),
            &ProviderMap::new(),
        );
        assert!(matches!(result, Err(TemplateError::Parse(_))));
    }
}
