//! Cascading removal of empty groups and references to them

use super::group::ResolvedGroup;
use super::is_builtin_policy;
use super::resolve::NodeIndex;
use std::collections::HashSet;

/// Strip entries that name neither a built-in policy, a current group, nor a
/// live node. Returns `(group, entry)` pairs that were removed.
pub fn strip_dangling(
    groups: &mut [ResolvedGroup],
    known: &HashSet<String>,
    nodes: &NodeIndex,
) -> Vec<(String, String)> {
    let mut stripped = Vec::new();

    for group in groups.iter_mut() {
        group.proxies.retain(|entry| {
            let live = is_builtin_policy(entry) || known.contains(entry) || nodes.contains(entry);
            if !live {
                tracing::debug!("Group {} drops unknown reference {}", group.name, entry);
                stripped.push((group.name.clone(), entry.clone()));
            }
            live
        });
    }

    stripped
}

/// Remove groups with no proxies until stable, stripping references to
/// removed groups from the survivors after each pass
///
/// `known` is kept in sync with the surviving group names. Returns the
/// removed names in removal order.
pub fn prune_empty_groups(
    groups: &mut Vec<ResolvedGroup>,
    known: &mut HashSet<String>,
) -> Vec<String> {
    let mut removed_all = Vec::new();

    loop {
        let removed: HashSet<String> = groups
            .iter()
            .filter(|g| g.proxies.is_empty())
            .map(|g| g.name.clone())
            .collect();

        if removed.is_empty() {
            break;
        }

        removed_all.extend(
            groups
                .iter()
                .filter(|g| removed.contains(&g.name))
                .map(|g| g.name.clone()),
        );
        groups.retain(|g| !removed.contains(&g.name));

        for group in groups.iter_mut() {
            group.proxies.retain(|entry| !removed.contains(entry));
        }

        known.retain(|name| !removed.contains(name));
        tracing::debug!("Pruned {} empty groups", removed.len());
    }

    removed_all
}
