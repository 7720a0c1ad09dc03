//! Catalog validation and cycle detection over group references

use super::schema::RegionCatalog;
use crate::error::{Result, ValidationError};
use crate::filter::matcher::{compile_pattern, split_alternatives};
use indexmap::IndexMap;
use std::collections::HashSet;

pub struct CatalogValidator;

impl CatalogValidator {
    /// Validate a region catalog: names present and unique, filters compile
    pub fn validate(catalog: &RegionCatalog) -> Result<()> {
        Self::validate_names(catalog)?;
        Self::validate_patterns(catalog)?;
        Ok(())
    }

    fn validate_names(catalog: &RegionCatalog) -> Result<()> {
        let mut seen = HashSet::new();

        for (index, region) in catalog.entries.iter().enumerate() {
            if region.name.trim().is_empty() {
                return Err(ValidationError::EmptyRegionName { index }.into());
            }
            if !seen.insert(region.name.as_str()) {
                return Err(ValidationError::DuplicateRegion {
                    name: region.name.clone(),
                }
                .into());
            }
        }

        if catalog.other_name.trim().is_empty() {
            return Err(ValidationError::EmptyRegionName {
                index: catalog.entries.len(),
            }
            .into());
        }
        if seen.contains(catalog.other_name.as_str()) {
            return Err(ValidationError::DuplicateRegion {
                name: catalog.other_name.clone(),
            }
            .into());
        }

        Ok(())
    }

    /// Catalog filters are trusted data, so a bad alternative is an error
    /// here rather than a silently skipped pattern
    fn validate_patterns(catalog: &RegionCatalog) -> Result<()> {
        for region in &catalog.entries {
            for alt in split_alternatives(&region.filter) {
                if compile_pattern(alt).is_err() {
                    return Err(ValidationError::InvalidPattern {
                        region: region.name.clone(),
                        pattern: alt.to_string(),
                    }
                    .into());
                }
            }
        }

        Ok(())
    }
}

/// Cycle detection over a group -> referenced names graph
///
/// Names that are not keys of the graph (nodes, built-ins) are leaves.
pub struct GroupGraphValidator;

impl GroupGraphValidator {
    /// Check for cycles in group references using DFS
    pub fn check_cycles(groups: &IndexMap<String, Vec<String>>) -> Result<()> {
        let mut visited = HashSet::new();
        for group_name in groups.keys() {
            let mut path = Vec::new();
            Self::dfs_cycle_check(group_name, groups, &mut visited, &mut path)?;
        }
        Ok(())
    }

    fn dfs_cycle_check(
        group_name: &str,
        groups: &IndexMap<String, Vec<String>>,
        visited: &mut HashSet<String>,
        path: &mut Vec<String>,
    ) -> Result<()> {
        // If this group is in the current path, we found a cycle
        if path.iter().any(|p| p == group_name) {
            path.push(group_name.to_string());
            return Err(ValidationError::CycleDetected {
                path: path.join(" -> "),
            }
            .into());
        }

        // If already fully processed, skip
        if visited.contains(group_name) {
            return Ok(());
        }

        path.push(group_name.to_string());

        if let Some(children) = groups.get(group_name) {
            for child in children {
                if groups.contains_key(child) {
                    Self::dfs_cycle_check(child, groups, visited, path)?;
                }
            }
        }

        path.pop();
        visited.insert(group_name.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::Region;
    use crate::error::FilterError;

    fn graph(edges: Vec<(&str, Vec<&str>)>) -> IndexMap<String, Vec<String>> {
        edges
            .into_iter()
            .map(|(name, refs)| {
                (
                    name.to_string(),
                    refs.into_iter().map(String::from).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_no_cycle() {
        let groups = graph(vec![("a", vec!["b", "node-1"]), ("b", vec!["DIRECT"])]);
        assert!(GroupGraphValidator::check_cycles(&groups).is_ok());
    }

    #[test]
    fn test_shared_child_is_not_a_cycle() {
        let groups = graph(vec![("a", vec!["c"]), ("b", vec!["c"]), ("c", vec![])]);
        assert!(GroupGraphValidator::check_cycles(&groups).is_ok());
    }

    #[test]
    fn test_detect_cycle() {
        let groups = graph(vec![("a", vec!["b"]), ("b", vec!["a"])]);
        let err = GroupGraphValidator::check_cycles(&groups).unwrap_err();
        match err {
            FilterError::Validation(ValidationError::CycleDetected { path }) => {
                assert_eq!(path, "a -> b -> a");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_catalog_rejects_bad_pattern() {
        let catalog = RegionCatalog {
            entries: vec![Region::new("HK", "HK`([x")],
            ..Default::default()
        };
        assert!(CatalogValidator::validate(&catalog).is_err());
    }

    #[test]
    fn test_catalog_rejects_duplicates() {
        let catalog = RegionCatalog {
            entries: vec![Region::new("HK", "HK"), Region::new("HK", "港")],
            ..Default::default()
        };
        assert!(CatalogValidator::validate(&catalog).is_err());

        let catalog = RegionCatalog {
            other_name: "HK".to_string(),
            entries: vec![Region::new("HK", "HK")],
            ..Default::default()
        };
        assert!(CatalogValidator::validate(&catalog).is_err());
    }

    #[test]
    fn test_catalog_accepts_valid() {
        let catalog = RegionCatalog {
            entries: vec![Region::new("HK", "港|HK`(?i)hong kong")],
            ..Default::default()
        };
        assert!(CatalogValidator::validate(&catalog).is_ok());
    }
}
