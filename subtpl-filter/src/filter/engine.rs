//! Filter engine applying name and type rules to a group's working list

use super::classifier::{EntryClassifier, EntryRef};
use super::matcher::{split_alternatives, PatternCache};
use regex::Regex;

/// Filtering directives of one group
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterRules {
    /// Backtick-separated inclusion alternatives
    pub filter: String,
    /// Backtick-separated exclusion alternatives
    pub exclude_filter: String,
    /// Lowercased node types to drop
    pub exclude_types: Vec<String>,
}

impl FilterRules {
    pub fn is_empty(&self) -> bool {
        split_alternatives(&self.filter).next().is_none()
            && split_alternatives(&self.exclude_filter).next().is_none()
            && self.exclude_types.is_empty()
    }
}

/// Applies [`FilterRules`] in a fixed order: inclusion, exclusion, type exclusion
///
/// Owns the pattern cache, so one engine should serve every group of a
/// document to avoid recompiling shared region filters.
#[derive(Debug, Default)]
pub struct FilterEngine {
    cache: PatternCache,
}

impl FilterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter `entries`, preserving order
    pub fn apply<C>(
        &mut self,
        entries: Vec<String>,
        rules: &FilterRules,
        classifier: &C,
    ) -> Vec<String>
    where
        C: EntryClassifier + ?Sized,
    {
        if rules.is_empty() {
            return entries;
        }

        let include = if split_alternatives(&rules.filter).next().is_some() {
            Some(self.cache.compile_set(&rules.filter))
        } else {
            None
        };
        let exclude = self.cache.compile_set(&rules.exclude_filter);

        entries
            .into_iter()
            .filter(|name| {
                let entry = classifier.classify(name);
                admits(&entry, include.as_deref(), &exclude, &rules.exclude_types)
            })
            .collect()
    }

    pub fn cached_patterns(&self) -> usize {
        self.cache.len()
    }
}

fn admits(
    entry: &EntryRef<'_>,
    include: Option<&[Regex]>,
    exclude: &[Regex],
    exclude_types: &[String],
) -> bool {
    let name = entry.name();

    // Group references survive inclusion filtering unconditionally
    if let (Some(include), EntryRef::Node { .. }) = (include, entry) {
        if !include.iter().any(|re| re.is_match(name)) {
            return false;
        }
    }

    if exclude.iter().any(|re| re.is_match(name)) {
        return false;
    }

    if let EntryRef::Node { kind: Some(kind), .. } = entry {
        if exclude_types.iter().any(|t| t == kind) {
            return false;
        }
    }

    true
}
