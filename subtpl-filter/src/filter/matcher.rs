//! Regex alternative matching with a per-pattern compile cache

use crate::error::{FilterError, Result};
use regex::Regex;
use std::collections::HashMap;

/// Split a backtick-separated filter into its regex alternatives
pub fn split_alternatives(filter: &str) -> impl Iterator<Item = &str> {
    filter.split('`').filter(|p| !p.is_empty())
}

/// Parse a pipe-separated proxy type list ("ss|VMess") into lowercase names
pub fn parse_type_list(list: &str) -> Vec<String> {
    list.split('|')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Compile a single alternative
pub fn compile_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| FilterError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Cache of compiled alternatives keyed by pattern text
///
/// Alternatives that fail to compile are remembered as permanently
/// non-matching and reported once.
#[derive(Debug, Default)]
pub struct PatternCache {
    compiled: HashMap<String, Option<Regex>>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up (compiling on first use) a single alternative
    pub fn get(&mut self, pattern: &str) -> Option<&Regex> {
        if !self.compiled.contains_key(pattern) {
            let compiled = match compile_pattern(pattern) {
                Ok(re) => Some(re),
                Err(e) => {
                    tracing::warn!("Ignoring filter alternative: {}", e);
                    None
                }
            };
            self.compiled.insert(pattern.to_string(), compiled);
        }

        self.compiled.get(pattern).and_then(|re| re.as_ref())
    }

    /// Compile every valid alternative of a backtick-separated filter
    pub fn compile_set(&mut self, filter: &str) -> Vec<Regex> {
        split_alternatives(filter)
            .filter_map(|alt| self.get(alt).cloned())
            .collect()
    }

    /// Number of distinct patterns seen, valid or not
    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }
}
