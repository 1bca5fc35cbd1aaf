//! Ignore rules for watcher events.

use crate::error::{CaptureError, Result};
use ghost_common_config::MonitorConfig;
use std::path::Path;

#[derive(Debug, Clone)]
enum Rule {
    /// Matches anywhere in the path string.
    Substring(String),
    /// Matches any single path component.
    Glob(glob::Pattern),
}

/// Decides which paths never reach the ledger.
///
/// Patterns containing `*`, `?` or `[` are globs matched against each path
/// component, so `*.log` ignores `a/b/c.log`. Anything else is a plain
/// substring of the full path, so `.git` ignores everything under `.git/`.
#[derive(Debug, Clone, Default)]
pub struct IgnoreFilter {
    rules: Vec<Rule>,
}

impl IgnoreFilter {
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rules = patterns
            .into_iter()
            .map(|p| parse_rule(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn from_config(config: &MonitorConfig) -> Result<Self> {
        Self::new(&config.ignore_patterns)
    }

    pub fn is_ignored(&self, path: &Path) -> bool {
        let full = path.to_string_lossy();
        self.rules.iter().any(|rule| match rule {
            Rule::Substring(s) => full.contains(s.as_str()),
            Rule::Glob(pattern) => path
                .components()
                .any(|c| pattern.matches(&c.as_os_str().to_string_lossy())),
        })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn parse_rule(pattern: &str) -> Result<Rule> {
    if pattern.contains(['*', '?', '[']) {
        glob::Pattern::new(pattern)
            .map(Rule::Glob)
            .map_err(|e| CaptureError::Pattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })
    } else {
        Ok(Rule::Substring(pattern.to_string()))
    }
}
