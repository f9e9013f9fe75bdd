//! Matching concrete field names against declared name patterns.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use regex::Regex;
use tracing::warn;

use super::PlaceholderRegistry;

/// Decides whether a declared field name covers a concrete one.
pub trait FieldNameMatcher: Send + Sync {
    fn matches(&self, pattern: &str, name: &str) -> bool;
}

/// Treats each placeholder token in the pattern as a wildcard.
///
/// `name_LOCALIZATION_ID` matches `name_1` and `name_LOCALIZATION_ID`
/// but not `name_1_extra`; the whole name has to match. Each pattern is
/// compiled once.
#[derive(Debug)]
pub struct PlaceholderNameMatcher {
    tokens: Vec<String>,
    token_regex: Option<Regex>,
    patterns: RwLock<HashMap<String, Option<Regex>>>,
}

impl PlaceholderNameMatcher {
    pub fn new<S: Into<String>>(tokens: impl IntoIterator<Item = S>) -> Self {
        let mut tokens: Vec<String> = tokens
            .into_iter()
            .map(Into::into)
            .filter(|t: &String| !t.is_empty())
            .collect();
        // Longer tokens first so `CPL_ID` is not split by a shorter token.
        tokens.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        tokens.dedup();

        let token_regex = if tokens.is_empty() {
            None
        } else {
            let alternation = tokens
                .iter()
                .map(|token| regex::escape(token))
                .collect::<Vec<_>>()
                .join("|");
            Regex::new(&alternation)
                .map_err(|e| warn!(error = %e, "Invalid placeholder tokens"))
                .ok()
        };

        Self {
            tokens,
            token_regex,
            patterns: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_registry(registry: &PlaceholderRegistry) -> Self {
        Self::new(registry.tokens())
    }

    /// Number of patterns compiled so far.
    pub fn compiled_patterns(&self) -> usize {
        self.patterns
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn compile(&self, token_regex: &Regex, pattern: &str) -> Option<Regex> {
        let mut expression = String::from("^");
        let mut last = 0;
        for token in token_regex.find_iter(pattern) {
            expression.push_str(&regex::escape(&pattern[last..token.start()]));
            expression.push_str(".+?");
            last = token.end();
        }
        expression.push_str(&regex::escape(&pattern[last..]));
        expression.push('$');

        Regex::new(&expression)
            .map_err(|e| warn!(pattern = %pattern, error = %e, "Invalid field name pattern"))
            .ok()
    }
}

impl FieldNameMatcher for PlaceholderNameMatcher {
    fn matches(&self, pattern: &str, name: &str) -> bool {
        if pattern == name {
            return true;
        }
        let Some(token_regex) = &self.token_regex else {
            return false;
        };
        if !self.tokens.iter().any(|token| pattern.contains(token.as_str())) {
            return false;
        }

        if let Some(compiled) = self
            .patterns
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(pattern)
        {
            return compiled.as_ref().is_some_and(|regex| regex.is_match(name));
        }

        let compiled = self.compile(token_regex, pattern);
        let matched = compiled.as_ref().is_some_and(|regex| regex.is_match(name));
        self.patterns
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(pattern.to_string(), compiled);
        matched
    }
}
