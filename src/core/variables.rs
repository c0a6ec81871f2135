// src/core/variables.rs

//! Reverse lookup of user variables: literal value -> `{{ var.NAME }}` placeholder.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

/// Renders the placeholder that references a user variable.
pub fn placeholder(name: &str) -> String {
    format!("{{{{ var.{} }}}}", name)
}

/// The reverse index of an environment's user variables.
///
/// Built once; immutable afterwards. When two variables share a value, the one whose
/// name sorts last wins and a warning is logged. Empty values are not indexed, since
/// they would match at every position of every string.
#[derive(Debug, Clone, Default)]
pub struct VariableIndex {
    reverse: HashMap<String, String>,
    /// Alternation of every indexed literal, longest first. `None` matches nothing.
    pattern: Option<Regex>,
}

impl VariableIndex {
    /// Indexes every non-empty value; fails only if the alternation cannot compile.
    pub fn new(variables: &BTreeMap<String, String>) -> Result<Self, regex::Error> {
        let mut reverse: HashMap<String, String> = HashMap::new();
        for (name, value) in variables {
            if value.is_empty() {
                log::debug!("Variable '{}' is empty; it is not reverse-resolved.", name);
                continue;
            }
            if let Some(previous) = reverse.insert(value.clone(), placeholder(name)) {
                log::warn!(
                    "Variables share the value '{}': {} replaces {} in reverse lookups.",
                    value,
                    placeholder(name),
                    previous
                );
            }
        }

        let pattern = if reverse.is_empty() {
            None
        } else {
            let mut literals: Vec<&String> = reverse.keys().collect();
            // Longest first so that the leftmost match is also the longest literal.
            literals.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
            let alternation = literals
                .iter()
                .map(|literal| regex::escape(literal))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&alternation)?)
        };

        Ok(Self { reverse, pattern })
    }

    /// Whether no value is indexed.
    pub fn is_empty(&self) -> bool {
        self.reverse.is_empty()
    }

    /// The placeholder for a value that equals a variable exactly.
    pub fn lookup(&self, value: &str) -> Option<&str> {
        self.reverse.get(value).map(String::as_str)
    }

    /// Replaces every occurrence of a variable's literal value with its placeholder.
    pub fn substitute<'t>(&self, text: &'t str) -> Cow<'t, str> {
        match &self.pattern {
            Some(pattern) => pattern.replace_all(text, |caps: &Captures<'_>| {
                caps.get(0)
                    .and_then(|m| self.reverse.get(m.as_str()))
                    .cloned()
                    .unwrap_or_default()
            }),
            None => Cow::Borrowed(text),
        }
    }
}
