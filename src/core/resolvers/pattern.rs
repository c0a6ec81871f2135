// src/core/resolvers/pattern.rs

use super::{ResolutionScope, ReverseResolver};
use crate::cloud::CloudError;
use crate::constants::{MAX_PRECEDENCE, MIN_PRECEDENCE};
use anyhow::{Result, anyhow};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

lazy_static! {
    static ref AMI_ID_RE: Regex = Regex::new(r"^ami-[0-9a-f]+$").expect("valid AMI id pattern");
}

/// The marker written for values shaped like an AMI id.
const AMI_ID_SUGGESTION: &str = "!latest_ami";

/// A naming-convention resolver: values matching `pattern` become `suggestion`.
///
/// The suggestion may reference capture groups (`$1`, `${name}`); write `$$` for a
/// literal dollar sign.
#[derive(Debug, Clone)]
pub struct PatternResolver {
    name: String,
    precedence: u8,
    pattern: Regex,
    suggestion: String,
}

impl PatternResolver {
    /// A resolver named `name` at `precedence`.
    pub fn new(name: impl Into<String>, precedence: u8, pattern: Regex, suggestion: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            precedence,
            pattern,
            suggestion: suggestion.into(),
        }
    }

    fn expand(&self, value: &str) -> Option<String> {
        let caps = self.pattern.captures(value)?;
        let mut expanded = String::new();
        caps.expand(&self.suggestion, &mut expanded);
        Some(expanded)
    }
}

impl ReverseResolver for PatternResolver {
    fn name(&self) -> &str {
        &self.name
    }

    fn precedence(&self) -> u8 {
        self.precedence
    }

    fn suggest(
        &mut self,
        value: &str,
        _scope: &ResolutionScope<'_>,
    ) -> Result<Option<String>, CloudError> {
        Ok(self.expand(value))
    }
}

/// The built-in last-resort heuristic for machine image ids.
pub fn ami_id_resolver() -> PatternResolver {
    PatternResolver::new("ami_id", 90, AMI_ID_RE.clone(), AMI_ID_SUGGESTION)
}

// --- `reverse_resolvers.toml` ---

/// One `[[resolver]]` table of `reverse_resolvers.toml`.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PatternResolverDef {
    /// Shown in debug logs.
    pub name: String,
    /// Between 1 and 99; lower runs first.
    pub precedence: u8,
    /// A regular expression matched against the whole value.
    pub pattern: String,
    /// The replacement, with `$1`-style capture references.
    pub suggestion: String,
}

impl PatternResolverDef {
    /// Validates the definition and compiles its pattern.
    pub fn compile(&self) -> Result<PatternResolver> {
        if !(MIN_PRECEDENCE..=MAX_PRECEDENCE).contains(&self.precedence) {
            return Err(anyhow!(
                "Resolver '{}' has precedence {}; it must be between {} and {}.",
                self.name,
                self.precedence,
                MIN_PRECEDENCE,
                MAX_PRECEDENCE
            ));
        }
        let pattern = Regex::new(&self.pattern)
            .map_err(|e| anyhow!("Resolver '{}' has an invalid pattern: {}", self.name, e))?;
        Ok(PatternResolver::new(
            self.name.clone(),
            self.precedence,
            pattern,
            self.suggestion.clone(),
        ))
    }
}

/// The deserialized structure of `reverse_resolvers.toml`.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct UserResolversFile {
    /// Every `[[resolver]]` table, in file order.
    #[serde(default)]
    pub resolver: Vec<PatternResolverDef>,
}

impl UserResolversFile {
    /// Parses the TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
