// src/core/migration_env.rs

//! # Migration Environment
//!
//! The reverse-resolution context of one import session: the cloud client, the user
//! variables' reverse index, the known-stack index and the resolver chain.
//!
//! `suggest` runs in three steps:
//!
//! 1. A value equal to a user variable becomes that variable's placeholder, whatever
//!    the resolvers would say.
//! 2. Otherwise the first resolver (by precedence) with a suggestion wins; with no
//!    suggestion the value itself is kept.
//! 3. Every variable literal left in the result is replaced by its placeholder. In a
//!    resolver suggestion (`!tag argument`) only the argument is rewritten; the tag
//!    keyword is left alone.

use crate::cloud::{CloudClient, CloudError};
use crate::core::known_stacks::KnownStackIndex;
use crate::core::resolvers::{ResolutionScope, ResolutionTarget, ResolverRegistry, ReverseResolver};
use crate::core::variables::VariableIndex;
use anyhow::{Context, Result};
use std::collections::BTreeMap;

/// The reverse-resolution context of one import session.
pub struct MigrationEnvironment {
    client: Box<dyn CloudClient>,
    variables: VariableIndex,
    known_stacks: KnownStackIndex,
    registry: ResolverRegistry,
    /// Built from `registry` on first use and kept for the session.
    chain: Option<Vec<Box<dyn ReverseResolver>>>,
}

impl std::fmt::Debug for MigrationEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationEnvironment")
            .field("variables", &self.variables)
            .field("known_stacks", &self.known_stacks)
            .field("registry", &self.registry)
            .field("chain_built", &self.chain.is_some())
            .finish_non_exhaustive()
    }
}

impl MigrationEnvironment {
    /// Indexes the user variables and checks the registry. No resolver is built yet.
    pub fn new(
        client: Box<dyn CloudClient>,
        variables: &BTreeMap<String, String>,
        known_stacks: KnownStackIndex,
        registry: ResolverRegistry,
    ) -> Result<Self> {
        let variables =
            VariableIndex::new(variables).context("Could not build the variable reverse index")?;
        registry.validate()?;
        Ok(Self {
            client,
            variables,
            known_stacks,
            registry,
            chain: None,
        })
    }

    /// The session's cloud client.
    pub fn client(&self) -> &dyn CloudClient {
        &*self.client
    }

    /// The stacks tracked by the project.
    pub fn known_stacks(&self) -> &KnownStackIndex {
        &self.known_stacks
    }

    /// The user variables' reverse index.
    pub fn variables(&self) -> &VariableIndex {
        &self.variables
    }

    /// The resolver chain in consultation order, building it if needed.
    pub fn resolver_names(&mut self) -> Vec<String> {
        let registry = &self.registry;
        self.chain
            .get_or_insert_with(|| registry.build())
            .iter()
            .map(|resolver| resolver.name().to_string())
            .collect()
    }

    /// The best symbolic representation of `value` for the stack described by `target`.
    pub fn suggest(&mut self, value: &str, target: ResolutionTarget<'_>) -> Result<String, CloudError> {
        if let Some(placeholder) = self.variables.lookup(value) {
            log::debug!(
                "{} - Variable Suggestion for '{}' is '{}'",
                target.config_path,
                value,
                placeholder
            );
            return Ok(placeholder.to_string());
        }

        let Self {
            client,
            variables,
            known_stacks,
            registry,
            chain,
        } = self;
        let chain = chain.get_or_insert_with(|| registry.build());
        let scope = ResolutionScope {
            client: &**client,
            known_stacks,
            target,
        };

        let mut suggestion: Option<String> = None;
        for resolver in chain.iter_mut() {
            if let Some(found) = resolver.suggest(value, &scope)? {
                log::debug!(
                    "{} - {} suggests '{}' for '{}'",
                    target.config_path,
                    resolver.name(),
                    found,
                    value
                );
                suggestion = Some(found);
                break;
            }
        }

        Ok(match suggestion {
            Some(found) => substitute_argument(variables, &found),
            None => variables.substitute(value).into_owned(),
        })
    }
}

/// Runs the substitution pass over the argument of a `!tag argument` suggestion.
fn substitute_argument(variables: &VariableIndex, suggestion: &str) -> String {
    let Some(tagged) = suggestion.strip_prefix('!') else {
        return variables.substitute(suggestion).into_owned();
    };
    match tagged.split_once(' ') {
        Some((tag, argument)) => format!("!{} {}", tag, variables.substitute(argument)),
        None => suggestion.to_string(),
    }
}
