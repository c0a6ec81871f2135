// src/core/resolvers/registry.rs

use super::{ExportResolver, ReverseResolver, StackOutputResolver, UserResolversFile, ami_id_resolver};
use crate::constants::{MAX_PRECEDENCE, MIN_PRECEDENCE, USER_RESOLVERS_FILENAME};
use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::Path;

/// Constructs a fresh resolver instance.
pub type ResolverFactory = Box<dyn Fn() -> Box<dyn ReverseResolver>>;

fn factory<F>(f: F) -> ResolverFactory
where
    F: Fn() -> Box<dyn ReverseResolver> + 'static,
{
    Box::new(f)
}

/// The explicit list of resolver constructors a context instantiates its chain from.
///
/// Built-in resolvers come first, then user registrations in call order; the built
/// chain is stably sorted by precedence, so ties keep that order.
pub struct ResolverRegistry {
    builtin: Vec<ResolverFactory>,
    user: Vec<ResolverFactory>,
}

impl std::fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverRegistry")
            .field("builtin", &self.builtin.len())
            .field("user", &self.user.len())
            .finish()
    }
}

impl Default for ResolverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolverRegistry {
    /// A registry holding the built-in resolvers.
    pub fn new() -> Self {
        let builtin = vec![
            factory(|| Box::new(ExportResolver::new())),
            factory(|| Box::new(StackOutputResolver::new())),
            factory(|| Box::new(ami_id_resolver())),
        ];
        Self {
            builtin,
            user: Vec::new(),
        }
    }

    /// A registry with no resolvers at all.
    pub fn empty() -> Self {
        Self {
            builtin: Vec::new(),
            user: Vec::new(),
        }
    }

    /// Adds a user resolver constructor. Its precedence must lie in 1..=99, which
    /// [`Self::validate`] checks when a session is opened.
    pub fn register<F>(&mut self, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn ReverseResolver> + 'static,
    {
        self.user.push(Box::new(factory));
        self
    }

    /// Registers the pattern resolvers declared in a `reverse_resolvers.toml` document.
    pub fn register_user_file(&mut self, file: &UserResolversFile) -> Result<usize> {
        for def in &file.resolver {
            let resolver = def.compile()?;
            self.register(move || Box::new(resolver.clone()));
        }
        Ok(file.resolver.len())
    }

    /// Registers `<project_dir>/reverse_resolvers.toml` if it exists. Returns how many
    /// resolvers it declared (zero when the file is absent).
    pub fn load_user_resolvers(&mut self, project_dir: &Path) -> Result<usize> {
        let path = project_dir.join(USER_RESOLVERS_FILENAME);
        if !path.is_file() {
            log::debug!("No user resolvers at '{}'", path.display());
            return Ok(0);
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read '{}'", path.display()))?;
        let file = UserResolversFile::parse(&content)
            .with_context(|| format!("Failed to parse '{}'", path.display()))?;
        let count = self
            .register_user_file(&file)
            .with_context(|| format!("Invalid resolver in '{}'", path.display()))?;
        log::debug!("Loaded {} user resolver(s) from '{}'", count, path.display());
        Ok(count)
    }

    /// How many resolver constructors are registered.
    pub fn len(&self) -> usize {
        self.builtin.len() + self.user.len()
    }

    /// Whether the registry holds no constructors.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks that every resolver reports a precedence between 1 and 99.
    pub fn validate(&self) -> Result<()> {
        for factory in self.builtin.iter().chain(self.user.iter()) {
            let resolver = factory();
            let precedence = resolver.precedence();
            if !(MIN_PRECEDENCE..=MAX_PRECEDENCE).contains(&precedence) {
                return Err(anyhow!(
                    "Resolver '{}' has precedence {}; it must be between {} and {}.",
                    resolver.name(),
                    precedence,
                    MIN_PRECEDENCE,
                    MAX_PRECEDENCE
                ));
            }
        }
        Ok(())
    }

    /// Instantiates every resolver and orders them by precedence.
    pub fn build(&self) -> Vec<Box<dyn ReverseResolver>> {
        let mut chain: Vec<Box<dyn ReverseResolver>> =
            self.builtin.iter().chain(self.user.iter()).map(|factory| factory()).collect();
        // `sort_by_key` is stable: equal precedences keep registration order.
        chain.sort_by_key(|resolver| resolver.precedence());
        log::debug!(
            "Resolver chain: {:?}",
            chain
                .iter()
                .map(|r| format!("{}({})", r.name(), r.precedence()))
                .collect::<Vec<_>>()
        );
        chain
    }
}
