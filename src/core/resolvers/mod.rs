//! Reverse resolution: mapping literal values back to the expressions that produced them.
//!
//! A parameter observed on a deployed stack is often the *result* of an expression (a
//! stack output, an export, an AMI lookup) evaluated at deploy time. Each
//! [`ReverseResolver`] recognises one kind of expression.
//!
//! # Resolution Precedence
//!
//! Resolvers are consulted in ascending [`ReverseResolver::precedence`] order and the
//! first `Some` wins:
//!
//! ```text
//!  10  ExportResolver        value is an account export        -> !stack_export NAME
//!  20  StackOutputResolver   value is a (non-exported) output  -> !stack_output STACK::KEY
//!  90  PatternResolver       value has a known shape (AMI id)  -> !latest_ami
//! ```
//!
//! User resolvers declared in `reverse_resolvers.toml`, or registered through
//! [`ResolverRegistry::register`], join the same ordering.

mod exports;
mod pattern;
mod registry;
mod stack_output;

pub use exports::ExportResolver;
pub use pattern::{PatternResolver, PatternResolverDef, UserResolversFile, ami_id_resolver};
pub use registry::{ResolverFactory, ResolverRegistry};
pub use stack_output::StackOutputResolver;

use crate::cloud::{CloudClient, CloudError};
use crate::core::known_stacks::KnownStackIndex;
use crate::core::template::ImportedTemplate;
use crate::models::StackDescription;

/// What is being imported when a value is reverse-resolved.
///
/// Passed explicitly on every call, so no resolution leaves state behind for the next.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionTarget<'a> {
    /// The project-relative config path being written, e.g. `prod/vpc`.
    pub config_path: &'a str,
    /// The deployed stack the value was read from.
    pub aws_stack_name: &'a str,
    /// The stack's description, when already fetched.
    pub stack: Option<&'a StackDescription>,
    /// The stack's imported template, when already written.
    pub template: Option<&'a ImportedTemplate>,
}

impl<'a> ResolutionTarget<'a> {
    /// A target with no description or template attached.
    pub fn new(config_path: &'a str, aws_stack_name: &'a str) -> Self {
        Self {
            config_path,
            aws_stack_name,
            stack: None,
            template: None,
        }
    }
}

/// Everything a resolver may consult for one lookup.
#[derive(Clone, Copy)]
pub struct ResolutionScope<'a> {
    /// The session's cloud client.
    pub client: &'a dyn CloudClient,
    /// The stacks tracked by the project.
    pub known_stacks: &'a KnownStackIndex,
    /// The stack being imported.
    pub target: ResolutionTarget<'a>,
}

impl std::fmt::Debug for ResolutionScope<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionScope")
            .field("known_stacks", &self.known_stacks)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

/// A unit of reverse-resolution logic.
///
/// Implementations may cache data fetched through the scope's client for their whole
/// lifetime (one import session); the cache is never invalidated.
pub trait ReverseResolver {
    /// A short name for logs.
    fn name(&self) -> &str;

    /// Between 1 and 99 inclusive. Lower values are consulted first.
    fn precedence(&self) -> u8;

    /// Suggests a symbolic replacement for `value`.
    ///
    /// Returns `Ok(None)` when the resolver has no opinion. Errors are reserved for
    /// failed cloud queries.
    fn suggest(
        &mut self,
        value: &str,
        scope: &ResolutionScope<'_>,
    ) -> Result<Option<String>, CloudError>;
}
