// src/core/resolvers/stack_output.rs

use super::{ResolutionScope, ReverseResolver};
use crate::cloud::{self, CloudError};
use crate::core::known_stacks::KnownStackIndex;
use crate::models::{StackDescription, StackOutput};
use std::collections::HashMap;

/// A reverse-lookup entry: which stack produces the value and what to write instead.
#[derive(Debug, Clone, PartialEq, Eq)]
struct OutputRef {
    stack_name: String,
    suggestion: String,
}

#[derive(Debug, Default)]
struct OutputLookups {
    /// Outputs of stacks tracked by the project, keyed by value; `stack_name` is the config path.
    internal: HashMap<String, OutputRef>,
    /// Outputs of untracked stacks; `stack_name` is the deployed stack name.
    external: HashMap<String, OutputRef>,
}

impl OutputLookups {
    fn add_stack(&mut self, stack: &StackDescription, known_stacks: &KnownStackIndex) {
        if stack.outputs.is_empty() {
            return;
        }
        match known_stacks.internal_config_path(&stack.stack_name) {
            Some(config_path) => {
                for output in &stack.outputs {
                    add_to_reverse_lookup(&mut self.internal, &config_path, output, "stack_output");
                }
            }
            None => {
                for output in &stack.outputs {
                    add_to_reverse_lookup(
                        &mut self.external,
                        &stack.stack_name,
                        output,
                        "stack_output_external",
                    );
                }
            }
        }
    }
}

/// Exported outputs are left to the export resolver. The first output of a value wins.
fn add_to_reverse_lookup(
    lookup: &mut HashMap<String, OutputRef>,
    stack_name: &str,
    output: &StackOutput,
    resolver_name: &str,
) {
    if output.is_exported() {
        return;
    }
    if lookup.contains_key(&output.output_value) {
        log::warn!(
            "Skipping {} stack reverse lookup. Duplicate Value: key={}, value={}",
            stack_name,
            output.output_key,
            output.output_value
        );
        return;
    }
    lookup.insert(
        output.output_value.clone(),
        OutputRef {
            stack_name: stack_name.to_string(),
            suggestion: format!("!{} {}::{}", resolver_name, stack_name, output.output_key),
        },
    );
}

/// Recognises values that are outputs of other deployed stacks.
///
/// Outputs of stacks in the known-stack index become `!stack_output <config-path>::<key>`;
/// all others become `!stack_output_external <stack-name>::<key>`. A stack is never
/// pointed at its own outputs.
#[derive(Debug, Default)]
pub struct StackOutputResolver {
    lookups: Option<OutputLookups>,
}

impl StackOutputResolver {
    /// Right after exports.
    pub const PRECEDENCE: u8 = 20;

    /// A resolver with nothing fetched yet.
    pub fn new() -> Self {
        Self::default()
    }

    fn collect(scope: &ResolutionScope<'_>) -> Result<OutputLookups, CloudError> {
        log::debug!("Collecting stack outputs...");
        let mut lookups = OutputLookups::default();
        cloud::for_each_stack(scope.client, |stack| {
            lookups.add_stack(&stack, scope.known_stacks);
        })?;
        log::debug!("Outputs: {:?}", lookups.internal);
        log::debug!("Outputs external: {:?}", lookups.external);
        Ok(lookups)
    }
}

impl ReverseResolver for StackOutputResolver {
    fn name(&self) -> &str {
        "stack_output"
    }

    fn precedence(&self) -> u8 {
        Self::PRECEDENCE
    }

    fn suggest(
        &mut self,
        value: &str,
        scope: &ResolutionScope<'_>,
    ) -> Result<Option<String>, CloudError> {
        if self.lookups.is_none() {
            self.lookups = Some(Self::collect(scope)?);
        }
        let Some(lookups) = self.lookups.as_ref() else {
            return Ok(None);
        };
        let target = scope.target;

        if let Some(found) = lookups.internal.get(value) {
            if found.stack_name != target.config_path {
                log::debug!(
                    "{} - Internal Stack Suggestion for '{}' is '{}'",
                    target.config_path,
                    value,
                    found.suggestion
                );
                return Ok(Some(found.suggestion.clone()));
            }
            log::debug!(
                "{} - '{}' is one of its own outputs; not suggesting it",
                target.config_path,
                value
            );
        }

        if let Some(found) = lookups.external.get(value) {
            if found.stack_name != target.aws_stack_name {
                log::debug!(
                    "{} - External Stack Suggestion for '{}' is '{}'",
                    target.config_path,
                    value,
                    found.suggestion
                );
                return Ok(Some(found.suggestion.clone()));
            }
        }

        log::debug!("{} - Stack Suggestion for '{}' is 'None'", target.config_path, value);
        Ok(None)
    }
}
