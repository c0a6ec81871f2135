// src/core/stack_config.rs

//! Writing a stack config from a deployed stack.
//!
//! The emitted file is line-oriented YAML with, in order: `template_path`, `stack_name`,
//! `protect` (only when termination protection is on), `role_arn` (only when set),
//! `parameters` (sorted by key; values equal to the template default are commented out,
//! others are reverse-resolved) and `stack_tags` (verbatim).
//!
//! A literal that would not read back as the same plain YAML string (`****`, `a: b #c`,
//! the empty string) is written double-quoted. Resolver suggestions and `{{ var.X }}`
//! placeholders are written as they are.

use crate::cloud::{self, CloudError};
use crate::constants::STACK_CONFIG_EXTENSION;
use crate::core::env_config::Environment;
use crate::core::errors::ImportError;
use crate::core::known_stacks;
use crate::core::migration_env::MigrationEnvironment;
use crate::core::resolvers::ResolutionTarget;
use crate::core::template::{self, ImportedTemplate};
use crate::models::StackDescription;
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `<project>/config/<env-path>/<stack_path>.yaml`.
pub fn config_file_path(environment: &Environment, stack_path: &str) -> PathBuf {
    environment
        .config_dir()
        .join(format!("{}.{}", stack_path, STACK_CONFIG_EXTENSION))
}

/// Describes `aws_stack_name` and writes its config for `stack_path`.
///
/// Fails with [`ImportError::ConfigExists`] before any cloud query when the file is
/// already there.
pub fn import_config(
    context: &mut MigrationEnvironment,
    environment: &Environment,
    stack_path: &str,
    aws_stack_name: &str,
    template: &ImportedTemplate,
) -> Result<PathBuf> {
    let file = config_file_path(environment, stack_path);
    if file.exists() {
        return Err(ImportError::ConfigExists { path: file }.into());
    }

    let stack = cloud::describe_stack(context.client(), aws_stack_name).map_err(|e| match e {
        CloudError::StackNotFound(name) => anyhow::Error::new(ImportError::StackNotFound { name }),
        other => anyhow::Error::new(other),
    })?;
    let config_path = known_stacks::config_path(&environment.path, stack_path);
    let rendered = render_config(context, &config_path, &stack, template)?;

    if let Some(parent) = file.parent() {
        fs::create_dir_all(parent).with_context(|| format!("Could not create '{}'", parent.display()))?;
    }
    fs::write(&file, rendered).with_context(|| format!("Could not write '{}'", file.display()))?;
    log::info!(
        "{} - Imported stack config from stack '{}'",
        config_path,
        aws_stack_name
    );
    Ok(file)
}

/// Renders the config text for a described stack.
pub fn render_config(
    context: &mut MigrationEnvironment,
    config_path: &str,
    stack: &StackDescription,
    template: &ImportedTemplate,
) -> Result<String> {
    let mut lines = vec![
        format!("template_path: {}", template.relative_path),
        format!("stack_name: {}", stack.stack_name),
    ];

    if stack.is_protected() {
        lines.push("protect: True".to_string());
    }
    if let Some(role) = stack.service_role() {
        lines.push(format!("role_arn: {}", role));
    }

    if !stack.parameters.is_empty() {
        let declared = template.declared_parameters();
        let mut parameters: Vec<_> = stack.parameters.iter().collect();
        parameters.sort_by(|a, b| a.parameter_key.cmp(&b.parameter_key));

        let target = ResolutionTarget {
            config_path,
            aws_stack_name: &stack.stack_name,
            stack: Some(stack),
            template: Some(template),
        };

        lines.push("parameters:".to_string());
        for parameter in parameters {
            let key = &parameter.parameter_key;
            let value = &parameter.parameter_value;
            let declaration = declared.get(key).ok_or_else(|| ImportError::UndeclaredParameter {
                stack: stack.stack_name.clone(),
                key: key.clone(),
            })?;

            if declaration.default.as_deref() == Some(value.as_str()) {
                lines.push(format!("  #{}: {}", key, value));
            } else {
                let suggestion = context.suggest(value, target)?;
                // Anything the context rewrote is a tag or a placeholder expression.
                let rendered = if suggestion == *value {
                    yaml_scalar(value)?
                } else {
                    suggestion
                };
                lines.push(format!("  {}: {}", key, rendered));
            }
        }
    }

    if !stack.tags.is_empty() {
        lines.push("stack_tags:".to_string());
        for tag in &stack.tags {
            lines.push(format!("  {}: {}", yaml_scalar(&tag.key)?, yaml_scalar(&tag.value)?));
        }
    }

    let mut rendered = lines.join("\n");
    rendered.push('\n');
    Ok(rendered)
}

/// `text` as a YAML scalar: plain when it reads back unchanged, double-quoted otherwise.
fn yaml_scalar(text: &str) -> Result<String> {
    let reads_back = serde_yaml::from_str::<serde_yaml::Value>(text)
        .ok()
        .and_then(|value| template::scalar_to_string(&value))
        .is_some_and(|scalar| scalar == text);
    if reads_back {
        return Ok(text.to_string());
    }
    // A JSON string is a valid YAML double-quoted scalar and always fits on one line.
    serde_json::to_string(text).context("Could not quote a config value")
}
