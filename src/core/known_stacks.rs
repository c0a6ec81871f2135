// src/core/known_stacks.rs

//! The known-stack index: stacks the operator declares as tracked by the project.
//!
//! The text format is one stack per line, whitespace separated:
//!
//! ```text
//! # environment  stack-name  aws-stack-name  [template-path]
//! prod/network   vpc         prod-vpc        templates/network/vpc.yaml
//! prod/app       api         prod-api
//! ```
//!
//! Blank lines and `#` comments are skipped, as are lines with fewer than three fields.
//! A missing template path defaults to `templates/aws-import/<aws-stack-name>.yaml`.

use crate::constants::{IMPORT_TEMPLATES_DIR, TEMPLATES_DIR};

/// The default template location for a bulk-imported stack.
pub fn default_template_path(aws_stack_name: &str) -> String {
    format!("{}/{}/{}.yaml", TEMPLATES_DIR, IMPORT_TEMPLATES_DIR, aws_stack_name)
}

/// Joins an environment path and a stack name into a stack config path.
pub fn config_path(environment_path: &str, stack_name: &str) -> String {
    format!("{}/{}", environment_path.trim_end_matches('/'), stack_name)
}

/// One line of an import list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownStack {
    /// The environment path under `config/`.
    pub environment_path: String,
    /// The stack config name inside the environment.
    pub stack_name: String,
    /// The deployed stack name.
    pub aws_stack_name: String,
    /// The project-relative template path.
    pub template_path: String,
}

impl KnownStack {
    /// The project-relative config path, e.g. `prod/network/vpc`.
    pub fn config_path(&self) -> String {
        config_path(&self.environment_path, &self.stack_name)
    }

    /// Parses one line; `None` for comments, blanks and short lines.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let mut parts = line.split_whitespace();
        let (Some(environment_path), Some(stack_name), Some(aws_stack_name)) =
            (parts.next(), parts.next(), parts.next())
        else {
            log::debug!("Skipping import list line with fewer than 3 fields: '{}'", line);
            return None;
        };
        let template_path = parts
            .next()
            .map(str::to_string)
            .unwrap_or_else(|| default_template_path(aws_stack_name));

        Some(Self {
            environment_path: environment_path.to_string(),
            stack_name: stack_name.to_string(),
            aws_stack_name: aws_stack_name.to_string(),
            template_path,
        })
    }

    /// Renders the entry back into its one-line form.
    pub fn to_line(&self) -> String {
        format!(
            "{} {} {} {}",
            self.environment_path, self.stack_name, self.aws_stack_name, self.template_path
        )
    }
}

/// The stacks tracked by the project, in list order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownStackIndex {
    entries: Vec<KnownStack>,
}

impl KnownStackIndex {
    /// Wraps already-parsed entries.
    pub fn new(entries: Vec<KnownStack>) -> Self {
        Self { entries }
    }

    /// Parses an import list, skipping lines [`KnownStack::parse_line`] rejects.
    pub fn parse(text: &str) -> Self {
        Self::new(text.lines().filter_map(KnownStack::parse_line).collect())
    }

    /// The entries in list order.
    pub fn entries(&self) -> &[KnownStack] {
        &self.entries
    }

    /// Whether nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The config path under which a deployed stack is tracked, if it is tracked.
    pub fn internal_config_path(&self, aws_stack_name: &str) -> Option<String> {
        self.entries
            .iter()
            .find(|entry| entry.aws_stack_name == aws_stack_name)
            .map(KnownStack::config_path)
    }
}
