//! # stackmigrate
//!
//! Imports deployed CloudFormation stacks into a stack-orchestration project: the
//! template goes under `templates/`, the stack config under `config/<env>/`, and each
//! parameter value is reverse-resolved into the expression that most likely produced it.

/// Command-line parsing and the per-command handlers.
pub mod cli;
pub mod cloud;
/// Project layout names and fixed limits.
pub mod constants;
/// The import pipeline: environments, templates, reverse resolution and config output.
pub mod core;
pub mod models;
pub mod system;

#[cfg(test)]
mod testing;
