// src/core/mod.rs

pub mod env_config;
/// Errors that abort the import of a stack.
pub mod errors;
pub mod known_stacks;
pub mod migration_env;
pub mod migrator;
pub mod resolvers;
pub mod stack_config;
pub mod template;
pub mod variables;
