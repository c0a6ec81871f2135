// src/constants.rs

/// The directory, relative to the project root, holding stack config files.
pub const CONFIG_DIR: &str = "config";

/// The directory, relative to the project root, holding templates.
pub const TEMPLATES_DIR: &str = "templates";

/// The sub-directory of `templates/` that bulk imports write into.
pub const IMPORT_TEMPLATES_DIR: &str = "aws-import";

/// The per-environment configuration file name (inside `config/<env>/`).
pub const ENVIRONMENT_CONFIG_FILENAME: &str = "config.yaml";

/// The extension given to generated stack config files.
pub const STACK_CONFIG_EXTENSION: &str = "yaml";

/// The optional file, at the project root, declaring extra reverse resolvers.
pub const USER_RESOLVERS_FILENAME: &str = "reverse_resolvers.toml";

/// Lowest accepted resolver precedence (evaluated first).
pub const MIN_PRECEDENCE: u8 = 1;

/// Highest accepted resolver precedence (evaluated last).
pub const MAX_PRECEDENCE: u8 = 99;

/// Page size requested from the cloud CLI for paginated listings.
pub const PAGE_SIZE: u32 = 100;
