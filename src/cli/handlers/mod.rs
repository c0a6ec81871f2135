// src/cli/handlers/mod.rs

// One module per CLI command.

/// Global options and helpers shared by the handlers.
pub mod commons;
/// `generate-import-list`.
pub mod generate_import_list;
/// `import-env`.
pub mod import_env;
/// `import-list`.
pub mod import_list;
/// `import-stack`.
pub mod import_stack;
