// src/core/errors.rs

use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions that abort the import of a single stack.
#[derive(Error, Debug)]
pub enum ImportError {
    /// The stack config file is already there.
    #[error("Config '{}' already exists; refusing to overwrite it.", path.display())]
    ConfigExists {
        /// The existing config file.
        path: PathBuf,
    },

    /// The template path has an extension other than `.json`, `.yaml` or `.yml`.
    #[error("Unsupported template format '{extension}' for '{}'. Use .json, .yaml or .yml.", path.display())]
    UnsupportedTemplateFormat {
        /// The requested template path.
        path: PathBuf,
        /// Its extension, lowercased (empty when missing).
        extension: String,
    },

    /// A template file exists and differs from the deployed template.
    #[error(
        "Template '{}' already exists with different content.\n--- existing ---\n{existing}\n--- fetched ---\n{fetched}",
        path.display()
    )]
    TemplateMismatch {
        /// The template file on disk.
        path: PathBuf,
        /// Its content.
        existing: String,
        /// The normalised deployed template.
        fetched: String,
    },

    /// No deployed stack has this name.
    #[error("Stack '{name}' does not exist.")]
    StackNotFound {
        /// The deployed stack name.
        name: String,
    },

    /// A live parameter is missing from the template's `Parameters`.
    #[error("Stack '{stack}' sets parameter '{key}', which its template does not declare.")]
    UndeclaredParameter {
        /// The deployed stack name.
        stack: String,
        /// The parameter key.
        key: String,
    },

    /// The template body is neither valid JSON nor valid YAML.
    #[error("Template '{}' could not be parsed: {source}", path.display())]
    InvalidTemplate {
        /// Where the template was going to be written.
        path: PathBuf,
        /// The parser error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
