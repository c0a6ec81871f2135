// src/core/template.rs

//! Importing a deployed stack's template into the project.
//!
//! The template is written in the format its extension names. YAML bodies are kept as
//! the cloud returned them; JSON targets get pretty JSON with short-form intrinsic tags
//! (`!Ref`, `!GetAtt`, `!Sub`, ...) rewritten to their long form.

use crate::cloud::{CloudClient, CloudError};
use crate::core::errors::ImportError;
use crate::models::TemplateBody;
use anyhow::{Context, Result};
use serde_yaml::Value;
use serde_yaml::value::TaggedValue;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// How a template file is written, chosen by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateFormat {
    /// `.json`: long-form intrinsic functions.
    Json,
    /// `.yaml` or `.yml`: the body as deployed.
    Yaml,
}

impl TemplateFormat {
    /// The format for `path`'s extension.
    pub fn from_path(path: &Path) -> Result<Self, ImportError> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(ImportError::UnsupportedTemplateFormat {
                path: path.to_path_buf(),
                extension,
            }),
        }
    }
}

/// A parameter declared in a template's `Parameters` block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclaredParameter {
    /// The `Default`, stringified when it is a scalar.
    pub default: Option<String>,
}

/// A template written to (or already present in) the project.
#[derive(Debug, Clone)]
pub struct ImportedTemplate {
    /// Project-relative path, as referenced by the stack config.
    pub relative_path: String,
    /// Absolute location on disk.
    pub path: PathBuf,
    /// The text as written.
    pub body: String,
    document: Value,
}

impl ImportedTemplate {
    /// Wraps template text that is already on disk (or about to be).
    pub fn from_text(
        relative_path: impl Into<String>,
        path: impl Into<PathBuf>,
        body: impl Into<String>,
    ) -> Result<Self, ImportError> {
        let path = path.into();
        let body = body.into();
        let document = parse_document(&body).map_err(|e| ImportError::InvalidTemplate {
            path: path.clone(),
            source: Box::new(e),
        })?;
        Ok(Self {
            relative_path: relative_path.into(),
            path,
            body,
            document,
        })
    }

    /// The `Parameters` block: name -> declared default.
    ///
    /// Scalar defaults are stringified (`80` becomes `"80"`) so they compare with the
    /// string values a deployed stack reports.
    pub fn declared_parameters(&self) -> BTreeMap<String, DeclaredParameter> {
        let Some(Value::Mapping(parameters)) = self.document.get("Parameters") else {
            return BTreeMap::new();
        };
        parameters
            .iter()
            .filter_map(|(name, declaration)| {
                let name = scalar_to_string(name)?;
                let default = declaration.get("Default").and_then(scalar_to_string);
                Some((name, DeclaredParameter { default }))
            })
            .collect()
    }
}

/// Renders a YAML scalar as the string a cloud API would report for it.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Fetches the original template of `aws_stack_name` and writes it to
/// `<project_dir>/<template_path>`.
pub fn import_template(
    client: &dyn CloudClient,
    project_dir: &Path,
    aws_stack_name: &str,
    template_path: &str,
) -> Result<ImportedTemplate> {
    let path = project_dir.join(template_path);
    log::debug!(
        "{} - Preparing to import the template to '{}'",
        aws_stack_name,
        path.display()
    );
    let format = TemplateFormat::from_path(&path)?;

    let response = client.get_template(aws_stack_name).map_err(|e| match e {
        CloudError::StackNotFound(name) => anyhow::Error::new(ImportError::StackNotFound { name }),
        other => anyhow::Error::new(other),
    })?;
    let (body, document) = normalize_for_write(response.template_body, format, &path)?;
    write_template(&path, &body, &document)?;

    Ok(ImportedTemplate {
        relative_path: template_path.to_string(),
        path,
        body,
        document,
    })
}

/// Renders a fetched body for `format`, returning the text to write and its parsed form.
pub fn normalize_for_write(
    body: TemplateBody,
    format: TemplateFormat,
    path: &Path,
) -> Result<(String, Value), ImportError> {
    let invalid = |source: Box<dyn std::error::Error + Send + Sync>| ImportError::InvalidTemplate {
        path: path.to_path_buf(),
        source,
    };

    match (body, format) {
        (TemplateBody::Text(text), TemplateFormat::Yaml) => {
            let document = parse_document(&text).map_err(|e| invalid(Box::new(e)))?;
            Ok((text, document))
        }
        (TemplateBody::Text(text), TemplateFormat::Json) => {
            let document = to_long_form(parse_document(&text).map_err(|e| invalid(Box::new(e)))?);
            let rendered = serde_json::to_string_pretty(&document).map_err(|e| invalid(Box::new(e)))?;
            Ok((rendered + "\n", document))
        }
        (TemplateBody::Document(json), TemplateFormat::Json) => {
            let rendered = serde_json::to_string_pretty(&json).map_err(|e| invalid(Box::new(e)))?;
            let document = serde_yaml::to_value(&json).map_err(|e| invalid(Box::new(e)))?;
            Ok((rendered + "\n", document))
        }
        (TemplateBody::Document(json), TemplateFormat::Yaml) => {
            let rendered = serde_yaml::to_string(&json).map_err(|e| invalid(Box::new(e)))?;
            let document = serde_yaml::to_value(&json).map_err(|e| invalid(Box::new(e)))?;
            Ok((rendered, document))
        }
    }
}

/// Parses YAML or JSON text; empty text is an empty document.
fn parse_document(text: &str) -> Result<Value, serde_yaml::Error> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_yaml::from_str(text)
}

/// Rewrites short-form intrinsic tags into their long, JSON-expressible form.
fn to_long_form(value: Value) -> Value {
    match value {
        Value::Tagged(tagged) => long_form_of_tag(*tagged),
        Value::Sequence(items) => Value::Sequence(items.into_iter().map(to_long_form).collect()),
        Value::Mapping(mapping) => Value::Mapping(
            mapping
                .into_iter()
                .map(|(key, value)| (key, to_long_form(value)))
                .collect(),
        ),
        scalar => scalar,
    }
}

fn long_form_of_tag(tagged: TaggedValue) -> Value {
    let tag = tagged.tag.to_string();
    let name = tag.trim_start_matches('!');
    let inner = to_long_form(tagged.value);

    let (key, value) = match name {
        "Ref" | "Condition" => (name.to_string(), inner),
        "GetAtt" => {
            let value = match inner {
                Value::String(path) => match path.split_once('.') {
                    Some((resource, attribute)) => Value::Sequence(vec![
                        Value::String(resource.to_string()),
                        Value::String(attribute.to_string()),
                    ]),
                    None => Value::String(path),
                },
                other => other,
            };
            ("Fn::GetAtt".to_string(), value)
        }
        _ => (format!("Fn::{}", name), inner),
    };

    let mut mapping = serde_yaml::Mapping::new();
    mapping.insert(Value::String(key), value);
    Value::Mapping(mapping)
}

/// Writes the template, or verifies that an existing file holds the same document.
fn write_template(path: &Path, body: &str, document: &Value) -> Result<()> {
    if !path.is_file() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Could not create '{}'", parent.display()))?;
        }
        fs::write(path, body).with_context(|| format!("Could not write '{}'", path.display()))?;
        log::info!("Imported template to '{}'", path.display());
        return Ok(());
    }

    let existing = fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    let existing_document = parse_document(&existing).map_err(|e| ImportError::InvalidTemplate {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;
    if &existing_document != document {
        return Err(ImportError::TemplateMismatch {
            path: path.to_path_buf(),
            existing,
            fetched: body.to_string(),
        }
        .into());
    }
    log::info!("Template '{}' is already up to date", path.display());
    Ok(())
}
