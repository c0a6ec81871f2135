// src/core/env_config.rs

//! # Environment Config
//!
//! An environment is a directory under `config/`. Its settings come from every
//! `config.yaml` on the way down from `config/`, deeper files overriding shallower ones:
//!
//! ```text
//! config/config.yaml              region: eu-west-1
//! config/prod/config.yaml         profile: prod
//! config/prod/eu/config.yaml      region: eu-central-1
//! ```
//!
//! `prod/eu` resolves to `region: eu-central-1, profile: prod`. `{{ var.NAME }}`
//! references are rendered with the user variables before a file is parsed.

use crate::constants::{CONFIG_DIR, ENVIRONMENT_CONFIG_FILENAME};
use crate::core::template::scalar_to_string;
use anyhow::{Context, Result, anyhow};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

lazy_static! {
    static ref VAR_REFERENCE_RE: Regex =
        Regex::new(r"\{\{\s*var\.([A-Za-z0-9_.\-]+)\s*\}\}").expect("valid variable reference pattern");
}

/// The connection settings of an environment.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentConfig {
    /// The AWS region.
    #[serde(default)]
    pub region: Option<String>,
    /// The named AWS CLI profile.
    #[serde(default)]
    pub profile: Option<String>,
    /// Read for completeness; the CLI client does not assume it.
    #[serde(default)]
    pub iam_role: Option<String>,
}

impl EnvironmentConfig {
    /// Applies a deeper layer: its set keys win.
    fn merge(&mut self, layer: Self) {
        if layer.region.is_some() {
            self.region = layer.region;
        }
        if layer.profile.is_some() {
            self.profile = layer.profile;
        }
        if layer.iam_role.is_some() {
            self.iam_role = layer.iam_role;
        }
    }
}

/// One environment of a project, with its merged config.
#[derive(Debug, Clone)]
pub struct Environment {
    /// The project root.
    pub project_dir: PathBuf,
    /// The environment path relative to `config/`, e.g. `prod/eu`.
    pub path: String,
    /// Every `config.yaml` from the root down to this environment, merged.
    pub config: EnvironmentConfig,
}

impl Environment {
    /// Loads the merged config of `environment_path`, rendering user variables into it.
    pub fn load(
        project_dir: &Path,
        environment_path: &str,
        variables: &BTreeMap<String, String>,
    ) -> Result<Self> {
        let path = normalize_environment_path(environment_path)?;
        let config_root = project_dir.join(CONFIG_DIR);

        let mut config = EnvironmentConfig::default();
        let mut dir = config_root.clone();
        let segments = path.split('/').filter(|segment| !segment.is_empty());
        for layer in std::iter::once("").chain(segments) {
            dir.push(layer);
            let file = dir.join(ENVIRONMENT_CONFIG_FILENAME);
            if let Some(parsed) = read_layer(&file, variables)? {
                log::debug!("Applying config layer '{}'", file.display());
                config.merge(parsed);
            }
        }
        log::debug!("Environment '{}' config: {:?}", path, config);

        Ok(Self {
            project_dir: project_dir.to_path_buf(),
            path,
            config,
        })
    }

    /// `<project>/config/<env-path>`.
    pub fn config_dir(&self) -> PathBuf {
        self.project_dir.join(CONFIG_DIR).join(&self.path)
    }

    /// Creates the environment directory if it does not exist yet.
    pub fn ensure_dir(&self) -> Result<()> {
        let dir = self.config_dir();
        if !dir.is_dir() {
            log::info!("Creating environment directory '{}'", dir.display());
            fs::create_dir_all(&dir)
                .with_context(|| format!("Could not create '{}'", dir.display()))?;
        }
        Ok(())
    }
}

/// Trims separators and rejects paths that would leave `config/`.
fn normalize_environment_path(environment_path: &str) -> Result<String> {
    let trimmed = environment_path.trim().trim_matches('/');
    if trimmed.split('/').any(|segment| segment == "..") {
        return Err(anyhow!(
            "Environment path '{}' must stay inside '{}/'.",
            environment_path,
            CONFIG_DIR
        ));
    }
    Ok(trimmed.to_string())
}

fn read_layer(file: &Path, variables: &BTreeMap<String, String>) -> Result<Option<EnvironmentConfig>> {
    if !file.is_file() {
        return Ok(None);
    }
    let raw = fs::read_to_string(file)
        .with_context(|| format!("Failed to read '{}'", file.display()))?;
    let rendered = render_variables(&raw, variables)
        .with_context(|| format!("Failed to render '{}'", file.display()))?;
    let value: serde_yaml::Value = serde_yaml::from_str(&rendered)
        .with_context(|| format!("Failed to parse '{}'", file.display()))?;
    if value.is_null() {
        return Ok(None);
    }
    let config = serde_yaml::from_value(value)
        .with_context(|| format!("Invalid environment config '{}'", file.display()))?;
    Ok(Some(config))
}

/// Replaces `{{ var.NAME }}` with the variable's value. An undefined name is an error.
pub fn render_variables(text: &str, variables: &BTreeMap<String, String>) -> Result<String> {
    let mut missing: Option<String> = None;
    let rendered = VAR_REFERENCE_RE.replace_all(text, |caps: &Captures<'_>| {
        let name = caps.get(1).map_or("", |m| m.as_str());
        match variables.get(name) {
            Some(value) => value.clone(),
            None => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });
    match missing {
        Some(name) => Err(anyhow!("Variable '{}' is not defined. Pass it with --var {}=VALUE.", name, name)),
        None => Ok(rendered.into_owned()),
    }
}

/// Reads a `--var-file`: a YAML mapping of scalar values.
pub fn load_var_file(path: &Path) -> Result<BTreeMap<String, String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read variable file '{}'", path.display()))?;
    parse_var_file(&content).with_context(|| format!("Invalid variable file '{}'", path.display()))
}

fn parse_var_file(content: &str) -> Result<BTreeMap<String, String>> {
    let value: serde_yaml::Value = serde_yaml::from_str(content)?;
    let mapping = match value {
        serde_yaml::Value::Null => return Ok(BTreeMap::new()),
        serde_yaml::Value::Mapping(mapping) => mapping,
        _ => return Err(anyhow!("expected a mapping of variable names to values")),
    };

    let mut variables = BTreeMap::new();
    for (key, value) in mapping {
        let name = scalar_to_string(&key).ok_or_else(|| anyhow!("variable names must be scalars"))?;
        let value = scalar_to_string(&value)
            .ok_or_else(|| anyhow!("variable '{}' must have a scalar value", name))?;
        variables.insert(name, value);
    }
    Ok(variables)
}
