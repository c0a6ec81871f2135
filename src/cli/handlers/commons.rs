// src/cli/handlers/commons.rs

// Shared plumbing for the command handlers.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use clap::error::ErrorKind;
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use crate::{
    cli::Cli,
    cloud::{AwsCliClient, CloudClient},
    core::{
        env_config::{self, Environment},
        known_stacks::KnownStackIndex,
        migrator::{Migrator, SessionOptions},
    },
};

/// The options given before the command name, resolved once for every handler.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    /// `--dir`, canonicalized; the current directory when omitted.
    pub project_dir: PathBuf,
    /// `--var-file` values overridden by `--var` pairs.
    pub variables: BTreeMap<String, String>,
}

impl GlobalOptions {
    /// Expands `--dir` and merges the user variables.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let project_dir = match &cli.dir {
            Some(dir) => resolve_dir(dir)?,
            None => env::current_dir().context("Could not determine the current directory")?,
        };

        let mut variables = match &cli.var_file {
            Some(file) => env_config::load_var_file(&expand(file)?)?,
            None => BTreeMap::new(),
        };
        variables.extend(parse_key_value_pairs(&cli.vars)?);
        log::debug!("Project directory: '{}'", project_dir.display());
        log::debug!("User variables: {:?}", variables);

        Ok(Self {
            project_dir,
            variables,
        })
    }

    /// The session settings for a migrator.
    pub fn session(&self) -> SessionOptions {
        SessionOptions {
            project_dir: self.project_dir.clone(),
            variables: self.variables.clone(),
            known_stacks: KnownStackIndex::default(),
        }
    }

    /// Opens an import session for `environment_path` against the AWS CLI.
    pub fn open_migrator(&self, environment_path: &str) -> Result<Migrator> {
        Migrator::open(&self.session(), environment_path, &aws_clients)
    }

}

/// Resolves a user-given file path (e.g. `--list-path`) against the current directory,
/// independently of `--dir`.
pub fn user_path(path: &str) -> Result<PathBuf> {
    let expanded = expand(path)?;
    if expanded.is_absolute() {
        return Ok(expanded);
    }
    let cwd = env::current_dir().context("Could not determine the current directory")?;
    Ok(cwd.join(expanded))
}

/// The production client factory: the `aws` CLI with the environment's region and profile.
pub fn aws_clients(environment: &Environment) -> Box<dyn CloudClient> {
    Box::new(AwsCliClient::for_environment(&environment.config))
}

/// Parses a command's arguments. `--help` and `--version` print and exit.
pub fn parse_args<T: Parser>(args: &[String]) -> Result<T> {
    match T::try_parse_from(args) {
        Ok(parsed) => Ok(parsed),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => Err(anyhow!("{}", e.render())),
    }
}

/// Parses `KEY=VALUE` pairs; later pairs win.
pub fn parse_key_value_pairs(pairs: &[String]) -> Result<BTreeMap<String, String>> {
    let mut map = BTreeMap::new();
    for pair in pairs {
        match pair.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                map.insert(key.trim().to_string(), value.trim().to_string());
            }
            _ => {
                return Err(anyhow!(
                    "Invalid format for key-value pair: '{}'. Expected 'KEY=VALUE'.",
                    pair
                ));
            }
        }
    }
    Ok(map)
}

/// Expands `~` and environment variables.
fn expand(path: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(path)
        .map_err(|e| anyhow!("Failed to expand path '{}': {}", path, e))?;
    Ok(PathBuf::from(expanded.into_owned()))
}

fn resolve_dir(dir: &str) -> Result<PathBuf> {
    let expanded = expand(dir)?;
    canonical_dir(&expanded)
}

fn canonical_dir(path: &Path) -> Result<PathBuf> {
    let canonical = dunce::canonicalize(path)
        .with_context(|| format!("Project directory '{}' does not exist", path.display()))?;
    if !canonical.is_dir() {
        return Err(anyhow!("'{}' is not a directory", canonical.display()));
    }
    Ok(canonical)
}
