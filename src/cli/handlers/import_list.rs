// src/cli/handlers/import_list.rs

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;

use super::commons::{self, GlobalOptions};
use crate::{cli::args::ImportListArgs, core::migrator};

/// The handler for the `import-list` command.
pub fn handle(args: Vec<String>, globals: &GlobalOptions) -> Result<()> {
    let args: ImportListArgs = commons::parse_args(&args)?;
    let list_path = commons::user_path(&args.list_path)?;
    let list_text = fs::read_to_string(&list_path)
        .with_context(|| format!("Could not read import list '{}'", list_path.display()))?;
    log::info!("Importing from list: {}", list_path.display());

    let count = migrator::import_list(
        &globals.project_dir,
        &globals.variables,
        &list_text,
        &commons::aws_clients,
    )?;

    println!("{} Imported {} stack(s) from '{}'", "✔".green(), count, list_path.display());
    Ok(())
}
