// src/cli/handlers/import_env.rs

use anyhow::Result;
use colored::Colorize;

use super::commons::{self, GlobalOptions};
use crate::cli::args::ImportEnvArgs;

/// The handler for the `import-env` command.
pub fn handle(args: Vec<String>, globals: &GlobalOptions) -> Result<()> {
    let args: ImportEnvArgs = commons::parse_args(&args)?;
    let mut migrator = globals.open_migrator(&args.environment)?;
    let files = migrator.import_env()?;

    println!(
        "{} Imported {} stack(s) into environment '{}'",
        "✔".green(),
        files.len(),
        migrator.environment().path
    );
    Ok(())
}
