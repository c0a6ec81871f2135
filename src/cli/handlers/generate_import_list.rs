// src/cli/handlers/generate_import_list.rs

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};

use super::commons::{self, GlobalOptions};
use crate::cli::args::GenerateImportListArgs;

/// The handler for the `generate-import-list` command.
pub fn handle(args: Vec<String>, globals: &GlobalOptions) -> Result<()> {
    let args: GenerateImportListArgs = commons::parse_args(&args)?;
    let migrator = globals.open_migrator(&args.environment)?;

    match &args.list_path {
        Some(path) => {
            let path = commons::user_path(path)?;
            let file = File::create(&path)
                .with_context(|| format!("Could not create '{}'", path.display()))?;
            let mut writer = BufWriter::new(file);
            let count = migrator.generate_import_list(&mut writer)?;
            writer.flush()?;
            log::info!("Wrote {} line(s) to '{}'", count, path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            migrator.generate_import_list(&mut writer)?;
            writer.flush()?;
        }
    }
    Ok(())
}
