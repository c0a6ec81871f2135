// src/cli/handlers/import_stack.rs

use anyhow::Result;
use colored::Colorize;

use super::commons::{self, GlobalOptions};
use crate::{cli::args::ImportStackArgs, constants::TEMPLATES_DIR};

/// The handler for the `import-stack` command.
pub fn handle(args: Vec<String>, globals: &GlobalOptions) -> Result<()> {
    let args: ImportStackArgs = commons::parse_args(&args)?;
    let template_path = args
        .template
        .unwrap_or_else(|| default_template_path(&args.aws_stack_name));

    let mut migrator = globals.open_migrator(&args.environment)?;
    let file = migrator.import_stack(&args.aws_stack_name, &args.stack, &template_path)?;

    println!(
        "{} Imported stack '{}' into '{}' (template '{}')",
        "✔".green(),
        args.aws_stack_name,
        file.display(),
        template_path
    );
    Ok(())
}

/// `templates/<AWS_STACK_NAME>.yaml`.
fn default_template_path(aws_stack_name: &str) -> String {
    format!("{}/{}.yaml", TEMPLATES_DIR, aws_stack_name)
}
