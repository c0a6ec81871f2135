// src/bin/stackmigrate.rs

use anyhow::{Result, anyhow};
use clap::{CommandFactory, Parser};
use colored::*;
use stackmigrate::cli::{
    Cli,
    handlers::{self, commons::GlobalOptions},
};

// --- Command Definition and Registry ---

/// A command, its aliases, and its handler.
struct CommandDefinition {
    name: &'static str,
    aliases: &'static [&'static str],
    handler: fn(Vec<String>, &GlobalOptions) -> Result<()>,
}

/// Every command the binary dispatches. To add a command, add an entry here.
static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        name: "generate-import-list",
        aliases: &[],
        handler: handlers::generate_import_list::handle,
    },
    CommandDefinition {
        name: "import-env",
        aliases: &[],
        handler: handlers::import_env::handle,
    },
    CommandDefinition {
        name: "import-list",
        aliases: &[],
        handler: handlers::import_list::handle,
    },
    CommandDefinition {
        name: "import-stack",
        aliases: &["import"],
        handler: handlers::import_stack::handle,
    },
];

/// Finds a command definition in the registry by its name or alias.
fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    if let Err(e) = run_cli(cli) {
        eprintln!("\n{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Resolves the global options and routes to the command's handler.
fn run_cli(cli: Cli) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);

    let Some(command_name) = cli.command.as_deref() else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let command = find_command(command_name).ok_or_else(|| {
        let known: Vec<&str> = COMMAND_REGISTRY.iter().map(|cmd| cmd.name).collect();
        anyhow!(
            "Unknown command '{}'. Available commands: {}",
            command_name,
            known.join(", ")
        )
    })?;

    let globals = GlobalOptions::from_cli(&cli)?;
    (command.handler)(cli.args, &globals)
}
