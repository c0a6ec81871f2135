// src/cli/mod.rs

use clap::Parser;

/// Argument structs of the individual commands.
pub mod args;
/// One handler per command.
pub mod handlers;

const COMMANDS_HELP: &str = "\
Commands:
  import-stack <ENV> <STACK> <AWS_STACK_NAME> [--template PATH]
                          Import one deployed stack into config/<ENV>/<STACK>.yaml
  import-env <ENV>        Import every deployed stack into config/<ENV>/
  import-list --list-path FILE
                          Import the stacks named in an import list
  generate-import-list <ENV> [--list-path FILE]
                          Write an import list of every deployed stack

Run `stackmigrate <command> --help` for the options of a command.";

/// stackmigrate: imports deployed CloudFormation stacks into a stack-orchestration project.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    after_help = COMMANDS_HELP,
    styles = clap::builder::Styles::styled()
        .header(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .usage(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .literal(clap::builder::styling::AnsiColor::Cyan.on_default().bold())
        .placeholder(clap::builder::styling::AnsiColor::Green.on_default()),
)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Log debug output (RUST_LOG overrides).
    #[arg(long)]
    pub debug: bool,

    /// The project directory. Defaults to the current directory.
    #[arg(long, value_name = "PROJECT_DIR")]
    pub dir: Option<String>,

    /// A user variable, repeatable (e.g. "--var env=prod").
    #[arg(long = "var", value_name = "KEY=VALUE")]
    pub vars: Vec<String>,

    /// A YAML file of user variables. `--var` wins on conflicts.
    #[arg(long, value_name = "FILE")]
    pub var_file: Option<String>,

    /// The command to run.
    pub command: Option<String>,

    /// The command's own arguments.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}
