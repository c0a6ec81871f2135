// src/cli/args.rs
use clap::Parser;

/// Imports one deployed stack.
#[derive(Parser, Debug, Default)]
#[command(name = "import-stack", no_binary_name = true)] // The command name is consumed by the dispatcher
pub struct ImportStackArgs {
    /// The environment path under `config/`, e.g. `prod/eu`.
    pub environment: String,

    /// The stack path inside the environment; the config is written to `<STACK>.yaml`.
    pub stack: String,

    /// The name of the deployed stack.
    pub aws_stack_name: String,

    /// Where to write the template, relative to the project. Defaults to
    /// `templates/<AWS_STACK_NAME>.yaml`.
    #[arg(long)]
    pub template: Option<String>,
}

/// Imports every deployed stack into an environment.
#[derive(Parser, Debug, Default)]
#[command(name = "import-env", no_binary_name = true)]
pub struct ImportEnvArgs {
    /// The environment path under `config/`.
    pub environment: String,
}

/// Imports the stacks named in an import list.
#[derive(Parser, Debug, Default)]
#[command(name = "import-list", no_binary_name = true)]
pub struct ImportListArgs {
    /// The import list: `<env> <stack> <aws-stack-name> [template-path]` per line.
    /// A relative path is read from the current directory, not from `--dir`.
    #[arg(long)]
    pub list_path: String,
}

/// Writes an import list of every deployed stack.
#[derive(Parser, Debug, Default)]
#[command(name = "generate-import-list", no_binary_name = true)]
pub struct GenerateImportListArgs {
    /// The environment path under `config/`.
    pub environment: String,

    /// Write the list to this file instead of standard output. A relative path is
    /// taken from the current directory.
    #[arg(long)]
    pub list_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_stack_args() {
        let args = ImportStackArgs::try_parse_from(["prod", "vpc", "prod-vpc"]).unwrap();
        assert_eq!(args.environment, "prod");
        assert_eq!(args.stack, "vpc");
        assert_eq!(args.aws_stack_name, "prod-vpc");
        assert_eq!(args.template, None);

        let args =
            ImportStackArgs::try_parse_from(["prod", "vpc", "prod-vpc", "--template", "t/vpc.json"])
                .unwrap();
        assert_eq!(args.template.as_deref(), Some("t/vpc.json"));
    }

    #[test]
    fn test_import_stack_requires_three_positionals() {
        assert!(ImportStackArgs::try_parse_from(["prod", "vpc"]).is_err());
    }

    #[test]
    fn test_import_list_requires_list_path() {
        assert!(ImportListArgs::try_parse_from(Vec::<String>::new()).is_err());
        let args = ImportListArgs::try_parse_from(["--list-path", "stacks.txt"]).unwrap();
        assert_eq!(args.list_path, "stacks.txt");
    }

    #[test]
    fn test_generate_import_list_args() {
        let args = GenerateImportListArgs::try_parse_from(["dev"]).unwrap();
        assert_eq!(args.environment, "dev");
        assert_eq!(args.list_path, None);
    }
}
