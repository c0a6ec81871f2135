// src/core/migrator.rs

//! Orchestrates imports: one stack, a whole environment, or an import list.

use crate::cloud::{self, CloudClient};
use crate::core::env_config::Environment;
use crate::core::known_stacks::{self, KnownStackIndex};
use crate::core::migration_env::MigrationEnvironment;
use crate::core::resolvers::ResolverRegistry;
use crate::core::{stack_config, template};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Builds the cloud client for an environment.
pub type ClientFactory<'f> = dyn Fn(&Environment) -> Box<dyn CloudClient> + 'f;

/// What an import session is started from.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// The project root.
    pub project_dir: PathBuf,
    /// User variables (`--var`, `--var-file`).
    pub variables: BTreeMap<String, String>,
    /// Stacks tracked by the project (from an import list).
    pub known_stacks: KnownStackIndex,
}

/// An import session for one environment.
#[derive(Debug)]
pub struct Migrator {
    environment: Environment,
    context: MigrationEnvironment,
}

impl Migrator {
    /// A session from an already loaded environment and context.
    pub fn new(environment: Environment, context: MigrationEnvironment) -> Self {
        Self { environment, context }
    }

    /// Loads `environment_path`, its client and the project's resolvers.
    pub fn open(options: &SessionOptions, environment_path: &str, clients: &ClientFactory<'_>) -> Result<Self> {
        let environment = Environment::load(&options.project_dir, environment_path, &options.variables)
            .with_context(|| format!("Could not load environment '{}'", environment_path))?;

        let mut registry = ResolverRegistry::new();
        registry.load_user_resolvers(&options.project_dir)?;

        let client = clients(&environment);
        let context = MigrationEnvironment::new(
            client,
            &options.variables,
            options.known_stacks.clone(),
            registry,
        )?;
        Ok(Self::new(environment, context))
    }

    /// The environment being imported into.
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// The reverse-resolution context.
    pub fn context_mut(&mut self) -> &mut MigrationEnvironment {
        &mut self.context
    }

    /// Imports the template, then the config, of one stack. Returns the config file.
    pub fn import_stack(
        &mut self,
        aws_stack_name: &str,
        stack_path: &str,
        template_path: &str,
    ) -> Result<PathBuf> {
        let config_path = known_stacks::config_path(&self.environment.path, stack_path);
        log::info!("{} - Importing stack", config_path);
        self.environment.ensure_dir()?;

        let imported = template::import_template(
            self.context.client(),
            &self.environment.project_dir,
            aws_stack_name,
            template_path,
        )
        .with_context(|| format!("{} - Template import failed", config_path))?;
        log::info!(
            "{} - Imported template of stack '{}' into '{}'",
            config_path,
            aws_stack_name,
            template_path
        );

        let file = stack_config::import_config(
            &mut self.context,
            &self.environment,
            stack_path,
            aws_stack_name,
            &imported,
        )
        .with_context(|| format!("{} - Config import failed", config_path))?;
        log::info!("{} - Stack imported", config_path);
        Ok(file)
    }

    /// Imports every deployed stack as `<env-path>/<StackName>`.
    ///
    /// Stack names are collected before the first import so the listing is not
    /// interleaved with resolver queries.
    pub fn import_env(&mut self) -> Result<Vec<PathBuf>> {
        log::info!("{} - Importing environment", self.environment.path);
        let names: Vec<String> = cloud::list_all_stacks(self.context.client())?
            .into_iter()
            .map(|stack| stack.stack_name)
            .collect();

        let mut files = Vec::with_capacity(names.len());
        for name in &names {
            let template_path = known_stacks::default_template_path(name);
            files.push(self.import_stack(name, name, &template_path)?);
        }
        log::info!("{} - Environment imported", self.environment.path);
        Ok(files)
    }

    /// Writes an import-list line for every deployed stack. Returns the line count.
    pub fn generate_import_list(&self, writer: &mut dyn Write) -> Result<usize> {
        log::info!("{} - Generating import list", self.environment.path);
        let mut count = 0;
        let mut write_error = None;
        cloud::for_each_stack(self.context.client(), |stack| {
            if write_error.is_some() {
                return;
            }
            let line = known_stacks::KnownStack {
                environment_path: self.environment.path.clone(),
                stack_name: stack.stack_name.clone(),
                template_path: known_stacks::default_template_path(&stack.stack_name),
                aws_stack_name: stack.stack_name,
            }
            .to_line();
            match writeln!(writer, "{}", line) {
                Ok(()) => count += 1,
                Err(e) => write_error = Some(e),
            }
        })?;
        if let Some(e) = write_error {
            return Err(e).context("Could not write the import list");
        }
        Ok(count)
    }
}

/// Imports every entry of an import list, one session per environment path.
///
/// The whole list is the known-stack index of every session, so outputs of listed
/// stacks resolve to `!stack_output <config-path>::<key>`.
pub fn import_list(
    project_dir: &Path,
    variables: &BTreeMap<String, String>,
    list_text: &str,
    clients: &ClientFactory<'_>,
) -> Result<usize> {
    let index = KnownStackIndex::parse(list_text);
    let options = SessionOptions {
        project_dir: project_dir.to_path_buf(),
        variables: variables.clone(),
        known_stacks: index.clone(),
    };

    let mut sessions: BTreeMap<String, Migrator> = BTreeMap::new();
    for entry in index.entries() {
        if !sessions.contains_key(&entry.environment_path) {
            let migrator = Migrator::open(&options, &entry.environment_path, clients)?;
            sessions.insert(entry.environment_path.clone(), migrator);
        }
        let Some(migrator) = sessions.get_mut(&entry.environment_path) else {
            continue;
        };
        migrator.import_stack(&entry.aws_stack_name, &entry.stack_name, &entry.template_path)?;
    }
    log::info!("Imported {} stack(s) from the import list", index.entries().len());
    Ok(index.entries().len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ImportError;
    use crate::models::{StackParameter, TemplateBody};
    use crate::testing::{StubCloudClient, output, stack, stack_with_outputs};
    use pretty_assertions::assert_eq;
    use std::fs;

    const TEMPLATE: &str = "Parameters:\n  Vpc:\n    Type: String\n";

    fn with_vpc_parameter(name: &str, vpc: &str) -> crate::models::StackDescription {
        crate::models::StackDescription {
            parameters: vec![StackParameter {
                parameter_key: "Vpc".to_string(),
                parameter_value: vpc.to_string(),
            }],
            ..stack(name)
        }
    }

    /// Two deployed stacks: `dev-network` exports nothing but outputs `VpcId`, and
    /// `dev-app` takes it as a parameter.
    fn account() -> StubCloudClient {
        let network = stack_with_outputs("dev-network", vec![output("VpcId", "vpc-1")]);
        let app = with_vpc_parameter("dev-app", "vpc-1");
        StubCloudClient::new()
            .with_stack_page(vec![network.clone()], Some("p2"))
            .with_stack_page(vec![app.clone()], None)
            .with_stack(network)
            .with_stack(app)
            .with_template("dev-network", TemplateBody::Text("Resources: {}\n".to_string()))
            .with_template("dev-app", TemplateBody::Text(TEMPLATE.to_string()))
    }

    fn stub_clients(_: &Environment) -> Box<dyn CloudClient> {
        Box::new(account())
    }

    fn options(project_dir: &Path) -> SessionOptions {
        SessionOptions {
            project_dir: project_dir.to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn test_import_stack_writes_template_and_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut migrator = Migrator::open(&options(dir.path()), "dev", &stub_clients).unwrap();

        let file = migrator
            .import_stack("dev-app", "app", "templates/app.yaml")
            .unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join("templates/app.yaml")).unwrap(),
            TEMPLATE
        );
        assert_eq!(
            fs::read_to_string(file).unwrap(),
            "template_path: templates/app.yaml\n\
             stack_name: dev-app\n\
             parameters:\n  \
             Vpc: !stack_output_external dev-network::VpcId\n"
        );
    }

    #[test]
    fn test_import_stack_twice_fails_on_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut migrator = Migrator::open(&options(dir.path()), "dev", &stub_clients).unwrap();
        migrator.import_stack("dev-app", "app", "templates/app.yaml").unwrap();

        let err = migrator
            .import_stack("dev-app", "app", "templates/app.yaml")
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ImportError>(),
            Some(ImportError::ConfigExists { .. })
        ));
    }

    #[test]
    fn test_import_env_imports_every_stack() {
        let dir = tempfile::tempdir().unwrap();
        let mut migrator = Migrator::open(&options(dir.path()), "dev", &stub_clients).unwrap();

        let files = migrator.import_env().unwrap();

        assert_eq!(
            files,
            vec![
                dir.path().join("config").join("dev").join("dev-network.yaml"),
                dir.path().join("config").join("dev").join("dev-app.yaml"),
            ]
        );
        assert!(dir.path().join("templates/aws-import/dev-network.yaml").is_file());
        assert!(dir.path().join("templates/aws-import/dev-app.yaml").is_file());
    }

    #[test]
    fn test_generate_import_list() {
        let dir = tempfile::tempdir().unwrap();
        let migrator = Migrator::open(&options(dir.path()), "dev/", &stub_clients).unwrap();
        let mut out = Vec::new();

        let count = migrator.generate_import_list(&mut out).unwrap();

        assert_eq!(count, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "dev dev-network dev-network templates/aws-import/dev-network.yaml\n\
             dev dev-app dev-app templates/aws-import/dev-app.yaml\n"
        );
    }

    #[test]
    fn test_generated_list_parses_back() {
        let dir = tempfile::tempdir().unwrap();
        let migrator = Migrator::open(&options(dir.path()), "dev", &stub_clients).unwrap();
        let mut out = Vec::new();
        migrator.generate_import_list(&mut out).unwrap();

        let index = KnownStackIndex::parse(&String::from_utf8(out).unwrap());

        assert_eq!(
            index.internal_config_path("dev-network").as_deref(),
            Some("dev/dev-network")
        );
    }

    #[test]
    fn test_import_list_uses_index_for_internal_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let list = "\
# env stack aws-stack [template]
dev network dev-network

dev app dev-app templates/app.yaml
short line
";
        let opened = std::cell::Cell::new(0);
        let factory = |_: &Environment| -> Box<dyn CloudClient> {
            opened.set(opened.get() + 1);
            Box::new(account())
        };

        let count = import_list(dir.path(), &BTreeMap::new(), list, &factory).unwrap();

        assert_eq!(count, 2);
        assert_eq!(opened.get(), 1);
        let app = fs::read_to_string(dir.path().join("config/dev/app.yaml")).unwrap();
        assert!(app.contains("  Vpc: !stack_output dev/network::VpcId\n"));
        assert!(dir.path().join("config/dev/network.yaml").is_file());
        assert!(dir.path().join("templates/aws-import/dev-network.yaml").is_file());
        assert!(dir.path().join("templates/app.yaml").is_file());
    }

    #[test]
    fn test_import_list_opens_one_session_per_environment() {
        let dir = tempfile::tempdir().unwrap();
        let list = "dev network dev-network\nprod app dev-app\n";
        let opened = std::cell::RefCell::new(Vec::new());
        let factory = |env: &Environment| -> Box<dyn CloudClient> {
            opened.borrow_mut().push(env.path.clone());
            Box::new(account())
        };

        import_list(dir.path(), &BTreeMap::new(), list, &factory).unwrap();

        assert_eq!(*opened.borrow(), vec!["dev".to_string(), "prod".to_string()]);
        assert!(dir.path().join("config/prod/app.yaml").is_file());
    }

    #[test]
    fn test_variables_flow_into_configs() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = options(dir.path());
        options.variables.insert("env".to_string(), "dev".to_string());
        let mut migrator = Migrator::open(&options, "dev", &stub_clients).unwrap();

        let file = migrator.import_stack("dev-app", "app", "templates/app.yaml").unwrap();

        assert!(
            fs::read_to_string(file)
                .unwrap()
                .contains("  Vpc: !stack_output_external {{ var.env }}-network::VpcId\n")
        );
    }
}
