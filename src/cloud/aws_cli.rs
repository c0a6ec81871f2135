// src/cloud/aws_cli.rs

use super::{CloudClient, CloudError};
use crate::constants::PAGE_SIZE;
use crate::core::env_config::EnvironmentConfig;
use crate::models::{DescribeStacksPage, ListExportsPage, TemplateResponse};
use crate::system::executor::{self, ExecutionError};
use serde::de::DeserializeOwned;
use std::collections::HashMap;

/// A [`CloudClient`] backed by the `aws` command-line tool.
///
/// Credentials, regions and profiles are whatever the CLI resolves; this client only
/// forwards the `region` and `profile` of the environment config.
#[derive(Debug, Clone)]
pub struct AwsCliClient {
    program: String,
    region: Option<String>,
    profile: Option<String>,
}

impl AwsCliClient {
    /// A client running `aws` with an optional `--region` and `--profile`.
    pub fn new(region: Option<String>, profile: Option<String>) -> Self {
        Self {
            program: "aws".to_string(),
            region,
            profile,
        }
    }

    /// Builds a client for an environment's `region` and `profile`.
    pub fn for_environment(config: &EnvironmentConfig) -> Self {
        if let Some(role) = &config.iam_role {
            log::debug!(
                "iam_role '{}' is not assumed by the CLI client; relying on the profile's credentials.",
                role
            );
        }
        Self::new(config.region.clone(), config.profile.clone())
    }

    /// Overrides the executable (e.g. a wrapper script or a pinned install).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn arguments(&self, operation: &str, extra: &[String]) -> Vec<String> {
        let mut args = vec![
            "cloudformation".to_string(),
            operation.to_string(),
            "--output".to_string(),
            "json".to_string(),
        ];
        if let Some(region) = &self.region {
            args.push("--region".to_string());
            args.push(region.clone());
        }
        if let Some(profile) = &self.profile {
            args.push("--profile".to_string());
            args.push(profile.clone());
        }
        args.extend_from_slice(extra);
        args
    }

    fn paging_arguments(next_token: Option<&str>) -> Vec<String> {
        let mut args = vec!["--max-items".to_string(), PAGE_SIZE.to_string()];
        if let Some(token) = next_token {
            args.push("--starting-token".to_string());
            args.push(token.to_string());
        }
        args
    }

    fn call<T: DeserializeOwned>(&self, operation: &str, extra: &[String]) -> Result<T, CloudError> {
        let args = self.arguments(operation, extra);
        // Keep the CLI from piping JSON through a pager.
        let env = HashMap::from([("AWS_PAGER".to_string(), String::new())]);
        let stdout = executor::execute_and_capture_output(&self.program, &args, &env)?;
        serde_json::from_str(&stdout).map_err(|source| CloudError::Decode {
            operation: operation.to_string(),
            source,
        })
    }
}

/// The CLI reports a missing stack as a `ValidationError` ending in "does not exist".
fn missing_stack(error: CloudError, stack_name: &str) -> CloudError {
    match error {
        CloudError::Execution(ExecutionError::NonZeroExitStatus { ref stderr, .. })
            if stderr.contains("does not exist") =>
        {
            CloudError::StackNotFound(stack_name.to_string())
        }
        other => other,
    }
}

impl CloudClient for AwsCliClient {
    fn describe_stacks(
        &self,
        stack_name: Option<&str>,
        next_token: Option<&str>,
    ) -> Result<DescribeStacksPage, CloudError> {
        match stack_name {
            Some(name) => {
                let extra = ["--stack-name".to_string(), name.to_string()];
                self.call("describe-stacks", &extra)
                    .map_err(|e| missing_stack(e, name))
            }
            None => self.call("describe-stacks", &Self::paging_arguments(next_token)),
        }
    }

    fn get_template(&self, stack_name: &str) -> Result<TemplateResponse, CloudError> {
        let extra = [
            "--stack-name".to_string(),
            stack_name.to_string(),
            "--template-stage".to_string(),
            "Original".to_string(),
        ];
        self.call("get-template", &extra)
            .map_err(|e| missing_stack(e, stack_name))
    }

    fn list_exports(&self, next_token: Option<&str>) -> Result<ListExportsPage, CloudError> {
        self.call("list-exports", &Self::paging_arguments(next_token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arguments_include_region_and_profile() {
        let client = AwsCliClient::new(Some("eu-west-1".to_string()), Some("prod".to_string()));
        let args = client.arguments("list-exports", &["--max-items".to_string(), "5".to_string()]);
        assert_eq!(
            args,
            vec![
                "cloudformation", "list-exports", "--output", "json", "--region", "eu-west-1",
                "--profile", "prod", "--max-items", "5",
            ]
        );
    }

    #[test]
    fn test_paging_arguments() {
        assert_eq!(
            AwsCliClient::paging_arguments(None),
            vec!["--max-items".to_string(), PAGE_SIZE.to_string()]
        );
        let args = AwsCliClient::paging_arguments(Some("tok"));
        assert_eq!(args[2..], ["--starting-token".to_string(), "tok".to_string()]);
    }

    #[test]
    fn test_for_environment_copies_region_and_profile() {
        let config = EnvironmentConfig {
            region: Some("us-east-1".to_string()),
            profile: None,
            iam_role: Some("arn:aws:iam::1:role/x".to_string()),
        };
        let client = AwsCliClient::for_environment(&config);
        assert_eq!(client.region.as_deref(), Some("us-east-1"));
        assert_eq!(client.profile, None);
    }

    fn failed_call(stderr: &str) -> CloudError {
        CloudError::Execution(ExecutionError::NonZeroExitStatus {
            command: "aws cloudformation describe-stacks".to_string(),
            stderr: stderr.to_string(),
        })
    }

    #[test]
    fn test_missing_stack_error_is_recognised() {
        let error = failed_call(
            "An error occurred (ValidationError) when calling the DescribeStacks operation: \
             Stack with id ghost does not exist",
        );
        assert!(matches!(
            missing_stack(error, "ghost"),
            CloudError::StackNotFound(name) if name == "ghost"
        ));
    }

    #[test]
    fn test_other_failures_are_kept() {
        let error = failed_call("Unable to locate credentials.");
        assert!(matches!(
            missing_stack(error, "ghost"),
            CloudError::Execution(ExecutionError::NonZeroExitStatus { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_call_reports_undecodable_output() {
        let client = AwsCliClient::new(None, None).with_program("echo");
        let result = client.list_exports(None);
        assert!(matches!(result, Err(CloudError::Decode { operation, .. }) if operation == "list-exports"));
    }
}
