//! # Cloud Stack Queries
//!
//! The read-only, paginated CloudFormation queries the importer depends on, behind the
//! [`CloudClient`] trait so the import logic never talks to a transport directly.
//!
//! Pagination contract: a page carries an optional continuation token; an absent or
//! empty token ends the listing.

/// The `aws` CLI transport.
pub mod aws_cli;

use crate::models::{DescribeStacksPage, Export, ListExportsPage, StackDescription, TemplateResponse};
use crate::system::executor::ExecutionError;
use thiserror::Error;

pub use aws_cli::AwsCliClient;

/// Failures of a cloud query.
#[derive(Error, Debug)]
pub enum CloudError {
    /// The transport could not run the query.
    #[error("Cloud query failed: {0}")]
    Execution(#[from] ExecutionError),
    /// The response was not the expected JSON.
    #[error("Could not decode the '{operation}' response: {source}")]
    Decode {
        /// The API operation, e.g. `list-exports`.
        operation: String,
        /// The JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// The named stack is not deployed.
    #[error("Stack '{0}' does not exist.")]
    StackNotFound(String),
}

/// Blocking access to the CloudFormation read API.
pub trait CloudClient {
    /// Describes one stack by name, or one page of all stacks when `stack_name` is `None`.
    fn describe_stacks(
        &self,
        stack_name: Option<&str>,
        next_token: Option<&str>,
    ) -> Result<DescribeStacksPage, CloudError>;

    /// Fetches the original (unprocessed) template of a stack.
    fn get_template(&self, stack_name: &str) -> Result<TemplateResponse, CloudError>;

    /// Lists one page of account-wide exports.
    fn list_exports(&self, next_token: Option<&str>) -> Result<ListExportsPage, CloudError>;
}

/// Normalises a continuation token: `None` and `""` both end pagination.
pub fn continuation(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.is_empty())
}

/// Describes a single stack, failing if the API returns none.
pub fn describe_stack(
    client: &dyn CloudClient,
    stack_name: &str,
) -> Result<StackDescription, CloudError> {
    client
        .describe_stacks(Some(stack_name), None)?
        .stacks
        .into_iter()
        .next()
        .ok_or_else(|| CloudError::StackNotFound(stack_name.to_string()))
}

/// Walks every page of `describe_stacks`, handing each stack to `visit` in API order.
pub fn for_each_stack<F>(client: &dyn CloudClient, mut visit: F) -> Result<(), CloudError>
where
    F: FnMut(StackDescription),
{
    let mut next_token: Option<String> = None;
    loop {
        let page = client.describe_stacks(None, next_token.as_deref())?;
        page.stacks.into_iter().for_each(&mut visit);
        next_token = continuation(page.next_token);
        if next_token.is_none() {
            return Ok(());
        }
    }
}

/// Collects every deployed stack across all pages.
pub fn list_all_stacks(client: &dyn CloudClient) -> Result<Vec<StackDescription>, CloudError> {
    let mut stacks = Vec::new();
    for_each_stack(client, |stack| stacks.push(stack))?;
    Ok(stacks)
}

/// Collects every export across all pages of `list_exports`.
pub fn list_all_exports(client: &dyn CloudClient) -> Result<Vec<Export>, CloudError> {
    let mut exports = Vec::new();
    let mut next_token: Option<String> = None;
    loop {
        let page = client.list_exports(next_token.as_deref())?;
        exports.extend(page.exports);
        next_token = continuation(page.next_token);
        if next_token.is_none() {
            return Ok(exports);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StubCloudClient, export, stack};

    #[test]
    fn test_continuation_treats_empty_as_end() {
        assert_eq!(continuation(None), None);
        assert_eq!(continuation(Some(String::new())), None);
        assert_eq!(continuation(Some("t".to_string())), Some("t".to_string()));
    }

    #[test]
    fn test_list_all_stacks_follows_tokens() {
        let client = StubCloudClient::new()
            .with_stack_page(vec![stack("a"), stack("b")], Some("page-2"))
            .with_stack_page(vec![stack("c")], Some(""));
        let calls = client.calls();

        let names: Vec<String> = list_all_stacks(&client)
            .unwrap()
            .into_iter()
            .map(|s| s.stack_name)
            .collect();

        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(
            *calls.borrow(),
            vec![
                "describe_stacks(None, None)".to_string(),
                "describe_stacks(None, Some(\"page-2\"))".to_string(),
            ]
        );
    }

    #[test]
    fn test_list_all_exports_follows_tokens() {
        let client = StubCloudClient::new()
            .with_export_page(vec![export("n1", "v1")], Some("next"))
            .with_export_page(vec![export("n2", "v2")], None);

        let exports = list_all_exports(&client).unwrap();

        assert_eq!(exports.len(), 2);
        assert_eq!(exports[1].name, "n2");
    }

    #[test]
    fn test_describe_stack_reports_missing_stack() {
        let client = StubCloudClient::new();
        let result = describe_stack(&client, "ghost");
        assert!(matches!(result, Err(CloudError::StackNotFound(name)) if name == "ghost"));
    }
}
