// src/models.rs

//! Wire models for the read-only cloud stack queries.
//!
//! Field names follow the PascalCase shape returned by the CloudFormation API, so the
//! same structs decode both real CLI output and hand-written test fixtures.

use serde::{Deserialize, Serialize};

// --- describe_stacks ---

/// One page of a `describe_stacks` listing.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeStacksPage {
    /// The stacks of this page.
    #[serde(default)]
    pub stacks: Vec<StackDescription>,
    /// Continuation token; absent or empty on the last page.
    #[serde(default)]
    pub next_token: Option<String>,
}

/// The runtime metadata of a deployed stack.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct StackDescription {
    /// The deployed stack name.
    pub stack_name: String,
    /// Live parameter values.
    #[serde(default)]
    pub parameters: Vec<StackParameter>,
    /// Stack tags, in API order.
    #[serde(default)]
    pub tags: Vec<StackTag>,
    /// Declared outputs with their current values.
    #[serde(default)]
    pub outputs: Vec<StackOutput>,
    /// The service role, if any.
    #[serde(rename = "RoleARN", default)]
    pub role_arn: Option<String>,
    /// Termination protection.
    #[serde(default)]
    pub enable_termination_protection: Option<bool>,
}

impl StackDescription {
    /// Whether termination protection is switched on.
    pub fn is_protected(&self) -> bool {
        self.enable_termination_protection.unwrap_or(false)
    }

    /// The service role, when one is set and non-empty.
    pub fn service_role(&self) -> Option<&str> {
        self.role_arn.as_deref().filter(|arn| !arn.is_empty())
    }
}

/// A live parameter value.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct StackParameter {
    /// The parameter name.
    pub parameter_key: String,
    /// The value; `****` for `NoEcho` parameters.
    #[serde(default)]
    pub parameter_value: String,
}

/// A stack tag.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct StackTag {
    /// Tag key.
    pub key: String,
    /// Tag value.
    pub value: String,
}

/// A stack output.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct StackOutput {
    /// The output's logical name.
    pub output_key: String,
    /// Its current value.
    pub output_value: String,
    /// Set when the output is also exported.
    #[serde(default)]
    pub export_name: Option<String>,
    /// Free text from the template.
    #[serde(default)]
    pub description: Option<String>,
}

impl StackOutput {
    /// Exported outputs are reachable through the export listing instead.
    pub fn is_exported(&self) -> bool {
        self.export_name.as_deref().is_some_and(|name| !name.is_empty())
    }
}

// --- list_exports ---

/// One page of a `list_exports` listing.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ListExportsPage {
    /// The exports of this page.
    #[serde(default)]
    pub exports: Vec<Export>,
    /// Continuation token; absent or empty on the last page.
    #[serde(default)]
    pub next_token: Option<String>,
}

/// An account-wide export.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Export {
    /// The export name, unique per account and region.
    pub name: String,
    /// The exported value.
    pub value: String,
    /// The id of the stack that exports it.
    #[serde(default)]
    pub exporting_stack_id: Option<String>,
}

// --- get_template ---

/// The `get_template` response.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateResponse {
    /// The original template.
    pub template_body: TemplateBody,
}

/// A template as returned by the API: YAML/JSON text, or an already-decoded JSON document.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum TemplateBody {
    /// Raw JSON or YAML text.
    Text(String),
    /// A JSON document the CLI already decoded.
    Document(serde_json::Value),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_describe_stacks_page() {
        let json = r#"{
            "Stacks": [{
                "StackName": "vpc",
                "RoleARN": "arn:aws:iam::123:role/deployer",
                "EnableTerminationProtection": true,
                "Parameters": [{"ParameterKey": "Cidr", "ParameterValue": "10.0.0.0/16"}],
                "Outputs": [
                    {"OutputKey": "VpcId", "OutputValue": "vpc-1"},
                    {"OutputKey": "SubnetId", "OutputValue": "subnet-1", "ExportName": "shared-subnet"}
                ],
                "Tags": [{"Key": "team", "Value": "platform"}]
            }],
            "NextToken": "abc"
        }"#;

        let page: DescribeStacksPage = serde_json::from_str(json).unwrap();

        assert_eq!(page.next_token.as_deref(), Some("abc"));
        let stack = &page.stacks[0];
        assert_eq!(stack.stack_name, "vpc");
        assert!(stack.is_protected());
        assert_eq!(stack.service_role(), Some("arn:aws:iam::123:role/deployer"));
        assert_eq!(stack.parameters[0].parameter_value, "10.0.0.0/16");
        assert!(!stack.outputs[0].is_exported());
        assert!(stack.outputs[1].is_exported());
        assert_eq!(stack.tags[0].key, "team");
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let stack: StackDescription = serde_json::from_str(r#"{"StackName": "bare"}"#).unwrap();
        assert!(!stack.is_protected());
        assert_eq!(stack.service_role(), None);
        assert!(stack.parameters.is_empty());
        assert!(stack.tags.is_empty());
    }

    #[test]
    fn test_empty_role_is_not_a_service_role() {
        let stack = StackDescription {
            role_arn: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(stack.service_role(), None);
    }

    #[test]
    fn test_template_body_shapes() {
        let text: TemplateResponse =
            serde_json::from_str(r#"{"TemplateBody": "Resources: {}\n"}"#).unwrap();
        assert_eq!(text.template_body, TemplateBody::Text("Resources: {}\n".to_string()));

        let doc: TemplateResponse =
            serde_json::from_str(r#"{"TemplateBody": {"Resources": {}}}"#).unwrap();
        assert!(matches!(doc.template_body, TemplateBody::Document(_)));
    }
}
