//! Live model listing through the AWS CLI.

use std::process::Command;

use serde::Deserialize;

use super::CatalogError;
use super::descriptor::vendor_of;

/// Source of raw provider model ids for one region.
pub trait ModelLister {
    fn list_model_ids(&self, region: &str) -> Result<Vec<String>, CatalogError>;
}

/// Runs `aws bedrock list-foundation-models` and reads `modelSummaries[].modelId`.
pub struct AwsCliLister {
    program: String,
}

impl AwsCliLister {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListFoundationModels {
    #[serde(default)]
    model_summaries: Vec<ModelSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelSummary {
    model_id: String,
}

impl ModelLister for AwsCliLister {
    fn list_model_ids(&self, region: &str) -> Result<Vec<String>, CatalogError> {
        log::debug!("Listing foundation models via {} in {}", self.program, region);
        let output = Command::new(&self.program)
            .args([
                "bedrock",
                "list-foundation-models",
                "--region",
                region,
                "--output",
                "json",
            ])
            .output()
            .map_err(|e| CatalogError::Unavailable(format!("{}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(CatalogError::CommandFailed {
                code: output.status.code(),
                stderr,
            });
        }

        parse_listing(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse the JSON body of a `list-foundation-models` response.
pub fn parse_listing(body: &str) -> Result<Vec<String>, CatalogError> {
    let parsed: ListFoundationModels = serde_json::from_str(body)?;
    Ok(parsed
        .model_summaries
        .into_iter()
        .map(|s| s.model_id)
        .collect())
}

/// Keep ids whose vendor namespace is in the allow-list.
pub fn filter_vendors(ids: Vec<String>, vendors: &[String]) -> Vec<String> {
    ids.into_iter()
        .filter(|id| vendor_of(id).is_some_and(|v| vendors.iter().any(|allowed| allowed == v)))
        .collect()
}
