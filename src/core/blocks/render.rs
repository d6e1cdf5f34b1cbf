//! Deterministic rendering of a new block file.

use semver::Version;

use super::{PROVIDER_TAG, SCHEMA, TOOL_USE};
use crate::core::catalog::ModelDescriptor;

/// Fixed role list for every block.
const ROLES: &[&str] = &["chat", "edit", "apply"];

/// `env` placeholders resolved by the consumer of the block.
const ENV: &[(&str, &str)] = &[
    ("region", "${{ inputs.AWS_REGION }}"),
    ("profile", "${{ inputs.AWS_PROFILE }}"),
];

/// Render the exact file contents for a model at `version`.
pub fn render_block(model: &ModelDescriptor, version: &Version) -> String {
    let mut out = String::new();
    out.push_str(&format!("name: {}\n", model.display_name));
    out.push_str(&format!("version: {}\n", version));
    out.push_str(&format!("schema: {}\n", SCHEMA));
    out.push_str("models:\n");
    out.push_str(&format!("  - name: {}\n", model.display_name));
    out.push_str(&format!("    provider: {}\n", PROVIDER_TAG));
    out.push_str(&format!("    model: {}\n", model.provider_model_id));
    out.push_str("    env:\n");
    for (key, value) in ENV {
        out.push_str(&format!("      {}: {}\n", key, value));
    }
    out.push_str("    roles:\n");
    for role in ROLES {
        out.push_str(&format!("      - {}\n", role));
    }
    if model.supports_tools {
        out.push_str("    capabilities:\n");
        out.push_str(&format!("      - {}\n", TOOL_USE));
    }
    if let Some(len) = model.context_length {
        out.push_str("    defaultCompletionOptions:\n");
        out.push_str(&format!("      contextLength: {}\n", len));
    }
    out
}
