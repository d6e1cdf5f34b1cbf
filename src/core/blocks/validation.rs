//! Block validation: required keys, parseable versions, and unique provider ids.

use std::collections::BTreeMap;
use std::path::PathBuf;

use semver::Version;

use super::{Block, BlockSet};

/// One problem found in one block file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub path: PathBuf,
    pub message: String,
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

fn issue(block: &Block, message: impl Into<String>) -> Issue {
    Issue {
        path: block.path.clone(),
        message: message.into(),
    }
}

fn check_block(block: &Block, issues: &mut Vec<Issue>) {
    let doc = match &block.document {
        Ok(doc) => doc,
        Err(e) => {
            issues.push(issue(block, format!("invalid YAML: {}", e)));
            return;
        }
    };

    for (key, present) in [
        ("name", doc.name.is_some()),
        ("version", doc.version.is_some()),
        ("schema", doc.schema.is_some()),
        ("models", doc.models.is_some()),
    ] {
        if !present {
            issues.push(issue(block, format!("missing required key '{}'", key)));
        }
    }

    if let Some(v) = &doc.version
        && Version::parse(v.trim()).is_err()
    {
        issues.push(issue(block, format!("version '{}' is not semver", v)));
    }

    let models = doc.models.as_deref().unwrap_or_default();
    if doc.models.is_some() && models.is_empty() {
        issues.push(issue(block, "models list is empty"));
    }
    for (i, m) in models.iter().enumerate() {
        for (key, present) in [
            ("name", m.name.is_some()),
            ("provider", m.provider.is_some()),
            ("model", m.model.is_some()),
        ] {
            if !present {
                issues.push(issue(block, format!("models[{}] missing '{}'", i, key)));
            }
        }
    }
}

/// Validate every block, then check that no provider id is registered by two files.
pub fn validate(set: &BlockSet) -> Vec<Issue> {
    let mut issues = Vec::new();
    for block in &set.blocks {
        check_block(block, &mut issues);
    }

    let mut owners: BTreeMap<&str, Vec<&Block>> = BTreeMap::new();
    for block in &set.blocks {
        for id in &block.provider_ids {
            let files = owners.entry(id.as_str()).or_default();
            if !files.iter().any(|b| b.path == block.path) {
                files.push(block);
            }
        }
    }
    for (id, files) in owners {
        if let [first, rest @ ..] = files.as_slice() {
            for block in rest {
                issues.push(issue(
                    block,
                    format!(
                        "provider id '{}' is also registered by {}",
                        id, first.short_name
                    ),
                ));
            }
        }
    }
    issues
}
