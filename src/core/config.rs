//! Runtime configuration from environment variables (after `.env` is loaded).

use std::env;
use std::path::PathBuf;

/// Default directory holding the block files.
pub const DEFAULT_BLOCKS_DIR: &str = "blocks";
/// Region the catalog listing is scoped to.
pub const DEFAULT_REGION: &str = "us-east-1";
/// Vendor namespaces kept from the live listing.
pub const DEFAULT_VENDORS: &str = "anthropic,meta";
/// AWS CLI binary used for the live listing.
pub const DEFAULT_AWS_CLI: &str = "aws";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub blocks_dir: PathBuf,
    pub region: String,
    pub vendors: Vec<String>,
    pub aws_cli: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("BEDROCK_VENDORS must name at least one vendor namespace")]
    EmptyVendors,
    #[error("BEDROCK_REGION must not be empty")]
    EmptyRegion,
}

/// Overrides from CLI flags; `None` keeps the environment value.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub blocks_dir: Option<PathBuf>,
    pub region: Option<String>,
}

/// Load configuration from environment. Returns an error on unusable values.
pub fn load() -> Result<Config, ConfigError> {
    from_lookup(|key| env::var(key).ok())
}

/// Build a config from any key lookup (the environment in production, a map in tests).
pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

    let blocks_dir = non_empty("BEDROCK_BLOCKS_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_BLOCKS_DIR));
    let region = non_empty("BEDROCK_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string());
    let vendors = parse_vendors(
        &lookup("BEDROCK_VENDORS").unwrap_or_else(|| DEFAULT_VENDORS.to_string()),
    )?;
    let aws_cli = non_empty("BEDROCK_AWS_CLI").unwrap_or_else(|| DEFAULT_AWS_CLI.to_string());

    Ok(Config {
        blocks_dir,
        region,
        vendors,
        aws_cli,
    })
}

fn parse_vendors(raw: &str) -> Result<Vec<String>, ConfigError> {
    let vendors: Vec<String> = raw
        .split(',')
        .map(|v| v.trim().trim_end_matches('.').to_lowercase())
        .filter(|v| !v.is_empty())
        .collect();
    if vendors.is_empty() {
        return Err(ConfigError::EmptyVendors);
    }
    Ok(vendors)
}

impl Config {
    /// Apply CLI flag overrides on top of the environment.
    pub fn with_overrides(mut self, overrides: Overrides) -> Result<Self, ConfigError> {
        if let Some(dir) = overrides.blocks_dir {
            self.blocks_dir = dir;
        }
        if let Some(region) = overrides.region {
            if region.trim().is_empty() {
                return Err(ConfigError::EmptyRegion);
            }
            self.region = region;
        }
        Ok(self)
    }
}
