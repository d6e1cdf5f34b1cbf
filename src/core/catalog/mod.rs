//! Model catalog: live listing with a static fallback.

mod descriptor;
mod fallback;
mod listing;

pub use descriptor::ModelDescriptor;
pub use listing::{AwsCliLister, ModelLister};

use fallback::fallback_models;
use listing::filter_vendors;

use std::collections::HashSet;

use crate::core::config::Config;

/// Reasons the live listing could not be used. Never fatal: the caller falls back.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("listing tool unavailable: {0}")]
    Unavailable(String),
    #[error("listing exited with {code:?}: {stderr}")]
    CommandFailed { code: Option<i32>, stderr: String },
    #[error("invalid listing output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("listing returned no models for vendors {0}")]
    Empty(String),
}

/// Where a catalog came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource {
    Live,
    Fallback,
}

impl std::fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Live => write!(f, "live listing"),
            Self::Fallback => write!(f, "fallback table"),
        }
    }
}

/// Ordered candidate models a run considers "should exist".
#[derive(Debug, Clone)]
pub struct Catalog {
    pub source: CatalogSource,
    pub models: Vec<ModelDescriptor>,
}

impl Catalog {
    /// Catalog built from the embedded fallback table.
    pub fn fallback() -> Self {
        Self {
            source: CatalogSource::Fallback,
            models: fallback_models().to_vec(),
        }
    }

    /// Catalog built from raw listing ids. Short names seen twice keep the first entry.
    pub fn from_listing(ids: &[String]) -> Self {
        let mut seen = HashSet::new();
        let models = ids
            .iter()
            .map(|id| describe(id))
            .filter(|m| seen.insert(m.short_name.clone()))
            .collect();
        Self {
            source: CatalogSource::Live,
            models,
        }
    }
}

/// Descriptor for a live id, preferring curated fallback metadata when the short name is known.
fn describe(raw_id: &str) -> ModelDescriptor {
    let derived = ModelDescriptor::from_listing_id(raw_id);
    match fallback::lookup(&derived.short_name) {
        Some(known) => ModelDescriptor {
            display_name: known.display_name.clone(),
            context_length: derived.context_length.or(known.context_length),
            ..derived
        },
        None => derived,
    }
}

/// Produce the catalog for this run. Any listing failure degrades to the fallback table.
pub fn fetch_catalog(config: &Config, lister: &dyn ModelLister, offline: bool) -> Catalog {
    if offline {
        log::info!("Offline mode: using fallback table");
        return Catalog::fallback();
    }
    match list_live(config, lister) {
        Ok(ids) => {
            log::info!("Live listing returned {} model id(s)", ids.len());
            Catalog::from_listing(&ids)
        }
        Err(e) => {
            log::warn!("Catalog listing failed ({}); using fallback table", e);
            Catalog::fallback()
        }
    }
}

fn list_live(config: &Config, lister: &dyn ModelLister) -> Result<Vec<String>, CatalogError> {
    let ids = lister.list_model_ids(&config.region)?;
    let ids = filter_vendors(ids, &config.vendors);
    if ids.is_empty() {
        return Err(CatalogError::Empty(config.vendors.join(",")));
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config;

    struct FixedLister(Result<Vec<&'static str>, ()>);

    impl ModelLister for FixedLister {
        fn list_model_ids(&self, _region: &str) -> Result<Vec<String>, CatalogError> {
            match &self.0 {
                Ok(ids) => Ok(ids.iter().map(|s| s.to_string()).collect()),
                Err(()) => Err(CatalogError::Unavailable("boom".to_string())),
            }
        }
    }

    fn test_config() -> Config {
        config::from_lookup(|_| None).unwrap()
    }

    #[test]
    fn failing_lister_falls_back() {
        let catalog = fetch_catalog(&test_config(), &FixedLister(Err(())), false);
        assert_eq!(catalog.source, CatalogSource::Fallback);
        assert_eq!(catalog.models.len(), 12);
    }

    #[test]
    fn empty_after_filter_falls_back() {
        let lister = FixedLister(Ok(vec!["amazon.titan-text-express-v1"]));
        let catalog = fetch_catalog(&test_config(), &lister, false);
        assert_eq!(catalog.source, CatalogSource::Fallback);
    }

    #[test]
    fn offline_skips_lister() {
        let lister = FixedLister(Ok(vec!["anthropic.claude-v2"]));
        let catalog = fetch_catalog(&test_config(), &lister, true);
        assert_eq!(catalog.source, CatalogSource::Fallback);
    }

    #[test]
    fn live_listing_is_filtered_and_ordered() {
        let lister = FixedLister(Ok(vec![
            "meta.llama3-8b-instruct-v1:0",
            "amazon.titan-text-express-v1",
            "anthropic.claude-3-opus-20240229-v1:0:200k",
        ]));
        let catalog = fetch_catalog(&test_config(), &lister, false);
        assert_eq!(catalog.source, CatalogSource::Live);
        let names: Vec<_> = catalog.models.iter().map(|m| m.short_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "meta-llama3-8b-instruct-v1-0",
                "anthropic-claude-3-opus-20240229-v1-0-200k"
            ]
        );
    }

    #[test]
    fn known_live_ids_use_curated_display_names() {
        let catalog = Catalog::from_listing(&["anthropic.claude-3-opus-20240229-v1:0:200k".to_string()]);
        assert_eq!(catalog.models[0].display_name, "Claude 3 Opus");
        assert_eq!(catalog.models[0].context_length, Some(200_000));
    }

    #[test]
    fn duplicate_short_names_keep_first() {
        let ids = vec![
            "meta.llama3-8b-instruct-v1:0".to_string(),
            "meta.llama3-8b-instruct-v1:0".to_string(),
        ];
        assert_eq!(Catalog::from_listing(&ids).models.len(), 1);
    }
}
