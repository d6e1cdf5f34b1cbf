//! Static fallback catalog, loaded from `config/fallback-models.json` (embedded at compile time).

use std::sync::OnceLock;

use serde::Deserialize;

use super::descriptor::{ModelDescriptor, context_length_from_short_name};

#[derive(Debug, Deserialize)]
struct FallbackEntry {
    short_name: String,
    provider_model_id: String,
    display_name: String,
    context_length: Option<u32>,
}

fn load_fallback_models() -> Vec<ModelDescriptor> {
    let json = include_str!("../../../config/fallback-models.json");
    let entries: Vec<FallbackEntry> =
        serde_json::from_str(json).expect("fallback-models.json must be valid");
    entries
        .into_iter()
        .map(|e| {
            // The table may omit the length when the short name carries it.
            let context_length = e
                .context_length
                .or_else(|| context_length_from_short_name(&e.short_name));
            ModelDescriptor {
                short_name: e.short_name,
                provider_model_id: e.provider_model_id,
                display_name: e.display_name,
                supports_tools: true,
                context_length,
            }
        })
        .collect()
}

static FALLBACK_MODELS: OnceLock<Vec<ModelDescriptor>> = OnceLock::new();

/// Returns the known model families, in table order.
pub fn fallback_models() -> &'static [ModelDescriptor] {
    FALLBACK_MODELS.get_or_init(load_fallback_models)
}

/// Look up fallback metadata by short name.
pub fn lookup(short_name: &str) -> Option<&'static ModelDescriptor> {
    fallback_models().iter().find(|m| m.short_name == short_name)
}
