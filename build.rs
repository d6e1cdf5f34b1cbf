//! Build script: validates fallback-models.json at compile time.

use std::collections::HashSet;
use std::path::PathBuf;

fn main() {
    let manifest_dir =
        std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR set by Cargo");
    let table_path: PathBuf = [&manifest_dir, "config", "fallback-models.json"]
        .iter()
        .collect();
    println!("cargo:rerun-if-changed={}", table_path.display());

    let json = std::fs::read_to_string(&table_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read {}: {}. fallback-models.json must exist and be valid.",
            table_path.display(),
            e
        )
    });
    #[derive(serde::Deserialize)]
    #[allow(dead_code)]
    struct FallbackEntry {
        short_name: String,
        provider_model_id: String,
        display_name: String,
        context_length: Option<u32>,
    }
    let entries: Vec<FallbackEntry> = serde_json::from_str(&json).unwrap_or_else(|e| {
        panic!(
            "fallback-models.json is invalid JSON: {}. Fix the file and rebuild.",
            e
        )
    });

    let mut short_names = HashSet::new();
    let mut provider_ids = HashSet::new();
    for entry in &entries {
        if entry
            .short_name
            .chars()
            .any(|c| c == '.' || c == ':' || c.is_whitespace())
        {
            panic!(
                "fallback-models.json: short_name '{}' must not contain '.', ':' or whitespace",
                entry.short_name
            );
        }
        if !short_names.insert(entry.short_name.as_str()) {
            panic!(
                "fallback-models.json: duplicate short_name '{}'",
                entry.short_name
            );
        }
        if !provider_ids.insert(entry.provider_model_id.as_str()) {
            panic!(
                "fallback-models.json: provider_model_id '{}' is listed twice",
                entry.provider_model_id
            );
        }
    }
}
