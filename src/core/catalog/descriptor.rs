//! Model descriptors and the derivations from provider identifiers.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Everything needed to render one block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub short_name: String,
    pub provider_model_id: String,
    pub display_name: String,
    pub supports_tools: bool,
    pub context_length: Option<u32>,
}

impl ModelDescriptor {
    /// Derive a descriptor from a raw listing id such as
    /// `anthropic.claude-3-opus-20240229-v1:0:200k`.
    ///
    /// The `:<N>k` suffix becomes the context length and is dropped from the
    /// provider id; the short name keeps it (`...-v1-0-200k`).
    pub fn from_listing_id(raw_id: &str) -> Self {
        let short_name = short_name_for(raw_id);
        let context_length = context_length_from_id(raw_id);
        let provider_model_id = match context_suffix_re().find(raw_id) {
            Some(m) if context_length.is_some() => raw_id[..m.start()].to_string(),
            _ => raw_id.to_string(),
        };
        let display_name = display_name_for(&short_name);
        Self {
            short_name,
            provider_model_id,
            display_name,
            supports_tools: true,
            context_length,
        }
    }
}

fn context_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r":(\d+)k$").expect("valid regex"))
}

fn short_context_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-(\d+)k$").expect("valid regex"))
}

/// Filesystem-safe key for a provider id: `.` and `:` become `-`.
pub fn short_name_for(raw_id: &str) -> String {
    raw_id.replace(['.', ':'], "-")
}

fn thousands(re: &Regex, s: &str) -> Option<u32> {
    let caps = re.captures(s)?;
    caps[1].parse::<u32>().ok()?.checked_mul(1_000)
}

/// Context length from an explicit `:<N>k` suffix on a provider id.
pub fn context_length_from_id(raw_id: &str) -> Option<u32> {
    thousands(context_suffix_re(), raw_id)
}

/// Context length from a `-<N>k` suffix on a short name.
pub fn context_length_from_short_name(short_name: &str) -> Option<u32> {
    thousands(short_context_suffix_re(), short_name)
}

/// Human-readable name: vendor prefix stripped, words title-cased.
///
/// `anthropic-claude-3-haiku-20240307-v1-0` -> `Claude 3 Haiku 20240307 V1 0`
pub fn display_name_for(short_name: &str) -> String {
    let rest = short_name
        .split_once('-')
        .map(|(_, rest)| rest)
        .filter(|rest| !rest.is_empty())
        .unwrap_or(short_name);
    rest.split('-')
        .filter(|w| !w.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Vendor namespace of a provider id (`anthropic` for `anthropic.claude-...`).
pub fn vendor_of(provider_id: &str) -> Option<&str> {
    provider_id
        .split_once('.')
        .map(|(vendor, _)| vendor)
        .filter(|v| !v.is_empty())
}
