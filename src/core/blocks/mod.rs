//! Block files on disk: scanning, rendering, capability backfill, and validation.

mod backfill;
mod render;
mod validation;

pub use backfill::patch_capability;
pub use render::render_block;
pub use validation::{Issue, validate};

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use semver::Version;
use serde::Deserialize;
use walkdir::WalkDir;

/// Capability value marking a model as tool-capable.
pub const TOOL_USE: &str = "tool_use";
/// Provider tag written into every block.
pub const PROVIDER_TAG: &str = "bedrock";
/// Schema literal written into every block.
pub const SCHEMA: &str = "v1";
/// File extension for new blocks.
pub const EXTENSION: &str = "yaml";

#[derive(Debug, thiserror::Error)]
pub enum BlockError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to scan blocks directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),
    #[error("Cannot patch block: {0}")]
    Unpatchable(String),
}

/// YAML structure on disk. Every field is optional so incomplete blocks still load.
#[derive(Debug, Default, Deserialize)]
pub struct BlockDocument {
    pub name: Option<String>,
    pub version: Option<String>,
    pub schema: Option<String>,
    pub models: Option<Vec<ModelEntry>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ModelEntry {
    pub name: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub capabilities: Option<Vec<String>>,
}

impl ModelEntry {
    fn has_tool_use(&self) -> bool {
        self.capabilities
            .as_ref()
            .is_some_and(|caps| caps.iter().any(|c| c == TOOL_USE))
    }
}

/// One existing block file.
#[derive(Debug)]
pub struct Block {
    pub path: PathBuf,
    pub short_name: String,
    pub contents: String,
    /// Provider ids embedded in the file (read, not derived from the name).
    pub provider_ids: Vec<String>,
    pub version: Option<Version>,
    pub has_tool_use: bool,
    /// Parsed document, or the YAML error when the file does not parse.
    pub document: Result<BlockDocument, String>,
}

fn model_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?m)^\s*(?:-\s+)?model:\s*["']?([^"'\s#]+)"#).expect("valid regex")
    })
}

fn version_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?m)^version:\s*["']?([^"'\s#]+)"#).expect("valid regex"))
}

impl Block {
    /// Build a block from its path and contents.
    pub fn from_contents(path: PathBuf, contents: String) -> Self {
        let short_name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let document = serde_yaml::from_str::<BlockDocument>(&contents).map_err(|e| e.to_string());
        let (provider_ids, raw_version, has_tool_use) = match &document {
            Ok(doc) => {
                let models = doc.models.as_deref().unwrap_or_default();
                let ids = models.iter().filter_map(|m| m.model.clone()).collect();
                let tools = models.iter().any(ModelEntry::has_tool_use);
                (ids, doc.version.clone(), tools)
            }
            Err(e) => {
                log::warn!(
                    "{} is not valid YAML ({}); falling back to a line scan",
                    path.display(),
                    e
                );
                let ids = model_line_re()
                    .captures_iter(&contents)
                    .map(|c| c[1].to_string())
                    .collect();
                let version = version_line_re()
                    .captures(&contents)
                    .map(|c| c[1].to_string());
                (ids, version, contents.contains(TOOL_USE))
            }
        };

        let version = raw_version.and_then(|v| match Version::parse(v.trim()) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                log::debug!("{}: unparseable version {:?}: {}", path.display(), v, e);
                None
            }
        });

        Self {
            path,
            short_name,
            contents,
            provider_ids,
            version,
            has_tool_use,
            document,
        }
    }
}

/// Existing blocks in one directory, sorted by file name.
#[derive(Debug, Default)]
pub struct BlockSet {
    pub dir: PathBuf,
    pub blocks: Vec<Block>,
}

fn is_block_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
}

impl BlockSet {
    /// Scan `dir` (non-recursive) for block files. A missing directory is an empty set.
    pub fn scan(dir: &Path) -> Result<Self, BlockError> {
        if !dir.exists() {
            log::info!("{} does not exist yet; no existing blocks", dir.display());
            return Ok(Self {
                dir: dir.to_path_buf(),
                blocks: Vec::new(),
            });
        }
        if !dir.is_dir() {
            return Err(BlockError::NotADirectory(dir.to_path_buf()));
        }

        let mut blocks = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry?;
            if !entry.file_type().is_file() || !is_block_file(entry.path()) {
                continue;
            }
            let path = entry.into_path();
            let contents = fs::read_to_string(&path).map_err(|source| BlockError::Read {
                path: path.clone(),
                source,
            })?;
            blocks.push(Block::from_contents(path, contents));
        }
        log::debug!("Scanned {} block(s) in {}", blocks.len(), dir.display());

        Ok(Self {
            dir: dir.to_path_buf(),
            blocks,
        })
    }

    pub fn short_names(&self) -> BTreeSet<&str> {
        self.blocks.iter().map(|b| b.short_name.as_str()).collect()
    }

    pub fn provider_ids(&self) -> BTreeSet<&str> {
        self.blocks
            .iter()
            .flat_map(|b| b.provider_ids.iter().map(String::as_str))
            .collect()
    }

    /// Highest parseable `version` across blocks.
    pub fn max_version(&self) -> Option<&Version> {
        self.blocks.iter().filter_map(|b| b.version.as_ref()).max()
    }

    /// Blocks with at least one model that lack the tool-use capability marker.
    pub fn missing_capability(&self) -> Vec<&Block> {
        self.blocks
            .iter()
            .filter(|b| !b.has_tool_use && !b.provider_ids.is_empty())
            .collect()
    }

    /// Path a new block with this short name is written to.
    pub fn path_for(&self, short_name: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", short_name, EXTENSION))
    }
}
