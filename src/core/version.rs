//! Shared block version: a single manifest next to the blocks, bumped once per run.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use semver::Version;
use serde::{Deserialize, Serialize};

/// Manifest file name inside the blocks directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Version used when nothing on disk carries one.
pub const INITIAL_VERSION: Version = Version::new(1, 0, 0);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    pub updated_at: String,
}

#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    #[error("Failed to read manifest: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid manifest JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid version '{value}': {source}")]
    Invalid {
        value: String,
        source: semver::Error,
    },
}

/// Where the next version came from (shown in the run summary).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSource {
    Explicit,
    Manifest,
    Blocks,
    Initial,
}

impl std::fmt::Display for VersionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Explicit => write!(f, "--set-version"),
            Self::Manifest => write!(f, "manifest"),
            Self::Blocks => write!(f, "existing blocks"),
            Self::Initial => write!(f, "initial"),
        }
    }
}

pub fn manifest_path(blocks_dir: &Path) -> PathBuf {
    blocks_dir.join(MANIFEST_FILE)
}

/// Load the manifest. Returns None when the file does not exist yet (first run).
pub fn load_manifest(path: &Path) -> Result<Option<Manifest>, VersionError> {
    let data = match fs::read_to_string(path) {
        Ok(d) => d,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&data)?))
}

/// Serialized manifest contents for `version`, stamped with the current time.
pub fn render_manifest(version: &Version) -> Result<String, VersionError> {
    let manifest = Manifest {
        version: version.to_string(),
        updated_at: chrono::Utc::now().to_rfc3339(),
    };
    let mut json = serde_json::to_string_pretty(&manifest)?;
    json.push('\n');
    Ok(json)
}

fn parse(value: &str) -> Result<Version, VersionError> {
    Version::parse(value.trim()).map_err(|source| VersionError::Invalid {
        value: value.to_string(),
        source,
    })
}

/// Next patch level; pre-release and build metadata are dropped.
pub fn bump_patch(v: &Version) -> Version {
    Version::new(v.major, v.minor, v.patch + 1)
}

/// Pick the version for this run: explicit input, else one patch above the higher of
/// the manifest and the block scan, else 1.0.0.
pub fn resolve_next(
    explicit: Option<&str>,
    manifest: Option<&Manifest>,
    blocks_max: Option<&Version>,
) -> Result<(Version, VersionSource), VersionError> {
    if let Some(value) = explicit {
        return Ok((parse(value)?, VersionSource::Explicit));
    }
    let recorded = manifest.map(|m| parse(&m.version)).transpose()?;
    let current = match (recorded, blocks_max) {
        (Some(m), Some(b)) if b > &m => Some((b.clone(), VersionSource::Blocks)),
        (Some(m), _) => Some((m, VersionSource::Manifest)),
        (None, Some(b)) => Some((b.clone(), VersionSource::Blocks)),
        (None, None) => None,
    };
    Ok(match current {
        Some((v, source)) => (bump_patch(&v), source),
        None => (INITIAL_VERSION, VersionSource::Initial),
    })
}
