//! Reconciliation: compare the catalog with existing blocks, then create or backfill, bump, commit.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use semver::Version;

use crate::core::blocks::{self, BlockError, BlockSet};
use crate::core::catalog::{self, Catalog, CatalogSource, ModelDescriptor, ModelLister};
use crate::core::config::Config;
use crate::core::git::{CommitError, Committer};
use crate::core::version::{self, VersionError, VersionSource};
use crate::core::writer::BlockWriter;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Blocks(#[from] BlockError),
    #[error(transparent)]
    Version(#[from] VersionError),
    #[error("Failed to write manifest {path}: {source}")]
    Manifest { path: PathBuf, source: io::Error },
    #[error("Commit failed: {0}")]
    Commit(#[from] CommitError),
}

/// Run options from the CLI.
#[derive(Debug, Default, Clone)]
pub struct SyncOptions {
    pub offline: bool,
    pub dry_run: bool,
    pub set_version: Option<String>,
}

/// Catalog candidate skipped because its provider id is already registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skip {
    pub short_name: String,
    pub provider_model_id: String,
}

/// Existing block that needs the capability marker.
#[derive(Debug, Clone)]
pub struct BackfillTarget {
    pub path: PathBuf,
    pub short_name: String,
    pub contents: String,
}

#[derive(Debug, Clone)]
pub enum Action {
    Create(Vec<ModelDescriptor>),
    Backfill(Vec<BackfillTarget>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Create,
    Backfill,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Backfill => write!(f, "capability backfill"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Plan {
    pub action: Action,
    pub skipped: Vec<Skip>,
}

impl Plan {
    pub fn mode(&self) -> Mode {
        match self.action {
            Action::Create(_) => Mode::Create,
            Action::Backfill(_) => Mode::Backfill,
        }
    }

    /// Short names the plan would touch, in order.
    pub fn targets(&self) -> Vec<String> {
        match &self.action {
            Action::Create(models) => models.iter().map(|m| m.short_name.clone()).collect(),
            Action::Backfill(targets) => targets.iter().map(|t| t.short_name.clone()).collect(),
        }
    }
}

/// Compute the minimal set of actions. Create and backfill are mutually exclusive.
pub fn plan(catalog: &Catalog, set: &BlockSet) -> Plan {
    let existing_names = set.short_names();
    let mut known_ids: BTreeSet<String> =
        set.provider_ids().into_iter().map(String::from).collect();

    let mut missing = Vec::new();
    let mut skipped = Vec::new();
    for model in &catalog.models {
        if existing_names.contains(model.short_name.as_str()) {
            continue;
        }
        if !known_ids.insert(model.provider_model_id.clone()) {
            log::info!(
                "skip {} - {} already present under a different name",
                model.short_name,
                model.provider_model_id
            );
            skipped.push(Skip {
                short_name: model.short_name.clone(),
                provider_model_id: model.provider_model_id.clone(),
            });
            continue;
        }
        missing.push(model.clone());
    }

    let action = if missing.is_empty() {
        Action::Backfill(
            set.missing_capability()
                .into_iter()
                .map(|b| BackfillTarget {
                    path: b.path.clone(),
                    short_name: b.short_name.clone(),
                    contents: b.contents.clone(),
                })
                .collect(),
        )
    } else {
        Action::Create(missing)
    };
    Plan { action, skipped }
}

/// Outcome of one run, printed as the summary.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub catalog_source: CatalogSource,
    pub catalog_size: usize,
    pub mode: Mode,
    pub version: Version,
    pub version_source: VersionSource,
    pub dry_run: bool,
    pub planned: Vec<String>,
    pub written: Vec<String>,
    pub failed: Vec<(String, String)>,
    pub skipped: Vec<Skip>,
    pub committed: bool,
}

/// Commit message for a run that touched `names`.
pub fn commit_message(mode: Mode, names: &[String], version: &Version) -> String {
    let subject = match mode {
        Mode::Create => format!("Add {} Bedrock model block(s)", names.len()),
        Mode::Backfill => format!("Add tool_use capability to {} block(s)", names.len()),
    };
    let body: Vec<String> = names.iter().map(|n| format!("- {}", n)).collect();
    format!("{}\n\n{}\n\nVersion: {}", subject, body.join("\n"), version)
}

/// Collaborators for applying a plan.
pub struct Effects<'a> {
    pub writer: &'a dyn BlockWriter,
    /// `None` leaves the written files uncommitted.
    pub committer: Option<&'a dyn Committer>,
}

/// Full run: catalog, scan, version, plan, then apply unless dry-run.
pub fn sync(
    config: &Config,
    options: &SyncOptions,
    lister: &dyn ModelLister,
    effects: &Effects<'_>,
) -> Result<RunReport, SyncError> {
    let catalog = catalog::fetch_catalog(config, lister, options.offline);
    log::info!(
        "Catalog: {} model(s) from {}",
        catalog.models.len(),
        catalog.source
    );

    let set = BlockSet::scan(&config.blocks_dir)?;
    let manifest_path = version::manifest_path(&config.blocks_dir);
    let manifest = version::load_manifest(&manifest_path)?;
    let (next_version, version_source) = version::resolve_next(
        options.set_version.as_deref(),
        manifest.as_ref(),
        set.max_version(),
    )?;

    let plan = plan(&catalog, &set);
    let mut report = RunReport {
        catalog_source: catalog.source,
        catalog_size: catalog.models.len(),
        mode: plan.mode(),
        version: next_version.clone(),
        version_source,
        dry_run: options.dry_run,
        planned: plan.targets(),
        written: Vec::new(),
        failed: Vec::new(),
        skipped: plan.skipped.clone(),
        committed: false,
    };
    if options.dry_run {
        return Ok(report);
    }

    let ctx = ApplyContext {
        set: &set,
        version: &next_version,
        manifest_path,
        effects,
    };
    let applied = apply(&plan, &ctx)?;
    report.written = applied.written;
    report.failed = applied.failed;
    report.committed = applied.committed;
    Ok(report)
}

/// Inputs for applying a plan.
pub struct ApplyContext<'a> {
    pub set: &'a BlockSet,
    pub version: &'a Version,
    pub manifest_path: PathBuf,
    pub effects: &'a Effects<'a>,
}

/// What an applied plan touched.
#[derive(Debug, Default)]
pub struct Applied {
    pub written: Vec<String>,
    pub failed: Vec<(String, String)>,
    pub committed: bool,
}

impl Applied {
    fn record(
        &mut self,
        writer: &dyn BlockWriter,
        path: &Path,
        contents: &str,
        short_name: &str,
    ) -> bool {
        match writer.write(path, contents) {
            Ok(()) => {
                log::info!("wrote {}", path.display());
                self.written.push(short_name.to_string());
                true
            }
            Err(e) => {
                log::error!("Failed to write {}: {}", path.display(), e);
                self.failed.push((short_name.to_string(), e.to_string()));
                false
            }
        }
    }
}

/// Write the planned files, then the manifest, then commit. Per-item failures are collected.
pub fn apply(plan: &Plan, ctx: &ApplyContext<'_>) -> Result<Applied, SyncError> {
    let writer = ctx.effects.writer;
    let mut applied = Applied::default();
    let mut touched: Vec<PathBuf> = Vec::new();

    match &plan.action {
        Action::Create(models) => {
            for model in models {
                let path = ctx.set.path_for(&model.short_name);
                let contents = blocks::render_block(model, ctx.version);
                if applied.record(writer, &path, &contents, &model.short_name) {
                    touched.push(path);
                }
            }
        }
        Action::Backfill(targets) => {
            for target in targets {
                match blocks::patch_capability(&target.contents, ctx.version) {
                    Ok(contents) => {
                        if applied.record(writer, &target.path, &contents, &target.short_name) {
                            touched.push(target.path.clone());
                        }
                    }
                    Err(e) => {
                        log::error!("{}: {}", target.short_name, e);
                        applied.failed.push((target.short_name.clone(), e.to_string()));
                    }
                }
            }
        }
    }

    if touched.is_empty() {
        log::info!("Nothing written; skipping version bump and commit");
        return Ok(applied);
    }

    let manifest_contents = version::render_manifest(ctx.version)?;
    writer
        .write(&ctx.manifest_path, &manifest_contents)
        .map_err(|source| SyncError::Manifest {
            path: ctx.manifest_path.clone(),
            source,
        })?;
    touched.push(ctx.manifest_path.clone());

    if let Some(committer) = ctx.effects.committer {
        let message = commit_message(plan.mode(), &applied.written, ctx.version);
        committer.commit(&touched, &message)?;
        applied.committed = true;
        log::info!("Committed {} file(s)", touched.len());
    }
    Ok(applied)
}
