//! CLI command handlers: sync, catalog, check, config.
//!
//! Results go to stdout as plain text; failures print to stderr and exit 1.

use std::path::Path;

use crate::core::app;
use crate::core::blocks::{self, BlockSet};
use crate::core::catalog::{self, AwsCliLister};
use crate::core::config::Config;
use crate::core::git::{self, Committer, GitCommitter};
use crate::core::reconcile::{self, Effects, RunReport, SyncOptions};
use crate::core::util::{filter_by_query, format_context};
use crate::core::version;
use crate::core::writer::FsWriter;

/// Closest existing ancestor of `path` (the path itself when it exists).
fn existing_ancestor(path: &Path) -> &Path {
    path.ancestors()
        .find(|p| !p.as_os_str().is_empty() && p.exists())
        .unwrap_or(Path::new("."))
}

/// Run the `sync` command: reconcile the blocks directory with the catalog.
pub fn run_sync(config: &Config, options: &SyncOptions, commit: bool) {
    let commit = commit && !options.dry_run;
    let work_dir = existing_ancestor(&config.blocks_dir).to_path_buf();
    if commit && !git::is_inside_work_tree(&work_dir) {
        eprintln!(
            "Error: {} is not inside a git work tree (use --no-commit to skip committing)",
            config.blocks_dir.display()
        );
        std::process::exit(1);
    }

    let lister = AwsCliLister::new(&config.aws_cli);
    let git_committer = GitCommitter::new(work_dir);
    let committer: Option<&dyn Committer> = if commit { Some(&git_committer) } else { None };
    let effects = Effects {
        writer: &FsWriter,
        committer,
    };

    match reconcile::sync(config, options, &lister, &effects) {
        Ok(report) => print_report(&report),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_report(report: &RunReport) {
    println!(
        "Catalog:   {} model(s) from {}",
        report.catalog_size, report.catalog_source
    );
    println!("Mode:      {}", report.mode);
    println!(
        "Version:   {} (from {})",
        report.version, report.version_source
    );

    if report.dry_run {
        if report.planned.is_empty() {
            println!("Dry run:   nothing to do");
        } else {
            println!("Dry run:   would touch {} block(s)", report.planned.len());
            for name in &report.planned {
                println!("  {}", name);
            }
        }
    } else {
        println!("Written:   {}", report.written.len());
        for name in &report.written {
            println!("  {}", name);
        }
        println!("Failed:    {}", report.failed.len());
        for (name, reason) in &report.failed {
            println!("  {}: {}", name, reason);
        }
    }

    println!("Skipped:   {}", report.skipped.len());
    for skip in &report.skipped {
        println!("  {} ({})", skip.short_name, skip.provider_model_id);
    }
    if !report.dry_run {
        println!(
            "Committed: {}",
            if report.committed { "yes" } else { "no" }
        );
    }
}

/// Run the `catalog` command: print the candidate models for this run.
pub fn run_catalog(config: &Config, offline: bool, query: Option<&str>) {
    let lister = AwsCliLister::new(&config.aws_cli);
    let catalog = catalog::fetch_catalog(config, &lister, offline);
    let filtered = filter_by_query(&catalog.models, query.unwrap_or(""), |m| {
        (m.short_name.as_str(), m.display_name.as_str())
    });

    if filtered.is_empty() {
        println!("No models found.");
        return;
    }

    let short_w = filtered
        .iter()
        .map(|m| m.short_name.len())
        .max()
        .unwrap_or(20)
        .max(20);
    let id_w = filtered
        .iter()
        .map(|m| m.provider_model_id.len())
        .max()
        .unwrap_or(30)
        .max(30);

    println!(
        "{:<short_w$}  {:<id_w$}  {:>7}",
        "Short name", "Provider id", "Context"
    );
    println!("{}  {}  -------", "-".repeat(short_w), "-".repeat(id_w));
    for m in &filtered {
        let ctx = m
            .context_length
            .map(format_context)
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<short_w$}  {:<id_w$}  {:>7}",
            m.short_name, m.provider_model_id, ctx
        );
    }

    println!(
        "\n{} model(s) listed from {}",
        filtered.len(),
        catalog.source
    );
}

/// Run the `check` command: validate every block and exit 1 on any issue.
pub fn run_check(blocks_dir: &Path) {
    if !blocks_dir.exists() {
        eprintln!(
            "Error: blocks directory {} does not exist",
            blocks_dir.display()
        );
        std::process::exit(1);
    }
    let set = match BlockSet::scan(blocks_dir) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let issues = blocks::validate(&set);
    if issues.is_empty() {
        println!("{} block(s) OK", set.blocks.len());
        return;
    }
    for issue in &issues {
        println!("{}", issue);
    }
    eprintln!(
        "{} issue(s) in {} block(s)",
        issues.len(),
        set.blocks.len()
    );
    std::process::exit(1);
}

/// Run the `config` command: show the effective settings.
pub fn run_config(config: &Config) {
    let manifest = match version::load_manifest(&version::manifest_path(&config.blocks_dir)) {
        Ok(Some(m)) => format!("{} (updated {})", m.version, m.updated_at),
        Ok(None) => "none".to_string(),
        Err(e) => format!("unreadable ({})", e),
    };
    let in_git = git::is_inside_work_tree(existing_ancestor(&config.blocks_dir));

    println!("{} {}", app::NAME, app::VERSION);
    println!("Blocks dir: {}", config.blocks_dir.display());
    println!("Region:     {}", config.region);
    println!("Vendors:    {}", config.vendors.join(","));
    println!("AWS CLI:    {}", config.aws_cli);
    println!("Manifest:   {}", manifest);
    println!("Git repo:   {}", if in_git { "yes" } else { "no" });
}
