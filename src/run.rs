//! Application run modes: logger init, config loading, subcommand dispatch.

use std::io;
use std::path::PathBuf;

use clap::CommandFactory;

use crate::cli::{self, Args, Commands};
use crate::core;
use crate::core::config::{Config, Overrides};
use crate::core::reconcile::SyncOptions;

/// Initialize env_logger on stderr so stdout stays clean for command output.
pub fn init_logger(args: &Args) {
    let log_level = args.log_level();
    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level));
    logger.target(env_logger::Target::Stderr);
    let _ = logger.try_init();
}

/// Load config from the environment and apply flag overrides. Exits 1 on invalid values.
fn load_config(blocks_dir: Option<PathBuf>, region: Option<String>) -> Config {
    core::config::load()
        .and_then(|c| c.with_overrides(Overrides { blocks_dir, region }))
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        })
}

/// Dispatch the parsed subcommand.
pub fn run(args: Args) {
    match args.command {
        Commands::Sync {
            blocks_dir,
            source,
            dry_run,
            no_commit,
            set_version,
        } => {
            let config = load_config(blocks_dir, source.region);
            let options = SyncOptions {
                offline: source.offline,
                dry_run,
                set_version,
            };
            core::cli::run_sync(&config, &options, !no_commit);
        }
        Commands::Catalog { source, query } => {
            let config = load_config(None, source.region);
            core::cli::run_catalog(&config, source.offline, query.as_deref());
        }
        Commands::Check { blocks_dir } => {
            let config = load_config(blocks_dir, None);
            core::cli::run_check(&config.blocks_dir);
        }
        Commands::Config => {
            let config = load_config(None, None);
            core::cli::run_config(&config);
        }
        Commands::Completions { shell } => {
            let mut cmd = Args::command();
            cli::generate(shell, &mut cmd, core::app::NAME, &mut io::stdout());
        }
    }
}
