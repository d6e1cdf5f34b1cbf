//! CLI definitions: argument parsing, subcommands, and help text.

use std::path::PathBuf;

use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};
use clap_complete::Shell;

pub use clap_complete::generate;

const AFTER_HELP: &str = "\
EXAMPLES:
  bedrock-blocks sync                    Create missing blocks (or backfill tool_use) and commit
  bedrock-blocks sync --dry-run          Show what would change without writing
  bedrock-blocks sync --offline          Use the built-in model table instead of the AWS CLI
  bedrock-blocks catalog --query opus    List candidate models matching 'opus'
  bedrock-blocks check                   Validate existing block files
  bedrock-blocks config                  Show effective settings
  bedrock-blocks completions bash        Generate bash completions

ENVIRONMENT:
  BEDROCK_BLOCKS_DIR   Blocks directory (default: blocks)
  BEDROCK_REGION       Region for the model listing (default: us-east-1)
  BEDROCK_VENDORS      Comma-separated vendor namespaces (default: anthropic,meta)
  BEDROCK_AWS_CLI      AWS CLI binary (default: aws)
";

/// Command-line arguments for the application.
#[derive(Parser)]
#[command(
    author,
    version,
    about = "Keep Bedrock model block files in sync with the foundation-model catalog",
    after_help = AFTER_HELP
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (use multiple times for debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce log output (errors only)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,
}

/// Catalog source flags shared by `sync` and `catalog`.
#[derive(ClapArgs)]
pub struct SourceArgs {
    /// Region for the live model listing
    #[arg(long)]
    pub region: Option<String>,

    /// Skip the live listing and use the built-in table
    #[arg(long)]
    pub offline: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create missing blocks, or add tool_use to existing ones, then commit
    Sync {
        /// Directory holding the block files
        #[arg(long)]
        blocks_dir: Option<PathBuf>,

        #[command(flatten)]
        source: SourceArgs,

        /// Print the plan without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Write files but leave them uncommitted
        #[arg(long)]
        no_commit: bool,

        /// Use this version instead of bumping the current one
        #[arg(long, value_name = "VERSION")]
        set_version: Option<String>,
    },
    /// List the candidate models for this run
    Catalog {
        #[command(flatten)]
        source: SourceArgs,

        /// Filter models by short name or display name
        #[arg(long)]
        query: Option<String>,
    },
    /// Validate existing block files
    Check {
        /// Directory holding the block files
        #[arg(long)]
        blocks_dir: Option<PathBuf>,
    },
    /// Show effective settings
    Config,
    /// Generate shell completion script
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        #[arg(value_parser = clap::value_parser!(Shell))]
        shell: Shell,
    },
}

impl Args {
    /// Log level based on -v/-q flags: error, warn, info, or debug.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose >= 2 {
            "debug"
        } else if self.verbose >= 1 {
            "info"
        } else {
            "warn"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_flags_parse() {
        let args = Args::try_parse_from([
            "bedrock-blocks",
            "-v",
            "sync",
            "--blocks-dir",
            "out",
            "--offline",
            "--no-commit",
            "--set-version",
            "2.0.0",
        ])
        .unwrap();
        assert_eq!(args.log_level(), "info");
        match args.command {
            Commands::Sync {
                blocks_dir,
                source,
                dry_run,
                no_commit,
                set_version,
            } => {
                assert_eq!(blocks_dir, Some(PathBuf::from("out")));
                assert!(source.offline);
                assert!(source.region.is_none());
                assert!(!dry_run);
                assert!(no_commit);
                assert_eq!(set_version.as_deref(), Some("2.0.0"));
            }
            _ => panic!("expected sync"),
        }
    }

    #[test]
    fn quiet_wins_over_verbose() {
        let args = Args::try_parse_from(["bedrock-blocks", "-vv", "-q", "config"]).unwrap();
        assert_eq!(args.log_level(), "error");
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Args::try_parse_from(["bedrock-blocks"]).is_err());
    }
}
