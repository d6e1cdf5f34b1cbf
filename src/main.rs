//! # Bedrock Blocks
//!
//! Entry point for the `bedrock-blocks` CLI, which keeps a directory of
//! Bedrock model block files in sync with the foundation-model catalog.
//!
//! ## Commands
//! - `sync`: create missing blocks or backfill the tool-use capability, then commit
//! - `catalog`: list candidate models (live listing or built-in table)
//! - `check`: validate existing blocks
//! - `config` and `completions`

mod cli;
mod core;
mod run;

use clap::Parser;
use dotenv::dotenv;

fn main() {
    // Load environment variables from .env file
    dotenv().ok();

    let args = cli::Args::parse();
    run::init_logger(&args);
    run::run(args);
}
