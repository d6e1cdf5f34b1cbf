pub mod app;
pub mod blocks;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod git;
pub mod reconcile;
pub mod util;
pub mod version;
pub mod writer;
