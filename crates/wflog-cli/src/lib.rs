//! Workflow event log mining CLI library.
//!
//! This crate provides the CLI interface and the wiki markup report.

mod cli;
pub mod commands;
mod config;
pub mod markup;

pub use cli::{Cli, Commands, InputArgs};
pub use config::Config;
