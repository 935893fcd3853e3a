//! Command-line viewer for Xcode build timelines.
//!
//! This crate wires `bt-core` to files on disk, configuration and terminal
//! output.

mod cli;
pub mod commands;
mod config;
pub mod input;

#[cfg(test)]
mod testutil;

pub use cli::{Cli, Commands, LogArgs};
pub use config::Config;
