//! CLI interface for hdrkit
//!
//! This crate provides the command-line interface for hdrkit, including
//! argument parsing and the command implementations.

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, Input, LayerKind};
pub use commands::run;
