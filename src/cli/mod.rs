//! Command-line interface for idea-forge.
//!
//! Provides commands for generating ideas and listing available models.

mod commands;

pub use commands::{parse_cli, run_with_cli};
