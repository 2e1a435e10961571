//! Command-line glue: argument parsing and output formatting.
//!
//! The subcommand dispatch logic itself lives in `main.rs`, which is the
//! only place that needs both the parsed [`args::SemacroArgs`] and the
//! engine's public API.

pub mod args;
pub mod output;
