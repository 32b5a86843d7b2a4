#![warn(missing_docs)]

//! ZNCD command line front end
//!
//! Reads inputs from disk and hands raw bytes to `zncd-core`; owns all file I/O,
//! argument parsing and output formatting.

pub mod cli;
pub mod config;
pub mod report;

pub use cli::{Cli, Command, OutputFormat};
pub use config::CliConfig;
