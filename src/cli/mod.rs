//! Command-line interface

mod commands;
mod runner;

pub use commands::{Cli, Command};
pub use runner::Runner;
