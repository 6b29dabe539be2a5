//! Argument definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Session-authenticated extractor for paginated record APIs
#[derive(Debug, Parser)]
#[command(name = "fmdata-extractor", version, about)]
pub struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Execute a full extraction run
    Run {
        /// Directory the CSV files and manifests are written to
        #[arg(short, long, default_value = "out")]
        output_dir: PathBuf,

        /// State file carrying schemas and watermarks between runs;
        /// omitted means no persistence
        #[arg(short, long)]
        state: Option<PathBuf>,
    },
    /// Verify connectivity and credentials with a login/logout round trip
    Check,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "fmdata-extractor",
            "--config",
            "/etc/extractor.json",
            "run",
            "--output-dir",
            "/tmp/out",
            "--state",
            "/tmp/state.json",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/extractor.json"));
        match cli.command {
            Command::Run { output_dir, state } => {
                assert_eq!(output_dir, PathBuf::from("/tmp/out"));
                assert_eq!(state, Some(PathBuf::from("/tmp/state.json")));
            }
            Command::Check => panic!("expected run command"),
        }
    }

    #[test]
    fn test_parse_check_with_defaults() {
        let cli = Cli::try_parse_from(["fmdata-extractor", "check"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("config.json"));
        assert!(matches!(cli.command, Command::Check));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["fmdata-extractor"]).is_err());
    }
}
