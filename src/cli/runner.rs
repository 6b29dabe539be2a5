//! Command execution
//!
//! Wires configuration, transport, state and engine together and runs
//! the selected command.

use super::commands::{Cli, Command};
use crate::api::DataApiClient;
use crate::config::Config;
use crate::engine::Engine;
use crate::error::Result;
use crate::http::{HttpClient, HttpClientConfig};
use crate::state::StateManager;
use clap::Parser;
use std::path::Path;
use tracing::warn;

/// Executes one parsed CLI invocation
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Build a runner from the process arguments
    pub fn from_args() -> Self {
        Self { cli: Cli::parse() }
    }

    /// Build a runner from explicit arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the selected command to completion
    pub async fn execute(self) -> Result<()> {
        let config = Config::from_file(&self.cli.config)?;

        match self.cli.command {
            Command::Run { output_dir, state } => {
                let state = match state {
                    Some(path) => StateManager::from_file(path)?,
                    None => StateManager::in_memory(),
                };
                let mut engine = build_engine(config, state, &output_dir)?;
                engine.run().await?;
                Ok(())
            }
            Command::Check => {
                let mut engine = build_engine(config, StateManager::in_memory(), Path::new("."))?;
                engine.check().await
            }
        }
    }
}

fn build_engine(config: Config, state: StateManager, out_dir: &Path) -> Result<Engine> {
    let mut builder = HttpClientConfig::builder().base_url(config.base_url.clone());
    if !config.ssl_verify {
        warn!("TLS certificate verification is disabled");
        builder = builder.no_ssl_verify();
    }
    let http = HttpClient::with_config(builder.build())?;
    Ok(Engine::new(config, DataApiClient::new(http), state, out_dir))
}
