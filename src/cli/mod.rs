//! CLI commands for the parrot agent using clap.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use crate::agent::ParrotAgent;
use crate::config::{load_settings, validate_settings, Settings};
use crate::web::run_server;

/// Parrot agent - repeats everything you say over the Open Floor protocol.
#[derive(Parser, Debug)]
#[command(name = "parrot-agent")]
#[command(version)]
#[command(about = "Open Floor parrot agent", long_about = None)]
pub struct Commands {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the Open Floor HTTP endpoint
    Serve {
        #[command(flatten)]
        overrides: Overrides,

        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(long, short)]
        port: Option<u16>,

        /// Browser origin allowed to call the endpoint
        #[arg(long)]
        allowed_origin: Option<String>,
    },

    /// Print the agent manifest as JSON
    Manifest {
        #[command(flatten)]
        overrides: Overrides,
    },
}

/// Settings shared by every command that builds an agent.
#[derive(Args, Debug, Default)]
pub struct Overrides {
    /// JSON settings file
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Externally reachable URL of this agent
    #[arg(long, env = "SERVICE_URL")]
    pub service_url: Option<String>,

    /// Speaker URI identifying this agent
    #[arg(long)]
    pub speaker_uri: Option<String>,
}

impl Overrides {
    /// Load the settings file (if any) and apply command-line overrides.
    pub fn resolve(&self) -> Result<Settings> {
        let mut settings = load_settings(self.config.as_deref())?;
        if let Some(url) = &self.service_url {
            settings.agent.service_url = url.clone();
        }
        if let Some(uri) = &self.speaker_uri {
            settings.agent.speaker_uri = uri.clone();
        }
        validate_settings(&settings)?;
        Ok(settings)
    }
}

impl Commands {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Serve {
                overrides,
                host,
                port,
                allowed_origin,
            } => {
                let mut settings = overrides.resolve()?;
                if let Some(host) = host {
                    settings.server.host = host;
                }
                if let Some(port) = port {
                    settings.server.port = port;
                }
                if let Some(origin) = allowed_origin {
                    settings.server.allowed_origin = origin;
                }

                let agent = Arc::new(ParrotAgent::from_settings(&settings.agent));
                tracing::info!("🦜 Parrot agent created: {}", agent.speaker_uri());
                run_server(agent, &settings.server).await?;
            }
            Command::Manifest { overrides } => {
                let settings = overrides.resolve()?;
                let agent = ParrotAgent::from_settings(&settings.agent);
                println!("{}", serde_json::to_string_pretty(agent.manifest())?);
            }
        }
        Ok(())
    }
}
