//! Command line argument parsing
//!
//! Subcommands:
//! - `start`: Provision a named container from an image
//! - `elk`: Provision the ELK analysis stack
//! - `ping`: Check the container engine is reachable
//! - `show-config`: Show configuration discovery information

use crate::container::{ContainerSpec, PortBinding};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug)]
pub enum ExecutionMode {
    Provision(ProvisionConfig),
    Ping,
    ShowConfig,
}

#[derive(Debug)]
pub struct ProvisionConfig {
    pub spec: ContainerSpec,
    pub attach_logs: bool,
}

#[derive(Debug, Parser)]
#[command(name = "dockhand")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Provision named service containers on a remote Docker engine, once")]
#[command(long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create and start a named container unless it already exists
    Start {
        /// Container name
        name: String,
        /// Image reference (repository[:tag], tag defaults to latest)
        image: String,
        /// Publish a port: 9200/tcp=0.0.0.0:9200, 8080:80 or 9200 (repeatable)
        #[arg(short = 'p', long = "publish", value_name = "BINDING")]
        publish: Vec<String>,
        /// Run the container in privileged mode
        #[arg(long = "privileged")]
        privileged: bool,
        /// Follow container output after starting
        #[arg(short = 'l', long = "logs")]
        logs: bool,
    },
    /// Start the ELK stack (blacktop/elk on ports 80 and 9200)
    Elk {
        /// Follow container output after starting
        #[arg(short = 'l', long = "logs")]
        logs: bool,
    },
    /// Check the container engine is reachable
    Ping,
    /// Show configuration discovery information
    ShowConfig,
}

impl Args {
    pub fn parse() -> Self {
        Parser::parse()
    }

    pub fn mode(&self) -> Result<ExecutionMode, String> {
        match &self.command {
            Some(Commands::Start {
                name,
                image,
                publish,
                privileged,
                logs,
            }) => {
                let bindings = publish
                    .iter()
                    .map(|p| PortBinding::parse(p))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| e.to_string())?;

                let spec = ContainerSpec::builder()
                    .name(name)
                    .image(image)
                    .port_bindings(bindings)
                    .privileged(*privileged)
                    .build()
                    .map_err(|e| e.to_string())?;

                Ok(ExecutionMode::Provision(ProvisionConfig {
                    spec,
                    attach_logs: *logs,
                }))
            }
            Some(Commands::Elk { logs }) => Ok(ExecutionMode::Provision(ProvisionConfig {
                spec: ContainerSpec::elk(),
                attach_logs: *logs,
            })),
            Some(Commands::Ping) => Ok(ExecutionMode::Ping),
            Some(Commands::ShowConfig) => Ok(ExecutionMode::ShowConfig),
            None => Err(
                "No command specified. Use 'dockhand --help' to see available commands."
                    .to_string(),
            ),
        }
    }
}
