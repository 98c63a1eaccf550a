//! # Dockhand
//!
//! Provisions named, single-instance service containers on a remote Docker
//! engine reached over TLS. Provisioning is idempotent: a container that
//! already exists is left alone, and an image that is already present is
//! not pulled again.
//!
//! ## Architecture Overview
//!
//! - **[`container`]**: endpoint resolution, the engine boundary, existence
//!   checks, image pulls, the provisioning workflow and log streaming
//! - **[`advisor`]**: platform-specific guidance when the engine is unreachable
//! - **[`cli`]**: argument parsing and configuration discovery
//! - **[`app`]**: command execution and exit status policy
//! - **[`logging`]**: tracing subscriber setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dockhand::container::{
//!     ContainerClient, ContainerProvisioner, ContainerSpec, EndpointResolver, PortBinding,
//! };
//! use dockhand::cli::AppConfig;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::default();
//!     let endpoint = EndpointResolver::from_env(&config.docker.endpoint);
//!     let client = ContainerClient::connect(&endpoint, &config.client_config())?;
//!
//!     let spec = ContainerSpec::builder()
//!         .name("kibana")
//!         .image("blacktop/kibana")
//!         .port_binding(PortBinding::new("5601/tcp", "0.0.0.0", "5601"))
//!         .build()?;
//!
//!     let provisioner = ContainerProvisioner::new(
//!         Arc::new(client),
//!         config.provisioner_config(Some(endpoint.ip().to_string())),
//!     );
//!     provisioner.provision(&spec, false).await?;
//!     Ok(())
//! }
//! ```

/// Container engine integration and the provisioning workflow.
pub mod container;

/// Remediation guidance for an unreachable engine.
pub mod advisor;

/// Command execution and exit status policy.
pub mod app;

/// Environment constants and path utilities.
///
/// Centralizes environment variable names, TLS file names and configuration
/// paths.
pub mod env;

/// Tracing subscriber setup.
pub mod logging;

/// Argument parsing and configuration discovery.
pub mod cli;

pub use advisor::{ConnectionFailureAdvisor, EXIT_ENGINE_UNREACHABLE, Platform};
pub use container::{ContainerError, ContainerProvisioner, ContainerSpec, ProvisionOutcome};
