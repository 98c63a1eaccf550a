//! Container provisioning against a remote Docker engine.
//!
//! This module resolves the engine endpoint, connects over TLS, checks what
//! already exists, pulls missing images and creates/starts named service
//! containers exactly once.
//!
//! ## Architecture
//!
//! - [`endpoint`]: engine address and TLS material resolution
//! - [`engine`]: the [`Engine`] trait every component talks through
//! - [`client`]: bollard-backed [`Engine`] implementation
//! - [`inventory`]: container and image existence checks
//! - [`image`]: image references and pulling
//! - [`spec`]: container specifications and port bindings
//! - [`lock`]: per-name provisioning lock
//! - [`provisioner`]: the idempotent check-pull-create-start workflow
//! - [`logs`]: following container output
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dockhand::container::{
//!     ContainerClient, ContainerClientConfig, ContainerProvisioner, ContainerSpec,
//!     EndpointResolver, ProvisionerConfig,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let endpoint = EndpointResolver::from_env("tcp://192.168.99.100:2376");
//!     let client = ContainerClient::connect(&endpoint, &ContainerClientConfig::default())?;
//!
//!     let provisioner =
//!         ContainerProvisioner::new(Arc::new(client), ProvisionerConfig::default());
//!     let outcome = provisioner.provision(&ContainerSpec::elk(), false).await?;
//!     println!("{}", outcome.record().id);
//!     Ok(())
//! }
//! ```

mod client;
mod endpoint;
mod engine;
mod image;
mod inventory;
mod lock;
mod logs;
mod provisioner;
mod spec;

pub use client::{ContainerClient, ContainerClientConfig, host_config};
pub use endpoint::{Endpoint, EndpointResolver, parse_endpoint};
pub use engine::{
    ContainerRecord, Engine, ImageRecord, LogChunk, LogStream, OutputStream, ProgressStream,
    PullProgress,
};
pub use image::{DEFAULT_TAG, ImagePuller, ImageReference};
pub use inventory::{container_exists, image_exists};
pub use lock::ProvisionLock;
pub use logs::LogStreamer;
pub use provisioner::{ContainerProvisioner, ProvisionOutcome, ProvisionerConfig};
pub use spec::{ContainerSpec, ContainerSpecBuilder, PortBinding};

/// Container provisioning errors.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    /// Engine unreachable: connect or ping failed
    #[error("Unable to connect to container engine at {endpoint}: {reason}")]
    Connection { endpoint: String, reason: String },

    /// Listing containers or images failed
    #[error("Lookup error: {0}")]
    Lookup(String),

    /// Image pull failed
    #[error("Failed to pull image {image}: {reason}")]
    Pull { image: String, reason: String },

    /// Engine rejected container creation
    #[error("Failed to create container {name}: {reason}")]
    Create { name: String, reason: String },

    /// Engine rejected container start
    #[error("Failed to start container {id}: {reason}")]
    Start { id: String, reason: String },

    /// Following container output failed
    #[error("Log stream error for container {id}: {reason}")]
    Stream { id: String, reason: String },

    /// Another provisioning run holds the lock for this name
    #[error("Container {0} is being provisioned by another process")]
    Locked(String),

    /// Container not found
    #[error("Container not found: {0}")]
    NotFound(String),

    /// Invalid container specification or endpoint
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Docker API error
    #[error("Container API error: {0}")]
    ApiError(#[from] bollard::errors::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ContainerError {
    /// Short name of the failing operation, used as a structured log field.
    pub fn op(&self) -> &'static str {
        match self {
            ContainerError::Connection { .. } => "ping",
            ContainerError::Lookup(_) => "lookup",
            ContainerError::Pull { .. } => "pull_image",
            ContainerError::Create { .. } => "create_container",
            ContainerError::Start { .. } => "start_container",
            ContainerError::Stream { .. } => "logs",
            ContainerError::Locked(_) => "lock",
            ContainerError::NotFound(_) => "inspect_container",
            ContainerError::ConfigError(_) => "config",
            ContainerError::ApiError(_) => "api",
            ContainerError::IoError(_) => "io",
        }
    }

    /// Whether the engine itself could not be reached.
    pub fn is_connection(&self) -> bool {
        matches!(self, ContainerError::Connection { .. })
    }
}

/// Result type for container operations.
pub type Result<T> = std::result::Result<T, ContainerError>;
