//! CLI-specific functionality for dockhand
//!
//! This module contains argument parsing and configuration discovery.

pub mod args;
pub mod config;

pub use args::{Args, Commands, ExecutionMode, ProvisionConfig};
pub use config::{AppConfig, ConfigDiscovery, DockerConfig, EnvironmentConfig};
