//! Configuration discovery and loading
//!
//! This module handles the configuration discovery hierarchy:
//! 1. Current directory: ./dockhand.toml or ./.dockhand/config.toml
//! 2. User config: ~/.dockhand/config.toml
//! 3. System config: /etc/dockhand/config.toml
//! 4. Built-in defaults

use crate::container::{ContainerClientConfig, ProvisionerConfig};
use crate::env;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env as std_env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Deployment mode that switches logging to JSON
pub const PRODUCTION: &str = "production";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Deployment mode: `production` or anything else
    pub run: String,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            run: "development".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerConfig {
    /// Engine endpoint used when DOCKER_HOST is unset
    pub endpoint: String,
    /// docker-machine name referenced in remediation guidance
    pub name: String,
    /// Engine request timeout in seconds
    pub timeout: u64,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            endpoint: "tcp://192.168.99.100:2376".to_string(),
            name: "malice".to_string(),
            timeout: ContainerClientConfig::default().timeout,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory for provisioning locks (defaults to the temp dir)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_dir: Option<PathBuf>,
    pub environment: EnvironmentConfig,
    pub docker: DockerConfig,
}

impl AppConfig {
    /// Whether the deployment mode is production.
    pub fn is_production(&self) -> bool {
        self.environment.run == PRODUCTION
    }

    /// Client settings derived from this configuration.
    pub fn client_config(&self) -> ContainerClientConfig {
        ContainerClientConfig {
            timeout: self.docker.timeout,
        }
    }

    /// Provisioner settings derived from this configuration.
    pub fn provisioner_config(&self, advertise_ip: Option<String>) -> ProvisionerConfig {
        ProvisionerConfig {
            environment: self.environment.run.clone(),
            lock_dir: self.lock_dir.clone().unwrap_or_else(env::default_lock_dir),
            advertise_ip,
        }
    }

    /// Load from TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Save to TOML file
    pub fn to_toml_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file {}", path.as_ref().display()))?;
        Ok(())
    }
}

/// Configuration discovery system
pub struct ConfigDiscovery;

impl ConfigDiscovery {
    /// Load an explicit config file, or discover one using the hierarchy
    pub fn load(config_override: Option<&Path>) -> anyhow::Result<AppConfig> {
        match config_override {
            Some(path) => {
                debug!("Loading configuration override from: {:?}", path);
                AppConfig::from_toml_file(path)
            }
            None => Self::discover_config(),
        }
    }

    /// The file [`load`](Self::load) reads, or `None` for built-in defaults
    pub fn config_source(config_override: Option<&Path>) -> Option<PathBuf> {
        match config_override {
            Some(path) => Some(path.to_path_buf()),
            None => Self::find_config_file(),
        }
    }

    /// Discover and load configuration using the hierarchy
    pub fn discover_config() -> anyhow::Result<AppConfig> {
        if let Some(config_path) = Self::find_config_file() {
            debug!("Loading configuration from: {:?}", config_path);
            return AppConfig::from_toml_file(config_path);
        }

        debug!("No configuration file found, using defaults");
        Ok(AppConfig::default())
    }

    /// Find configuration file using discovery hierarchy
    pub fn find_config_file() -> Option<PathBuf> {
        Self::get_config_candidates().into_iter().find(|candidate| {
            debug!("Checking for config file: {:?}", candidate);
            candidate.is_file()
        })
    }

    /// Get list of configuration file candidates in priority order
    fn get_config_candidates() -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        // 1. Current directory
        if let Ok(current_dir) = std_env::current_dir() {
            candidates.push(current_dir.join(env::LOCAL_CONFIG_FILE_NAME));
            candidates.push(env::local_config_file_path(&current_dir));
        }

        // 2. User config
        if let Some(home_dir) = Self::get_home_dir() {
            candidates.push(env::user_config_file_path(&home_dir));
        }

        // 3. System config
        #[cfg(unix)]
        candidates.push(PathBuf::from("/etc/dockhand/config.toml"));

        #[cfg(windows)]
        if let Ok(program_data) = std_env::var("PROGRAMDATA") {
            candidates.push(PathBuf::from(program_data).join("dockhand").join("config.toml"));
        }

        candidates
    }

    /// Get home directory path
    fn get_home_dir() -> Option<PathBuf> {
        std_env::var("HOME")
            .ok()
            .or_else(|| std_env::var("USERPROFILE").ok())
            .map(PathBuf::from)
    }

    /// Show configuration discovery information for debugging
    pub fn show_discovery_info() {
        println!("Configuration Discovery Hierarchy:");
        println!();

        for (i, candidate) in Self::get_config_candidates().iter().enumerate() {
            let status = if candidate.exists() {
                if candidate.is_file() {
                    "✓ EXISTS"
                } else {
                    "✗ NOT A FILE"
                }
            } else {
                "✗ NOT FOUND"
            };

            println!("  {}. {:?} - {}", i + 1, candidate, status);
        }

        println!();
        if let Some(found) = Self::find_config_file() {
            println!("Active configuration: {:?}", found);
        } else {
            println!("Active configuration: Built-in defaults");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.environment.run, "development");
        assert_eq!(config.docker.endpoint, "tcp://192.168.99.100:2376");
        assert_eq!(config.docker.name, "malice");
        assert!(!config.is_production());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [environment]
            run = "production"
            "#,
        )
        .unwrap();

        assert!(config.is_production());
        assert_eq!(config.docker, DockerConfig::default());
    }

    #[test]
    fn test_config_file_operations() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("dockhand.toml");

        let mut original = AppConfig::default();
        original.docker.endpoint = "tcp://10.1.1.1:2376".to_string();
        original.lock_dir = Some(temp_dir.path().join("locks"));

        original.to_toml_file(&config_path).unwrap();
        let loaded = ConfigDiscovery::load(Some(config_path.as_path())).unwrap();

        assert_eq!(loaded, original);
    }

    #[test]
    fn test_config_source_prefers_override() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("custom.toml");

        let source = ConfigDiscovery::config_source(Some(config_path.as_path()));
        assert_eq!(source, Some(config_path));
        assert_eq!(
            ConfigDiscovery::config_source(None),
            ConfigDiscovery::find_config_file()
        );
    }

    #[test]
    fn test_missing_override_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = ConfigDiscovery::load(Some(temp_dir.path().join("missing.toml").as_path()));
        assert!(result.is_err());
    }

    #[test]
    fn test_provisioner_config() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig {
            lock_dir: Some(temp_dir.path().to_path_buf()),
            ..Default::default()
        };

        let provisioner = config.provisioner_config(Some("192.168.99.100".to_string()));
        assert_eq!(provisioner.environment, "development");
        assert_eq!(provisioner.lock_dir, temp_dir.path());
        assert_eq!(provisioner.advertise_ip.as_deref(), Some("192.168.99.100"));
    }

    #[test]
    fn test_config_candidates() {
        let candidates = ConfigDiscovery::get_config_candidates();
        assert!(!candidates.is_empty());
        assert!(candidates[0].file_name().unwrap() == "dockhand.toml");
    }
}
