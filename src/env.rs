//! Environment constants and path utilities for dockhand.
//!
//! This module centralizes environment variable names, fixed file names and
//! configuration paths used throughout the application.

use std::path::{Path, PathBuf};

/// Environment variable overriding the engine endpoint
pub const DOCKER_HOST_VAR: &str = "DOCKER_HOST";

/// Environment variable naming the TLS material directory
pub const DOCKER_CERT_PATH_VAR: &str = "DOCKER_CERT_PATH";

/// TLS material file names inside the cert directory
pub mod tls {
    /// Certificate authority
    pub const CA_FILE_NAME: &str = "ca.pem";

    /// Client certificate
    pub const CERT_FILE_NAME: &str = "cert.pem";

    /// Client private key
    pub const KEY_FILE_NAME: &str = "key.pem";
}

/// Application directory name (hidden directory like .git)
pub const DOCKHAND_DIR_NAME: &str = ".dockhand";

/// Configuration file name inside the application directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration file name in a project directory
pub const LOCAL_CONFIG_FILE_NAME: &str = "dockhand.toml";

/// Subdirectory of the temp dir holding provisioning locks
pub const LOCK_DIR_NAME: &str = "dockhand-locks";

/// Build a TLS material path from the cert directory and a file name
pub fn tls_file_path(cert_dir: &str, file_name: &str) -> PathBuf {
    Path::new(cert_dir).join(file_name)
}

/// Build config directory path in user's home directory
pub fn user_config_dir_path(home_dir: &Path) -> PathBuf {
    home_dir.join(DOCKHAND_DIR_NAME)
}

/// Build config file path in user's home directory
pub fn user_config_file_path(home_dir: &Path) -> PathBuf {
    user_config_dir_path(home_dir).join(CONFIG_FILE_NAME)
}

/// Build local config file path in current directory
pub fn local_config_file_path(current_dir: &Path) -> PathBuf {
    current_dir.join(DOCKHAND_DIR_NAME).join(CONFIG_FILE_NAME)
}

/// Default directory for provisioning lock files
pub fn default_lock_dir() -> PathBuf {
    std::env::temp_dir().join(LOCK_DIR_NAME)
}
