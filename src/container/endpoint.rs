//! Engine endpoint resolution.
//!
//! The endpoint comes from `DOCKER_HOST` when set, otherwise from the
//! configured default. TLS material is read from `DOCKER_CERT_PATH`.

use crate::container::{ContainerError, Result};
use crate::env::{self, DOCKER_CERT_PATH_VAR, DOCKER_HOST_VAR};
use std::path::PathBuf;
use tracing::{debug, error};
use url::Url;

/// Resolved connection details for the container engine.
///
/// Derived once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Engine address, e.g. `tcp://192.168.99.100:2376`
    pub host: String,
    /// Certificate authority path
    pub ca_path: PathBuf,
    /// Client certificate path
    pub cert_path: PathBuf,
    /// Client key path
    pub key_path: PathBuf,
    /// Bare address split from `host` (empty if unparseable)
    pub address: String,
    /// Port split from `host` (empty if unparseable)
    pub port: String,
    cert_dir_set: bool,
}

impl Endpoint {
    /// Bare IP or hostname of the engine, for display.
    pub fn ip(&self) -> &str {
        &self.address
    }

    /// Whether a TLS material directory was configured.
    pub fn has_tls_material(&self) -> bool {
        self.cert_dir_set
    }
}

/// Resolves an [`Endpoint`] from the environment and a configured default.
pub struct EndpointResolver;

impl EndpointResolver {
    /// Resolve from the process environment.
    pub fn from_env(default_endpoint: &str) -> Endpoint {
        Self::resolve_with(|key| std::env::var(key).ok(), default_endpoint)
    }

    /// Resolve using `lookup` in place of the process environment.
    pub fn resolve_with<F>(lookup: F, default_endpoint: &str) -> Endpoint
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup(DOCKER_HOST_VAR)
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| default_endpoint.to_string());

        let cert_dir = lookup(DOCKER_CERT_PATH_VAR)
            .map(|p| p.trim().to_string())
            .unwrap_or_default();

        let (address, port) = match parse_endpoint(&host) {
            Ok(parts) => parts,
            Err(e) => {
                error!(endpoint = %host, "{}", e);
                (String::new(), String::new())
            }
        };

        debug!(endpoint = %host, cert_dir = %cert_dir, "Resolved engine endpoint");

        Endpoint {
            ca_path: env::tls_file_path(&cert_dir, env::tls::CA_FILE_NAME),
            cert_path: env::tls_file_path(&cert_dir, env::tls::CERT_FILE_NAME),
            key_path: env::tls_file_path(&cert_dir, env::tls::KEY_FILE_NAME),
            cert_dir_set: !cert_dir.is_empty(),
            host,
            address,
            port,
        }
    }
}

/// Split an engine address like `tcp://1.2.3.4:2376` into address and port.
///
/// # Errors
///
/// Returns error if the address is not a URL with both host and port.
pub fn parse_endpoint(endpoint: &str) -> Result<(String, String)> {
    let url = Url::parse(endpoint).map_err(|e| {
        ContainerError::ConfigError(format!("Invalid engine endpoint '{}': {}", endpoint, e))
    })?;

    let address = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| {
            ContainerError::ConfigError(format!("Engine endpoint '{}' has no host", endpoint))
        })?;
    let port = url.port_or_known_default().ok_or_else(|| {
        ContainerError::ConfigError(format!("Engine endpoint '{}' has no port", endpoint))
    })?;

    Ok((
        address.trim_matches(|c| c == '[' || c == ']').to_string(),
        port.to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::Path;

    const DEFAULT: &str = "tcp://192.168.99.100:2376";

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_falls_back_to_default_when_unset() {
        let endpoint = EndpointResolver::resolve_with(lookup(&[]), DEFAULT);
        assert_eq!(endpoint.host, DEFAULT);
        assert_eq!(endpoint.ip(), "192.168.99.100");
        assert_eq!(endpoint.port, "2376");
    }

    #[test]
    fn test_blank_override_uses_default() {
        let endpoint = EndpointResolver::resolve_with(lookup(&[("DOCKER_HOST", "  ")]), DEFAULT);
        assert_eq!(endpoint.host, DEFAULT);
    }

    #[test]
    fn test_override_wins() {
        let endpoint = EndpointResolver::resolve_with(
            lookup(&[("DOCKER_HOST", "tcp://10.0.0.5:2376")]),
            DEFAULT,
        );
        assert_eq!(endpoint.host, "tcp://10.0.0.5:2376");
        assert_eq!(endpoint.ip(), "10.0.0.5");
    }

    #[test]
    fn test_tls_paths_from_cert_dir() {
        let endpoint = EndpointResolver::resolve_with(
            lookup(&[("DOCKER_CERT_PATH", "/certs/malice")]),
            DEFAULT,
        );
        assert!(endpoint.has_tls_material());
        assert_eq!(endpoint.ca_path, Path::new("/certs/malice/ca.pem"));
        assert_eq!(endpoint.cert_path, Path::new("/certs/malice/cert.pem"));
        assert_eq!(endpoint.key_path, Path::new("/certs/malice/key.pem"));
    }

    #[test]
    fn test_unparseable_host_degrades_to_empty_address() {
        let endpoint = EndpointResolver::resolve_with(lookup(&[]), "not an endpoint");
        assert_eq!(endpoint.host, "not an endpoint");
        assert_eq!(endpoint.ip(), "");
        assert_eq!(endpoint.port, "");
    }

    #[test]
    fn test_parse_endpoint() {
        assert_eq!(
            parse_endpoint("tcp://127.0.0.1:2375").unwrap(),
            ("127.0.0.1".to_string(), "2375".to_string())
        );
        assert_eq!(
            parse_endpoint("https://docker.example.com").unwrap(),
            ("docker.example.com".to_string(), "443".to_string())
        );
        assert!(parse_endpoint("unix:///var/run/docker.sock").is_err());
        assert!(parse_endpoint("tcp://127.0.0.1").is_err());
    }
}
