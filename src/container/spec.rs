//! Container specifications.
//!
//! A [`ContainerSpec`] is what the caller wants running: a unique name, an
//! image, port bindings and the privilege flag.

use crate::container::{ContainerError, ImageReference, Result};

/// A container port published on a host address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PortBinding {
    /// Container port with protocol, e.g. `9200/tcp`
    pub container_port: String,
    /// Host interface, e.g. `0.0.0.0`
    pub host_ip: String,
    /// Host port
    pub host_port: String,
}

impl PortBinding {
    /// Create a binding. A bare container port gets the `/tcp` protocol.
    pub fn new<C, I, P>(container_port: C, host_ip: I, host_port: P) -> Self
    where
        C: Into<String>,
        I: Into<String>,
        P: Into<String>,
    {
        let container_port = container_port.into();
        let container_port = if container_port.contains('/') {
            container_port
        } else {
            format!("{}/tcp", container_port)
        };

        Self {
            container_port,
            host_ip: host_ip.into(),
            host_port: host_port.into(),
        }
    }

    /// Parse a CLI binding.
    ///
    /// Accepted forms:
    /// - `9200/tcp=0.0.0.0:9200`
    /// - `9200:9200` (host port, container port; all interfaces)
    /// - `127.0.0.1:9200:9200`
    /// - `9200` (same port on all interfaces)
    ///
    /// # Errors
    ///
    /// Returns error if a port is not a number.
    pub fn parse(value: &str) -> Result<Self> {
        let invalid = || ContainerError::ConfigError(format!("Invalid port binding '{}'", value));

        let (container_port, host_ip, host_port) = if let Some((container, host)) =
            value.split_once('=')
        {
            let (ip, port) = host.rsplit_once(':').ok_or_else(invalid)?;
            (container.to_string(), ip.to_string(), port.to_string())
        } else {
            let parts: Vec<&str> = value.split(':').collect();
            match parts.as_slice() {
                [port] => (port.to_string(), "0.0.0.0".to_string(), port.to_string()),
                [host, container] => (
                    container.to_string(),
                    "0.0.0.0".to_string(),
                    host.to_string(),
                ),
                [ip, host, container] => {
                    (container.to_string(), ip.to_string(), host.to_string())
                }
                _ => return Err(invalid()),
            }
        };

        let port_number = container_port.split('/').next().unwrap_or_default();
        if port_number.parse::<u16>().is_err() || host_port.parse::<u16>().is_err() {
            return Err(invalid());
        }

        Ok(Self::new(container_port, host_ip, host_port))
    }
}

/// Container specification builder.
#[derive(Default)]
pub struct ContainerSpecBuilder {
    name: Option<String>,
    image: Option<String>,
    port_bindings: Vec<PortBinding>,
    privileged: bool,
}

impl ContainerSpecBuilder {
    /// Create a new specification builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the container name.
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the image reference (`repository[:tag]`).
    pub fn image<S: Into<String>>(mut self, image: S) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Publish a container port. Duplicate bindings are kept once.
    pub fn port_binding(mut self, binding: PortBinding) -> Self {
        if !self.port_bindings.contains(&binding) {
            self.port_bindings.push(binding);
        }
        self
    }

    /// Publish several container ports, in order.
    pub fn port_bindings<I>(self, bindings: I) -> Self
    where
        I: IntoIterator<Item = PortBinding>,
    {
        bindings
            .into_iter()
            .fold(self, |builder, binding| builder.port_binding(binding))
    }

    /// Run the container in privileged mode.
    pub fn privileged(mut self, enable: bool) -> Self {
        self.privileged = enable;
        self
    }

    /// Build the specification.
    ///
    /// # Errors
    ///
    /// Returns error if the name or image is missing or invalid.
    pub fn build(self) -> Result<ContainerSpec> {
        let name = self
            .name
            .ok_or_else(|| ContainerError::ConfigError("Name is required".to_string()))?;
        validate_name(&name)?;

        let image = self
            .image
            .ok_or_else(|| ContainerError::ConfigError("Image is required".to_string()))?;

        Ok(ContainerSpec {
            name,
            image: ImageReference::parse(&image)?,
            port_bindings: self.port_bindings,
            privileged: self.privileged,
        })
    }
}

/// What the caller wants running under a unique name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    /// Unique container name
    pub name: String,
    /// Image to run
    pub image: ImageReference,
    /// Published ports, in insertion order
    pub port_bindings: Vec<PortBinding>,
    /// Privileged mode
    pub privileged: bool,
}

impl ContainerSpec {
    /// Create a new specification builder.
    pub fn builder() -> ContainerSpecBuilder {
        ContainerSpecBuilder::new()
    }

    /// The ELK analysis stack: `blacktop/elk` serving Kibana on 80 and
    /// Elasticsearch on 9200.
    pub fn elk() -> Self {
        Self {
            name: "elk".to_string(),
            image: ImageReference::new("blacktop/elk", super::DEFAULT_TAG),
            port_bindings: vec![
                PortBinding::new("80/tcp", "0.0.0.0", "80"),
                PortBinding::new("9200/tcp", "0.0.0.0", "9200"),
            ],
            privileged: false,
        }
    }
}

/// Docker accepts `[a-zA-Z0-9][a-zA-Z0-9_.-]*`.
fn validate_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphanumeric())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));

    if valid {
        Ok(())
    } else {
        Err(ContainerError::ConfigError(format!(
            "Invalid container name '{}'",
            name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_spec() {
        let spec = ContainerSpec::builder()
            .name("elasticsearch")
            .image("blacktop/elasticsearch:8")
            .privileged(true)
            .build()
            .unwrap();

        assert_eq!(spec.name, "elasticsearch");
        assert_eq!(spec.image.to_string(), "blacktop/elasticsearch:8");
        assert!(spec.privileged);
        assert!(spec.port_bindings.is_empty());
    }

    #[test]
    fn test_port_bindings_keep_order_and_dedupe() {
        let spec = ContainerSpec::builder()
            .name("web")
            .image("nginx")
            .port_binding(PortBinding::new("443", "0.0.0.0", "8443"))
            .port_binding(PortBinding::new("80/tcp", "0.0.0.0", "8080"))
            .port_binding(PortBinding::new("443/tcp", "0.0.0.0", "8443"))
            .build()
            .unwrap();

        let ports: Vec<&str> = spec
            .port_bindings
            .iter()
            .map(|b| b.container_port.as_str())
            .collect();
        assert_eq!(ports, vec!["443/tcp", "80/tcp"]);
    }

    #[test]
    fn test_missing_fields() {
        let result = ContainerSpec::builder().image("nginx").build();
        assert!(matches!(result, Err(ContainerError::ConfigError(_))));

        let result = ContainerSpec::builder().name("web").build();
        assert!(matches!(result, Err(ContainerError::ConfigError(_))));
    }

    #[test]
    fn test_invalid_name() {
        for name in ["", "/elk", "-elk", "my elk"] {
            let result = ContainerSpec::builder().name(name).image("nginx").build();
            assert!(result.is_err(), "name {:?} should be rejected", name);
        }
    }

    #[test]
    fn test_parse_port_binding_forms() {
        assert_eq!(
            PortBinding::parse("9200/tcp=0.0.0.0:9200").unwrap(),
            PortBinding::new("9200/tcp", "0.0.0.0", "9200")
        );
        assert_eq!(
            PortBinding::parse("8080:80").unwrap(),
            PortBinding::new("80/tcp", "0.0.0.0", "8080")
        );
        assert_eq!(
            PortBinding::parse("127.0.0.1:5601:5601").unwrap(),
            PortBinding::new("5601/tcp", "127.0.0.1", "5601")
        );
        assert_eq!(
            PortBinding::parse("53/udp=127.0.0.1:5353").unwrap(),
            PortBinding::new("53/udp", "127.0.0.1", "5353")
        );
        assert_eq!(
            PortBinding::parse("9200").unwrap(),
            PortBinding::new("9200/tcp", "0.0.0.0", "9200")
        );
    }

    #[test]
    fn test_parse_port_binding_rejects_garbage() {
        assert!(PortBinding::parse("http").is_err());
        assert!(PortBinding::parse("80/tcp=0.0.0.0").is_err());
        assert!(PortBinding::parse("1:2:3:4").is_err());
        assert!(PortBinding::parse("99999:80").is_err());
    }

    #[test]
    fn test_elk_preset() {
        let spec = ContainerSpec::elk();
        assert_eq!(spec.name, "elk");
        assert_eq!(spec.image.to_string(), "blacktop/elk:latest");
        assert_eq!(spec.port_bindings.len(), 2);
        assert!(!spec.privileged);
    }
}
