//! Docker engine client.
//!
//! Wraps the bollard Docker API behind the [`Engine`] trait. TCP endpoints
//! always connect over TLS.

use crate::container::{
    ContainerError, ContainerRecord, ContainerSpec, Endpoint, Engine, ImageRecord,
    ImageReference, LogChunk, LogStream, OutputStream, ProgressStream, PullProgress, Result,
};
use async_trait::async_trait;
use bollard::Docker;
use bollard::container::LogOutput;
use bollard::models::{ContainerCreateBody, HostConfig, PortBinding as BollardPortBinding};
use bollard::query_parameters::{
    CreateContainerOptionsBuilder, CreateImageOptionsBuilder, InspectContainerOptions,
    ListContainersOptionsBuilder, ListImagesOptionsBuilder, LogsOptionsBuilder,
    StartContainerOptions,
};
use futures::stream::StreamExt;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Container client configuration.
#[derive(Debug, Clone)]
pub struct ContainerClientConfig {
    /// Request timeout in seconds
    pub timeout: u64,
}

impl Default for ContainerClientConfig {
    fn default() -> Self {
        Self { timeout: 120 }
    }
}

/// Docker API client.
///
/// Holds one connection to the engine for the life of the process.
#[derive(Clone)]
pub struct ContainerClient {
    docker: Arc<Docker>,
    endpoint: String,
}

impl ContainerClient {
    /// Connect to the engine at `endpoint`.
    ///
    /// Does not contact the engine; call [`Engine::ping`] to verify it.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::Connection`] if the client cannot be built,
    /// e.g. the TLS material is missing or unreadable.
    pub fn connect(endpoint: &Endpoint, config: &ContainerClientConfig) -> Result<Self> {
        let docker = Self::connect_docker(endpoint, config).map_err(|e| {
            ContainerError::Connection {
                endpoint: endpoint.host.clone(),
                reason: e.to_string(),
            }
        })?;

        info!(endpoint = %endpoint.host, "Created container engine client");

        Ok(Self {
            docker: Arc::new(docker),
            endpoint: endpoint.host.clone(),
        })
    }

    /// Pick a connection strategy from the endpoint scheme:
    /// 1. empty → local defaults
    /// 2. `unix://` or `npipe://` → local socket
    /// 3. `http://` → plain HTTP, only when asked for explicitly
    /// 4. anything else (`tcp://`, `https://`) → TLS with the endpoint's
    ///    certificate material
    fn connect_docker(
        endpoint: &Endpoint,
        config: &ContainerClientConfig,
    ) -> std::result::Result<Docker, bollard::errors::Error> {
        let host = endpoint.host.as_str();

        if host.is_empty() {
            debug!("No endpoint configured, using local defaults");
            return Docker::connect_with_local_defaults();
        }

        if host.starts_with("unix://") || host.starts_with("npipe://") {
            debug!("Connecting via socket: {}", host);
            return Docker::connect_with_socket(host, config.timeout, bollard::API_DEFAULT_VERSION);
        }

        if host.starts_with("http://") {
            warn!("Connecting without TLS: {}", host);
            return Docker::connect_with_http(host, config.timeout, bollard::API_DEFAULT_VERSION);
        }

        if !endpoint.has_tls_material() {
            warn!(
                "{} is not set, looking for TLS material in the working directory",
                crate::env::DOCKER_CERT_PATH_VAR
            );
        }

        debug!(
            ca = %endpoint.ca_path.display(),
            cert = %endpoint.cert_path.display(),
            "Connecting via TLS: {}",
            host
        );
        Docker::connect_with_ssl(
            host,
            &endpoint.key_path,
            &endpoint.cert_path,
            &endpoint.ca_path,
            config.timeout,
            bollard::API_DEFAULT_VERSION,
        )
    }

    /// Get the underlying Docker client.
    pub fn docker(&self) -> &Docker {
        &self.docker
    }

    /// Endpoint this client talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Build the engine host configuration for `spec`.
///
/// Port bindings pass through unchanged, grouped by container port.
pub fn host_config(spec: &ContainerSpec) -> HostConfig {
    let mut port_bindings: HashMap<String, Option<Vec<BollardPortBinding>>> = HashMap::new();
    for binding in &spec.port_bindings {
        port_bindings
            .entry(binding.container_port.clone())
            .or_insert_with(|| Some(Vec::new()))
            .get_or_insert_with(Vec::new)
            .push(BollardPortBinding {
                host_ip: Some(binding.host_ip.clone()),
                host_port: Some(binding.host_port.clone()),
            });
    }

    HostConfig {
        port_bindings: if port_bindings.is_empty() {
            None
        } else {
            Some(port_bindings)
        },
        privileged: Some(spec.privileged),
        ..Default::default()
    }
}

fn not_found_or(e: bollard::errors::Error, id: &str) -> ContainerError {
    match e {
        bollard::errors::Error::DockerResponseServerError {
            status_code: 404, ..
        } => ContainerError::NotFound(id.to_string()),
        e => ContainerError::ApiError(e),
    }
}

#[async_trait]
impl Engine for ContainerClient {
    async fn ping(&self) -> Result<()> {
        self.docker
            .ping()
            .await
            .map_err(|e| ContainerError::Connection {
                endpoint: self.endpoint.clone(),
                reason: e.to_string(),
            })?;
        debug!("Container engine ping successful");
        Ok(())
    }

    async fn list_containers(&self) -> Result<Vec<ContainerRecord>> {
        let containers = self
            .docker
            .list_containers(Some(ListContainersOptionsBuilder::new().all(true).build()))
            .await
            .map_err(|e| ContainerError::Lookup(format!("Failed to list containers: {}", e)))?;

        Ok(containers
            .into_iter()
            .flat_map(|c| {
                let id = c.id.unwrap_or_default();
                let image = c.image.unwrap_or_default();
                let state = c.state.map(|s| s.to_string()).unwrap_or_default();
                c.names
                    .unwrap_or_default()
                    .into_iter()
                    .map(move |name| ContainerRecord {
                        id: id.clone(),
                        name: name.trim_start_matches('/').to_string(),
                        image: image.clone(),
                        state: state.clone(),
                    })
            })
            .collect())
    }

    async fn list_images(&self) -> Result<Vec<ImageRecord>> {
        let images = self
            .docker
            .list_images(Some(ListImagesOptionsBuilder::new().all(false).build()))
            .await
            .map_err(|e| ContainerError::Lookup(format!("Failed to list images: {}", e)))?;

        Ok(images
            .into_iter()
            .map(|img| ImageRecord {
                id: img.id,
                repo_tags: img.repo_tags,
            })
            .collect())
    }

    async fn inspect_container(&self, id: &str) -> Result<ContainerRecord> {
        let inspect = self
            .docker
            .inspect_container(id, None::<InspectContainerOptions>)
            .await
            .map_err(|e| not_found_or(e, id))?;

        Ok(ContainerRecord {
            id: inspect.id.unwrap_or_else(|| id.to_string()),
            name: inspect
                .name
                .map(|n| n.trim_start_matches('/').to_string())
                .unwrap_or_default(),
            image: inspect.config.and_then(|c| c.image).unwrap_or_default(),
            state: inspect
                .state
                .and_then(|s| s.status)
                .map(|s| s.to_string())
                .unwrap_or_default(),
        })
    }

    fn pull_image(&self, image: &ImageReference) -> ProgressStream<'_> {
        let options = CreateImageOptionsBuilder::new()
            .from_image(&image.repository)
            .tag(&image.tag)
            .build();
        let image_name = image.to_string();

        self.docker
            .create_image(Some(options), None, None)
            .map(move |result| match result {
                Ok(info) => match info.error {
                    Some(error) => Err(ContainerError::Pull {
                        image: image_name.clone(),
                        reason: error,
                    }),
                    None => Ok(PullProgress {
                        id: info.id,
                        status: info.status,
                        progress: info.progress,
                    }),
                },
                Err(e) => Err(ContainerError::Pull {
                    image: image_name.clone(),
                    reason: e.to_string(),
                }),
            })
            .boxed()
    }

    async fn create_container(&self, spec: &ContainerSpec) -> Result<String> {
        let options = CreateContainerOptionsBuilder::new().name(&spec.name).build();

        let body = ContainerCreateBody {
            image: Some(spec.image.to_string()),
            host_config: Some(host_config(spec)),
            ..Default::default()
        };

        debug!(name = %spec.name, image = %spec.image, "Creating container");

        let response = self
            .docker
            .create_container(Some(options), body)
            .await
            .map_err(|e| ContainerError::Create {
                name: spec.name.clone(),
                reason: e.to_string(),
            })?;

        for warning in &response.warnings {
            debug!(name = %spec.name, "Create warning: {}", warning);
        }

        info!("Created container: {} ({})", spec.name, response.id);
        Ok(response.id)
    }

    async fn start_container(&self, id: &str) -> Result<()> {
        self.docker
            .start_container(id, None::<StartContainerOptions>)
            .await
            .map_err(|e| ContainerError::Start {
                id: id.to_string(),
                reason: e.to_string(),
            })?;

        info!("Started container: {}", id);
        Ok(())
    }

    fn logs(&self, id: &str) -> LogStream<'_> {
        let options = LogsOptionsBuilder::new()
            .follow(true)
            .stdout(true)
            .stderr(true)
            .timestamps(false)
            .build();
        let container_id = id.to_string();

        self.docker
            .logs(id, Some(options))
            .filter_map(move |result| {
                let item = match result {
                    Ok(LogOutput::StdOut { message }) | Ok(LogOutput::Console { message }) => {
                        Some(Ok(LogChunk {
                            stream: OutputStream::StdOut,
                            message: message.to_vec(),
                        }))
                    }
                    Ok(LogOutput::StdErr { message }) => Some(Ok(LogChunk {
                        stream: OutputStream::StdErr,
                        message: message.to_vec(),
                    })),
                    Ok(LogOutput::StdIn { .. }) => None,
                    Err(e) => Some(Err(ContainerError::Stream {
                        id: container_id.clone(),
                        reason: e.to_string(),
                    })),
                };
                futures::future::ready(item)
            })
            .boxed()
    }
}
