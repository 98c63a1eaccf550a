//! The container engine boundary.
//!
//! Every component talks to the engine through [`Engine`], so the same
//! provisioning flow runs against bollard or against a test double.

use crate::container::{ContainerSpec, ImageReference, Result};
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Container as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRecord {
    /// Container ID
    pub id: String,
    /// Container name, without the engine's leading `/`
    pub name: String,
    /// Image the container was created from
    pub image: String,
    /// Current state (created, running, exited, ...)
    pub state: String,
}

/// Image as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    /// Image ID
    pub id: String,
    /// Repository tags, `repository:tag`
    pub repo_tags: Vec<String>,
}

/// One progress event of an image pull.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullProgress {
    /// Layer ID the event refers to
    pub id: Option<String>,
    /// Status message
    pub status: Option<String>,
    /// Progress bar text
    pub progress: Option<String>,
}

/// Which output stream a log chunk came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    StdOut,
    StdErr,
}

/// A chunk of container output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogChunk {
    pub stream: OutputStream,
    pub message: Vec<u8>,
}

/// Stream of image pull progress.
pub type ProgressStream<'a> = BoxStream<'a, Result<PullProgress>>;

/// Stream of container output.
pub type LogStream<'a> = BoxStream<'a, Result<LogChunk>>;

/// Operations consumed from the container engine.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Verify the engine is reachable.
    async fn ping(&self) -> Result<()>;

    /// List all containers, running or not.
    async fn list_containers(&self) -> Result<Vec<ContainerRecord>>;

    /// List all local images.
    async fn list_images(&self) -> Result<Vec<ImageRecord>>;

    /// Inspect a container by ID or name.
    async fn inspect_container(&self, id: &str) -> Result<ContainerRecord>;

    /// Pull `image`, reporting progress until the engine finishes.
    fn pull_image(&self, image: &ImageReference) -> ProgressStream<'_>;

    /// Create a container from `spec`, returning its ID.
    async fn create_container(&self, spec: &ContainerSpec) -> Result<String>;

    /// Start a created container with no runtime overrides.
    async fn start_container(&self, id: &str) -> Result<()>;

    /// Follow combined stdout/stderr of a container.
    fn logs(&self, id: &str) -> LogStream<'_>;
}
