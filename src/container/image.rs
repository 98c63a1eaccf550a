//! Image references and pulling.

use crate::container::{ContainerError, Engine, Result};
use futures::stream::StreamExt;
use std::fmt;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

/// Tag used when a reference does not name one.
pub const DEFAULT_TAG: &str = "latest";

/// An image `repository:tag`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageReference {
    pub repository: String,
    pub tag: String,
}

impl ImageReference {
    /// Create a reference from its parts.
    pub fn new<R: Into<String>, T: Into<String>>(repository: R, tag: T) -> Self {
        Self {
            repository: repository.into(),
            tag: tag.into(),
        }
    }

    /// Parse `repository[:tag]`, defaulting the tag to `latest`.
    ///
    /// A `:` before the last `/` is a registry port, not a tag.
    ///
    /// # Errors
    ///
    /// Returns error if the repository or tag is empty.
    pub fn parse(reference: &str) -> Result<Self> {
        let reference = reference.trim();
        let last_slash = reference.rfind('/').map_or(0, |i| i + 1);

        let (repository, tag) = match reference[last_slash..].rfind(':') {
            Some(i) => {
                let split = last_slash + i;
                (&reference[..split], &reference[split + 1..])
            }
            None => (reference, DEFAULT_TAG),
        };

        if repository.is_empty() || tag.is_empty() {
            return Err(ContainerError::ConfigError(format!(
                "Invalid image reference '{}'",
                reference
            )));
        }

        Ok(Self::new(repository, tag))
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}

/// Pulls images through an [`Engine`], echoing progress.
pub struct ImagePuller {
    engine: Arc<dyn Engine>,
}

impl ImagePuller {
    /// Create a new image puller.
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        Self { engine }
    }

    /// Pull `image`, writing one line per progress event to `out`.
    ///
    /// Blocks until the engine reports completion. A failed pull is not
    /// retried.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::Pull`] if the engine reports an error or the
    /// stream breaks.
    pub async fn pull<W>(&self, image: &ImageReference, out: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        info!(image = %image, "Pulling image");

        let pull_error = |reason: String| ContainerError::Pull {
            image: image.to_string(),
            reason,
        };

        let mut stream = self.engine.pull_image(image);
        while let Some(result) = stream.next().await {
            let event = result.map_err(|e| match e {
                e @ ContainerError::Pull { .. } => e,
                e => pull_error(e.to_string()),
            })?;

            if let Some(line) = progress_line(&event) {
                debug!("Pull: {}", line);
                write_line(out, &line)
                    .await
                    .map_err(|e| pull_error(e.to_string()))?;
            }
        }
        out.flush().await.map_err(|e| pull_error(e.to_string()))?;

        info!(image = %image, "Successfully pulled image");
        Ok(())
    }
}

async fn write_line<W>(out: &mut W, line: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    out.write_all(line.as_bytes()).await?;
    out.write_all(b"\n").await
}

fn progress_line(event: &crate::container::PullProgress) -> Option<String> {
    let status = event.status.as_deref()?;
    let mut line = match &event.id {
        Some(id) => format!("{}: {}", id, status),
        None => status.to_string(),
    };
    if let Some(progress) = &event.progress {
        line.push(' ');
        line.push_str(progress);
    }
    Some(line)
}
