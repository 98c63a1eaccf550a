//! Following container output.

use crate::container::{ContainerError, Engine, OutputStream, Result};
use futures::stream::StreamExt;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Forwards a container's combined output to local writers.
pub struct LogStreamer {
    engine: Arc<dyn Engine>,
}

impl LogStreamer {
    /// Create a new log streamer.
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        Self { engine }
    }

    /// Follow the container's stdout/stderr until the stream closes.
    ///
    /// Stdout chunks go to `out`, stderr chunks to `err`. Returns when the
    /// container exits or the engine drops the connection.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::Stream`] if the stream fails or a writer
    /// rejects output.
    pub async fn stream<O, E>(&self, id: &str, out: &mut O, err: &mut E) -> Result<()>
    where
        O: AsyncWrite + Unpin + ?Sized,
        E: AsyncWrite + Unpin + ?Sized,
    {
        debug!(id, "Attaching to container output");

        let stream_error = |reason: String| ContainerError::Stream {
            id: id.to_string(),
            reason,
        };

        let mut stream = self.engine.logs(id);
        while let Some(result) = stream.next().await {
            let chunk = result.map_err(|e| match e {
                e @ ContainerError::Stream { .. } => e,
                e => stream_error(e.to_string()),
            })?;

            let written = match chunk.stream {
                OutputStream::StdOut => write_flush(out, &chunk.message).await,
                OutputStream::StdErr => write_flush(err, &chunk.message).await,
            };
            written.map_err(|e| stream_error(e.to_string()))?;
        }

        debug!(id, "Container output stream closed");
        Ok(())
    }
}

async fn write_flush<W>(writer: &mut W, bytes: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    writer.write_all(bytes).await?;
    writer.flush().await
}
