//! In-memory engine that records every call.

#![allow(dead_code)]

use async_trait::async_trait;
use dockhand::container::{
    ContainerError, ContainerRecord, ContainerSpec, Engine, ImageRecord, ImageReference,
    LogChunk, LogStream, OutputStream, ProgressStream, PullProgress, Result,
};
use futures::stream::{self, StreamExt};
use std::io;
use std::pin::Pin;
use std::sync::Mutex;
use std::task::{Context, Poll};
use tokio::io::AsyncWrite;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Ping,
    ListContainers,
    ListImages,
    Inspect(String),
    Pull(String),
    Create(String),
    Start(String),
    Logs(String),
}

impl Call {
    pub fn is_mutating(&self) -> bool {
        matches!(self, Call::Pull(_) | Call::Create(_) | Call::Start(_))
    }
}

#[derive(Default)]
pub struct RecordingEngine {
    pub containers: Mutex<Vec<ContainerRecord>>,
    pub images: Mutex<Vec<ImageRecord>>,
    pub calls: Mutex<Vec<Call>>,
    pub created: Mutex<Vec<ContainerSpec>>,
    pub log_output: Vec<LogChunk>,
    pub ping_fails: bool,
    pub list_fails: bool,
    pub images_fail: bool,
    pub pull_fails: bool,
    pub create_fails: bool,
    pub start_fails: bool,
    /// Fail the log stream with this message after the canned output
    pub log_error: Option<String>,
    /// Keep the log stream open forever after the canned output
    pub logs_never_end: bool,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_container(self, name: &str, image: &str) -> Self {
        self.containers.lock().unwrap().push(ContainerRecord {
            id: format!("id-{}", name),
            name: name.to_string(),
            image: image.to_string(),
            state: "running".to_string(),
        });
        self
    }

    pub fn with_image(self, repo_tag: &str) -> Self {
        self.images.lock().unwrap().push(ImageRecord {
            id: format!("sha256:{}", repo_tag.len()),
            repo_tags: vec![repo_tag.to_string()],
        });
        self
    }

    pub fn with_log_output(mut self, chunks: Vec<(OutputStream, &str)>) -> Self {
        self.log_output = chunks
            .into_iter()
            .map(|(stream, text)| LogChunk {
                stream,
                message: text.as_bytes().to_vec(),
            })
            .collect();
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn mutating_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutating).collect()
    }

    pub fn created(&self) -> Vec<ContainerSpec> {
        self.created.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Engine for RecordingEngine {
    async fn ping(&self) -> Result<()> {
        self.record(Call::Ping);
        if self.ping_fails {
            return Err(ContainerError::Connection {
                endpoint: "tcp://127.0.0.1:2376".to_string(),
                reason: "connection refused".to_string(),
            });
        }
        Ok(())
    }

    async fn list_containers(&self) -> Result<Vec<ContainerRecord>> {
        self.record(Call::ListContainers);
        if self.list_fails {
            return Err(ContainerError::Lookup("engine went away".to_string()));
        }
        Ok(self.containers.lock().unwrap().clone())
    }

    async fn list_images(&self) -> Result<Vec<ImageRecord>> {
        self.record(Call::ListImages);
        if self.images_fail {
            return Err(ContainerError::Lookup("image store unavailable".to_string()));
        }
        Ok(self.images.lock().unwrap().clone())
    }

    async fn inspect_container(&self, id: &str) -> Result<ContainerRecord> {
        self.record(Call::Inspect(id.to_string()));
        self.containers
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))
    }

    fn pull_image(&self, image: &ImageReference) -> ProgressStream<'_> {
        self.record(Call::Pull(image.to_string()));

        let progress = Ok(PullProgress {
            id: Some(image.tag.clone()),
            status: Some("Pulling from library".to_string()),
            progress: None,
        });

        if self.pull_fails {
            let failure = Err(ContainerError::Pull {
                image: image.to_string(),
                reason: "manifest unknown".to_string(),
            });
            return stream::iter(vec![progress, failure]).boxed();
        }

        self.images.lock().unwrap().push(ImageRecord {
            id: "sha256:pulled".to_string(),
            repo_tags: vec![image.to_string()],
        });
        stream::iter(vec![progress]).boxed()
    }

    async fn create_container(&self, spec: &ContainerSpec) -> Result<String> {
        self.record(Call::Create(spec.name.clone()));
        if self.create_fails {
            return Err(ContainerError::Create {
                name: spec.name.clone(),
                reason: "Conflict. The container name is already in use".to_string(),
            });
        }

        let id = format!("id-{}", spec.name);
        self.created.lock().unwrap().push(spec.clone());
        self.containers.lock().unwrap().push(ContainerRecord {
            id: id.clone(),
            name: spec.name.clone(),
            image: spec.image.to_string(),
            state: "created".to_string(),
        });
        Ok(id)
    }

    async fn start_container(&self, id: &str) -> Result<()> {
        self.record(Call::Start(id.to_string()));
        if self.start_fails {
            return Err(ContainerError::Start {
                id: id.to_string(),
                reason: "port is already allocated".to_string(),
            });
        }

        if let Some(c) = self.containers.lock().unwrap().iter_mut().find(|c| c.id == id) {
            c.state = "running".to_string();
        }
        Ok(())
    }

    fn logs(&self, id: &str) -> LogStream<'_> {
        self.record(Call::Logs(id.to_string()));
        let output = stream::iter(self.log_output.clone().into_iter().map(Ok));

        if self.logs_never_end {
            return output.chain(stream::pending()).boxed();
        }
        match &self.log_error {
            Some(message) => output
                .chain(stream::once(futures::future::ready(Err(
                    ContainerError::IoError(io::Error::other(message.clone())),
                ))))
                .boxed(),
            None => output.boxed(),
        }
    }
}

/// Writer that rejects every write.
pub struct BrokenWriter;

impl AsyncWrite for BrokenWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed")))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
