//! Idempotent container provisioning.
//!
//! Provides the check-pull-create-start workflow for one named container.
//! A name that already exists is a successful no-op.

use crate::container::{
    ContainerRecord, ContainerSpec, Engine, ImagePuller, LogStreamer,
    ProvisionLock, Result, container_exists, image_exists,
};
use crate::env;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// Container provisioner configuration.
#[derive(Debug, Clone)]
pub struct ProvisionerConfig {
    /// Deployment mode, attached to every log line as `env`
    pub environment: String,
    /// Directory holding per-name lock files
    pub lock_dir: PathBuf,
    /// Engine address shown when a container already exists
    pub advertise_ip: Option<String>,
}

impl Default for ProvisionerConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            lock_dir: env::default_lock_dir(),
            advertise_ip: None,
        }
    }
}

/// How a provisioning run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// A container with the requested name already existed; nothing changed.
    AlreadyProvisioned(ContainerRecord),
    /// The container was created and started.
    Provisioned(ContainerRecord),
}

impl ProvisionOutcome {
    /// The container record, however the run ended.
    pub fn record(&self) -> &ContainerRecord {
        match self {
            ProvisionOutcome::AlreadyProvisioned(record) | ProvisionOutcome::Provisioned(record) => {
                record
            }
        }
    }

    /// Process exit status for this outcome. Both outcomes are successes.
    pub fn exit_code(&self) -> i32 {
        0
    }
}

/// Provisions named containers through an [`Engine`].
pub struct ContainerProvisioner {
    engine: Arc<dyn Engine>,
    config: ProvisionerConfig,
}

impl ContainerProvisioner {
    /// Create a provisioner over an engine connection.
    pub fn new(engine: Arc<dyn Engine>, config: ProvisionerConfig) -> Self {
        Self { engine, config }
    }

    /// Make sure a container matching `spec` exists and is started.
    ///
    /// 1. Ping the engine.
    /// 2. Lock the name against concurrent runs until the container is
    ///    started.
    /// 3. If a container with this name exists, return
    ///    [`ProvisionOutcome::AlreadyProvisioned`] without touching it.
    /// 4. Pull the image if it is not present.
    /// 5. Create, then start the container.
    /// 6. Optionally follow its output until it exits.
    ///
    /// # Errors
    ///
    /// Stops at the first failing step and returns its error, logged with
    /// the deployment mode and failing operation.
    pub async fn provision(
        &self,
        spec: &ContainerSpec,
        attach_logs: bool,
    ) -> Result<ProvisionOutcome> {
        self.run(spec, attach_logs).await.inspect_err(|e| {
            error!(
                env = %self.config.environment,
                op = e.op(),
                name = %spec.name,
                "{}",
                e
            );
        })
    }

    async fn run(&self, spec: &ContainerSpec, attach_logs: bool) -> Result<ProvisionOutcome> {
        let mode = self.config.environment.as_str();

        self.engine.ping().await?;

        let lock = ProvisionLock::acquire(&self.config.lock_dir, &spec.name)?;

        if let Some(record) = container_exists(self.engine.as_ref(), &spec.name).await? {
            let url = self
                .config
                .advertise_ip
                .as_deref()
                .filter(|ip| !ip.is_empty())
                .map(|ip| format!("http://{}", ip))
                .unwrap_or_default();
            info!(
                exists = true,
                name = %spec.name,
                id = %record.id,
                env = mode,
                url = %url,
                "Container is already running..."
            );
            return Ok(ProvisionOutcome::AlreadyProvisioned(record));
        }

        if image_exists(self.engine.as_ref(), &spec.image).await?.is_some() {
            info!(exists = true, env = mode, "Image `{}` already pulled.", spec.image);
        } else {
            info!(exists = false, env = mode, "Pulling Image `{}`", spec.image);
            ImagePuller::new(self.engine.clone())
                .pull(&spec.image, &mut tokio::io::stdout())
                .await?;
        }

        let id = self.engine.create_container(spec).await?;
        self.engine.start_container(&id).await?;

        let record = self.engine.inspect_container(&id).await?;
        info!(
            name = %record.name,
            id = %record.id,
            state = %record.state,
            env = mode,
            "Container started"
        );

        // Lock covers check through start only; following output can run for hours.
        drop(lock);

        if attach_logs {
            LogStreamer::new(self.engine.clone())
                .stream(&id, &mut tokio::io::stdout(), &mut tokio::io::stderr())
                .await?;
        }

        Ok(ProvisionOutcome::Provisioned(record))
    }
}
