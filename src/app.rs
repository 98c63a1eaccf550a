//! Command execution and exit status policy.
//!
//! Library code returns typed errors; this is the one place that decides
//! what each outcome means for the process exit status.

use crate::advisor::{self, ConnectionFailureAdvisor, Platform};
use crate::cli::{AppConfig, ConfigDiscovery, ExecutionMode, ProvisionConfig};
use crate::container::{
    ContainerClient, ContainerProvisioner, Endpoint, EndpointResolver, Engine, ProvisionOutcome,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Run a parsed command, returning the process exit status.
pub async fn run(mode: ExecutionMode, config: &AppConfig) -> i32 {
    let endpoint = EndpointResolver::from_env(&config.docker.endpoint);
    let advisor = ConnectionFailureAdvisor::new(Platform::current(), &config.docker.name);

    match mode {
        ExecutionMode::ShowConfig => {
            ConfigDiscovery::show_discovery_info();
            println!();
            println!("Engine endpoint: {}", endpoint.host);
            println!("TLS material:    {}", endpoint.ca_path.display());
            println!("Deployment mode: {}", config.environment.run);
            0
        }
        ExecutionMode::Ping => match connect(&endpoint, config, &advisor) {
            Ok(engine) => ping(engine.as_ref(), &endpoint, config, &advisor).await,
            Err(code) => code,
        },
        ExecutionMode::Provision(request) => match connect(&endpoint, config, &advisor) {
            Ok(engine) => provision(engine, &endpoint, config, &request, &advisor).await,
            Err(code) => code,
        },
    }
}

fn connect(
    endpoint: &Endpoint,
    config: &AppConfig,
    advisor: &ConnectionFailureAdvisor,
) -> Result<Arc<dyn Engine>, i32> {
    match ContainerClient::connect(endpoint, &config.client_config()) {
        Ok(client) => Ok(Arc::new(client)),
        Err(e) => {
            debug!("{}", e);
            advisor.report(&endpoint.host, &config.environment.run);
            Err(advisor::EXIT_ENGINE_UNREACHABLE)
        }
    }
}

/// Verify the engine answers.
pub async fn ping(
    engine: &dyn Engine,
    endpoint: &Endpoint,
    config: &AppConfig,
    advisor: &ConnectionFailureAdvisor,
) -> i32 {
    match engine.ping().await {
        Ok(()) => {
            println!("Container engine at {} is reachable", endpoint.host);
            0
        }
        Err(e) => {
            debug!("{}", e);
            advisor.report(&endpoint.host, &config.environment.run);
            advisor::EXIT_ENGINE_UNREACHABLE
        }
    }
}

/// Provision one container and map the outcome to an exit status.
///
/// An unreachable engine prints remediation guidance and yields
/// [`advisor::EXIT_ENGINE_UNREACHABLE`]. Other failures are already logged
/// by the provisioner and yield [`advisor::EXIT_FAILURE`].
pub async fn provision(
    engine: Arc<dyn Engine>,
    endpoint: &Endpoint,
    config: &AppConfig,
    request: &ProvisionConfig,
    advisor: &ConnectionFailureAdvisor,
) -> i32 {
    let advertise_ip = Some(endpoint.ip().to_string());
    let provisioner = ContainerProvisioner::new(engine, config.provisioner_config(advertise_ip));

    match provisioner.provision(&request.spec, request.attach_logs).await {
        Ok(outcome) => {
            if let ProvisionOutcome::Provisioned(record) = &outcome {
                info!(name = %record.name, id = %record.id, "Provisioning complete");
            }
            outcome.exit_code()
        }
        Err(e) if e.is_connection() => {
            advisor.report(&endpoint.host, &config.environment.run);
            advisor::exit_code_for(&e)
        }
        Err(e) => advisor::exit_code_for(&e),
    }
}
