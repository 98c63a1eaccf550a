//! Remediation guidance when the container engine is unreachable.
//!
//! On macOS and Windows the engine usually runs inside a docker-machine VM;
//! the advice depends on whether `docker-machine` is installed. On Linux the
//! daemon runs natively.

use crate::container::ContainerError;
use tracing::{error, info};

/// Exit status after reporting an unreachable engine.
pub const EXIT_ENGINE_UNREACHABLE: i32 = 2;

/// Exit status for any other provisioning failure.
pub const EXIT_FAILURE: i32 = 1;

/// Host platform for remediation guidance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOS,
    Linux,
    Windows,
}

impl Platform {
    /// Detect the current platform.
    pub fn current() -> Self {
        match std::env::consts::OS {
            "macos" => Platform::MacOS,
            "windows" => Platform::Windows,
            _ => Platform::Linux,
        }
    }

    /// Name of the engine-management helper binary, if this platform uses one.
    pub fn helper_binary(&self) -> Option<&'static str> {
        match self {
            Platform::MacOS => Some("docker-machine"),
            Platform::Windows => Some("docker-machine.exe"),
            Platform::Linux => None,
        }
    }
}

/// Explains how to get the engine running on this host.
#[derive(Debug, Clone)]
pub struct ConnectionFailureAdvisor {
    platform: Platform,
    machine_name: String,
    helper_installed: bool,
}

impl ConnectionFailureAdvisor {
    /// Create an advisor, checking PATH for the platform's helper binary.
    pub fn new<S: Into<String>>(platform: Platform, machine_name: S) -> Self {
        let helper_installed = platform
            .helper_binary()
            .is_some_and(|bin| which::which(bin).is_ok());

        Self {
            platform,
            machine_name: machine_name.into(),
            helper_installed,
        }
    }

    /// Override helper detection.
    pub fn with_helper_installed(mut self, installed: bool) -> Self {
        self.helper_installed = installed;
        self
    }

    /// Remediation text for this host.
    pub fn guidance(&self) -> String {
        let name = &self.machine_name;
        let start_machine = format!(
            "Please start and source the docker-machine env by running: \n\tdocker-machine start {name}\n\teval $(docker-machine env {name})\n"
        );

        match (self.platform, self.helper_installed) {
            (Platform::MacOS, false) => format!(
                "Please install docker-machine by running: \n\tbrew install docker-machine\n\tdocker-machine create -d virtualbox {name}\n\teval $(docker-machine env {name})\n"
            ),
            (Platform::Windows, false) => {
                "Please install docker-machine - https://www.docker.com/docker-toolbox".to_string()
            }
            (Platform::MacOS | Platform::Windows, true) => start_machine,
            (Platform::Linux, _) => "Please start the docker daemon.".to_string(),
        }
    }

    /// Log the connection failure followed by remediation guidance.
    ///
    /// The caller decides whether to exit; [`EXIT_ENGINE_UNREACHABLE`] is the
    /// conventional status.
    pub fn report(&self, endpoint: &str, environment: &str) {
        error!(
            env = environment,
            endpoint, "Unable to connect to docker client"
        );
        info!("{}", self.guidance());
    }
}

/// Process exit status for a provisioning error.
pub fn exit_code_for(err: &ContainerError) -> i32 {
    if err.is_connection() {
        EXIT_ENGINE_UNREACHABLE
    } else {
        EXIT_FAILURE
    }
}
