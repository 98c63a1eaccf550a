use dockhand::app;
use dockhand::cli::{Args, ConfigDiscovery};
use dockhand::logging::init_logging;
use tracing::info;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let mode = match args.mode() {
        Ok(mode) => mode,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let config = match ConfigDiscovery::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);
    info!(env = %config.environment.run, "Starting dockhand");
    match ConfigDiscovery::config_source(args.config.as_deref()) {
        Some(path) => info!(path = %path.display(), "Loaded configuration"),
        None => info!("No configuration file found, using defaults"),
    }

    let code = app::run(mode, &config).await;
    std::process::exit(code);
}
