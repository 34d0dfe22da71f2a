use clap::Parser;
use jewgo_gateway::app::App;
use jewgo_gateway::cli::Args;
use jewgo_gateway::config::Config;
use jewgo_gateway::logging::setup_logging;
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let args = Args::parse();

    // Load config and setup logging first so startup logs are never silently dropped
    let config = {
        use figment::providers::Env;
        figment::Figment::new()
            .merge(Env::raw())
            .extract::<Config>()
            .expect("Failed to load config")
    };
    setup_logging(&config, args.tracing);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        commit = env!("GIT_COMMIT_SHORT"),
        environment = if cfg!(debug_assertions) {
            "development"
        } else {
            "production"
        },
        "starting jewgo-gateway"
    );

    let app = match App::new(config) {
        Ok(app) => app,
        Err(e) => {
            error!(error = ?e, "Failed to initialize application");
            return ExitCode::FAILURE;
        }
    };

    app.run().await
}
