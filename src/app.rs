use crate::config::Config;
use crate::state::AppState;
use crate::upstream::UpstreamApi;
use crate::utils::fmt_duration;
use crate::web::create_router;
use anyhow::Context;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

/// Main application struct containing all necessary components
pub struct App {
    config: Config,
    app_state: AppState,
}

impl App {
    /// Create a new App instance with all necessary components initialized
    pub fn new(config: Config) -> Result<Self, anyhow::Error> {
        let upstream = UpstreamApi::new(&config.upstream_base_url, config.upstream_timeout())
            .context("Failed to create upstream client")?;

        let app_state = AppState::new(Arc::new(upstream), &config);

        info!(
            upstream = %config.upstream_base_url,
            listings_ttl = fmt_duration(config.listings_cache_ttl()),
            filter_options_ttl = fmt_duration(config.filter_options_ttl()),
            recency_window = fmt_duration(config.recency_window()),
            max_entries = config.cache_max_entries,
            "caches configured"
        );

        Ok(App { config, app_state })
    }

    /// Run the HTTP server until a shutdown signal arrives.
    pub async fn run(self) -> ExitCode {
        let router = create_router(self.app_state);
        let addr = format!("0.0.0.0:{}", self.config.port);

        let listener = match tokio::net::TcpListener::bind(&addr).await {
            Ok(listener) => listener,
            Err(e) => {
                error!(error = %e, addr, "Failed to bind listener");
                return ExitCode::FAILURE;
            }
        };
        info!(addr, "web server listening");

        let serve = axum::serve(listener, router).with_graceful_shutdown(shutdown_signal());
        match serve.await {
            Ok(()) => {
                info!("web server stopped cleanly");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!(error = %e, "web server exited with error");
                ExitCode::FAILURE
            }
        }
    }
}

/// Resolve on ctrl-c or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install ctrl-c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => error!(error = %e, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("ctrl-c received, shutting down"),
        _ = terminate => info!("SIGTERM received, shutting down"),
    }
}
