pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod entities;
pub mod forms;
pub mod services;
pub mod state;
pub mod web;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, SessionCommands, UserCommands};
pub use config::Config;
use config::{GeneralConfig, LogFormat};

pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    if matches!(cli.command, Some(Commands::Init)) {
        return cli::cmd_init(cli.config.as_deref());
    }

    config.validate()?;
    init_tracing(&config.general);

    match cli.command {
        None | Some(Commands::Serve) => {
            let prometheus_handle = if config.observability.metrics_enabled {
                use metrics_exporter_prometheus::PrometheusBuilder;
                let handle = PrometheusBuilder::new()
                    .install_recorder()
                    .context("Failed to install Prometheus recorder")?;
                info!("Prometheus metrics recorder initialized");
                Some(handle)
            } else {
                None
            };

            run_server(config, prometheus_handle).await
        }
        Some(Commands::Users { command }) => match command {
            UserCommands::List { json } => cli::cmd_users_list(&config, json).await,
            UserCommands::Remove { username, yes } => {
                cli::cmd_users_remove(&config, &username, yes).await
            }
        },
        Some(Commands::Sessions { command }) => match command {
            SessionCommands::Prune => cli::cmd_sessions_prune(&config).await,
        },
        Some(Commands::Init) => Ok(()),
    }
}

/// `RUST_LOG` wins over `general.log_level`.
pub fn init_tracing(general: &GeneralConfig) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&general.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    match general.log_format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

async fn run_server(
    config: Config,
    prometheus_handle: Option<metrics_exporter_prometheus::PrometheusHandle>,
) -> anyhow::Result<()> {
    info!("Feedback v{} starting...", env!("CARGO_PKG_VERSION"));

    let addr = config.bind_address();
    let state = web::create_app_state_from_config(config, prometheus_handle).await?;
    let app = web::router(state).await?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("🌐 Web Server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Error listening for shutdown: {}", e),
    }
}
