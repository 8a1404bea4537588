//! DeskOps Daemon - Main Entry Point
//! Wires the OS adapters into the dispatcher and serves it over JSON-RPC.

mod config;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::{DaemonConfig, LogFormat, ENV_LOG_FORMAT};
use deskops_api_rpc::RpcServer;
use deskops_core::application::{
    ApplicationRegistry, OperationDispatcher, PlatformProfile, Sampler, TelemetryAssembler,
    TelemetryLog,
};
use deskops_core::port::time_provider::SystemTimeProvider;
use deskops_core::port::{CommandRunner, TimeProvider};
use deskops_infra_system::{
    LocalFilesystem, SubprocessCommandRunner, SysinfoHostInfo, SystemBrowserLauncher,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn init_tracing(format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("deskops=info"));

    match format {
        LogFormat::Json => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }
}

fn build_dispatcher(config: &DaemonConfig) -> Result<OperationDispatcher> {
    let time_provider: Arc<dyn TimeProvider> = Arc::new(SystemTimeProvider);
    let runner: Arc<dyn CommandRunner> = Arc::new(SubprocessCommandRunner::new());
    let profile = Arc::new(PlatformProfile::resolve(config.platform));

    let filesystem =
        LocalFilesystem::from_current_dir().context("Failed to resolve working directory")?;
    info!(base_dir = %filesystem.base_dir().display(), "Filesystem rooted");

    let telemetry = Arc::new(TelemetryAssembler::new(
        profile.clone(),
        runner.clone(),
        Arc::new(SysinfoHostInfo::new()),
        time_provider.clone(),
        Sampler::new(config.sample_window),
        Arc::new(TelemetryLog::new(config.telemetry_history)),
    ));

    Ok(OperationDispatcher::new(
        profile,
        runner.clone(),
        Arc::new(filesystem),
        Arc::new(SystemBrowserLauncher::new(config.platform, runner)),
        Arc::new(ApplicationRegistry::new(time_provider.clone())),
        telemetry,
        time_provider,
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Logging first so config warnings are visible
    let log_format = std::env::var(ENV_LOG_FORMAT)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_default();
    init_tracing(log_format);

    info!("DeskOps daemon v{} starting...", VERSION);

    // 2. Load configuration
    let config = DaemonConfig::from_env();
    info!(
        platform = %config.platform,
        samples = config.sample_window.count,
        window_ms = config.sample_window.window.as_millis() as u64,
        history = config.telemetry_history,
        "Configuration loaded"
    );

    // 3. Setup dependencies (DI wiring)
    let dispatcher = Arc::new(build_dispatcher(&config)?);

    // 4. Start JSON-RPC server
    let (addr, rpc_handle) = RpcServer::new(config.rpc.clone(), dispatcher)
        .start()
        .await
        .context("RPC server start failed")?;

    info!(addr = %addr, "System ready. Press Ctrl+C to shutdown");

    // 5. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");
    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    rpc_handle.stopped().await;

    info!("Shutdown complete.");
    Ok(())
}
