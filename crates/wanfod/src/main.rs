// # wanfod - Dual-WAN Failover Daemon
//
// The wanfod daemon is a thin integration layer. All failover logic lives
// in wanfo-core; this binary is responsible for:
// 1. Reading the YAML config (plus environment overrides)
// 2. Checking privileges and preparing the gateway state directory
// 3. Initializing logging (stdout and the optional log file) and the runtime
// 4. Wiring the iproute2 collaborators into the engine
// 5. Running the scheduler and REST API until SIGTERM/SIGINT
//
// ## Configuration
//
// `wanfod --config /etc/wan-failover/config.yaml`
//
// Environment overrides:
// - `WANFO_LOG_LEVEL`: trace, debug, info, warn, error
// - `WANFO_API_KEY`: REST API key
//
// ## Example
//
// ```bash
// export WANFO_API_KEY=$(openssl rand -hex 24)
// sudo -E wanfod -c /etc/wan-failover/config.yaml
// ```

mod logging;
mod settings;

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};
use wanfo_api::ApiState;
use wanfo_core::{FailoverConfig, FailoverEngine, FallbackResolver, StateFileResolver};
use wanfo_iproute::{IpRouteController, PingProbe, RouteTableResolver};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Upper bound on draining the scheduler and API after a signal
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum WanfoExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<WanfoExitCode> for ExitCode {
    fn from(code: WanfoExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

#[derive(Parser, Debug)]
#[command(name = "wanfod", version, about = "Dual-WAN failover daemon")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "/etc/wan-failover/config.yaml")]
    config: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match settings::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return WanfoExitCode::ConfigError.into();
        }
    };

    if !running_as_root() {
        eprintln!("This daemon must run as root (needs ip route access)");
        return WanfoExitCode::ConfigError.into();
    }

    if let Err(e) = std::fs::create_dir_all(&config.gateway_state_dir) {
        eprintln!(
            "Failed to create gateway state directory {}: {}",
            config.gateway_state_dir.display(),
            e
        );
        return WanfoExitCode::ConfigError.into();
    }

    // Initialize tracing; the guard flushes the log file when main returns
    let _log_guard = match logging::init(&config.log_level, config.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{:#}", e);
            return WanfoExitCode::ConfigError.into();
        }
    };

    info!("Starting wanfod daemon");
    info!("Configuration loaded from {}", cli.config.display());
    if let Some(path) = &config.log_file {
        info!("Logging to {}", path.display());
    }

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return WanfoExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(config).await {
            error!("Daemon error: {:#}", e);
            WanfoExitCode::RuntimeError
        } else {
            WanfoExitCode::CleanShutdown
        }
    });

    result.into()
}

#[cfg(unix)]
fn running_as_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
fn running_as_root() -> bool {
    false
}

/// Build the engine from the config with the Linux collaborators
async fn build_engine(config: &FailoverConfig) -> Result<FailoverEngine> {
    let probe = PingProbe::from_config(config);
    let resolver = FallbackResolver::new()
        .with(Box::new(StateFileResolver::new(&config.gateway_state_dir)))
        .with(Box::new(RouteTableResolver::new()));
    let routes = IpRouteController::new();

    let engine = FailoverEngine::new(
        Box::new(probe),
        Box::new(resolver),
        Box::new(routes),
        config,
    )
    .await
    .context("Failed to initialize failover engine")?;
    Ok(engine)
}

/// Resolves once `true` is published (or the sender is dropped)
async fn shutdown_requested(mut rx: watch::Receiver<bool>) {
    while !*rx.borrow_and_update() {
        if rx.changed().await.is_err() {
            return;
        }
    }
}

/// Run the daemon
async fn run_daemon(config: FailoverConfig) -> Result<()> {
    let engine = Arc::new(build_engine(&config).await?);
    let addr = SocketAddr::new(config.api.host, config.api.port);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let scheduler = {
        let engine = Arc::clone(&engine);
        let rx = shutdown_rx.clone();
        tokio::spawn(async move { engine.run_until(shutdown_requested(rx)).await })
    };

    let mut api = {
        let state = ApiState::new(Arc::clone(&engine), config.api.api_key.as_str());
        tokio::spawn(wanfo_api::serve(
            state,
            addr,
            shutdown_requested(shutdown_rx),
        ))
    };

    // The API exiting on its own (bind failure) is fatal too
    let early_api_exit = tokio::select! {
        signal = wait_for_shutdown() => {
            match signal {
                Ok(name) => info!("Received shutdown signal: {}", name),
                Err(e) => error!("Signal handling failed: {:#}", e),
            }
            None
        }
        res = &mut api => Some(res),
    };
    let api_died = early_api_exit.is_some();

    info!("Shutting down daemon");
    let _ = shutdown_tx.send(true);

    let drain = async move {
        let scheduler_result = scheduler.await;
        let api_result = match early_api_exit {
            Some(res) => res,
            None => api.await,
        };
        (scheduler_result, api_result)
    };

    let (scheduler_result, api_result) = tokio::time::timeout(SHUTDOWN_TIMEOUT, drain)
        .await
        .map_err(|_| anyhow::anyhow!("Shutdown timeout after {:?}", SHUTDOWN_TIMEOUT))?;

    scheduler_result.context("Scheduler task panicked")??;
    api_result
        .context("REST API task panicked")?
        .with_context(|| format!("REST API on {} failed", addr))?;

    if api_died {
        anyhow::bail!("REST API on {} stopped unexpectedly", addr);
    }
    Ok(())
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    let name = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    Ok(name)
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
