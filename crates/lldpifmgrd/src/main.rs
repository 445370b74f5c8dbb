//! lldpifmgrd - LLDP Interface Configuration Reconciler
//!
//! Runs one reconciliation described by the file named in
//! `LLDPIFMGRD_CONFIG` and prints the result as JSON.

use anyhow::Context;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use lldpifmgrd::{DeviceHandle, LldpIfMgr, LldpIfMgrConfig, CONFIG_PATH_ENV};

/// Initializes tracing/logging subsystem
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> anyhow::Result<bool> {
    let path = std::env::var(CONFIG_PATH_ENV)
        .with_context(|| format!("{} is not set", CONFIG_PATH_ENV))?;
    let config = LldpIfMgrConfig::from_file(&path)
        .with_context(|| format!("Failed to load {}", path))?;

    info!(
        device = %config.device,
        state = %config.state,
        apply = config.apply,
        "Loaded configuration from {}",
        path
    );

    let device = config.shell_device();
    let mut mgr = LldpIfMgr::new(DeviceHandle::new(&config.device), device.clone(), device)
        .with_defaults(config.defaults.state());

    let result = mgr
        .reconcile(&config.config, config.state, config.apply)
        .await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(result.changed)
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    info!("--- Starting lldpifmgrd ---");

    match run().await {
        Ok(changed) => {
            info!(changed, "lldpifmgrd finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("lldpifmgrd failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
