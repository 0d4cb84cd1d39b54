//! Module process serving Xsens MTi movement sensors.
//!
//! Reads a JSON module configuration, registers the MTi driver, starts every
//! configured component and runs until interrupted:
//!
//! ```text
//! mti_module --config module.json
//! ```
//!
//! with `module.json` such as
//!
//! ```json
//! {
//!   "components": [
//!     {
//!       "name": "imu",
//!       "model": "viam:sensor:mti-xsense-200",
//!       "attributes": { "serial_path": "/dev/ttyUSB0", "serial_baud_rate": 115200 }
//!     }
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use movement_sensor::{ComponentConfig, Module, Registry, MOVEMENT_SENSOR_API};
use serde::Deserialize;
use tracing::{info, warn};

/// Xsens MTi movement sensor module
#[derive(Parser, Debug)]
#[command(name = "mti_module")]
#[command(about = "Serve Xsens MTi movement sensors listed in a module configuration")]
#[command(version)]
struct Args {
    /// Module configuration file (JSON with a `components` list)
    #[arg(short, long)]
    config: PathBuf,

    /// Seconds between status log lines (0 disables)
    #[arg(long, default_value = "0")]
    status_interval: u64,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Deserialize, Debug)]
struct ModuleConfig {
    #[serde(default)]
    components: Vec<ComponentConfig>,
}

fn load_config(path: &Path) -> Result<ModuleConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid module config {}", path.display()))
}

fn log_status(module: &Module, names: &[String]) {
    for name in names {
        let Some(sensor) = module.get(name) else {
            continue;
        };
        match sensor.readings(None) {
            Ok(readings) => info!(name = %name, ?readings, "status"),
            Err(e) => warn!(name = %name, "status unavailable: {e}"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let module_config = load_config(&args.config)?;
    let names: Vec<String> = module_config
        .components
        .iter()
        .map(|c| c.name.clone())
        .collect();

    let registry = Registry::new();
    xsens::register(&registry);
    info!(api = MOVEMENT_SENSOR_API, models = ?registry.models(), "registered models");

    let mut module = Module::new(registry);
    module
        .start(&module_config.components)
        .context("failed to start module")?;
    info!("module started with {} component(s)", module.len());

    if args.status_interval > 0 {
        let mut ticker = tokio::time::interval(Duration::from_secs(args.status_interval));
        loop {
            tokio::select! {
                _ = ticker.tick() => log_status(&module, &names),
                result = tokio::signal::ctrl_c() => {
                    result.context("failed to listen for shutdown signal")?;
                    break;
                }
            }
        }
    } else {
        tokio::signal::ctrl_c()
            .await
            .context("failed to listen for shutdown signal")?;
    }

    info!("shutting down");
    module.close();
    Ok(())
}
