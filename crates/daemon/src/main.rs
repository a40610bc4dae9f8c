// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rover Daemon (roverd)
//!
//! Background process that owns the ingress loop and pumps the router
//! automatons.
//!
//! Architecture:
//! - Listener task: accepts Unix-socket connections, decodes newline-delimited
//!   JSON messages, forwards them over a channel
//! - Engine loop: main task dispatching messages into the automaton pool and
//!   pumping it to quiescence

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod lifecycle;
mod listener;

use rover_appliance::{NoopAppliance, TracedAppliance};
use rover_core::{Message, OrchestratorConfig, WorkerContext};
use rover_engine::{Automaton, AutomatonConfig, AutomatonDeps, AutomatonPool, DriverRegistry};
use std::path::Path;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::lifecycle::{Config, LifecycleError};
use crate::listener::Listener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle info flags before any config/lock acquisition
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("roverd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("roverd {}", env!("CARGO_PKG_VERSION"));
                println!("Rover Daemon - drives virtual router appliances through their lifecycle");
                println!();
                println!("USAGE:");
                println!("    roverd");
                println!();
                println!("The daemon listens on a Unix socket for CRUD messages about");
                println!("routers and runs one lifecycle automaton per router.");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: roverd [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = Config::load()?;

    // Rotate the log file if it has grown too large
    rotate_log_if_needed(&config.log_path, MAX_LOG_SIZE);

    let log_guard = setup_logging(&config)?;

    info!("starting rover daemon");

    let startup = match lifecycle::startup(&config) {
        Ok(r) => r,
        Err(LifecycleError::LockFailed(path)) => {
            let pid = std::fs::read_to_string(&path).unwrap_or_default().trim().to_string();
            eprintln!("roverd is already running");
            if !pid.is_empty() {
                eprintln!("  pid: {pid}");
            }
            std::process::exit(1);
        }
        Err(e) => {
            error!("failed to start daemon: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    let registry = DriverRegistry::from_names(&config.orchestrator.enabled_drivers);
    info!(drivers = ?registry.enabled(), "drivers enabled");

    // Ingress channel between the listener task and the engine loop
    let (tx, mut rx) = mpsc::channel::<Message>(256);
    let ingress = Listener::new(startup.socket, tx);
    tokio::spawn(ingress.run());

    let mut pool = router_pool(&config.orchestrator);
    let ctx = WorkerContext::new(format!("roverd-{}", std::process::id()));

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!(socket = %config.socket_path.display(), "daemon ready");

    // Engine loop - dispatch incoming messages, then pump to quiescence
    loop {
        tokio::select! {
            maybe = rx.recv() => match maybe {
                Some(message) => {
                    pool.dispatch(&message);
                    // Fold in whatever else already arrived before pumping.
                    while let Ok(message) = rx.try_recv() {
                        pool.dispatch(&message);
                    }
                    pool.pump(&ctx).await;
                }
                None => {
                    info!("ingress channel closed, shutting down");
                    break;
                }
            },

            _ = sigterm.recv() => {
                info!("received SIGTERM, shutting down");
                break;
            }

            _ = sigint.recv() => {
                info!("received SIGINT, shutting down");
                break;
            }
        }
    }

    pool.service_shutdown();
    lifecycle::shutdown(&config);
    info!("daemon stopped");
    Ok(())
}

/// Build the automaton pool for the router driver.
///
/// Without a hypervisor driver configured, appliances are driverless no-ops
/// wrapped with tracing; teardown and bandwidth reports land in the log.
fn router_pool(config: &OrchestratorConfig) -> AutomatonPool<TracedAppliance<NoopAppliance>> {
    let automaton_config = AutomatonConfig::from(config);
    AutomatonPool::new(Box::new(move |message: &Message| {
        let deleted_router = message.router_id.clone();
        let stats_router = message.router_id.clone();
        Automaton::new(
            AutomatonDeps {
                router_id: message.router_id.clone(),
                tenant_id: message.tenant_id.clone(),
                appliance: TracedAppliance::new(NoopAppliance::new()),
                delete_callback: Box::new(move || {
                    info!(router_id = %deleted_router, "router deleted");
                }),
                bandwidth_callback: Box::new(move |sample| {
                    info!(
                        router_id = %stats_router,
                        bytes_in = sample.bytes_in,
                        bytes_out = sample.bytes_out,
                        "bandwidth sample"
                    );
                }),
            },
            automaton_config,
        )
    }))
}

/// Maximum log file size before rotation (10 MB).
const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Number of rotated log files to keep (roverd.log.1, .2, .3).
const MAX_ROTATED_LOGS: u32 = 3;

/// Rotate the daemon log file if it exceeds `max_size`.
///
/// Shifts `roverd.log` -> `roverd.log.1` -> `roverd.log.2` -> `roverd.log.3`,
/// deleting the oldest. Best-effort: rotation failures are silently ignored
/// so the daemon still starts.
fn rotate_log_if_needed(log_path: &Path, max_size: u64) {
    let size = match std::fs::metadata(log_path) {
        Ok(m) => m.len(),
        Err(_) => return,
    };

    if size < max_size {
        return;
    }

    let log_str = log_path.display().to_string();

    // Shift older rotations: .3 is deleted, .2 -> .3, .1 -> .2
    for i in (1..MAX_ROTATED_LOGS).rev() {
        let from = format!("{log_str}.{i}");
        let to = format!("{log_str}.{}", i + 1);
        let _ = std::fs::rename(&from, &to);
    }

    // Rotate current log -> .1
    let _ = std::fs::rename(log_path, format!("{log_str}.1"));
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Create log directory if needed
    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Set up file appender (rotation happens at startup via rotate_log_if_needed)
    let file_appender = tracing_appender::rolling::never(
        config.log_path.parent().ok_or(LifecycleError::NoStateDir)?,
        config
            .log_path
            .file_name()
            .ok_or(LifecycleError::NoStateDir)?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Set up subscriber with env filter
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
