// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle: configuration, lock acquisition, socket setup.

use fs2::FileExt;
use rover_core::{ConfigError, OrchestratorConfig};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;
use tokio::net::UnixListener;

/// Errors from daemon startup and shutdown.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("could not determine state directory (set ROVER_STATE_DIR or HOME)")]
    NoStateDir,
    #[error("another daemon already holds {}", .0.display())]
    LockFailed(PathBuf),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (e.g. ~/.local/state/rover)
    pub state_dir: PathBuf,
    /// Path to the ingress Unix socket
    pub socket_path: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Orchestrator tunables (`rover.toml` inside the state dir)
    pub orchestrator: OrchestratorConfig,
}

impl Config {
    /// Load configuration for the daemon.
    ///
    /// Paths are fixed under the state directory; tunables come from an
    /// optional `rover.toml` inside it.
    pub fn load() -> Result<Self, LifecycleError> {
        let state_dir = state_dir()?;
        let orchestrator = OrchestratorConfig::load(&state_dir.join("rover.toml"))?;

        Ok(Self {
            socket_path: state_dir.join("roverd.sock"),
            lock_path: state_dir.join("roverd.pid"),
            log_path: state_dir.join("roverd.log"),
            orchestrator,
            state_dir,
        })
    }
}

/// Handles the daemon needs to keep for its lifetime.
#[derive(Debug)]
pub struct StartupResult {
    // NOTE(lifetime): held to maintain the exclusive file lock; released on drop
    #[allow(dead_code)]
    pub lock_file: File,
    /// The bound ingress socket, handed to the listener task.
    pub socket: UnixListener,
}

/// Acquire the instance lock and bind the ingress socket.
pub fn startup(config: &Config) -> Result<StartupResult, LifecycleError> {
    std::fs::create_dir_all(&config.state_dir)?;

    // Open without truncating: a failed lock must not clobber the pid of
    // the daemon that holds it.
    let mut lock_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .open(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(|_| LifecycleError::LockFailed(config.lock_path.clone()))?;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;

    // A previous run may have left its socket behind.
    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let socket = UnixListener::bind(&config.socket_path)?;

    Ok(StartupResult { lock_file, socket })
}

/// Remove the socket and pid files. Best-effort.
pub fn shutdown(config: &Config) {
    let _ = std::fs::remove_file(&config.socket_path);
    let _ = std::fs::remove_file(&config.lock_path);
}

/// Resolve state directory: ROVER_STATE_DIR > XDG_STATE_HOME/rover > ~/.local/state/rover
fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("ROVER_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("rover"));
    }
    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/rover"))
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
