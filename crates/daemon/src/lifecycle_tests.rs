// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use rover_core::OrchestratorConfig;

fn test_config(state_dir: &std::path::Path) -> Config {
    Config {
        state_dir: state_dir.to_path_buf(),
        socket_path: state_dir.join("roverd.sock"),
        lock_path: state_dir.join("roverd.pid"),
        log_path: state_dir.join("roverd.log"),
        orchestrator: OrchestratorConfig::default(),
    }
}

#[tokio::test]
async fn startup_acquires_lock_and_binds_socket() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let startup = startup(&config).unwrap();

    assert!(config.socket_path.exists());
    let pid = std::fs::read_to_string(&config.lock_path).unwrap();
    assert_eq!(pid.trim(), std::process::id().to_string());
    drop(startup);
}

#[tokio::test]
async fn second_startup_fails_while_lock_held() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let _held = startup(&config).unwrap();
    let err = startup(&config).unwrap_err();

    assert!(matches!(err, LifecycleError::LockFailed(_)));
}

#[tokio::test]
async fn startup_replaces_stale_socket() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    std::fs::write(&config.socket_path, b"stale").unwrap();

    let startup = startup(&config).unwrap();

    assert!(config.socket_path.exists());
    drop(startup);
}

#[tokio::test]
async fn shutdown_removes_runtime_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let handles = startup(&config).unwrap();
    drop(handles);

    shutdown(&config);

    assert!(!config.socket_path.exists());
    assert!(!config.lock_path.exists());
}
