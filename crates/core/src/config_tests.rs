// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn defaults() {
    let config = OrchestratorConfig::default();
    assert_eq!(config.reboot_error_threshold, 5);
    assert_eq!(config.queue_warning_threshold, 100);
    assert_eq!(config.enabled_drivers, vec!["router"]);
    assert!(config.validate().is_ok());
}

#[test]
fn empty_toml_yields_defaults() {
    let config = OrchestratorConfig::from_toml_str("").unwrap();
    assert_eq!(config, OrchestratorConfig::default());
}

#[test]
fn parses_overrides() {
    let config = OrchestratorConfig::from_toml_str(
        r#"
reboot_error_threshold = 3
queue_warning_threshold = 10
enabled_drivers = ["router", "loadbalancer"]
"#,
    )
    .unwrap();
    assert_eq!(config.reboot_error_threshold, 3);
    assert_eq!(config.queue_warning_threshold, 10);
    assert_eq!(config.enabled_drivers.len(), 2);
}

#[test]
fn rejects_zero_reboot_threshold() {
    let err = OrchestratorConfig::from_toml_str("reboot_error_threshold = 0").unwrap_err();
    assert!(matches!(err, ConfigError::RebootThresholdZero));
}

#[test]
fn rejects_zero_queue_threshold() {
    let err = OrchestratorConfig::from_toml_str("queue_warning_threshold = 0").unwrap_err();
    assert!(matches!(err, ConfigError::QueueThresholdZero));
}

#[test]
fn rejects_missing_router_driver() {
    let err = OrchestratorConfig::from_toml_str(r#"enabled_drivers = ["loadbalancer"]"#).unwrap_err();
    assert!(matches!(err, ConfigError::RouterDriverDisabled));
}

#[test]
fn load_missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = OrchestratorConfig::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, OrchestratorConfig::default());
}

#[test]
fn load_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rover.toml");
    std::fs::write(&path, "reboot_error_threshold = 2").unwrap();
    let config = OrchestratorConfig::load(&path).unwrap();
    assert_eq!(config.reboot_error_threshold, 2);
}
