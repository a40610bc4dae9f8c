// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestrator tunables.
//!
//! Loaded from an optional TOML file; every field has a default so an empty
//! or missing file yields a working configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Driver name every deployment must enable.
pub const ROUTER_DRIVER: &str = "router";

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("reboot_error_threshold must be positive")]
    RebootThresholdZero,
    #[error("queue_warning_threshold must be positive")]
    QueueThresholdZero,
    #[error("enabled_drivers must include 'router'")]
    RouterDriverDisabled,
}

/// Tunables shared by every automaton the orchestrator runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Consecutive boot attempts before an appliance latches `Error`.
    pub reboot_error_threshold: u32,
    /// Queue length at which ingress logging escalates to warning severity.
    pub queue_warning_threshold: usize,
    /// Drivers the orchestrator will load; `router` is mandatory.
    pub enabled_drivers: Vec<String>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            reboot_error_threshold: 5,
            queue_warning_threshold: 100,
            enabled_drivers: vec![ROUTER_DRIVER.to_string()],
        }
    }
}

impl OrchestratorConfig {
    /// Parse from TOML text and validate.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml_str(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reboot_error_threshold == 0 {
            return Err(ConfigError::RebootThresholdZero);
        }
        if self.queue_warning_threshold == 0 {
            return Err(ConfigError::QueueThresholdZero);
        }
        if !self.enabled_drivers.iter().any(|d| d == ROUTER_DRIVER) {
            return Err(ConfigError::RouterDriverDisabled);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
