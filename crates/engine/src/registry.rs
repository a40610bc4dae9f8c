// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Driver registry.
//!
//! Deployments choose which resource drivers to load via the
//! `enabled_drivers` option. Names are looked up against the compiled-in
//! driver set; enabling iterates the configured list and skips (logging)
//! invalid entries rather than failing startup.

use rover_core::ROUTER_DRIVER;
use thiserror::Error;

/// Errors from driver lookup.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("failed loading driver: {0}")]
    Invalid(String),
}

/// Resource kinds the orchestrator knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    Router,
}

impl Driver {
    pub fn name(&self) -> &'static str {
        match self {
            Driver::Router => ROUTER_DRIVER,
        }
    }

    /// Look up a driver by its configured name.
    pub fn get(name: &str) -> Result<Self, DriverError> {
        match name {
            ROUTER_DRIVER => Ok(Driver::Router),
            other => Err(DriverError::Invalid(other.to_string())),
        }
    }
}

/// The set of drivers a deployment enabled.
#[derive(Debug, Default)]
pub struct DriverRegistry {
    enabled: Vec<Driver>,
}

impl DriverRegistry {
    /// Build from the configured name list, skipping invalid entries.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        let mut enabled = Vec::new();
        for name in names {
            match Driver::get(name.as_ref()) {
                Ok(driver) => {
                    if !enabled.contains(&driver) {
                        enabled.push(driver);
                    }
                }
                Err(e) => tracing::error!(error = %e, "skipping driver"),
            }
        }
        Self { enabled }
    }

    pub fn enabled(&self) -> &[Driver] {
        &self.enabled
    }

    pub fn is_enabled(&self, driver: Driver) -> bool {
        self.enabled.contains(&driver)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
