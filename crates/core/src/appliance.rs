// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Appliance lifecycle tags.
//!
//! The lifecycle state is owned by the appliance manager; automaton state
//! vertices read it to decide transitions but never write it directly.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a managed appliance VM as observed upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplianceState {
    /// Not running.
    Down,
    /// Boot issued, not yet reachable.
    Booting,
    /// Reachable but unconfigured.
    Up,
    /// Reachable and configured.
    Configured,
    /// Must be stopped and re-created.
    Restart,
    /// Boot-loop latch tripped; holds until cleared.
    Error,
    /// Backing resource no longer exists upstream.
    Gone,
}

impl ApplianceState {
    /// True once the appliance has stopped converging: nothing left to tear down.
    pub fn is_stopped(&self) -> bool {
        matches!(self, ApplianceState::Down | ApplianceState::Gone)
    }
}

impl fmt::Display for ApplianceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplianceState::Down => write!(f, "down"),
            ApplianceState::Booting => write!(f, "booting"),
            ApplianceState::Up => write!(f, "up"),
            ApplianceState::Configured => write!(f, "configured"),
            ApplianceState::Restart => write!(f, "restart"),
            ApplianceState::Error => write!(f, "error"),
            ApplianceState::Gone => write!(f, "gone"),
        }
    }
}

#[cfg(test)]
#[path = "appliance_tests.rs"]
mod tests;
