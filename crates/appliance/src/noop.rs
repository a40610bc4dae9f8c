// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory appliance for driverless operation.
//!
//! Every operation succeeds instantly and only moves the local lifecycle
//! tag, so an automaton converges without any hypervisor behind it. Used
//! when the daemon runs without a real driver, and as the reference for
//! the lifecycle bookkeeping a real implementation must keep.

use crate::manager::{Appliance, ApplianceError};
use async_trait::async_trait;
use parking_lot::Mutex;
use rover_core::{ApplianceState, BandwidthSample, WorkerContext};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct NoopAppliance {
    inner: Arc<Mutex<NoopState>>,
}

struct NoopState {
    state: ApplianceState,
    attempts: u32,
}

impl Default for NoopState {
    fn default() -> Self {
        Self {
            state: ApplianceState::Down,
            attempts: 0,
        }
    }
}

impl NoopAppliance {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Appliance for NoopAppliance {
    async fn boot(&self, _ctx: &WorkerContext) -> Result<(), ApplianceError> {
        let mut inner = self.inner.lock();
        inner.attempts += 1;
        inner.state = ApplianceState::Booting;
        Ok(())
    }

    async fn check_boot(&self, _ctx: &WorkerContext) -> Result<(), ApplianceError> {
        let mut inner = self.inner.lock();
        if inner.state == ApplianceState::Booting {
            inner.state = ApplianceState::Up;
        }
        Ok(())
    }

    async fn configure(&self, _ctx: &WorkerContext) -> Result<(), ApplianceError> {
        let mut inner = self.inner.lock();
        if inner.state == ApplianceState::Up {
            inner.state = ApplianceState::Configured;
            inner.attempts = 0;
        }
        Ok(())
    }

    async fn update_state(&self, _ctx: &WorkerContext) -> Result<ApplianceState, ApplianceError> {
        Ok(self.inner.lock().state)
    }

    async fn read_stats(&self) -> Result<BandwidthSample, ApplianceError> {
        Ok(BandwidthSample::default())
    }

    async fn stop(&self, _ctx: &WorkerContext) -> Result<(), ApplianceError> {
        self.inner.lock().state = ApplianceState::Down;
        Ok(())
    }

    async fn set_error(&self, _ctx: &WorkerContext) -> Result<(), ApplianceError> {
        self.inner.lock().state = ApplianceState::Error;
        Ok(())
    }

    async fn clear_error(&self, _ctx: &WorkerContext) -> Result<(), ApplianceError> {
        let mut inner = self.inner.lock();
        inner.state = ApplianceState::Down;
        inner.attempts = 0;
        Ok(())
    }

    fn state(&self) -> ApplianceState {
        self.inner.lock().state
    }

    fn attempts(&self) -> u32 {
        self.inner.lock().attempts
    }
}

#[cfg(test)]
#[path = "noop_tests.rs"]
mod tests;
