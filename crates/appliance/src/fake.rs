// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake appliance for deterministic testing
#![cfg_attr(coverage_nightly, coverage(off))]

use crate::manager::{Appliance, ApplianceError};
use async_trait::async_trait;
use parking_lot::Mutex;
use rover_core::{ApplianceState, BandwidthSample, WorkerContext};
use std::sync::Arc;

/// Recorded call to FakeAppliance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplianceCall {
    Boot,
    CheckBoot,
    Configure,
    UpdateState,
    ReadStats,
    Stop,
    SetError,
    ClearError,
}

/// Fake appliance for testing
///
/// Follows the same happy-path lifecycle as the noop appliance but lets a
/// test script divergences: boots that never stick, configures that end in
/// `Gone`, stops that discover the resource vanished, and per-operation
/// error injection. Records every call.
#[derive(Clone, Default)]
pub struct FakeAppliance {
    inner: Arc<Mutex<FakeState>>,
}

struct FakeState {
    state: ApplianceState,
    attempts: u32,
    calls: Vec<ApplianceCall>,
    boot_sticks: bool,
    state_after_check_boot: Option<ApplianceState>,
    state_after_configure: Option<ApplianceState>,
    state_after_stop: ApplianceState,
    boot_error: Option<ApplianceError>,
    check_boot_error: Option<ApplianceError>,
    configure_error: Option<ApplianceError>,
    stop_error: Option<ApplianceError>,
    stats: BandwidthSample,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            state: ApplianceState::Down,
            attempts: 0,
            calls: Vec::new(),
            boot_sticks: true,
            state_after_check_boot: None,
            state_after_configure: None,
            state_after_stop: ApplianceState::Down,
            boot_error: None,
            check_boot_error: None,
            configure_error: None,
            stop_error: None,
            stats: BandwidthSample::default(),
        }
    }
}

impl FakeAppliance {
    /// Create a fake appliance starting in `Down`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fake appliance starting in the given state.
    pub fn with_state(state: ApplianceState) -> Self {
        let fake = Self::new();
        fake.set_state(state);
        fake
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<ApplianceCall> {
        self.inner.lock().calls.clone()
    }

    /// Count recorded calls of one kind
    pub fn call_count(&self, call: ApplianceCall) -> usize {
        self.inner.lock().calls.iter().filter(|c| **c == call).count()
    }

    /// Clear recorded calls
    pub fn clear_calls(&self) {
        self.inner.lock().calls.clear();
    }

    /// Force the lifecycle state
    pub fn set_state(&self, state: ApplianceState) {
        self.inner.lock().state = state;
    }

    /// Force the boot-attempt counter
    pub fn set_attempts(&self, attempts: u32) {
        self.inner.lock().attempts = attempts;
    }

    /// When false, `boot` leaves the appliance `Down` (boot-loop script)
    pub fn set_boot_sticks(&self, sticks: bool) {
        self.inner.lock().boot_sticks = sticks;
    }

    /// Override the state `check_boot` leaves behind (e.g. `Gone` mid-boot)
    pub fn set_state_after_check_boot(&self, state: Option<ApplianceState>) {
        self.inner.lock().state_after_check_boot = state;
    }

    /// Override the state `configure` leaves behind (e.g. `Up`, `Restart`, `Gone`)
    pub fn set_state_after_configure(&self, state: Option<ApplianceState>) {
        self.inner.lock().state_after_configure = state;
    }

    /// Override the state `stop` leaves behind (default `Down`)
    pub fn set_state_after_stop(&self, state: ApplianceState) {
        self.inner.lock().state_after_stop = state;
    }

    /// Set error to return on next boot
    pub fn fail_next_boot(&self, error: ApplianceError) {
        self.inner.lock().boot_error = Some(error);
    }

    /// Set error to return on next check_boot
    pub fn fail_next_check_boot(&self, error: ApplianceError) {
        self.inner.lock().check_boot_error = Some(error);
    }

    /// Set error to return on next configure
    pub fn fail_next_configure(&self, error: ApplianceError) {
        self.inner.lock().configure_error = Some(error);
    }

    /// Set error to return on next stop
    pub fn fail_next_stop(&self, error: ApplianceError) {
        self.inner.lock().stop_error = Some(error);
    }

    /// Set the sample `read_stats` returns
    pub fn set_stats(&self, stats: BandwidthSample) {
        self.inner.lock().stats = stats;
    }
}

#[async_trait]
impl Appliance for FakeAppliance {
    async fn boot(&self, _ctx: &WorkerContext) -> Result<(), ApplianceError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ApplianceCall::Boot);
        inner.attempts += 1;
        if let Some(error) = inner.boot_error.take() {
            return Err(error);
        }
        if inner.boot_sticks {
            inner.state = ApplianceState::Booting;
        } else {
            inner.state = ApplianceState::Down;
        }
        Ok(())
    }

    async fn check_boot(&self, _ctx: &WorkerContext) -> Result<(), ApplianceError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ApplianceCall::CheckBoot);
        if let Some(error) = inner.check_boot_error.take() {
            return Err(error);
        }
        if let Some(state) = inner.state_after_check_boot {
            inner.state = state;
        } else if inner.state == ApplianceState::Booting {
            inner.state = ApplianceState::Up;
        }
        Ok(())
    }

    async fn configure(&self, _ctx: &WorkerContext) -> Result<(), ApplianceError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ApplianceCall::Configure);
        if let Some(error) = inner.configure_error.take() {
            return Err(error);
        }
        if let Some(state) = inner.state_after_configure {
            inner.state = state;
        } else if inner.state == ApplianceState::Up {
            inner.state = ApplianceState::Configured;
            inner.attempts = 0;
        }
        Ok(())
    }

    async fn update_state(&self, _ctx: &WorkerContext) -> Result<ApplianceState, ApplianceError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ApplianceCall::UpdateState);
        Ok(inner.state)
    }

    async fn read_stats(&self) -> Result<BandwidthSample, ApplianceError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ApplianceCall::ReadStats);
        Ok(inner.stats.clone())
    }

    async fn stop(&self, _ctx: &WorkerContext) -> Result<(), ApplianceError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ApplianceCall::Stop);
        if let Some(error) = inner.stop_error.take() {
            return Err(error);
        }
        // A vanished appliance stays vanished.
        if inner.state != ApplianceState::Gone {
            inner.state = inner.state_after_stop;
        }
        Ok(())
    }

    async fn set_error(&self, _ctx: &WorkerContext) -> Result<(), ApplianceError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ApplianceCall::SetError);
        inner.state = ApplianceState::Error;
        Ok(())
    }

    async fn clear_error(&self, _ctx: &WorkerContext) -> Result<(), ApplianceError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ApplianceCall::ClearError);
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
#[path = "fake_tests.rs"]
mod tests;
