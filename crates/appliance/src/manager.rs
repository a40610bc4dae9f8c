// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The appliance capability trait and its failure taxonomy.

use async_trait::async_trait;
use rover_core::{ApplianceState, BandwidthSample, WorkerContext};
use thiserror::Error;

/// Failures an appliance operation may report.
///
/// These are the transient categories the automaton swallows and logs: a
/// hiccup talking to the hypervisor or to the appliance itself must not kill
/// the state machine. Anything outside this taxonomy (a panic, say) is a
/// programmer error and propagates.
#[derive(Debug, Error)]
pub enum ApplianceError {
    #[error("network error: {0}")]
    Network(String),
    #[error("timed out: {0}")]
    Timeout(String),
    #[error("not found upstream: {0}")]
    NotFound(String),
    #[error("configuration rejected: {0}")]
    ConfigRejected(String),
}

/// Operations the automaton invokes on its managed appliance.
///
/// One appliance handle is owned exclusively by one automaton; the handle
/// keeps its own lifecycle state and boot-attempt counter, which the
/// automaton reads through [`state`](Appliance::state) and
/// [`attempts`](Appliance::attempts) but never writes directly.
#[async_trait]
pub trait Appliance: Send + Sync + 'static {
    /// Begin provisioning. Increments `attempts`; moves the lifecycle state
    /// toward `Booting`, or leaves it `Down` on failure.
    async fn boot(&self, ctx: &WorkerContext) -> Result<(), ApplianceError>;

    /// Observe reachability after a boot. May move `Booting` to `Up`, or to
    /// `Gone` when the backing resource vanished mid-boot.
    async fn check_boot(&self, ctx: &WorkerContext) -> Result<(), ApplianceError>;

    /// Apply configuration. On success moves `Up` to `Configured`; may
    /// regress to `Up` or `Restart` when the configuration did not stick.
    /// Convergence to `Configured` resets the boot-attempt counter.
    async fn configure(&self, ctx: &WorkerContext) -> Result<(), ApplianceError>;

    /// Refresh the lifecycle state from upstream and return it.
    async fn update_state(&self, ctx: &WorkerContext) -> Result<ApplianceState, ApplianceError>;

    /// Read a traffic sample from the appliance.
    async fn read_stats(&self) -> Result<BandwidthSample, ApplianceError>;

    /// Tear down. Moves the lifecycle state to `Down`, or `Gone` when the
    /// backing resource no longer exists.
    async fn stop(&self, ctx: &WorkerContext) -> Result<(), ApplianceError>;

    /// Latch the `Error` state after a boot loop.
    async fn set_error(&self, ctx: &WorkerContext) -> Result<(), ApplianceError>;

    /// Lift the `Error` latch and reset the boot-attempt counter so an
    /// explicit rebuild can try again.
    async fn clear_error(&self, ctx: &WorkerContext) -> Result<(), ApplianceError>;

    /// Last observed lifecycle state.
    fn state(&self) -> ApplianceState;

    /// Consecutive boot attempts since the counter was last reset.
    fn attempts(&self) -> u32;
}
