// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced appliance wrapper for consistent observability

use crate::manager::{Appliance, ApplianceError};
use async_trait::async_trait;
use rover_core::{ApplianceState, BandwidthSample, WorkerContext};
use tracing::Instrument;

/// Wrapper that adds tracing to any Appliance
#[derive(Clone)]
pub struct TracedAppliance<A> {
    inner: A,
}

impl<A> TracedAppliance<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<A: Appliance> Appliance for TracedAppliance<A> {
    async fn boot(&self, ctx: &WorkerContext) -> Result<(), ApplianceError> {
        async {
            tracing::info!(attempts = self.inner.attempts(), "booting");
            let start = std::time::Instant::now();
            let result = self.inner.boot(ctx).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(()) => tracing::info!(state = %self.inner.state(), elapsed_ms, "boot issued"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "boot failed"),
            }
            result
        }
        .instrument(tracing::info_span!("appliance.boot", worker = %ctx.worker_id))
        .await
    }

    async fn check_boot(&self, ctx: &WorkerContext) -> Result<(), ApplianceError> {
        let result = self.inner.check_boot(ctx).await;
        tracing::trace!(state = %self.inner.state(), ok = result.is_ok(), "checked boot");
        result
    }

    async fn configure(&self, ctx: &WorkerContext) -> Result<(), ApplianceError> {
        async {
            let start = std::time::Instant::now();
            let result = self.inner.configure(ctx).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(()) => {
                    tracing::info!(state = %self.inner.state(), elapsed_ms, "configure applied")
                }
                Err(e) => tracing::error!(elapsed_ms, error = %e, "configure failed"),
            }
            result
        }
        .instrument(tracing::info_span!("appliance.configure", worker = %ctx.worker_id))
        .await
    }

    async fn update_state(&self, ctx: &WorkerContext) -> Result<ApplianceState, ApplianceError> {
        let result = self.inner.update_state(ctx).await;
        tracing::trace!(state = ?result.as_ref().ok(), "refreshed state");
        result
    }

    async fn read_stats(&self) -> Result<BandwidthSample, ApplianceError> {
        let result = self.inner.read_stats().await;
        if let Err(ref e) = result {
            tracing::error!(error = %e, "read_stats failed");
        }
        result
    }

    async fn stop(&self, ctx: &WorkerContext) -> Result<(), ApplianceError> {
        let result = self.inner.stop(ctx).await;
        tracing::info_span!("appliance.stop", worker = %ctx.worker_id).in_scope(|| match &result {
            Ok(()) => tracing::info!(state = %self.inner.state(), "stopped"),
            Err(e) => tracing::warn!(error = %e, "stop failed (may be expected)"),
        });
        result
    }

    async fn set_error(&self, ctx: &WorkerContext) -> Result<(), ApplianceError> {
        tracing::warn!("latching error state");
        self.inner.set_error(ctx).await
    }

    async fn clear_error(&self, ctx: &WorkerContext) -> Result<(), ApplianceError> {
        tracing::info!("clearing error state");
        self.inner.clear_error(ctx).await
    }

    fn state(&self) -> ApplianceState {
        self.inner.state()
    }

    fn attempts(&self) -> u32 {
        self.inner.attempts()
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
