// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker identity and the per-pump context.

crate::define_id! {
    /// Unique identifier for a worker instance.
    pub struct WorkerId;
}

/// Context borrowed into every pump invocation and appliance operation.
///
/// Owned by the worker that drives the automatons; automatons and appliance
/// implementations must not retain it beyond the call they received it for.
#[derive(Debug, Clone)]
pub struct WorkerContext {
    pub worker_id: WorkerId,
}

impl WorkerContext {
    pub fn new(worker_id: impl Into<WorkerId>) -> Self {
        Self {
            worker_id: worker_id.into(),
        }
    }
}
