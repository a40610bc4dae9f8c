// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Appliance management interface
//!
//! An appliance is the virtual router VM backing one managed router. The
//! [`Appliance`] trait is the automaton's only view of it: a handful of
//! lifecycle operations plus two readable fields (`state`, `attempts`).
//! The hypervisor-facing implementation lives outside this repository;
//! here we ship the trait, a [`NoopAppliance`] for driverless operation,
//! and a [`TracedAppliance`] wrapper for observability.

pub mod manager;
mod noop;
pub mod traced;

pub use manager::{Appliance, ApplianceError};
pub use noop::NoopAppliance;
pub use traced::TracedAppliance;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{ApplianceCall, FakeAppliance};
