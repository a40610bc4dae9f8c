// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Router and tenant identifiers.
//!
//! Both are assigned upstream (by the network service that announces the
//! router) and are opaque to Rover: stable for the lifetime of an automaton,
//! used for dispatch and log scoping only.

crate::define_id! {
    /// Upstream identifier of a managed router.
    pub struct RouterId;
}

crate::define_id! {
    /// Identifier of the tenant that owns a router.
    pub struct TenantId;
}
