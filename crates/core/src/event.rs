// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event vocabulary flowing through automaton queues.

use crate::router::{RouterId, TenantId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// CRUD-shaped event tag.
///
/// The automaton treats these as opaque except for the coalescing rules in
/// `CalcAction`: `Delete` dominates everything, `Create`/`Update`/`Rebuild`
/// upgrade or absorb each other, and redundant `Poll`s are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Crud {
    Create,
    Read,
    Update,
    Delete,
    Poll,
    Rebuild,
}

impl fmt::Display for Crud {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Crud::Create => write!(f, "create"),
            Crud::Read => write!(f, "read"),
            Crud::Update => write!(f, "update"),
            Crud::Delete => write!(f, "delete"),
            Crud::Poll => write!(f, "poll"),
            Crud::Rebuild => write!(f, "rebuild"),
        }
    }
}

/// An ingress message about one router.
///
/// Produced by the broker-facing listener, consumed by `send_message` on the
/// router's automaton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub router_id: RouterId,
    pub tenant_id: TenantId,
    pub crud: Crud,
}

impl Message {
    pub fn new(router_id: impl Into<RouterId>, tenant_id: impl Into<TenantId>, crud: Crud) -> Self {
        Self {
            router_id: router_id.into(),
            tenant_id: tenant_id.into(),
            crud,
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
