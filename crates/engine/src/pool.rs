// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Automaton pool: one automaton per managed router, pumped fairly.

use crate::automaton::Automaton;
use rover_appliance::Appliance;
use rover_core::{Crud, Message, RouterId, WorkerContext};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Builds a fresh automaton the first time a router is seen.
pub type AutomatonFactory<A> = Box<dyn Fn(&Message) -> Automaton<A> + Send>;

/// The set of live automatons one worker multiplexes.
pub struct AutomatonPool<A> {
    automatons: HashMap<RouterId, Automaton<A>>,
    factory: AutomatonFactory<A>,
    draining: bool,
}

impl<A: Appliance> AutomatonPool<A> {
    pub fn new(factory: AutomatonFactory<A>) -> Self {
        Self {
            automatons: HashMap::new(),
            factory,
            draining: false,
        }
    }

    pub fn len(&self) -> usize {
        self.automatons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.automatons.is_empty()
    }

    pub fn get(&self, router_id: &RouterId) -> Option<&Automaton<A>> {
        self.automatons.get(router_id)
    }

    /// Route a message to its automaton, creating one on first sight of a
    /// router. Returns whether the message was accepted.
    pub fn dispatch(&mut self, message: &Message) -> bool {
        if self.draining {
            tracing::debug!(router_id = %message.router_id, "pool draining, dropping message");
            return false;
        }

        let automaton = match self.automatons.entry(message.router_id.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                if message.crud == Crud::Delete {
                    // Nothing to tear down for a router we never managed.
                    tracing::debug!(router_id = %entry.key(), "delete for unmanaged router, ignoring");
                    return false;
                }
                tracing::info!(
                    router_id = %entry.key(),
                    tenant_id = %message.tenant_id,
                    "starting automaton"
                );
                entry.insert((self.factory)(message))
            }
        };
        automaton.send_message(message)
    }

    /// Pump every automaton with pending work until the pool is quiescent.
    ///
    /// Each `update` call returns at the automaton's next yield point, so
    /// one busy router cannot starve the others. Deleted automatons are
    /// reaped between passes.
    pub async fn pump(&mut self, ctx: &WorkerContext) {
        loop {
            let mut worked = false;
            for automaton in self.automatons.values_mut() {
                if automaton.has_more_work() {
                    automaton.update(ctx).await;
                    worked = true;
                }
            }
            self.reap();
            if !worked || self.draining {
                break;
            }
        }
    }

    pub fn has_more_work(&self) -> bool {
        self.automatons.values().any(Automaton::has_more_work)
    }

    /// Advisory shutdown: stop accepting messages and stop pumping after
    /// the current pass. Forces no transitions.
    pub fn service_shutdown(&mut self) {
        self.draining = true;
        for automaton in self.automatons.values_mut() {
            automaton.service_shutdown();
        }
    }

    fn reap(&mut self) {
        self.automatons.retain(|router_id, automaton| {
            if automaton.deleted() {
                tracing::info!(router_id = %router_id, "reaping deleted automaton");
                false
            } else {
                true
            }
        });
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
