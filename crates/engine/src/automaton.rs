// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-router lifecycle automaton.
//!
//! One automaton per managed router, memory-resident for its lifetime. The
//! worker appends events through [`send_message`](Automaton::send_message)
//! and pumps the machine with [`update`](Automaton::update); the pump
//! returns control at every re-entry into `CalcAction`, which is the whole
//! fairness contract with the worker. Reaching `Exit` fires the delete
//! callback exactly once and freezes the automaton.

use crate::state::{State, StateParams};
use rover_appliance::Appliance;
use rover_core::{
    ApplianceState, BandwidthSample, Crud, Message, OrchestratorConfig, RouterId, TenantId,
    WorkerContext,
};
use std::collections::VecDeque;

/// Wiring an automaton needs at construction.
pub struct AutomatonDeps<A> {
    pub router_id: RouterId,
    pub tenant_id: TenantId,
    /// Appliance handle, owned exclusively by this automaton.
    pub appliance: A,
    /// Invoked exactly once when the automaton reaches its terminal state.
    /// Runs on the pump's task, so it must not block.
    pub delete_callback: Box<dyn FnOnce() + Send>,
    /// Invoked once per successful stats read.
    pub bandwidth_callback: Box<dyn Fn(BandwidthSample) + Send>,
}

/// Per-automaton thresholds, normally taken from [`OrchestratorConfig`].
#[derive(Debug, Clone, Copy)]
pub struct AutomatonConfig {
    /// Queue length at which ingress logging escalates to warning severity.
    pub queue_warning_threshold: usize,
    /// Consecutive boot attempts before the appliance latches `Error`.
    pub reboot_error_threshold: u32,
}

impl From<&OrchestratorConfig> for AutomatonConfig {
    fn from(config: &OrchestratorConfig) -> Self {
        Self {
            queue_warning_threshold: config.queue_warning_threshold,
            reboot_error_threshold: config.reboot_error_threshold,
        }
    }
}

/// State machine driving one router's appliance.
pub struct Automaton<A> {
    router_id: RouterId,
    tenant_id: TenantId,
    queue: VecDeque<Crud>,
    state: State,
    action: Option<Crud>,
    deleted: bool,
    delete_callback: Option<Box<dyn FnOnce() + Send>>,
    bandwidth_callback: Box<dyn Fn(BandwidthSample) + Send>,
    appliance: A,
    queue_warning_threshold: usize,
    reboot_error_threshold: u32,
}

impl<A: Appliance> Automaton<A> {
    pub fn new(deps: AutomatonDeps<A>, config: AutomatonConfig) -> Self {
        Self {
            router_id: deps.router_id,
            tenant_id: deps.tenant_id,
            queue: VecDeque::new(),
            state: State::CalcAction,
            action: Some(Crud::Poll),
            deleted: false,
            delete_callback: Some(deps.delete_callback),
            bandwidth_callback: deps.bandwidth_callback,
            appliance: deps.appliance,
            queue_warning_threshold: config.queue_warning_threshold,
            reboot_error_threshold: config.reboot_error_threshold,
        }
    }

    pub fn router_id(&self) -> &RouterId {
        &self.router_id
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    /// True once the automaton reached `Exit`; frozen from then on.
    pub fn deleted(&self) -> bool {
        self.deleted
    }

    pub fn appliance(&self) -> &A {
        &self.appliance
    }

    /// Called when the worker puts a message on the state machine queue.
    ///
    /// Returns false when the message was rejected: the automaton is
    /// deleted, or the event is a poll for an appliance sitting in `Error`
    /// (polls do not rescue an errored appliance; an explicit rebuild does).
    pub fn send_message(&mut self, message: &Message) -> bool {
        if self.deleted {
            tracing::debug!(
                router_id = %self.router_id,
                crud = %message.crud,
                "deleted state machine, ignoring incoming message"
            );
            return false;
        }

        if message.crud == Crud::Poll && self.appliance.state() == ApplianceState::Error {
            tracing::info!(
                router_id = %self.router_id,
                "appliance status is error, ignoring poll message"
            );
            return false;
        }

        self.queue.push_back(message.crud);
        let queue_len = self.queue.len();
        if queue_len > self.queue_warning_threshold {
            tracing::warn!(
                router_id = %self.router_id,
                queue_len,
                "incoming message grows queue"
            );
        } else {
            tracing::debug!(
                router_id = %self.router_id,
                queue_len,
                "incoming message grows queue"
            );
        }
        true
    }

    /// Called to check if there are more messages in the state machine queue.
    pub fn has_more_work(&self) -> bool {
        !self.deleted && !self.queue.is_empty()
    }

    /// Called when the parent process is being stopped. Advisory only: the
    /// worker stops pumping; no transition is forced here.
    pub fn service_shutdown(&mut self) {}

    /// Pump the state machine until it yields.
    ///
    /// Returns whenever the machine re-enters `CalcAction`, reaches `Exit`,
    /// or was already deleted. Appliance failures inside `execute` are
    /// swallowed by the vertices; the transition always runs.
    pub async fn update(&mut self, ctx: &WorkerContext) {
        while !self.queue.is_empty() {
            loop {
                if self.deleted {
                    tracing::debug!(
                        router_id = %self.router_id,
                        "skipping update because the router is being deleted"
                    );
                    return;
                }

                let mut params = StateParams {
                    router_id: &self.router_id,
                    appliance: &self.appliance,
                    queue: &mut self.queue,
                    bandwidth_callback: self.bandwidth_callback.as_ref(),
                    reboot_error_threshold: self.reboot_error_threshold,
                };

                tracing::debug!(
                    router_id = %self.router_id,
                    state = %self.state,
                    action = ?self.action,
                    appliance = %params.appliance.state(),
                    "execute"
                );
                self.action = self.state.execute(self.action, &mut params, ctx).await;

                let old_state = self.state;
                self.state = old_state.transition(self.action, &params);
                tracing::debug!(
                    router_id = %self.router_id,
                    from = %old_state,
                    to = %self.state,
                    action = ?self.action,
                    appliance = %params.appliance.state(),
                    "transition"
                );

                // Yield control each time we stop to figure out what to do
                // next.
                if self.state == State::CalcAction {
                    return;
                }

                // We have reached the exit state, so the router is gone.
                if self.state == State::Exit {
                    self.do_delete();
                    return;
                }
            }
        }
    }

    fn do_delete(&mut self) {
        if let Some(callback) = self.delete_callback.take() {
            tracing::debug!(router_id = %self.router_id, "calling delete callback");
            callback();
        }
        // Remember that this router has been deleted.
        self.deleted = true;
    }

    #[cfg(test)]
    pub(crate) fn current_action(&self) -> Option<Crud> {
        self.action
    }

    #[cfg(test)]
    pub(crate) fn current_state(&self) -> State {
        self.state
    }
}

#[cfg(test)]
#[path = "automaton_tests/mod.rs"]
mod tests;
