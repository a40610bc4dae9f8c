// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State vertices of the lifecycle automaton.
//!
//! Every vertex is a unit variant with two operations: `execute` performs
//! the phase's side effects (appliance calls, queue manipulation) and
//! returns the action to carry forward, `transition` picks the next vertex
//! from that action and the observed appliance state. Vertex identity
//! carries all the meaning; the shared mutable context lives in
//! [`StateParams`], borrowed from the automaton for one pump cycle.
//!
//! Appliance failures inside `execute` are logged and swallowed so a
//! transient hypervisor hiccup cannot poison the machine; the transition
//! still runs on the last action and the machine re-converges through
//! `CalcAction`.

use rover_appliance::Appliance;
use rover_core::{ApplianceState, BandwidthSample, Crud, RouterId, WorkerContext};
use std::collections::VecDeque;
use std::fmt;

/// Borrow bundle shared by the vertices during one pump cycle.
///
/// Owned by the automaton, lent to `execute`/`transition`; vertices hold no
/// data of their own.
pub(crate) struct StateParams<'a, A> {
    pub router_id: &'a RouterId,
    pub appliance: &'a A,
    pub queue: &'a mut VecDeque<Crud>,
    pub bandwidth_callback: &'a (dyn Fn(BandwidthSample) + Send),
    pub reboot_error_threshold: u32,
}

/// The automaton's vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum State {
    CalcAction,
    PushUpdate,
    Alive,
    CreateVm,
    CheckBoot,
    ConfigureVm,
    ReadStats,
    StopVm,
    RebuildVm,
    Exit,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::CalcAction => "CalcAction",
            State::PushUpdate => "PushUpdate",
            State::Alive => "Alive",
            State::CreateVm => "CreateVm",
            State::CheckBoot => "CheckBoot",
            State::ConfigureVm => "ConfigureVm",
            State::ReadStats => "ReadStats",
            State::StopVm => "StopVm",
            State::RebuildVm => "RebuildVm",
            State::Exit => "Exit",
        };
        write!(f, "{name}")
    }
}

/// Fold the pending queue into the single action that best represents it.
///
/// Works by side effect on `queue`. A `Delete` anywhere preempts everything
/// and leaves the queue untouched; otherwise events are popped one at a
/// time, upgrading, absorbing, or stopping at the first event that needs a
/// traversal of its own. Every iteration either pops or breaks, so the fold
/// terminates.
pub(crate) fn coalesce(action: Option<Crud>, queue: &mut VecDeque<Crud>) -> Option<Crud> {
    if queue.contains(&Crud::Delete) {
        tracing::debug!("shortcutting to delete");
        return Some(Crud::Delete);
    }

    let mut action = action;
    while let Some(&head) = queue.front() {
        tracing::debug!(action = ?action, queue_len = queue.len(), "collapsing events");
        match (action, head) {
            // Upgrade to create by taking the next item from the queue.
            (Some(Crud::Update), Crud::Create) => {
                action = queue.pop_front();
            }
            // A rebuild stops and re-creates the appliance, so it supersedes
            // everything short of a delete.
            (Some(current), Crud::Rebuild) if current != Crud::Delete => {
                action = queue.pop_front();
            }
            // A create implies a configure, so eat the update without
            // changing the action.
            (Some(Crud::Create), Crud::Update) => {
                queue.pop_front();
            }
            // The pending action will configure the appliance; repeated
            // polls are not needed.
            (Some(_), Crud::Poll) => {
                queue.pop_front();
            }
            // We are not polling and the next event is something different
            // from what we are doing, so just do the current action.
            (Some(current), next) if current != Crud::Poll && current != next => break,
            _ => {
                action = queue.pop_front();
            }
        }
    }
    action
}

impl State {
    pub(crate) async fn execute<A: Appliance>(
        self,
        action: Option<Crud>,
        params: &mut StateParams<'_, A>,
        ctx: &WorkerContext,
    ) -> Option<Crud> {
        match self {
            State::CalcAction => coalesce(action, params.queue),

            State::PushUpdate => {
                // Guarantee another configure pass after a partial configure.
                params.queue.push_front(Crud::Update);
                None
            }

            State::Alive => {
                if let Err(e) = params.appliance.update_state(ctx).await {
                    tracing::warn!(router_id = %params.router_id, error = %e, "update_state failed");
                }
                action
            }

            State::CreateVm => {
                let attempts = params.appliance.attempts();
                if attempts >= params.reboot_error_threshold {
                    tracing::info!(
                        router_id = %params.router_id,
                        attempts,
                        "dropping out of boot loop"
                    );
                    if let Err(e) = params.appliance.set_error(ctx).await {
                        tracing::warn!(router_id = %params.router_id, error = %e, "set_error failed");
                    }
                    return action;
                }
                if let Err(e) = params.appliance.boot(ctx).await {
                    tracing::warn!(router_id = %params.router_id, error = %e, "boot failed");
                }
                tracing::debug!(
                    router_id = %params.router_id,
                    attempt = params.appliance.attempts(),
                    threshold = params.reboot_error_threshold,
                    "boot attempt"
                );
                action
            }

            State::CheckBoot => {
                if let Err(e) = params.appliance.check_boot(ctx).await {
                    tracing::warn!(router_id = %params.router_id, error = %e, "check_boot failed");
                }
                // Put the action back on the front of the queue so the next
                // traversal re-processes it ahead of newer arrivals.
                if params.appliance.state() != ApplianceState::Gone {
                    if let Some(pending) = action {
                        params.queue.push_front(pending);
                    }
                }
                action
            }

            State::ConfigureVm => {
                if let Err(e) = params.appliance.configure(ctx).await {
                    tracing::warn!(router_id = %params.router_id, error = %e, "configure failed");
                }
                if params.appliance.state() == ApplianceState::Configured {
                    if action == Some(Crud::Read) {
                        Some(Crud::Read)
                    } else {
                        Some(Crud::Poll)
                    }
                } else {
                    // Let the next cycle re-evaluate.
                    action
                }
            }

            State::ReadStats => {
                match params.appliance.read_stats().await {
                    Ok(sample) => (params.bandwidth_callback)(sample),
                    Err(e) => {
                        tracing::warn!(router_id = %params.router_id, error = %e, "read_stats failed")
                    }
                }
                Some(Crud::Poll)
            }

            State::StopVm => {
                if let Err(e) = params.appliance.stop(ctx).await {
                    tracing::warn!(router_id = %params.router_id, error = %e, "stop failed");
                }
                if params.appliance.state() == ApplianceState::Gone {
                    // The router isn't there any more; upgrade to a terminal
                    // delete.
                    Some(Crud::Delete)
                } else {
                    action
                }
            }

            State::RebuildVm => {
                // An explicit rebuild overrides the boot-loop lockout.
                if params.appliance.state() == ApplianceState::Error {
                    if let Err(e) = params.appliance.clear_error(ctx).await {
                        tracing::warn!(router_id = %params.router_id, error = %e, "clear_error failed");
                    }
                }
                if let Err(e) = params.appliance.stop(ctx).await {
                    tracing::warn!(router_id = %params.router_id, error = %e, "stop failed");
                }
                if params.appliance.state() == ApplianceState::Gone {
                    Some(Crud::Delete)
                } else {
                    Some(Crud::Create)
                }
            }

            State::Exit => action,
        }
    }

    pub(crate) fn transition<A: Appliance>(
        self,
        action: Option<Crud>,
        params: &StateParams<'_, A>,
    ) -> State {
        let appliance = params.appliance.state();
        match self {
            State::CalcAction => {
                if appliance == ApplianceState::Gone {
                    State::StopVm
                } else if action == Some(Crud::Delete) {
                    State::StopVm
                } else if action == Some(Crud::Rebuild) {
                    State::RebuildVm
                } else if appliance == ApplianceState::Booting {
                    State::CheckBoot
                } else if appliance == ApplianceState::Down {
                    State::CreateVm
                } else {
                    State::Alive
                }
            }

            State::PushUpdate => State::CalcAction,

            State::Alive => {
                if appliance == ApplianceState::Gone {
                    State::StopVm
                } else if appliance == ApplianceState::Down {
                    State::CreateVm
                } else if action == Some(Crud::Poll) && appliance == ApplianceState::Configured {
                    State::CalcAction
                } else if action == Some(Crud::Read) && appliance == ApplianceState::Configured {
                    State::ReadStats
                } else {
                    State::ConfigureVm
                }
            }

            State::CreateVm => {
                if appliance == ApplianceState::Gone {
                    State::StopVm
                } else if appliance == ApplianceState::Error {
                    State::CalcAction
                } else {
                    State::CheckBoot
                }
            }

            State::CheckBoot => {
                if appliance == ApplianceState::Gone {
                    State::StopVm
                } else if appliance == ApplianceState::Up {
                    State::ConfigureVm
                } else {
                    State::CalcAction
                }
            }

            State::ConfigureVm => match appliance {
                ApplianceState::Restart | ApplianceState::Down | ApplianceState::Gone => {
                    State::StopVm
                }
                ApplianceState::Up => State::PushUpdate,
                // Below here the appliance is configured.
                _ if action == Some(Crud::Read) => State::ReadStats,
                _ => State::CalcAction,
            },

            State::ReadStats => State::CalcAction,

            State::StopVm => {
                if !appliance.is_stopped() {
                    // Keep stopping until the appliance converges or vanishes.
                    State::StopVm
                } else if appliance == ApplianceState::Gone {
                    State::Exit
                } else if action == Some(Crud::Delete) {
                    State::Exit
                } else {
                    State::CreateVm
                }
            }

            State::RebuildVm => {
                if !appliance.is_stopped() {
                    State::RebuildVm
                } else if appliance == ApplianceState::Gone {
                    State::Exit
                } else {
                    State::CreateVm
                }
            }

            State::Exit => State::Exit,
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
