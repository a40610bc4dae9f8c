// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Automaton test harness: a fake appliance plus counting callbacks.

use super::*;
use crate::state::State;
use parking_lot::Mutex;
use rover_appliance::{ApplianceCall, ApplianceError, FakeAppliance};
use rover_core::{ApplianceState, BandwidthSample, Crud, Message, WorkerContext};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

mod ingress;
mod properties;
mod scenarios;

pub(super) fn ctx() -> WorkerContext {
    WorkerContext::new("worker-0")
}

pub(super) fn config() -> AutomatonConfig {
    AutomatonConfig {
        queue_warning_threshold: 100,
        reboot_error_threshold: 3,
    }
}

pub(super) struct TestAutomaton {
    pub automaton: Automaton<FakeAppliance>,
    pub fake: FakeAppliance,
    deletes: Arc<AtomicUsize>,
    pub samples: Arc<Mutex<Vec<BandwidthSample>>>,
}

pub(super) fn test_automaton(config: AutomatonConfig) -> TestAutomaton {
    let fake = FakeAppliance::new();
    let deletes = Arc::new(AtomicUsize::new(0));
    let samples = Arc::new(Mutex::new(Vec::new()));

    let delete_counter = Arc::clone(&deletes);
    let sample_sink = Arc::clone(&samples);
    let automaton = Automaton::new(
        AutomatonDeps {
            router_id: RouterId::new("rtr-1"),
            tenant_id: TenantId::new("tnt-1"),
            appliance: fake.clone(),
            delete_callback: Box::new(move || {
                delete_counter.fetch_add(1, Ordering::SeqCst);
            }),
            bandwidth_callback: Box::new(move |sample| sample_sink.lock().push(sample)),
        },
        config,
    );

    TestAutomaton {
        automaton,
        fake,
        deletes,
        samples,
    }
}

impl TestAutomaton {
    pub fn send(&mut self, crud: Crud) -> bool {
        self.automaton
            .send_message(&Message::new("rtr-1", "tnt-1", crud))
    }

    /// Pump until quiescent, failing the test instead of livelocking.
    pub async fn pump_to_quiescence(&mut self) {
        let mut passes = 0;
        while self.automaton.has_more_work() {
            self.automaton.update(&ctx()).await;
            passes += 1;
            assert!(passes < 64, "automaton failed to go quiescent");
        }
    }

    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}
