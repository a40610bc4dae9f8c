// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end lifecycle scenarios against a scripted appliance.

use super::*;

#[tokio::test]
async fn cold_create_boots_and_configures() {
    let mut t = test_automaton(config());
    assert!(t.send(Crud::Create));

    t.automaton.update(&ctx()).await;

    assert_eq!(t.fake.call_count(ApplianceCall::Boot), 1);
    assert_eq!(t.fake.call_count(ApplianceCall::CheckBoot), 1);
    assert_eq!(t.fake.call_count(ApplianceCall::Configure), 1);
    assert_eq!(t.fake.state(), ApplianceState::Configured);
    assert_eq!(t.automaton.current_state(), State::CalcAction);
    assert_eq!(t.delete_count(), 0);

    t.pump_to_quiescence().await;
    assert!(!t.automaton.deleted());
    assert_eq!(t.delete_count(), 0);
}

#[tokio::test]
async fn create_then_immediate_delete_never_boots() {
    let mut t = test_automaton(config());
    t.send(Crud::Create);
    t.send(Crud::Delete);

    t.automaton.update(&ctx()).await;

    assert!(t.automaton.deleted());
    assert_eq!(t.delete_count(), 1);
    assert_eq!(t.fake.call_count(ApplianceCall::Boot), 0);
    assert_eq!(t.fake.call_count(ApplianceCall::Stop), 1);
}

#[tokio::test]
async fn boot_loop_latches_error() {
    let mut t = test_automaton(config());
    t.fake.set_boot_sticks(false);
    t.send(Crud::Create);

    t.pump_to_quiescence().await;

    assert_eq!(t.fake.call_count(ApplianceCall::Boot), 3);
    assert_eq!(t.fake.call_count(ApplianceCall::SetError), 1);
    assert_eq!(t.fake.state(), ApplianceState::Error);
    // Polls do not rescue an errored appliance.
    assert!(!t.send(Crud::Poll));
}

#[tokio::test]
async fn rebuild_rescues_errored_appliance() {
    let mut t = test_automaton(config());
    t.fake.set_boot_sticks(false);
    t.send(Crud::Create);
    t.pump_to_quiescence().await;
    assert_eq!(t.fake.state(), ApplianceState::Error);

    t.fake.set_boot_sticks(true);
    t.fake.clear_calls();
    assert!(t.send(Crud::Rebuild));
    t.pump_to_quiescence().await;

    assert_eq!(t.fake.call_count(ApplianceCall::ClearError), 1);
    assert!(t.fake.call_count(ApplianceCall::Stop) >= 1);
    assert_eq!(t.fake.call_count(ApplianceCall::Boot), 1);
    assert_eq!(t.fake.state(), ApplianceState::Configured);
    assert_eq!(t.delete_count(), 0);
}

#[tokio::test]
async fn upstream_vanish_mid_configure_exits() {
    let mut t = test_automaton(config());
    t.fake.set_state(ApplianceState::Configured);
    t.fake.set_state_after_configure(Some(ApplianceState::Gone));
    t.send(Crud::Update);

    t.automaton.update(&ctx()).await;

    // No delete was ever enqueued, yet the automaton self-destructs.
    assert!(t.automaton.deleted());
    assert_eq!(t.delete_count(), 1);
}

#[tokio::test]
async fn read_stats_round_trip() {
    let mut t = test_automaton(config());
    t.fake.set_state(ApplianceState::Configured);
    t.fake.set_stats(BandwidthSample {
        bytes_in: 42,
        bytes_out: 7,
    });
    t.send(Crud::Read);

    t.automaton.update(&ctx()).await;

    assert_eq!(
        t.samples.lock().as_slice(),
        &[BandwidthSample {
            bytes_in: 42,
            bytes_out: 7,
        }]
    );
    assert_eq!(t.automaton.current_action(), Some(Crud::Poll));
    assert_eq!(t.automaton.current_state(), State::CalcAction);
}

#[tokio::test]
async fn transient_configure_failure_recovers() {
    let mut t = test_automaton(config());
    t.fake.set_state(ApplianceState::Up);
    t.fake
        .fail_next_configure(ApplianceError::Network("appliance unreachable".into()));
    t.send(Crud::Update);

    t.pump_to_quiescence().await;

    // The failed configure regressed nothing; PushUpdate re-armed the queue
    // and the second pass converged.
    assert_eq!(t.fake.state(), ApplianceState::Configured);
    assert!(t.fake.call_count(ApplianceCall::Configure) >= 2);
    assert_eq!(t.delete_count(), 0);
}
