// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! send_message / has_more_work contract.

use super::*;

#[test]
fn accepted_message_grows_queue() {
    let mut t = test_automaton(config());
    assert!(!t.automaton.has_more_work());

    assert!(t.send(Crud::Poll));
    assert!(t.automaton.has_more_work());
}

#[test]
fn poll_rejected_while_appliance_errored() {
    let mut t = test_automaton(config());
    t.fake.set_state(ApplianceState::Error);

    assert!(!t.send(Crud::Poll));
    assert!(!t.automaton.has_more_work());

    // Anything but a poll still gets through.
    assert!(t.send(Crud::Read));
    assert!(t.send(Crud::Rebuild));
}

#[tokio::test]
async fn messages_rejected_after_delete() {
    let mut t = test_automaton(config());
    t.send(Crud::Delete);
    t.automaton.update(&ctx()).await;
    assert!(t.automaton.deleted());

    assert!(!t.send(Crud::Create));
    assert!(!t.send(Crud::Poll));
    assert!(!t.automaton.has_more_work());
}

#[tokio::test]
async fn update_is_noop_after_delete() {
    let mut t = test_automaton(config());
    t.send(Crud::Delete);
    t.automaton.update(&ctx()).await;
    t.fake.clear_calls();

    t.automaton.update(&ctx()).await;

    assert!(t.fake.calls().is_empty());
    assert_eq!(t.delete_count(), 1);
}

#[test]
fn service_shutdown_is_advisory() {
    let mut t = test_automaton(config());
    t.send(Crud::Poll);

    t.automaton.service_shutdown();

    // No transition was forced; the queued work is still there.
    assert!(t.automaton.has_more_work());
    assert!(!t.automaton.deleted());
}
