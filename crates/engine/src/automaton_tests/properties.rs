// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Invariants: delete dominance, one-shot callback, bounded pumping.

use super::*;
use std::time::Duration;

async fn assert_delete_fires_once(sequence: &[Crud]) {
    let mut t = test_automaton(config());
    for crud in sequence {
        t.send(*crud);
    }

    t.pump_to_quiescence().await;

    assert!(t.automaton.deleted(), "sequence {sequence:?}");
    assert_eq!(t.delete_count(), 1, "sequence {sequence:?}");
}

#[tokio::test]
async fn lone_delete_exits() {
    assert_delete_fires_once(&[Crud::Delete]).await;
}

#[tokio::test]
async fn delete_after_create_and_update_exits() {
    assert_delete_fires_once(&[Crud::Create, Crud::Update, Crud::Delete]).await;
}

#[tokio::test]
async fn delete_between_polls_exits() {
    assert_delete_fires_once(&[Crud::Poll, Crud::Delete, Crud::Poll]).await;
}

#[tokio::test]
async fn delete_after_rebuild_exits() {
    assert_delete_fires_once(&[Crud::Rebuild, Crud::Delete]).await;
}

#[tokio::test]
async fn delete_callback_never_fires_twice() {
    let mut t = test_automaton(config());
    t.send(Crud::Delete);
    t.automaton.update(&ctx()).await;
    assert_eq!(t.delete_count(), 1);

    // Nothing after the exit can re-trigger the callback.
    t.send(Crud::Delete);
    t.automaton.update(&ctx()).await;
    assert_eq!(t.delete_count(), 1);
}

#[tokio::test]
async fn pump_returns_promptly_on_poll_storm() {
    let mut t = test_automaton(config());
    t.fake.set_state(ApplianceState::Configured);
    for _ in 0..50 {
        t.send(Crud::Poll);
    }

    tokio::time::timeout(Duration::from_secs(1), t.automaton.update(&ctx()))
        .await
        .unwrap();

    assert!(!t.automaton.has_more_work());
}

#[tokio::test]
async fn error_latch_blocks_further_boots() {
    let mut t = test_automaton(config());
    t.fake.set_boot_sticks(false);
    t.send(Crud::Create);
    t.pump_to_quiescence().await;
    assert_eq!(t.fake.state(), ApplianceState::Error);

    t.fake.clear_calls();
    t.send(Crud::Update);
    t.pump_to_quiescence().await;

    assert_eq!(t.fake.call_count(ApplianceCall::Boot), 0);
    assert_eq!(t.fake.state(), ApplianceState::Error);
}
