// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use rover_appliance::{ApplianceCall, FakeAppliance};
use rover_core::ApplianceState::{Booting, Configured, Down, Error, Gone, Restart, Up};
use rover_core::Crud::{Create, Delete, Poll, Read, Rebuild, Update};

fn noop_bandwidth(_: BandwidthSample) {}

fn ctx() -> WorkerContext {
    WorkerContext::new("worker-0")
}

fn run_coalesce(action: Option<Crud>, queue: &[Crud]) -> (Option<Crud>, Vec<Crud>) {
    let mut pending: VecDeque<Crud> = queue.iter().copied().collect();
    let result = coalesce(action, &mut pending);
    (result, pending.into_iter().collect())
}

#[yare::parameterized(
    update_upgrades_to_create   = { None, &[Update, Create], Some(Create), &[] },
    create_absorbs_update       = { None, &[Create, Update], Some(Create), &[] },
    update_upgrades_to_rebuild  = { None, &[Update, Rebuild], Some(Rebuild), &[] },
    delete_dominates            = { None, &[Create, Update, Delete, Poll], Some(Delete), &[Create, Update, Delete, Poll] },
    create_absorbs_polls        = { None, &[Create, Poll, Poll, Update], Some(Create), &[] },
    update_stops_at_read        = { None, &[Update, Read], Some(Update), &[Read] },
    rebuild_supersedes_create   = { Some(Create), &[Rebuild], Some(Rebuild), &[] },
    rebuild_keeps_later_events  = { Some(Create), &[Rebuild, Update], Some(Rebuild), &[Update] },
    poll_yields_to_next_event   = { Some(Poll), &[Read], Some(Read), &[] },
    stale_action_is_a_barrier   = { Some(Read), &[Update], Some(Read), &[Update] },
    empty_queue_keeps_action    = { Some(Poll), &[], Some(Poll), &[] },
    delete_action_not_downgraded = { Some(Delete), &[Rebuild], Some(Delete), &[Rebuild] },
)]
fn coalescing(action: Option<Crud>, queue: &[Crud], expected: Option<Crud>, remaining: &[Crud]) {
    let (result, rest) = run_coalesce(action, queue);
    assert_eq!(result, expected);
    assert_eq!(rest, remaining);
}

fn transitions(state: State, action: Option<Crud>, appliance_state: ApplianceState) -> State {
    let fake = FakeAppliance::with_state(appliance_state);
    let mut queue = VecDeque::new();
    let router_id = RouterId::new("rtr-1");
    let params = StateParams {
        router_id: &router_id,
        appliance: &fake,
        queue: &mut queue,
        bandwidth_callback: &noop_bandwidth,
        reboot_error_threshold: 3,
    };
    state.transition(action, &params)
}

#[yare::parameterized(
    calc_gone_wins              = { State::CalcAction, Some(Poll), Gone, State::StopVm },
    calc_delete_stops           = { State::CalcAction, Some(Delete), Configured, State::StopVm },
    calc_rebuild                = { State::CalcAction, Some(Rebuild), Configured, State::RebuildVm },
    calc_booting_checks         = { State::CalcAction, Some(Create), Booting, State::CheckBoot },
    calc_down_creates           = { State::CalcAction, Some(Create), Down, State::CreateVm },
    calc_otherwise_probes       = { State::CalcAction, Some(Poll), Configured, State::Alive },
    calc_error_probes           = { State::CalcAction, Some(Update), Error, State::Alive },
    push_update_recalculates    = { State::PushUpdate, None, Up, State::CalcAction },
    alive_gone_stops            = { State::Alive, Some(Poll), Gone, State::StopVm },
    alive_down_creates          = { State::Alive, Some(Poll), Down, State::CreateVm },
    alive_poll_configured_done  = { State::Alive, Some(Poll), Configured, State::CalcAction },
    alive_read_configured_stats = { State::Alive, Some(Read), Configured, State::ReadStats },
    alive_otherwise_configures  = { State::Alive, Some(Update), Configured, State::ConfigureVm },
    alive_up_configures         = { State::Alive, Some(Poll), Up, State::ConfigureVm },
    create_gone_stops           = { State::CreateVm, Some(Create), Gone, State::StopVm },
    create_error_recalculates   = { State::CreateVm, Some(Create), Error, State::CalcAction },
    create_otherwise_checks     = { State::CreateVm, Some(Create), Booting, State::CheckBoot },
    check_gone_stops            = { State::CheckBoot, Some(Create), Gone, State::StopVm },
    check_up_configures         = { State::CheckBoot, Some(Create), Up, State::ConfigureVm },
    check_still_booting_yields  = { State::CheckBoot, Some(Create), Booting, State::CalcAction },
    check_down_yields           = { State::CheckBoot, Some(Create), Down, State::CalcAction },
    configure_restart_stops     = { State::ConfigureVm, Some(Update), Restart, State::StopVm },
    configure_down_stops        = { State::ConfigureVm, Some(Update), Down, State::StopVm },
    configure_gone_stops        = { State::ConfigureVm, Some(Update), Gone, State::StopVm },
    configure_regressed_rearms  = { State::ConfigureVm, Some(Update), Up, State::PushUpdate },
    configure_read_reads_stats  = { State::ConfigureVm, Some(Read), Configured, State::ReadStats },
    configure_done_recalculates = { State::ConfigureVm, Some(Poll), Configured, State::CalcAction },
    read_stats_recalculates     = { State::ReadStats, Some(Poll), Configured, State::CalcAction },
    stop_converging_stays       = { State::StopVm, Some(Delete), Configured, State::StopVm },
    stop_gone_exits             = { State::StopVm, Some(Update), Gone, State::Exit },
    stop_delete_exits           = { State::StopVm, Some(Delete), Down, State::Exit },
    stop_restart_recreates      = { State::StopVm, Some(Update), Down, State::CreateVm },
    rebuild_converging_stays    = { State::RebuildVm, Some(Create), Booting, State::RebuildVm },
    rebuild_gone_exits          = { State::RebuildVm, Some(Create), Gone, State::Exit },
    rebuild_down_recreates      = { State::RebuildVm, Some(Create), Down, State::CreateVm },
    exit_is_terminal            = { State::Exit, Some(Delete), Gone, State::Exit },
)]
fn transition_table(state: State, action: Option<Crud>, appliance: ApplianceState, expected: State) {
    assert_eq!(transitions(state, action, appliance), expected);
}

#[tokio::test]
async fn check_boot_requeues_action_at_front() {
    let fake = FakeAppliance::with_state(Booting);
    let mut queue: VecDeque<Crud> = [Read].into_iter().collect();
    let router_id = RouterId::new("rtr-1");
    let mut params = StateParams {
        router_id: &router_id,
        appliance: &fake,
        queue: &mut queue,
        bandwidth_callback: &noop_bandwidth,
        reboot_error_threshold: 3,
    };

    let action = State::CheckBoot.execute(Some(Create), &mut params, &ctx()).await;

    assert_eq!(action, Some(Create));
    // The pending create goes ahead of the later read.
    assert_eq!(queue.iter().copied().collect::<Vec<_>>(), vec![Create, Read]);
}

#[tokio::test]
async fn check_boot_does_not_requeue_when_gone() {
    let fake = FakeAppliance::with_state(Booting);
    fake.set_state_after_check_boot(Some(Gone));
    let mut queue = VecDeque::new();
    let router_id = RouterId::new("rtr-1");
    let mut params = StateParams {
        router_id: &router_id,
        appliance: &fake,
        queue: &mut queue,
        bandwidth_callback: &noop_bandwidth,
        reboot_error_threshold: 3,
    };

    State::CheckBoot.execute(Some(Create), &mut params, &ctx()).await;

    assert!(queue.is_empty());
}

#[tokio::test]
async fn push_update_prepends_and_clears_action() {
    let fake = FakeAppliance::with_state(Up);
    let mut queue: VecDeque<Crud> = [Read].into_iter().collect();
    let router_id = RouterId::new("rtr-1");
    let mut params = StateParams {
        router_id: &router_id,
        appliance: &fake,
        queue: &mut queue,
        bandwidth_callback: &noop_bandwidth,
        reboot_error_threshold: 3,
    };

    let action = State::PushUpdate.execute(Some(Update), &mut params, &ctx()).await;

    assert_eq!(action, None);
    assert_eq!(queue.front(), Some(&Update));
}

#[tokio::test]
async fn stop_forces_delete_once_gone() {
    let fake = FakeAppliance::with_state(Gone);
    let mut queue = VecDeque::new();
    let router_id = RouterId::new("rtr-1");
    let mut params = StateParams {
        router_id: &router_id,
        appliance: &fake,
        queue: &mut queue,
        bandwidth_callback: &noop_bandwidth,
        reboot_error_threshold: 3,
    };

    let action = State::StopVm.execute(Some(Update), &mut params, &ctx()).await;

    assert_eq!(action, Some(Delete));
}

#[tokio::test]
async fn create_vm_latches_error_at_threshold() {
    let fake = FakeAppliance::with_state(Down);
    fake.set_attempts(3);
    let mut queue = VecDeque::new();
    let router_id = RouterId::new("rtr-1");
    let mut params = StateParams {
        router_id: &router_id,
        appliance: &fake,
        queue: &mut queue,
        bandwidth_callback: &noop_bandwidth,
        reboot_error_threshold: 3,
    };

    let action = State::CreateVm.execute(Some(Create), &mut params, &ctx()).await;

    assert_eq!(action, Some(Create));
    assert_eq!(fake.call_count(ApplianceCall::Boot), 0);
    assert_eq!(fake.call_count(ApplianceCall::SetError), 1);
    assert_eq!(fake.state(), Error);
}

#[tokio::test]
async fn rebuild_clears_error_and_requests_create() {
    let fake = FakeAppliance::with_state(Error);
    fake.set_attempts(5);
    let mut queue = VecDeque::new();
    let router_id = RouterId::new("rtr-1");
    let mut params = StateParams {
        router_id: &router_id,
        appliance: &fake,
        queue: &mut queue,
        bandwidth_callback: &noop_bandwidth,
        reboot_error_threshold: 3,
    };

    let action = State::RebuildVm.execute(Some(Rebuild), &mut params, &ctx()).await;

    assert_eq!(action, Some(Create));
    assert_eq!(fake.call_count(ApplianceCall::ClearError), 1);
    assert_eq!(fake.call_count(ApplianceCall::Stop), 1);
    assert_eq!(fake.attempts(), 0);
}

#[tokio::test]
async fn read_stats_feeds_callback_and_polls() {
    let fake = FakeAppliance::with_state(Configured);
    fake.set_stats(BandwidthSample {
        bytes_in: 42,
        bytes_out: 7,
    });
    let samples = parking_lot::Mutex::new(Vec::new());
    let record = |sample: BandwidthSample| samples.lock().push(sample);
    let mut queue = VecDeque::new();
    let router_id = RouterId::new("rtr-1");
    let mut params = StateParams {
        router_id: &router_id,
        appliance: &fake,
        queue: &mut queue,
        bandwidth_callback: &record,
        reboot_error_threshold: 3,
    };

    let action = State::ReadStats.execute(Some(Read), &mut params, &ctx()).await;

    assert_eq!(action, Some(Poll));
    assert_eq!(
        samples.lock().as_slice(),
        &[BandwidthSample {
            bytes_in: 42,
            bytes_out: 7,
        }]
    );
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn crud_strategy() -> impl Strategy<Value = Crud> {
        prop_oneof![
            Just(Create),
            Just(Read),
            Just(Update),
            Just(Delete),
            Just(Poll),
            Just(Rebuild),
        ]
    }

    fn action_strategy() -> impl Strategy<Value = Option<Crud>> {
        proptest::option::of(crud_strategy())
    }

    proptest! {
        #[test]
        fn delete_anywhere_always_wins(
            action in action_strategy(),
            queue in proptest::collection::vec(crud_strategy(), 0..12),
        ) {
            prop_assume!(queue.contains(&Delete));
            let (result, rest) = run_coalesce(action, &queue);
            prop_assert_eq!(result, Some(Delete));
            // Delete dominance does not disturb the queue.
            prop_assert_eq!(rest, queue);
        }

        #[test]
        fn coalescing_never_grows_the_queue(
            action in action_strategy(),
            queue in proptest::collection::vec(crud_strategy(), 0..12),
        ) {
            let (result, rest) = run_coalesce(action, &queue);
            prop_assert!(rest.len() <= queue.len());
            if !queue.is_empty() && !queue.contains(&Delete) {
                // A non-empty queue always produces a candidate action.
                prop_assert!(result.is_some());
            }
        }
    }
}
