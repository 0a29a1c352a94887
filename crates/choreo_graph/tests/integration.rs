//! End-to-end executor tests.
//!
//! Runs graph instances through ticks and dispatches, checking per-tick
//! ordering, global transitions, host calls, variables, weighted dispatch
//! and the hooks reported along the way.


use choreo_graph::prelude::*;
use core::time::Duration;
use std::sync::Arc;
use test_utils::{FRAME, attack_chain, instance, ms, recording_hooks, state, tick_n};

// ═══════════════════════════════════════════════════════════════════════════════
// SCENARIOS
// ═══════════════════════════════════════════════════════════════════════════════

/// Prepare -> Attack -> End -> Idle, driven by `FINISHED` and an outside
/// `AttackDone`.
#[test]
fn attack_chain_scenario() {
    let events = EventRegistry::new();
    let graph = attack_chain(&events);
    let attack_done = events.find_event("AttackDone").expect("created");
    let executor = GraphExecutor::new();
    let mut boss = instance(graph);

    assert_eq!(boss.active_state_name(), "Prepare");
    executor.dispatch(&mut boss, EventId::FINISHED, None);
    assert_eq!(boss.active_state_name(), "Attack");

    boss.raise(attack_done);
    executor.tick(&mut boss, &mut TickContext::new(FRAME));
    assert_eq!(boss.active_state_name(), "End");

    executor.dispatch(&mut boss, EventId::FINISHED, None);
    assert_eq!(boss.active_state_name(), "Idle");
}

/// `{A: w=1, max=2, miss=3}` and `{B: w=5, max=99, miss=99}` over 100
/// dispatches: A exactly twice.
#[test]
fn weighted_dispatch_scenario() {
    let events = EventRegistry::new();
    let a = events.create_event("A");
    let b = events.create_event("B");

    let mut graph = Graph::new("selector");
    let choose = graph.create_state("Choose", "").expect("fresh");
    let attack_a = graph.create_state("AttackA", "").expect("fresh");
    let attack_b = graph.create_state("AttackB", "").expect("fresh");
    graph
        .state_mut(choose)
        .expect("exists")
        .add_action(Action::weighted_dispatch(vec![
            Candidate::new(a, 1.0).with_max_triggers(2).with_max_misses(3),
            Candidate::new(b, 5.0).with_max_triggers(99).with_max_misses(99),
        ]));
    graph.set_transition(choose, a, attack_a).expect("known");
    graph.set_transition(choose, b, attack_b).expect("known");
    for back in [attack_a, attack_b] {
        graph
            .state_mut(back)
            .expect("exists")
            .add_action(Action::send_event(EventId::FINISHED));
        graph
            .set_transition(back, EventId::FINISHED, choose)
            .expect("known");
    }

    let executor = GraphExecutor::new();
    let mut selector = instance(graph);
    let mut ctx = TickContext::new(FRAME);
    let (mut count_a, mut count_b) = (0, 0);
    for _ in 0..100 {
        assert_eq!(selector.active_state(), choose);
        let outcome = executor.tick(&mut selector, &mut ctx);
        match outcome.transition.map(|t| t.to) {
            Some(to) if to == attack_a => count_a += 1,
            Some(to) if to == attack_b => count_b += 1,
            other => panic!("unexpected transition {other:?}"),
        }
        executor.tick(&mut selector, &mut ctx);
    }

    assert_eq!(count_a, 2);
    assert_eq!(count_b, 98);
    let counters = selector
        .dispatch_counters(choose, 0)
        .expect("dispatch ran");
    assert_eq!(counters[0].triggered, 2);
}

// ═══════════════════════════════════════════════════════════════════════════════
// TICK ORDERING
// ═══════════════════════════════════════════════════════════════════════════════

/// Verifies that entering a state does not run its actions in the same tick.
#[test]
fn target_actions_wait_for_next_tick() {
    let mut graph = Graph::new("g");
    let a = graph.create_state("A", "").expect("fresh");
    let b = graph.create_state("B", "").expect("fresh");
    let c = graph.create_state("C", "").expect("fresh");
    graph
        .state_mut(a)
        .expect("exists")
        .add_action(Action::send_event(EventId::FINISHED));
    graph
        .state_mut(b)
        .expect("exists")
        .add_action(Action::send_event(EventId::FINISHED));
    graph.set_transition(a, EventId::FINISHED, b).expect("known");
    graph.set_transition(b, EventId::FINISHED, c).expect("known");

    let executor = GraphExecutor::new();
    let mut inst = instance(graph);
    let outcomes = tick_n(&executor, &mut inst, 1, FRAME);
    assert_eq!(inst.active_state(), b);
    assert_eq!(outcomes[0].raised, 1);

    tick_n(&executor, &mut inst, 1, FRAME);
    assert_eq!(inst.active_state(), c);
}

/// Verifies that action events win over outside events, that leftover action
/// events are discarded, and that leftover outside events carry over.
#[test]
fn action_events_first_then_outside_events_carry_over() {
    let events = EventRegistry::new();
    let go_b = events.create_event("GoB");
    let go_c = events.create_event("GoC");
    let go_d = events.create_event("GoD");

    let mut graph = Graph::new("g");
    let a = graph.create_state("A", "").expect("fresh");
    let b = graph.create_state("B", "").expect("fresh");
    let c = graph.create_state("C", "").expect("fresh");
    let d = graph.create_state("D", "").expect("fresh");
    {
        let state = graph.state_mut(a).expect("exists");
        state.add_action(Action::send_event(go_b));
        state.add_action(Action::send_event(go_c));
    }
    graph.set_transition(a, go_b, b).expect("known");
    graph.set_transition(a, go_c, c).expect("known");
    graph.set_transition(a, go_d, d).expect("known");
    graph.set_transition(b, go_d, d).expect("known");

    let executor = GraphExecutor::new();
    let mut inst = instance(graph);
    inst.raise(go_d);
    let outcome = executor.tick(&mut inst, &mut TickContext::new(FRAME));

    assert_eq!(inst.active_state(), b, "first action event wins");
    assert_eq!(outcome.dropped, 1, "GoC is discarded");
    assert_eq!(inst.pending_events(), 1, "GoD carries over");

    executor.tick(&mut inst, &mut TickContext::new(FRAME));
    assert_eq!(inst.active_state(), d);
}

/// Verifies that global transitions apply only when no local one matches.
#[test]
fn global_transitions_are_a_fallback() {
    let events = EventRegistry::new();
    let stagger = events.create_event("Stagger");
    let mut graph = attack_chain(&events);
    let prepare = state(&graph, "Prepare");
    let idle = state(&graph, "Idle");
    let staggered = graph.create_state("Staggered", "").expect("fresh");
    graph.add_global_transition(stagger, staggered).expect("known");
    graph
        .add_global_transition(EventId::FINISHED, idle)
        .expect("known");

    let (hooks, log) = recording_hooks();
    let executor = GraphExecutor::new();
    let mut inst = instance(graph);

    executor.dispatch(&mut inst, EventId::FINISHED, Some(&hooks));
    assert_eq!(inst.active_state_name(), "Attack", "local FINISHED wins");

    executor.dispatch(&mut inst, stagger, Some(&hooks));
    assert_eq!(inst.active_state(), staggered);
    let transitions: Vec<bool> = log
        .events()
        .iter()
        .filter_map(|e| match e {
            GraphEvent::Transition { global, .. } => Some(*global),
            _ => None,
        })
        .collect();
    assert_eq!(transitions, vec![false, true]);

    executor.dispatch(&mut inst, EventId::FINISHED, Some(&hooks));
    assert_eq!(inst.active_state(), idle);
    assert_ne!(inst.active_state(), prepare);
}

/// Verifies that a self-transition restarts the state's timers.
#[test]
fn self_transition_restarts_timers() {
    let events = EventRegistry::new();
    let pulse = events.create_event("Pulse");
    let mut graph = Graph::new("g");
    let a = graph.create_state("A", "").expect("fresh");
    let b = graph.create_state("B", "").expect("fresh");
    graph
        .state_mut(a)
        .expect("exists")
        .add_action(Action::wait(ms(100), EventId::FINISHED));
    graph.set_transition(a, pulse, a).expect("known");
    graph.set_transition(a, EventId::FINISHED, b).expect("known");

    let executor = GraphExecutor::new();
    let mut inst = instance(graph);
    tick_n(&executor, &mut inst, 1, ms(60));
    inst.raise(pulse);
    tick_n(&executor, &mut inst, 1, ms(60));
    assert_eq!(inst.active_state(), a);
    assert_eq!(inst.ticks_in_state(), 0, "self transition re-entered A");

    tick_n(&executor, &mut inst, 2, ms(60));
    assert_eq!(inst.active_state(), a, "timer restarted: only 60ms elapsed");
    tick_n(&executor, &mut inst, 1, ms(60));
    assert_eq!(inst.active_state(), b);
}

/// Verifies that a delayed `SendEvent` fires after its delay.
#[test]
fn delayed_send_event() {
    let mut graph = Graph::new("g");
    let a = graph.create_state("A", "").expect("fresh");
    let b = graph.create_state("B", "").expect("fresh");
    graph
        .state_mut(a)
        .expect("exists")
        .add_action(Action::send_event_delayed(EventId::FINISHED, ms(50)));
    graph.set_transition(a, EventId::FINISHED, b).expect("known");

    let executor = GraphExecutor::new();
    let mut inst = instance(graph);
    tick_n(&executor, &mut inst, 2, ms(25));
    assert_eq!(inst.active_state(), a);
    tick_n(&executor, &mut inst, 1, ms(25));
    assert_eq!(inst.active_state(), b);
}

// ═══════════════════════════════════════════════════════════════════════════════
// VARIABLES AND CONDITIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Verifies `SetVariable` and `ConditionalDispatch` working together.
#[test]
fn conditional_dispatch_reads_variables() {
    let events = EventRegistry::new();
    let enraged_event = events.create_event("Enraged");
    let calm_event = events.create_event("Calm");

    let mut graph = Graph::new("g");
    let enraged = graph.declare_variable("enraged", false).expect("new");
    let set = graph.create_state("Set", "").expect("fresh");
    let check = graph.create_state("Check", "").expect("fresh");
    let rage = graph.create_state("Rage", "").expect("fresh");
    let calm = graph.create_state("CalmDown", "").expect("fresh");
    {
        let state = graph.state_mut(set).expect("exists");
        state.add_action(Action::set_variable(enraged, true));
        state.add_action(Action::send_event(EventId::FINISHED));
    }
    graph
        .state_mut(check)
        .expect("exists")
        .add_action(Action::conditional(
            enraged,
            Some(enraged_event),
            Some(calm_event),
        ));
    graph.set_transition(set, EventId::FINISHED, check).expect("known");
    graph.set_transition(check, enraged_event, rage).expect("known");
    graph.set_transition(check, calm_event, calm).expect("known");

    let executor = GraphExecutor::new();
    let mut inst = instance(graph);
    tick_n(&executor, &mut inst, 2, FRAME);
    assert_eq!(inst.active_state(), rage);
    assert_eq!(inst.variables().get_bool(enraged), Some(true));

    inst.reset();
    assert_eq!(inst.variables().get_bool(enraged), Some(false));
    assert_eq!(inst.active_state(), set);
}

/// Verifies that an every-tick condition keeps polling until it holds.
#[test]
fn every_tick_condition_polls() {
    let events = EventRegistry::new();
    let ready = events.create_event("Ready");
    let mut graph = Graph::new("g");
    let flag = graph.declare_variable("charged", false).expect("new");
    let wait = graph.create_state("Wait", "").expect("fresh");
    let fire = graph.create_state("Fire", "").expect("fresh");
    graph
        .state_mut(wait)
        .expect("exists")
        .add_action(Action::conditional_every_tick(flag, Some(ready), None));
    graph.set_transition(wait, ready, fire).expect("known");

    let executor = GraphExecutor::new();
    let mut inst = instance(graph);
    tick_n(&executor, &mut inst, 3, FRAME);
    assert_eq!(inst.active_state(), wait);

    inst.variables_mut()
        .set(flag, Value::Bool(true))
        .expect("bool variable");
    tick_n(&executor, &mut inst, 1, FRAME);
    assert_eq!(inst.active_state(), fire);
}

/// Verifies that a mistyped write is skipped without disturbing the tick.
#[test]
fn mistyped_set_variable_is_skipped() {
    let mut graph = Graph::new("g");
    let count = graph.declare_variable("count", 3_i64).expect("new");
    let a = graph.create_state("A", "").expect("fresh");
    let b = graph.create_state("B", "").expect("fresh");
    {
        let state = graph.state_mut(a).expect("exists");
        state.add_action(Action::set_variable(count, true));
        state.add_action(Action::send_event(EventId::FINISHED));
    }
    graph.set_transition(a, EventId::FINISHED, b).expect("known");

    let executor = GraphExecutor::new();
    let mut inst = instance(graph);
    tick_n(&executor, &mut inst, 1, FRAME);
    assert_eq!(inst.variables().get(count), Some(Value::Int(3)));
    assert_eq!(inst.active_state(), b);
}

// ═══════════════════════════════════════════════════════════════════════════════
// HOST CALLS
// ═══════════════════════════════════════════════════════════════════════════════

/// Verifies argument resolution for host calls.
#[test]
fn host_calls_resolve_arguments() {
    let events = EventRegistry::new();
    let done = events.create_event("VolleyDone");
    let mut graph = Graph::new("g");
    let volleys = graph.declare_variable("volleys", 4_i64).expect("new");
    let a = graph.create_state("A", "").expect("fresh");
    graph.state_mut(a).expect("exists").add_action(Action::invoke_host(
        "spawn_volley",
        vec![
            HostArg::Variable(volleys),
            HostArg::Event(done),
            HostArg::Text("orb".into()),
            HostArg::Placement("player".into()),
            HostArg::Placement("nowhere".into()),
        ],
    ));

    let player = Placement::at(glam::Vec3::new(3.0, 0.0, -1.0));
    let placements = StaticPlacements::new().with("player", player);
    let mut host = RecordingHost::new();
    let (hooks, log) = recording_hooks();
    let executor = GraphExecutor::new();
    let mut inst = instance(graph);

    {
        let mut ctx = TickContext::new(FRAME)
            .with_host(&mut host)
            .with_placement(&placements)
            .with_hooks(&hooks);
        executor.tick(&mut inst, &mut ctx);
        executor.tick(&mut inst, &mut ctx);
    }

    assert_eq!(host.calls.len(), 1, "host calls run once per state visit");
    assert_eq!(
        host.calls[0].args,
        vec![
            HostValue::Value(Value::Int(4)),
            HostValue::Event(done),
            HostValue::Text("orb".into()),
            HostValue::Placement(Some(player)),
            HostValue::Placement(None),
        ]
    );
    assert_eq!(log.schedules(), vec!["OnHostInvoke"]);
}

/// Verifies that a tick without a host still completes.
#[test]
fn host_calls_without_host_are_skipped() {
    let mut graph = Graph::new("g");
    let a = graph.create_state("A", "").expect("fresh");
    let b = graph.create_state("B", "").expect("fresh");
    {
        let state = graph.state_mut(a).expect("exists");
        state.add_action(Action::invoke_host("roar", Vec::new()));
        state.add_action(Action::send_event(EventId::FINISHED));
    }
    graph.set_transition(a, EventId::FINISHED, b).expect("known");

    let (hooks, log) = recording_hooks();
    let mut inst = instance(graph);
    GraphExecutor::new().tick(&mut inst, &mut TickContext::new(FRAME).with_hooks(&hooks));
    assert_eq!(inst.active_state(), b);
    assert!(log.events().iter().any(|e| matches!(
        e,
        GraphEvent::HostInvoked {
            delivered: false,
            ..
        }
    )));
}

// ═══════════════════════════════════════════════════════════════════════════════
// HOOKS AND LIFECYCLE
// ═══════════════════════════════════════════════════════════════════════════════

/// Verifies the hook order of a transition and of a dropped event.
#[test]
fn hook_order_for_transition_and_drop() {
    let events = EventRegistry::new();
    let graph = attack_chain(&events);
    let (hooks, log) = recording_hooks();
    let executor = GraphExecutor::new();
    let mut inst = instance(graph);

    executor.dispatch(&mut inst, EventId::RECYCLE, Some(&hooks));
    executor.dispatch(&mut inst, EventId::FINISHED, Some(&hooks));
    executor.destroy(&mut inst, Some(&hooks));
    executor.destroy(&mut inst, Some(&hooks));

    assert_eq!(
        log.schedules(),
        vec![
            "OnEventDropped",
            "OnStateExit",
            "OnTransition",
            "OnStateEnter",
            "OnInstanceDestroyed",
        ]
    );
}

/// Verifies that patching an instance leaves other instances alone.
#[test]
fn instance_patch_is_copy_on_write() {
    let events = EventRegistry::new();
    let graph = Arc::new(attack_chain(&events));
    let executor = GraphExecutor::new();
    let mut patched = GraphInstance::with_seed(Arc::clone(&graph), 1).expect("entry");
    let mut plain = GraphInstance::with_seed(Arc::clone(&graph), 1).expect("entry");

    patched
        .patch(|g| {
            let prepare = g.require_state("Prepare")?;
            let attack = g.require_state("Attack")?;
            g.splice_state(prepare, attack, vec![State::new("Windup")])?;
            Ok(())
        })
        .expect("patch applies");

    executor.dispatch(&mut patched, EventId::FINISHED, None);
    executor.dispatch(&mut plain, EventId::FINISHED, None);
    assert_eq!(patched.active_state_name(), "Windup");
    assert_eq!(plain.active_state_name(), "Attack");
    assert_eq!(graph.find_state("Windup"), None);

    let failed = patched.patch(|g| g.require_state("Missing").map(|_| ()));
    assert!(failed.is_err());
    assert_eq!(patched.graph().state_count(), 5);
}

/// Verifies that newly declared variables reach a patched instance.
#[test]
fn instance_patch_syncs_variables() {
    let events = EventRegistry::new();
    let mut inst = instance(attack_chain(&events));
    let mut flag = None;
    inst.patch(|g| {
        flag = Some(g.declare_variable("phase_two", false)?);
        Ok(())
    })
    .expect("declaration succeeds");
    let flag = flag.expect("declared");
    assert_eq!(inst.variables().get_bool(flag), Some(false));
}

/// Verifies that `reset` replays the same random choices.
#[test]
fn reset_replays_random_sequence() {
    let mut graph = Graph::new("g");
    let a = graph.create_state("A", "").expect("fresh");
    let b = graph.create_state("B", "").expect("fresh");
    graph
        .state_mut(a)
        .expect("exists")
        .add_action(Action::wait_random(ms(0), ms(500), EventId::FINISHED));
    graph.set_transition(a, EventId::FINISHED, b).expect("known");

    let executor = GraphExecutor::new();
    let mut inst = instance(graph);
    let run = |inst: &mut GraphInstance| {
        let mut ticks = 0_u32;
        while inst.active_state() != b {
            executor.tick(inst, &mut TickContext::new(ms(10)));
            ticks += 1;
        }
        ticks
    };
    let first = run(&mut inst);
    inst.reset();
    assert_eq!(run(&mut inst), first);
    assert!(Duration::from_millis(10) * (first - 1) <= ms(510));
}
