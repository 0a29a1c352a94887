//! Integration tests for sequence scheduling and cancellation.


use choreo_graph::event::{EventId, EventRegistry};
use choreo_sequence::prelude::*;
use core::time::Duration;
use test_utils::{Arena, FRAME, ms, note, tick_n};

const BOSS: OwnerId = OwnerId::new(100);
const ORB: OwnerId = OwnerId::new(7);

// ═══════════════════════════════════════════════════════════════════════════════
// SUSPENSION
// ═══════════════════════════════════════════════════════════════════════════════

/// Verifies that steps before the first wait run on the first tick.
#[test]
fn runs_until_first_suspension() {
    let mut scheduler = SequenceScheduler::new();
    scheduler.start(
        Sequence::new("intro", BOSS)
            .run(note("a"))
            .run(note("b"))
            .wait(ms(100))
            .run(note("c")),
    );

    let mut arena = Arena::default();
    tick_n(&mut scheduler, &mut arena, 1, FRAME);
    assert_eq!(arena.log, ["a", "b"]);
    assert!(!scheduler.is_empty());
}

/// Verifies that `wait_until` checks on entry and on every later tick.
#[test]
fn wait_until_resumes_on_the_tick_it_holds() {
    let mut scheduler = SequenceScheduler::new();
    scheduler.start(
        Sequence::new("trap", BOSS)
            .wait_until(|arena: &Arena| arena.armed)
            .run(note("sprung")),
    );

    let mut arena = Arena::default();
    tick_n(&mut scheduler, &mut arena, 3, FRAME);
    assert!(arena.log.is_empty());

    arena.armed = true;
    let done = tick_n(&mut scheduler, &mut arena, 1, FRAME);
    assert_eq!(arena.log, ["sprung"]);
    assert_eq!(done.len(), 1);
}

/// Verifies that signals are delivered on the next tick only.
#[test]
fn signals_are_delivered_for_one_tick() {
    let events = EventRegistry::new();
    let go = events.create_event("Go");
    let mut scheduler = SequenceScheduler::new();
    scheduler.start(
        Sequence::new("waiter", BOSS)
            .wait_for_signal(go)
            .run(note("went"))
            .wait_for_signal(go)
            .run(note("went again")),
    );

    let mut arena = Arena::default();
    scheduler.signal(go);
    tick_n(&mut scheduler, &mut arena, 1, FRAME);
    assert_eq!(arena.log, ["went", "went again"], "one signal serves both waits in its tick");

    let mut late = SequenceScheduler::new();
    late.start(Sequence::new("late", BOSS).wait(ms(10)).wait_for_signal(go).run(note("late")));
    let mut arena = Arena::default();
    late.signal(go);
    tick_n(&mut late, &mut arena, 3, ms(10));
    assert!(arena.log.is_empty(), "the signal expired before the wait was reached");
}

/// Verifies the completion report.
#[test]
fn completions_carry_owner_and_event() {
    let mut scheduler = SequenceScheduler::new();
    let first = scheduler.start(
        Sequence::new("volley", ORB)
            .run(note("fire"))
            .on_complete(EventId::FINISHED),
    );
    let second = scheduler.start(Sequence::new("silent", BOSS).run(note("noop")));

    let mut arena = Arena::default();
    let done = tick_n(&mut scheduler, &mut arena, 1, FRAME);
    assert_eq!(
        done,
        vec![
            Completion {
                id: first,
                owner: ORB,
                name: "volley".into(),
                event: Some(EventId::FINISHED),
            },
            Completion {
                id: second,
                owner: BOSS,
                name: "silent".into(),
                event: None,
            },
        ]
    );
}

/// Verifies that sequences run in start order, so the last one writes last.
#[test]
fn start_order_is_write_order() {
    let mut scheduler = SequenceScheduler::new();
    scheduler.start(Sequence::new("first", BOSS).run(|a: &mut Arena| a.armed = true));
    scheduler.start(Sequence::new("second", ORB).run(|a: &mut Arena| a.armed = false));

    let mut arena = Arena::default();
    tick_n(&mut scheduler, &mut arena, 1, FRAME);
    assert!(!arena.armed);
}

// ═══════════════════════════════════════════════════════════════════════════════
// CANCELLATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Verifies that cancelling an owner drops its sequences without completion.
#[test]
fn cancel_owner_skips_remaining_steps() {
    let mut scheduler = SequenceScheduler::new();
    scheduler.start(
        Sequence::new("orb", ORB)
            .run(note("spawned"))
            .wait(ms(50))
            .run(note("exploded"))
            .on_complete(EventId::FINISHED),
    );
    let boss = scheduler.start(Sequence::new("boss", BOSS).wait(ms(500)));

    let mut arena = Arena::default();
    tick_n(&mut scheduler, &mut arena, 1, FRAME);
    assert_eq!(scheduler.cancel_owner(ORB), 1);
    assert_eq!(scheduler.cancel_owner(ORB), 0);

    let done = tick_n(&mut scheduler, &mut arena, 10, FRAME);
    assert!(done.is_empty());
    assert_eq!(arena.log, ["spawned"]);
    assert_eq!(scheduler.running_for(BOSS), vec![boss]);
}

/// Verifies that a recycle requested inside a step stops the owner's
/// sequences before their next step, in the same tick.
#[test]
fn recycle_inside_a_step_cancels_same_tick() {
    let mut scheduler = SequenceScheduler::new();
    let mut arena = Arena::with_canceller(scheduler.canceller());

    scheduler.start(
        Sequence::new("self_destruct", ORB)
            .run(note("boom"))
            .run(|a: &mut Arena| a.recycle(ORB))
            .run(note("after recycle"))
            .on_complete(EventId::FINISHED),
    );
    scheduler.start(Sequence::new("trail", ORB).run(note("trail")));
    scheduler.start(Sequence::new("boss", BOSS).run(note("boss")));

    let done = tick_n(&mut scheduler, &mut arena, 1, FRAME);
    assert_eq!(arena.log, ["boom", "boss"]);
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].owner, BOSS);
    assert!(scheduler.is_empty());
}

/// Verifies that a recycle stops a spawner between two children.
#[test]
fn recycle_stops_spawning_midway() {
    let mut scheduler = SequenceScheduler::new();
    let mut arena = Arena::with_canceller(scheduler.canceller());
    scheduler.start(Sequence::new("burst", ORB).spawn_children(
        5,
        Duration::ZERO,
        |a: &mut Arena, i| {
            a.note(format!("child {i}"));
            if i == 1 {
                a.recycle(ORB);
            }
        },
    ));

    tick_n(&mut scheduler, &mut arena, 1, FRAME);
    assert_eq!(arena.log, ["child 0", "child 1"]);
}

/// Verifies that a request filed between ticks applies to sequences started
/// before it, not after.
#[test]
fn requests_apply_to_existing_sequences_only() {
    let mut scheduler = SequenceScheduler::new();
    let canceller = scheduler.canceller();
    let old = scheduler.start(Sequence::new("old", ORB).wait(ms(100)));
    canceller.cancel_owner(ORB);
    let new = scheduler.start(Sequence::new("new", ORB).wait(ms(100)));

    assert!(!scheduler.is_running(old));
    assert!(scheduler.is_running(new));
    tick_n(&mut scheduler, &mut Arena::default(), 1, FRAME);
    assert_eq!(scheduler.running_for(ORB), vec![new]);
}

/// Verifies that `clear` stops everything.
#[test]
fn clear_cancels_all() {
    let mut scheduler = SequenceScheduler::new();
    scheduler.start(Sequence::new("a", ORB).wait(ms(100)).run(note("a")));
    scheduler.start(Sequence::new("b", BOSS).wait(ms(100)).run(note("b")));
    scheduler.clear();
    assert_eq!(scheduler.len(), 0);

    let mut arena = Arena::default();
    assert!(tick_n(&mut scheduler, &mut arena, 20, FRAME).is_empty());
    assert!(arena.log.is_empty());
}
