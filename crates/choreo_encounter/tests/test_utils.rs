//! Shared test utilities for `choreo_encounter` integration tests.
//!
//! Import via `mod test_utils;` in test files.

#![allow(
    dead_code,
    missing_docs,
    reason = "shared test utilities, not all items used in every test binary"
)]

use choreo_encounter::prelude::*;
use choreo_graph::prelude::*;
use choreo_pool::prelude::*;
use core::time::Duration;
use std::sync::Arc;

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// `Fly --(100ms) FINISHED--> Explode`, where `Explode` raises `RECYCLE`.
pub fn orb_graph() -> Graph {
    let mut graph = Graph::new("orb");
    let fly = graph.create_state("Fly", "").expect("fresh");
    let explode = graph.create_state("Explode", "").expect("fresh");
    graph
        .state_mut(fly)
        .expect("exists")
        .add_action(Action::wait(ms(100), EventId::FINISHED));
    graph
        .state_mut(explode)
        .expect("exists")
        .add_action(Action::send_event(EventId::RECYCLE));
    graph
        .set_transition(fly, EventId::FINISHED, explode)
        .expect("known");
    graph
}

/// A pool holding `count` ready orbs.
pub fn warmed_pool(count: usize) -> EntityPool {
    let loader = StaticTemplates::new().with(Template::new("orb", orb_graph()));
    let mut pool = EntityPool::new(
        Arc::new(loader),
        PoolConfig {
            instantiations_per_tick: count.max(1),
            ..PoolConfig::default()
        },
    );
    pool.prewarm("orb", count);
    pool.maintain();
    pool
}

/// Adds `name` with a single wait raising `FINISHED` after `duration`.
pub fn timed_state(graph: &mut Graph, name: &str, duration: Duration) -> StateId {
    let state = graph.create_state(name, "").expect("fresh");
    graph
        .state_mut(state)
        .expect("exists")
        .add_action(Action::wait(duration, EventId::FINISHED));
    state
}

/// Builds an encounter for `graph` after applying `patterns`.
pub fn encounter(
    mut graph: Graph,
    events: &EventRegistry,
    patterns: &[&dyn AttackPattern],
    orbs: usize,
) -> Encounter {
    let applied = apply_patterns(&mut graph, events, patterns);
    assert_eq!(applied, patterns.len(), "every pattern installs");
    let boss = GraphInstance::with_seed(Arc::new(graph), 7).expect("valid graph");
    let mut encounter = Encounter::new(boss, warmed_pool(orbs));
    for pattern in patterns {
        encounter.register_pattern(*pattern);
    }
    encounter
}

pub fn arena_placements() -> StaticPlacements {
    StaticPlacements::new().with("boss", Placement::at(glam::Vec3::new(0.0, 2.0, 5.0)))
}

/// Ticks `n` times with `host` and the arena placements attached.
pub fn run(
    encounter: &mut Encounter,
    host: &mut RecordingHost,
    dt: Duration,
    n: usize,
) -> Vec<EncounterTick> {
    let placements = arena_placements();
    (0..n)
        .map(|_| {
            encounter.tick(
                dt,
                EncounterContext::new()
                    .with_host(&mut *host)
                    .with_placement(&placements),
            )
        })
        .collect()
}

/// Ticks until the boss is in `state`, up to `max` ticks. Returns the
/// number of ticks taken.
pub fn run_until_state(
    encounter: &mut Encounter,
    host: &mut RecordingHost,
    dt: Duration,
    state: &str,
    max: usize,
) -> Option<usize> {
    let placements = arena_placements();
    for tick in 1..=max {
        encounter.tick(
            dt,
            EncounterContext::new()
                .with_host(&mut *host)
                .with_placement(&placements),
        );
        if encounter.boss().active_state_name() == state {
            return Some(tick);
        }
    }
    None
}
