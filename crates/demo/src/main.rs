//! Boss encounter simulation CLI.
//!
//! Runs the warden fight headless at a fixed 60 Hz step and logs what the
//! boss and its projectiles do.
//!
//! # Usage
//!
//! ```bash
//! arena [seconds] [seed]
//! ```
//!
//! # Example
//!
//! ```bash
//! RUST_LOG=info,choreo_graph=debug arena 20 7
//! ```

use std::sync::Arc;
use std::time::Duration;

use choreo_core_plugins::{DefaultPlugins, FrameTime, OnFrameStart, TimePlugin};
use choreo_encounter::{Encounter, EncounterContext};
use choreo_graph::prelude::*;
use choreo_pool::{PoolConfig, PoolPlugin, StaticTemplates};
use choreo_system::plugin::PluginGroup;
use choreo_system::world::World;
use demo::{LoggingHost, ORB, arena_placements, orb_template, register_routines, warden};

const STEP: Duration = Duration::from_micros(16_667);
const STAGGER_EVERY: u64 = 300;

fn main() {
    let mut world = World::new();
    world
        .add_plugins(
            DefaultPlugins
                .build()
                .disable::<TimePlugin>()
                .add(TimePlugin::fixed(STEP)),
        )
        .add_plugins(GraphPlugin::default().with_dropped_event_trace(true))
        .add_plugins(PoolPlugin::default().with_config(PoolConfig {
            instantiations_per_tick: 2,
            ..PoolConfig::default()
        }));
    world.finish();

    let args: Vec<String> = std::env::args().collect();
    let seconds: u64 = match args.get(1).map(|s| s.parse()) {
        None => 20,
        Some(Ok(seconds)) => seconds,
        Some(Err(error)) => {
            tracing::error!(%error, "usage: arena [seconds] [seed]");
            std::process::exit(2);
        }
    };
    let seed: u64 = match args.get(2).map(|s| s.parse()) {
        None => 42,
        Some(Ok(seed)) => seed,
        Some(Err(error)) => {
            tracing::error!(%error, "usage: arena [seconds] [seed]");
            std::process::exit(2);
        }
    };

    let Some(events) = world.api::<EventRegistry>().cloned() else {
        tracing::error!("graph plugin missing");
        std::process::exit(1);
    };
    if let Some(hooks) = world.api::<HooksAPI>() {
        let registered = hooks.register_observer::<OnTransition, _>(
            "arena_transition_log",
            |event: &GraphEvent| tracing::info!(%event, "transition"),
        );
        if let Err(error) = registered {
            tracing::warn!(%error, "transition log not installed");
        }
    }

    let (graph, applied) = match warden(&events) {
        Ok(built) => built,
        Err(error) => {
            tracing::error!(%error, "warden graph rejected");
            std::process::exit(1);
        }
    };
    let template = match orb_template() {
        Ok(template) => template,
        Err(error) => {
            tracing::error!(%error, "orb template rejected");
            std::process::exit(1);
        }
    };
    let boss = match GraphInstance::with_seed(Arc::new(graph), seed) {
        Ok(boss) => boss,
        Err(error) => {
            tracing::error!(%error, "warden has no entry state");
            std::process::exit(1);
        }
    };
    tracing::info!(applied, seed, seconds, "warden ready");

    let mut pool = PoolPlugin::pool(&world, Arc::new(StaticTemplates::new().with(template)));
    pool.prewarm(ORB, 8);
    let mut encounter =
        Encounter::new(boss, pool).with_executor(GraphPlugin::executor(&world));
    register_routines(&mut encounter);

    let stagger = events.create_event("stagger");
    let placements = arena_placements();
    let mut host = LoggingHost::default();
    let frames = seconds * 60;

    for _ in 0..frames {
        world.tick::<OnFrameStart>();
        let Some((dt, frame)) = world
            .get_resource::<FrameTime>()
            .map(|time| (time.delta(), time.frame()))
        else {
            break;
        };
        if frame % STAGGER_EVERY == 0 {
            encounter.boss_mut().raise(stagger);
        }

        let mut ctx = EncounterContext::new()
            .with_host(&mut host)
            .with_placement(&placements);
        if let Some(hooks) = world.api::<HooksAPI>() {
            ctx = ctx.with_hooks(hooks);
        }
        let report = encounter.tick(dt, ctx);
        if !report.recycled.is_empty() {
            tracing::debug!(count = report.recycled.len(), "orbs recycled");
        }
    }

    let hooks = world.api::<HooksAPI>();
    encounter.end(hooks);
    tracing::info!(
        host_calls = host.calls(),
        stats = ?encounter.pool().stats(),
        "fight over"
    );
    world.cleanup();
}
