//! Frame timing driven through the public plugin API.

use std::sync::Arc;
use std::time::{Duration, Instant};

use choreo_core_plugins::{
    ClockProvider, DefaultPlugins, FrameTime, OnFrameStart, TimePlugin, TracingPlugin,
    WorldInfoPlugin,
};
use choreo_system::plugin::{Plugin, PluginGroup, PluginId, ScheduleId};
use choreo_system::world::World;
use parking_lot::Mutex;

/// Clock that moves a fixed step every time it is read.
struct SteppingClock {
    now: Mutex<Instant>,
    step: Duration,
}

impl ClockProvider for SteppingClock {
    fn now(&self) -> Instant {
        let mut now = self.now.lock();
        *now += self.step;
        *now
    }
}

/// Records the delta it sees on every frame.
#[derive(Default)]
struct DeltaLog(Vec<Duration>);

struct DeltaRecorder;

impl Plugin for DeltaRecorder {
    fn build(&self, world: &mut World) {
        world.insert_resource(DeltaLog::default());
    }

    fn update(&self, world: &mut World, _schedule: ScheduleId) {
        let delta = world.get_resource::<FrameTime>().map(|time| time.delta());
        if let (Some(delta), Some(mut log)) = (delta, world.get_resource_mut::<DeltaLog>()) {
            log.0.push(delta);
        }
    }

    fn tick_schedules(&self) -> Vec<ScheduleId> {
        vec![ScheduleId::of::<OnFrameStart>()]
    }

    fn dependencies(&self) -> Vec<PluginId> {
        vec![PluginId::of::<TimePlugin>()]
    }
}

#[test]
fn dependents_see_the_current_frame() {
    let clock = Arc::new(SteppingClock {
        now: Mutex::new(Instant::now()),
        step: Duration::from_millis(20),
    });

    let mut world = World::new();
    world
        .add_plugins(DeltaRecorder)
        .add_plugins(TimePlugin::with_clock(clock))
        .add_plugins(WorldInfoPlugin);
    world.finish();

    for _ in 0..3 {
        world.tick::<OnFrameStart>();
    }

    let log = world.get_resource::<DeltaLog>().map(|log| log.0.clone());
    assert_eq!(
        log,
        Some(vec![
            Duration::ZERO,
            Duration::from_millis(20),
            Duration::from_millis(20),
        ])
    );
}

#[test]
fn default_plugins_without_tracing_still_tick() {
    let mut world = World::new();
    world.add_plugins(
        DefaultPlugins
            .build()
            .disable::<TracingPlugin>()
            .disable::<TimePlugin>()
            .add(TimePlugin::fixed(Duration::from_millis(5))),
    );
    world.finish();

    world.tick::<OnFrameStart>();
    world.tick::<OnFrameStart>();

    let elapsed = world.get_resource::<FrameTime>().map(|time| time.elapsed());
    assert_eq!(elapsed, Some(Duration::from_millis(10)));
    world.cleanup();
}
