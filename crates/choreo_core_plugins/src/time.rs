//! Frame clock plugin and resources.
//!
//! Provides [`TimePlugin`], which registers:
//! - [`Clock`] - global time source, swappable for tests
//! - [`TimeConfig`] - fixed step and delta clamp
//! - [`FrameTime`] - per-frame delta, advanced on [`OnFrameStart`]
//!
//! The host loop ticks [`OnFrameStart`] once per frame and reads
//! [`FrameTime::delta`] to drive graph instances, sequences and pools.
//!
//! ```
//! use std::time::Duration;
//! use choreo_system::world::World;
//! use choreo_core_plugins::{FrameTime, OnFrameStart, TimePlugin, WorldInfoPlugin};
//!
//! let mut world = World::new();
//! world
//!     .add_plugins(WorldInfoPlugin)
//!     .add_plugins(TimePlugin::fixed(Duration::from_millis(16)));
//! world.finish();
//!
//! world.tick::<OnFrameStart>();
//! world.tick::<OnFrameStart>();
//!
//! let time = world.get_resource::<FrameTime>().unwrap();
//! assert_eq!(time.frame(), 2);
//! assert_eq!(time.elapsed(), Duration::from_millis(32));
//! ```

use crate::WorldInfoPlugin;
use choreo_system::plugin::{Plugin, PluginId, Schedule, ScheduleId};
use choreo_system::resource::GlobalResource;
use choreo_system::world::World;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Schedule ticked by the host loop at the start of every frame.
pub struct OnFrameStart;

impl Schedule for OnFrameStart {}

// ─────────────────────────────────────────────────────────────────────────────
// ClockProvider Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Source of the current instant.
///
/// ```
/// use std::time::Instant;
/// use choreo_core_plugins::ClockProvider;
///
/// struct FrozenClock(Instant);
///
/// impl ClockProvider for FrozenClock {
///     fn now(&self) -> Instant {
///         self.0
///     }
/// }
/// ```
pub trait ClockProvider: Send + Sync + 'static {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
struct SystemClock;

impl ClockProvider for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Clock Resource
// ─────────────────────────────────────────────────────────────────────────────

/// Global time source. Uses the system clock unless the plugin was given
/// a provider.
pub struct Clock {
    provider: Arc<dyn ClockProvider>,
}

impl GlobalResource for Clock {}

impl Clock {
    fn system() -> Self {
        Self {
            provider: Arc::new(SystemClock),
        }
    }

    fn with_provider(provider: Arc<dyn ClockProvider>) -> Self {
        Self { provider }
    }

    /// Returns the current instant.
    #[must_use]
    pub fn now(&self) -> Instant {
        self.provider.now()
    }

    /// Returns the duration elapsed since `earlier`, zero if it lies ahead.
    #[must_use]
    pub fn elapsed_since(&self, earlier: Instant) -> Duration {
        self.now().saturating_duration_since(earlier)
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::system()
    }
}

impl core::fmt::Debug for Clock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Clock").finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TimeConfig / FrameTime
// ─────────────────────────────────────────────────────────────────────────────

/// Frame stepping rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeConfig {
    /// When set, every frame advances by exactly this much regardless of
    /// the clock.
    pub fixed_delta: Option<Duration>,
    /// Upper bound for a measured delta. Long stalls (debugger, loading)
    /// advance timers by at most this much.
    pub max_delta: Duration,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            fixed_delta: None,
            max_delta: Duration::from_millis(250),
        }
    }
}

impl GlobalResource for TimeConfig {}

/// Time of the current frame.
#[derive(Debug, Clone, Default)]
pub struct FrameTime {
    delta: Duration,
    elapsed: Duration,
    frame: u64,
    last: Option<Instant>,
}

impl FrameTime {
    /// Time since the previous frame, after clamping.
    #[must_use]
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Sum of all deltas so far.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Number of frames started.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Starts a new frame at `now`.
    ///
    /// The first measured frame has a zero delta.
    pub fn advance(&mut self, now: Instant, config: &TimeConfig) {
        let measured = self
            .last
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.delta = match config.fixed_delta {
            Some(fixed) => fixed,
            None => measured.min(config.max_delta),
        };
        self.last = Some(now);
        self.elapsed += self.delta;
        self.frame += 1;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TimePlugin
// ─────────────────────────────────────────────────────────────────────────────

/// Frame clock plugin.
///
/// # Resources Provided
///
/// | Resource | Scope | Description |
/// |----------|-------|-------------|
/// | [`Clock`] | Global | Time source, mockable for testing |
/// | [`TimeConfig`] | Global | Fixed step and delta clamp |
/// | [`FrameTime`] | World | Delta of the current frame |
///
/// # Dependencies
///
/// - [`WorldInfoPlugin`]
#[derive(Clone, Default)]
pub struct TimePlugin {
    clock: Option<Arc<dyn ClockProvider>>,
    config: TimeConfig,
}

impl TimePlugin {
    /// Creates a plugin using the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a plugin that advances every frame by `delta`.
    #[must_use]
    pub fn fixed(delta: Duration) -> Self {
        Self::default().with_config(TimeConfig {
            fixed_delta: Some(delta),
            ..TimeConfig::default()
        })
    }

    /// Creates a plugin reading time from `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn ClockProvider>) -> Self {
        Self {
            clock: Some(clock),
            ..Self::default()
        }
    }

    /// Replaces the stepping rules.
    #[must_use]
    pub fn with_config(mut self, config: TimeConfig) -> Self {
        self.config = config;
        self
    }
}

impl Plugin for TimePlugin {
    fn build(&self, world: &mut World) {
        let clock = match &self.clock {
            Some(provider) => Clock::with_provider(Arc::clone(provider)),
            None => Clock::system(),
        };
        world.insert_global(clock);
        world.insert_global(self.config);
        world.insert_resource(FrameTime::default());
    }

    fn update(&self, world: &mut World, _schedule: ScheduleId) {
        let Some(now) = world.get_global::<Clock>().map(|clock| clock.now()) else {
            return;
        };
        if let Some(mut time) = world.get_resource_mut::<FrameTime>() {
            time.advance(now, &self.config);
            tracing::trace!(frame = time.frame(), delta = ?time.delta(), "frame started");
        }
    }

    fn tick_schedules(&self) -> Vec<ScheduleId> {
        vec![ScheduleId::of::<OnFrameStart>()]
    }

    fn dependencies(&self) -> Vec<PluginId> {
        vec![PluginId::of::<WorldInfoPlugin>()]
    }
}

impl core::fmt::Debug for TimePlugin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TimePlugin")
            .field("custom_clock", &self.clock.is_some())
            .field("config", &self.config)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MockClock for Testing
// ─────────────────────────────────────────────────────────────────────────────

/// Clock that only moves when told to.
///
/// ```ignore
/// let mock = Arc::new(MockClock::new(Instant::now()));
/// world.add_plugins(TimePlugin::with_clock(mock.clone()));
/// mock.advance(Duration::from_millis(16));
/// ```
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug)]
pub struct MockClock {
    current: parking_lot::RwLock<Instant>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockClock {
    /// Creates a mock clock set to `start`.
    #[must_use]
    pub fn new(start: Instant) -> Self {
        Self {
            current: parking_lot::RwLock::new(start),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, duration: Duration) {
        *self.current.write() += duration;
    }

    /// Sets the clock to `instant`.
    pub fn set(&self, instant: Instant) {
        *self.current.write() = instant;
    }

    /// Returns the current instant.
    #[must_use]
    pub fn current(&self) -> Instant {
        *self.current.read()
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl ClockProvider for MockClock {
    fn now(&self) -> Instant {
        self.current()
    }
}
