//! Plugin system for extensible world functionality.
//!
//! Everything a [`World`] knows how to do arrives through a plugin: the event
//! namespace, the pool configuration, the frame clock, logging. The world
//! itself only orders plugins, runs their lifecycle and routes schedule
//! ticks to them.
//!
//! # Example
//!
//! ```
//! use choreo_system::plugin::{Plugin, PluginId};
//! use choreo_system::world::World;
//!
//! struct LoggingPlugin;
//! impl Plugin for LoggingPlugin {
//!     fn build(&self, _world: &mut World) {}
//! }
//!
//! struct ArenaPlugin {
//!     width: f32,
//! }
//!
//! struct ArenaWidth(f32);
//!
//! impl Plugin for ArenaPlugin {
//!     fn build(&self, world: &mut World) {
//!         world.insert_resource(ArenaWidth(self.width));
//!     }
//!
//!     fn dependencies(&self) -> Vec<PluginId> {
//!         vec![PluginId::of::<LoggingPlugin>()]
//!     }
//! }
//!
//! let mut world = World::new();
//! world
//!     .add_plugins(LoggingPlugin)
//!     .add_plugins(ArenaPlugin { width: 32.0 });
//! world.finish();
//! ```

mod schedule;

pub use schedule::{IntoScheduleIds, Schedule, ScheduleId};

use core::any::TypeId;

use crate::world::World;

// ─────────────────────────────────────────────────────────────────────────────
// PluginId
// ─────────────────────────────────────────────────────────────────────────────

/// Unique identifier for a plugin type.
///
/// Based on [`TypeId`], so each plugin type has exactly one `PluginId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PluginId {
    type_id: TypeId,
    type_name: &'static str,
}

impl PluginId {
    /// Creates a `PluginId` for the given plugin type.
    #[must_use]
    pub fn of<P: Plugin>() -> Self {
        Self {
            type_id: TypeId::of::<P>(),
            type_name: core::any::type_name::<P>(),
        }
    }

    /// Returns the underlying `TypeId`.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the type name for debugging.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Plugin Trait
// ─────────────────────────────────────────────────────────────────────────────

/// A unit of world functionality.
///
/// Lifecycle, driven by [`World`]:
///
/// 1. **Build** - `build()` in dependency order
/// 2. **Ready** - `ready()` in dependency order
/// 3. **Tick** - `update()` whenever a schedule from `tick_schedules()` is ticked
/// 4. **Cleanup** - `cleanup()` in reverse dependency order
///
/// # Scheduled Updates
///
/// ```ignore
/// pub struct OnFrameStart;
/// impl Schedule for OnFrameStart {}
///
/// impl Plugin for FrameStatsPlugin {
///     fn build(&self, world: &mut World) {
///         world.insert_resource(FrameStats::default());
///     }
///
///     fn tick_schedules(&self) -> Vec<ScheduleId> {
///         vec![ScheduleId::of::<OnFrameStart>()]
///     }
///
///     fn update(&self, world: &mut World, _schedule: ScheduleId) {
///         if let Some(mut stats) = world.get_resource_mut::<FrameStats>() {
///             stats.frames += 1;
///         }
///     }
/// }
/// ```
pub trait Plugin: Send + Sync + 'static {
    /// Configures the world. Called once, in dependency order.
    ///
    /// Insert configuration, resources and APIs here. Keep it cheap.
    fn build(&self, world: &mut World);

    /// Called after every plugin has been built.
    ///
    /// Use this for work that depends on other plugins' registrations.
    fn ready(&self, _world: &mut World) {}

    /// Called when a schedule this plugin registered for is ticked.
    ///
    /// Only called for schedules listed in [`tick_schedules()`](Self::tick_schedules).
    fn update(&self, _world: &mut World, _schedule: ScheduleId) {}

    /// Called when the world shuts down, in **reverse** dependency order.
    fn cleanup(&self, _world: &mut World) {}

    /// Schedules this plugin wants `update()` calls for.
    fn tick_schedules(&self) -> Vec<ScheduleId> {
        Vec::new()
    }

    /// Returns the plugin's name for debugging and error messages.
    fn name(&self) -> &str {
        core::any::type_name::<Self>()
    }

    /// Plugins that must be added before this one.
    ///
    /// The world panics in [`World::finish`] if one is missing.
    fn dependencies(&self) -> Vec<PluginId> {
        Vec::new()
    }

    /// Returns true if this plugin can only be added once.
    ///
    /// Default is `true`.
    fn is_unique(&self) -> bool {
        true
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Plugins Trait (for add_plugins polymorphism)
// ─────────────────────────────────────────────────────────────────────────────

/// Types that can be handed to [`World::add_plugins`].
///
/// Implemented for every [`Plugin`] and for [`PluginGroupBuilder`].
pub trait Plugins {
    /// Adds these plugins to the world.
    fn add_to_world(self, world: &mut World);
}

impl<P: Plugin> Plugins for P {
    fn add_to_world(self, world: &mut World) {
        let id = PluginId::of::<P>();
        world.add_plugin_boxed(id, Box::new(self));
    }
}

impl Plugins for PluginGroupBuilder {
    fn add_to_world(self, world: &mut World) {
        for boxed in self.plugins {
            world.add_plugin_boxed(boxed.id, boxed.plugin);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PluginGroup Trait
// ─────────────────────────────────────────────────────────────────────────────

/// A named bundle of plugins.
///
/// ```ignore
/// World::new().add_plugins(
///     DefaultPlugins
///         .build()
///         .disable::<TracingPlugin>()
/// );
/// ```
pub trait PluginGroup {
    /// Returns the plugins in this group.
    fn build(self) -> PluginGroupBuilder;
}

/// A boxed plugin with its [`PluginId`] captured before type erasure.
pub(crate) struct BoxedPlugin {
    pub(crate) id: PluginId,
    pub(crate) plugin: Box<dyn Plugin>,
}

impl BoxedPlugin {
    fn new<P: Plugin>(plugin: P) -> Self {
        Self {
            id: PluginId::of::<P>(),
            plugin: Box::new(plugin),
        }
    }

    pub(crate) fn name(&self) -> &str {
        self.plugin.name()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PluginGroupBuilder
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for customizing plugin groups.
#[derive(Default)]
pub struct PluginGroupBuilder {
    pub(crate) plugins: Vec<BoxedPlugin>,
}

impl PluginGroupBuilder {
    /// Creates a new empty plugin group builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    /// Adds a plugin to the end of the group.
    #[must_use]
    #[expect(
        clippy::should_implement_trait,
        reason = "This is a builder method, not std::ops::Add"
    )]
    pub fn add<P: Plugin>(mut self, plugin: P) -> Self {
        self.plugins.push(BoxedPlugin::new(plugin));
        self
    }

    /// Adds a plugin before `Target`, or at the front if `Target` is absent.
    #[must_use]
    pub fn add_before<P: Plugin, Target: Plugin>(mut self, plugin: P) -> Self {
        let position = self.position_of::<Target>().unwrap_or(0);
        self.plugins.insert(position, BoxedPlugin::new(plugin));
        self
    }

    /// Adds a plugin after `Target`, or at the end if `Target` is absent.
    #[must_use]
    pub fn add_after<P: Plugin, Target: Plugin>(mut self, plugin: P) -> Self {
        let position = self
            .position_of::<Target>()
            .map_or(self.plugins.len(), |i| i + 1);
        self.plugins.insert(position, BoxedPlugin::new(plugin));
        self
    }

    /// Removes a plugin from the group by type. No-op if absent.
    #[must_use]
    pub fn disable<P: Plugin>(mut self) -> Self {
        let id = PluginId::of::<P>();
        self.plugins.retain(|p| p.id != id);
        self
    }

    /// Returns the number of plugins in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Returns true if the group contains no plugins.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    fn position_of<Target: Plugin>(&self) -> Option<usize> {
        let id = PluginId::of::<Target>();
        self.plugins.iter().position(|p| p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Clock;
    impl Plugin for Clock {
        fn build(&self, _world: &mut World) {}
    }

    struct Pool;
    impl Plugin for Pool {
        fn build(&self, _world: &mut World) {}
        fn dependencies(&self) -> Vec<PluginId> {
            vec![PluginId::of::<Clock>()]
        }
    }

    struct Logging;
    impl Plugin for Logging {
        fn build(&self, _world: &mut World) {}
    }

    fn names(builder: &PluginGroupBuilder) -> Vec<&str> {
        builder.plugins.iter().map(BoxedPlugin::name).collect()
    }

    #[test]
    fn plugin_id_distinguishes_types() {
        assert_eq!(PluginId::of::<Clock>(), PluginId::of::<Clock>());
        assert_ne!(PluginId::of::<Clock>(), PluginId::of::<Pool>());
        assert_eq!(PluginId::of::<Clock>().type_id(), TypeId::of::<Clock>());
        assert!(PluginId::of::<Clock>().type_name().ends_with("Clock"));
    }

    #[test]
    fn plugin_defaults() {
        assert!(Clock.name().contains("Clock"));
        assert!(Clock.is_unique());
        assert!(Clock.dependencies().is_empty());
        assert!(Clock.tick_schedules().is_empty());
        assert_eq!(Pool.dependencies(), vec![PluginId::of::<Clock>()]);
    }

    #[test]
    fn group_ordering_helpers() {
        let builder = PluginGroupBuilder::new()
            .add(Clock)
            .add(Pool)
            .add_before::<_, Pool>(Logging);
        let order = names(&builder);
        assert!(order[0].ends_with("Clock"));
        assert!(order[1].ends_with("Logging"));
        assert!(order[2].ends_with("Pool"));

        let builder = PluginGroupBuilder::new()
            .add(Clock)
            .add(Pool)
            .add_after::<_, Clock>(Logging);
        let order = names(&builder);
        assert!(order[1].ends_with("Logging"));
    }

    #[test]
    fn group_missing_target_falls_back_to_edges() {
        let front = PluginGroupBuilder::new()
            .add(Clock)
            .add_before::<_, Pool>(Logging);
        assert!(names(&front)[0].ends_with("Logging"));

        let back = PluginGroupBuilder::new()
            .add(Clock)
            .add_after::<_, Pool>(Logging);
        assert!(names(&back)[1].ends_with("Logging"));
    }

    #[test]
    fn group_disable() {
        let builder = PluginGroupBuilder::new()
            .add(Clock)
            .add(Pool)
            .disable::<Clock>()
            .disable::<Logging>();
        assert_eq!(builder.len(), 1);
        assert!(names(&builder)[0].ends_with("Pool"));

        let empty = PluginGroupBuilder::new().add(Pool).disable::<Pool>();
        assert!(empty.is_empty());
    }

    struct Emitter;
    impl Plugin for Emitter {
        fn build(&self, _world: &mut World) {}
        fn is_unique(&self) -> bool {
            false
        }
    }

    #[test]
    fn non_unique_plugin_can_repeat() {
        let mut world = World::new();
        world.add_plugins(Emitter).add_plugins(Emitter);
        world.finish();
        assert!(world.is_built());
    }
}
