//! Core infrastructure plugins for Choreo.
//!
//! - [`WorldInfoPlugin`] - version and build metadata
//! - [`TimePlugin`] - frame clock with a mockable time source
//! - [`TracingPlugin`] - logging via the `tracing` crate
//! - [`DefaultPlugins`] / [`MinimalPlugins`] - bundles of the above
//!
//! # Feature Flags
//!
//! - `test-utils` - enables [`MockClock`] for deterministic frame timing
//!
//! # Example
//!
//! ```
//! use choreo_system::plugin::PluginGroup;
//! use choreo_system::world::World;
//! use choreo_core_plugins::{FrameTime, MinimalPlugins, OnFrameStart};
//!
//! let mut world = World::new();
//! world.add_plugins(MinimalPlugins.build());
//! world.finish();
//!
//! world.tick::<OnFrameStart>();
//! assert_eq!(world.get_resource::<FrameTime>().unwrap().frame(), 1);
//! ```

mod time;
mod tracing_plugin;
mod world_info;

pub use time::{Clock, ClockProvider, FrameTime, OnFrameStart, TimeConfig, TimePlugin};
pub use tracing_plugin::{TracingConfig, TracingFormat, TracingPlugin};
pub use world_info::{WorldInfo, WorldInfoPlugin};

#[cfg(any(test, feature = "test-utils"))]
pub use time::MockClock;

use choreo_system::plugin::{PluginGroup, PluginGroupBuilder};

/// Plugins most worlds need: metadata, frame clock and logging.
///
/// ```ignore
/// world.add_plugins(
///     DefaultPlugins
///         .build()
///         .disable::<TracingPlugin>()
/// );
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPlugins;

impl PluginGroup for DefaultPlugins {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::new()
            .add(WorldInfoPlugin)
            .add(TimePlugin::default())
            .add(TracingPlugin::default())
    }
}

/// Metadata and frame clock, without installing a subscriber.
///
/// Suited to tests and headless simulation.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimalPlugins;

impl PluginGroup for MinimalPlugins {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::new()
            .add(WorldInfoPlugin)
            .add(TimePlugin::default())
    }
}
