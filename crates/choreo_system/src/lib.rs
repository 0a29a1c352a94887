//! The runtime foundation for Choreo (Layer 1).
//!
//! `choreo_system` provides the primitives every other crate builds on:
//!
//! - [`api`] - API trait for world-lifetime registries
//! - [`plugin`] - Plugin trait, plugin groups and tick schedules
//! - [`resource`] - Type-keyed resource storage
//! - [`world`] - The [`World`](world::World) runtime that orchestrates plugins
//!
//! # Architecture
//!
//! - **Layer 1** (`choreo_system`, `choreo_core_plugins`): runtime and infrastructure
//! - **Layer 2** (`choreo_graph`, `choreo_sequence`, `choreo_pool`): behavior graphs,
//!   sequencing and pooled entities
//! - **Layer 3** (`choreo_encounter`): attack patterns and encounter control
//!
//! # Example
//!
//! ```
//! use choreo_system::plugin::Plugin;
//! use choreo_system::resource::GlobalResource;
//! use choreo_system::world::World;
//!
//! #[derive(Default)]
//! struct ArenaConfig { width: f32 }
//! impl GlobalResource for ArenaConfig {}
//!
//! struct ArenaPlugin;
//!
//! impl Plugin for ArenaPlugin {
//!     fn build(&self, world: &mut World) {
//!         world.insert_global(ArenaConfig::default());
//!     }
//! }
//!
//! let mut world = World::new();
//! world.add_plugins(ArenaPlugin);
//! world.finish();
//! assert!(world.contains_global::<ArenaConfig>());
//! ```

/// API trait for capability registration.
pub mod api;

/// Plugin trait for extensible functionality.
pub mod plugin;

/// Resource container management.
pub mod resource;

/// World runtime for plugin orchestration.
pub mod world;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::api::*;
    pub use crate::plugin::*;
    pub use crate::resource::*;
    pub use crate::world::*;
}
