//! World metadata plugin.
//!
//! ```
//! use choreo_system::world::World;
//! use choreo_core_plugins::{WorldInfo, WorldInfoPlugin};
//!
//! let mut world = World::new();
//! world.add_plugins(WorldInfoPlugin);
//! world.finish();
//!
//! let info = world.get_global::<WorldInfo>().unwrap();
//! assert!(!info.version.is_empty());
//! ```

use choreo_system::plugin::Plugin;
use choreo_system::resource::GlobalResource;
use choreo_system::world::World;

/// Build metadata for the running world.
///
/// Read-only. Every other core plugin depends on [`WorldInfoPlugin`], so
/// this is the first global a world publishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldInfo {
    /// Crate version from `Cargo.toml`.
    pub version: &'static str,
    /// Whether the world was compiled with debug assertions.
    pub debug: bool,
}

impl GlobalResource for WorldInfo {}

impl Default for WorldInfo {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            debug: cfg!(debug_assertions),
        }
    }
}

/// Publishes [`WorldInfo`] as a global resource.
///
/// # Resources Provided
///
/// | Resource | Scope | Description |
/// |----------|-------|-------------|
/// | [`WorldInfo`] | Global | Version and build mode |
#[derive(Debug, Default, Clone, Copy)]
pub struct WorldInfoPlugin;

impl Plugin for WorldInfoPlugin {
    fn build(&self, world: &mut World) {
        world.insert_global(WorldInfo::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_info_default() {
        let info = WorldInfo::default();
        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(info.debug, cfg!(debug_assertions));
    }

    #[test]
    fn plugin_registers_global() {
        let mut world = World::new();
        world.add_plugins(WorldInfoPlugin);
        world.finish();

        assert!(world.contains_global::<WorldInfo>());
        assert!(WorldInfoPlugin.name().contains("WorldInfoPlugin"));
    }
}
