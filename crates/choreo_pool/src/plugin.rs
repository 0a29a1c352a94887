//! Pool configuration and world integration.

use std::sync::Arc;

use choreo_graph::plugin::GraphPlugin;
use choreo_system::plugin::{Plugin, PluginId};
use choreo_system::resource::GlobalResource;
use choreo_system::world::World;

use crate::pool::EntityPool;
use crate::template::TemplateLoader;

/// Pool sizing and growth settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Most entities created by one [`EntityPool::maintain`] call.
    pub instantiations_per_tick: usize,
    /// Ticks between two floor checks.
    pub growth_interval_ticks: u64,
    /// Floor given to a template the first time the pool sees it.
    pub default_floor: usize,
    /// Whether failed template loads are retried.
    pub retry_failed_templates: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            instantiations_per_tick: 1,
            growth_interval_ticks: 30,
            default_floor: 0,
            retry_failed_templates: true,
        }
    }
}

impl GlobalResource for PoolConfig {}

/// Makes pool settings available to the world.
///
/// Provides [`PoolConfig`] as a global resource. Pools themselves belong
/// to whoever creates them; [`PoolPlugin::pool`] builds one with the
/// world's settings.
///
/// # Dependencies
///
/// - [`GraphPlugin`]
#[derive(Debug, Clone, Default)]
pub struct PoolPlugin {
    config: PoolConfig,
}

impl PoolPlugin {
    /// Uses the given settings.
    #[must_use]
    pub fn with_config(mut self, config: PoolConfig) -> Self {
        self.config = config;
        self
    }

    /// Creates a pool configured from the world's [`PoolConfig`].
    #[must_use]
    pub fn pool(world: &World, loader: Arc<dyn TemplateLoader>) -> EntityPool {
        let config = world
            .get_global::<PoolConfig>()
            .map_or_else(PoolConfig::default, |config| *config);
        EntityPool::new(loader, config)
    }
}

impl Plugin for PoolPlugin {
    fn build(&self, world: &mut World) {
        world.insert_global(self.config);
    }

    fn dependencies(&self) -> Vec<PluginId> {
        vec![PluginId::of::<GraphPlugin>()]
    }
}
