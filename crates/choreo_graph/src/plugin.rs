//! World integration for behavior graphs.

use choreo_system::plugin::Plugin;
use choreo_system::world::World;

use crate::event::EventRegistry;
use crate::executor::{ExecutorConfig, GraphExecutor};
use crate::hooks::HooksAPI;
use crate::hooks::events::GraphEvent;
use crate::hooks::schedule::OnEventDropped;
use crate::library::ActionLibrary;

/// Installs the shared graph registries into a world.
///
/// Provides:
/// - [`EventRegistry`] and [`ActionLibrary`] APIs, cleared again on cleanup
/// - [`HooksAPI`], unless another plugin already added one
/// - [`ExecutorConfig`] as a global resource
///
/// ```
/// # use choreo_graph::prelude::*;
/// # use choreo_system::world::World;
/// let mut world = World::new();
/// world.add_plugins(GraphPlugin::default());
/// world.finish();
///
/// let events = world.api::<EventRegistry>().unwrap();
/// assert_eq!(events.find_event("FINISHED"), Some(EventId::FINISHED));
/// let executor = GraphPlugin::executor(&world);
/// assert_eq!(executor.config().max_pending_events, 64);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GraphPlugin {
    config: ExecutorConfig,
    trace_dropped_events: bool,
}

impl GraphPlugin {
    /// Uses the given executor settings.
    #[must_use]
    pub fn with_config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    /// Logs every dropped event at `debug` through a hook.
    #[must_use]
    pub fn with_dropped_event_trace(mut self, enabled: bool) -> Self {
        self.trace_dropped_events = enabled;
        self
    }

    /// Builds an executor from the world's [`ExecutorConfig`].
    #[must_use]
    pub fn executor(world: &World) -> GraphExecutor {
        world
            .get_global::<ExecutorConfig>()
            .map_or_else(GraphExecutor::new, |config| {
                GraphExecutor::with_config(*config)
            })
    }
}

impl Plugin for GraphPlugin {
    fn build(&self, world: &mut World) {
        world.insert_global(self.config);
        world.insert_api(EventRegistry::new());
        world.insert_api(ActionLibrary::new());
        if !world.contains_api::<HooksAPI>() {
            world.insert_api(HooksAPI::new());
        }

        if self.trace_dropped_events
            && let Some(hooks) = world.api::<HooksAPI>()
        {
            let result = hooks.register_observer::<OnEventDropped, _>(
                "graph_dropped_event_trace",
                |event: &GraphEvent| tracing::debug!(%event, "dropped"),
            );
            if let Err(error) = result {
                tracing::warn!(%error, "dropped event trace not installed");
            }
        }
    }

    fn cleanup(&self, world: &mut World) {
        if let Some(events) = world.api::<EventRegistry>() {
            events.clear();
        }
        if let Some(library) = world.api::<ActionLibrary>() {
            library.clear();
        }
    }
}
