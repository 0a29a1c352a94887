//! World runtime for plugin orchestration.
//!
//! The [`World`] owns everything that lives as long as one encounter
//! session: plugins, world-lifetime configuration, mutable resources and
//! capability APIs. It is single-threaded and synchronous per tick.
//!
//! # Lifecycle
//!
//! 1. **Dependency Resolution** - plugins are topologically sorted
//! 2. **Build Phase** - `plugin.build()` in dependency order
//! 3. **Ready Phase** - `plugin.ready()` in dependency order
//! 4. **Ticks** - `world.tick::<S>()` calls `plugin.update()` for subscribers of `S`
//! 5. **Cleanup Phase** - `plugin.cleanup()` in reverse order
//!
//! Registries that must not outlive the world (the event namespace, the
//! action library) are created in `build()` and cleared in `cleanup()`.
//!
//! ```ignore
//! let mut world = World::new();
//! world
//!     .add_plugins(DefaultPlugins.build())
//!     .add_plugins(GraphPlugin::default())
//!     .add_plugins(PoolPlugin::default());
//! world.finish();
//!
//! loop {
//!     world.tick::<OnFrameStart>();
//!     // drive encounters
//! }
//!
//! world.cleanup();
//! ```

use crate::api::API;
use crate::plugin::{Plugin, PluginId, Plugins, ScheduleId};
use crate::resource::{GlobalResource, Resource, ResourceRef, ResourceRefMut, Resources};
use core::any::TypeId;
use hashbrown::{HashMap, HashSet};

// ─────────────────────────────────────────────────────────────────────────────
// World
// ─────────────────────────────────────────────────────────────────────────────

type BoxedAPI = Box<dyn core::any::Any + Send + Sync>;

/// Build progress of a world: `NotStarted` → `Building` → `Built`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum BuildState {
    #[default]
    NotStarted,
    Building,
    Built,
}

/// The runtime that orchestrates plugins and owns world-lifetime state.
pub struct World {
    /// Read-only configuration published by plugins.
    global: Resources,

    /// Mutable world state.
    resources: Resources,

    /// Capability registries, keyed by type.
    apis: HashMap<TypeId, BoxedAPI>,

    /// Plugins added but not yet built.
    pending_plugins: Vec<PluginEntry>,

    /// Built plugins in dependency order.
    built_plugins: Vec<PluginEntry>,

    plugin_ids: HashSet<PluginId>,

    /// Schedule → indices into `built_plugins`, in dependency order.
    schedule_registry: HashMap<ScheduleId, Vec<usize>>,

    build_state: BuildState,

    /// Set while `tick_schedule` has `built_plugins` moved out.
    ticking: bool,
}

struct PluginEntry {
    id: PluginId,
    plugin: Box<dyn Plugin>,
    name: String,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Creates an empty world with no plugins and no resources.
    #[must_use]
    pub fn new() -> Self {
        Self {
            global: Resources::new(),
            resources: Resources::new(),
            apis: HashMap::new(),
            pending_plugins: Vec::new(),
            built_plugins: Vec::new(),
            plugin_ids: HashSet::new(),
            schedule_registry: HashMap::new(),
            build_state: BuildState::NotStarted,
            ticking: false,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Plugin Management
    // ─────────────────────────────────────────────────────────────────────────

    /// Adds a plugin or a [`PluginGroupBuilder`](crate::plugin::PluginGroupBuilder).
    ///
    /// # Panics
    ///
    /// Panics if a unique plugin is added twice.
    pub fn add_plugins<P: Plugins>(&mut self, plugins: P) -> &mut Self {
        plugins.add_to_world(self);
        self
    }

    pub(crate) fn add_plugin_boxed(&mut self, id: PluginId, plugin: Box<dyn Plugin>) {
        let name = plugin.name().to_string();

        if plugin.is_unique() && self.plugin_ids.contains(&id) {
            panic!(
                "Plugin '{}' is unique and was already added.\n\
                 If you intended to add this plugin multiple times, \
                 set `is_unique()` to return `false`.",
                name
            );
        }
        self.plugin_ids.insert(id);

        let entry = PluginEntry { id, plugin, name };

        // Plugins added from inside build() are built right away.
        if self.build_state == BuildState::Building {
            entry.plugin.build(self);
            self.built_plugins.push(entry);
        } else {
            self.pending_plugins.push(entry);
        }
    }

    /// Returns true if a plugin of type `P` has been added.
    #[must_use]
    pub fn has_plugin<P: Plugin>(&self) -> bool {
        self.plugin_ids.contains(&PluginId::of::<P>())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Resource Access
    // ─────────────────────────────────────────────────────────────────────────

    /// Inserts a mutable world resource, returning the replaced value.
    pub fn insert_resource<R: Resource>(&mut self, resource: R) -> Option<R> {
        self.resources.insert(resource)
    }

    /// Returns true if a resource of type `R` exists.
    #[must_use]
    pub fn contains_resource<R: Resource>(&self) -> bool {
        self.resources.contains::<R>()
    }

    /// Gets a read guard for a resource.
    ///
    /// Returns `None` if it doesn't exist or is write-borrowed.
    #[must_use]
    pub fn get_resource<R: Resource>(&self) -> Option<ResourceRef<'_, R>> {
        self.resources.get::<R>().ok()
    }

    /// Gets a write guard for a resource.
    ///
    /// Returns `None` if it doesn't exist or is already borrowed.
    #[must_use]
    pub fn get_resource_mut<R: Resource>(&self) -> Option<ResourceRefMut<'_, R>> {
        self.resources.get_mut::<R>().ok()
    }

    /// Removes a resource and returns it.
    pub fn remove_resource<R: Resource>(&mut self) -> Option<R> {
        self.resources.remove::<R>()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Global Resources
    // ─────────────────────────────────────────────────────────────────────────

    /// Inserts a global (read-only, world-lifetime) resource.
    pub fn insert_global<R: GlobalResource>(&mut self, resource: R) -> Option<R> {
        self.global.insert(resource)
    }

    /// Returns true if a global resource of type `R` exists.
    #[must_use]
    pub fn contains_global<R: GlobalResource>(&self) -> bool {
        self.global.contains::<R>()
    }

    /// Gets a read guard for a global resource.
    #[must_use]
    pub fn get_global<R: GlobalResource>(&self) -> Option<ResourceRef<'_, R>> {
        self.global.get::<R>().ok()
    }

    /// Returns whether [`finish()`](Self::finish) has completed.
    #[must_use]
    pub fn is_built(&self) -> bool {
        self.build_state == BuildState::Built
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API Access
    // ─────────────────────────────────────────────────────────────────────────

    /// Inserts an API, returning the replaced one of the same type.
    pub fn insert_api<A: API>(&mut self, api: A) -> Option<A> {
        let boxed: BoxedAPI = Box::new(api);
        self.apis
            .insert(TypeId::of::<A>(), boxed)
            .and_then(|old| old.downcast::<A>().ok())
            .map(|b| *b)
    }

    /// Gets a reference to an API.
    #[must_use]
    pub fn api<A: API>(&self) -> Option<&A> {
        self.apis
            .get(&TypeId::of::<A>())
            .and_then(|boxed| boxed.downcast_ref::<A>())
    }

    /// Returns true if an API of type `A` exists.
    #[must_use]
    pub fn contains_api<A: API>(&self) -> bool {
        self.apis.contains_key(&TypeId::of::<A>())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Ticks
    // ─────────────────────────────────────────────────────────────────────────

    /// Ticks schedule `S`: every plugin subscribed to it gets `update()`,
    /// in dependency order.
    pub fn tick<S: 'static>(&mut self) {
        self.tick_schedule(ScheduleId::of::<S>());
    }

    /// Non-generic form of [`tick()`](Self::tick).
    ///
    /// # Panics
    ///
    /// Panics if called re-entrantly from a plugin's `update()`.
    pub fn tick_schedule(&mut self, schedule: ScheduleId) {
        let Some(indices) = self.schedule_registry.get(&schedule).cloned() else {
            return;
        };
        assert!(
            !self.ticking,
            "World::tick called from inside a plugin update ({})",
            schedule.type_name()
        );

        // Plugins get `&mut World`, so the plugin list is moved out for the
        // duration of the tick. Plugins added meanwhile land in pending.
        self.ticking = true;
        let plugins = core::mem::take(&mut self.built_plugins);
        for idx in indices {
            plugins[idx].plugin.update(self, schedule);
        }
        self.built_plugins = plugins;
        self.ticking = false;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Sorts, builds and readies all plugins.
    ///
    /// # Panics
    ///
    /// - If a plugin's dependency was never added
    /// - If plugins depend on each other in a cycle
    /// - If called more than once
    pub fn finish(&mut self) {
        if self.build_state != BuildState::NotStarted {
            panic!("World::finish() was already called. Cannot build twice.");
        }

        let sorted = self.sort_plugins_by_dependencies();

        self.build_state = BuildState::Building;
        for entry in sorted {
            entry.plugin.build(self);
            self.built_plugins.push(entry);
        }

        let plugins = core::mem::take(&mut self.built_plugins);
        for entry in &plugins {
            entry.plugin.ready(self);
        }
        self.built_plugins = plugins;

        self.build_schedule_registry();
        self.build_state = BuildState::Built;
    }

    fn build_schedule_registry(&mut self) {
        self.schedule_registry.clear();
        for (idx, entry) in self.built_plugins.iter().enumerate() {
            for schedule in entry.plugin.tick_schedules() {
                self.schedule_registry
                    .entry(schedule)
                    .or_default()
                    .push(idx);
            }
        }
    }

    /// Cleans up all plugins in reverse dependency order.
    pub fn cleanup(&mut self) {
        let plugins = core::mem::take(&mut self.built_plugins);
        for entry in plugins.iter().rev() {
            entry.plugin.cleanup(self);
        }
        self.built_plugins = plugins;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal: Dependency Resolution
    // ─────────────────────────────────────────────────────────────────────────

    /// Kahn's algorithm over `pending_plugins`. Ties keep insertion order.
    fn sort_plugins_by_dependencies(&mut self) -> Vec<PluginEntry> {
        let pending = core::mem::take(&mut self.pending_plugins);
        let n = pending.len();
        if n == 0 {
            return Vec::new();
        }

        let mut index_of: HashMap<PluginId, Vec<usize>> = HashMap::new();
        for (i, entry) in pending.iter().enumerate() {
            index_of.entry(entry.id).or_default().push(i);
        }

        let mut in_degree = vec![0usize; n];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];

        for (i, entry) in pending.iter().enumerate() {
            for dep in entry.plugin.dependencies() {
                if let Some(dep_indices) = index_of.get(&dep) {
                    for &dep_idx in dep_indices {
                        dependents[dep_idx].push(i);
                        in_degree[i] += 1;
                    }
                } else if !self.built_plugins.iter().any(|p| p.id == dep) {
                    panic!(
                        "Plugin '{}' requires '{}' which was not added.\n\
                         Add {} before {}, or use a plugin group that includes it.",
                        entry.name,
                        dep.type_name(),
                        dep.type_name(),
                        entry.name
                    );
                }
            }
        }

        let mut ready: Vec<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
        let mut order: Vec<usize> = Vec::with_capacity(n);

        while !ready.is_empty() {
            // Lowest index first keeps the caller's insertion order stable.
            ready.sort_unstable_by(|a, b| b.cmp(a));
            let Some(idx) = ready.pop() else { break };
            order.push(idx);
            for &dependent in &dependents[idx] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.push(dependent);
                }
            }
        }

        if order.len() != n {
            let in_cycle: Vec<&str> = (0..n)
                .filter(|&i| in_degree[i] > 0)
                .map(|i| pending[i].name.as_str())
                .collect();
            panic!(
                "Circular dependency detected among plugins: {:?}\n\
                 Break the cycle by extracting shared functionality into a separate plugin.",
                in_cycle
            );
        }

        let mut slots: Vec<Option<PluginEntry>> = pending.into_iter().map(Some).collect();
        order
            .into_iter()
            .filter_map(|idx| slots[idx].take())
            .collect()
    }
}
