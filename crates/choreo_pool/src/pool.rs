//! The entity pool.
//!
//! Entities live in a pool-owned arena and are addressed by
//! [`EntityHandle`]s. Acquiring hands out an available entity of a template,
//! reset to its initial state; releasing makes it available again and
//! invalidates every handle issued for it. The pool never destroys entities.
//!
//! Growth is incremental: [`prewarm`](EntityPool::prewarm) and the floor
//! check queue instantiation requests, and [`maintain`](EntityPool::maintain)
//! works through at most `instantiations_per_tick` of them per call.

use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;

use choreo_graph::executor::{GraphExecutor, GraphInstance, TickContext};
use choreo_graph::error::GraphError;
use choreo_sequence::Canceller;
use hashbrown::HashMap;

use crate::handle::{EntityHandle, Transform};
use crate::plugin::PoolConfig;
use crate::template::{Template, TemplateCache, TemplateLoader, TemplateStatus};

// ─────────────────────────────────────────────────────────────────────────────
// Errors and stats
// ─────────────────────────────────────────────────────────────────────────────

/// Errors from pool operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// The handle refers to an entity that has since been released.
    #[error("stale handle: {0}")]
    StaleHandle(EntityHandle),

    /// The template could not be loaded right now.
    #[error("template '{template}' unavailable: {reason}")]
    TemplateUnavailable {
        /// Template name.
        template: String,
        /// Why it is unavailable.
        reason: String,
    },
}

/// Running totals kept by a pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Entities created, prewarmed or on demand.
    pub instantiated: u64,
    /// Successful acquisitions.
    pub acquired: u64,
    /// Releases that made an entity available.
    pub released: u64,
    /// Acquisitions that found no available entity and created one.
    pub exhausted_fallbacks: u64,
    /// Template loads that failed.
    pub failed_loads: u64,
    /// Releases and mutable lookups rejected for a stale handle.
    pub stale_handles: u64,
}

// ─────────────────────────────────────────────────────────────────────────────
// PooledEntity
// ─────────────────────────────────────────────────────────────────────────────

/// One pooled entity: a graph instance and a transform.
#[derive(Debug)]
pub struct PooledEntity {
    template: Arc<str>,
    instance: GraphInstance,
    transform: Transform,
    home: Transform,
    available: bool,
}

impl PooledEntity {
    /// Name of the template the entity was made from.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The entity's graph instance.
    #[must_use]
    pub fn instance(&self) -> &GraphInstance {
        &self.instance
    }

    /// The entity's graph instance, mutably.
    pub fn instance_mut(&mut self) -> &mut GraphInstance {
        &mut self.instance
    }

    /// Current transform.
    #[must_use]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Moves the entity.
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    /// Returns true if the entity is waiting in the pool.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.available
    }

    fn reset(&mut self) {
        self.instance.reset();
        self.transform = self.home;
    }
}

struct Slot {
    generation: u32,
    entity: PooledEntity,
}

// ─────────────────────────────────────────────────────────────────────────────
// EntityPool
// ─────────────────────────────────────────────────────────────────────────────

/// Pool of reusable entities, grouped by template.
pub struct EntityPool {
    cache: TemplateCache,
    config: PoolConfig,
    slots: Vec<Slot>,
    available: HashMap<Arc<str>, BTreeSet<u32>>,
    queue: VecDeque<Arc<str>>,
    floors: HashMap<Arc<str>, usize>,
    canceller: Option<Canceller>,
    ticks: u64,
    stats: PoolStats,
}

impl core::fmt::Debug for EntityPool {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EntityPool")
            .field("entities", &self.slots.len())
            .field("queued", &self.queue.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl EntityPool {
    /// Creates an empty pool loading templates through `loader`.
    #[must_use]
    pub fn new(loader: Arc<dyn TemplateLoader>, config: PoolConfig) -> Self {
        Self {
            cache: TemplateCache::new(loader, config.retry_failed_templates),
            config,
            slots: Vec::new(),
            available: HashMap::new(),
            queue: VecDeque::new(),
            floors: HashMap::new(),
            canceller: None,
            ticks: 0,
            stats: PoolStats::default(),
        }
    }

    /// Cancels the sequences of released entities through `canceller`.
    #[must_use]
    pub fn with_canceller(mut self, canceller: Canceller) -> Self {
        self.canceller = Some(canceller);
        self
    }

    /// The pool's settings.
    #[must_use]
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Running totals.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    /// Queues `count` available entities of `template`.
    ///
    /// Nothing is created here; [`maintain`](Self::maintain) instantiates
    /// the queue a few entities at a time.
    pub fn prewarm(&mut self, template: &str, count: usize) {
        let name = self.track(template);
        self.queue.extend(core::iter::repeat_n(name, count));
        tracing::debug!(template, count, "prewarm queued");
    }

    /// Sets the number of entities of `template` the pool keeps alive.
    pub fn set_floor(&mut self, template: &str, floor: usize) {
        let name = self.track(template);
        self.floors.insert(name, floor);
    }

    /// Takes an available entity of `template`, reset to its initial state.
    ///
    /// When none is available one is created on the spot, which is counted
    /// in [`PoolStats::exhausted_fallbacks`].
    ///
    /// # Errors
    ///
    /// [`PoolError::TemplateUnavailable`] if a new entity is needed and the
    /// template is not loaded yet or failed to load.
    pub fn acquire(&mut self, template: &str) -> Result<EntityHandle, PoolError> {
        let name = self.track(template);
        let reused = self.available.get_mut(&name).and_then(BTreeSet::pop_first);
        let index = match reused {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.entity.reset();
                slot.entity.available = false;
                index
            }
            None => {
                let template = self.load(&name).map_err(|reason| {
                    PoolError::TemplateUnavailable {
                        template: name.to_string(),
                        reason,
                    }
                })?;
                let index = self.instantiate(&name, &template, false).map_err(|error| {
                    PoolError::TemplateUnavailable {
                        template: name.to_string(),
                        reason: error.to_string(),
                    }
                })?;
                self.stats.exhausted_fallbacks += 1;
                tracing::warn!(
                    template = %name,
                    live = self.live_count(&name),
                    "pool exhausted, instantiated on demand"
                );
                index
            }
        };

        self.stats.acquired += 1;
        let handle = EntityHandle {
            index,
            generation: self.slots[index as usize].generation,
        };
        tracing::trace!(template = %name, %handle, "entity acquired");
        Ok(handle)
    }

    /// Returns an entity to the pool.
    ///
    /// The handle stops resolving and the owner's sequences are cancelled.
    /// Releasing the same handle again is a no-op while the entity is still
    /// in the pool.
    ///
    /// # Errors
    ///
    /// [`PoolError::StaleHandle`] for any other outdated handle.
    pub fn release(&mut self, handle: EntityHandle) -> Result<(), PoolError> {
        let Some(slot) = self.slots.get_mut(handle.index as usize) else {
            return Err(self.stale(handle));
        };
        if slot.generation == handle.generation && !slot.entity.available {
            slot.entity.available = true;
            slot.generation = slot.generation.wrapping_add(1);
            let name = Arc::clone(&slot.entity.template);
            self.available
                .entry(Arc::clone(&name))
                .or_default()
                .insert(handle.index);
            if let Some(canceller) = &self.canceller {
                canceller.cancel_owner(handle.owner());
            }
            self.stats.released += 1;
            tracing::trace!(template = %name, %handle, "entity released");
            return Ok(());
        }
        if slot.entity.available && slot.generation == handle.generation.wrapping_add(1) {
            tracing::trace!(%handle, "entity already released");
            return Ok(());
        }
        Err(self.stale(handle))
    }

    /// The entity behind `handle`.
    ///
    /// # Errors
    ///
    /// [`PoolError::StaleHandle`] if the handle has been released.
    pub fn get(&self, handle: EntityHandle) -> Result<&PooledEntity, PoolError> {
        match self.slots.get(handle.index as usize) {
            Some(slot) if slot.generation == handle.generation && !slot.entity.available => {
                Ok(&slot.entity)
            }
            _ => {
                tracing::error!(%handle, "stale entity handle");
                Err(PoolError::StaleHandle(handle))
            }
        }
    }

    /// The entity behind `handle`, mutably.
    ///
    /// # Errors
    ///
    /// [`PoolError::StaleHandle`] if the handle has been released.
    pub fn get_mut(&mut self, handle: EntityHandle) -> Result<&mut PooledEntity, PoolError> {
        let live = self
            .slots
            .get(handle.index as usize)
            .is_some_and(|slot| slot.generation == handle.generation && !slot.entity.available);
        if !live {
            return Err(self.stale(handle));
        }
        Ok(&mut self.slots[handle.index as usize].entity)
    }

    /// Returns true if `handle` still resolves.
    #[must_use]
    pub fn contains(&self, handle: EntityHandle) -> bool {
        self.slots
            .get(handle.index as usize)
            .is_some_and(|slot| slot.generation == handle.generation && !slot.entity.available)
    }

    /// Entities currently acquired, with their handles.
    pub fn in_use(&self) -> impl Iterator<Item = (EntityHandle, &PooledEntity)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| !slot.entity.available)
            .map(|(index, slot)| {
                (
                    EntityHandle {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    &slot.entity,
                )
            })
    }

    /// Runs one pool maintenance tick.
    ///
    /// Every `growth_interval_ticks` ticks, templates below their floor are
    /// topped up. Then at most `instantiations_per_tick` queued entities
    /// are created. Requests whose template is still loading wait; requests
    /// whose template failed are retried next tick when
    /// `retry_failed_templates` is set and dropped otherwise.
    ///
    /// Returns the number of entities created.
    pub fn maintain(&mut self) -> usize {
        self.ticks += 1;
        let interval = self.config.growth_interval_ticks.max(1);
        if self.ticks % interval == 0 {
            self.top_up();
        }

        let mut created = 0;
        let mut deferred = VecDeque::new();
        while created < self.config.instantiations_per_tick {
            let Some(name) = self.queue.pop_front() else {
                break;
            };
            let status = match self.cache.request(&name) {
                TemplateStatus::Ready(template) => Ok(Some(template.clone())),
                TemplateStatus::Loading => Ok(None),
                TemplateStatus::Failed(error) => Err(error),
            };
            match status {
                Ok(Some(template)) => match self.instantiate(&name, &template, true) {
                    Ok(_) => created += 1,
                    Err(error) => {
                        tracing::warn!(template = %name, %error, "template graph rejected");
                    }
                },
                Ok(None) => deferred.push_back(name),
                Err(error) => {
                    self.stats.failed_loads += 1;
                    let dropped = !self.config.retry_failed_templates;
                    tracing::warn!(template = %name, %error, dropped, "prewarm skipped");
                    let (same, rest): (VecDeque<_>, VecDeque<_>) =
                        self.queue.drain(..).partition(|queued| *queued == name);
                    self.queue = rest;
                    if !dropped {
                        // Every request for the template waits for the next retry.
                        deferred.push_back(name);
                        deferred.extend(same);
                    }
                }
            }
        }
        deferred.append(&mut self.queue);
        self.queue = deferred;
        created
    }

    /// Ticks the graph of every acquired entity, then releases those whose
    /// graph raised `RECYCLE`.
    ///
    /// Returns the released handles.
    pub fn tick_entities(
        &mut self,
        executor: &GraphExecutor,
        ctx: &mut TickContext<'_>,
    ) -> Vec<EntityHandle> {
        let mut recycled = Vec::new();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.entity.available {
                continue;
            }
            let outcome = executor.tick(&mut slot.entity.instance, ctx);
            if outcome.recycle_requested {
                recycled.push(EntityHandle {
                    index: index as u32,
                    generation: slot.generation,
                });
            }
        }
        for handle in &recycled {
            if let Err(error) = self.release(*handle) {
                tracing::error!(%handle, %error, "auto-release failed");
            }
        }
        recycled
    }

    /// Number of entities of `template`, acquired or not.
    #[must_use]
    pub fn live_count(&self, template: &str) -> usize {
        self.slots
            .iter()
            .filter(|slot| &*slot.entity.template == template)
            .count()
    }

    /// Number of available entities of `template`.
    #[must_use]
    pub fn available_count(&self, template: &str) -> usize {
        self.available.get(template).map_or(0, BTreeSet::len)
    }

    /// Number of queued instantiations of `template`.
    #[must_use]
    pub fn queued_count(&self, template: &str) -> usize {
        self.queue.iter().filter(|q| &***q == template).count()
    }

    /// Total number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if the pool holds no entity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Interns a template name, giving it the default floor on first sight.
    fn track(&mut self, template: &str) -> Arc<str> {
        if let Some((name, _)) = self.floors.get_key_value(template) {
            return Arc::clone(name);
        }
        let name: Arc<str> = Arc::from(template);
        self.floors
            .insert(Arc::clone(&name), self.config.default_floor);
        name
    }

    fn top_up(&mut self) {
        let floors: Vec<(Arc<str>, usize)> = self
            .floors
            .iter()
            .map(|(name, floor)| (Arc::clone(name), *floor))
            .collect();
        for (name, floor) in floors {
            let have = self.live_count(&name) + self.queued_count(&name);
            if have < floor {
                tracing::debug!(template = %name, have, floor, "pool below floor");
                self.queue
                    .extend(core::iter::repeat_n(Arc::clone(&name), floor - have));
            }
        }
    }

    /// Requests `name` from the cache, returning the template or why it is
    /// not there yet.
    fn load(&mut self, name: &str) -> Result<Template, String> {
        match self.cache.request(name) {
            TemplateStatus::Ready(template) => Ok(template.clone()),
            TemplateStatus::Loading => Err("still loading".to_owned()),
            TemplateStatus::Failed(error) => {
                self.stats.failed_loads += 1;
                Err(error.to_string())
            }
        }
    }

    fn instantiate(
        &mut self,
        name: &Arc<str>,
        template: &Template,
        available: bool,
    ) -> Result<u32, GraphError> {
        let instance = GraphInstance::new(Arc::clone(&template.graph))?;
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            entity: PooledEntity {
                template: Arc::clone(name),
                instance,
                transform: template.transform,
                home: template.transform,
                available,
            },
        });
        if available {
            self.available
                .entry(Arc::clone(name))
                .or_default()
                .insert(index);
        }
        self.stats.instantiated += 1;
        Ok(index)
    }

    fn stale(&mut self, handle: EntityHandle) -> PoolError {
        self.stats.stale_handles += 1;
        tracing::error!(%handle, "stale entity handle");
        PoolError::StaleHandle(handle)
    }
}
