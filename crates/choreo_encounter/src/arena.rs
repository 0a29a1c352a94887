//! The world routines run against.

use std::sync::Arc;

use choreo_graph::host::{HostCall, HostValue, RecordingHost};
use choreo_pool::{EntityHandle, EntityPool, Transform};

/// What a routine step can touch: the entity pool and the outgoing host
/// call buffer.
///
/// Calls emitted here, and calls made by pooled entity graphs, are flushed
/// to the encounter's host at the end of the tick.
#[derive(Debug)]
pub struct Arena {
    pub(crate) pool: EntityPool,
    pub(crate) calls: RecordingHost,
    spawned: Vec<EntityHandle>,
}

impl Arena {
    /// Wraps `pool`.
    #[must_use]
    pub fn new(pool: EntityPool) -> Self {
        Self {
            pool,
            calls: RecordingHost::new(),
            spawned: Vec::new(),
        }
    }

    /// The entity pool.
    #[must_use]
    pub fn pool(&self) -> &EntityPool {
        &self.pool
    }

    /// The entity pool, mutably.
    pub fn pool_mut(&mut self) -> &mut EntityPool {
        &mut self.pool
    }

    /// Acquires an entity of `template` and moves it to `transform`.
    ///
    /// Returns `None`, after logging, when the pool cannot supply one.
    pub fn spawn(&mut self, template: &str, transform: Transform) -> Option<EntityHandle> {
        let handle = match self.pool.acquire(template) {
            Ok(handle) => handle,
            Err(error) => {
                tracing::warn!(template, %error, "spawn skipped");
                return None;
            }
        };
        if let Ok(entity) = self.pool.get_mut(handle) {
            entity.set_transform(transform);
        }
        self.spawned.push(handle);
        Some(handle)
    }

    /// Queues a host call.
    pub fn emit(&mut self, name: impl Into<Arc<str>>, args: Vec<HostValue>) {
        self.calls.calls.push(HostCall {
            name: name.into(),
            args,
        });
    }

    /// Host calls waiting to be flushed.
    #[must_use]
    pub fn pending_calls(&self) -> &[HostCall] {
        &self.calls.calls
    }

    /// Entities spawned through [`spawn`](Self::spawn) since the last
    /// [`take_spawned`](Self::take_spawned).
    #[must_use]
    pub fn spawned(&self) -> &[EntityHandle] {
        &self.spawned
    }

    /// Takes the list of spawned entities.
    pub fn take_spawned(&mut self) -> Vec<EntityHandle> {
        core::mem::take(&mut self.spawned)
    }
}
