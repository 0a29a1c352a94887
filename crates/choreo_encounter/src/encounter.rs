//! The encounter controller.
//!
//! One [`Encounter`] drives a boss fight. Each tick:
//!
//! 1. The boss graph ticks. Its host calls are buffered.
//! 2. Buffered calls naming a registered routine start that routine.
//! 3. Sequences tick. Completion events are raised on the boss and
//!    signalled to the other sequences.
//! 4. Pooled entities tick; those raising `RECYCLE` go back to the pool.
//! 5. The pool does its maintenance.
//! 6. Remaining host calls go to the host, boss calls first.

use std::sync::Arc;
use std::time::Duration;

use choreo_graph::executor::TickOutcome;
use choreo_graph::hooks::HooksAPI;
use choreo_graph::host::{HostCall, HostInvoker, PlacementProvider, RecordingHost};
use choreo_graph::{GraphExecutor, GraphInstance, TickContext};
use choreo_pool::{EntityHandle, EntityPool};
use choreo_sequence::{Completion, OwnerId, Sequence, SequenceId, SequenceScheduler};

use crate::arena::Arena;
use crate::pattern::AttackPattern;
use crate::routine::{Routine, RoutineCall, Routines};

/// Owner of the sequences the boss starts, unless configured otherwise.
pub const BOSS_OWNER: OwnerId = OwnerId::new(u64::MAX);

/// Collaborators for one [`Encounter::tick`]. All optional.
#[derive(Default)]
pub struct EncounterContext<'a> {
    /// Receives host calls that are not routines.
    pub host: Option<&'a mut dyn HostInvoker>,
    /// Resolves placement arguments.
    pub placement: Option<&'a dyn PlacementProvider>,
    /// Observes graph lifecycle events.
    pub hooks: Option<&'a HooksAPI>,
}

impl<'a> EncounterContext<'a> {
    /// A context with no collaborators.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends host calls to `host`.
    #[must_use]
    pub fn with_host(mut self, host: &'a mut dyn HostInvoker) -> Self {
        self.host = Some(host);
        self
    }

    /// Resolves placements through `placement`.
    #[must_use]
    pub fn with_placement(mut self, placement: &'a dyn PlacementProvider) -> Self {
        self.placement = Some(placement);
        self
    }

    /// Reports graph events to `hooks`.
    #[must_use]
    pub fn with_hooks(mut self, hooks: &'a HooksAPI) -> Self {
        self.hooks = Some(hooks);
        self
    }

    fn tick_context<'b>(&'b self, dt: Duration, buffer: &'b mut RecordingHost) -> TickContext<'b> {
        let mut ctx = TickContext::new(dt).with_host(buffer);
        if let Some(placement) = self.placement {
            ctx = ctx.with_placement(placement);
        }
        if let Some(hooks) = self.hooks {
            ctx = ctx.with_hooks(hooks);
        }
        ctx
    }
}

/// What happened during one encounter tick.
#[derive(Debug, Clone, Default)]
pub struct EncounterTick {
    /// Outcome of the boss graph tick.
    pub boss: TickOutcome,
    /// Routines started this tick.
    pub started: Vec<SequenceId>,
    /// Sequences that ran to their end.
    pub completed: Vec<Completion>,
    /// Entities returned to the pool after raising `RECYCLE`.
    pub recycled: Vec<EntityHandle>,
    /// Entities created by pool maintenance.
    pub instantiated: usize,
    /// Host calls delivered to the host.
    pub delivered: usize,
}

/// A running boss fight.
#[derive(Debug)]
pub struct Encounter {
    boss: GraphInstance,
    executor: GraphExecutor,
    scheduler: SequenceScheduler<Arena>,
    arena: Arena,
    routines: Routines,
    owner: OwnerId,
    boss_calls: RecordingHost,
    ended: bool,
}

impl Encounter {
    /// Creates an encounter for `boss`, spawning from `pool`.
    ///
    /// The pool is wired to the scheduler's canceller, so releasing an
    /// entity stops the sequences it owns.
    #[must_use]
    pub fn new(boss: GraphInstance, pool: EntityPool) -> Self {
        let scheduler = SequenceScheduler::new();
        let pool = pool.with_canceller(scheduler.canceller());
        Self {
            boss,
            executor: GraphExecutor::new(),
            scheduler,
            arena: Arena::new(pool),
            routines: Routines::new(),
            owner: BOSS_OWNER,
            boss_calls: RecordingHost::new(),
            ended: false,
        }
    }

    /// Uses `executor` for the boss and pooled entities.
    #[must_use]
    pub fn with_executor(mut self, executor: GraphExecutor) -> Self {
        self.executor = executor;
        self
    }

    /// Starts boss routines under `owner`.
    #[must_use]
    pub fn with_owner(mut self, owner: OwnerId) -> Self {
        self.owner = owner;
        self
    }

    /// Registers `routine`, returning the one it replaced.
    pub fn register_routine(&mut self, routine: Routine) -> Option<Routine> {
        self.routines.register(routine)
    }

    /// Registers every routine `pattern` ships.
    pub fn register_pattern(&mut self, pattern: &dyn AttackPattern) {
        for routine in pattern.routines() {
            self.routines.register(routine);
        }
    }

    /// Starts a sequence outside any routine, e.g. one owned by a pooled
    /// entity so that releasing the entity stops it.
    pub fn start(&mut self, sequence: Sequence<Arena>) -> SequenceId {
        self.scheduler.start(sequence)
    }

    /// The boss graph instance.
    #[must_use]
    pub fn boss(&self) -> &GraphInstance {
        &self.boss
    }

    /// The boss graph instance, mutably. Raise damage or phase events here.
    pub fn boss_mut(&mut self) -> &mut GraphInstance {
        &mut self.boss
    }

    /// The routine world.
    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// The routine world, mutably.
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    /// The entity pool.
    #[must_use]
    pub fn pool(&self) -> &EntityPool {
        &self.arena.pool
    }

    /// The sequence scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &SequenceScheduler<Arena> {
        &self.scheduler
    }

    /// The routine registry.
    #[must_use]
    pub fn routines(&self) -> &Routines {
        &self.routines
    }

    /// Owner of the boss's routines.
    #[must_use]
    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Returns true once [`end`](Self::end) ran.
    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Advances the encounter by `dt`.
    pub fn tick(&mut self, dt: Duration, mut ctx: EncounterContext<'_>) -> EncounterTick {
        let mut report = EncounterTick::default();
        if self.ended {
            return report;
        }

        {
            let mut boss_ctx = ctx.tick_context(dt, &mut self.boss_calls);
            report.boss = self.executor.tick(&mut self.boss, &mut boss_ctx);
        }

        let mut outgoing = Vec::new();
        for call in self.boss_calls.drain() {
            match self.start_routine(&call) {
                Some(id) => report.started.push(id),
                None => outgoing.push(call),
            }
        }

        report.completed = self.scheduler.tick(dt, &mut self.arena);
        for completion in &report.completed {
            if let Some(event) = completion.event {
                self.boss.raise(event);
                self.scheduler.signal(event);
            }
        }

        {
            let mut entity_ctx = ctx.tick_context(dt, &mut self.arena.calls);
            report.recycled = self
                .arena
                .pool
                .tick_entities(&self.executor, &mut entity_ctx);
        }
        report.instantiated = self.arena.pool.maintain();

        outgoing.extend(self.arena.calls.drain());
        report.delivered = Self::flush(outgoing, ctx.host.as_deref_mut());
        report
    }

    /// Ends the fight: destroys the boss graph and cancels its routines.
    ///
    /// Pooled entities already in flight keep running until recycled.
    pub fn end(&mut self, hooks: Option<&HooksAPI>) {
        if self.ended {
            return;
        }
        self.ended = true;
        self.executor.destroy(&mut self.boss, hooks);
        let cancelled = self.scheduler.cancel_owner(self.owner);
        tracing::info!(
            graph = %self.boss.graph().name(),
            owner = %self.owner,
            cancelled,
            "encounter ended"
        );
    }

    fn start_routine(&mut self, call: &HostCall) -> Option<SequenceId> {
        let routine = self.routines.get(&call.name)?;
        let request = RoutineCall {
            name: Arc::clone(&call.name),
            owner: self.owner,
            args: call.args.clone(),
        };
        let mut sequence = routine.build(&request);
        if sequence.completion().is_none()
            && let Some(event) = request.completion()
        {
            sequence = sequence.on_complete(event);
        }
        let id = self.scheduler.start(sequence);
        tracing::debug!(routine = %call.name, sequence = %id, "routine started");
        Some(id)
    }

    fn flush<'h>(calls: Vec<HostCall>, host: Option<&mut (dyn HostInvoker + 'h)>) -> usize {
        let Some(host) = host else {
            if !calls.is_empty() {
                tracing::trace!(count = calls.len(), "no host attached, calls dropped");
            }
            return 0;
        };
        for call in &calls {
            host.invoke_host(&call.name, &call.args);
        }
        calls.len()
    }
}
