//! Running graphs: instances, ticks and transitions.
//!
//! A [`GraphInstance`] is one running copy of a graph: its active state, the
//! runtime slot of every action in that state, its variables, the events
//! raised from outside, and the counters of its weighted dispatches. The
//! [`GraphExecutor`] advances instances one tick at a time:
//!
//! 1. Every action of the active state runs in list order. Timed actions
//!    start on entry and fire once their duration has elapsed.
//! 2. Events raised by the actions are matched first, in action order, then
//!    events raised from outside, in arrival order.
//! 3. Each event is matched against the state's transitions, then the
//!    graph's global ones. Unmatched events are dropped.
//! 4. The first match switches the active state. The new state's actions
//!    wait for the next tick. Remaining action events are dropped; remaining
//!    outside events carry over.
//!
//! ```
//! # use choreo_graph::prelude::*;
//! # use core::time::Duration;
//! # use std::sync::Arc;
//! let mut graph = Graph::new("door");
//! let closed = graph.create_state("Closed", "").unwrap();
//! let open = graph.create_state("Open", "").unwrap();
//! graph
//!     .state_mut(closed)
//!     .unwrap()
//!     .add_action(Action::wait(Duration::from_secs(1), EventId::FINISHED));
//! graph.set_transition(closed, EventId::FINISHED, open).unwrap();
//!
//! let executor = GraphExecutor::new();
//! let mut instance = GraphInstance::with_seed(Arc::new(graph), 1).unwrap();
//! let mut ctx = TickContext::new(Duration::from_millis(600));
//! executor.tick(&mut instance, &mut ctx);
//! executor.tick(&mut instance, &mut ctx);
//! assert_eq!(instance.active_state_name(), "Closed");
//! executor.tick(&mut instance, &mut ctx);
//! assert_eq!(instance.active_state_name(), "Open");
//! ```

use core::fmt;
use core::time::Duration;
use std::collections::VecDeque;
use std::sync::Arc;

use choreo_system::plugin::ScheduleId;
use choreo_system::resource::GlobalResource;
use hashbrown::HashMap;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::action::{Action, HostArg};
use crate::dispatch::{CandidateCounters, DispatchOutcome, WeightedRandomDispatcher};
use crate::error::GraphError;
use crate::event::EventId;
use crate::graph::Graph;
use crate::hooks::HooksAPI;
use crate::hooks::events::GraphEvent;
use crate::hooks::schedule::{
    OnEventDropped, OnHostInvoke, OnInstanceDestroyed, OnStateEnter, OnStateExit, OnTransition,
};
use crate::host::{HostInvoker, HostValue, PlacementProvider};
use crate::state::{State, StateId};
use crate::variable::{Value, Variables};

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Executor settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Cap on queued outside events per instance. The oldest are dropped
    /// first.
    pub max_pending_events: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_pending_events: 64,
        }
    }
}

impl GlobalResource for ExecutorConfig {}

// ─────────────────────────────────────────────────────────────────────────────
// InstanceId
// ─────────────────────────────────────────────────────────────────────────────

/// Unique identity of a graph instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceId(Arc<str>);

impl InstanceId {
    /// Generates a fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(nanoid::nanoid!(10).into())
    }

    /// Returns the id as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// GraphInstance
// ─────────────────────────────────────────────────────────────────────────────

/// Runtime progress of one action in the active state.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ActionSlot {
    /// Not run yet in this visit of the state.
    Pending,
    /// A running timer.
    Timer { elapsed: Duration, target: Duration },
    /// Finished for this visit.
    Done,
}

/// One running copy of a graph.
pub struct GraphInstance {
    id: InstanceId,
    graph: Arc<Graph>,
    active: StateId,
    slots: Vec<ActionSlot>,
    variables: Variables,
    external: VecDeque<EventId>,
    counters: HashMap<(StateId, usize), Vec<CandidateCounters>>,
    seed: u64,
    rng: SmallRng,
    destroyed: bool,
    ticks_in_state: u64,
    time_in_state: Duration,
}

impl fmt::Debug for GraphInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphInstance")
            .field("id", &self.id)
            .field("graph", self.graph.name())
            .field("active", &self.active_state_name())
            .field("pending_events", &self.external.len())
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

impl GraphInstance {
    /// Starts an instance in the graph's entry state with a random seed.
    ///
    /// # Errors
    ///
    /// [`GraphError::NoEntryState`] if the graph has no valid entry.
    pub fn new(graph: Arc<Graph>) -> Result<Self, GraphError> {
        Self::with_seed(graph, rand::random())
    }

    /// Starts an instance with a fixed seed for its random choices.
    ///
    /// # Errors
    ///
    /// [`GraphError::NoEntryState`] if the graph has no valid entry.
    pub fn with_seed(graph: Arc<Graph>, seed: u64) -> Result<Self, GraphError> {
        let entry = Self::entry_of(&graph)?;
        let slots = Self::fresh_slots(&graph, entry);
        Ok(Self {
            id: InstanceId::new(),
            variables: Variables::from_decls(graph.variables()),
            graph,
            active: entry,
            slots,
            external: VecDeque::new(),
            counters: HashMap::new(),
            seed,
            rng: SmallRng::seed_from_u64(seed),
            destroyed: false,
            ticks_in_state: 0,
            time_in_state: Duration::ZERO,
        })
    }

    fn entry_of(graph: &Graph) -> Result<StateId, GraphError> {
        graph
            .entry()
            .filter(|entry| graph.state(*entry).is_some())
            .ok_or_else(|| GraphError::NoEntryState(Arc::clone(graph.name())))
    }

    fn fresh_slots(graph: &Graph, state: StateId) -> Vec<ActionSlot> {
        let count = graph.state(state).map_or(0, |s| s.actions().len());
        vec![ActionSlot::Pending; count]
    }

    /// The instance's identity.
    #[must_use]
    pub fn id(&self) -> &InstanceId {
        &self.id
    }

    /// The graph being run.
    #[must_use]
    pub fn graph(&self) -> &Arc<Graph> {
        &self.graph
    }

    /// The seed the random source restarts from on reset.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The active state.
    #[must_use]
    pub fn active_state(&self) -> StateId {
        self.active
    }

    /// Name of the active state.
    #[must_use]
    pub fn active_state_name(&self) -> &str {
        self.graph.state_name(self.active)
    }

    /// Ticks completed in the active state.
    #[must_use]
    pub fn ticks_in_state(&self) -> u64 {
        self.ticks_in_state
    }

    /// Time accumulated in the active state.
    #[must_use]
    pub fn time_in_state(&self) -> Duration {
        self.time_in_state
    }

    /// The instance's variables.
    #[must_use]
    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    /// The instance's variables, for host-side writes.
    pub fn variables_mut(&mut self) -> &mut Variables {
        &mut self.variables
    }

    /// Dispatch counters of the weighted dispatch at `action` in `state`.
    #[must_use]
    pub fn dispatch_counters(&self, state: StateId, action: usize) -> Option<&[CandidateCounters]> {
        self.counters.get(&(state, action)).map(Vec::as_slice)
    }

    /// Outside events waiting for the next tick.
    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.external.len()
    }

    /// Returns true once the instance has been destroyed.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Queues an event for the next tick. Ignored after destruction.
    pub fn raise(&mut self, event: EventId) {
        if self.destroyed {
            tracing::trace!(instance = %self.id, %event, "event raised on destroyed instance");
            return;
        }
        self.external.push_back(event);
    }

    /// Returns the instance to a fresh start: entry state, initial variables,
    /// no pending events, no dispatch history, the original random sequence.
    ///
    /// A destroyed instance becomes usable again.
    pub fn reset(&mut self) {
        let entry = Self::entry_of(&self.graph).unwrap_or(self.active);
        self.variables.reset(self.graph.variables());
        self.external.clear();
        self.counters.clear();
        self.rng = SmallRng::seed_from_u64(self.seed);
        self.destroyed = false;
        self.enter(entry);
    }

    /// Changes the seed used from the next [`reset`](Self::reset) on.
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
    }

    /// Edits this instance's graph without touching other instances that
    /// share it.
    ///
    /// The edit runs on a copy; on error nothing changes. Newly declared
    /// variables get their initial values. A state whose action list changed
    /// loses its dispatch counters, and if it is the active state it restarts
    /// its actions on the next tick.
    ///
    /// # Errors
    ///
    /// Whatever the patch returns.
    pub fn patch(
        &mut self,
        patch: impl FnOnce(&mut Graph) -> Result<(), GraphError>,
    ) -> Result<(), GraphError> {
        let mut draft = (*self.graph).clone();
        patch(&mut draft)?;
        let previous = std::mem::replace(&mut self.graph, Arc::new(draft));
        self.variables.sync(self.graph.variables());

        let graph = &self.graph;
        let changed = |state: StateId| {
            previous.state(state).map(State::actions) != graph.state(state).map(State::actions)
        };
        self.counters.retain(|&(state, _), _| !changed(state));
        if changed(self.active) {
            self.slots = Self::fresh_slots(graph, self.active);
        }
        Ok(())
    }

    fn enter(&mut self, state: StateId) {
        self.active = state;
        self.slots = Self::fresh_slots(&self.graph, state);
        self.ticks_in_state = 0;
        self.time_in_state = Duration::ZERO;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TickContext / TickOutcome
// ─────────────────────────────────────────────────────────────────────────────

/// Per-tick inputs shared by every instance ticked with it.
pub struct TickContext<'a> {
    /// Time since the previous tick.
    pub dt: Duration,
    host: Option<&'a mut dyn HostInvoker>,
    placement: Option<&'a dyn PlacementProvider>,
    hooks: Option<&'a HooksAPI>,
}

impl<'a> TickContext<'a> {
    /// A context with no host, placement provider or hooks.
    #[must_use]
    pub fn new(dt: Duration) -> Self {
        Self {
            dt,
            host: None,
            placement: None,
            hooks: None,
        }
    }

    /// Routes host calls to `host`.
    #[must_use]
    pub fn with_host(mut self, host: &'a mut dyn HostInvoker) -> Self {
        self.host = Some(host);
        self
    }

    /// Resolves placement arguments through `placement`.
    #[must_use]
    pub fn with_placement(mut self, placement: &'a dyn PlacementProvider) -> Self {
        self.placement = Some(placement);
        self
    }

    /// Reports lifecycle events to `hooks`.
    #[must_use]
    pub fn with_hooks(mut self, hooks: &'a HooksAPI) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// The hooks attached to this context.
    #[must_use]
    pub fn hooks(&self) -> Option<&'a HooksAPI> {
        self.hooks
    }
}

/// A transition that was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedTransition {
    /// Triggering event.
    pub event: EventId,
    /// Previous state.
    pub from: StateId,
    /// New state.
    pub to: StateId,
    /// True if a global transition matched.
    pub global: bool,
}

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// The transition taken, if any.
    pub transition: Option<AppliedTransition>,
    /// Events raised by actions this tick.
    pub raised: usize,
    /// Events that matched nothing, or were discarded after the transition.
    pub dropped: usize,
    /// True if `RECYCLE` was processed this tick. A `RECYCLE` discarded or
    /// carried over after a transition does not count.
    pub recycle_requested: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Action,
    External,
}

// ─────────────────────────────────────────────────────────────────────────────
// GraphExecutor
// ─────────────────────────────────────────────────────────────────────────────

/// Advances graph instances.
///
/// Stateless apart from its configuration; one executor can run any number
/// of instances.
#[derive(Debug, Clone, Default)]
pub struct GraphExecutor {
    config: ExecutorConfig,
}

impl GraphExecutor {
    /// Creates an executor with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an executor with the given settings.
    #[must_use]
    pub fn with_config(config: ExecutorConfig) -> Self {
        Self { config }
    }

    /// The executor's settings.
    #[must_use]
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Runs one tick of `instance`. Destroyed instances are left alone.
    pub fn tick(&self, instance: &mut GraphInstance, ctx: &mut TickContext<'_>) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        if instance.destroyed {
            return outcome;
        }

        self.trim_pending(instance);

        let mut raised = Vec::new();
        self.run_actions(instance, ctx, &mut raised);
        instance.ticks_in_state += 1;
        instance.time_in_state += ctx.dt;
        outcome.raised = raised.len();

        let external: Vec<EventId> = instance.external.drain(..).collect();
        let queue = raised
            .into_iter()
            .map(|event| (event, Origin::Action))
            .chain(external.into_iter().map(|event| (event, Origin::External)));

        let mut carried = VecDeque::new();
        for (event, origin) in queue {
            if outcome.transition.is_some() {
                match origin {
                    Origin::External => carried.push_back(event),
                    Origin::Action => {
                        outcome.dropped += 1;
                        tracing::trace!(
                            instance = %instance.id,
                            %event,
                            "event discarded after transition"
                        );
                    }
                }
                continue;
            }
            if event == EventId::RECYCLE {
                outcome.recycle_requested = true;
            }
            match self.apply(instance, event, ctx.hooks) {
                Some(transition) => outcome.transition = Some(transition),
                None => {
                    outcome.dropped += 1;
                    Self::report_drop(instance, event, ctx.hooks);
                }
            }
        }
        instance.external = carried;
        outcome
    }

    /// Processes one event right away, without running any action.
    ///
    /// Returns the new state if a transition was taken.
    pub fn dispatch(
        &self,
        instance: &mut GraphInstance,
        event: EventId,
        hooks: Option<&HooksAPI>,
    ) -> Option<StateId> {
        if instance.destroyed {
            return None;
        }
        match self.apply(instance, event, hooks) {
            Some(transition) => Some(transition.to),
            None => {
                Self::report_drop(instance, event, hooks);
                None
            }
        }
    }

    /// Destroys `instance`: pending events are discarded and no later tick,
    /// dispatch or raise has any effect until it is reset.
    pub fn destroy(&self, instance: &mut GraphInstance, hooks: Option<&HooksAPI>) {
        if instance.destroyed {
            return;
        }
        instance.destroyed = true;
        instance.external.clear();
        tracing::debug!(
            instance = %instance.id,
            graph = %instance.graph.name(),
            state = %instance.active_state_name(),
            "instance destroyed"
        );
        if let Some(hooks) = hooks {
            hooks.invoke(
                ScheduleId::of::<OnInstanceDestroyed>(),
                &GraphEvent::InstanceDestroyed {
                    instance: instance.id.clone(),
                    state: instance.active,
                },
            );
        }
    }

    /// Announces the entry state of a fresh or reset instance to `hooks`.
    pub fn announce_entry(&self, instance: &GraphInstance, hooks: Option<&HooksAPI>) {
        Self::emit_state::<OnStateEnter>(instance, hooks, true);
    }

    fn trim_pending(&self, instance: &mut GraphInstance) {
        let max = self.config.max_pending_events;
        while instance.external.len() > max {
            if let Some(event) = instance.external.pop_front() {
                tracing::warn!(
                    instance = %instance.id,
                    %event,
                    max_pending_events = max,
                    "event queue full, dropping oldest event"
                );
            }
        }
    }

    fn run_actions(
        &self,
        instance: &mut GraphInstance,
        ctx: &mut TickContext<'_>,
        raised: &mut Vec<EventId>,
    ) {
        let graph = Arc::clone(&instance.graph);
        let state_id = instance.active;
        let Some(state) = graph.state(state_id) else {
            tracing::warn!(
                instance = %instance.id,
                state = %state_id,
                "active state missing from graph"
            );
            return;
        };
        if instance.slots.len() != state.actions().len() {
            instance.slots = vec![ActionSlot::Pending; state.actions().len()];
        }

        for (index, action) in state.actions().iter().enumerate() {
            if instance.slots[index] == ActionSlot::Done {
                continue;
            }
            let dt = ctx.dt;
            match action {
                Action::Wait(wait) => {
                    if step_timer(&mut instance.slots[index], dt, || wait.duration) {
                        raised.push(wait.finish_event);
                    }
                }
                Action::WaitRandom(wait) => {
                    let rng = &mut instance.rng;
                    if step_timer(&mut instance.slots[index], dt, || {
                        random_duration(rng, wait.min, wait.max)
                    }) {
                        raised.push(wait.finish_event);
                    }
                }
                Action::SetVariable(set) => {
                    if let Err(error) = instance.variables.set(set.variable, set.value) {
                        tracing::warn!(
                            instance = %instance.id,
                            state = %state.name(),
                            %error,
                            "variable write skipped"
                        );
                    }
                    if !set.every_tick {
                        instance.slots[index] = ActionSlot::Done;
                    }
                }
                Action::SendEvent(send) => {
                    if step_timer(&mut instance.slots[index], dt, || send.delay) {
                        raised.push(send.event);
                    }
                }
                Action::InvokeHost(call) => {
                    let args = Self::resolve_args(instance, &call.args, ctx.placement);
                    let delivered = match ctx.host.as_deref_mut() {
                        Some(host) => {
                            host.invoke_host(&call.name, &args);
                            true
                        }
                        None => {
                            tracing::trace!(
                                instance = %instance.id,
                                call = %call.name,
                                "no host attached, call skipped"
                            );
                            false
                        }
                    };
                    if let Some(hooks) = ctx.hooks {
                        hooks.invoke(
                            ScheduleId::of::<OnHostInvoke>(),
                            &GraphEvent::HostInvoked {
                                instance: instance.id.clone(),
                                name: Arc::clone(&call.name),
                                arg_count: args.len(),
                                delivered,
                            },
                        );
                    }
                    instance.slots[index] = ActionSlot::Done;
                }
                Action::WeightedRandomDispatch(dispatch) => {
                    let counters = instance.counters.entry((state_id, index)).or_default();
                    let outcome = WeightedRandomDispatcher::new(&dispatch.candidates)
                        .with_fallback(dispatch.fallback)
                        .dispatch(counters, &mut instance.rng);
                    match outcome {
                        DispatchOutcome::Selected { index: chosen, forced, event } => {
                            tracing::debug!(
                                instance = %instance.id,
                                state = %state.name(),
                                candidate = chosen,
                                forced,
                                %event,
                                "weighted dispatch"
                            );
                        }
                        DispatchOutcome::Exhausted { fallback } => {
                            tracing::debug!(
                                instance = %instance.id,
                                state = %state.name(),
                                %fallback,
                                "weighted dispatch exhausted"
                            );
                        }
                    }
                    raised.push(outcome.event());
                    instance.slots[index] = ActionSlot::Done;
                }
                Action::ConditionalDispatch(cond) => {
                    match instance.variables.get(cond.variable) {
                        Some(Value::Bool(flag)) => {
                            let event = if flag { cond.if_true } else { cond.if_false };
                            raised.extend(event);
                        }
                        other => tracing::warn!(
                            instance = %instance.id,
                            state = %state.name(),
                            variable = %cond.variable,
                            found = ?other,
                            "conditional dispatch needs a bool variable"
                        ),
                    }
                    if !cond.every_tick {
                        instance.slots[index] = ActionSlot::Done;
                    }
                }
            }
        }
    }

    fn resolve_args(
        instance: &GraphInstance,
        args: &[HostArg],
        placement: Option<&dyn PlacementProvider>,
    ) -> Vec<HostValue> {
        args.iter()
            .map(|arg| match arg {
                HostArg::Value(value) => HostValue::Value(*value),
                HostArg::Variable(id) => match instance.variables.get(*id) {
                    Some(value) => HostValue::Value(value),
                    None => {
                        tracing::warn!(
                            instance = %instance.id,
                            variable = %id,
                            "host argument reads an undeclared variable"
                        );
                        HostValue::Value(Value::Ref(None))
                    }
                },
                HostArg::Event(event) => HostValue::Event(*event),
                HostArg::Text(text) => HostValue::Text(Arc::clone(text)),
                HostArg::Placement(name) => {
                    HostValue::Placement(placement.and_then(|p| p.placement(name)))
                }
            })
            .collect()
    }

    fn apply(
        &self,
        instance: &mut GraphInstance,
        event: EventId,
        hooks: Option<&HooksAPI>,
    ) -> Option<AppliedTransition> {
        let from = instance.active;
        let (to, global) = instance.graph.resolve_transition(from, event)?;

        Self::emit_state::<OnStateExit>(instance, hooks, false);
        instance.enter(to);

        tracing::debug!(
            instance = %instance.id,
            graph = %instance.graph.name(),
            from = %instance.graph.state_name(from),
            to = %instance.graph.state_name(to),
            %event,
            global,
            "transition"
        );

        if let Some(hooks) = hooks {
            hooks.invoke(
                ScheduleId::of::<OnTransition>(),
                &GraphEvent::Transition {
                    instance: instance.id.clone(),
                    event,
                    from,
                    to,
                    global,
                },
            );
        }
        Self::emit_state::<OnStateEnter>(instance, hooks, true);

        Some(AppliedTransition {
            event,
            from,
            to,
            global,
        })
    }

    fn emit_state<S: 'static>(instance: &GraphInstance, hooks: Option<&HooksAPI>, enter: bool) {
        let Some(hooks) = hooks else {
            return;
        };
        let state = instance.active;
        let state_name: Arc<str> = Arc::from(instance.active_state_name());
        let event = if enter {
            GraphEvent::StateEnter {
                instance: instance.id.clone(),
                state,
                state_name,
            }
        } else {
            GraphEvent::StateExit {
                instance: instance.id.clone(),
                state,
                state_name,
            }
        };
        hooks.invoke(ScheduleId::of::<S>(), &event);
    }

    fn report_drop(instance: &GraphInstance, event: EventId, hooks: Option<&HooksAPI>) {
        tracing::trace!(
            instance = %instance.id,
            state = %instance.active_state_name(),
            %event,
            "event dropped"
        );
        if let Some(hooks) = hooks {
            hooks.invoke(
                ScheduleId::of::<OnEventDropped>(),
                &GraphEvent::EventDropped {
                    instance: instance.id.clone(),
                    event,
                    state: instance.active,
                },
            );
        }
    }
}

/// Advances a timed slot. Returns true on the tick it fires.
fn step_timer(slot: &mut ActionSlot, dt: Duration, target: impl FnOnce() -> Duration) -> bool {
    match *slot {
        ActionSlot::Pending => {
            let target = target();
            if target.is_zero() {
                *slot = ActionSlot::Done;
                true
            } else {
                *slot = ActionSlot::Timer {
                    elapsed: Duration::ZERO,
                    target,
                };
                false
            }
        }
        ActionSlot::Timer { elapsed, target } => {
            let elapsed = elapsed + dt;
            if elapsed >= target {
                *slot = ActionSlot::Done;
                true
            } else {
                *slot = ActionSlot::Timer { elapsed, target };
                false
            }
        }
        ActionSlot::Done => false,
    }
}

fn random_duration<R: Rng + ?Sized>(rng: &mut R, min: Duration, max: Duration) -> Duration {
    if max <= min {
        return min;
    }
    Duration::from_secs_f64(rng.gen_range(min.as_secs_f64()..=max.as_secs_f64()))
}
