//! Sequence definitions.
//!
//! A [`Sequence`] is built once with its builder methods and then handed to
//! the [`SequenceScheduler`](crate::SequenceScheduler), which owns it until
//! it completes or is cancelled.

use core::fmt;
use core::time::Duration;
use std::sync::Arc;

use choreo_graph::event::EventId;

// ─────────────────────────────────────────────────────────────────────────────
// Ids
// ─────────────────────────────────────────────────────────────────────────────

/// The entity or graph instance a sequence belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId(u64);

impl OwnerId {
    /// Wraps a raw owner value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw owner value.
    #[must_use]
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "owner#{}", self.0)
    }
}

/// Handle to a started sequence.
///
/// Slots are reused once a sequence ends; the generation tells a reused slot
/// apart from the sequence that held it before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SequenceId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl SequenceId {
    /// Slot index.
    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Slot generation.
    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for SequenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seq#{}v{}", self.index, self.generation)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Step
// ─────────────────────────────────────────────────────────────────────────────

/// Closure run by [`Step::Run`].
pub type RunFn<W> = Box<dyn FnMut(&mut W) + Send>;

/// Predicate polled by [`Step::WaitUntil`].
pub type PredicateFn<W> = Box<dyn FnMut(&W) -> bool + Send>;

/// Factory called by [`Step::SpawnChildren`] with the child's index.
pub type SpawnFn<W> = Box<dyn FnMut(&mut W, u32) + Send>;

/// One step of a sequence.
pub enum Step<W> {
    /// Runs a closure and moves on in the same tick.
    Run(RunFn<W>),
    /// Suspends until the duration has elapsed. Time starts counting on the
    /// tick after the step is reached.
    Wait(Duration),
    /// Suspends until the predicate holds. Checked on entry, then once per
    /// tick.
    WaitUntil(PredicateFn<W>),
    /// Suspends until the event is signalled.
    WaitForSignal(EventId),
    /// Spawns `count` children: the first on entry, then one each time
    /// `interval` elapses. A zero interval spawns them all at once.
    SpawnChildren {
        /// Number of children.
        count: u32,
        /// Time between two children.
        interval: Duration,
        /// Creates child `i`.
        factory: SpawnFn<W>,
    },
}

impl<W> Step<W> {
    /// Short name of the step kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Step::Run(_) => "run",
            Step::Wait(_) => "wait",
            Step::WaitUntil(_) => "wait_until",
            Step::WaitForSignal(_) => "wait_for_signal",
            Step::SpawnChildren { .. } => "spawn_children",
        }
    }

    /// Returns true for steps that may suspend the sequence.
    #[must_use]
    pub fn can_suspend(&self) -> bool {
        !matches!(self, Step::Run(_))
    }
}

impl<W> fmt::Debug for Step<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Run(_) => f.write_str("Run"),
            Step::Wait(duration) => f.debug_tuple("Wait").field(duration).finish(),
            Step::WaitUntil(_) => f.write_str("WaitUntil"),
            Step::WaitForSignal(event) => f.debug_tuple("WaitForSignal").field(event).finish(),
            Step::SpawnChildren {
                count, interval, ..
            } => f
                .debug_struct("SpawnChildren")
                .field("count", count)
                .field("interval", interval)
                .finish_non_exhaustive(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sequence
// ─────────────────────────────────────────────────────────────────────────────

/// A linear list of steps owned by one entity.
///
/// ```
/// # use choreo_sequence::prelude::*;
/// # use core::time::Duration;
/// let volley = Sequence::<u32>::new("volley", OwnerId::new(7))
///     .spawn_children(5, Duration::from_millis(200), |spawned, _| *spawned += 1)
///     .wait(Duration::from_secs(1));
/// assert_eq!(volley.len(), 2);
/// ```
pub struct Sequence<W> {
    name: Arc<str>,
    owner: OwnerId,
    pub(crate) steps: Vec<Step<W>>,
    completion: Option<EventId>,
}

impl<W> Sequence<W> {
    /// Creates an empty sequence.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>, owner: OwnerId) -> Self {
        Self {
            name: name.into(),
            owner,
            steps: Vec::new(),
            completion: None,
        }
    }

    /// Appends a step.
    #[must_use]
    pub fn step(mut self, step: Step<W>) -> Self {
        self.steps.push(step);
        self
    }

    /// Appends a closure run against the world.
    #[must_use]
    pub fn run(self, f: impl FnMut(&mut W) + Send + 'static) -> Self {
        self.step(Step::Run(Box::new(f)))
    }

    /// Appends a timed wait.
    #[must_use]
    pub fn wait(self, duration: Duration) -> Self {
        self.step(Step::Wait(duration))
    }

    /// Appends a wait on a predicate.
    #[must_use]
    pub fn wait_until(self, predicate: impl FnMut(&W) -> bool + Send + 'static) -> Self {
        self.step(Step::WaitUntil(Box::new(predicate)))
    }

    /// Appends a wait on a signal.
    #[must_use]
    pub fn wait_for_signal(self, event: EventId) -> Self {
        self.step(Step::WaitForSignal(event))
    }

    /// Appends a step spawning `count` children `interval` apart.
    #[must_use]
    pub fn spawn_children(
        self,
        count: u32,
        interval: Duration,
        factory: impl FnMut(&mut W, u32) + Send + 'static,
    ) -> Self {
        self.step(Step::SpawnChildren {
            count,
            interval,
            factory: Box::new(factory),
        })
    }

    /// Sets the event reported when the sequence runs to its end.
    #[must_use]
    pub fn on_complete(mut self, event: EventId) -> Self {
        self.completion = Some(event);
        self
    }

    /// The sequence's name.
    #[must_use]
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    /// The owner the sequence belongs to.
    #[must_use]
    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    /// The completion event, if any.
    #[must_use]
    pub fn completion(&self) -> Option<EventId> {
        self.completion
    }

    /// The steps in order.
    #[must_use]
    pub fn steps(&self) -> &[Step<W>] {
        &self.steps
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if the sequence has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl<W> fmt::Debug for Sequence<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence")
            .field("name", &self.name)
            .field("owner", &self.owner)
            .field("steps", &self.steps)
            .field("completion", &self.completion)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_appends_in_order() {
        let sequence = Sequence::<()>::new("s", OwnerId::new(3))
            .run(|_| {})
            .wait(Duration::from_millis(10))
            .wait_until(|_| true)
            .wait_for_signal(EventId::FINISHED)
            .spawn_children(2, Duration::ZERO, |_, _| {})
            .on_complete(EventId::RECYCLE);

        let kinds: Vec<&str> = sequence.steps().iter().map(Step::kind).collect();
        assert_eq!(
            kinds,
            ["run", "wait", "wait_until", "wait_for_signal", "spawn_children"]
        );
        assert_eq!(sequence.owner(), OwnerId::new(3));
        assert_eq!(sequence.completion(), Some(EventId::RECYCLE));
        assert!(!sequence.steps()[0].can_suspend());
        assert!(sequence.steps()[1].can_suspend());
    }

    #[test]
    fn debug_skips_closures() {
        let sequence = Sequence::<()>::new("s", OwnerId::new(1))
            .run(|_| {})
            .wait(Duration::from_millis(5));
        let text = format!("{sequence:?}");
        assert!(text.contains("Run"));
        assert!(text.contains("Wait(5ms)"));
    }

    #[test]
    fn ids_display() {
        assert_eq!(OwnerId::new(4).to_string(), "owner#4");
        let id = SequenceId {
            index: 2,
            generation: 1,
        };
        assert_eq!(id.to_string(), "seq#2v1");
    }
}
