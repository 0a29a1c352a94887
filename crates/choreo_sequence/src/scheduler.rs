//! The tick-driven scheduler.
//!
//! Each tick, running sequences advance in the order they were started.
//! A sequence runs steps until one suspends or the list ends:
//!
//! - `Run` steps run and move on within the same tick.
//! - `Wait` starts counting on the tick after it is reached and resumes on
//!   the tick where the elapsed time reaches its duration.
//! - `WaitUntil` and `WaitForSignal` check their condition on entry and on
//!   every later tick.
//! - `SpawnChildren` spawns its first child on entry and the rest as their
//!   interval elapses.
//!
//! Signals sent between two ticks are visible to every sequence during the
//! next tick and then discarded. Cancellation requests are checked before
//! every step.

use core::fmt;
use core::time::Duration;
use std::sync::Arc;

use choreo_graph::event::EventId;
use hashbrown::HashSet;

use crate::cancel::{CancelRequest, Canceller};
use crate::sequence::{OwnerId, Sequence, SequenceId, Step};

/// A sequence that ran to its end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// The finished sequence.
    pub id: SequenceId,
    /// Its owner.
    pub owner: OwnerId,
    /// Its name.
    pub name: Arc<str>,
    /// The event set with [`Sequence::on_complete`], if any.
    pub event: Option<EventId>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Running sequences
// ─────────────────────────────────────────────────────────────────────────────

/// Where the current step left off.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum Progress {
    /// The step has not been reached yet.
    #[default]
    Fresh,
    Waiting {
        elapsed: Duration,
    },
    Polling,
    Spawning {
        spawned: u32,
        elapsed: Duration,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Running,
    Finished,
    Cancelled,
}

struct Running<W> {
    id: SequenceId,
    sequence: Sequence<W>,
    cursor: usize,
    progress: Progress,
    status: Status,
}

impl<W> Running<W> {
    fn is_live(&self) -> bool {
        self.status == Status::Running
    }

    /// Runs steps until one suspends, the list ends or a cancellation is
    /// found.
    fn advance(
        &mut self,
        dt: Duration,
        world: &mut W,
        signals: &HashSet<EventId>,
        canceller: &Canceller,
    ) -> Status {
        let (id, owner) = (self.id, self.sequence.owner());
        loop {
            if canceller.is_requested(id, owner) {
                return Status::Cancelled;
            }
            let resumed = self.progress;
            let Some(step) = self.sequence.steps.get_mut(self.cursor) else {
                return Status::Finished;
            };

            let done = match step {
                Step::Run(run) => {
                    run(&mut *world);
                    true
                }
                Step::Wait(duration) => {
                    let elapsed = match resumed {
                        Progress::Waiting { elapsed } => elapsed + dt,
                        _ => Duration::ZERO,
                    };
                    self.progress = Progress::Waiting { elapsed };
                    elapsed >= *duration
                }
                Step::WaitUntil(predicate) => {
                    self.progress = Progress::Polling;
                    predicate(&*world)
                }
                Step::WaitForSignal(event) => {
                    self.progress = Progress::Polling;
                    signals.contains(event)
                }
                Step::SpawnChildren {
                    count,
                    interval,
                    factory,
                } => {
                    let (mut spawned, mut elapsed) = match resumed {
                        Progress::Spawning { spawned, elapsed } => (spawned, elapsed + dt),
                        _ => {
                            if *count > 0 {
                                factory(&mut *world, 0);
                            }
                            (1.min(*count), Duration::ZERO)
                        }
                    };
                    while spawned < *count && (interval.is_zero() || elapsed >= *interval) {
                        if canceller.is_requested(id, owner) {
                            return Status::Cancelled;
                        }
                        factory(&mut *world, spawned);
                        spawned += 1;
                        elapsed = elapsed.saturating_sub(*interval);
                    }
                    self.progress = Progress::Spawning { spawned, elapsed };
                    spawned >= *count
                }
            };

            if !done {
                return Status::Running;
            }
            self.cursor += 1;
            self.progress = Progress::Fresh;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SequenceScheduler
// ─────────────────────────────────────────────────────────────────────────────

/// Runs sequences against a world value `W`.
pub struct SequenceScheduler<W> {
    running: Vec<Running<W>>,
    generations: Vec<u32>,
    free: Vec<u32>,
    signals: Vec<EventId>,
    canceller: Canceller,
}

impl<W> Default for SequenceScheduler<W> {
    fn default() -> Self {
        Self::with_canceller(Canceller::new())
    }
}

impl<W> fmt::Debug for SequenceScheduler<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self
            .running
            .iter()
            .map(|r| r.sequence.name().as_ref())
            .collect();
        f.debug_struct("SequenceScheduler")
            .field("running", &names)
            .field("pending_signals", &self.signals.len())
            .finish_non_exhaustive()
    }
}

impl<W> SequenceScheduler<W> {
    /// Creates an empty scheduler with its own cancellation queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty scheduler reading requests from `canceller`.
    #[must_use]
    pub fn with_canceller(canceller: Canceller) -> Self {
        Self {
            running: Vec::new(),
            generations: Vec::new(),
            free: Vec::new(),
            signals: Vec::new(),
            canceller,
        }
    }

    /// A handle to this scheduler's cancellation queue.
    #[must_use]
    pub fn canceller(&self) -> Canceller {
        self.canceller.clone()
    }

    /// Starts a sequence. Its first steps run on the next tick.
    pub fn start(&mut self, sequence: Sequence<W>) -> SequenceId {
        self.apply_requests();
        let id = self.allocate();
        tracing::debug!(
            sequence = %sequence.name(),
            owner = %sequence.owner(),
            %id,
            steps = sequence.len(),
            "sequence started"
        );
        self.running.push(Running {
            id,
            sequence,
            cursor: 0,
            progress: Progress::Fresh,
            status: Status::Running,
        });
        id
    }

    /// Sends a signal, seen by waiting sequences on the next tick.
    pub fn signal(&mut self, event: EventId) {
        tracing::trace!(%event, "sequence signal");
        self.signals.push(event);
    }

    /// Advances every running sequence by `dt`.
    ///
    /// Returns the sequences that ran to their end this tick, in start
    /// order.
    pub fn tick(&mut self, dt: Duration, world: &mut W) -> Vec<Completion> {
        let signals: HashSet<EventId> = self.signals.drain(..).collect();
        self.apply_requests();

        let mut completions = Vec::new();
        for running in &mut self.running {
            if !running.is_live() {
                continue;
            }
            running.status = running.advance(dt, world, &signals, &self.canceller);
            if running.status == Status::Finished {
                tracing::debug!(
                    sequence = %running.sequence.name(),
                    owner = %running.sequence.owner(),
                    id = %running.id,
                    "sequence completed"
                );
                completions.push(Completion {
                    id: running.id,
                    owner: running.sequence.owner(),
                    name: Arc::clone(running.sequence.name()),
                    event: running.sequence.completion(),
                });
            }
        }

        self.apply_requests();
        self.sweep();
        completions
    }

    /// Cancels one sequence. Returns false if it was not running.
    pub fn cancel(&mut self, id: SequenceId) -> bool {
        let Some(running) = self
            .running
            .iter_mut()
            .find(|r| r.id == id && r.is_live())
        else {
            return false;
        };
        running.status = Status::Cancelled;
        self.sweep();
        true
    }

    /// Cancels every sequence of `owner`. Returns how many were running.
    pub fn cancel_owner(&mut self, owner: OwnerId) -> usize {
        let mut cancelled = 0;
        for running in &mut self.running {
            if running.is_live() && running.sequence.owner() == owner {
                running.status = Status::Cancelled;
                cancelled += 1;
            }
        }
        self.sweep();
        cancelled
    }

    /// Cancels everything.
    pub fn clear(&mut self) {
        for running in &mut self.running {
            running.status = Status::Cancelled;
        }
        self.signals.clear();
        self.canceller.drain();
        self.sweep();
    }

    /// Returns true if the sequence is running and no cancellation for it
    /// is pending.
    #[must_use]
    pub fn is_running(&self, id: SequenceId) -> bool {
        self.running.iter().any(|r| {
            r.id == id && r.is_live() && !self.canceller.is_requested(id, r.sequence.owner())
        })
    }

    /// Ids of the running sequences owned by `owner`, in start order.
    #[must_use]
    pub fn running_for(&self, owner: OwnerId) -> Vec<SequenceId> {
        self.running
            .iter()
            .filter(|r| r.is_live() && r.sequence.owner() == owner)
            .filter(|r| !self.canceller.is_requested(r.id, owner))
            .map(|r| r.id)
            .collect()
    }

    /// Number of running sequences.
    #[must_use]
    pub fn len(&self) -> usize {
        self.running.iter().filter(|r| r.is_live()).count()
    }

    /// Returns true if nothing is running.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn allocate(&mut self) -> SequenceId {
        match self.free.pop() {
            Some(index) => SequenceId {
                index,
                generation: self.generations[index as usize],
            },
            None => {
                self.generations.push(0);
                SequenceId {
                    index: (self.generations.len() - 1) as u32,
                    generation: 0,
                }
            }
        }
    }

    fn apply_requests(&mut self) {
        for request in self.canceller.drain() {
            for running in &mut self.running {
                if running.is_live() && request.covers(running.id, running.sequence.owner()) {
                    running.status = Status::Cancelled;
                }
            }
            if let CancelRequest::Owner(owner) = request {
                tracing::trace!(%owner, "owner cancellation applied");
            }
        }
    }

    /// Drops ended sequences and frees their slots.
    fn sweep(&mut self) {
        let generations = &mut self.generations;
        let free = &mut self.free;
        self.running.retain(|running| {
            if running.is_live() {
                return true;
            }
            if running.status == Status::Cancelled {
                tracing::debug!(
                    sequence = %running.sequence.name(),
                    owner = %running.sequence.owner(),
                    id = %running.id,
                    "sequence cancelled"
                );
            }
            let index = running.id.index;
            generations[index as usize] = generations[index as usize].wrapping_add(1);
            free.push(index);
            false
        });
    }
}
