//! Weighted random event selection with retirement and starvation guards.
//!
//! [`WeightedRandomDispatcher`] picks one [`Candidate`] per call. Each
//! candidate carries a relative `weight`, a lifetime cap `max_triggers`, and
//! a starvation bound `max_misses`. Counters persist between calls and are
//! owned by the caller, so the dispatcher itself is a pure function of the
//! counters and the random source:
//!
//! 1. Eligible candidates have `triggered < max_triggers` and a positive
//!    weight. With none eligible the outcome is [`DispatchOutcome::Exhausted`].
//! 2. A candidate that would reach `max_misses` on one more miss is forced.
//!    Among several, the highest `missed` wins, then the lowest index.
//! 3. Otherwise one eligible candidate is drawn proportionally to weight.
//! 4. The chosen candidate gets `triggered += 1`, `missed = 0`; every other
//!    eligible candidate gets `missed += 1`.
//!
//! # Example
//!
//! ```
//! # use choreo_graph::dispatch::{Candidate, WeightedRandomDispatcher};
//! # use choreo_graph::event::EventRegistry;
//! # use rand::SeedableRng;
//! let events = EventRegistry::new();
//! let candidates = vec![
//!     Candidate::new(events.create_event("Slam"), 1.0).with_max_triggers(2),
//!     Candidate::new(events.create_event("Sweep"), 5.0),
//! ];
//! let mut counters = Vec::new();
//! let mut rng = rand::rngs::SmallRng::seed_from_u64(7);
//! let outcome = WeightedRandomDispatcher::new(&candidates).dispatch(&mut counters, &mut rng);
//! assert!(outcome.is_selected());
//! ```

use rand::Rng;

use crate::event::EventId;

/// One option of a weighted dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Event raised when this candidate is chosen.
    pub event: EventId,
    /// Relative selection weight. Non-positive weights are never chosen.
    pub weight: f32,
    /// Total number of times this candidate may ever be chosen.
    pub max_triggers: u32,
    /// Consecutive misses after which the candidate is forced. Zero disables
    /// forcing.
    pub max_misses: u32,
}

impl Candidate {
    /// Creates a candidate with no trigger cap and no starvation bound.
    #[must_use]
    pub fn new(event: EventId, weight: f32) -> Self {
        Self {
            event,
            weight,
            max_triggers: u32::MAX,
            max_misses: 0,
        }
    }

    /// Caps how many times this candidate can be chosen.
    #[must_use]
    pub fn with_max_triggers(mut self, max_triggers: u32) -> Self {
        self.max_triggers = max_triggers;
        self
    }

    /// Forces selection after this many consecutive misses.
    #[must_use]
    pub fn with_max_misses(mut self, max_misses: u32) -> Self {
        self.max_misses = max_misses;
        self
    }

    fn is_eligible(&self, counters: &CandidateCounters) -> bool {
        counters.triggered < self.max_triggers && self.weight > 0.0 && self.weight.is_finite()
    }

    fn is_starved(&self, counters: &CandidateCounters) -> bool {
        self.max_misses > 0 && counters.missed.saturating_add(1) >= self.max_misses
    }
}

/// Running counters for one candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CandidateCounters {
    /// Times this candidate has been chosen.
    pub triggered: u32,
    /// Consecutive dispatches this candidate was eligible but not chosen.
    pub missed: u32,
}

/// Result of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A candidate was chosen.
    Selected {
        /// Index of the chosen candidate.
        index: usize,
        /// The candidate's event.
        event: EventId,
        /// True if the starvation guard chose it.
        forced: bool,
    },
    /// No candidate was eligible.
    Exhausted {
        /// The fallback event to raise instead.
        fallback: EventId,
    },
}

impl DispatchOutcome {
    /// The event to raise for this outcome.
    #[must_use]
    pub fn event(&self) -> EventId {
        match self {
            DispatchOutcome::Selected { event, .. } => *event,
            DispatchOutcome::Exhausted { fallback } => *fallback,
        }
    }

    /// Returns true if a candidate was chosen.
    #[must_use]
    pub fn is_selected(&self) -> bool {
        matches!(self, DispatchOutcome::Selected { .. })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// WeightedRandomDispatcher
// ─────────────────────────────────────────────────────────────────────────────

/// Selects one candidate per dispatch. See the [module docs](self).
#[derive(Debug, Clone, Copy)]
pub struct WeightedRandomDispatcher<'a> {
    candidates: &'a [Candidate],
    fallback: EventId,
}

impl<'a> WeightedRandomDispatcher<'a> {
    /// Creates a dispatcher falling back to [`EventId::FINISHED`].
    #[must_use]
    pub fn new(candidates: &'a [Candidate]) -> Self {
        Self {
            candidates,
            fallback: EventId::FINISHED,
        }
    }

    /// Sets the event raised when every candidate is retired.
    #[must_use]
    pub fn with_fallback(mut self, fallback: EventId) -> Self {
        self.fallback = fallback;
        self
    }

    /// Runs one dispatch and updates `counters`.
    ///
    /// `counters` is resized to match the candidate list, so a list that grew
    /// through patching starts its new candidates at zero.
    pub fn dispatch<R: Rng + ?Sized>(
        &self,
        counters: &mut Vec<CandidateCounters>,
        rng: &mut R,
    ) -> DispatchOutcome {
        counters.resize(self.candidates.len(), CandidateCounters::default());

        let eligible: Vec<usize> = self
            .candidates
            .iter()
            .zip(counters.iter())
            .enumerate()
            .filter(|(_, (candidate, counter))| candidate.is_eligible(counter))
            .map(|(index, _)| index)
            .collect();

        if eligible.is_empty() {
            return DispatchOutcome::Exhausted {
                fallback: self.fallback,
            };
        }

        let (index, forced) = match self.starved(&eligible, counters) {
            Some(index) => (index, true),
            None => (self.sample(&eligible, rng), false),
        };

        for &other in &eligible {
            let counter = &mut counters[other];
            if other == index {
                counter.triggered = counter.triggered.saturating_add(1);
                counter.missed = 0;
            } else {
                counter.missed = counter.missed.saturating_add(1);
            }
        }

        DispatchOutcome::Selected {
            index,
            event: self.candidates[index].event,
            forced,
        }
    }

    fn starved(&self, eligible: &[usize], counters: &[CandidateCounters]) -> Option<usize> {
        let mut best: Option<usize> = None;
        for &index in eligible {
            if !self.candidates[index].is_starved(&counters[index]) {
                continue;
            }
            match best {
                Some(current) if counters[current].missed >= counters[index].missed => {}
                _ => best = Some(index),
            }
        }
        best
    }

    // Summed in f64 so any number of finite f32 weights stays finite.
    fn sample<R: Rng + ?Sized>(&self, eligible: &[usize], rng: &mut R) -> usize {
        let total: f64 = eligible
            .iter()
            .map(|&index| f64::from(self.candidates[index].weight))
            .sum();
        let mut roll = rng.gen_range(0.0..total);
        for &index in eligible {
            let weight = f64::from(self.candidates[index].weight);
            if roll < weight {
                return index;
            }
            roll -= weight;
        }
        // Float rounding can leave a sliver past the last bucket.
        eligible[eligible.len() - 1]
    }
}
