//! States and transitions.

use core::fmt;
use std::sync::Arc;

use crate::action::Action;
use crate::event::EventId;

/// Index of a state within its graph.
///
/// States are never removed from a graph, so an id stays valid for the
/// lifetime of the graph and of every patched copy of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(u32);

impl StateId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).unwrap_or(u32::MAX))
    }

    /// Returns the position of this state in its graph.
    #[must_use]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "state#{}", self.0)
    }
}

/// An outgoing edge: on `event`, go to `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Transition {
    /// Triggering event.
    pub event: EventId,
    /// Destination state.
    pub target: StateId,
}

// ─────────────────────────────────────────────────────────────────────────────
// State
// ─────────────────────────────────────────────────────────────────────────────

/// A named state: an ordered action list plus at most one transition per
/// event.
///
/// ```
/// # use choreo_graph::prelude::*;
/// # use core::time::Duration;
/// let windup = State::new("Windup")
///     .with_description("raise both arms")
///     .with_action(Action::wait(Duration::from_millis(400), EventId::FINISHED));
/// assert_eq!(windup.actions().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    name: Arc<str>,
    description: String,
    actions: Vec<Action>,
    transitions: Vec<Transition>,
}

impl State {
    /// Creates an empty state.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            actions: Vec::new(),
            transitions: Vec::new(),
        }
    }

    /// Sets the free-form description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Appends an action.
    #[must_use]
    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Sets a transition.
    #[must_use]
    pub fn with_transition(mut self, event: EventId, target: StateId) -> Self {
        self.set_transition(event, target);
        self
    }

    /// The state's name, unique within its graph.
    #[must_use]
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    /// The state's description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Actions in execution order.
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Mutable access for in-place edits of individual actions.
    pub fn actions_mut(&mut self) -> &mut Vec<Action> {
        &mut self.actions
    }

    /// Appends an action.
    pub fn add_action(&mut self, action: Action) -> &mut Self {
        self.actions.push(action);
        self
    }

    /// Inserts an action at `index`, or appends if `index` is past the end.
    pub fn insert_action(&mut self, index: usize, action: Action) -> &mut Self {
        let index = index.min(self.actions.len());
        self.actions.insert(index, action);
        self
    }

    /// Replaces the whole action list, returning the old one.
    pub fn replace_actions(&mut self, actions: Vec<Action>) -> Vec<Action> {
        core::mem::replace(&mut self.actions, actions)
    }

    /// Outgoing transitions in registration order.
    #[must_use]
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub(crate) fn transitions_mut(&mut self) -> &mut [Transition] {
        &mut self.transitions
    }

    /// Sets the transition for `event`, overwriting any earlier one.
    ///
    /// Returns the previous target.
    pub fn set_transition(&mut self, event: EventId, target: StateId) -> Option<StateId> {
        match self.transitions.iter_mut().find(|t| t.event == event) {
            Some(existing) => Some(core::mem::replace(&mut existing.target, target)),
            None => {
                self.transitions.push(Transition { event, target });
                None
            }
        }
    }

    /// Returns the target for `event`, if any.
    #[must_use]
    pub fn transition_for(&self, event: EventId) -> Option<StateId> {
        self.transitions
            .iter()
            .find(|t| t.event == event)
            .map(|t| t.target)
    }

    /// Removes every transition matching `predicate`. Returns how many went.
    pub fn remove_transitions(&mut self, mut predicate: impl FnMut(&Transition) -> bool) -> usize {
        let before = self.transitions.len();
        self.transitions.retain(|t| !predicate(t));
        before - self.transitions.len()
    }

    /// Removes every action matching `predicate`. Returns how many went.
    pub fn remove_actions(&mut self, mut predicate: impl FnMut(&Action) -> bool) -> usize {
        let before = self.actions.len();
        self.actions.retain(|a| !predicate(a));
        before - self.actions.len()
    }

    /// True if every outgoing transition uses `RECYCLE`, or there are none.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.transitions
            .iter()
            .all(|t| t.event == EventId::RECYCLE)
    }
}
