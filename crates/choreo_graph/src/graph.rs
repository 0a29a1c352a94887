//! Graph structure and builder API.
//!
//! A [`Graph`] is passive data: named states, their transitions, the
//! graph-wide (global) transitions and the variable declarations. Running a
//! graph is the job of [`GraphInstance`](crate::executor::GraphInstance);
//! extending one that is already authored is the job of the patch methods in
//! [`patch`](crate::patch).
//!
//! # Example
//!
//! ```
//! # use choreo_graph::prelude::*;
//! # use core::time::Duration;
//! let events = EventRegistry::new();
//! let attack_done = events.create_event("AttackDone");
//!
//! let mut graph = Graph::new("boss");
//! let prepare = graph.create_state("Prepare", "wind up").unwrap();
//! let attack = graph.create_state("Attack", "").unwrap();
//! graph.set_transition(prepare, EventId::FINISHED, attack).unwrap();
//! graph.set_transition(attack, attack_done, prepare).unwrap();
//! graph
//!     .state_mut(prepare)
//!     .unwrap()
//!     .add_action(Action::wait(Duration::from_millis(500), EventId::FINISHED));
//!
//! assert_eq!(graph.entry(), Some(prepare));
//! assert!(graph.validate().is_ok());
//! ```

use core::fmt;
use std::sync::Arc;

use hashbrown::HashMap;

use crate::action::Action;
use crate::error::GraphError;
use crate::event::EventId;
use crate::state::{State, StateId, Transition};
use crate::variable::{Value, VariableDecl, VariableId};

// ─────────────────────────────────────────────────────────────────────────────
// GraphId
// ─────────────────────────────────────────────────────────────────────────────

/// Unique identity of a graph, shared by every patched copy of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GraphId(Arc<str>);

impl GraphId {
    /// Generates a fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(nanoid::nanoid!().into())
    }

    /// Returns the id as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for GraphId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Graph
// ─────────────────────────────────────────────────────────────────────────────

/// A behavior graph.
#[derive(Debug, Clone)]
pub struct Graph {
    id: GraphId,
    name: Arc<str>,
    pub(crate) states: Vec<State>,
    by_name: HashMap<Arc<str>, StateId>,
    pub(crate) global_transitions: Vec<Transition>,
    entry: Option<StateId>,
    variables: Vec<VariableDecl>,
    variables_by_name: HashMap<Arc<str>, VariableId>,
}

impl Graph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            id: GraphId::new(),
            name: name.into(),
            states: Vec::new(),
            by_name: HashMap::new(),
            global_transitions: Vec::new(),
            entry: None,
            variables: Vec::new(),
            variables_by_name: HashMap::new(),
        }
    }

    /// The graph's identity.
    #[must_use]
    pub fn id(&self) -> &GraphId {
        &self.id
    }

    /// The graph's name.
    #[must_use]
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    // ─────────────────────────────────────────────────────────────────────
    // States
    // ─────────────────────────────────────────────────────────────────────

    /// Creates an empty state and returns its id.
    ///
    /// The first state of a graph becomes its entry unless
    /// [`set_entry`](Self::set_entry) says otherwise.
    ///
    /// # Errors
    ///
    /// [`GraphError::DuplicateState`] if the name is taken.
    pub fn create_state(
        &mut self,
        name: impl Into<Arc<str>>,
        description: impl Into<String>,
    ) -> Result<StateId, GraphError> {
        self.add_state(State::new(name).with_description(description))
    }

    /// Adds a fully built state. Existing transitions are left alone.
    ///
    /// # Errors
    ///
    /// [`GraphError::DuplicateState`] if the name is taken.
    pub fn add_state(&mut self, state: State) -> Result<StateId, GraphError> {
        if self.by_name.contains_key(state.name().as_ref()) {
            return Err(self.duplicate(state.name()));
        }
        Ok(self.push_state(state))
    }

    /// Adds several states at once, in order.
    ///
    /// Either every state is added or none is.
    ///
    /// # Errors
    ///
    /// [`GraphError::DuplicateState`] if any name is taken, or repeated in
    /// `states`.
    pub fn add_states(
        &mut self,
        states: impl IntoIterator<Item = State>,
    ) -> Result<Vec<StateId>, GraphError> {
        let states: Vec<State> = states.into_iter().collect();
        for (i, state) in states.iter().enumerate() {
            let repeated = states[..i].iter().any(|s| s.name() == state.name());
            if repeated || self.by_name.contains_key(state.name().as_ref()) {
                return Err(self.duplicate(state.name()));
            }
        }
        Ok(states.into_iter().map(|s| self.push_state(s)).collect())
    }

    fn push_state(&mut self, state: State) -> StateId {
        let id = StateId::from_index(self.states.len());
        self.by_name.insert(Arc::clone(state.name()), id);
        self.states.push(state);
        if self.entry.is_none() {
            self.entry = Some(id);
        }
        id
    }

    fn duplicate(&self, name: &Arc<str>) -> GraphError {
        GraphError::DuplicateState {
            graph: Arc::clone(&self.name),
            name: Arc::clone(name),
        }
    }

    /// Looks up a state by name.
    #[must_use]
    pub fn find_state(&self, name: &str) -> Option<StateId> {
        self.by_name.get(name).copied()
    }

    /// Looks up a state by name, as an error for patch code.
    ///
    /// # Errors
    ///
    /// [`GraphError::StateNotFound`] if no state has this name.
    pub fn require_state(&self, name: &str) -> Result<StateId, GraphError> {
        self.find_state(name)
            .ok_or_else(|| GraphError::StateNotFound(name.to_owned()))
    }

    /// Returns a state.
    #[must_use]
    pub fn state(&self, id: StateId) -> Option<&State> {
        self.states.get(id.index())
    }

    /// Returns a state for editing.
    pub fn state_mut(&mut self, id: StateId) -> Option<&mut State> {
        self.states.get_mut(id.index())
    }

    pub(crate) fn state_or_err(&self, id: StateId) -> Result<&State, GraphError> {
        self.state(id)
            .ok_or_else(|| GraphError::StateNotFound(id.to_string()))
    }

    pub(crate) fn state_mut_or_err(&mut self, id: StateId) -> Result<&mut State, GraphError> {
        self.states
            .get_mut(id.index())
            .ok_or_else(|| GraphError::StateNotFound(id.to_string()))
    }

    /// Name of a state, or `"?"` for an unknown id.
    #[must_use]
    pub fn state_name(&self, id: StateId) -> &str {
        self.state(id).map_or("?", |s| s.name().as_ref())
    }

    /// Iterates states with their ids.
    pub fn states(&self) -> impl Iterator<Item = (StateId, &State)> {
        self.states
            .iter()
            .enumerate()
            .map(|(i, s)| (StateId::from_index(i), s))
    }

    /// Number of states.
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Marks the state new instances start in.
    ///
    /// # Errors
    ///
    /// [`GraphError::StateNotFound`] for an unknown id.
    pub fn set_entry(&mut self, id: StateId) -> Result<(), GraphError> {
        self.state_or_err(id)?;
        self.entry = Some(id);
        Ok(())
    }

    /// The entry state.
    #[must_use]
    pub fn entry(&self) -> Option<StateId> {
        self.entry
    }

    // ─────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────

    /// Sets `from`'s transition for `event`, overwriting an earlier one.
    ///
    /// Returns the previous target.
    ///
    /// # Errors
    ///
    /// [`GraphError::StateNotFound`] if either state is unknown.
    pub fn set_transition(
        &mut self,
        from: StateId,
        event: EventId,
        target: StateId,
    ) -> Result<Option<StateId>, GraphError> {
        self.state_or_err(target)?;
        Ok(self.state_mut_or_err(from)?.set_transition(event, target))
    }

    /// Appends a transition taken from any state when no state-local one
    /// matches.
    ///
    /// # Errors
    ///
    /// [`GraphError::StateNotFound`] if `target` is unknown.
    pub fn add_global_transition(
        &mut self,
        event: EventId,
        target: StateId,
    ) -> Result<(), GraphError> {
        self.state_or_err(target)?;
        self.global_transitions.push(Transition { event, target });
        Ok(())
    }

    /// Global transitions in evaluation order.
    #[must_use]
    pub fn global_transitions(&self) -> &[Transition] {
        &self.global_transitions
    }

    /// Resolves `event` in `state`: local transitions first, then global
    /// ones. The flag is true for a global match.
    #[must_use]
    pub fn resolve_transition(&self, state: StateId, event: EventId) -> Option<(StateId, bool)> {
        if let Some(target) = self.state(state).and_then(|s| s.transition_for(event)) {
            return Some((target, false));
        }
        self.global_transitions
            .iter()
            .find(|t| t.event == event)
            .map(|t| (t.target, true))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Variables
    // ─────────────────────────────────────────────────────────────────────

    /// Declares a variable, or returns the existing one of the same kind.
    ///
    /// # Errors
    ///
    /// [`GraphError::VariableKindMismatch`] if the name exists with another
    /// kind.
    pub fn declare_variable(
        &mut self,
        name: impl Into<Arc<str>>,
        initial: impl Into<Value>,
    ) -> Result<VariableId, GraphError> {
        let name = name.into();
        let initial = initial.into();
        if let Some(&id) = self.variables_by_name.get(&name) {
            let declared = self.variables[id.index()].kind();
            if declared != initial.kind() {
                return Err(GraphError::VariableKindMismatch {
                    name,
                    expected: declared,
                    found: initial.kind(),
                });
            }
            return Ok(id);
        }
        let id = VariableId::from_index(self.variables.len());
        self.variables_by_name.insert(Arc::clone(&name), id);
        self.variables.push(VariableDecl::new(name, initial));
        Ok(id)
    }

    /// Looks up a variable by name.
    #[must_use]
    pub fn find_variable(&self, name: &str) -> Option<VariableId> {
        self.variables_by_name.get(name).copied()
    }

    /// All declarations, indexed by [`VariableId`].
    #[must_use]
    pub fn variables(&self) -> &[VariableDecl] {
        &self.variables
    }

    // ─────────────────────────────────────────────────────────────────────
    // Validation
    // ─────────────────────────────────────────────────────────────────────

    /// Checks the graph for structural problems and reports all of them.
    ///
    /// # Errors
    ///
    /// Every [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        match self.entry {
            None => errors.push(ValidationError::NoEntryPoint),
            Some(entry) if self.state(entry).is_none() => {
                errors.push(ValidationError::InvalidEntryPoint(entry));
            }
            Some(_) => {}
        }

        for (id, state) in self.states() {
            for transition in state.transitions() {
                if self.state(transition.target).is_none() {
                    errors.push(ValidationError::InvalidTransitionTarget {
                        state: id,
                        event: transition.event,
                        target: transition.target,
                    });
                }
            }
            for (index, action) in state.actions().iter().enumerate() {
                self.validate_action(id, index, action, &mut errors);
            }
        }

        for transition in &self.global_transitions {
            if self.state(transition.target).is_none() {
                errors.push(ValidationError::InvalidGlobalTarget {
                    event: transition.event,
                    target: transition.target,
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_action(
        &self,
        state: StateId,
        index: usize,
        action: &Action,
        errors: &mut Vec<ValidationError>,
    ) {
        for variable in action.variables() {
            if variable.index() >= self.variables.len() {
                errors.push(ValidationError::UnknownVariable {
                    state,
                    action: index,
                    variable,
                });
            }
        }

        if let Action::WeightedRandomDispatch(dispatch) = action {
            if dispatch.candidates.is_empty() {
                errors.push(ValidationError::EmptyDispatch {
                    state,
                    action: index,
                });
            }
            for (candidate, c) in dispatch.candidates.iter().enumerate() {
                if !(c.weight > 0.0 && c.weight.is_finite()) {
                    errors.push(ValidationError::NonPositiveWeight {
                        state,
                        action: index,
                        candidate,
                    });
                }
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ValidationError
// ─────────────────────────────────────────────────────────────────────────────

/// A structural problem reported by [`Graph::validate`].
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The graph has no entry state.
    NoEntryPoint,
    /// The entry references a missing state.
    InvalidEntryPoint(StateId),
    /// A state transition targets a missing state.
    InvalidTransitionTarget {
        /// Source state.
        state: StateId,
        /// Triggering event.
        event: EventId,
        /// The missing target.
        target: StateId,
    },
    /// A global transition targets a missing state.
    InvalidGlobalTarget {
        /// Triggering event.
        event: EventId,
        /// The missing target.
        target: StateId,
    },
    /// An action references an undeclared variable.
    UnknownVariable {
        /// Owning state.
        state: StateId,
        /// Action index.
        action: usize,
        /// The undeclared variable.
        variable: VariableId,
    },
    /// A weighted dispatch has no candidates.
    EmptyDispatch {
        /// Owning state.
        state: StateId,
        /// Action index.
        action: usize,
    },
    /// A dispatch candidate can never be chosen.
    NonPositiveWeight {
        /// Owning state.
        state: StateId,
        /// Action index.
        action: usize,
        /// Candidate index.
        candidate: usize,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NoEntryPoint => write!(f, "graph has no entry state"),
            ValidationError::InvalidEntryPoint(id) => {
                write!(f, "entry references invalid state: {id}")
            }
            ValidationError::InvalidTransitionTarget {
                state,
                event,
                target,
            } => write!(
                f,
                "{state} has a transition on {event} to invalid state: {target}"
            ),
            ValidationError::InvalidGlobalTarget { event, target } => {
                write!(f, "global transition on {event} targets invalid state: {target}")
            }
            ValidationError::UnknownVariable {
                state,
                action,
                variable,
            } => write!(
                f,
                "action {action} of {state} references undeclared variable {variable}"
            ),
            ValidationError::EmptyDispatch { state, action } => {
                write!(f, "weighted dispatch {action} of {state} has no candidates")
            }
            ValidationError::NonPositiveWeight {
                state,
                action,
                candidate,
            } => write!(
                f,
                "candidate {candidate} of weighted dispatch {action} in {state} has no positive weight"
            ),
        }
    }
}

impl core::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Candidate;

    #[test]
    fn first_state_becomes_entry() {
        let mut graph = Graph::new("g");
        assert_eq!(graph.entry(), None);
        let idle = graph.create_state("Idle", "").expect("fresh name");
        let other = graph.create_state("Other", "").expect("fresh name");
        assert_eq!(graph.entry(), Some(idle));
        graph.set_entry(other).expect("known state");
        assert_eq!(graph.entry(), Some(other));
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut graph = Graph::new("g");
        graph.create_state("Idle", "").expect("fresh name");
        let err = graph.create_state("Idle", "again").expect_err("duplicate");
        assert!(matches!(err, GraphError::DuplicateState { .. }));
        assert_eq!(graph.state_count(), 1);
    }

    #[test]
    fn add_states_is_all_or_nothing() {
        let mut graph = Graph::new("g");
        graph.create_state("Idle", "").expect("fresh name");
        let result = graph.add_states([State::new("A"), State::new("Idle")]);
        assert!(result.is_err());
        assert_eq!(graph.find_state("A"), None);

        let result = graph.add_states([State::new("B"), State::new("B")]);
        assert!(result.is_err());

        let ids = graph
            .add_states([State::new("C"), State::new("D")])
            .expect("fresh names");
        assert_eq!(ids.len(), 2);
        assert_eq!(graph.find_state("D"), Some(ids[1]));
    }

    #[test]
    fn global_transitions_follow_local_ones() {
        let mut graph = Graph::new("g");
        let a = graph.create_state("A", "").expect("fresh");
        let b = graph.create_state("B", "").expect("fresh");
        let c = graph.create_state("C", "").expect("fresh");
        graph.set_transition(a, EventId::FINISHED, b).expect("known");
        graph
            .add_global_transition(EventId::FINISHED, c)
            .expect("known");

        assert_eq!(graph.resolve_transition(a, EventId::FINISHED), Some((b, false)));
        assert_eq!(graph.resolve_transition(b, EventId::FINISHED), Some((c, true)));
        assert_eq!(graph.resolve_transition(b, EventId::RECYCLE), None);
    }

    #[test]
    fn declare_variable_is_idempotent_per_kind() {
        let mut graph = Graph::new("g");
        let flag = graph.declare_variable("enraged", false).expect("new");
        assert_eq!(graph.declare_variable("enraged", true), Ok(flag));
        assert!(matches!(
            graph.declare_variable("enraged", 1_i64),
            Err(GraphError::VariableKindMismatch { .. })
        ));
        assert_eq!(graph.find_variable("enraged"), Some(flag));
    }

    #[test]
    fn validate_reports_every_problem() {
        let mut graph = Graph::new("g");
        assert_eq!(graph.validate(), Err(vec![ValidationError::NoEntryPoint]));

        let a = graph.create_state("A", "").expect("fresh");
        let state = graph.state_mut(a).expect("exists");
        state.add_action(Action::weighted_dispatch(Vec::new()));
        state.add_action(Action::weighted_dispatch(vec![Candidate::new(
            EventId::FINISHED,
            0.0,
        )]));
        state.add_action(Action::set_variable(VariableId::from_index(3), true));

        let errors = graph.validate().expect_err("three problems");
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().all(|e| !e.to_string().is_empty()));
    }
}
