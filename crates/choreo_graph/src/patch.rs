//! Live patching of authored graphs.
//!
//! Attack patterns extend a graph that already works on its own: they insert
//! states between two existing ones, redirect a few transitions, borrow fully
//! configured actions from hand-authored states, and strip behavior that the
//! new states replace. Each patch step is either applied completely or not at
//! all. Run steps through [`Graph::apply_patch`] so a failing step is logged
//! and skipped while the graph stays usable.
//!
//! ```
//! # use choreo_graph::prelude::*;
//! # use core::time::Duration;
//! let mut graph = Graph::new("boss");
//! let idle = graph.create_state("Idle", "").unwrap();
//! let attack = graph.create_state("Attack", "").unwrap();
//! graph.set_transition(idle, EventId::FINISHED, attack).unwrap();
//!
//! let applied = graph.apply_patch("windup", |g| {
//!     let windup = State::new("Windup")
//!         .with_action(Action::wait(Duration::from_millis(300), EventId::FINISHED));
//!     g.splice_state(idle, attack, vec![windup])?;
//!     Ok(())
//! });
//! assert!(applied);
//!
//! let windup = graph.find_state("Windup").unwrap();
//! assert_eq!(graph.resolve_transition(idle, EventId::FINISHED), Some((windup, false)));
//! ```

use std::sync::Arc;

use crate::action::{Action, ActionTag};
use crate::error::GraphError;
use crate::event::EventId;
use crate::graph::Graph;
use crate::state::{State, StateId, Transition};

impl Graph {
    /// Copies the `match_index`-th action tagged `tag` in `state` that also
    /// satisfies `predicate`.
    ///
    /// # Errors
    ///
    /// [`GraphError::StateNotFound`] for an unknown state and
    /// [`GraphError::ActionNotFound`] when fewer than `match_index + 1`
    /// actions match.
    pub fn clone_action(
        &self,
        state: StateId,
        tag: ActionTag,
        match_index: usize,
        predicate: Option<&dyn Fn(&Action) -> bool>,
    ) -> Result<Action, GraphError> {
        let source = self.state_or_err(state)?;
        source
            .actions()
            .iter()
            .filter(|action| action.tag() == tag)
            .filter(|action| predicate.is_none_or(|p| p(*action)))
            .nth(match_index)
            .cloned()
            .ok_or_else(|| GraphError::ActionNotFound {
                state: Arc::clone(source.name()),
                tag,
                index: match_index,
            })
    }

    /// Inserts `new_states` on the path from `from` to `to`.
    ///
    /// Every transition of `from` that targeted `to` now enters the first new
    /// state. Each new state moves to the next on `FINISHED`, and the last
    /// one moves on to `to`. Other transitions into `to` are untouched. Other
    /// transitions the new states carry are kept.
    ///
    /// Returns the ids of the inserted states. An empty list changes nothing.
    ///
    /// # Errors
    ///
    /// [`GraphError::StateNotFound`], [`GraphError::NoTransitionBetween`] and
    /// [`GraphError::DuplicateState`]. The graph is unchanged on error.
    pub fn splice_state(
        &mut self,
        from: StateId,
        to: StateId,
        new_states: Vec<State>,
    ) -> Result<Vec<StateId>, GraphError> {
        let source = self.state_or_err(from)?;
        let target = self.state_or_err(to)?;
        if !source.transitions().iter().any(|t| t.target == to) {
            return Err(GraphError::NoTransitionBetween {
                from: Arc::clone(source.name()),
                to: Arc::clone(target.name()),
            });
        }
        if new_states.is_empty() {
            return Ok(Vec::new());
        }

        let ids = self.add_states(new_states)?;
        let first = ids[0];

        for transition in self.states[from.index()].transitions_mut() {
            if transition.target == to {
                transition.target = first;
            }
        }

        for pair in ids.windows(2) {
            self.states[pair[0].index()].set_transition(EventId::FINISHED, pair[1]);
        }
        if let Some(last) = ids.last() {
            self.states[last.index()].set_transition(EventId::FINISHED, to);
        }

        tracing::debug!(
            graph = %self.name(),
            from = %self.state_name(from),
            to = %self.state_name(to),
            inserted = ids.len(),
            "spliced states"
        );
        Ok(ids)
    }

    /// Points every transition of `state` matching `predicate` at `target`.
    ///
    /// Returns how many transitions changed.
    ///
    /// # Errors
    ///
    /// [`GraphError::StateNotFound`] if either state is unknown.
    pub fn redirect_transitions(
        &mut self,
        state: StateId,
        mut predicate: impl FnMut(&Transition) -> bool,
        target: StateId,
    ) -> Result<usize, GraphError> {
        self.state_or_err(target)?;
        let mut changed = 0;
        for transition in self.state_mut_or_err(state)?.transitions_mut() {
            if predicate(transition) {
                transition.target = target;
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// Removes the transitions of `state` matching `predicate`.
    ///
    /// Unknown states and zero matches are not errors.
    pub fn remove_transitions(
        &mut self,
        state: StateId,
        predicate: impl FnMut(&Transition) -> bool,
    ) -> usize {
        self.state_mut(state)
            .map_or(0, |s| s.remove_transitions(predicate))
    }

    /// Removes the actions of `state` matching `predicate`.
    ///
    /// Unknown states and zero matches are not errors.
    pub fn remove_actions(
        &mut self,
        state: StateId,
        predicate: impl FnMut(&Action) -> bool,
    ) -> usize {
        self.state_mut(state).map_or(0, |s| s.remove_actions(predicate))
    }

    /// Removes the global transitions matching `predicate`.
    pub fn remove_global_transitions(
        &mut self,
        mut predicate: impl FnMut(&Transition) -> bool,
    ) -> usize {
        let before = self.global_transitions.len();
        self.global_transitions.retain(|t| !predicate(t));
        before - self.global_transitions.len()
    }

    /// Runs one patch step against a copy and keeps it only if it succeeds.
    ///
    /// Returns whether the step was applied. Failures are logged with
    /// `label` and otherwise ignored.
    pub fn apply_patch(
        &mut self,
        label: &str,
        patch: impl FnOnce(&mut Graph) -> Result<(), GraphError>,
    ) -> bool {
        let mut draft = self.clone();
        match patch(&mut draft) {
            Ok(()) => {
                *self = draft;
                tracing::debug!(graph = %self.name(), patch = label, "patch applied");
                true
            }
            Err(error) => {
                tracing::warn!(
                    graph = %self.name(),
                    patch = label,
                    %error,
                    "patch skipped"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::time::Duration;

    fn chain() -> (Graph, StateId, StateId, StateId) {
        let mut graph = Graph::new("g");
        let a = graph.create_state("A", "").expect("fresh");
        let b = graph.create_state("B", "").expect("fresh");
        let c = graph.create_state("C", "").expect("fresh");
        graph.set_transition(a, EventId::FINISHED, b).expect("known");
        graph.set_transition(c, EventId::FINISHED, b).expect("known");
        (graph, a, b, c)
    }

    #[test]
    fn clone_action_honours_index_and_predicate() {
        let (mut graph, a, _, _) = chain();
        let state = graph.state_mut(a).expect("exists");
        state.add_action(Action::wait(Duration::from_secs(1), EventId::FINISHED));
        state.add_action(Action::send_event(EventId::RECYCLE));
        state.add_action(Action::wait(Duration::from_secs(2), EventId::FINISHED));

        let second = graph
            .clone_action(a, ActionTag::Wait, 1, None)
            .expect("two waits");
        assert_eq!(
            second,
            Action::wait(Duration::from_secs(2), EventId::FINISHED)
        );

        let long = |action: &Action| {
            matches!(action, Action::Wait(w) if w.duration > Duration::from_millis(1500))
        };
        let only = graph
            .clone_action(a, ActionTag::Wait, 0, Some(&long))
            .expect("one long wait");
        assert_eq!(only, second);

        let err = graph
            .clone_action(a, ActionTag::Wait, 1, Some(&long))
            .expect_err("no second long wait");
        assert!(matches!(err, GraphError::ActionNotFound { index: 1, .. }));
    }

    #[test]
    fn splice_only_rewrites_the_named_edge() {
        let (mut graph, a, b, c) = chain();
        let ids = graph
            .splice_state(a, b, vec![State::new("X"), State::new("Y")])
            .expect("edge exists");
        let (x, y) = (ids[0], ids[1]);

        assert_eq!(graph.resolve_transition(a, EventId::FINISHED), Some((x, false)));
        assert_eq!(graph.resolve_transition(x, EventId::FINISHED), Some((y, false)));
        assert_eq!(graph.resolve_transition(y, EventId::FINISHED), Some((b, false)));
        assert_eq!(graph.resolve_transition(c, EventId::FINISHED), Some((b, false)));
    }

    #[test]
    fn splice_without_edge_changes_nothing() {
        let (mut graph, a, b, c) = chain();
        let err = graph
            .splice_state(a, c, vec![State::new("X")])
            .expect_err("no A -> C edge");
        assert!(matches!(err, GraphError::NoTransitionBetween { .. }));
        assert_eq!(graph.find_state("X"), None);

        let ids = graph.splice_state(c, b, Vec::new());
        assert_eq!(ids, Ok(Vec::new()));
    }

    #[test]
    fn apply_patch_rolls_back_partial_work() {
        let (mut graph, a, _, _) = chain();
        let applied = graph.apply_patch("half", |g| {
            g.create_state("Half", "")?;
            g.require_state("Missing")?;
            Ok(())
        });
        assert!(!applied);
        assert_eq!(graph.find_state("Half"), None);
        assert_eq!(graph.state_count(), 3);

        let applied = graph.apply_patch("strip", |g| {
            g.remove_transitions(a, |_| true);
            Ok(())
        });
        assert!(applied);
        assert!(graph.state(a).expect("A").transitions().is_empty());
    }

    #[test]
    fn redirect_and_remove_helpers() {
        let (mut graph, a, b, c) = chain();
        let changed = graph
            .redirect_transitions(c, |t| t.event == EventId::FINISHED, a)
            .expect("known states");
        assert_eq!(changed, 1);
        assert_eq!(graph.resolve_transition(c, EventId::FINISHED), Some((a, false)));

        graph.add_global_transition(EventId::RECYCLE, b).expect("known");
        assert_eq!(graph.remove_global_transitions(|t| t.target == b), 1);
        assert_eq!(graph.remove_global_transitions(|t| t.target == b), 0);
        assert_eq!(graph.remove_actions(StateId::from_index(42), |_| true), 0);
    }
}
