use std::sync::Arc;

use choreo_graph::dispatch::Candidate;
use choreo_graph::{Action, ActionTag, EventId, EventRegistry, Graph, GraphError};

use crate::pattern::AttackPattern;

/// One option of an [`AttackSelector`].
#[derive(Debug, Clone, PartialEq)]
pub struct AttackOption {
    /// Event raised when the option is picked.
    pub event: Arc<str>,
    /// State the event leads to.
    pub target: Arc<str>,
    /// Relative weight.
    pub weight: f32,
    /// Times the option may be picked over the instance's lifetime.
    pub max_triggers: u32,
    /// Consecutive misses after which the option is forced. Zero disables.
    pub max_misses: u32,
}

impl AttackOption {
    /// An uncapped option.
    #[must_use]
    pub fn new(event: impl Into<Arc<str>>, target: impl Into<Arc<str>>, weight: f32) -> Self {
        Self {
            event: event.into(),
            target: target.into(),
            weight,
            max_triggers: u32::MAX,
            max_misses: 0,
        }
    }

    /// Caps how often the option is picked.
    #[must_use]
    pub fn with_max_triggers(mut self, max_triggers: u32) -> Self {
        self.max_triggers = max_triggers;
        self
    }

    /// Forces the option after this many misses in a row.
    #[must_use]
    pub fn with_max_misses(mut self, max_misses: u32) -> Self {
        self.max_misses = max_misses;
        self
    }
}

/// Turns a hand-authored decision state into a weighted random choice.
///
/// Authored graphs often carry a placeholder dispatch in their decision
/// state. The selector removes every dispatch action of `state`, puts a
/// weighted random dispatch where the first one was, and wires one
/// transition per option. With [`with_fallback`](Self::with_fallback), the
/// state leaves on `FINISHED` once every option is used up.
#[derive(Debug, Clone)]
pub struct AttackSelector {
    state: Arc<str>,
    options: Vec<AttackOption>,
    fallback: Option<Arc<str>>,
}

impl AttackSelector {
    /// A selector for `state` with no options yet.
    #[must_use]
    pub fn new(state: impl Into<Arc<str>>) -> Self {
        Self {
            state: state.into(),
            options: Vec::new(),
            fallback: None,
        }
    }

    /// Adds an option.
    #[must_use]
    pub fn option(mut self, option: AttackOption) -> Self {
        self.options.push(option);
        self
    }

    /// State entered once every option is exhausted.
    #[must_use]
    pub fn with_fallback(mut self, state: impl Into<Arc<str>>) -> Self {
        self.fallback = Some(state.into());
        self
    }
}

fn is_dispatch(action: &Action) -> bool {
    matches!(
        action.tag(),
        ActionTag::WeightedRandomDispatch | ActionTag::ConditionalDispatch
    )
}

impl AttackPattern for AttackSelector {
    fn install(&self, graph: &mut Graph, events: &EventRegistry) -> Result<(), GraphError> {
        let state = graph.require_state(&self.state)?;

        let mut candidates = Vec::with_capacity(self.options.len());
        for option in &self.options {
            let target = graph.require_state(&option.target)?;
            let event = events.create_event(&option.event);
            graph.set_transition(state, event, target)?;
            candidates.push(
                Candidate::new(event, option.weight)
                    .with_max_triggers(option.max_triggers)
                    .with_max_misses(option.max_misses),
            );
        }
        if let Some(fallback) = &self.fallback {
            let fallback = graph.require_state(fallback)?;
            graph.set_transition(state, EventId::FINISHED, fallback)?;
        }

        let slot = graph
            .state(state)
            .and_then(|s| s.actions().iter().position(is_dispatch));
        let removed = graph.remove_actions(state, is_dispatch);
        let Some(decision) = graph.state_mut(state) else {
            return Err(GraphError::StateNotFound(self.state.to_string()));
        };
        let action = Action::weighted_dispatch(candidates);
        match slot {
            Some(index) => decision.insert_action(index, action),
            None => decision.add_action(action),
        };

        tracing::debug!(
            state = %self.state,
            options = self.options.len(),
            replaced = removed,
            "attack selector installed"
        );
        Ok(())
    }
}
