//! Error types for graph construction, patching and variable access.

use std::sync::Arc;

use crate::action::ActionTag;
use crate::variable::ValueKind;

/// Errors raised while building, patching or mutating a graph.
///
/// None of these are fatal to a running encounter. Patch code reports them
/// through [`Graph::apply_patch`](crate::graph::Graph::apply_patch), which
/// logs the failure and leaves the graph as it was before the failing step.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// A state with this name already exists in the graph.
    #[error("state '{name}' already exists in graph '{graph}'")]
    DuplicateState {
        /// Name of the graph.
        graph: Arc<str>,
        /// The duplicated state name.
        name: Arc<str>,
    },

    /// No state matches the given name or id.
    #[error("state not found: {0}")]
    StateNotFound(String),

    /// No event with this name has been created.
    #[error("event not found: {0}")]
    EventNotFound(String),

    /// `clone_action` found no action matching tag, index and predicate.
    #[error("no {tag} action at match index {index} in state '{state}'")]
    ActionNotFound {
        /// The searched state.
        state: Arc<str>,
        /// The requested action tag.
        tag: ActionTag,
        /// The requested match index.
        index: usize,
    },

    /// No variable with this name or id is declared.
    #[error("variable not found: {0}")]
    VariableNotFound(String),

    /// A variable was written or redeclared with a value of another kind.
    #[error("variable '{name}' holds {expected}, got {found}")]
    VariableKindMismatch {
        /// The variable name.
        name: Arc<str>,
        /// The declared kind.
        expected: ValueKind,
        /// The kind that was supplied.
        found: ValueKind,
    },

    /// A splice was requested between two states that are not connected.
    #[error("state '{from}' has no transition to '{to}'")]
    NoTransitionBetween {
        /// Source state name.
        from: Arc<str>,
        /// Target state name.
        to: Arc<str>,
    },

    /// An instance was requested for a graph without an entry state.
    #[error("graph '{0}' has no entry state")]
    NoEntryState(Arc<str>),
}
