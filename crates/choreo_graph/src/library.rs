//! Named, reusable action templates.
//!
//! Hand-authored states often carry actions tuned by a designer: a camera
//! shake with the right falloff, a velocity setter with the right curve.
//! [`ActionLibrary::harvest`] copies such an action out of a graph once, and
//! patterns then [`instantiate`](ActionLibrary::instantiate) fresh copies
//! wherever they need one.

use std::sync::Arc;

use choreo_system::api::API;
use hashbrown::HashMap;
use parking_lot::RwLock;

use crate::action::{Action, ActionTag};
use crate::error::GraphError;
use crate::graph::Graph;
use crate::state::StateId;

/// Registry of action templates, keyed by name.
#[derive(Debug, Default)]
pub struct ActionLibrary {
    templates: RwLock<HashMap<Arc<str>, Action>>,
}

impl API for ActionLibrary {}

impl ActionLibrary {
    /// Creates an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a template, returning the one it replaced.
    pub fn register(&self, name: impl Into<Arc<str>>, action: Action) -> Option<Action> {
        self.templates.write().insert(name.into(), action)
    }

    /// Returns a fresh copy of a template.
    #[must_use]
    pub fn instantiate(&self, name: &str) -> Option<Action> {
        self.templates.read().get(name).cloned()
    }

    /// Copies an action out of `graph` and stores it under `name`.
    ///
    /// # Errors
    ///
    /// Whatever [`Graph::clone_action`] reports. Nothing is stored then.
    pub fn harvest(
        &self,
        name: impl Into<Arc<str>>,
        graph: &Graph,
        state: StateId,
        tag: ActionTag,
        match_index: usize,
        predicate: Option<&dyn Fn(&Action) -> bool>,
    ) -> Result<(), GraphError> {
        let action = graph.clone_action(state, tag, match_index, predicate)?;
        self.register(name, action);
        Ok(())
    }

    /// Returns true if a template has this name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.templates.read().contains_key(name)
    }

    /// Template names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<Arc<str>> {
        let mut names: Vec<_> = self.templates.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.read().len()
    }

    /// Returns true if no templates are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.read().is_empty()
    }

    /// Drops every template.
    pub fn clear(&self) {
        self.templates.write().clear();
    }
}
