//! Named sequence factories started by host calls.
//!
//! A boss graph starts a routine with an `InvokeHost` action whose name is
//! registered here. The call's resolved arguments reach the factory as a
//! [`RoutineCall`]; an `Event` argument doubles as the routine's completion
//! event unless the factory sets one itself.

use std::fmt;
use std::sync::Arc;

use choreo_graph::event::EventId;
use choreo_graph::host::{HostValue, Placement};
use choreo_sequence::{OwnerId, Sequence};
use hashbrown::HashMap;

use crate::arena::Arena;

/// Builds the sequence for one routine call.
pub type RoutineFactory = Arc<dyn Fn(&RoutineCall) -> Sequence<Arena> + Send + Sync>;

/// A host call that matched a registered routine.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutineCall {
    /// Routine name.
    pub name: Arc<str>,
    /// Owner the started sequence belongs to.
    pub owner: OwnerId,
    /// Arguments as resolved by the graph executor.
    pub args: Vec<HostValue>,
}

impl RoutineCall {
    /// The first event argument.
    #[must_use]
    pub fn completion(&self) -> Option<EventId> {
        self.args.iter().find_map(HostValue::as_event)
    }

    /// The first placement argument the provider could resolve.
    #[must_use]
    pub fn placement(&self) -> Option<Placement> {
        self.args.iter().find_map(|arg| match arg {
            HostValue::Placement(placement) => *placement,
            _ => None,
        })
    }

    /// The first text argument.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.args.iter().find_map(HostValue::as_text)
    }
}

/// A named routine.
#[derive(Clone)]
pub struct Routine {
    name: Arc<str>,
    factory: RoutineFactory,
}

impl Routine {
    /// Creates a routine.
    pub fn new(
        name: impl Into<Arc<str>>,
        factory: impl Fn(&RoutineCall) -> Sequence<Arena> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            factory: Arc::new(factory),
        }
    }

    /// The routine's name.
    #[must_use]
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    /// Builds the sequence for `call`.
    #[must_use]
    pub fn build(&self, call: &RoutineCall) -> Sequence<Arena> {
        (self.factory)(call)
    }
}

impl fmt::Debug for Routine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Routine")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Routine registry of one encounter.
#[derive(Debug, Clone, Default)]
pub struct Routines {
    routines: HashMap<Arc<str>, Routine>,
}

impl Routines {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `routine`, returning the one it replaced.
    pub fn register(&mut self, routine: Routine) -> Option<Routine> {
        let previous = self.routines.insert(Arc::clone(&routine.name), routine);
        if let Some(previous) = &previous {
            tracing::debug!(routine = %previous.name, "routine replaced");
        }
        previous
    }

    /// Looks a routine up by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Routine> {
        self.routines.get(name)
    }

    /// Returns true if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.routines.contains_key(name)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<Arc<str>> {
        let mut names: Vec<_> = self.routines.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered routines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routines.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use choreo_graph::event::EventRegistry;
    use glam::Vec3;

    fn call(args: Vec<HostValue>) -> RoutineCall {
        RoutineCall {
            name: Arc::from("volley"),
            owner: OwnerId::new(7),
            args,
        }
    }

    #[test]
    fn call_argument_accessors() {
        let events = EventRegistry::new();
        let done = events.create_event("volley.done");
        let call = call(vec![
            HostValue::Placement(None),
            HostValue::Text(Arc::from("orb")),
            HostValue::Placement(Some(Placement::at(Vec3::X))),
            HostValue::Event(done),
        ]);

        assert_eq!(call.completion(), Some(done));
        assert_eq!(call.text(), Some("orb"));
        assert_eq!(call.placement().map(|p| p.position), Some(Vec3::X));
    }

    #[test]
    fn registry_replaces_by_name() {
        let mut routines = Routines::new();
        let first = Routine::new("volley", |call| Sequence::new("first", call.owner));
        let second = Routine::new("volley", |call| Sequence::new("second", call.owner));

        assert!(routines.register(first).is_none());
        assert!(routines.register(second).is_some());
        assert_eq!(routines.len(), 1);

        let built = routines
            .get("volley")
            .map(|routine| routine.build(&call(Vec::new())));
        assert_eq!(built.as_ref().map(|s| &**s.name()), Some("second"));
        assert_eq!(built.map(|s| s.owner()), Some(OwnerId::new(7)));
    }
}
