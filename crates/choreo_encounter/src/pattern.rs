//! Attack patterns: reusable patches over a hand-authored boss graph.
//!
//! A designer authors the skeleton of a boss (idle, phase states, the
//! transitions between them). Patterns then splice attacks into it. Each
//! pattern is one patch step: if it fails, for example because the state
//! it targets was renamed, it is skipped and logged and the rest of the
//! boss still loads.
//!
//! ```
//! use choreo_encounter::{AttackPattern, AttackPatternExt};
//! use choreo_graph::{EventRegistry, Graph, GraphError};
//!
//! struct Enrage;
//!
//! impl AttackPattern for Enrage {
//!     fn install(&self, graph: &mut Graph, events: &EventRegistry) -> Result<(), GraphError> {
//!         let enraged = graph.create_state("Enraged", "")?;
//!         graph.add_global_transition(events.create_event("enrage"), enraged)
//!     }
//! }
//!
//! let events = EventRegistry::new();
//! let mut graph = Graph::new("boss");
//! graph.create_state("Idle", "").unwrap();
//!
//! assert!(Enrage.apply(&mut graph, &events));
//! assert!(!Enrage.apply(&mut graph, &events)); // "Enraged" exists now
//! ```

use choreo_graph::{EventRegistry, Graph, GraphError};

use crate::routine::Routine;

/// A patch that adds an attack to a boss graph.
///
/// Patterns are builders, not executors: `install` edits the graph once,
/// and any runtime behavior it needs ships as [`routines`](Self::routines)
/// for the encounter to register.
pub trait AttackPattern: Send + Sync + 'static {
    /// Edits `graph`. Events are created in `events`.
    ///
    /// # Errors
    ///
    /// Any [`GraphError`] from the edit. Through
    /// [`AttackPatternExt::apply`] the graph is then left unchanged.
    fn install(&self, graph: &mut Graph, events: &EventRegistry) -> Result<(), GraphError>;

    /// Name used in logs. Defaults to the type name.
    fn name(&self) -> &str {
        core::any::type_name::<Self>()
    }

    /// Routines the installed states start.
    fn routines(&self) -> Vec<Routine> {
        Vec::new()
    }
}

/// Applies patterns as single patch steps.
pub trait AttackPatternExt: AttackPattern {
    /// Installs the pattern through [`Graph::apply_patch`]. Returns whether
    /// it was applied.
    fn apply(&self, graph: &mut Graph, events: &EventRegistry) -> bool {
        graph.apply_patch(self.name(), |graph| self.install(graph, events))
    }
}

impl<T: AttackPattern + ?Sized> AttackPatternExt for T {}

/// Applies `patterns` in order and returns how many were applied.
pub fn apply_patterns(
    graph: &mut Graph,
    events: &EventRegistry,
    patterns: &[&dyn AttackPattern],
) -> usize {
    let applied = patterns
        .iter()
        .filter(|pattern| pattern.apply(graph, events))
        .count();
    tracing::debug!(
        graph = %graph.name(),
        applied,
        skipped = patterns.len() - applied,
        "attack patterns applied"
    );
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use choreo_graph::EventId;

    struct AddState(&'static str);

    impl AttackPattern for AddState {
        fn install(&self, graph: &mut Graph, _events: &EventRegistry) -> Result<(), GraphError> {
            graph.create_state(self.0, "").map(|_| ())
        }
    }

    /// Adds a state, then fails.
    struct HalfDone;

    impl AttackPattern for HalfDone {
        fn install(&self, graph: &mut Graph, _events: &EventRegistry) -> Result<(), GraphError> {
            let orphan = graph.create_state("Orphan", "")?;
            let missing = graph.require_state("Missing")?;
            graph.set_transition(orphan, EventId::FINISHED, missing).map(|_| ())
        }

        fn name(&self) -> &str {
            "half-done"
        }
    }

    #[test]
    fn failing_pattern_leaves_graph_untouched() {
        let events = EventRegistry::new();
        let mut graph = Graph::new("boss");
        graph.create_state("Idle", "").unwrap();

        assert!(!HalfDone.apply(&mut graph, &events));
        assert!(graph.find_state("Orphan").is_none());
        assert_eq!(graph.state_count(), 1);
    }

    #[test]
    fn apply_patterns_counts_successes() {
        let events = EventRegistry::new();
        let mut graph = Graph::new("boss");

        let applied = apply_patterns(
            &mut graph,
            &events,
            &[&AddState("A"), &HalfDone, &AddState("A"), &AddState("B")],
        );

        assert_eq!(applied, 2);
        assert_eq!(graph.state_count(), 2);
    }

    #[test]
    fn default_name_and_routines() {
        assert!(AddState("A").name().ends_with("AddState"));
        assert!(AddState("A").routines().is_empty());
        assert_eq!(HalfDone.name(), "half-done");
    }
}
