use std::sync::Arc;

use choreo_graph::{EventRegistry, Graph, GraphError};

use crate::pattern::AttackPattern;

/// A transition into `target` taken from any state on `event`.
///
/// Typical uses are stagger, phase change and death. An existing global
/// transition for the same event is replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalInterrupt {
    event: Arc<str>,
    target: Arc<str>,
}

impl GlobalInterrupt {
    /// Interrupts into `target` when `event` is raised.
    #[must_use]
    pub fn new(event: impl Into<Arc<str>>, target: impl Into<Arc<str>>) -> Self {
        Self {
            event: event.into(),
            target: target.into(),
        }
    }
}

impl AttackPattern for GlobalInterrupt {
    fn install(&self, graph: &mut Graph, events: &EventRegistry) -> Result<(), GraphError> {
        let target = graph.require_state(&self.target)?;
        let event = events.create_event(&self.event);
        graph.remove_global_transitions(|t| t.event == event);
        graph.add_global_transition(event, target)
    }

    fn name(&self) -> &str {
        &self.event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::AttackPatternExt;

    #[test]
    fn replaces_earlier_interrupt() {
        let events = EventRegistry::new();
        let mut graph = Graph::new("boss");
        graph.create_state("Idle", "").unwrap();
        let stagger = graph.create_state("Stagger", "").unwrap();
        let dead = graph.create_state("Dead", "").unwrap();

        assert!(GlobalInterrupt::new("hit", "Stagger").apply(&mut graph, &events));
        assert!(GlobalInterrupt::new("hit", "Dead").apply(&mut graph, &events));
        assert!(!GlobalInterrupt::new("hit", "Gone").apply(&mut graph, &events));

        let hit = events.find_event("hit").unwrap();
        let idle = graph.find_state("Idle").unwrap();
        assert_eq!(graph.global_transitions().len(), 1);
        assert_eq!(graph.resolve_transition(idle, hit), Some((dead, true)));
        assert_ne!(Some(stagger), graph.resolve_transition(idle, hit).map(|(s, _)| s));
    }
}
