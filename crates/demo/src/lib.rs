//! Example boss encounter built with Choreo.
//!
//! The warden is authored as a small graph and then patched with stock
//! attack patterns:
//!
//! ```text
//! Idle ──▶ Decide ── lunge ──▶ Lunge ──▶ Slam.Windup ──▶ Slam.Burst ──▶ Idle
//!            │
//!            ├──── volley ──▶ Volley (spawns orbs) ── Volley.done ──▶ Idle
//!            │
//!            └─ exhausted ──▶ Rest ──▶ Idle
//!
//! any state ── stagger ──▶ Stagger ──▶ Idle
//! ```

use std::sync::Arc;
use std::time::Duration;

use choreo_encounter::prelude::*;
use choreo_graph::prelude::*;
use choreo_pool::prelude::*;
use glam::Vec3;

/// Name of the projectile template.
pub const ORB: &str = "orb";

/// Logs every host call instead of driving a renderer.
#[derive(Debug, Default)]
pub struct LoggingHost {
    calls: usize,
}

impl LoggingHost {
    /// Number of calls received.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl HostInvoker for LoggingHost {
    fn invoke_host(&mut self, name: &str, args: &[HostValue]) {
        self.calls += 1;
        tracing::info!(call = name, ?args, "host call");
    }
}

fn timed(
    graph: &mut Graph,
    name: &str,
    description: &str,
    wait: Duration,
) -> Result<StateId, GraphError> {
    let state = graph.create_state(name, description)?;
    if let Some(state) = graph.state_mut(state) {
        state.add_action(Action::wait(wait, EventId::FINISHED));
    }
    Ok(state)
}

/// The hand-authored warden, before any pattern is applied.
///
/// # Errors
///
/// Only if the graph itself is malformed.
pub fn authored_warden(events: &EventRegistry) -> Result<Graph, GraphError> {
    let mut graph = Graph::new("warden");
    let idle = timed(&mut graph, "Idle", "catching breath", Duration::from_millis(800))?;
    let decide = graph.create_state("Decide", "picks the next attack")?;
    let lunge = timed(&mut graph, "Lunge", "closes the gap", Duration::from_millis(300))?;
    let rest = timed(&mut graph, "Rest", "out of ideas", Duration::from_secs(2))?;
    let stagger = timed(&mut graph, "Stagger", "reeling", Duration::from_secs(1))?;

    let placeholder = events.create_event("placeholder");
    if let Some(state) = graph.state_mut(decide) {
        state.add_action(Action::weighted_dispatch(vec![Candidate::new(placeholder, 1.0)]));
    }
    graph.set_transition(idle, EventId::FINISHED, decide)?;
    graph.set_transition(lunge, EventId::FINISHED, idle)?;
    graph.set_transition(rest, EventId::FINISHED, idle)?;
    graph.set_transition(stagger, EventId::FINISHED, idle)?;
    Ok(graph)
}

/// The patterns turning the authored warden into the real fight, in the
/// order they must be applied.
#[must_use]
pub fn warden_patterns() -> Vec<Box<dyn AttackPattern>> {
    vec![
        Box::new(
            BurstAttack::new("Slam", "Lunge", "Idle")
                .with_windup(Duration::from_millis(500))
                .with_shots(2, "slam"),
        ),
        Box::new(volley()),
        Box::new(
            AttackSelector::new("Decide")
                .option(AttackOption::new("lunge", "Lunge", 3.0).with_max_misses(3))
                .option(AttackOption::new("volley", "Volley", 1.0).with_max_triggers(4))
                .with_fallback("Rest"),
        ),
        Box::new(GlobalInterrupt::new("stagger", "Stagger")),
    ]
}

fn volley() -> ProjectileArray {
    ProjectileArray::new("Volley", ORB)
        .entered_from("Decide", "volley")
        .then("Idle")
        .with_volley(6, Duration::from_millis(120))
}

/// The warden with every pattern applied. Returns the graph and the number
/// of patterns that installed.
///
/// # Errors
///
/// Only if the authored graph is malformed.
pub fn warden(events: &EventRegistry) -> Result<(Graph, usize), GraphError> {
    let mut graph = authored_warden(events)?;
    let patterns = warden_patterns();
    let refs: Vec<&dyn AttackPattern> = patterns.iter().map(Box::as_ref).collect();
    let applied = apply_patterns(&mut graph, events, &refs);
    Ok((graph, applied))
}

/// `Fly` for a while, then `Explode` and return to the pool.
///
/// # Errors
///
/// Only if the graph itself is malformed.
pub fn orb_template() -> Result<Template, GraphError> {
    let mut graph = Graph::new(ORB);
    let fly = timed(&mut graph, "Fly", "in flight", Duration::from_millis(800))?;
    let explode = graph.create_state("Explode", "detonates")?;
    if let Some(state) = graph.state_mut(explode) {
        state
            .add_action(Action::invoke_host("explode", vec![HostArg::Text(Arc::from(ORB))]))
            .add_action(Action::send_event(EventId::RECYCLE));
    }
    graph.set_transition(fly, EventId::FINISHED, explode)?;
    Ok(Template::new(ORB, graph))
}

/// Where the warden stands.
#[must_use]
pub fn arena_placements() -> StaticPlacements {
    StaticPlacements::new().with("boss", Placement::at(Vec3::new(0.0, 1.5, 12.0)))
}

/// Registers the routines the warden's patterns ship.
pub fn register_routines(encounter: &mut Encounter) {
    for pattern in warden_patterns() {
        encounter.register_pattern(pattern.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_pattern_installs() {
        let events = EventRegistry::new();
        let (graph, applied) = warden(&events).unwrap();

        assert_eq!(applied, warden_patterns().len());
        assert!(graph.validate().is_ok());
        for name in ["Slam.Windup", "Slam.Burst", "Volley", "Stagger"] {
            assert!(graph.find_state(name).is_some(), "{name} missing");
        }
    }

    #[test]
    fn volley_routine_is_registered() {
        let events = EventRegistry::new();
        let (graph, _) = warden(&events).unwrap();
        let boss = GraphInstance::with_seed(Arc::new(graph), 1).unwrap();
        let templates = StaticTemplates::new().with(orb_template().unwrap());
        let pool = EntityPool::new(Arc::new(templates), PoolConfig::default());
        let mut encounter = Encounter::new(boss, pool);
        register_routines(&mut encounter);

        assert_eq!(encounter.routines().names(), vec![Arc::<str>::from("Volley")]);
    }

    #[test]
    fn logging_host_counts_calls() {
        let mut host = LoggingHost::default();
        host.invoke_host("slam", &[]);
        assert_eq!(host.calls(), 1);
    }
}
