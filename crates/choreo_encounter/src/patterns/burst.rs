use std::sync::Arc;
use std::time::Duration;

use choreo_graph::action::HostArg;
use choreo_graph::{Action, EventId, EventRegistry, Graph, GraphError, State};

use crate::pattern::AttackPattern;

/// Splices a telegraphed burst between two connected states.
///
/// `from → to` becomes `from → {name}.Windup → {name}.Burst → to`. The
/// windup waits, the burst fires `shots` host calls named `cue` and waits
/// `recovery` before handing control to `to`.
#[derive(Debug, Clone)]
pub struct BurstAttack {
    name: Arc<str>,
    from: Arc<str>,
    to: Arc<str>,
    windup: Duration,
    recovery: Duration,
    shots: u32,
    cue: Arc<str>,
}

impl BurstAttack {
    /// A burst named `name` on the path from `from` to `to`.
    #[must_use]
    pub fn new(
        name: impl Into<Arc<str>>,
        from: impl Into<Arc<str>>,
        to: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            name: name.into(),
            from: from.into(),
            to: to.into(),
            windup: Duration::from_millis(600),
            recovery: Duration::from_millis(400),
            shots: 1,
            cue: Arc::from("fire"),
        }
    }

    /// Telegraph time before the burst.
    #[must_use]
    pub fn with_windup(mut self, windup: Duration) -> Self {
        self.windup = windup;
        self
    }

    /// Time spent in the burst state after firing.
    #[must_use]
    pub fn with_recovery(mut self, recovery: Duration) -> Self {
        self.recovery = recovery;
        self
    }

    /// Host calls made on entering the burst.
    #[must_use]
    pub fn with_shots(mut self, shots: u32, cue: impl Into<Arc<str>>) -> Self {
        self.shots = shots;
        self.cue = cue.into();
        self
    }

    /// Names of the two inserted states.
    #[must_use]
    pub fn state_names(&self) -> [String; 2] {
        [format!("{}.Windup", self.name), format!("{}.Burst", self.name)]
    }
}

impl AttackPattern for BurstAttack {
    fn install(&self, graph: &mut Graph, _events: &EventRegistry) -> Result<(), GraphError> {
        let from = graph.require_state(&self.from)?;
        let to = graph.require_state(&self.to)?;
        let [windup_name, burst_name] = self.state_names();

        let windup = State::new(windup_name)
            .with_description("burst telegraph")
            .with_action(Action::invoke_host(
                "telegraph",
                vec![HostArg::Text(Arc::clone(&self.name))],
            ))
            .with_action(Action::wait(self.windup, EventId::FINISHED));

        let mut burst = State::new(burst_name).with_description("burst");
        for shot in 0..self.shots {
            burst.add_action(Action::invoke_host(
                Arc::clone(&self.cue),
                vec![
                    HostArg::Text(Arc::clone(&self.name)),
                    HostArg::Value(i64::from(shot).into()),
                ],
            ));
        }
        burst.add_action(Action::wait(self.recovery, EventId::FINISHED));

        graph.splice_state(from, to, vec![windup, burst])?;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
