use std::sync::Arc;
use std::time::Duration;

use choreo_graph::action::HostArg;
use choreo_graph::host::Placement;
use choreo_graph::{Action, EventRegistry, Graph, GraphError, State};
use choreo_pool::Transform;
use choreo_sequence::Sequence;
use glam::Quat;

use crate::arena::Arena;
use crate::pattern::AttackPattern;
use crate::routine::Routine;

/// A state that fires a fan of pooled projectiles.
///
/// Installs `{name}` entered from `from` on `trigger`. On entry it starts
/// the `{name}` routine, which acquires `count` projectiles of `template`
/// one `interval` apart, fanned over `spread` radians around the `origin`
/// placement's facing. When the last one is out the routine raises
/// `{name}.done`, and the state moves on to `then`.
#[derive(Debug, Clone)]
pub struct ProjectileArray {
    name: Arc<str>,
    from: Arc<str>,
    trigger: Arc<str>,
    then: Arc<str>,
    template: Arc<str>,
    origin: Arc<str>,
    count: u32,
    interval: Duration,
    spread: f32,
}

impl ProjectileArray {
    /// A volley named `name` of `template` projectiles.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>, template: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            from: Arc::from("Idle"),
            trigger: Arc::from("volley"),
            then: Arc::from("Idle"),
            template: template.into(),
            origin: Arc::from("boss"),
            count: 5,
            interval: Duration::from_millis(100),
            spread: core::f32::consts::FRAC_PI_2,
        }
    }

    /// Entered from `from` when `trigger` is raised.
    #[must_use]
    pub fn entered_from(mut self, from: impl Into<Arc<str>>, trigger: impl Into<Arc<str>>) -> Self {
        self.from = from.into();
        self.trigger = trigger.into();
        self
    }

    /// State entered once the volley is out.
    #[must_use]
    pub fn then(mut self, then: impl Into<Arc<str>>) -> Self {
        self.then = then.into();
        self
    }

    /// Placement the projectiles are fired from.
    #[must_use]
    pub fn from_placement(mut self, origin: impl Into<Arc<str>>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Number of projectiles and the time between two of them.
    #[must_use]
    pub fn with_volley(mut self, count: u32, interval: Duration) -> Self {
        self.count = count;
        self.interval = interval;
        self
    }

    /// Fan width in radians.
    #[must_use]
    pub fn with_spread(mut self, spread: f32) -> Self {
        self.spread = spread;
        self
    }

    /// Name of the completion event.
    #[must_use]
    pub fn done_event(&self) -> String {
        format!("{}.done", self.name)
    }

    /// Yaw offset of projectile `index`, centred on the facing.
    fn yaw(&self, index: u32) -> f32 {
        if self.count < 2 {
            return 0.0;
        }
        let t = index as f32 / (self.count - 1) as f32;
        -self.spread / 2.0 + self.spread * t
    }

    fn aim(&self, origin: Placement, index: u32) -> Transform {
        Transform {
            position: origin.position,
            orientation: origin.orientation * Quat::from_rotation_y(self.yaw(index)),
        }
    }
}

impl AttackPattern for ProjectileArray {
    fn install(&self, graph: &mut Graph, events: &EventRegistry) -> Result<(), GraphError> {
        let from = graph.require_state(&self.from)?;
        let then = graph.require_state(&self.then)?;
        let trigger = events.create_event(&self.trigger);
        let done = events.create_event(&self.done_event());

        let volley = graph.add_state(
            State::new(Arc::clone(&self.name))
                .with_description("projectile volley")
                .with_action(Action::invoke_host(
                    Arc::clone(&self.name),
                    vec![
                        HostArg::Text(Arc::clone(&self.template)),
                        HostArg::Placement(Arc::clone(&self.origin)),
                        HostArg::Event(done),
                    ],
                )),
        )?;
        graph.set_transition(from, trigger, volley)?;
        graph.set_transition(volley, done, then)?;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn routines(&self) -> Vec<Routine> {
        let pattern = self.clone();
        vec![Routine::new(Arc::clone(&self.name), move |call| {
            let origin = call.placement().unwrap_or_default();
            let template = call
                .text()
                .map_or_else(|| Arc::clone(&pattern.template), Arc::from);
            let fan = pattern.clone();
            Sequence::<Arena>::new(Arc::clone(&pattern.name), call.owner).spawn_children(
                pattern.count,
                pattern.interval,
                move |arena: &mut Arena, index: u32| {
                    let transform = fan.aim(origin, index);
                    arena.spawn(&template, transform);
                },
            )
        })]
    }
}
