//! Unified event enum for graph execution hooks.
//!
//! All hooks receive `&GraphEvent` and match on the variants they care
//! about.

use core::fmt;
use std::sync::Arc;

use crate::event::EventId;
use crate::executor::InstanceId;
use crate::state::StateId;

/// Event data passed to every hook.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    // ─────────────────────────────────────────────────────────────────────────
    // State Events
    // ─────────────────────────────────────────────────────────────────────────
    /// An instance entered a state.
    StateEnter {
        /// The instance.
        instance: InstanceId,
        /// The entered state.
        state: StateId,
        /// Its name.
        state_name: Arc<str>,
    },

    /// An instance is leaving a state.
    StateExit {
        /// The instance.
        instance: InstanceId,
        /// The state being left.
        state: StateId,
        /// Its name.
        state_name: Arc<str>,
    },

    /// A transition was taken.
    Transition {
        /// The instance.
        instance: InstanceId,
        /// The triggering event.
        event: EventId,
        /// Previous state.
        from: StateId,
        /// New state.
        to: StateId,
        /// True if a global transition matched.
        global: bool,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Event Events
    // ─────────────────────────────────────────────────────────────────────────
    /// An event matched no transition.
    EventDropped {
        /// The instance.
        instance: InstanceId,
        /// The dropped event.
        event: EventId,
        /// The active state at the time.
        state: StateId,
    },

    /// A host call was made.
    HostInvoked {
        /// The instance.
        instance: InstanceId,
        /// Host function name.
        name: Arc<str>,
        /// Number of resolved arguments.
        arg_count: usize,
        /// False if no host was attached to the tick.
        delivered: bool,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Instance Events
    // ─────────────────────────────────────────────────────────────────────────
    /// An instance was destroyed.
    InstanceDestroyed {
        /// The instance.
        instance: InstanceId,
        /// The state it was in.
        state: StateId,
    },
}

impl GraphEvent {
    /// Returns the schedule marker name for this variant.
    #[must_use]
    pub fn schedule_name(&self) -> &'static str {
        match self {
            GraphEvent::StateEnter { .. } => "OnStateEnter",
            GraphEvent::StateExit { .. } => "OnStateExit",
            GraphEvent::Transition { .. } => "OnTransition",
            GraphEvent::EventDropped { .. } => "OnEventDropped",
            GraphEvent::HostInvoked { .. } => "OnHostInvoke",
            GraphEvent::InstanceDestroyed { .. } => "OnInstanceDestroyed",
        }
    }

    /// Returns the instance the event belongs to.
    #[must_use]
    pub fn instance(&self) -> &InstanceId {
        match self {
            GraphEvent::StateEnter { instance, .. }
            | GraphEvent::StateExit { instance, .. }
            | GraphEvent::Transition { instance, .. }
            | GraphEvent::EventDropped { instance, .. }
            | GraphEvent::HostInvoked { instance, .. }
            | GraphEvent::InstanceDestroyed { instance, .. } => instance,
        }
    }
}

impl fmt::Display for GraphEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphEvent::StateEnter {
                instance,
                state_name,
                ..
            } => write!(f, "StateEnter({state_name} @ {instance})"),
            GraphEvent::StateExit {
                instance,
                state_name,
                ..
            } => write!(f, "StateExit({state_name} @ {instance})"),
            GraphEvent::Transition {
                instance,
                event,
                from,
                to,
                global,
            } => write!(
                f,
                "Transition({from} -> {to} on {event} @ {instance}, global: {global})"
            ),
            GraphEvent::EventDropped {
                instance,
                event,
                state,
            } => write!(f, "EventDropped({event} in {state} @ {instance})"),
            GraphEvent::HostInvoked {
                instance,
                name,
                arg_count,
                delivered,
            } => write!(
                f,
                "HostInvoked({name} @ {instance}, args: {arg_count}, delivered: {delivered})"
            ),
            GraphEvent::InstanceDestroyed { instance, state } => {
                write!(f, "InstanceDestroyed({instance} in {state})")
            }
        }
    }
}
