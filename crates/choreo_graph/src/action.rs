//! The closed action vocabulary.
//!
//! Actions are plain data: the executor dispatches on the variant, never on a
//! trait object. Every variant is `Clone`, which is what makes
//! [`Graph::clone_action`](crate::graph::Graph::clone_action) and the
//! [`ActionLibrary`](crate::library::ActionLibrary) possible without any
//! field-by-field copying.

use core::fmt;
use core::time::Duration;
use std::sync::Arc;

use crate::dispatch::Candidate;
use crate::event::EventId;
use crate::variable::{Value, VariableId};

/// Discriminant of an [`Action`], used for lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionTag {
    /// [`Action::Wait`]
    Wait,
    /// [`Action::WaitRandom`]
    WaitRandom,
    /// [`Action::SetVariable`]
    SetVariable,
    /// [`Action::SendEvent`]
    SendEvent,
    /// [`Action::InvokeHost`]
    InvokeHost,
    /// [`Action::WeightedRandomDispatch`]
    WeightedRandomDispatch,
    /// [`Action::ConditionalDispatch`]
    ConditionalDispatch,
}

impl fmt::Display for ActionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionTag::Wait => "Wait",
            ActionTag::WaitRandom => "WaitRandom",
            ActionTag::SetVariable => "SetVariable",
            ActionTag::SendEvent => "SendEvent",
            ActionTag::InvokeHost => "InvokeHost",
            ActionTag::WeightedRandomDispatch => "WeightedRandomDispatch",
            ActionTag::ConditionalDispatch => "ConditionalDispatch",
        };
        f.write_str(name)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Action payloads
// ─────────────────────────────────────────────────────────────────────────────

/// Raise `finish_event` once `duration` has elapsed in the state.
#[derive(Debug, Clone, PartialEq)]
pub struct Wait {
    /// Time to wait after entering the state.
    pub duration: Duration,
    /// Event raised when the wait ends.
    pub finish_event: EventId,
}

/// Like [`Wait`], with the duration drawn uniformly from `min..=max` on entry.
#[derive(Debug, Clone, PartialEq)]
pub struct WaitRandom {
    /// Shortest wait.
    pub min: Duration,
    /// Longest wait.
    pub max: Duration,
    /// Event raised when the wait ends.
    pub finish_event: EventId,
}

/// Write a variable on entry, or on every tick.
#[derive(Debug, Clone, PartialEq)]
pub struct SetVariable {
    /// Target variable.
    pub variable: VariableId,
    /// Value written.
    pub value: Value,
    /// Write again on every tick spent in the state.
    pub every_tick: bool,
}

/// Raise an event, optionally after a delay.
#[derive(Debug, Clone, PartialEq)]
pub struct SendEvent {
    /// Event to raise.
    pub event: EventId,
    /// Delay from state entry. Zero raises on entry.
    pub delay: Duration,
}

/// Argument passed to a host call.
#[derive(Debug, Clone, PartialEq)]
pub enum HostArg {
    /// A literal value.
    Value(Value),
    /// The current value of a variable.
    Variable(VariableId),
    /// An event reference, e.g. a completion event for the host to raise.
    Event(EventId),
    /// Free text such as a sound cue or template name.
    Text(Arc<str>),
    /// A named spatial reference resolved through the placement provider.
    Placement(Arc<str>),
}

/// Call an external collaborator once on entry.
#[derive(Debug, Clone, PartialEq)]
pub struct InvokeHost {
    /// Host function name.
    pub name: Arc<str>,
    /// Arguments, resolved at call time.
    pub args: Vec<HostArg>,
}

/// Raise one of several events chosen by weight.
///
/// See [`WeightedRandomDispatcher`](crate::dispatch::WeightedRandomDispatcher).
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedRandomDispatch {
    /// Options in tie-break order.
    pub candidates: Vec<Candidate>,
    /// Event raised once every candidate is retired.
    pub fallback: EventId,
}

/// Raise one of two events depending on a `Bool` variable.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalDispatch {
    /// The `Bool` variable to test.
    pub variable: VariableId,
    /// Raised when the variable is true.
    pub if_true: Option<EventId>,
    /// Raised when the variable is false.
    pub if_false: Option<EventId>,
    /// Test again on every tick spent in the state.
    pub every_tick: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Action
// ─────────────────────────────────────────────────────────────────────────────

/// A unit of state behavior.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Timed wait.
    Wait(Wait),
    /// Timed wait with a random duration.
    WaitRandom(WaitRandom),
    /// Variable write.
    SetVariable(SetVariable),
    /// Event raise.
    SendEvent(SendEvent),
    /// Host call.
    InvokeHost(InvokeHost),
    /// Weighted random event choice.
    WeightedRandomDispatch(WeightedRandomDispatch),
    /// Boolean event choice.
    ConditionalDispatch(ConditionalDispatch),
}

impl Action {
    /// Waits `duration`, then raises `finish_event`.
    #[must_use]
    pub fn wait(duration: Duration, finish_event: EventId) -> Self {
        Action::Wait(Wait {
            duration,
            finish_event,
        })
    }

    /// Waits a random time in `min..=max`, then raises `finish_event`.
    #[must_use]
    pub fn wait_random(min: Duration, max: Duration, finish_event: EventId) -> Self {
        Action::WaitRandom(WaitRandom {
            min,
            max,
            finish_event,
        })
    }

    /// Writes `value` to `variable` on state entry.
    #[must_use]
    pub fn set_variable(variable: VariableId, value: impl Into<Value>) -> Self {
        Action::SetVariable(SetVariable {
            variable,
            value: value.into(),
            every_tick: false,
        })
    }

    /// Writes `value` to `variable` on every tick spent in the state.
    #[must_use]
    pub fn set_variable_every_tick(variable: VariableId, value: impl Into<Value>) -> Self {
        Action::SetVariable(SetVariable {
            variable,
            value: value.into(),
            every_tick: true,
        })
    }

    /// Raises `event` on state entry.
    #[must_use]
    pub fn send_event(event: EventId) -> Self {
        Self::send_event_delayed(event, Duration::ZERO)
    }

    /// Raises `event` after `delay`.
    #[must_use]
    pub fn send_event_delayed(event: EventId, delay: Duration) -> Self {
        Action::SendEvent(SendEvent { event, delay })
    }

    /// Calls the host function `name` on state entry.
    #[must_use]
    pub fn invoke_host(name: impl Into<Arc<str>>, args: Vec<HostArg>) -> Self {
        Action::InvokeHost(InvokeHost {
            name: name.into(),
            args,
        })
    }

    /// Raises one of `candidates`, or `FINISHED` once all are retired.
    #[must_use]
    pub fn weighted_dispatch(candidates: Vec<Candidate>) -> Self {
        Action::WeightedRandomDispatch(WeightedRandomDispatch {
            candidates,
            fallback: EventId::FINISHED,
        })
    }

    /// Raises `if_true` or `if_false` on state entry.
    #[must_use]
    pub fn conditional(
        variable: VariableId,
        if_true: Option<EventId>,
        if_false: Option<EventId>,
    ) -> Self {
        Action::ConditionalDispatch(ConditionalDispatch {
            variable,
            if_true,
            if_false,
            every_tick: false,
        })
    }

    /// Tests the variable on every tick spent in the state.
    #[must_use]
    pub fn conditional_every_tick(
        variable: VariableId,
        if_true: Option<EventId>,
        if_false: Option<EventId>,
    ) -> Self {
        Action::ConditionalDispatch(ConditionalDispatch {
            variable,
            if_true,
            if_false,
            every_tick: true,
        })
    }

    /// Returns the action's tag.
    #[must_use]
    pub fn tag(&self) -> ActionTag {
        match self {
            Action::Wait(_) => ActionTag::Wait,
            Action::WaitRandom(_) => ActionTag::WaitRandom,
            Action::SetVariable(_) => ActionTag::SetVariable,
            Action::SendEvent(_) => ActionTag::SendEvent,
            Action::InvokeHost(_) => ActionTag::InvokeHost,
            Action::WeightedRandomDispatch(_) => ActionTag::WeightedRandomDispatch,
            Action::ConditionalDispatch(_) => ActionTag::ConditionalDispatch,
        }
    }

    /// Returns the variables this action reads or writes.
    #[must_use]
    pub fn variables(&self) -> Vec<VariableId> {
        match self {
            Action::SetVariable(set) => vec![set.variable],
            Action::ConditionalDispatch(cond) => vec![cond.variable],
            Action::InvokeHost(call) => call
                .args
                .iter()
                .filter_map(|arg| match arg {
                    HostArg::Variable(id) => Some(*id),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Returns true if the action must run again on every tick.
    #[must_use]
    pub fn is_every_tick(&self) -> bool {
        match self {
            Action::SetVariable(set) => set.every_tick,
            Action::ConditionalDispatch(cond) => cond.every_tick,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_match_variants() {
        let wait = Action::wait(Duration::from_secs(1), EventId::FINISHED);
        assert_eq!(wait.tag(), ActionTag::Wait);
        assert_eq!(
            Action::weighted_dispatch(Vec::new()).tag(),
            ActionTag::WeightedRandomDispatch
        );
        assert_eq!(ActionTag::InvokeHost.to_string(), "InvokeHost");
    }

    #[test]
    fn clone_is_deep() {
        let original = Action::invoke_host(
            "camera_shake",
            vec![HostArg::Value(Value::Float(0.4)), HostArg::Text("heavy".into())],
        );
        let mut copy = original.clone();
        if let Action::InvokeHost(call) = &mut copy {
            call.args.push(HostArg::Event(EventId::FINISHED));
        }
        assert_ne!(original, copy);
        if let Action::InvokeHost(call) = &original {
            assert_eq!(call.args.len(), 2);
        }
    }

    #[test]
    fn variable_references() {
        let flag = VariableId::from_index(0);
        let count = VariableId::from_index(1);
        assert_eq!(Action::set_variable(flag, true).variables(), vec![flag]);
        assert!(Action::conditional_every_tick(flag, None, None).is_every_tick());
        let call = Action::invoke_host(
            "spawn",
            vec![HostArg::Variable(count), HostArg::Text("orb".into())],
        );
        assert_eq!(call.variables(), vec![count]);
        assert!(Action::send_event(EventId::FINISHED).variables().is_empty());
    }
}
