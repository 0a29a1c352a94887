//! Seams to the outside world: host calls and spatial lookups.
//!
//! `InvokeHost` actions call into a [`HostInvoker`] (audio, spawning, camera
//! effects). Arguments naming a placement are resolved through a
//! [`PlacementProvider`] before the call. Both are optional for a tick: an
//! instance without a host simply skips its host calls.

use std::sync::Arc;

use glam::{Quat, Vec3};
use hashbrown::HashMap;

use crate::event::EventId;
use crate::variable::Value;

/// A world-space position and orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Placement {
    /// Position.
    pub position: Vec3,
    /// Orientation.
    pub orientation: Quat,
}

impl Placement {
    /// A placement at `position` with identity orientation.
    #[must_use]
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            orientation: Quat::IDENTITY,
        }
    }
}

/// A resolved host call argument.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    /// A literal or a variable's current value.
    Value(Value),
    /// An event reference.
    Event(EventId),
    /// Free text.
    Text(Arc<str>),
    /// A looked-up placement, `None` if the provider did not know the name.
    Placement(Option<Placement>),
}

impl HostValue {
    /// Returns the text if this is `Text`.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            HostValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the event if this is `Event`.
    #[must_use]
    pub fn as_event(&self) -> Option<EventId> {
        match self {
            HostValue::Event(event) => Some(*event),
            _ => None,
        }
    }

    /// Returns the value if this is `Value`.
    #[must_use]
    pub fn as_value(&self) -> Option<Value> {
        match self {
            HostValue::Value(value) => Some(*value),
            _ => None,
        }
    }
}

/// Receives host calls from `InvokeHost` actions.
pub trait HostInvoker {
    /// Handles one call.
    fn invoke_host(&mut self, name: &str, args: &[HostValue]);
}

impl<F: FnMut(&str, &[HostValue])> HostInvoker for F {
    fn invoke_host(&mut self, name: &str, args: &[HostValue]) {
        self(name, args);
    }
}

/// Supplies named spatial reference points. Read-only.
pub trait PlacementProvider {
    /// Resolves a placement name such as `"player"`.
    fn placement(&self, name: &str) -> Option<Placement>;
}

/// A fixed table of placements.
#[derive(Debug, Clone, Default)]
pub struct StaticPlacements {
    placements: HashMap<Arc<str>, Placement>,
}

impl StaticPlacements {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or moves a placement.
    #[must_use]
    pub fn with(mut self, name: impl Into<Arc<str>>, placement: Placement) -> Self {
        self.set(name, placement);
        self
    }

    /// Adds or moves a placement.
    pub fn set(&mut self, name: impl Into<Arc<str>>, placement: Placement) {
        self.placements.insert(name.into(), placement);
    }
}

impl PlacementProvider for StaticPlacements {
    fn placement(&self, name: &str) -> Option<Placement> {
        self.placements.get(name).copied()
    }
}

/// A host call captured for later delivery or inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct HostCall {
    /// Host function name.
    pub name: Arc<str>,
    /// Resolved arguments.
    pub args: Vec<HostValue>,
}

/// A host that records every call it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    /// Calls in arrival order.
    pub calls: Vec<HostCall>,
}

impl RecordingHost {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of recorded calls, in order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.calls.iter().map(|call| call.name.as_ref()).collect()
    }

    /// Takes the recorded calls, leaving the recorder empty.
    pub fn drain(&mut self) -> Vec<HostCall> {
        core::mem::take(&mut self.calls)
    }
}

impl HostInvoker for RecordingHost {
    fn invoke_host(&mut self, name: &str, args: &[HostValue]) {
        self.calls.push(HostCall {
            name: Arc::from(name),
            args: args.to_vec(),
        });
    }
}
