//! Behavior graphs for Choreo (Layer 2).
//!
//! `choreo_graph` models encounter choreography as data: graphs of named
//! states whose actions wait, write variables, raise events, call the host
//! and pick weighted random branches. Graphs are authored once and then
//! patched live by attack patterns.
//!
//! # Core Concepts
//!
//! - [`Graph`] - States, transitions, global transitions and variables
//! - [`State`] and [`Action`] - The closed action vocabulary a state runs
//! - [`EventRegistry`] - The shared event namespace
//! - [`patch`] - Splicing, redirecting and stripping an existing graph
//! - [`WeightedRandomDispatcher`] - Bounded, starvation-free random choice
//! - [`GraphExecutor`] and [`GraphInstance`] - Tick-driven execution
//! - [`hooks`] - Lifecycle observers
//!
//! # Example
//!
//! ```
//! use choreo_graph::prelude::*;
//! use core::time::Duration;
//! use std::sync::Arc;
//!
//! let events = EventRegistry::new();
//! let attack_done = events.create_event("AttackDone");
//!
//! let mut graph = Graph::new("boss");
//! let prepare = graph.create_state("Prepare", "").unwrap();
//! let attack = graph.create_state("Attack", "").unwrap();
//! graph
//!     .state_mut(prepare)
//!     .unwrap()
//!     .add_action(Action::wait(Duration::ZERO, EventId::FINISHED));
//! graph.set_transition(prepare, EventId::FINISHED, attack).unwrap();
//! graph.set_transition(attack, attack_done, prepare).unwrap();
//!
//! let executor = GraphExecutor::new();
//! let mut boss = GraphInstance::with_seed(Arc::new(graph), 42).unwrap();
//! executor.tick(&mut boss, &mut TickContext::new(Duration::from_millis(16)));
//! assert_eq!(boss.active_state_name(), "Attack");
//! ```
//!
//! # Architecture
//!
//! - **Layer 1** (`choreo_system`): world, plugins, APIs
//! - **Layer 2** (`choreo_graph`): behavior graphs (this crate)
//! - **Layer 2** (`choreo_sequence`, `choreo_pool`): sequencing and pooled entities
//! - **Layer 3** (`choreo_encounter`): attack patterns and encounter control

/// The closed action vocabulary.
pub mod action;

/// Weighted random event selection.
pub mod dispatch;

/// Graph construction and patching errors.
pub mod error;

/// Event ids and the shared event namespace.
pub mod event;

/// Graph instances and the tick executor.
pub mod executor;

/// Graph structure and builder API.
pub mod graph;

/// Lifecycle hooks for graph execution.
pub mod hooks;

/// Host calls and placement lookups.
pub mod host;

/// Named action templates.
pub mod library;

/// Live patching of authored graphs.
pub mod patch;

/// World integration.
pub mod plugin;

/// States and transitions.
pub mod state;

/// Typed graph variables.
pub mod variable;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::action::{
        Action, ActionTag, ConditionalDispatch, HostArg, InvokeHost, SendEvent, SetVariable, Wait,
        WaitRandom, WeightedRandomDispatch,
    };
    pub use crate::dispatch::{
        Candidate, CandidateCounters, DispatchOutcome, WeightedRandomDispatcher,
    };
    pub use crate::error::GraphError;
    pub use crate::event::{EventId, EventRegistry};
    pub use crate::executor::{
        AppliedTransition, ExecutorConfig, GraphExecutor, GraphInstance, InstanceId, TickContext,
        TickOutcome,
    };
    pub use crate::graph::{Graph, GraphId, ValidationError};
    pub use crate::hooks::schedule::{
        OnEventDropped, OnHostInvoke, OnInstanceDestroyed, OnStateEnter, OnStateExit,
        OnTransition,
    };
    pub use crate::hooks::{GraphEvent, HookRegistrationError, HooksAPI};
    pub use crate::host::{
        HostCall, HostInvoker, HostValue, Placement, PlacementProvider, RecordingHost,
        StaticPlacements,
    };
    pub use crate::library::ActionLibrary;
    pub use crate::plugin::GraphPlugin;
    pub use crate::state::{State, StateId, Transition};
    pub use crate::variable::{ObjectRef, Value, ValueKind, VariableDecl, VariableId, Variables};
}

// Re-export key types at crate root for convenience
pub use action::{Action, ActionTag};
pub use dispatch::WeightedRandomDispatcher;
pub use error::GraphError;
pub use event::{EventId, EventRegistry};
pub use executor::{GraphExecutor, GraphInstance, TickContext};
pub use graph::{Graph, ValidationError};
pub use plugin::GraphPlugin;
pub use state::{State, StateId};
