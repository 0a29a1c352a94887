//! Lifecycle hooks for graph execution.
//!
//! Observers registered on the [`HooksAPI`] are called while instances run:
//! when a state is entered or left, when a transition is taken, when an event
//! finds no transition, when a host call is made and when an instance is
//! destroyed. Hooks see the event only; they cannot alter execution.
//!
//! # Architecture
//!
//! - **Schedule markers** ([`schedule`]): empty types naming the hook points
//! - **Events** ([`events`]): the `GraphEvent` enum handed to every hook
//! - **API** ([`api`]): registration and invocation
//!
//! # Example
//!
//! ```ignore
//! use choreo_graph::hooks::events::GraphEvent;
//! use choreo_graph::hooks::schedule::{OnStateEnter, OnTransition};
//!
//! hooks.register_observer::<(OnStateEnter, OnTransition), _>(
//!     "timeline",
//!     |event: &GraphEvent| match event {
//!         GraphEvent::StateEnter { state_name, .. } => tracing::info!(state = %state_name, "enter"),
//!         GraphEvent::Transition { from, to, .. } => tracing::info!(%from, %to, "transition"),
//!         _ => {}
//!     },
//! )?;
//! ```

pub mod api;
pub mod events;
pub mod schedule;

pub use api::{BoxedHook, HookRegistrationError, HooksAPI};
pub use events::GraphEvent;
