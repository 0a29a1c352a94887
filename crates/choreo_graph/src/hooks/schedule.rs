//! Schedule markers for graph execution lifecycle events.
//!
//! Use them with [`ScheduleId::of::<T>()`](choreo_system::plugin::ScheduleId::of)
//! or the typed [`register_observer::<OnStateEnter, _>`](super::HooksAPI::register_observer).
//! Event data arrives as a [`GraphEvent`](super::events::GraphEvent).

use choreo_system::plugin::Schedule;

// ─────────────────────────────────────────────────────────────────────────────
// State Schedules
// ─────────────────────────────────────────────────────────────────────────────

/// Called after an instance enters a state, including its entry state on
/// creation or reset.
///
/// Event data: [`GraphEvent::StateEnter`](super::events::GraphEvent::StateEnter)
pub struct OnStateEnter;
impl Schedule for OnStateEnter {}

/// Called before an instance leaves a state.
///
/// Event data: [`GraphEvent::StateExit`](super::events::GraphEvent::StateExit)
pub struct OnStateExit;
impl Schedule for OnStateExit {}

/// Called for every transition taken, between exit and enter.
///
/// Event data: [`GraphEvent::Transition`](super::events::GraphEvent::Transition)
pub struct OnTransition;
impl Schedule for OnTransition {}

// ─────────────────────────────────────────────────────────────────────────────
// Event Schedules
// ─────────────────────────────────────────────────────────────────────────────

/// Called when an event matches no local or global transition.
///
/// Dropping is normal: graphs are sparse. Useful when debugging a patch that
/// never fires.
///
/// Event data: [`GraphEvent::EventDropped`](super::events::GraphEvent::EventDropped)
pub struct OnEventDropped;
impl Schedule for OnEventDropped {}

/// Called after an `InvokeHost` action ran.
///
/// Event data: [`GraphEvent::HostInvoked`](super::events::GraphEvent::HostInvoked)
pub struct OnHostInvoke;
impl Schedule for OnHostInvoke {}

// ─────────────────────────────────────────────────────────────────────────────
// Instance Schedules
// ─────────────────────────────────────────────────────────────────────────────

/// Called once when an instance is destroyed.
///
/// Event data: [`GraphEvent::InstanceDestroyed`](super::events::GraphEvent::InstanceDestroyed)
pub struct OnInstanceDestroyed;
impl Schedule for OnInstanceDestroyed {}
