//! Hook registration API for graph execution.
//!
//! The [`HooksAPI`] is a registry of observers keyed by schedule. The
//! executor invokes it at each lifecycle point of every instance it runs.
//!
//! # Multi-Schedule Registration
//!
//! ```ignore
//! hooks.register_observer::<(OnStateEnter, OnStateExit), _>(
//!     "tracker",
//!     |event: &GraphEvent| match event {
//!         GraphEvent::StateEnter { state_name, .. } => tracing::info!(%state_name, "enter"),
//!         GraphEvent::StateExit { state_name, .. } => tracing::info!(%state_name, "exit"),
//!         _ => {}
//!     },
//! )?;
//! ```

use core::fmt;
use std::sync::Arc;

use choreo_system::api::API;
use choreo_system::plugin::{IntoScheduleIds, ScheduleId};
use hashbrown::HashMap;
use parking_lot::RwLock;

use super::events::GraphEvent;

// ─────────────────────────────────────────────────────────────────────────────
// BoxedHook
// ─────────────────────────────────────────────────────────────────────────────

/// Type-erased hook receiving `&GraphEvent`.
///
/// Most callers should use [`HooksAPI::register_observer`] instead.
pub struct BoxedHook {
    handler: Box<dyn Fn(&GraphEvent) + Send + Sync>,
}

impl BoxedHook {
    /// Wraps a handler.
    #[must_use]
    pub fn new(handler: impl Fn(&GraphEvent) + Send + Sync + 'static) -> Self {
        Self {
            handler: Box::new(handler),
        }
    }

    /// Invokes the hook.
    pub fn invoke(&self, event: &GraphEvent) {
        (self.handler)(event);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HookRegistrationError
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur during hook registration.
#[derive(Debug, Clone)]
pub enum HookRegistrationError {
    /// A hook with this name already exists on the schedule.
    DuplicateName {
        /// The schedule where the duplicate was found.
        schedule: ScheduleId,
        /// The duplicate hook name.
        name: String,
    },
}

impl fmt::Display for HookRegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookRegistrationError::DuplicateName { schedule, name } => {
                write!(
                    f,
                    "hook '{}' already registered for schedule '{}'",
                    name,
                    schedule.type_name()
                )
            }
        }
    }
}

impl core::error::Error for HookRegistrationError {}

struct HookEntry {
    name: String,
    hook: BoxedHook,
}

// ─────────────────────────────────────────────────────────────────────────────
// HooksAPI
// ─────────────────────────────────────────────────────────────────────────────

/// Registry of graph lifecycle observers.
///
/// Registration and invocation both go through a [`RwLock`], so hooks may be
/// added while instances are running. Hooks run in registration order.
#[derive(Default)]
pub struct HooksAPI {
    hooks: RwLock<HashMap<ScheduleId, Vec<HookEntry>>>,
}

impl API for HooksAPI {}

impl fmt::Debug for HooksAPI {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hooks = self.hooks.read();
        let mut map = f.debug_map();
        for (schedule, entries) in hooks.iter() {
            let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
            map.entry(&schedule.type_name(), &names);
        }
        map.finish()
    }
}

impl HooksAPI {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            hooks: RwLock::new(HashMap::new()),
        }
    }

    /// Registers an observer for one schedule or a tuple of schedules.
    ///
    /// With several schedules the hook is stored once per schedule, under
    /// `name@Schedule`.
    ///
    /// # Errors
    ///
    /// [`HookRegistrationError::DuplicateName`] if `name` is taken on one of
    /// the schedules. Schedules processed before the duplicate keep the hook.
    pub fn register_observer<S, F>(
        &self,
        name: impl Into<String>,
        hook: F,
    ) -> Result<&Self, HookRegistrationError>
    where
        S: IntoScheduleIds,
        F: Fn(&GraphEvent) + Send + Sync + 'static,
    {
        let schedules = S::schedule_ids();
        let name = name.into();
        let hook = Arc::new(hook);

        for schedule in &schedules {
            let hook_name = if schedules.len() > 1 {
                format!("{}@{}", name, schedule.type_name())
            } else {
                name.clone()
            };
            let hook = Arc::clone(&hook);
            self.register_boxed(
                *schedule,
                hook_name,
                BoxedHook::new(move |event: &GraphEvent| hook(event)),
            )?;
        }
        Ok(self)
    }

    /// Registers a pre-built hook for one schedule.
    ///
    /// # Errors
    ///
    /// [`HookRegistrationError::DuplicateName`] if `name` is taken.
    pub fn register_boxed(
        &self,
        schedule: ScheduleId,
        name: impl Into<String>,
        hook: BoxedHook,
    ) -> Result<(), HookRegistrationError> {
        let name = name.into();

        let mut hooks = self.hooks.write();
        let entries = hooks.entry(schedule).or_default();

        if entries.iter().any(|entry| entry.name == name) {
            return Err(HookRegistrationError::DuplicateName { schedule, name });
        }

        entries.push(HookEntry { name, hook });
        Ok(())
    }

    /// Invokes every hook registered for `schedule`, in registration order.
    pub fn invoke(&self, schedule: ScheduleId, event: &GraphEvent) {
        let hooks = self.hooks.read();
        if let Some(entries) = hooks.get(&schedule) {
            for entry in entries {
                entry.hook.invoke(event);
            }
        }
    }

    /// Number of hooks on `schedule`.
    #[must_use]
    pub fn hook_count(&self, schedule: ScheduleId) -> usize {
        let hooks = self.hooks.read();
        hooks.get(&schedule).map_or(0, Vec::len)
    }

    /// Checks if a hook with the given name exists on the schedule.
    #[must_use]
    pub fn contains_hook(&self, schedule: ScheduleId, name: &str) -> bool {
        let hooks = self.hooks.read();
        hooks
            .get(&schedule)
            .is_some_and(|entries| entries.iter().any(|entry| entry.name == name))
    }

    /// Removes every hook.
    pub fn clear(&self) {
        self.hooks.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::InstanceId;
    use crate::hooks::schedule::{OnStateEnter, OnStateExit};
    use crate::state::StateId;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn enter() -> GraphEvent {
        GraphEvent::StateEnter {
            instance: InstanceId::new(),
            state: StateId::from_index(0),
            state_name: "Idle".into(),
        }
    }

    #[test]
    fn register_increments_count() {
        let api = HooksAPI::new();
        let schedule = ScheduleId::of::<OnStateEnter>();

        api.register_observer::<OnStateEnter, _>("first", |_: &GraphEvent| {})
            .expect("registration should succeed");
        api.register_observer::<OnStateEnter, _>("second", |_: &GraphEvent| {})
            .expect("registration should succeed");

        assert_eq!(api.hook_count(schedule), 2);
        assert!(api.contains_hook(schedule, "first"));
        assert!(!api.contains_hook(schedule, "third"));
    }

    #[test]
    fn invoke_runs_hooks_in_order() {
        let api = HooksAPI::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            api.register_observer::<OnStateEnter, _>(name, move |_: &GraphEvent| {
                order.lock().unwrap().push(name);
            })
            .expect("registration should succeed");
        }

        api.invoke(ScheduleId::of::<OnStateEnter>(), &enter());
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn invoke_unknown_schedule_is_noop() {
        let api = HooksAPI::new();
        api.invoke(ScheduleId::of::<OnStateExit>(), &enter());
    }

    #[test]
    fn duplicate_names_rejected_per_schedule() {
        let api = HooksAPI::new();
        api.register_observer::<OnStateEnter, _>("logger", |_: &GraphEvent| {})
            .expect("first registration");
        let result = api.register_observer::<OnStateEnter, _>("logger", |_: &GraphEvent| {});
        assert!(matches!(
            result,
            Err(HookRegistrationError::DuplicateName { ref name, .. }) if name == "logger"
        ));

        api.register_observer::<OnStateExit, _>("logger", |_: &GraphEvent| {})
            .expect("same name on another schedule");
    }

    #[test]
    fn multi_schedule_registration() {
        let api = HooksAPI::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        api.register_observer::<(OnStateEnter, OnStateExit), _>(
            "tracker",
            move |_: &GraphEvent| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        )
        .expect("registration should succeed");

        let enter_id = ScheduleId::of::<OnStateEnter>();
        assert_eq!(api.hook_count(enter_id), 1);
        assert!(api.contains_hook(enter_id, &format!("tracker@{}", enter_id.type_name())));

        api.invoke(enter_id, &enter());
        api.invoke(ScheduleId::of::<OnStateExit>(), &enter());
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        api.clear();
        assert_eq!(api.hook_count(enter_id), 0);
    }
}
