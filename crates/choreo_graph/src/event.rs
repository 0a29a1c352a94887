//! Named events and the shared event namespace.
//!
//! Events are interned once and referenced by [`EventId`] everywhere else:
//! transitions, actions, dispatch candidates and sequence signals all carry
//! ids, never strings. Two events are built in and always present:
//! [`EventId::FINISHED`] and [`EventId::RECYCLE`].

use core::fmt;
use std::sync::Arc;

use choreo_system::api::API;
use hashbrown::HashMap;
use parking_lot::RwLock;

const BUILTIN_EVENTS: [&str; 2] = ["FINISHED", "RECYCLE"];

/// Interned handle to a named event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(u32);

impl EventId {
    /// Raised by timed actions when they complete.
    pub const FINISHED: EventId = EventId(0);

    /// Raised by a graph to ask its pool to take the entity back.
    pub const RECYCLE: EventId = EventId(1);

    /// Returns the position of this event in its registry.
    #[must_use]
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// Returns true for `FINISHED` and `RECYCLE`.
    #[must_use]
    pub fn is_builtin(&self) -> bool {
        self.index() < BUILTIN_EVENTS.len()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match BUILTIN_EVENTS.get(self.index()) {
            Some(name) => f.write_str(name),
            None => write!(f, "event#{}", self.0),
        }
    }
}

#[derive(Debug)]
struct EventTable {
    ids: HashMap<Arc<str>, EventId>,
    names: Vec<Arc<str>>,
}

impl EventTable {
    fn with_builtins() -> Self {
        let mut table = Self {
            ids: HashMap::new(),
            names: Vec::new(),
        };
        for name in BUILTIN_EVENTS {
            table.intern(name);
        }
        table
    }

    fn intern(&mut self, name: &str) -> EventId {
        if let Some(id) = self.ids.get(name) {
            return *id;
        }
        let id = EventId(u32::try_from(self.names.len()).unwrap_or(u32::MAX));
        let name: Arc<str> = Arc::from(name);
        self.names.push(Arc::clone(&name));
        self.ids.insert(name, id);
        id
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EventRegistry
// ─────────────────────────────────────────────────────────────────────────────

/// Shared namespace mapping event names to ids.
///
/// Cloning the registry shares the underlying table, so a clone handed to a
/// pattern sees events created through any other clone.
///
/// ```
/// # use choreo_graph::event::{EventId, EventRegistry};
/// let events = EventRegistry::new();
/// let attack = events.create_event("Attack");
/// assert_eq!(events.create_event("Attack"), attack);
/// assert_eq!(events.find_event("FINISHED"), Some(EventId::FINISHED));
/// assert_eq!(events.find_event("Missing"), None);
/// ```
#[derive(Debug, Clone)]
pub struct EventRegistry {
    table: Arc<RwLock<EventTable>>,
}

impl API for EventRegistry {}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRegistry {
    /// Creates a registry holding only the built-in events.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: Arc::new(RwLock::new(EventTable::with_builtins())),
        }
    }

    /// Returns the id for `name`, creating the event on first use.
    pub fn create_event(&self, name: &str) -> EventId {
        if let Some(id) = self.find_event(name) {
            return id;
        }
        self.table.write().intern(name)
    }

    /// Looks up an existing event without creating it.
    #[must_use]
    pub fn find_event(&self, name: &str) -> Option<EventId> {
        self.table.read().ids.get(name).copied()
    }

    /// Returns the name an event was created with.
    #[must_use]
    pub fn name(&self, id: EventId) -> Option<Arc<str>> {
        self.table.read().names.get(id.index()).cloned()
    }

    /// Number of events, built-ins included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.read().names.len()
    }

    /// Always false; the built-in events cannot be removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.read().names.is_empty()
    }

    /// Forgets every user event. Ids handed out before the call must not be
    /// reused afterwards.
    pub fn clear(&self) {
        *self.table.write() = EventTable::with_builtins();
    }
}
