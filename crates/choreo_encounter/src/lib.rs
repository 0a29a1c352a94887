//! Boss encounters built from attack patterns.
//!
//! This crate is the top layer: it patches hand-authored boss graphs with
//! reusable [`AttackPattern`]s and runs the result together with sequences
//! and pooled entities.
//!
//! - **`choreo_graph`**: graph model, patching, executor
//! - **`choreo_sequence`** / **`choreo_pool`**: timed routines and pooled entities
//! - **`choreo_encounter`**: patterns and the [`Encounter`] controller (this crate)
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use choreo_encounter::prelude::*;
//! use choreo_graph::{EventRegistry, Graph, GraphInstance};
//! use choreo_pool::{EntityPool, PoolConfig, StaticTemplates};
//!
//! let events = EventRegistry::new();
//! let mut graph = Graph::new("warden");
//! graph.create_state("Idle", "").unwrap();
//!
//! let volley = ProjectileArray::new("Volley", "orb").entered_from("Idle", "fire");
//! apply_patterns(&mut graph, &events, &[&volley, &GlobalInterrupt::new("stagger", "Idle")]);
//!
//! let boss = GraphInstance::new(Arc::new(graph)).unwrap();
//! let pool = EntityPool::new(Arc::new(StaticTemplates::new()), PoolConfig::default());
//! let mut encounter = Encounter::new(boss, pool);
//! encounter.register_pattern(&volley);
//!
//! let report = encounter.tick(Duration::from_millis(16), EncounterContext::new());
//! assert!(report.started.is_empty());
//! ```

mod arena;
mod encounter;
mod pattern;

/// Stock attack patterns.
pub mod patterns;

/// Routine registry and calls.
pub mod routine;

/// Common imports.
pub mod prelude {
    pub use crate::arena::Arena;
    pub use crate::encounter::{BOSS_OWNER, Encounter, EncounterContext, EncounterTick};
    pub use crate::pattern::{AttackPattern, AttackPatternExt, apply_patterns};
    pub use crate::patterns::{
        AttackOption, AttackSelector, BurstAttack, GlobalInterrupt, ProjectileArray,
    };
    pub use crate::routine::{Routine, RoutineCall, Routines};
}

pub use arena::Arena;
pub use encounter::{BOSS_OWNER, Encounter, EncounterContext, EncounterTick};
pub use pattern::{AttackPattern, AttackPatternExt, apply_patterns};
pub use routine::{Routine, RoutineCall, Routines};
