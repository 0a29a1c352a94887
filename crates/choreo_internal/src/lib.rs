//! # Choreo Internal Library
//!
//! Re-exports the core Choreo crates for convenience.

/// Layer 1: plugin and resource framework.
pub use choreo_system;

/// Layer 1: time, tracing and world info plugins.
pub use choreo_core_plugins;

/// Layer 2: behavior graphs and their executor.
pub use choreo_graph;

/// Layer 2: timed sequences.
pub use choreo_sequence;

/// Layer 2: pooled entities.
pub use choreo_pool;

/// Layer 3: attack patterns and encounters.
pub use choreo_encounter;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use choreo_core_plugins::{DefaultPlugins, MinimalPlugins, TimePlugin, TracingPlugin};
    pub use choreo_encounter::prelude::*;
    pub use choreo_graph::prelude::*;
    pub use choreo_pool::prelude::*;
    pub use choreo_sequence::prelude::*;
    pub use choreo_system::prelude::*;
}
