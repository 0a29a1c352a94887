//! Pooled entities for Choreo (Layer 2).
//!
//! Projectiles, hazards and adds are spawned and despawned constantly during
//! an encounter. `choreo_pool` keeps them alive between uses instead:
//!
//! - [`EntityPool`] owns every entity in an arena and hands out
//!   generation-tagged [`EntityHandle`]s. A handle stops resolving once its
//!   entity is released, so code still holding it gets
//!   [`PoolError::StaleHandle`] instead of someone else's entity.
//! - Templates come from a [`TemplateLoader`] through a non-blocking
//!   [`TemplateCache`].
//! - Growth is incremental: prewarm requests and floors are worked off a
//!   few entities per [`maintain`](EntityPool::maintain) call.
//! - Releasing an entity cancels its sequences through a shared
//!   [`Canceller`](choreo_sequence::Canceller).
//!
//! # Example
//!
//! ```
//! use choreo_graph::prelude::*;
//! use choreo_pool::prelude::*;
//! use std::sync::Arc;
//!
//! let mut graph = Graph::new("orb");
//! graph.create_state("Fly", "").unwrap();
//! let loader = StaticTemplates::new().with(Template::new("orb", graph));
//!
//! let mut pool = EntityPool::new(Arc::new(loader), PoolConfig::default());
//! pool.prewarm("orb", 1);
//! pool.maintain();
//! assert_eq!(pool.available_count("orb"), 1);
//!
//! let orb = pool.acquire("orb").unwrap();
//! pool.release(orb).unwrap();
//! assert!(pool.get(orb).is_err());
//! ```

/// Entity handles and transforms.
pub mod handle;

/// Pool configuration and world integration.
pub mod plugin;

/// The entity pool.
pub mod pool;

/// Templates and template loading.
pub mod template;

/// Common imports.
pub mod prelude {
    pub use crate::handle::{EntityHandle, Transform};
    pub use crate::plugin::{PoolConfig, PoolPlugin};
    pub use crate::pool::{EntityPool, PoolError, PoolStats, PooledEntity};
    pub use crate::template::{
        StaticTemplates, Template, TemplateCache, TemplateError, TemplateLoader, TemplateStatus,
    };
}

pub use handle::{EntityHandle, Transform};
pub use plugin::{PoolConfig, PoolPlugin};
pub use pool::{EntityPool, PoolError, PoolStats, PooledEntity};
pub use template::{StaticTemplates, Template, TemplateCache, TemplateError, TemplateLoader};
