//! Resource storage.
//!
//! - [`Resources`] - Type-keyed storage with borrow-checked guards
//! - [`Resource`] - Blanket trait for storable types
//! - [`GlobalResource`] - Marker for read-only, world-lifetime configuration
//!
//! | Scope | Inserted with | Access |
//! |-------|---------------|--------|
//! | Global | [`World::insert_global`](crate::world::World::insert_global) | read-only |
//! | World | [`World::insert_resource`](crate::world::World::insert_resource) | read / write |

#[expect(
    clippy::module_inception,
    reason = "resource.rs contains the core Resource trait and Resources container logic"
)]
mod resource;

pub use resource::{
    GlobalResource, Resource, ResourceError, ResourceId, ResourceRef, ResourceRefMut, Resources,
};
