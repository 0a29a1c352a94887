//! API trait for capability registration.
//!
//! APIs are world-lifetime registries that plugins use to expose capabilities
//! to each other and to the runtime layers above. The event namespace, the
//! action library and the hook registry are all APIs.
//!
//! # API vs Resource
//!
//! | Aspect | API | Resource |
//! |--------|-----|----------|
//! | **Purpose** | Shared registries | Plain state |
//! | **Access** | `world.api::<A>()` (`&A`) | `world.get_resource::<R>()` (guard) |
//! | **Mutation** | Interior mutability | Write guard |
//! | **Lifetime** | World | World |
//!
//! # Interior Mutability Pattern
//!
//! APIs that accept registrations after insertion lock internally:
//!
//! ```ignore
//! use hashbrown::HashMap;
//! use parking_lot::RwLock;
//! use choreo_system::api::API;
//!
//! pub struct SoundBank {
//!     cues: RwLock<HashMap<String, u32>>,
//! }
//!
//! impl API for SoundBank {}
//!
//! impl SoundBank {
//!     pub fn register(&self, name: &str, cue: u32) {
//!         self.cues.write().insert(name.into(), cue);
//!     }
//! }
//! ```

/// Marker trait for capability APIs.
///
/// ```ignore
/// impl Plugin for SoundPlugin {
///     fn build(&self, world: &mut World) {
///         world.insert_api(SoundBank::default());
///     }
/// }
///
/// impl Plugin for BossPlugin {
///     fn ready(&self, world: &mut World) {
///         if let Some(bank) = world.api::<SoundBank>() {
///             bank.register("roar", 7);
///         }
///     }
/// }
/// ```
pub trait API: Send + Sync + 'static {}
