//! Data-driven boss choreography for Rust games.
//!

pub use choreo_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use choreo_internal::prelude::*;
}
