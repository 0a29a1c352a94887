//! Stock attack patterns.
//!
//! | Pattern | Edit |
//! |---------|------|
//! | [`BurstAttack`] | splices windup and burst states between two states |
//! | [`ProjectileArray`] | adds a volley state backed by a spawning routine |
//! | [`AttackSelector`] | replaces a placeholder dispatch with a weighted one |
//! | [`GlobalInterrupt`] | adds a transition taken from any state |

mod burst;
mod interrupt;
mod projectile;
mod selector;

pub use burst::BurstAttack;
pub use interrupt::GlobalInterrupt;
pub use projectile::ProjectileArray;
pub use selector::{AttackOption, AttackSelector};
