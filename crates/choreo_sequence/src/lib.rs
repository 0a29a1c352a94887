//! Cooperative sequences for Choreo (Layer 2).
//!
//! A [`Sequence`] is a linear list of [`Step`]s run against a shared world
//! value `W`: run a closure, wait for a duration, wait for a predicate or a
//! signal, spawn children over time. The [`SequenceScheduler`] advances
//! every running sequence once per tick. Sequences only suspend at their
//! wait steps and never run on another thread.
//!
//! Every sequence belongs to an [`OwnerId`]. Cancelling the owner, directly
//! or through a [`Canceller`] handed to the code that recycles it, drops its
//! sequences before their next step runs. Cancelled sequences never report a
//! completion.
//!
//! # Example
//!
//! ```
//! use choreo_sequence::prelude::*;
//! use core::time::Duration;
//!
//! let mut scheduler = SequenceScheduler::<Vec<&str>>::new();
//! scheduler.start(
//!     Sequence::new("volley", OwnerId::new(1))
//!         .run(|log: &mut Vec<_>| log.push("aim"))
//!         .wait(Duration::from_millis(100))
//!         .run(|log: &mut Vec<_>| log.push("fire")),
//! );
//!
//! let mut log = Vec::new();
//! scheduler.tick(Duration::from_millis(50), &mut log);
//! scheduler.tick(Duration::from_millis(50), &mut log);
//! assert_eq!(log, ["aim"]);
//! let done = scheduler.tick(Duration::from_millis(50), &mut log);
//! assert_eq!(log, ["aim", "fire"]);
//! assert_eq!(done.len(), 1);
//! ```

/// Cancellation requests shared with code outside the scheduler.
pub mod cancel;

/// The scheduler that advances running sequences.
pub mod scheduler;

/// Sequence definitions, steps and ids.
pub mod sequence;

/// Common imports.
pub mod prelude {
    pub use crate::cancel::{CancelRequest, Canceller};
    pub use crate::scheduler::{Completion, SequenceScheduler};
    pub use crate::sequence::{OwnerId, Sequence, SequenceId, Step};
}

pub use cancel::Canceller;
pub use scheduler::{Completion, SequenceScheduler};
pub use sequence::{OwnerId, Sequence, SequenceId, Step};
