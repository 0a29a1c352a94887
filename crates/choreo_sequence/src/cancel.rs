//! Cancellation requests raised outside the scheduler.
//!
//! A [`Canceller`] is a cheap cloneable handle to the scheduler's request
//! queue. Code that runs inside a step, such as a pool releasing an entity,
//! holds one and files requests without needing the scheduler itself. The
//! scheduler consults pending requests before every step, so a request made
//! mid-tick stops the affected sequences before their next step.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::sequence::{OwnerId, SequenceId};

/// A pending cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelRequest {
    /// Every sequence of the owner.
    Owner(OwnerId),
    /// One sequence.
    Sequence(SequenceId),
}

impl CancelRequest {
    /// Returns true if the request covers the given sequence.
    #[must_use]
    pub fn covers(&self, id: SequenceId, owner: OwnerId) -> bool {
        match self {
            CancelRequest::Owner(o) => *o == owner,
            CancelRequest::Sequence(s) => *s == id,
        }
    }
}

/// Shared handle for requesting cancellations.
#[derive(Debug, Clone, Default)]
pub struct Canceller {
    requests: Arc<Mutex<Vec<CancelRequest>>>,
}

impl Canceller {
    /// Creates a handle with an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of every sequence owned by `owner`.
    pub fn cancel_owner(&self, owner: OwnerId) {
        self.requests.lock().push(CancelRequest::Owner(owner));
    }

    /// Requests cancellation of one sequence.
    pub fn cancel_sequence(&self, id: SequenceId) {
        self.requests.lock().push(CancelRequest::Sequence(id));
    }

    /// Returns true if a pending request covers the sequence.
    #[must_use]
    pub fn is_requested(&self, id: SequenceId, owner: OwnerId) -> bool {
        self.requests.lock().iter().any(|r| r.covers(id, owner))
    }

    /// Number of pending requests.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.requests.lock().len()
    }

    /// Takes every pending request.
    pub(crate) fn drain(&self) -> Vec<CancelRequest> {
        core::mem::take(&mut *self.requests.lock())
    }

    /// Returns true if both handles feed the same queue.
    #[must_use]
    pub fn same_queue(&self, other: &Canceller) -> bool {
        Arc::ptr_eq(&self.requests, &other.requests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(index: u32) -> SequenceId {
        SequenceId {
            index,
            generation: 0,
        }
    }

    #[test]
    fn requests_are_shared_between_clones() {
        let canceller = Canceller::new();
        let handle = canceller.clone();
        handle.cancel_owner(OwnerId::new(9));

        assert!(canceller.same_queue(&handle));
        assert!(canceller.is_requested(seq(0), OwnerId::new(9)));
        assert!(!canceller.is_requested(seq(0), OwnerId::new(8)));
        assert_eq!(canceller.drain(), vec![CancelRequest::Owner(OwnerId::new(9))]);
        assert_eq!(handle.pending(), 0);
    }

    #[test]
    fn sequence_requests_match_exact_ids() {
        let canceller = Canceller::new();
        canceller.cancel_sequence(seq(2));
        assert!(canceller.is_requested(seq(2), OwnerId::new(1)));
        assert!(!canceller.is_requested(seq(3), OwnerId::new(1)));
        assert!(!Canceller::new().same_queue(&canceller));
    }
}
