//! Generation-tagged entity handles and transforms.

use core::fmt;

use choreo_graph::variable::ObjectRef;
use choreo_sequence::OwnerId;
use glam::{Quat, Vec3};

/// Handle to a pooled entity.
///
/// Releasing an entity bumps the generation of its slot, so every handle
/// issued before the release stops resolving. The slot itself is reused by
/// later acquisitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityHandle {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl EntityHandle {
    /// Slot index in the pool.
    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot when the handle was issued.
    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Packs index and generation into one value, unique per acquisition.
    #[must_use]
    pub fn to_bits(&self) -> u64 {
        (u64::from(self.generation) << 32) | u64::from(self.index)
    }

    /// The sequence owner for this acquisition.
    #[must_use]
    pub fn owner(&self) -> OwnerId {
        OwnerId::new(self.to_bits())
    }

    /// The handle as a graph variable value.
    #[must_use]
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(self.to_bits())
    }

    /// Recovers a handle from [`to_bits`](Self::to_bits).
    #[must_use]
    pub fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }
}

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}v{}", self.index, self.generation)
    }
}

/// Position and orientation of an entity.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Transform {
    /// World position.
    pub position: Vec3,
    /// World orientation.
    pub orientation: Quat,
}

impl Transform {
    /// A transform at `position` with no rotation.
    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            orientation: Quat::IDENTITY,
        }
    }

    /// Returns the transform rotated so its forward axis faces `target`.
    #[must_use]
    pub fn looking_at(self, target: Vec3) -> Self {
        let direction = (target - self.position).normalize_or_zero();
        if direction == Vec3::ZERO {
            return self;
        }
        Self {
            orientation: Quat::from_rotation_arc(Vec3::NEG_Z, direction),
            ..self
        }
    }

    /// Forward direction of the orientation.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }
}
