//! Schedule identifiers for tick-based plugin updates.
//!
//! A schedule is a marker type. Layer 2 crates define the markers
//! (`OnFrameStart`, `OnStateEnter`, ...) and decide when to tick them;
//! plugins subscribe through [`Plugin::tick_schedules`](super::Plugin::tick_schedules).

use core::any::TypeId;
use variadics_please::all_tuples;

/// Identifier for a tick schedule, derived from a marker type.
///
/// ```
/// # use choreo_system::plugin::{Plugin, ScheduleId};
/// # use choreo_system::world::World;
/// pub struct OnFrameStart;
///
/// struct FrameCounter;
/// impl Plugin for FrameCounter {
///     fn build(&self, _world: &mut World) {}
///
///     fn tick_schedules(&self) -> Vec<ScheduleId> {
///         vec![ScheduleId::of::<OnFrameStart>()]
///     }
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScheduleId {
    type_id: TypeId,
    type_name: &'static str,
}

impl ScheduleId {
    /// Creates a `ScheduleId` for the given schedule marker type.
    #[must_use]
    pub fn of<S: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<S>(),
            type_name: core::any::type_name::<S>(),
        }
    }

    /// Returns the underlying `TypeId`.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the type name for debugging.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Schedule Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Marker trait for schedule types.
///
/// Carries no methods. [`ScheduleId::of`] accepts any `'static` type; the
/// trait lets [`IntoScheduleIds`] take schedules by bound.
pub trait Schedule: 'static {}

// ─────────────────────────────────────────────────────────────────────────────
// IntoScheduleIds Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Types that convert into a list of schedule IDs.
///
/// Implemented for single schedules and tuples of up to 16 schedules.
pub trait IntoScheduleIds {
    /// Returns the schedule IDs for this type.
    fn schedule_ids() -> Vec<ScheduleId>;
}

impl<S: Schedule> IntoScheduleIds for S {
    fn schedule_ids() -> Vec<ScheduleId> {
        vec![ScheduleId::of::<S>()]
    }
}

macro_rules! impl_into_schedule_ids_for_tuple {
    ($($S:ident),*) => {
        impl<$($S: Schedule),*> IntoScheduleIds for ($($S,)*) {
            fn schedule_ids() -> Vec<ScheduleId> {
                vec![$(ScheduleId::of::<$S>()),*]
            }
        }
    };
}

all_tuples!(impl_into_schedule_ids_for_tuple, 2, 16, S);
