//! Resource storage and management.

use core::any::{Any, TypeId};
use hashbrown::HashMap;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A value that can live in a [`Resources`] container.
///
/// Any `Send + Sync + 'static` type is a resource.
pub trait Resource: Send + Sync + 'static {
    /// Returns the type name for debugging purposes.
    fn type_name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

impl<T: Send + Sync + 'static> Resource for T {}

/// Marker trait for global, read-only resources.
///
/// Global resources hold configuration that plugins publish during `build()`
/// and everyone else reads: pool sizing, executor limits, tracing settings.
/// The world only hands out read guards for them.
///
/// ```
/// use choreo_system::resource::GlobalResource;
/// use choreo_system::world::World;
///
/// struct SpawnBudget { per_tick: usize }
/// impl GlobalResource for SpawnBudget {}
///
/// let mut world = World::new();
/// world.insert_global(SpawnBudget { per_tick: 2 });
/// assert_eq!(world.get_global::<SpawnBudget>().unwrap().per_tick, 2);
/// ```
pub trait GlobalResource: Resource {}

/// Unique identifier for a resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceId(TypeId);

impl ResourceId {
    /// Creates a `ResourceId` for the given type.
    #[must_use]
    pub fn of<T: Resource>() -> Self {
        Self(TypeId::of::<T>())
    }

    /// Returns the underlying `TypeId`.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.0
    }
}

/// Errors that can occur during resource operations.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// The requested resource type was not found in the container.
    #[error("resource not found: {0}")]
    NotFound(&'static str),

    /// The resource is borrowed in a way that conflicts with the request.
    #[error("resource already borrowed: {0}")]
    BorrowConflict(&'static str),
}

type BoxedResource = Box<dyn Any + Send + Sync>;

/// Type-keyed storage with `RwLock`-guarded access per entry.
///
/// ```
/// use choreo_system::resource::Resources;
///
/// struct Score(u32);
///
/// let mut resources = Resources::new();
/// resources.insert(Score(0));
/// resources.get_mut::<Score>().unwrap().0 += 5;
/// assert_eq!(resources.get::<Score>().unwrap().0, 5);
/// ```
#[derive(Default)]
pub struct Resources {
    storage: HashMap<ResourceId, RwLock<BoxedResource>>,
}

impl Resources {
    /// Creates a new empty resource container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            storage: HashMap::new(),
        }
    }

    /// Inserts a resource, returning the previous value of the same type.
    pub fn insert<T: Resource>(&mut self, resource: T) -> Option<T> {
        self.storage
            .insert(ResourceId::of::<T>(), RwLock::new(Box::new(resource)))
            .and_then(|old| old.into_inner().downcast::<T>().ok().map(|boxed| *boxed))
    }

    /// Returns `true` if a resource of type `T` exists.
    #[must_use]
    pub fn contains<T: Resource>(&self) -> bool {
        self.storage.contains_key(&ResourceId::of::<T>())
    }

    /// Gets a read guard for a resource.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::NotFound`] if the type is not stored
    /// - [`ResourceError::BorrowConflict`] if it is write-borrowed
    pub fn get<T: Resource>(&self) -> Result<ResourceRef<'_, T>, ResourceError> {
        let type_name = core::any::type_name::<T>();
        let entry = self
            .storage
            .get(&ResourceId::of::<T>())
            .ok_or(ResourceError::NotFound(type_name))?;
        let guard = entry
            .try_read()
            .ok_or(ResourceError::BorrowConflict(type_name))?;

        Ok(ResourceRef {
            guard,
            _marker: core::marker::PhantomData,
        })
    }

    /// Gets a write guard for a resource.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::NotFound`] if the type is not stored
    /// - [`ResourceError::BorrowConflict`] if it is borrowed at all
    pub fn get_mut<T: Resource>(&self) -> Result<ResourceRefMut<'_, T>, ResourceError> {
        let type_name = core::any::type_name::<T>();
        let entry = self
            .storage
            .get(&ResourceId::of::<T>())
            .ok_or(ResourceError::NotFound(type_name))?;
        let guard = entry
            .try_write()
            .ok_or(ResourceError::BorrowConflict(type_name))?;

        Ok(ResourceRefMut {
            guard,
            _marker: core::marker::PhantomData,
        })
    }

    /// Removes a resource and returns it.
    pub fn remove<T: Resource>(&mut self) -> Option<T> {
        self.storage
            .remove(&ResourceId::of::<T>())
            .and_then(|entry| entry.into_inner().downcast::<T>().ok().map(|boxed| *boxed))
    }

    /// Removes all resources.
    pub fn clear(&mut self) {
        self.storage.clear();
    }

    /// Returns the number of resources stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Returns `true` if no resources are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

/// Read guard returned by [`Resources::get`].
pub struct ResourceRef<'a, T: Resource> {
    guard: RwLockReadGuard<'a, BoxedResource>,
    _marker: core::marker::PhantomData<&'a T>,
}

impl<T: Resource> core::ops::Deref for ResourceRef<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        // Entries are keyed by ResourceId::of::<T>(), so the downcast holds.
        self.guard
            .downcast_ref::<T>()
            .expect("resource type mismatch (this is a bug)")
    }
}

/// Write guard returned by [`Resources::get_mut`].
pub struct ResourceRefMut<'a, T: Resource> {
    guard: RwLockWriteGuard<'a, BoxedResource>,
    _marker: core::marker::PhantomData<&'a mut T>,
}

impl<T: Resource> core::ops::Deref for ResourceRefMut<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.guard
            .downcast_ref::<T>()
            .expect("resource type mismatch (this is a bug)")
    }
}

impl<T: Resource> core::ops::DerefMut for ResourceRefMut<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.guard
            .downcast_mut::<T>()
            .expect("resource type mismatch (this is a bug)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Lives(u8);

    #[derive(Debug, PartialEq)]
    struct Arena(&'static str);

    #[test]
    fn insert_replaces_and_returns_old() {
        let mut resources = Resources::new();
        assert!(resources.insert(Lives(3)).is_none());
        assert_eq!(resources.insert(Lives(2)), Some(Lives(3)));
        assert_eq!(resources.get::<Lives>().unwrap().0, 2);
    }

    #[test]
    fn write_guard_mutates() {
        let mut resources = Resources::new();
        resources.insert(Lives(3));
        resources.get_mut::<Lives>().unwrap().0 -= 1;
        assert_eq!(*resources.get::<Lives>().unwrap(), Lives(2));
    }

    #[test]
    fn conflicting_borrows_are_rejected() {
        let mut resources = Resources::new();
        resources.insert(Lives(3));

        {
            let _read = resources.get::<Lives>().unwrap();
            let _second_read = resources.get::<Lives>().unwrap();
            assert!(matches!(
                resources.get_mut::<Lives>(),
                Err(ResourceError::BorrowConflict(_))
            ));
        }
        {
            let _write = resources.get_mut::<Lives>().unwrap();
            assert!(matches!(
                resources.get::<Lives>(),
                Err(ResourceError::BorrowConflict(_))
            ));
        }
        assert!(resources.get_mut::<Lives>().is_ok());
    }

    #[test]
    fn remove_and_missing() {
        let mut resources = Resources::new();
        resources.insert(Lives(1));
        resources.insert(Arena("pit"));
        assert_eq!(resources.len(), 2);

        assert_eq!(resources.remove::<Lives>(), Some(Lives(1)));
        assert!(resources.remove::<Lives>().is_none());
        assert!(matches!(
            resources.get::<Lives>(),
            Err(ResourceError::NotFound(_))
        ));
        assert!(resources.contains::<Arena>());

        resources.clear();
        assert!(resources.is_empty());
    }

    #[test]
    fn resource_id_wraps_type_id() {
        assert_eq!(ResourceId::of::<Lives>().type_id(), TypeId::of::<Lives>());
        assert_ne!(ResourceId::of::<Lives>(), ResourceId::of::<Arena>());
    }
}
