use std::{
    rc::{Rc, Weak},
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

/// A single-threaded, reference-counted handle with interior mutability.
///
/// `StResource` is how the map shares its world context (`GameDef`) and its own
/// metadata with every sector and block it creates. Cloning the handle is cheap and
/// every clone sees the same underlying value.
///
/// # Examples
///
/// ```
/// use voxel_map::core::StResource;
///
/// let resource = StResource::new(vec![1, 2, 3]);
/// let clone = resource.clone();
///
/// clone.get_mut().push(4);
/// assert_eq!(resource.get().len(), 4);
/// ```
///
/// # Panics
/// - Panics if a read lock is held while trying to acquire a write lock in the same thread
/// - Panics if the lock has been poisoned by an earlier panic
pub struct StResource<T> {
    resource: Rc<RwLock<T>>,
}

impl<T> StResource<T> {
    /// Creates a new `StResource` containing the given value.
    pub fn new(resource: T) -> Self {
        Self {
            resource: Rc::new(RwLock::new(resource)),
        }
    }

    /// Returns a read-only guard over the contained value.
    ///
    /// # Panics
    /// Panics if the lock is poisoned or cannot be acquired.
    pub fn get(&self) -> RwLockReadGuard<'_, T> {
        self.resource.read().unwrap()
    }

    /// Returns a mutable guard over the contained value.
    ///
    /// # Panics
    /// Panics if the lock is poisoned or cannot be acquired.
    pub fn get_mut(&self) -> RwLockWriteGuard<'_, T> {
        self.resource.write().unwrap()
    }

    /// Creates a non-owning back-reference to this resource.
    ///
    /// The returned `StWeak` does not keep the value alive, which makes it suitable
    /// for child-to-parent links such as a sector pointing back at its map.
    pub fn downgrade(&self) -> StWeak<T> {
        StWeak {
            resource: Rc::downgrade(&self.resource),
        }
    }

    /// Returns `true` if both handles point at the same value.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.resource, &other.resource)
    }
}

impl<T> Clone for StResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}

/// A non-owning back-reference to an [`StResource`].
///
/// # Examples
///
/// ```
/// use voxel_map::core::StResource;
///
/// let parent = StResource::new("map");
/// let back_ref = parent.downgrade();
/// assert_eq!(*back_ref.upgrade().unwrap().get(), "map");
///
/// drop(parent);
/// assert!(back_ref.upgrade().is_none());
/// ```
pub struct StWeak<T> {
    resource: Weak<RwLock<T>>,
}

impl<T> StWeak<T> {
    /// Attempts to recover a strong handle.
    ///
    /// # Returns
    /// `None` if every strong handle has already been dropped.
    pub fn upgrade(&self) -> Option<StResource<T>> {
        self.resource.upgrade().map(|resource| StResource { resource })
    }
}

impl<T> Clone for StWeak<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_value() {
        let a = StResource::new(1u32);
        let b = a.clone();
        *b.get_mut() += 1;
        assert_eq!(*a.get(), 2);
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&StResource::new(2u32)));
    }

    #[test]
    fn test_weak_does_not_keep_value_alive() {
        let a = StResource::new(String::from("world"));
        let weak = a.downgrade();
        assert!(weak.upgrade().is_some());
        drop(a);
        assert!(weak.upgrade().is_none());
    }
}
