//! Shared reader/writer lock capability.
//!
//! The dictionary keeps its state behind a `parking_lot::RwLock`; that lock is
//! also the one observers read under. Consumers that only need to hold the
//! lock, not see the data, get a type-erased [`LockScope`].

use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};

/// A held read lock whose protected data is hidden. Dropping it releases the lock.
pub type LockScope<'a> = MappedRwLockReadGuard<'a, ()>;

/// Anything that can hand out read scopes on the store's shared lock.
pub trait SharedLock: Send + Sync {
    fn read_scope(&self) -> LockScope<'_>;
}

impl<T: Send + Sync> SharedLock for RwLock<T> {
    fn read_scope(&self) -> LockScope<'_> {
        erase(self.read_recursive())
    }
}

/// Keep the lock held but forget what it protects.
pub(crate) fn erase<T>(guard: RwLockReadGuard<'_, T>) -> LockScope<'_> {
    RwLockReadGuard::map(guard, |_| &())
}
