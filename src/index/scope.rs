use crate::lock::LockScope;
use parking_lot::MappedRwLockReadGuard;
use rustc_hash::FxHashSet;
use std::collections::hash_set;
use std::fmt;
use std::hash::Hash;

/// Elements returned by a temporal index query.
///
/// A non-empty result keeps the dictionary's read lock held until it is
/// dropped (or passed to [`Members::done`]), so the index can't change while
/// the caller iterates. Empty results hold nothing.
pub struct Members<'a, T> {
    inner: Inner<'a, T>,
}

enum Inner<'a, T> {
    Empty,
    /// Borrowed straight out of a single index entry.
    Slot(MappedRwLockReadGuard<'a, FxHashSet<T>>),
    /// Union gathered from several entries; the scope keeps the lock held.
    Collected {
        set: FxHashSet<T>,
        _scope: LockScope<'a>,
    },
}

impl<'a, T: Eq + Hash> Members<'a, T> {
    pub(crate) fn empty() -> Self {
        Self { inner: Inner::Empty }
    }

    pub(crate) fn slot(guard: MappedRwLockReadGuard<'a, FxHashSet<T>>) -> Self {
        Self {
            inner: Inner::Slot(guard),
        }
    }

    pub(crate) fn collected(set: FxHashSet<T>, scope: LockScope<'a>) -> Self {
        if set.is_empty() {
            return Self::empty();
        }
        Self {
            inner: Inner::Collected { set, _scope: scope },
        }
    }

    fn set(&self) -> Option<&FxHashSet<T>> {
        match &self.inner {
            Inner::Empty => None,
            Inner::Slot(guard) => Some(guard),
            Inner::Collected { set, .. } => Some(set),
        }
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.set().map(FxHashSet::iter),
        }
    }

    pub fn len(&self) -> usize {
        self.set().map_or(0, FxHashSet::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, element: &T) -> bool {
        self.set().is_some_and(|set| set.contains(element))
    }

    /// Whether this result is pinning the dictionary's read lock.
    pub fn holds_lock(&self) -> bool {
        !matches!(self.inner, Inner::Empty)
    }

    /// Copy the elements out, leaving the lock held until `self` drops.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    /// Release the read lock early. Equivalent to dropping the result.
    pub fn done(self) {}
}

impl<T: Eq + Hash + fmt::Debug> fmt::Debug for Members<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Iterator over a borrowed [`Members`] result.
pub struct Iter<'s, T> {
    inner: Option<hash_set::Iter<'s, T>>,
}

impl<'s, T> Iterator for Iter<'s, T> {
    type Item = &'s T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.as_mut()?.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner
            .as_ref()
            .map_or((0, Some(0)), Iterator::size_hint)
    }
}

impl<'s, 'a, T: Eq + Hash> IntoIterator for &'s Members<'a, T> {
    type Item = &'s T;
    type IntoIter = Iter<'s, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lock::SharedLock;
    use parking_lot::{RwLock, RwLockReadGuard};

    #[test]
    fn test_slot_result_holds_lock_until_done() {
        let lock = RwLock::new([1_u32, 2, 3].into_iter().collect::<FxHashSet<_>>());
        let members = Members::slot(RwLockReadGuard::map(lock.read(), |set| set));

        assert_eq!(members.len(), 3);
        assert!(members.contains(&2));
        assert!(members.holds_lock());
        assert!(lock.try_write().is_none());

        members.done();
        assert!(lock.try_write().is_some());
    }

    #[test]
    fn test_empty_collected_result_releases_scope() {
        let lock = RwLock::new(());
        let members: Members<'_, u32> = Members::collected(FxHashSet::default(), lock.read_scope());

        assert!(members.is_empty());
        assert!(!members.holds_lock());
        assert!(lock.try_write().is_some());
        assert_eq!(members.iter().count(), 0);
    }

    #[test]
    fn test_collected_result_iterates_union() {
        let lock = RwLock::new(());
        let set: FxHashSet<u32> = [4, 9].into_iter().collect();
        let members = Members::collected(set, lock.read_scope());

        let mut seen: Vec<u32> = (&members).into_iter().copied().collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![4, 9]);
        assert!(lock.try_write().is_none());
    }
}
