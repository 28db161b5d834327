use super::slots::SlotTable;
use crate::config::Config;
use crate::element::{ElementRef, GraphElement, GraphView, ViewId};
use crate::index::IndexEntries;
use crate::lock::{self, LockScope, SharedLock};
use crate::timestamp::SlotId;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Which index a query handle reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum IndexTarget {
    Main,
    View(ViewId),
}

/// Index maintained for one non-main view.
pub(crate) struct ViewIndex<N, E> {
    pub(crate) view: Arc<dyn GraphView<N, E>>,
    pub(crate) entries: IndexEntries<N, E>,
}

/// Everything guarded by the dictionary lock.
pub(crate) struct StoreState<N, E> {
    pub(crate) table: SlotTable,
    pub(crate) main: IndexEntries<N, E>,
    pub(crate) views: FxHashMap<ViewId, ViewIndex<N, E>>,
}

impl<N: GraphElement, E: GraphElement> StoreState<N, E> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            table: SlotTable::with_capacity(capacity),
            main: IndexEntries::with_capacity(capacity),
            views: FxHashMap::default(),
        }
    }

    /// Index behind `target`, `None` once a view index has been deleted.
    pub(crate) fn entries(&self, target: IndexTarget) -> Option<&IndexEntries<N, E>> {
        match target {
            IndexTarget::Main => Some(&self.main),
            IndexTarget::View(id) => self.views.get(&id).map(|v| &v.entries),
        }
    }

    /// Record `element` at `slot` in the main index and every view containing it.
    pub(crate) fn index_at(&mut self, slot: SlotId, element: ElementRef<'_, N, E>) {
        self.main.add(slot, element);
        for view_index in self.views.values_mut() {
            if element.is_in(view_index.view.as_ref()) {
                view_index.entries.add(slot, element);
            }
        }
    }

    /// Drop `element` at `slot` from every index, returning whether the main
    /// index has nothing left there.
    pub(crate) fn unindex_at(&mut self, slot: SlotId, element: ElementRef<'_, N, E>) -> bool {
        self.main.remove(slot, element);
        for view_index in self.views.values_mut() {
            view_index.entries.remove(slot, element);
        }
        !self.main.has_entry(slot)
    }
}

/// State plus the lock guarding it, shared by the dictionary handle, its
/// index handles and any observer bound to it.
pub(crate) struct Shared<N, E> {
    state: RwLock<StoreState<N, E>>,
    pub(crate) config: Config,
}

impl<N: GraphElement, E: GraphElement> Shared<N, E> {
    pub(crate) fn new(config: Config) -> Self {
        let state = StoreState::new(config.slot_capacity_hint);
        Self {
            state: RwLock::new(state),
            config,
        }
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, StoreState<N, E>> {
        if self.config.reentrant_reads {
            self.state.read_recursive()
        } else {
            self.state.read()
        }
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, StoreState<N, E>> {
        self.state.write()
    }

    pub(crate) fn try_write(&self) -> Option<RwLockWriteGuard<'_, StoreState<N, E>>> {
        self.state.try_write()
    }
}

impl<N: GraphElement, E: GraphElement> SharedLock for Shared<N, E> {
    fn read_scope(&self) -> LockScope<'_> {
        lock::erase(self.read())
    }
}
