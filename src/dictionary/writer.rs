use super::state::StoreState;
use crate::config::Config;
use crate::element::{ElementRef, GraphElement, ViewId};
use crate::error::{Result, TimegraphError};
use crate::timestamp::{SlotId, Timestamp};
use log::{debug, trace};
use parking_lot::RwLockWriteGuard;

/// Exclusive access to the dictionary.
///
/// Holding a writer blocks every reader, index query and observer refresh on
/// the same dictionary. Group the mutations of one logical graph change under
/// one writer; the lock is released when the writer drops.
pub struct DictionaryWriter<'a, N: GraphElement, E: GraphElement> {
    state: RwLockWriteGuard<'a, StoreState<N, E>>,
    config: &'a Config,
}

impl<'a, N: GraphElement, E: GraphElement> DictionaryWriter<'a, N, E> {
    pub(crate) fn new(state: RwLockWriteGuard<'a, StoreState<N, E>>, config: &'a Config) -> Self {
        Self { state, config }
    }

    fn indexing(&self) -> bool {
        self.config.index_timestamps
    }

    /// Slot of `timestamp`, assigning one if it is new.
    pub fn get_or_create_slot(&mut self, timestamp: f64) -> Result<SlotId> {
        let timestamp = Timestamp::new(timestamp)?;
        let (slot, created) = self.state.table.get_or_create(timestamp)?;
        if created {
            trace!("assigned slot {slot} to timestamp {timestamp}");
        }
        Ok(slot)
    }

    pub fn slot_of(&self, timestamp: f64) -> Result<Option<SlotId>> {
        Ok(self.state.table.slot_of(Timestamp::new(timestamp)?))
    }

    pub fn contains(&self, timestamp: f64) -> Result<bool> {
        Ok(self.slot_of(timestamp)?.is_some())
    }

    /// Forget `timestamp` and recycle its slot.
    ///
    /// Fails with `NotFound` for an unknown timestamp and with
    /// `InvalidArgument` while elements are still indexed at it.
    pub fn remove_timestamp(&mut self, timestamp: f64) -> Result<SlotId> {
        let timestamp = Timestamp::new(timestamp)?;
        let slot = self
            .state
            .table
            .slot_of(timestamp)
            .ok_or_else(|| TimegraphError::not_found(format!("timestamp {timestamp}")))?;
        if self.indexing() && self.state.main.has_entry(slot) {
            return Err(TimegraphError::invalid(format!(
                "timestamp {timestamp} still has elements indexed at slot {slot}"
            )));
        }
        self.state.table.remove(timestamp);
        trace!("reclaimed slot {slot} from timestamp {timestamp}");
        Ok(slot)
    }

    /// Mark `element` present at `timestamp`, returning the slot used.
    ///
    /// The caller records the returned slot in the element's value set.
    pub fn add_element(&mut self, timestamp: f64, element: ElementRef<'_, N, E>) -> Result<SlotId> {
        let slot = self.get_or_create_slot(timestamp)?;
        if self.indexing() {
            self.state.index_at(slot, element);
        }
        Ok(slot)
    }

    /// Mark `element` absent at `timestamp`.
    ///
    /// The element leaves the main index and every view index. If nothing is
    /// left at the timestamp in the main index, the timestamp is forgotten and
    /// its slot recycled.
    pub fn remove_element(
        &mut self,
        timestamp: f64,
        element: ElementRef<'_, N, E>,
    ) -> Result<SlotId> {
        let timestamp = Timestamp::new(timestamp)?;
        let slot = self
            .state
            .table
            .slot_of(timestamp)
            .ok_or_else(|| TimegraphError::not_found(format!("timestamp {timestamp}")))?;
        if self.indexing() && self.state.unindex_at(slot, element) {
            self.state.table.remove(timestamp);
            trace!("reclaimed slot {slot} from timestamp {timestamp}");
        }
        Ok(slot)
    }

    fn checked_slots(&self, element: ElementRef<'_, N, E>) -> Result<Vec<SlotId>> {
        let Some(slots) = element.timestamp_slots() else {
            return Ok(Vec::new());
        };
        for &slot in &slots {
            self.state.table.check_live(slot)?;
        }
        Ok(slots.into_vec())
    }

    /// Index `element` at every slot of its attached value set.
    ///
    /// All slots are validated before anything is indexed, so a failure leaves
    /// the indices untouched.
    pub fn index_element(&mut self, element: ElementRef<'_, N, E>) -> Result<()> {
        if !self.indexing() {
            return Ok(());
        }
        for slot in self.checked_slots(element)? {
            self.state.index_at(slot, element);
        }
        Ok(())
    }

    /// Undo [`index_element`](Self::index_element), recycling every slot the
    /// main index no longer uses.
    pub fn clear_element(&mut self, element: ElementRef<'_, N, E>) -> Result<()> {
        if !self.indexing() {
            return Ok(());
        }
        for slot in self.checked_slots(element)? {
            if self.state.unindex_at(slot, element) {
                if let Some(timestamp) = self.state.table.release(slot) {
                    trace!("reclaimed slot {slot} from timestamp {timestamp}");
                }
            }
        }
        Ok(())
    }

    /// Index `element` in one view's index only. A no-op when that view has
    /// no index.
    pub fn index_in_view(&mut self, view: ViewId, element: ElementRef<'_, N, E>) -> Result<()> {
        if !self.indexing() {
            return Ok(());
        }
        let slots = self.checked_slots(element)?;
        if let Some(view_index) = self.state.views.get_mut(&view) {
            for slot in slots {
                view_index.entries.add(slot, element);
            }
        }
        Ok(())
    }

    /// Remove `element` from one view's index only. Slots are never recycled
    /// here, since the main index is unaffected.
    pub fn clear_in_view(&mut self, view: ViewId, element: ElementRef<'_, N, E>) -> Result<()> {
        if !self.indexing() {
            return Ok(());
        }
        let slots = self.checked_slots(element)?;
        if let Some(view_index) = self.state.views.get_mut(&view) {
            for slot in slots {
                view_index.entries.remove(slot, element);
            }
        }
        Ok(())
    }

    /// Drop every timestamp and all index content. View indices stay
    /// registered, empty.
    pub fn clear(&mut self) {
        let state = &mut *self.state;
        state.table.clear();
        state.main.clear();
        for view_index in state.views.values_mut() {
            view_index.entries.clear();
        }
        debug!("cleared timestamp dictionary");
    }

    /// Drop all edge membership, recycling timestamps that only edges used.
    ///
    /// With no nodes indexed this is a full [`clear`](Self::clear), member-less
    /// timestamps included.
    pub fn clear_edges(&mut self) {
        if !self.state.main.has_nodes() {
            self.clear();
            return;
        }
        let state = &mut *self.state;
        let vacated = state.main.clear_edges();
        for view_index in state.views.values_mut() {
            view_index.entries.clear_edges();
        }
        for slot in &vacated {
            state.table.release(*slot);
        }
        debug!(
            "cleared edge timestamps, {} slots reclaimed",
            vacated.len()
        );
    }

    /// Number of live timestamps.
    pub fn len(&self) -> usize {
        self.state.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
