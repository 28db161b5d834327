//! Sorted slot → value storage shared by every typed value set.

use super::SlotValue;
use crate::error::{Result, TimegraphError};
use crate::timestamp::SlotId;
use std::mem;

/// Sparse, ordered association from timestamp slot to a value.
///
/// Slots are kept strictly increasing in a contiguous array and located by
/// binary search. Storage grows by exactly one element when an insert finds
/// no spare capacity, so a run of `n` inserts into an empty set costs `O(n²)`
/// moves. Callers relying on tight memory for many small per-element sets
/// depend on this; `capacity()` exposes it. Removals never shrink storage, and
/// the freed capacity is reused by later inserts.
#[derive(Debug, Clone)]
pub struct TimestampValueSet<V> {
    slots: Box<[SlotId]>,
    values: Box<[V]>,
    size: usize,
}

impl<V: SlotValue> TimestampValueSet<V> {
    /// Create an empty set with zero capacity.
    pub fn new() -> Self {
        Self {
            slots: Box::default(),
            values: Box::default(),
            size: 0,
        }
    }

    /// Create an empty set with room for `capacity` slots before growing.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![SlotId::MAX; capacity].into_boxed_slice(),
            values: vec![V::default(); capacity].into_boxed_slice(),
            size: 0,
        }
    }

    #[inline]
    fn search(&self, slot: SlotId) -> std::result::Result<usize, usize> {
        self.slots[..self.size].binary_search(&slot)
    }

    /// Insert or overwrite the value at `slot`, returning the previous value.
    pub fn put(&mut self, slot: SlotId, value: V) -> Option<V> {
        match self.search(slot) {
            Ok(index) => Some(mem::replace(&mut self.values[index], value)),
            Err(index) => {
                self.insert_at(index, slot, value);
                None
            }
        }
    }

    fn insert_at(&mut self, index: usize, slot: SlotId, value: V) {
        if self.size < self.slots.len() {
            // Spare capacity: the unused cell at `size` rotates down to `index`.
            self.slots[index..=self.size].rotate_right(1);
            self.values[index..=self.size].rotate_right(1);
            self.slots[index] = slot;
            self.values[index] = value;
        } else {
            self.slots = grow_by_one(mem::take(&mut self.slots), index, slot);
            self.values = grow_by_one(mem::take(&mut self.values), index, value);
        }
        self.size += 1;
    }

    /// Remove the value at `slot`. Returns `None` when the slot was absent.
    pub fn remove(&mut self, slot: SlotId) -> Option<V> {
        let index = self.search(slot).ok()?;
        let removed = mem::take(&mut self.values[index]);
        self.slots[index..self.size].rotate_left(1);
        self.values[index..self.size].rotate_left(1);
        self.size -= 1;
        Some(removed)
    }

    /// Value stored at `slot`, or `NotFound`.
    pub fn get(&self, slot: SlotId) -> Result<V> {
        self.get_ref(slot)
            .cloned()
            .ok_or_else(|| TimegraphError::not_found(format!("no value at slot {slot}")))
    }

    pub fn get_ref(&self, slot: SlotId) -> Option<&V> {
        self.search(slot).ok().map(|index| &self.values[index])
    }

    pub fn contains(&self, slot: SlotId) -> bool {
        self.search(slot).is_ok()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of slots the backing arrays hold before the next reallocation.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Live slots in ascending order.
    pub fn slots(&self) -> &[SlotId] {
        &self.slots[..self.size]
    }

    /// Live slots in ascending order, copied out.
    pub fn timestamps(&self) -> Vec<SlotId> {
        self.slots().to_vec()
    }

    /// Live values ordered by ascending slot.
    pub fn to_vec(&self) -> Vec<V> {
        self.values[..self.size].to_vec()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &V)> + '_ {
        self.slots[..self.size]
            .iter()
            .copied()
            .zip(self.values[..self.size].iter())
    }

    /// Drop every value and release the backing storage.
    pub fn clear(&mut self) {
        self.slots = Box::default();
        self.values = Box::default();
        self.size = 0;
    }
}

fn grow_by_one<T>(current: Box<[T]>, index: usize, item: T) -> Box<[T]> {
    let mut grown = Vec::with_capacity(current.len() + 1);
    let mut head = current.into_vec();
    let rest = head.split_off(index);
    grown.extend(head);
    grown.push(item);
    grown.extend(rest);
    grown.into_boxed_slice()
}

impl<V: SlotValue> Default for TimestampValueSet<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: SlotValue> PartialEq for TimestampValueSet<V> {
    fn eq(&self, other: &Self) -> bool {
        self.slots() == other.slots() && self.values[..self.size] == other.values[..other.size]
    }
}

impl<V: SlotValue> FromIterator<(SlotId, V)> for TimestampValueSet<V> {
    fn from_iter<I: IntoIterator<Item = (SlotId, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (slot, value) in iter {
            set.put(slot, value);
        }
        set
    }
}
