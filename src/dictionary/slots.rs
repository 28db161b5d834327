//! Timestamp ↔ slot id assignment.

use crate::error::{Result, TimegraphError};
use crate::timestamp::{SlotId, Timestamp};
use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, BTreeSet};

/// Bidirectional timestamp/slot table with slot recycling.
///
/// New timestamps take the smallest reclaimed slot, or extend the allocated
/// range when none is free. Reclaimed slots keep their position in
/// `times` as `NaN` until reused.
#[derive(Debug, Clone, Default)]
pub(crate) struct SlotTable {
    by_value: FxHashMap<Timestamp, SlotId>,
    sorted: BTreeMap<Timestamp, SlotId>,
    free: BTreeSet<SlotId>,
    times: Vec<f64>,
}

impl SlotTable {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let mut by_value = FxHashMap::default();
        by_value.reserve(capacity);
        Self {
            by_value,
            sorted: BTreeMap::new(),
            free: BTreeSet::new(),
            times: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn slot_of(&self, timestamp: Timestamp) -> Option<SlotId> {
        self.by_value.get(&timestamp).copied()
    }

    /// Look up `timestamp`, assigning it a slot if it is new.
    pub(crate) fn get_or_create(&mut self, timestamp: Timestamp) -> Result<(SlotId, bool)> {
        if let Some(slot) = self.slot_of(timestamp) {
            return Ok((slot, false));
        }

        let slot = match self.free.pop_first() {
            Some(slot) => {
                self.times[slot as usize] = timestamp.value();
                slot
            }
            None => {
                let slot = SlotId::try_from(self.times.len())
                    .map_err(|_| TimegraphError::invalid("slot id space exhausted"))?;
                self.times.push(timestamp.value());
                slot
            }
        };
        self.by_value.insert(timestamp, slot);
        self.sorted.insert(timestamp, slot);
        Ok((slot, true))
    }

    /// Forget `timestamp` and put its slot on the free list.
    pub(crate) fn remove(&mut self, timestamp: Timestamp) -> Option<SlotId> {
        let slot = self.by_value.remove(&timestamp)?;
        self.sorted.remove(&timestamp);
        self.times[slot as usize] = f64::NAN;
        self.free.insert(slot);
        Some(slot)
    }

    /// Reclaim a live slot by id.
    pub(crate) fn release(&mut self, slot: SlotId) -> Option<Timestamp> {
        let timestamp = self.live_timestamp(slot)?;
        self.remove(timestamp);
        Some(timestamp)
    }

    fn live_timestamp(&self, slot: SlotId) -> Option<Timestamp> {
        let value = *self.times.get(slot as usize)?;
        Timestamp::new(value).ok()
    }

    /// Ensure `slot` is allocated and currently maps to a timestamp.
    pub(crate) fn check_live(&self, slot: SlotId) -> Result<Timestamp> {
        let index = slot as usize;
        if index >= self.times.len() {
            return Err(TimegraphError::IndexOutOfBounds {
                index,
                length: self.times.len(),
            });
        }
        self.live_timestamp(slot)
            .ok_or_else(|| TimegraphError::not_found(format!("slot {slot} has been reclaimed")))
    }

    /// Live timestamps in ascending order with their slots.
    pub(crate) fn iter(&self) -> impl DoubleEndedIterator<Item = (Timestamp, SlotId)> + '_ {
        self.sorted.iter().map(|(ts, slot)| (*ts, *slot))
    }

    /// Live timestamps in `[from, to]`, ascending.
    pub(crate) fn range(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> impl Iterator<Item = (Timestamp, SlotId)> + '_ {
        self.sorted
            .range(from..)
            .take_while(move |(ts, _)| **ts <= to)
            .map(|(ts, slot)| (*ts, *slot))
    }

    pub(crate) fn first(&self) -> Option<Timestamp> {
        self.sorted.keys().next().copied()
    }

    pub(crate) fn last(&self) -> Option<Timestamp> {
        self.sorted.keys().next_back().copied()
    }

    /// Number of live timestamps.
    pub(crate) fn len(&self) -> usize {
        self.by_value.len()
    }

    /// Size of the allocated slot range, live and reclaimed.
    pub(crate) fn allocated_len(&self) -> usize {
        self.times.len()
    }

    pub(crate) fn free_len(&self) -> usize {
        self.free.len()
    }

    pub(crate) fn clear(&mut self) {
        self.by_value.clear();
        self.sorted.clear();
        self.free.clear();
        self.times.clear();
    }
}
