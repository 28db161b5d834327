//! The timestamp dictionary: one per graph store.
//!
//! Maps every distinct timestamp to a dense slot id, owns the main temporal
//! index and lazily built per-view indices, and carries the reader/writer lock
//! that index queries and change observers share.

mod slots;
pub(crate) mod state;
mod writer;

pub use writer::DictionaryWriter;

use crate::builder::DictionaryBuilder;
use crate::config::Config;
use crate::element::{ElementRef, GraphElement, GraphView};
use crate::error::{Result, TimegraphError};
use crate::index::{IndexEntries, TemporalIndex};
use crate::lock::{LockScope, SharedLock};
use crate::observer::{ChangeObserver, GraphVersion};
use crate::timestamp::{SlotId, Timestamp};
use log::debug;
use state::{IndexTarget, Shared, ViewIndex};
use std::fmt;
use std::sync::Arc;

/// Handle to a timestamp dictionary.
///
/// Cloning is cheap and every clone refers to the same dictionary. The
/// convenience mutators take the write lock for a single call; use
/// [`write`](Self::write) to batch several mutations under one lock.
///
/// # Example
///
/// ```rust
/// use timegraph::prelude::*;
///
/// let graph = MemoryGraph::new();
/// let dict = TimestampDictionary::<Node, Edge>::new();
///
/// let a = graph.create_node("a");
/// let slot = dict.add_element(1.5, ElementRef::Node(&a))?;
/// a.set_value(slot, TemporalValue::Boolean(true))?;
///
/// let index = dict.main_index()?;
/// assert!(index.get_nodes(1.5)?.contains(&a));
/// assert_eq!(index.get_min_timestamp(), 1.5);
/// # Ok::<(), timegraph::TimegraphError>(())
/// ```
pub struct TimestampDictionary<N: GraphElement, E: GraphElement> {
    shared: Arc<Shared<N, E>>,
}

impl<N: GraphElement, E: GraphElement> Clone for TimestampDictionary<N, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<N: GraphElement, E: GraphElement> TimestampDictionary<N, E> {
    /// Create a dictionary with the default configuration.
    pub fn new() -> Self {
        Self::from_valid_config(Config::default())
    }

    /// Create a dictionary, rejecting an invalid configuration.
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().map_err(TimegraphError::InvalidConfig)?;
        Ok(Self::from_valid_config(config))
    }

    pub fn builder() -> DictionaryBuilder {
        DictionaryBuilder::new()
    }

    fn from_valid_config(config: Config) -> Self {
        debug!(
            "creating timestamp dictionary (indexing: {}, reentrant reads: {})",
            config.index_timestamps, config.reentrant_reads
        );
        Self {
            shared: Arc::new(Shared::new(config)),
        }
    }

    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    /// Take the write lock.
    pub fn write(&self) -> DictionaryWriter<'_, N, E> {
        DictionaryWriter::new(self.shared.write(), &self.shared.config)
    }

    /// Take the write lock if no reader or writer holds it.
    pub fn try_write(&self) -> Option<DictionaryWriter<'_, N, E>> {
        let guard = self.shared.try_write()?;
        Some(DictionaryWriter::new(guard, &self.shared.config))
    }

    /// Hold the read lock without looking at the data.
    pub fn read(&self) -> LockScope<'_> {
        self.shared.read_scope()
    }

    /// Lock capability for observers created outside this dictionary.
    pub fn shared_lock(&self) -> Arc<dyn SharedLock> {
        self.shared.clone()
    }

    // Single-call mutators.

    pub fn get_or_create_slot(&self, timestamp: f64) -> Result<SlotId> {
        self.write().get_or_create_slot(timestamp)
    }

    pub fn remove_timestamp(&self, timestamp: f64) -> Result<SlotId> {
        self.write().remove_timestamp(timestamp)
    }

    pub fn add_element(&self, timestamp: f64, element: ElementRef<'_, N, E>) -> Result<SlotId> {
        self.write().add_element(timestamp, element)
    }

    pub fn remove_element(&self, timestamp: f64, element: ElementRef<'_, N, E>) -> Result<SlotId> {
        self.write().remove_element(timestamp, element)
    }

    pub fn index_element(&self, element: ElementRef<'_, N, E>) -> Result<()> {
        self.write().index_element(element)
    }

    pub fn clear_element(&self, element: ElementRef<'_, N, E>) -> Result<()> {
        self.write().clear_element(element)
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    pub fn clear_edges(&self) {
        self.write().clear_edges();
    }

    // Lookups.

    pub fn contains(&self, timestamp: f64) -> Result<bool> {
        Ok(self.slot_of(timestamp)?.is_some())
    }

    pub fn slot_of(&self, timestamp: f64) -> Result<Option<SlotId>> {
        let timestamp = Timestamp::new(timestamp)?;
        Ok(self.shared.read().table.slot_of(timestamp))
    }

    /// Timestamp currently held by `slot`.
    pub fn timestamp_of(&self, slot: SlotId) -> Result<f64> {
        Ok(self.shared.read().table.check_live(slot)?.value())
    }

    /// Resolve a batch of slots, e.g. the slots of an element's value set.
    pub fn timestamps_of(&self, slots: &[SlotId]) -> Result<Vec<f64>> {
        let state = self.shared.read();
        slots
            .iter()
            .map(|&slot| state.table.check_live(slot).map(Timestamp::value))
            .collect()
    }

    /// Live timestamps in ascending order with their slots.
    pub fn timestamps(&self) -> Vec<(f64, SlotId)> {
        self.shared
            .read()
            .table
            .iter()
            .map(|(ts, slot)| (ts.value(), slot))
            .collect()
    }

    /// Number of live timestamps.
    pub fn len(&self) -> usize {
        self.shared.read().table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the allocated slot range, including reclaimed slots.
    pub fn allocated_len(&self) -> usize {
        self.shared.read().table.allocated_len()
    }

    // Indices.

    fn require_indexing(&self) -> Result<()> {
        if self.shared.config.index_timestamps {
            Ok(())
        } else {
            Err(TimegraphError::IndexingDisabled)
        }
    }

    /// Query handle for the whole graph.
    pub fn main_index(&self) -> Result<TemporalIndex<N, E>> {
        self.require_indexing()?;
        Ok(TemporalIndex::new(Arc::clone(&self.shared), IndexTarget::Main))
    }

    /// Query handle for `view`, building its index on first request.
    ///
    /// The main view resolves to the main index. A freshly built view index
    /// holds, for every element the view contains, every slot of its value set.
    pub fn get_view_index(&self, view: Arc<dyn GraphView<N, E>>) -> Result<TemporalIndex<N, E>> {
        self.require_indexing()?;
        if view.is_main_view() {
            return self.main_index();
        }

        let id = view.view_id();
        let mut state = self.shared.write();
        if !state.views.contains_key(&id) {
            let mut entries = IndexEntries::with_capacity(state.table.allocated_len());
            for node in view.nodes() {
                for slot in node.timestamp_slots().unwrap_or_default() {
                    state.table.check_live(slot)?;
                    entries.add_node(slot, node.clone());
                }
            }
            for edge in view.edges() {
                for slot in edge.timestamp_slots().unwrap_or_default() {
                    state.table.check_live(slot)?;
                    entries.add_edge(slot, edge.clone());
                }
            }
            debug!(
                "built temporal index for {id}: {} node and {} edge memberships",
                entries.node_count(),
                entries.edge_count()
            );
            state.views.insert(id, ViewIndex { view, entries });
        }
        Ok(TemporalIndex::new(Arc::clone(&self.shared), IndexTarget::View(id)))
    }

    /// Drop the index of `view`. Returns whether one existed.
    ///
    /// Handles obtained earlier keep working but see an empty index.
    pub fn delete_view_index(&self, view: &dyn GraphView<N, E>) -> Result<bool> {
        if view.is_main_view() {
            return Err(TimegraphError::invalid(
                "the main view's temporal index can't be deleted",
            ));
        }
        let removed = self.shared.write().views.remove(&view.view_id()).is_some();
        if removed {
            debug!("deleted temporal index for {}", view.view_id());
        }
        Ok(removed)
    }

    /// Number of views with a built index.
    pub fn view_index_count(&self) -> usize {
        self.shared.read().views.len()
    }

    /// Watch `graph` for changes, reading under this dictionary's lock.
    pub fn create_observer(
        &self,
        graph: Arc<dyn GraphView<N, E>>,
        version: Arc<GraphVersion>,
        with_diff: bool,
    ) -> ChangeObserver<N, E> {
        ChangeObserver::new(graph, version, self.shared_lock(), with_diff)
    }
}

impl<N: GraphElement, E: GraphElement> Default for TimestampDictionary<N, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: GraphElement, E: GraphElement> SharedLock for TimestampDictionary<N, E> {
    fn read_scope(&self) -> LockScope<'_> {
        self.shared.read_scope()
    }
}

impl<N: GraphElement, E: GraphElement> fmt::Debug for TimestampDictionary<N, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.read();
        f.debug_struct("TimestampDictionary")
            .field("timestamps", &state.table.len())
            .field("allocated", &state.table.allocated_len())
            .field("free", &state.table.free_len())
            .field("views", &state.views.len())
            .field("config", &self.shared.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, MemoryGraph, Node};
    use crate::values::TemporalValue;

    fn place(dict: &TimestampDictionary<Node, Edge>, ts: f64, node: &Node) -> SlotId {
        let slot = dict.add_element(ts, ElementRef::Node(node)).unwrap();
        node.set_value(slot, TemporalValue::Boolean(true)).unwrap();
        slot
    }

    #[test]
    fn test_get_or_create_slot_is_idempotent() {
        let dict = TimestampDictionary::<Node, Edge>::new();
        let first = dict.get_or_create_slot(4.25).unwrap();
        assert_eq!(dict.get_or_create_slot(4.25).unwrap(), first);
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.timestamp_of(first).unwrap(), 4.25);
    }

    #[test]
    fn test_non_finite_timestamps_rejected() {
        let dict = TimestampDictionary::<Node, Edge>::new();
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                dict.get_or_create_slot(bad),
                Err(TimegraphError::InvalidTimestamp(_))
            ));
        }
        assert!(dict.is_empty());
    }

    #[test]
    fn test_removed_element_recycles_slot() {
        let dict = TimestampDictionary::<Node, Edge>::new();
        let a = Node::new("a", 0);
        let slot = place(&dict, 1.0, &a);

        dict.remove_element(1.0, ElementRef::Node(&a)).unwrap();
        assert!(!dict.contains(1.0).unwrap());
        assert!(matches!(dict.timestamp_of(slot), Err(TimegraphError::NotFound(_))));
        assert_eq!(dict.get_or_create_slot(7.0).unwrap(), slot);
    }

    #[test]
    fn test_remove_element_at_unknown_timestamp() {
        let dict = TimestampDictionary::<Node, Edge>::new();
        let a = Node::new("a", 0);
        assert!(matches!(
            dict.remove_element(3.0, ElementRef::Node(&a)),
            Err(TimegraphError::NotFound(_))
        ));
    }

    #[test]
    fn test_timestamps_of_resolves_value_set() {
        let dict = TimestampDictionary::<Node, Edge>::new();
        let a = Node::new("a", 0);
        dict.get_or_create_slot(7.0).unwrap();
        dict.get_or_create_slot(8.0).unwrap();
        place(&dict, 3.0, &a);
        place(&dict, 1.0, &a);

        let slots = a.timestamp_slots().unwrap();
        assert_eq!(slots.as_slice(), &[2, 3]);
        assert_eq!(dict.timestamps_of(&slots).unwrap(), vec![3.0, 1.0]);
        assert_eq!(
            dict.timestamps(),
            vec![(1.0, 3), (3.0, 2), (7.0, 0), (8.0, 1)]
        );
    }

    #[test]
    fn test_indexing_disabled() {
        let config = Config::default().with_index_timestamps(false);
        let dict = TimestampDictionary::<Node, Edge>::with_config(config).unwrap();
        let a = Node::new("a", 0);

        dict.add_element(1.0, ElementRef::Node(&a)).unwrap();
        assert!(dict.contains(1.0).unwrap());
        assert_eq!(dict.main_index().unwrap_err(), TimegraphError::IndexingDisabled);
    }

    #[test]
    fn test_view_index_built_from_view_contents() {
        let graph = MemoryGraph::new();
        let dict = TimestampDictionary::<Node, Edge>::new();
        let a = graph.create_node("a");
        let b = graph.create_node("b");
        place(&dict, 1.0, &a);
        place(&dict, 1.0, &b);

        let view = graph.subgraph();
        view.add_node(&a);
        let index = dict.get_view_index(view.clone()).unwrap();

        let nodes = index.get_nodes(1.0).unwrap();
        assert!(nodes.contains(&a));
        assert!(!nodes.contains(&b));
        nodes.done();
        assert_eq!(dict.view_index_count(), 1);

        assert!(dict.delete_view_index(&*view).unwrap());
        assert!(!dict.delete_view_index(&*view).unwrap());
        assert!(index.get_nodes(1.0).unwrap().is_empty());
    }

    #[test]
    fn test_main_view_index_cannot_be_deleted() {
        let graph = MemoryGraph::new();
        let dict = TimestampDictionary::<Node, Edge>::new();
        assert!(matches!(
            dict.delete_view_index(&*graph),
            Err(TimegraphError::InvalidArgument(_))
        ));
        assert!(dict.get_view_index(graph.clone()).is_ok());
        assert_eq!(dict.view_index_count(), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = Config::default();
        config.slot_capacity_hint = usize::MAX;
        assert!(matches!(
            TimestampDictionary::<Node, Edge>::with_config(config),
            Err(TimegraphError::InvalidConfig(_))
        ));
    }
}
