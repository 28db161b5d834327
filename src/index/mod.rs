//! Temporal index queries.
//!
//! A [`TemporalIndex`] answers "which nodes/edges exist at time t" and "...in
//! [from, to]" for the main graph or one view. Results borrow the dictionary's
//! read lock; see [`Members`].

mod entries;
mod scope;

pub use entries::{IndexEntries, IndexEntry};
pub use scope::{Iter, Members};

use crate::dictionary::state::{IndexTarget, Shared, StoreState};
use crate::element::{GraphElement, ViewId};
use crate::error::Result;
use crate::lock;
use crate::timestamp::{SlotId, Timestamp};
use parking_lot::RwLockReadGuard;
use rustc_hash::FxHashSet;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Query handle onto the main index or a view index.
///
/// Handles stay valid after their view index is deleted; they then behave as
/// an empty index.
pub struct TemporalIndex<N: GraphElement, E: GraphElement> {
    shared: Arc<Shared<N, E>>,
    target: IndexTarget,
}

impl<N: GraphElement, E: GraphElement> Clone for TemporalIndex<N, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            target: self.target,
        }
    }
}

type Select<N, E, T> = fn(&IndexEntries<N, E>, SlotId) -> Option<&FxHashSet<T>>;

impl<N: GraphElement, E: GraphElement> TemporalIndex<N, E> {
    pub(crate) fn new(shared: Arc<Shared<N, E>>, target: IndexTarget) -> Self {
        Self { shared, target }
    }

    /// `None` for the main index.
    pub fn view_id(&self) -> Option<ViewId> {
        match self.target {
            IndexTarget::Main => None,
            IndexTarget::View(id) => Some(id),
        }
    }

    pub fn is_main(&self) -> bool {
        self.target == IndexTarget::Main
    }

    /// Nodes present at exactly `timestamp`.
    pub fn get_nodes(&self, timestamp: f64) -> Result<Members<'_, N>> {
        self.point(timestamp, IndexEntries::nodes_at)
    }

    /// Edges present at exactly `timestamp`.
    pub fn get_edges(&self, timestamp: f64) -> Result<Members<'_, E>> {
        self.point(timestamp, IndexEntries::edges_at)
    }

    /// Nodes present at any timestamp in `[from, to]`, each reported once.
    pub fn get_nodes_between(&self, from: f64, to: f64) -> Result<Members<'_, N>> {
        self.range(from, to, IndexEntries::nodes_at)
    }

    /// Edges present at any timestamp in `[from, to]`, each reported once.
    pub fn get_edges_between(&self, from: f64, to: f64) -> Result<Members<'_, E>> {
        self.range(from, to, IndexEntries::edges_at)
    }

    fn point<T: Eq + Hash>(&self, timestamp: f64, select: Select<N, E, T>) -> Result<Members<'_, T>> {
        let timestamp = Timestamp::new(timestamp)?;
        let target = self.target;
        let guard = self.shared.read();
        let members = RwLockReadGuard::try_map(guard, |state| {
            let slot = state.table.slot_of(timestamp)?;
            select(state.entries(target)?, slot)
        });
        Ok(match members {
            Ok(set) => Members::slot(set),
            Err(_unlocked) => Members::empty(),
        })
    }

    fn range<T: Eq + Hash + Clone>(
        &self,
        from: f64,
        to: f64,
        select: Select<N, E, T>,
    ) -> Result<Members<'_, T>> {
        let from = Timestamp::new(from)?;
        let to = Timestamp::new(to)?;
        let guard = self.shared.read();

        let mut union = FxHashSet::default();
        if let Some(entries) = guard.entries(self.target) {
            for (_, slot) in guard.table.range(from, to) {
                if let Some(set) = select(entries, slot) {
                    union.extend(set.iter().cloned());
                }
            }
        }
        Ok(Members::collected(union, lock::erase(guard)))
    }

    fn with_state<R>(&self, f: impl FnOnce(&StoreState<N, E>, Option<&IndexEntries<N, E>>) -> R) -> R {
        let state = self.shared.read();
        f(&*state, state.entries(self.target))
    }

    /// Smallest timestamp in the index, `-inf` when it is empty.
    ///
    /// The main index reports the smallest live timestamp in the dictionary. A
    /// view index reports the smallest timestamp at which the view has members.
    pub fn get_min_timestamp(&self) -> f64 {
        self.with_state(|state, entries| {
            let found = match (self.target, entries) {
                (IndexTarget::Main, _) => state.table.first(),
                (IndexTarget::View(_), Some(entries)) => state
                    .table
                    .iter()
                    .find(|(_, slot)| entries.has_entry(*slot))
                    .map(|(ts, _)| ts),
                (IndexTarget::View(_), None) => None,
            };
            found.map_or(f64::NEG_INFINITY, Timestamp::value)
        })
    }

    /// Largest timestamp in the index, `+inf` when it is empty.
    pub fn get_max_timestamp(&self) -> f64 {
        self.with_state(|state, entries| {
            let found = match (self.target, entries) {
                (IndexTarget::Main, _) => state.table.last(),
                (IndexTarget::View(_), Some(entries)) => state
                    .table
                    .iter()
                    .rev()
                    .find(|(_, slot)| entries.has_entry(*slot))
                    .map(|(ts, _)| ts),
                (IndexTarget::View(_), None) => None,
            };
            found.map_or(f64::INFINITY, Timestamp::value)
        })
    }

    /// Total (slot, node) memberships.
    pub fn node_count(&self) -> usize {
        self.with_state(|_, entries| entries.map_or(0, IndexEntries::node_count))
    }

    /// Total (slot, edge) memberships.
    pub fn edge_count(&self) -> usize {
        self.with_state(|_, entries| entries.map_or(0, IndexEntries::edge_count))
    }

    pub fn has_nodes(&self) -> bool {
        self.node_count() > 0
    }

    pub fn has_edges(&self) -> bool {
        self.edge_count() > 0
    }

    /// Whether the backing index still exists.
    pub fn is_live(&self) -> bool {
        self.with_state(|_, entries| entries.is_some())
    }
}

impl<N: GraphElement, E: GraphElement> fmt::Debug for TemporalIndex<N, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemporalIndex")
            .field("target", &self.target)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::dictionary::TimestampDictionary;
    use crate::element::ElementRef;
    use crate::error::TimegraphError;
    use crate::graph::{Edge, MemoryGraph, Node};

    #[test]
    fn test_empty_index_sentinels() {
        let dict = TimestampDictionary::<Node, Edge>::new();
        let index = dict.main_index().unwrap();
        assert_eq!(index.get_min_timestamp(), f64::NEG_INFINITY);
        assert_eq!(index.get_max_timestamp(), f64::INFINITY);
        assert!(!index.has_nodes());
        assert!(!index.has_edges());
    }

    #[test]
    fn test_point_and_range_queries() {
        let dict = TimestampDictionary::<Node, Edge>::new();
        let a = Node::new("a", 0);
        let b = Node::new("b", 1);
        dict.add_element(1.5, ElementRef::Node(&a)).unwrap();
        dict.add_element(2.5, ElementRef::Node(&b)).unwrap();
        let index = dict.main_index().unwrap();

        let early = index.get_nodes_between(1.0, 2.0).unwrap();
        assert_eq!(early.to_vec(), vec![a.clone()]);
        early.done();

        let both = index.get_nodes_between(1.5, 2.5).unwrap();
        assert_eq!(both.len(), 2);
        both.done();

        assert!(index.get_nodes(3.0).unwrap().is_empty());
        assert!(index.get_nodes_between(2.0, 1.0).unwrap().is_empty());
        assert_eq!(index.get_min_timestamp(), 1.5);
        assert_eq!(index.get_max_timestamp(), 2.5);
    }

    #[test]
    fn test_range_reports_each_element_once() {
        let dict = TimestampDictionary::<Node, Edge>::new();
        let a = Node::new("a", 0);
        for ts in [1.0, 2.0, 3.0] {
            dict.add_element(ts, ElementRef::Node(&a)).unwrap();
        }
        let index = dict.main_index().unwrap();
        assert_eq!(index.get_nodes_between(0.0, 10.0).unwrap().len(), 1);
        assert_eq!(index.node_count(), 3);
    }

    #[test]
    fn test_query_rejects_non_finite_bounds() {
        let dict = TimestampDictionary::<Node, Edge>::new();
        let index = dict.main_index().unwrap();
        assert!(matches!(
            index.get_edges_between(f64::NAN, 1.0),
            Err(TimegraphError::InvalidTimestamp(_))
        ));
        assert!(matches!(
            index.get_edges(f64::INFINITY),
            Err(TimegraphError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_view_min_max_skip_timestamps_outside_view() {
        let graph = MemoryGraph::new();
        let dict = TimestampDictionary::<Node, Edge>::new();
        let a = graph.create_node("a");
        let b = graph.create_node("b");
        let view = graph.subgraph();
        view.add_node(&b);
        let index = dict.get_view_index(view.clone()).unwrap();

        let mut writer = dict.write();
        writer.add_element(1.0, ElementRef::Node(&a)).unwrap();
        writer.add_element(2.0, ElementRef::Node(&b)).unwrap();
        writer.add_element(3.0, ElementRef::Node(&b)).unwrap();
        writer.add_element(4.0, ElementRef::Node(&a)).unwrap();
        drop(writer);

        assert_eq!(index.get_min_timestamp(), 2.0);
        assert_eq!(index.get_max_timestamp(), 3.0);
        assert_eq!(dict.main_index().unwrap().get_min_timestamp(), 1.0);
    }

    #[test]
    fn test_result_holds_read_lock() {
        let dict = TimestampDictionary::<Node, Edge>::new();
        let a = Node::new("a", 0);
        dict.add_element(1.0, ElementRef::Node(&a)).unwrap();
        let index = dict.main_index().unwrap();

        let nodes = index.get_nodes(1.0).unwrap();
        assert!(dict.try_write().is_none());
        nodes.done();
        assert!(dict.try_write().is_some());

        let empty = index.get_nodes(9.0).unwrap();
        assert!(!empty.holds_lock());
        assert!(dict.try_write().is_some());
    }
}
