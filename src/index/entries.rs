//! Slot-addressed membership storage behind every temporal index.

use crate::element::{ElementRef, GraphElement};
use crate::timestamp::SlotId;
use rustc_hash::FxHashSet;

/// Nodes and edges present at one slot.
#[derive(Debug, Clone)]
pub struct IndexEntry<N, E> {
    nodes: FxHashSet<N>,
    edges: FxHashSet<E>,
}

impl<N: GraphElement, E: GraphElement> IndexEntry<N, E> {
    fn new() -> Self {
        Self {
            nodes: FxHashSet::default(),
            edges: FxHashSet::default(),
        }
    }

    pub fn node_set(&self) -> &FxHashSet<N> {
        &self.nodes
    }

    pub fn edge_set(&self) -> &FxHashSet<E> {
        &self.edges
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// Inverted index from slot to the elements present at it.
///
/// An entry exists exactly while at least one node or edge is present at its
/// slot; empty entries are discarded immediately. Running counts of
/// (slot, element) memberships make emptiness checks O(1).
#[derive(Debug, Clone)]
pub struct IndexEntries<N, E> {
    entries: Vec<Option<IndexEntry<N, E>>>,
    node_count: usize,
    edge_count: usize,
}

impl<N: GraphElement, E: GraphElement> IndexEntries<N, E> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            node_count: 0,
            edge_count: 0,
        }
    }

    fn entry_mut(&mut self, slot: SlotId) -> &mut IndexEntry<N, E> {
        let index = slot as usize;
        if index >= self.entries.len() {
            self.entries.resize_with(index + 1, || None);
        }
        self.entries[index].get_or_insert_with(IndexEntry::new)
    }

    pub fn entry(&self, slot: SlotId) -> Option<&IndexEntry<N, E>> {
        self.entries.get(slot as usize)?.as_ref()
    }

    /// Whether any element is present at `slot`.
    pub fn has_entry(&self, slot: SlotId) -> bool {
        self.entry(slot).is_some()
    }

    /// Non-empty node set at `slot`.
    pub fn nodes_at(&self, slot: SlotId) -> Option<&FxHashSet<N>> {
        self.entry(slot)
            .map(IndexEntry::node_set)
            .filter(|nodes| !nodes.is_empty())
    }

    /// Non-empty edge set at `slot`.
    pub fn edges_at(&self, slot: SlotId) -> Option<&FxHashSet<E>> {
        self.entry(slot)
            .map(IndexEntry::edge_set)
            .filter(|edges| !edges.is_empty())
    }

    pub(crate) fn add_node(&mut self, slot: SlotId, node: N) -> bool {
        let added = self.entry_mut(slot).nodes.insert(node);
        if added {
            self.node_count += 1;
        }
        added
    }

    pub(crate) fn add_edge(&mut self, slot: SlotId, edge: E) -> bool {
        let added = self.entry_mut(slot).edges.insert(edge);
        if added {
            self.edge_count += 1;
        }
        added
    }

    pub(crate) fn remove_node(&mut self, slot: SlotId, node: &N) -> bool {
        let Some(entry) = self.entries.get_mut(slot as usize).and_then(Option::as_mut) else {
            return false;
        };
        let removed = entry.nodes.remove(node);
        if removed {
            self.node_count -= 1;
            if entry.is_empty() {
                self.entries[slot as usize] = None;
            }
        }
        removed
    }

    pub(crate) fn remove_edge(&mut self, slot: SlotId, edge: &E) -> bool {
        let Some(entry) = self.entries.get_mut(slot as usize).and_then(Option::as_mut) else {
            return false;
        };
        let removed = entry.edges.remove(edge);
        if removed {
            self.edge_count -= 1;
            if entry.is_empty() {
                self.entries[slot as usize] = None;
            }
        }
        removed
    }

    pub(crate) fn add(&mut self, slot: SlotId, element: ElementRef<'_, N, E>) -> bool {
        match element {
            ElementRef::Node(node) => self.add_node(slot, node.clone()),
            ElementRef::Edge(edge) => self.add_edge(slot, edge.clone()),
        }
    }

    pub(crate) fn remove(&mut self, slot: SlotId, element: ElementRef<'_, N, E>) -> bool {
        match element {
            ElementRef::Node(node) => self.remove_node(slot, node),
            ElementRef::Edge(edge) => self.remove_edge(slot, edge),
        }
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn has_nodes(&self) -> bool {
        self.node_count > 0
    }

    pub fn has_edges(&self) -> bool {
        self.edge_count > 0
    }

    /// Number of slots currently holding an entry.
    pub fn entry_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_some()).count()
    }

    pub(crate) fn clear(&mut self) {
        self.entries = Vec::new();
        self.node_count = 0;
        self.edge_count = 0;
    }

    /// Drop edge membership everywhere, returning the slots whose entries
    /// disappeared as a result.
    pub(crate) fn clear_edges(&mut self) -> Vec<SlotId> {
        if self.node_count == 0 {
            let vacated = self.occupied_slots();
            self.clear();
            return vacated;
        }

        let mut vacated = Vec::new();
        for (index, slot) in self.entries.iter_mut().enumerate() {
            if let Some(entry) = slot {
                entry.edges.clear();
                if entry.is_empty() {
                    *slot = None;
                    vacated.push(index as SlotId);
                }
            }
        }
        self.edge_count = 0;
        vacated
    }

    fn occupied_slots(&self) -> Vec<SlotId> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.is_some())
            .map(|(index, _)| index as SlotId)
            .collect()
    }
}
