//! Capabilities consumed from the surrounding graph store.
//!
//! Topology, attribute columns and view filtering live outside this crate.
//! The dictionary and observers only need the narrow surface below.

use crate::timestamp::{SlotId, StoreId};
use smallvec::SmallVec;
use std::fmt;
use std::hash::Hash;

/// Slots attached to one element, small enough to stay inline for most elements.
pub type SlotList = SmallVec<[SlotId; 8]>;

/// A node or edge handle that can be placed in the temporal indices.
///
/// Equality must be identity: two handles are equal only when they denote the
/// same live element, even if a recycled store id makes them look alike.
pub trait GraphElement: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// Stable position of the element in its store.
    fn store_id(&self) -> StoreId;

    /// Slots of the element's attached temporal value set, ascending.
    ///
    /// `None` means the element carries no temporal data at all.
    fn timestamp_slots(&self) -> Option<SlotList>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Node,
    Edge,
}

/// Borrowed node-or-edge reference, dispatched once at the API boundary.
#[derive(Debug)]
pub enum ElementRef<'a, N, E> {
    Node(&'a N),
    Edge(&'a E),
}

impl<N, E> Clone for ElementRef<'_, N, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N, E> Copy for ElementRef<'_, N, E> {}

impl<N: GraphElement, E: GraphElement> ElementRef<'_, N, E> {
    pub fn kind(&self) -> ElementKind {
        match self {
            ElementRef::Node(_) => ElementKind::Node,
            ElementRef::Edge(_) => ElementKind::Edge,
        }
    }

    pub fn store_id(&self) -> StoreId {
        match self {
            ElementRef::Node(node) => node.store_id(),
            ElementRef::Edge(edge) => edge.store_id(),
        }
    }

    pub fn timestamp_slots(&self) -> Option<SlotList> {
        match self {
            ElementRef::Node(node) => node.timestamp_slots(),
            ElementRef::Edge(edge) => edge.timestamp_slots(),
        }
    }

    /// Whether `view` currently contains the referenced element.
    pub fn is_in(&self, view: &dyn GraphView<N, E>) -> bool {
        match self {
            ElementRef::Node(node) => view.contains_node(node),
            ElementRef::Edge(edge) => view.contains_edge(edge),
        }
    }
}

/// Identity of a graph view, used to key per-view indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub u64);

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

/// A graph, or a filtered view of one.
///
/// The main view is the whole graph. Store-id bounds come from the element
/// stores backing every view, so they are identical across views of one graph.
pub trait GraphView<N, E>: Send + Sync {
    fn view_id(&self) -> ViewId;

    fn is_main_view(&self) -> bool;

    fn contains_node(&self, node: &N) -> bool;

    fn contains_edge(&self, edge: &E) -> bool;

    /// Nodes currently in the view.
    fn nodes(&self) -> Vec<N>;

    /// Edges currently in the view.
    fn edges(&self) -> Vec<E>;

    /// One past the highest node store id ever assigned.
    fn max_node_store_id(&self) -> usize;

    /// One past the highest edge store id ever assigned.
    fn max_edge_store_id(&self) -> usize;
}
