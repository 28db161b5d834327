//! In-memory graph collaborators.
//!
//! A small reference implementation of the capabilities the dictionary and
//! observers consume: identity-compared [`Node`]/[`Edge`] handles carrying a
//! temporal value set, a [`MemoryGraph`] that assigns recyclable store ids and
//! bumps its [`GraphVersion`] on every structural change, and [`Subgraph`]
//! views over it.
//!
//! Lock order: callers mutating both a dictionary and a graph take the
//! dictionary's write lock first. The graph's own lock is only ever held for
//! the duration of a single method call.

use crate::element::{GraphElement, GraphView, SlotList, ViewId};
use crate::error::Result;
use crate::observer::GraphVersion;
use crate::timestamp::{SlotId, StoreId};
use crate::values::{TemporalValue, TimestampValues};
use parking_lot::RwLock;
use rustc_hash::FxHashSet;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

struct ElementData {
    label: String,
    store_id: StoreId,
    values: RwLock<Option<TimestampValues>>,
}

impl ElementData {
    fn new(label: String, store_id: StoreId) -> Self {
        Self {
            label,
            store_id,
            values: RwLock::new(None),
        }
    }

    fn slots(&self) -> Option<SlotList> {
        self.values
            .read()
            .as_ref()
            .map(|values| values.slots().iter().copied().collect())
    }

    fn set_value(&self, slot: SlotId, value: TemporalValue) -> Result<Option<TemporalValue>> {
        let mut values = self.values.write();
        let set = values.get_or_insert_with(|| TimestampValues::new(value.value_type()));
        set.put(slot, Some(value))
    }

    fn remove_value(&self, slot: SlotId) -> Option<TemporalValue> {
        self.values.write().as_mut()?.remove(slot)
    }

    fn value(&self, slot: SlotId) -> Result<TemporalValue> {
        match self.values.read().as_ref() {
            Some(values) => values.get(slot),
            None => Err(crate::error::TimegraphError::not_found(format!(
                "{} has no temporal values",
                self.label
            ))),
        }
    }
}

macro_rules! element_handle {
    ($name:ident) => {
        impl $name {
            pub fn label(&self) -> &str {
                &self.0.label
            }

            /// Store `value` at `slot` in the attached value set, creating the
            /// set on first use with the value's type.
            pub fn set_value(
                &self,
                slot: SlotId,
                value: TemporalValue,
            ) -> Result<Option<TemporalValue>> {
                self.0.set_value(slot, value)
            }

            pub fn remove_value(&self, slot: SlotId) -> Option<TemporalValue> {
                self.0.remove_value(slot)
            }

            pub fn value(&self, slot: SlotId) -> Result<TemporalValue> {
                self.0.value(slot)
            }

            fn data(&self) -> &ElementData {
                &self.0
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                Arc::ptr_eq(&self.0, &other.0)
            }
        }

        impl Eq for $name {}

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                std::ptr::hash(Arc::as_ptr(&self.0), state);
            }
        }

        impl GraphElement for $name {
            fn store_id(&self) -> StoreId {
                self.data().store_id
            }

            fn timestamp_slots(&self) -> Option<SlotList> {
                self.data().slots()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({}#{})", stringify!($name), self.0.label, self.0.store_id)
            }
        }
    };
}

/// Node handle. Clones share identity.
#[derive(Clone)]
pub struct Node(Arc<ElementData>);

impl Node {
    /// A node detached from any graph, e.g. for driving a dictionary directly.
    pub fn new(label: impl Into<String>, store_id: StoreId) -> Self {
        Self(Arc::new(ElementData::new(label.into(), store_id)))
    }
}

element_handle!(Node);

/// Edge handle. Clones share identity.
#[derive(Clone)]
pub struct Edge(Arc<ElementData>, Node, Node);

impl Edge {
    pub fn new(label: impl Into<String>, store_id: StoreId, source: &Node, target: &Node) -> Self {
        Self(
            Arc::new(ElementData::new(label.into(), store_id)),
            source.clone(),
            target.clone(),
        )
    }

    pub fn source(&self) -> &Node {
        &self.1
    }

    pub fn target(&self) -> &Node {
        &self.2
    }
}

element_handle!(Edge);

/// Store-id–indexed element store with smallest-first id recycling.
struct ElementStore<T> {
    slots: Vec<Option<T>>,
    free: BTreeSet<StoreId>,
}

impl<T: GraphElement> ElementStore<T> {
    fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: BTreeSet::new(),
        }
    }

    fn next_id(&self) -> StoreId {
        self.free
            .first()
            .copied()
            .unwrap_or(self.slots.len() as StoreId)
    }

    fn insert(&mut self, element: T) {
        let index = element.store_id() as usize;
        self.free.remove(&element.store_id());
        if index >= self.slots.len() {
            self.slots.resize(index + 1, None);
        }
        self.slots[index] = Some(element);
    }

    fn remove(&mut self, element: &T) -> bool {
        if !self.contains(element) {
            return false;
        }
        self.slots[element.store_id() as usize] = None;
        self.free.insert(element.store_id());
        true
    }

    fn contains(&self, element: &T) -> bool {
        self.slots
            .get(element.store_id() as usize)
            .and_then(Option::as_ref)
            .is_some_and(|stored| stored == element)
    }

    fn live(&self) -> Vec<T> {
        self.slots.iter().flatten().cloned().collect()
    }

    fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}

struct GraphData {
    nodes: ElementStore<Node>,
    edges: ElementStore<Edge>,
}

static NEXT_VIEW_ID: AtomicU64 = AtomicU64::new(1);

/// The main view of an in-memory graph.
///
/// Mutations bump the shared [`GraphVersion`] but never touch a dictionary
/// lock. An observer only sees a graph change atomically with its dictionary
/// updates when the caller makes both under one [`DictionaryWriter`]:
///
/// ```rust
/// use timegraph::prelude::*;
///
/// let graph = MemoryGraph::new();
/// let dict = TimestampDictionary::<Node, Edge>::new();
/// let observer = dict.create_observer(graph.clone(), graph.version(), true);
///
/// {
///     let mut writer = dict.write();
///     let a = graph.create_node("a");
///     let slot = writer.add_element(1.0, ElementRef::Node(&a))?;
///     a.set_value(slot, TemporalValue::Boolean(true))?;
/// }
///
/// assert!(observer.has_changed()?);
/// assert_eq!(observer.get_diff()?.added_nodes().len(), 1);
/// # Ok::<(), TimegraphError>(())
/// ```
///
/// [`DictionaryWriter`]: crate::DictionaryWriter
pub struct MemoryGraph {
    view_id: ViewId,
    version: Arc<GraphVersion>,
    data: RwLock<GraphData>,
}

impl MemoryGraph {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            view_id: ViewId(0),
            version: Arc::new(GraphVersion::new()),
            data: RwLock::new(GraphData {
                nodes: ElementStore::new(),
                edges: ElementStore::new(),
            }),
        })
    }

    /// Counters bumped by every structural change.
    pub fn version(&self) -> Arc<GraphVersion> {
        Arc::clone(&self.version)
    }

    pub fn create_node(&self, label: impl Into<String>) -> Node {
        let mut data = self.data.write();
        let node = Node::new(label, data.nodes.next_id());
        data.nodes.insert(node.clone());
        self.version.increment_node_version();
        node
    }

    /// Remove `node` and every edge touching it.
    pub fn remove_node(&self, node: &Node) -> bool {
        let mut data = self.data.write();
        if !data.nodes.remove(node) {
            return false;
        }
        let incident: Vec<Edge> = data
            .edges
            .live()
            .into_iter()
            .filter(|edge| edge.source() == node || edge.target() == node)
            .collect();
        for edge in &incident {
            data.edges.remove(edge);
        }
        self.version.increment_node_version();
        if !incident.is_empty() {
            self.version.increment_edge_version();
        }
        true
    }

    pub fn create_edge(&self, label: impl Into<String>, source: &Node, target: &Node) -> Edge {
        let mut data = self.data.write();
        let edge = Edge::new(label, data.edges.next_id(), source, target);
        data.edges.insert(edge.clone());
        self.version.increment_edge_version();
        edge
    }

    pub fn remove_edge(&self, edge: &Edge) -> bool {
        let removed = self.data.write().edges.remove(edge);
        if removed {
            self.version.increment_edge_version();
        }
        removed
    }

    pub fn node_count(&self) -> usize {
        self.data.read().nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.data.read().edges.len()
    }

    /// Create an empty filtered view with a fresh view id.
    pub fn subgraph(self: &Arc<Self>) -> Arc<Subgraph> {
        let id = ViewId(NEXT_VIEW_ID.fetch_add(1, Ordering::Relaxed));
        Arc::new(Subgraph {
            id,
            parent: Arc::clone(self),
            members: RwLock::new(ViewMembers::default()),
        })
    }
}

impl GraphView<Node, Edge> for MemoryGraph {
    fn view_id(&self) -> ViewId {
        self.view_id
    }

    fn is_main_view(&self) -> bool {
        true
    }

    fn contains_node(&self, node: &Node) -> bool {
        self.data.read().nodes.contains(node)
    }

    fn contains_edge(&self, edge: &Edge) -> bool {
        self.data.read().edges.contains(edge)
    }

    fn nodes(&self) -> Vec<Node> {
        self.data.read().nodes.live()
    }

    fn edges(&self) -> Vec<Edge> {
        self.data.read().edges.live()
    }

    fn max_node_store_id(&self) -> usize {
        self.data.read().nodes.slots.len()
    }

    fn max_edge_store_id(&self) -> usize {
        self.data.read().edges.slots.len()
    }
}

#[derive(Default)]
struct ViewMembers {
    nodes: FxHashSet<Node>,
    edges: FxHashSet<Edge>,
}

/// A filtered view: an explicit subset of its parent graph's elements.
///
/// Membership changes here are not reported to any dictionary; callers use
/// `DictionaryWriter::index_in_view`/`clear_in_view` to keep a built view
/// index in step.
pub struct Subgraph {
    id: ViewId,
    parent: Arc<MemoryGraph>,
    members: RwLock<ViewMembers>,
}

impl Subgraph {
    pub fn parent(&self) -> &Arc<MemoryGraph> {
        &self.parent
    }

    pub fn add_node(&self, node: &Node) -> bool {
        self.members.write().nodes.insert(node.clone())
    }

    pub fn remove_node(&self, node: &Node) -> bool {
        self.members.write().nodes.remove(node)
    }

    pub fn add_edge(&self, edge: &Edge) -> bool {
        self.members.write().edges.insert(edge.clone())
    }

    pub fn remove_edge(&self, edge: &Edge) -> bool {
        self.members.write().edges.remove(edge)
    }
}

impl GraphView<Node, Edge> for Subgraph {
    fn view_id(&self) -> ViewId {
        self.id
    }

    fn is_main_view(&self) -> bool {
        false
    }

    fn contains_node(&self, node: &Node) -> bool {
        self.members.read().nodes.contains(node) && self.parent.contains_node(node)
    }

    fn contains_edge(&self, edge: &Edge) -> bool {
        self.members.read().edges.contains(edge) && self.parent.contains_edge(edge)
    }

    fn nodes(&self) -> Vec<Node> {
        let members = self.members.read();
        members
            .nodes
            .iter()
            .filter(|node| self.parent.contains_node(node))
            .cloned()
            .collect()
    }

    fn edges(&self) -> Vec<Edge> {
        let members = self.members.read();
        members
            .edges
            .iter()
            .filter(|edge| self.parent.contains_edge(edge))
            .cloned()
            .collect()
    }

    fn max_node_store_id(&self) -> usize {
        self.parent.max_node_store_id()
    }

    fn max_edge_store_id(&self) -> usize {
        self.parent.max_edge_store_id()
    }
}
