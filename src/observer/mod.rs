//! Graph change observers.
//!
//! An observer answers "did the graph change since I last looked?" by
//! comparing version counters, and optionally reports which nodes and edges
//! were added or removed by diffing against a snapshot it keeps of the graph.

mod diff;
mod version;

pub use diff::GraphDiff;
pub use version::{GraphVersion, VersionSnapshot};

use crate::element::{GraphElement, GraphView};
use crate::error::{Result, TimegraphError};
use crate::lock::SharedLock;
use log::debug;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

struct ObserverState<N, E> {
    /// `None` until the first change check.
    seen: Option<VersionSnapshot>,
    destroyed: bool,
    diff: Option<GraphDiff<N, E>>,
    node_cache: Option<Vec<Option<N>>>,
    edge_cache: Option<Vec<Option<E>>>,
}

impl<N, E> ObserverState<N, E> {
    fn ensure_active(&self) -> Result<()> {
        if self.destroyed {
            Err(TimegraphError::ObserverDestroyed)
        } else {
            Ok(())
        }
    }

    fn nodes_stale(&self, current: VersionSnapshot) -> bool {
        self.seen
            .is_none_or(|seen| seen.node_version < current.node_version)
    }

    fn edges_stale(&self, current: VersionSnapshot) -> bool {
        self.seen
            .is_none_or(|seen| seen.edge_version < current.edge_version)
    }
}

/// Watches one graph for structural changes.
///
/// Methods of a single observer are serialized; distinct observers over the
/// same store run independently. Diff recomputation reads the graph under the
/// store's shared read lock so that it sees a consistent snapshot.
pub struct ChangeObserver<N, E> {
    id: Uuid,
    graph: Arc<dyn GraphView<N, E>>,
    version: Arc<GraphVersion>,
    lock: Option<Arc<dyn SharedLock>>,
    with_diff: bool,
    state: Mutex<ObserverState<N, E>>,
}

impl<N: GraphElement, E: GraphElement> ChangeObserver<N, E> {
    /// Observe `graph`, reading it under `lock` when computing diffs.
    pub fn new(
        graph: Arc<dyn GraphView<N, E>>,
        version: Arc<GraphVersion>,
        lock: Arc<dyn SharedLock>,
        with_diff: bool,
    ) -> Self {
        Self::build(graph, version, Some(lock), with_diff)
    }

    /// Observe `graph` without any locking, for single-threaded stores.
    pub fn unsynchronized(
        graph: Arc<dyn GraphView<N, E>>,
        version: Arc<GraphVersion>,
        with_diff: bool,
    ) -> Self {
        Self::build(graph, version, None, with_diff)
    }

    fn build(
        graph: Arc<dyn GraphView<N, E>>,
        version: Arc<GraphVersion>,
        lock: Option<Arc<dyn SharedLock>>,
        with_diff: bool,
    ) -> Self {
        let id = Uuid::new_v4();
        debug!(
            "observer {id} created for {} (diff tracking: {with_diff})",
            graph.view_id()
        );
        Self {
            id,
            graph,
            version,
            lock,
            with_diff,
            state: Mutex::new(ObserverState {
                seen: None,
                destroyed: false,
                diff: None,
                node_cache: None,
                edge_cache: None,
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn graph(&self) -> &Arc<dyn GraphView<N, E>> {
        &self.graph
    }

    pub fn tracks_diff(&self) -> bool {
        self.with_diff
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.lock().destroyed
    }

    /// Whether the graph changed since the previous call.
    ///
    /// The first call on any observer reports `true`. With diff tracking, a
    /// `true` result also prepares the diff returned by [`get_diff`](Self::get_diff).
    pub fn has_changed(&self) -> Result<bool> {
        let mut state = self.state.lock();
        state.ensure_active()?;

        let current = self.version.snapshot();
        if !state.nodes_stale(current) && !state.edges_stale(current) {
            return Ok(false);
        }

        let current = if self.with_diff {
            let _scope = self.lock.as_ref().map(|lock| lock.read_scope());
            let current = self.version.snapshot();
            self.refresh_diff(&mut state, current);
            current
        } else {
            current
        };
        state.seen = Some(current);
        Ok(true)
    }

    /// Take the diff prepared by the last change-detecting
    /// [`has_changed`](Self::has_changed). Each diff can be taken once.
    pub fn get_diff(&self) -> Result<GraphDiff<N, E>> {
        let mut state = self.state.lock();
        state.ensure_active()?;
        if !self.with_diff {
            return Err(TimegraphError::DiffTrackingDisabled);
        }
        state.diff.take().ok_or(TimegraphError::StaleObserverProtocol)
    }

    /// Release the snapshot caches. Every later call fails with
    /// `ObserverDestroyed`, including another `destroy`.
    pub fn destroy(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.ensure_active()?;
        state.node_cache = None;
        state.edge_cache = None;
        state.diff = None;
        state.destroyed = true;
        debug!("observer {} destroyed", self.id);
        Ok(())
    }

    fn refresh_diff(&self, state: &mut ObserverState<N, E>, current: VersionSnapshot) {
        let graph = self.graph.as_ref();
        let mut diff = GraphDiff::default();

        if state.nodes_stale(current) {
            refresh_cache(
                &mut state.node_cache,
                graph.max_node_store_id(),
                graph.nodes(),
                |node| graph.contains_node(node),
                &mut diff.added_nodes,
                &mut diff.removed_nodes,
            );
        }
        if state.edges_stale(current) {
            refresh_cache(
                &mut state.edge_cache,
                graph.max_edge_store_id(),
                graph.edges(),
                |edge| graph.contains_edge(edge),
                &mut diff.added_edges,
                &mut diff.removed_edges,
            );
        }

        debug!(
            "observer {} diff: +{}/-{} nodes, +{}/-{} edges",
            self.id,
            diff.added_nodes.len(),
            diff.removed_nodes.len(),
            diff.added_edges.len(),
            diff.removed_edges.len()
        );
        state.diff = Some(diff);
    }
}

/// Bring a store-id–indexed snapshot up to date with `live`, reporting
/// departures into `removed` and arrivals into `added`.
fn refresh_cache<T: GraphElement>(
    cache: &mut Option<Vec<Option<T>>>,
    max_store_id: usize,
    live: Vec<T>,
    contains: impl Fn(&T) -> bool,
    added: &mut Vec<T>,
    removed: &mut Vec<T>,
) {
    let mut cached = match cache.take() {
        Some(mut cached) => {
            for occupant in cached.iter_mut() {
                if occupant.as_ref().is_some_and(|element| !contains(element)) {
                    removed.extend(occupant.take());
                }
            }
            cached.resize(max_store_id, None);
            cached
        }
        None => vec![None; max_store_id],
    };

    for element in live {
        let index = element.store_id() as usize;
        if index >= cached.len() {
            cached.resize(index + 1, None);
        }
        if cached[index].as_ref() != Some(&element) {
            cached[index] = Some(element.clone());
            added.push(element);
        }
    }
    *cache = Some(cached);
}

impl<N, E> fmt::Debug for ChangeObserver<N, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeObserver")
            .field("id", &self.id)
            .field("with_diff", &self.with_diff)
            .field("synchronized", &self.lock.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, MemoryGraph, Node};

    #[test]
    fn test_first_check_reports_change() {
        let graph = MemoryGraph::new();
        graph.create_node("a");
        let observer = ChangeObserver::<Node, Edge>::unsynchronized(graph.clone(), graph.version(), true);

        assert!(observer.has_changed().unwrap());
        let diff = observer.get_diff().unwrap();
        assert_eq!(diff.added_nodes().len(), 1);
        assert!(diff.removed_nodes().is_empty());

        assert!(!observer.has_changed().unwrap());
        assert_eq!(
            observer.get_diff().unwrap_err(),
            TimegraphError::StaleObserverProtocol
        );
    }

    #[test]
    fn test_diff_disabled() {
        let graph = MemoryGraph::new();
        let observer = ChangeObserver::<Node, Edge>::unsynchronized(graph.clone(), graph.version(), false);
        assert!(observer.has_changed().unwrap());
        assert_eq!(
            observer.get_diff().unwrap_err(),
            TimegraphError::DiffTrackingDisabled
        );
    }

    #[test]
    fn test_removed_element_reported_once() {
        let graph = MemoryGraph::new();
        let a = graph.create_node("a");
        let b = graph.create_node("b");
        let observer = ChangeObserver::<Node, Edge>::unsynchronized(graph.clone(), graph.version(), true);
        observer.has_changed().unwrap();
        observer.get_diff().unwrap();

        graph.remove_node(&b);
        assert!(observer.has_changed().unwrap());
        let diff = observer.get_diff().unwrap();
        assert_eq!(diff.removed_nodes(), &[b.clone()][..]);
        assert!(diff.added_nodes().is_empty());

        graph.remove_node(&a);
        assert!(observer.has_changed().unwrap());
        let diff = observer.get_diff().unwrap();
        assert_eq!(diff.removed_nodes(), &[a][..]);
    }

    #[test]
    fn test_recycled_store_id_reports_both_sides() {
        let graph = MemoryGraph::new();
        let a = graph.create_node("a");
        let observer = ChangeObserver::<Node, Edge>::unsynchronized(graph.clone(), graph.version(), true);
        observer.has_changed().unwrap();
        observer.get_diff().unwrap();

        graph.remove_node(&a);
        let c = graph.create_node("c");
        assert_eq!(c.store_id(), a.store_id());

        assert!(observer.has_changed().unwrap());
        let diff = observer.get_diff().unwrap();
        assert_eq!(diff.removed_nodes(), &[a][..]);
        assert_eq!(diff.added_nodes(), &[c][..]);
    }

    #[test]
    fn test_only_stale_dimension_is_diffed() {
        let graph = MemoryGraph::new();
        let a = graph.create_node("a");
        let b = graph.create_node("b");
        let observer = ChangeObserver::<Node, Edge>::unsynchronized(graph.clone(), graph.version(), true);
        observer.has_changed().unwrap();
        observer.get_diff().unwrap();

        let e = graph.create_edge("e", &a, &b);
        assert!(observer.has_changed().unwrap());
        let diff = observer.get_diff().unwrap();
        assert!(diff.added_nodes().is_empty());
        assert_eq!(diff.added_edges(), &[e][..]);
    }

    #[test]
    fn test_destroyed_observer_rejects_everything() {
        let graph = MemoryGraph::new();
        let observer = ChangeObserver::<Node, Edge>::unsynchronized(graph.clone(), graph.version(), true);
        observer.destroy().unwrap();

        assert!(observer.is_destroyed());
        assert_eq!(
            observer.has_changed().unwrap_err(),
            TimegraphError::ObserverDestroyed
        );
        assert_eq!(
            observer.get_diff().unwrap_err(),
            TimegraphError::ObserverDestroyed
        );
        assert_eq!(
            observer.destroy().unwrap_err(),
            TimegraphError::ObserverDestroyed
        );
    }
}
