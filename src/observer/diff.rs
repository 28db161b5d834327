/// Elements that entered or left a graph between two change checks.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphDiff<N, E> {
    pub(crate) added_nodes: Vec<N>,
    pub(crate) removed_nodes: Vec<N>,
    pub(crate) added_edges: Vec<E>,
    pub(crate) removed_edges: Vec<E>,
}

impl<N, E> Default for GraphDiff<N, E> {
    fn default() -> Self {
        Self {
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            added_edges: Vec::new(),
            removed_edges: Vec::new(),
        }
    }
}

impl<N, E> GraphDiff<N, E> {
    pub fn added_nodes(&self) -> &[N] {
        &self.added_nodes
    }

    pub fn removed_nodes(&self) -> &[N] {
        &self.removed_nodes
    }

    pub fn added_edges(&self) -> &[E] {
        &self.added_edges
    }

    pub fn removed_edges(&self) -> &[E] {
        &self.removed_edges
    }

    pub fn is_empty(&self) -> bool {
        self.added_nodes.is_empty()
            && self.removed_nodes.is_empty()
            && self.added_edges.is_empty()
            && self.removed_edges.is_empty()
    }
}
