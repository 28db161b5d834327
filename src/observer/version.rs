use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic modification counters of a graph.
///
/// The graph-mutation path bumps the node counter on every node add/remove and
/// the edge counter on every edge add/remove. Observers compare the counters
/// against the values they last saw.
#[derive(Debug, Default)]
pub struct GraphVersion {
    node_version: AtomicU64,
    edge_version: AtomicU64,
}

/// Counter values read together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionSnapshot {
    pub node_version: u64,
    pub edge_version: u64,
}

impl GraphVersion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_version(&self) -> u64 {
        self.node_version.load(Ordering::Acquire)
    }

    pub fn edge_version(&self) -> u64 {
        self.edge_version.load(Ordering::Acquire)
    }

    /// Returns the new node version.
    pub fn increment_node_version(&self) -> u64 {
        self.node_version.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Returns the new edge version.
    pub fn increment_edge_version(&self) -> u64 {
        self.edge_version.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn snapshot(&self) -> VersionSnapshot {
        VersionSnapshot {
            node_version: self.node_version(),
            edge_version: self.edge_version(),
        }
    }
}
