//! Temporal indexing and change observation for in-memory graph stores.
//!
//! A [`TimestampDictionary`] assigns every distinct timestamp a dense slot id,
//! keeps a temporal index of which nodes and edges exist at each slot (for the
//! whole graph and, lazily, for filtered views), and shares its reader/writer
//! lock with [`ChangeObserver`]s that report what was added or removed.
//!
//! ```rust
//! use timegraph::prelude::*;
//!
//! let graph = MemoryGraph::new();
//! let dict = TimestampDictionary::<Node, Edge>::new();
//!
//! let a = graph.create_node("a");
//! let b = graph.create_node("b");
//! for (node, ts) in [(&a, 1.5), (&b, 2.5)] {
//!     let slot = dict.add_element(ts, ElementRef::Node(node))?;
//!     node.set_value(slot, TemporalValue::Boolean(true))?;
//! }
//!
//! let index = dict.main_index()?;
//! let early = index.get_nodes_between(1.0, 2.0)?;
//! assert_eq!(early.to_vec(), vec![a.clone()]);
//! early.done();
//!
//! let observer = dict.create_observer(graph.clone(), graph.version(), true);
//! assert!(observer.has_changed()?);
//! assert_eq!(observer.get_diff()?.added_nodes().len(), 2);
//! # Ok::<(), timegraph::TimegraphError>(())
//! ```

pub mod builder;
pub mod config;
pub mod dictionary;
pub mod element;
pub mod error;
pub mod graph;
pub mod index;
pub mod lock;
pub mod observer;
pub mod timestamp;
pub mod values;

pub use builder::DictionaryBuilder;
pub use config::Config;
pub use dictionary::{DictionaryWriter, TimestampDictionary};
pub use element::{ElementKind, ElementRef, GraphElement, GraphView, SlotList, ViewId};
pub use error::{Result, TimegraphError};
pub use graph::{Edge, MemoryGraph, Node, Subgraph};
pub use index::{Members, TemporalIndex};
pub use lock::{LockScope, SharedLock};
pub use observer::{ChangeObserver, GraphDiff, GraphVersion};
pub use timestamp::{SlotId, StoreId, Timestamp};
pub use values::{
    SlotValue, TemporalValue, TimestampBooleanSet, TimestampByteSet, TimestampCharSet,
    TimestampDoubleSet, TimestampFloatSet, TimestampIntegerSet, TimestampLongSet,
    TimestampShortSet, TimestampStringSet, TimestampValueSet, TimestampValues, ValueType,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{DictionaryBuilder, Result, TimegraphError, TimestampDictionary};

    pub use crate::{ElementRef, GraphElement, GraphView, ViewId};

    pub use crate::{ChangeObserver, GraphDiff, GraphVersion, Members, TemporalIndex};

    pub use crate::{Config, TemporalValue, TimestampValues, ValueType};

    pub use crate::{Edge, MemoryGraph, Node, Subgraph};
}
