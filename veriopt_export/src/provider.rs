//! Graph Provider Interface
//!
//! The exporter never builds graphs itself. It asks a provider for the graph
//! of a method and treats "no graph" as a normal answer (natives, abstract
//! methods, methods the host chose not to compile):
//!
//! - **GraphProvider**: the lookup trait
//! - **GraphRegistry**: a thread-safe map from method key to graph
//!
//! # Thread Safety
//!
//! `GraphProvider` is `Send + Sync` so one registry can feed several export
//! contexts on different threads.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use veriopt_ir::{Graph, MethodKey, MethodRef};

// =============================================================================
// Provider Trait
// =============================================================================

/// Source of method graphs.
pub trait GraphProvider: Send + Sync + std::fmt::Debug {
    /// The graph of `method`, or `None` when none can be built.
    fn graph_for(&self, method: &MethodRef) -> Option<Arc<Graph>>;

    /// Check for a graph without retrieving it.
    fn has_graph(&self, method: &MethodRef) -> bool {
        self.graph_for(method).is_some()
    }
}

// =============================================================================
// Graph Registry
// =============================================================================

/// A thread-safe registry of prebuilt graphs.
#[derive(Debug, Default)]
pub struct GraphRegistry {
    graphs: RwLock<FxHashMap<MethodKey, Arc<Graph>>>,
}

impl GraphRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `graph` under its method. Graphs without a method are ignored
    /// and returned.
    pub fn register(&self, graph: Graph) -> Option<Graph> {
        match graph.method_key() {
            Some(key) => {
                self.graphs.write().insert(key, Arc::new(graph));
                None
            }
            None => Some(graph),
        }
    }

    /// Register a graph under an explicit method.
    pub fn register_for(&self, method: &MethodRef, graph: Arc<Graph>) {
        self.graphs.write().insert(method.key(), graph);
    }

    pub fn unregister(&self, method: &MethodRef) -> Option<Arc<Graph>> {
        self.graphs.write().remove(&method.key())
    }

    pub fn clear(&self) {
        self.graphs.write().clear();
    }

    pub fn len(&self) -> usize {
        self.graphs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.read().is_empty()
    }
}

impl GraphProvider for GraphRegistry {
    fn graph_for(&self, method: &MethodRef) -> Option<Arc<Graph>> {
        self.graphs.read().get(&method.key()).cloned()
    }

    fn has_graph(&self, method: &MethodRef) -> bool {
        self.graphs.read().contains_key(&method.key())
    }
}
