//! Memoized method graphs and reachability closure.
//!
//! One [`CacheEntry`] exists per method key for the life of an export
//! context. An entry holds the provider's graph, its node array (or the
//! failure that prevented translation) and, once resolved, the methods it
//! references.
//!
//! # Resolution
//!
//! The references of a method are, in order:
//!
//! 1. the class initializer of its declaring class, unless the method is one;
//! 2. for each call target that is not native, every implementation found on
//!    a class the same graph instantiates (and on the declaring class),
//!    followed by the target itself.
//!
//! A call target with no implementation fails the target's own entry, so
//! every method whose closure reaches it fails as well. Constructors are
//! exempt: a body-less `<init>` is referenced but neither fails nor records
//! its class. The closure keeps walking so the full shape is known, then
//! reports the first failure it saw.

use crate::context::ExportContext;
use crate::error::{ExportError, Result};
use crate::translator::Discoveries;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::trace;
use veriopt_ir::{Graph, MethodKey, MethodRef, NodeKind, TypeUniverse};

// =============================================================================
// Cache Entry
// =============================================================================

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub method: MethodRef,
    pub key: MethodKey,

    /// Graph from the provider; `None` for methods without one.
    pub graph: Option<Arc<Graph>>,

    /// Translated node array; `None` when translation failed or there is no
    /// graph.
    pub node_array: Option<String>,

    /// What translating the graph discovered, replayed on every lookup.
    pub discovered: Discoveries,

    /// Why this method cannot be exported.
    pub failure: Option<ExportError>,

    /// Referenced methods, filled on first resolution.
    references: Option<Vec<MethodRef>>,
}

impl CacheEntry {
    fn new(method: &MethodRef) -> Self {
        Self {
            method: method.clone(),
            key: method.key(),
            graph: None,
            node_array: None,
            discovered: Discoveries::default(),
            failure: None,
            references: None,
        }
    }

    /// Translated successfully and free of failures.
    pub fn is_valid(&self) -> bool {
        self.node_array.is_some() && self.failure.is_none()
    }

    /// The failure raised when this entry is required.
    pub fn error(&self) -> Option<&ExportError> {
        self.failure.as_ref()
    }
}

// =============================================================================
// Graph Cache
// =============================================================================

#[derive(Debug, Default)]
pub struct GraphCache {
    entries: FxHashMap<MethodKey, CacheEntry>,
}

impl GraphCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &MethodKey) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &MethodKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// =============================================================================
// Closure
// =============================================================================

/// Methods reachable from an entry method.
#[derive(Debug, Clone)]
pub struct Closure {
    /// The entry method first, then every referenced method in discovery
    /// order, each once.
    pub methods: Vec<MethodKey>,

    /// Graphs of those methods that have one, in the same order.
    pub graphs: Vec<Arc<Graph>>,

    /// First failure found in the closure.
    pub failure: Option<ExportError>,
}

impl Closure {
    pub fn contains(&self, key: &MethodKey) -> bool {
        self.methods.contains(key)
    }

    pub fn into_result(self) -> Result<Vec<Arc<Graph>>> {
        match self.failure {
            Some(err) => Err(err),
            None => Ok(self.graphs),
        }
    }
}

/// Breadth-first walk result before failures are collected.
struct Walk {
    seed: MethodRef,
    reached: Vec<MethodRef>,
}

impl ExportContext {
    // =========================================================================
    // Entries
    // =========================================================================

    /// The memoized entry of `method`, built on first use.
    ///
    /// Every lookup registers what the graph instantiates, so discoveries
    /// survive [`ExportContext::clear_discovered`].
    pub fn entry(&mut self, method: &MethodRef) -> &CacheEntry {
        let key = method.key();
        if !self.cache.contains(&key) {
            let built = self.build_entry(method);
            self.cache.entries.insert(key.clone(), built);
        }
        let discovered = self
            .cache
            .get(&key)
            .map(|e| e.discovered.clone())
            .unwrap_or_default();
        self.register(&discovered);
        self.cache
            .entries
            .entry(key)
            .or_insert_with(|| CacheEntry::new(method))
    }

    fn build_entry(&self, method: &MethodRef) -> CacheEntry {
        let mut entry = CacheEntry::new(method);
        let Some(graph) = self.provider().graph_for(method) else {
            let has_code = self
                .universe()
                .method(method)
                .map_or(false, |info| info.has_code());
            if has_code {
                entry.failure = Some(ExportError::MissingGraph(entry.key.to_string()));
            }
            return entry;
        };

        match self.translator().write_node_array(&graph) {
            Ok(translation) => {
                trace!(method = %entry.key, len = translation.node_array.len(), "cached graph");
                entry.node_array = Some(translation.node_array);
                entry.discovered = translation.discovered;
            }
            Err(err) => {
                self.debug_skip(entry.key.as_str(), &err);
                entry.failure = Some(err);
            }
        }
        entry.graph = Some(graph);
        entry
    }

    /// Graph of `method`, if the provider has one.
    pub fn graph(&mut self, method: &MethodRef) -> Option<Arc<Graph>> {
        self.entry(method).graph.clone()
    }

    /// Node array of `method`, or `None` if it cannot be translated.
    pub fn node_array(&mut self, method: &MethodRef) -> Option<String> {
        self.entry(method).node_array.clone()
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Methods `method` references, resolved once and memoized.
    pub fn references(&mut self, method: &MethodRef) -> Vec<MethodRef> {
        let key = method.key();
        if let Some(refs) = self.cache.get(&key).and_then(|e| e.references.clone()) {
            return refs;
        }
        let refs = self.resolve_references(method);
        if let Some(entry) = self.cache.entries.get_mut(&key) {
            entry.references = Some(refs.clone());
        }
        refs
    }

    fn resolve_references(&mut self, method: &MethodRef) -> Vec<MethodRef> {
        let graph = {
            let entry = self.entry(method);
            match (&entry.graph, entry.is_valid()) {
                (Some(graph), true) => Arc::clone(graph),
                _ => return Vec::new(),
            }
        };

        let mut refs = ReferenceSet::default();

        if !method.is_class_initializer() {
            if let Some(clinit) = self.universe().class_initializer(&method.holder) {
                refs.push(clinit.method.clone());
            }
        }

        for (_, node) in graph.iter() {
            match &node.kind {
                NodeKind::CallTarget { target, .. } => {
                    let native = self
                        .universe()
                        .method(target)
                        .map_or(false, |info| info.is_native());
                    if !native {
                        let implementations = implementations_of(self.universe(), &graph, target);
                        let none_found = implementations.is_empty();
                        for implementation in implementations {
                            refs.push(implementation);
                        }
                        refs.push(target.clone());

                        if none_found {
                            // constructors without a body are tolerated
                            if target.is_constructor() {
                                continue;
                            }
                            self.mark_unresolved(target);
                        }
                    }
                    self.process_class(&target.holder);
                }
                NodeKind::NewInstance { instance_class, .. } => {
                    self.process_class(instance_class);
                }
                _ => {}
            }
        }

        trace!(method = %method.key(), references = refs.methods.len(), "resolved references");
        refs.methods
    }

    /// Fail the entry of a call target that has no implementation.
    fn mark_unresolved(&mut self, target: &MethodRef) {
        let key = target.key();
        self.entry(target);
        if let Some(entry) = self.cache.entries.get_mut(&key) {
            if entry.failure.is_none() {
                trace!(target = %key, "no implementation found");
                entry.failure = Some(ExportError::UnresolvedCallTarget(key.to_string()));
            }
        }
    }

    // =========================================================================
    // Closure
    // =========================================================================

    fn walk(&mut self, method: &MethodRef) -> Walk {
        let mut seen: FxHashSet<MethodKey> = FxHashSet::default();
        let mut reached = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(method.clone());

        while let Some(current) = queue.pop_front() {
            for referenced in self.references(&current) {
                if seen.insert(referenced.key()) {
                    reached.push(referenced.clone());
                    queue.push_back(referenced);
                }
            }
        }
        Walk {
            seed: method.clone(),
            reached,
        }
    }

    fn first_failure<'m>(&self, methods: impl Iterator<Item = &'m MethodRef>) -> Option<ExportError> {
        methods
            .filter_map(|m| self.cache.get(&m.key()))
            .find_map(|entry| entry.error().cloned())
    }

    /// Everything reachable from `method`, including `method` itself.
    pub fn closure(&mut self, method: &MethodRef) -> Closure {
        let walk = self.walk(method);
        let seed_key = walk.seed.key();
        let ordered: Vec<&MethodRef> = std::iter::once(&walk.seed)
            .chain(walk.reached.iter().filter(|m| m.key() != seed_key))
            .collect();

        let failure = self.first_failure(ordered.iter().copied());
        let methods: Vec<MethodKey> = ordered.iter().map(|m| m.key()).collect();
        let graphs = methods
            .iter()
            .filter_map(|key| self.cache.get(key).and_then(|e| e.graph.clone()))
            .collect();
        Closure {
            methods,
            graphs,
            failure,
        }
    }

    /// Graphs of every method `method` references, transitively.
    ///
    /// `method` itself is only included when something it reaches calls it
    /// back. Fails with the first failure among the seed and the referenced
    /// methods.
    pub fn referenced_graphs(&mut self, method: &MethodRef) -> Result<Vec<Arc<Graph>>> {
        let walk = self.walk(method);
        if let Some(err) = self.first_failure(std::iter::once(&walk.seed).chain(walk.reached.iter())) {
            return Err(err);
        }
        Ok(walk
            .reached
            .iter()
            .filter_map(|m| self.cache.get(&m.key()).and_then(|e| e.graph.clone()))
            .collect())
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Insertion-ordered set of methods, unique by key.
#[derive(Default)]
struct ReferenceSet {
    methods: Vec<MethodRef>,
    keys: FxHashSet<MethodKey>,
}

impl ReferenceSet {
    fn push(&mut self, method: MethodRef) {
        if self.keys.insert(method.key()) {
            self.methods.push(method);
        }
    }
}

/// Declared methods matching `target` on every class `graph` instantiates,
/// then on the target's own class.
///
/// Only methods with code count. This excludes abstract methods as well as
/// natives, so a call to an abstract method with no concrete override on an
/// instantiated class is unresolved rather than bound to the declaration.
pub fn implementations_of(universe: &TypeUniverse, graph: &Graph, target: &MethodRef) -> Vec<MethodRef> {
    let instantiated = graph.iter().filter_map(|(_, node)| match &node.kind {
        NodeKind::NewInstance { instance_class, .. } => Some(instance_class.as_str()),
        _ => None,
    });

    let mut found = ReferenceSet::default();
    for class in instantiated.chain(std::iter::once(target.holder.as_str())) {
        if let Some(info) = universe.find_method(class, &target.name, &target.signature) {
            if info.has_code() {
                found.push(info.method.clone());
            }
        }
    }
    found.methods
}

// =============================================================================
// Tests
// =============================================================================
